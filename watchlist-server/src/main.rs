//! Watchlist server
//!
//! JSON-RPC server that bridges an IDE frontend with the watchlist table
//! model. Communicates via stdin/stdout for easy subprocess management; the
//! frontend forwards user edits, console/debugger events and namespace
//! snapshots, and renders the rows it gets back.

use std::io::{self, BufRead, Write};

use anyhow::Result;
use tracing::{debug, error, info};
use watchlist_core::protocol::RpcMessage;
use watchlist_core::{Request, Response};

mod handler;

fn main() -> Result<()> {
    // Log to stderr; stdout is for JSON-RPC.
    tracing_subscriber::fmt().with_writer(io::stderr).init();

    info!("watchlist-server starting...");

    let stdin = io::stdin();
    let mut stdout = io::stdout();

    let mut handler = handler::Handler::new();

    for line in stdin.lock().lines() {
        let line = match line {
            Ok(l) => l,
            Err(e) => {
                error!("failed to read line: {}", e);
                continue;
            }
        };

        if line.is_empty() {
            continue;
        }

        debug!("received: {}", line);

        // A malformed request produces an error response, never a loop exit.
        let response = match serde_json::from_str::<RpcMessage<Request>>(&line) {
            Ok(msg) => {
                let result = handler.handle(&msg.content);
                RpcMessage::new(msg.id.unwrap_or(0), result)
            }
            Err(e) => RpcMessage::new(0, Response::error(format!("parse error: {}", e))),
        };

        let response_json = serde_json::to_string(&response)?;
        debug!("sending: {}", response_json);
        writeln!(stdout, "{}", response_json)?;
        stdout.flush()?;
    }

    info!("watchlist-server shutting down");
    Ok(())
}
