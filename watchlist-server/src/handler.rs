//! Request handler for watchlist-server

use std::path::PathBuf;

use watchlist_core::{
    LocalEvaluator, Namespace, Request, Response, SessionConfig, WatchlistSession,
};
use tracing::{debug, info};

pub struct Handler {
    session: WatchlistSession,
}

impl Handler {
    pub fn new() -> Self {
        Self {
            session: WatchlistSession::init(
                SessionConfig::default(),
                Box::new(LocalEvaluator::new()),
            ),
        }
    }

    pub fn handle(&mut self, request: &Request) -> Response {
        match request {
            Request::Initialize { settings_path } => {
                self.handle_initialize(settings_path.as_deref())
            }
            Request::SetExpressions { expressions } => {
                self.session.set_expressions(expressions.clone());
                self.rows()
            }
            Request::AddExpression { text } => {
                self.session.add_expression(text);
                self.rows()
            }
            Request::EditExpression { row, text } => {
                self.session.edit_expression(*row, text);
                self.rows()
            }
            Request::RemoveRows { rows } => {
                self.session.remove_rows(rows);
                self.rows()
            }
            Request::RemoveAll => {
                self.session.remove_all();
                self.rows()
            }
            Request::MoveRow { from, to } => {
                self.session.move_row(*from, *to);
                self.rows()
            }
            Request::DropText { row, text } => {
                let inserted = self.session.drop_text(*row, text);
                debug!("drop inserted {} expressions", inserted);
                self.rows()
            }
            Request::CopyValue { row } => match self.session.copy_value(*row) {
                Some(value) => Response::value(value),
                None => Response::error(format!("no row {}", row)),
            },
            Request::CommandExecuted { namespace } => {
                self.session.command_executed(parse_namespace(namespace));
                self.rows()
            }
            Request::DebuggerStep { namespace } => {
                self.session.debugger_step(parse_namespace(namespace));
                self.rows()
            }
            Request::Shutdown => {
                info!("shutdown requested");
                self.session.shutdown();
                Response::success()
            }
        }
    }

    fn handle_initialize(&mut self, settings_path: Option<&str>) -> Response {
        info!("initializing, settings: {:?}", settings_path);
        let config = SessionConfig {
            settings_path: settings_path.map(PathBuf::from),
        };
        self.session = WatchlistSession::init(config, Box::new(LocalEvaluator::new()));
        self.rows()
    }

    fn rows(&self) -> Response {
        Response::rows(self.session.rows())
    }
}

impl Default for Handler {
    fn default() -> Self {
        Self::new()
    }
}

fn parse_namespace(snapshot: &Option<serde_json::Value>) -> Option<Namespace> {
    snapshot.as_ref().map(Namespace::from_json)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rows_of(response: Response) -> Vec<watchlist_core::Row> {
        match response {
            Response::Rows { rows } => rows,
            other => panic!("expected rows, got {:?}", other),
        }
    }

    #[test]
    fn test_set_then_step() {
        let mut handler = Handler::new();

        handler.handle(&Request::SetExpressions {
            expressions: vec!["a".to_string(), "a+1".to_string()],
        });
        let rows = rows_of(handler.handle(&Request::DebuggerStep {
            namespace: Some(serde_json::json!({"a": 1})),
        }));

        assert_eq!(rows[0].value, "1");
        assert_eq!(rows[1].value, "2");
    }

    #[test]
    fn test_copy_value_out_of_range() {
        let mut handler = Handler::new();
        let response = handler.handle(&Request::CopyValue { row: 3 });
        assert!(matches!(response, Response::Error { .. }));
    }

    #[test]
    fn test_error_expression_is_isolated() {
        let mut handler = Handler::new();
        handler.handle(&Request::SetExpressions {
            expressions: vec!["1/0".to_string()],
        });
        let rows = rows_of(handler.handle(&Request::CommandExecuted {
            namespace: Some(serde_json::json!({})),
        }));
        assert_eq!(rows[0].value, "ZeroDivisionError");
        assert_eq!(rows[0].tooltip, "division by zero");
    }
}
