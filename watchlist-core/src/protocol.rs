//! JSON-RPC protocol definitions
//!
//! Defines the communication protocol between the host frontend and
//! watchlist-server. Namespace snapshots travel as plain JSON objects;
//! `null` means there is no scope to evaluate against.

use serde::{Deserialize, Serialize};

use crate::table::Row;

/// Request from the host frontend to watchlist-server
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "method", content = "params")]
pub enum Request {
    /// Initialize the session, restoring persisted expressions
    #[serde(rename = "initialize")]
    Initialize { settings_path: Option<String> },

    /// Replace the whole expression list
    #[serde(rename = "set_expressions")]
    SetExpressions { expressions: Vec<String> },

    /// Add one expression at the current row
    #[serde(rename = "add_expression")]
    AddExpression { text: String },

    /// Finish an in-place edit of a row
    #[serde(rename = "edit_expression")]
    EditExpression { row: usize, text: String },

    /// Remove a (multi-)selection of rows
    #[serde(rename = "remove_rows")]
    RemoveRows { rows: Vec<usize> },

    /// Clear the table
    #[serde(rename = "remove_all")]
    RemoveAll,

    /// Drag reorder of an existing row
    #[serde(rename = "move_row")]
    MoveRow { from: usize, to: usize },

    /// Dropped text payload, one expression per line
    #[serde(rename = "drop_text")]
    DropText { row: usize, text: String },

    /// Value cell text for the clipboard
    #[serde(rename = "copy_value")]
    CopyValue { row: usize },

    /// A console command finished; params carry the namespace snapshot
    #[serde(rename = "command_executed")]
    CommandExecuted { namespace: Option<serde_json::Value> },

    /// The debugger completed a step
    #[serde(rename = "debugger_step")]
    DebuggerStep { namespace: Option<serde_json::Value> },

    /// Persist expressions and release the session
    #[serde(rename = "shutdown")]
    Shutdown,
}

/// Response from watchlist-server to the host frontend
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Response {
    Rows { rows: Vec<Row> },
    Value { value: String },
    Success { ok: bool },
    Error { error: String },
}

impl Response {
    pub fn success() -> Self {
        Response::Success { ok: true }
    }

    pub fn error(msg: impl Into<String>) -> Self {
        Response::Error { error: msg.into() }
    }

    pub fn rows(rows: Vec<Row>) -> Self {
        Response::Rows { rows }
    }

    pub fn value(value: impl Into<String>) -> Self {
        Response::Value {
            value: value.into(),
        }
    }
}

/// JSON-RPC message wrapper
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RpcMessage<T> {
    pub jsonrpc: String,
    pub id: Option<u64>,
    #[serde(flatten)]
    pub content: T,
}

impl<T> RpcMessage<T> {
    pub fn new(id: u64, content: T) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            id: Some(id),
            content,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::Tone;

    #[test]
    fn test_request_serialize() {
        let req = Request::DropText {
            row: 2,
            text: "a\nb".to_string(),
        };
        let json = serde_json::to_string(&req).unwrap();
        assert!(json.contains("\"method\":\"drop_text\""));
        assert!(json.contains("\"row\":2"));
    }

    #[test]
    fn test_request_without_params_deserializes() {
        let req: Request = serde_json::from_str(r#"{"method":"remove_all"}"#).unwrap();
        assert!(matches!(req, Request::RemoveAll));
    }

    #[test]
    fn test_namespace_event_deserializes() {
        let req: Request = serde_json::from_str(
            r#"{"method":"debugger_step","params":{"namespace":{"a":1}}}"#,
        )
        .unwrap();
        let Request::DebuggerStep { namespace: Some(ns) } = req else {
            panic!("expected a debugger_step with a namespace");
        };
        assert_eq!(ns["a"], 1);
    }

    #[test]
    fn test_response_serialize() {
        let resp = Response::rows(vec![Row {
            expression: "a".to_string(),
            value: "1".to_string(),
            tooltip: String::new(),
            tone: Tone::Default,
            changed: true,
        }]);
        let json = serde_json::to_string(&resp).unwrap();
        assert!(json.contains("\"expression\":\"a\""));
        assert!(json.contains("\"changed\":true"));
    }

    #[test]
    fn test_rpc_message_round_trip() {
        let msg = RpcMessage::new(7, Request::Shutdown);
        let json = serde_json::to_string(&msg).unwrap();
        let parsed: RpcMessage<Request> = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.id, Some(7));
        assert!(matches!(parsed.content, Request::Shutdown));
    }
}
