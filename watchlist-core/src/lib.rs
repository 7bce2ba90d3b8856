//! Watchlist core library
//!
//! A debugger-adjacent watchlist: an ordered, user-editable list of
//! expressions re-evaluated against the current debugger scope after every
//! step, rendered as a two-column table with change highlighting and
//! per-expression error flagging.
//!
//! - expression store, table model and refresh trigger
//! - expression parsing and evaluation behind the [`Evaluate`] trait
//! - settings persistence and the frontend wire protocol

pub mod expr;
pub mod protocol;
pub mod refresh;
pub mod session;
pub mod settings;
pub mod store;
pub mod table;

pub use expr::{Evaluate, EvalError, EvaluationResult, LocalEvaluator, Namespace, Value};
pub use protocol::{Request, Response};
pub use session::{SessionConfig, WatchlistSession};
pub use settings::Settings;
pub use store::ExpressionStore;
pub use table::{Row, TableController, Tone};
