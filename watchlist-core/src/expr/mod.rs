//! Expression evaluation module
//!
//! Provides parsing and evaluation of watch expressions against a
//! namespace snapshot from the debug session.

pub mod ast;
pub mod error;
pub mod eval;
pub mod parser;
pub mod value;

pub use ast::Expr;
pub use error::EvalError;
pub use eval::{Evaluate, EvaluationResult, LocalEvaluator, Namespace};
pub use parser::parse_expr;
pub use value::Value;
