//! Expression error types
//!
//! Error kinds carry the names the host console surfaces for the same
//! failure, because those names drive the display tone downstream.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum EvalError {
    // Parse errors
    #[error("invalid syntax: {message}")]
    Syntax { message: String },

    // Name resolution
    #[error("name '{name}' is not defined")]
    NameNotDefined { name: String },

    #[error("'{type_name}' object has no attribute '{attribute}'")]
    MissingAttribute {
        type_name: String,
        attribute: String,
    },

    #[error("'{key}'")]
    KeyNotFound { key: String },

    // Runtime errors
    #[error("division by zero")]
    DivisionByZero,

    #[error("float division by zero")]
    FloatDivisionByZero,

    #[error("integer division or modulo by zero")]
    ModuloByZero,

    #[error("unsupported operand type(s) for {op}: '{left}' and '{right}'")]
    UnsupportedOperand {
        op: String,
        left: String,
        right: String,
    },

    #[error("'{type_name}' object is not subscriptable")]
    NotSubscriptable { type_name: String },

    #[error("{type_name} index out of range")]
    IndexOutOfRange { type_name: String },

    #[error("{type_name} indices must be integers")]
    BadIndexType { type_name: String },

    #[error("result too large")]
    Overflow,

    // Expression forms the local evaluator does not handle
    #[error("{feature} is not supported by the local evaluator")]
    Unsupported { feature: String },
}

impl EvalError {
    /// Exception-class-style name shown in the value cell.
    pub fn kind(&self) -> &'static str {
        match self {
            EvalError::Syntax { .. } => "SyntaxError",
            EvalError::NameNotDefined { .. } => "NameError",
            EvalError::MissingAttribute { .. } => "AttributeError",
            EvalError::KeyNotFound { .. } => "KeyError",
            EvalError::DivisionByZero
            | EvalError::FloatDivisionByZero
            | EvalError::ModuloByZero => "ZeroDivisionError",
            EvalError::UnsupportedOperand { .. }
            | EvalError::NotSubscriptable { .. }
            | EvalError::BadIndexType { .. } => "TypeError",
            EvalError::IndexOutOfRange { .. } => "IndexError",
            EvalError::Overflow => "OverflowError",
            EvalError::Unsupported { .. } => "NotImplementedError",
        }
    }

    pub fn unsupported(feature: impl Into<String>) -> Self {
        EvalError::Unsupported {
            feature: feature.into(),
        }
    }

    pub fn syntax(message: impl Into<String>) -> Self {
        EvalError::Syntax {
            message: message.into(),
        }
    }

    pub fn unknown_name(name: impl Into<String>) -> Self {
        EvalError::NameNotDefined { name: name.into() }
    }

    pub fn bad_operands(
        op: impl Into<String>,
        left: impl Into<String>,
        right: impl Into<String>,
    ) -> Self {
        EvalError::UnsupportedOperand {
            op: op.into(),
            left: left.into(),
            right: right.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_division_by_zero_contract() {
        let err = EvalError::DivisionByZero;
        assert_eq!(err.kind(), "ZeroDivisionError");
        assert_eq!(err.to_string(), "division by zero");
    }

    #[test]
    fn test_name_error_message() {
        let err = EvalError::unknown_name("spam");
        assert_eq!(err.kind(), "NameError");
        assert_eq!(err.to_string(), "name 'spam' is not defined");
    }
}
