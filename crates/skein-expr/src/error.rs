//! Error types for the expression language.

use thiserror::Error;

use crate::value::Value;

/// Result type for expression evaluation.
pub type EvalResult<T> = Result<T, EvalError>;

/// Errors raised while compiling an expression.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ExprError {
    /// The expression contains no tokens.
    #[error("empty expression")]
    Empty,

    /// A character sequence that is not part of the language.
    #[error("{message}")]
    Lex {
        /// Byte range of the offending input.
        span: std::ops::Range<usize>,
        /// Human-readable description.
        message: String,
    },

    /// The token stream does not form a valid expression.
    #[error("{message}")]
    Parse {
        /// Byte range of the offending input.
        span: std::ops::Range<usize>,
        /// Human-readable description.
        message: String,
    },
}

/// Errors raised while evaluating a compiled expression.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EvalError {
    /// The environment has no value for this identifier.
    #[error("unknown identifier: {0}")]
    UnknownIdentifier(String),

    /// An operator was applied to operands it does not support.
    #[error("cannot apply '{op}' to {left} and {right}")]
    TypeMismatch {
        /// Operator symbol.
        op: &'static str,
        /// Type of the left operand.
        left: &'static str,
        /// Type of the right operand.
        right: &'static str,
    },

    /// A unary operator was applied to an unsupported operand.
    #[error("cannot apply '{op}' to {operand}")]
    BadOperand {
        /// Operator symbol.
        op: &'static str,
        /// Type of the operand.
        operand: &'static str,
    },

    /// Integer division or remainder by zero.
    #[error("division by zero")]
    DivisionByZero,

    /// Integer arithmetic overflowed.
    #[error("integer overflow")]
    Overflow,

    /// A boolean was required but the expression produced something else.
    #[error("expected a boolean result, got {0}")]
    NotBoolean(Value),
}
