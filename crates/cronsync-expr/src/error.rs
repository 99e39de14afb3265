//! Expression evaluation errors.

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ExprError {
    #[error("Unknown offset unit '{0}' (expected D, W, M or Y)")]
    UnknownUnit(char),

    #[error("Invalid offset: {0}")]
    InvalidOffset(String),

    #[error("Unsupported date pattern letter '{letter}' in '{pattern}'")]
    UnsupportedPattern { letter: char, pattern: String },

    #[error("Date out of range evaluating '{0}'")]
    OutOfRange(String),
}
