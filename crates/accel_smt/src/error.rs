//! Errors raised by the SMT backend.

use std::fmt;

/// An error raised while encoding a formula or driving the solver.
#[derive(Debug, Clone)]
pub struct SmtError {
    pub message: String,
}

impl SmtError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl fmt::Display for SmtError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for SmtError {}

pub type Result<T> = std::result::Result<T, SmtError>;
