//! Error types for recurrence expansion.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum RecurError {
    #[error("Invalid recurrence rule: {0}")]
    InvalidRule(String),

    #[error("Invalid span: {0}")]
    InvalidSpan(String),

    #[error("Invalid datetime: {0}")]
    InvalidDatetime(String),
}

pub type Result<T> = std::result::Result<T, RecurError>;
