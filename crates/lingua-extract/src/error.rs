//! Error types for extraction operations.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ExtractError {
    /// A calendar unit was matched with a fractional quantity in a mode
    /// that requires exact calendar components (e.g. "1.3 months").
    #[error("Ambiguous duration: {0}")]
    AmbiguousDuration(String),

    /// An explicit date named a day that does not exist (e.g. "June 32").
    #[error("Invalid date: {0}")]
    InvalidDate(String),
}

pub type Result<T> = std::result::Result<T, ExtractError>;
