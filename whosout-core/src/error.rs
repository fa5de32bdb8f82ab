//! Error types for whosout.

use thiserror::Error;

/// Errors that can occur while fetching or projecting the calendar feed.
#[derive(Error, Debug)]
pub enum WhosOutError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Calendar fetch error: {0}")]
    Fetch(String),

    #[error("ICS parse error: {0}")]
    IcsParse(String),
}

/// Result type alias for whosout operations.
pub type WhosOutResult<T> = Result<T, WhosOutError>;
