//! Error types for relayout library.

use std::io;
use thiserror::Error;

/// Result type alias for relayout operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur while rebuilding a page layout.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error when reading or writing files.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The raw page dictionary is not valid JSON or does not match the expected shape.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Input that cannot be sanitized, e.g. a document without a pages array.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// A stage that depends on the page margin ran before `clean()`.
    #[error("Page margin is not set: run clean() first")]
    MarginUnset,

    /// The document sink rejected a command.
    #[error("Assembly error: {0}")]
    Assembly(String),

    /// A page failed during strict multi-page conversion.
    #[error("Page {page} failed: {message}")]
    PageFailed {
        /// 1-indexed page number
        page: u32,
        /// Underlying failure
        message: String,
    },

    /// Invalid page range specification.
    #[error("Invalid page range: {0}")]
    InvalidPageRange(String),

    /// Generic error with message.
    #[error("{0}")]
    Other(String),
}
