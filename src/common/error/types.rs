//! Unified error type for the stoff library.
//!
//! Every decoder keeps its own error enum; this module folds them into one
//! type so callers that drive both the formula converter and the binary
//! readers can use a single `Result`.
use thiserror::Error;

/// Main error type for stoff operations.
#[derive(Error, Debug)]
pub enum Error {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Formula could not be tokenized or parsed
    #[error("Formula error: {0}")]
    Formula(String),

    /// Binary record framing or field decoding failed
    #[error("Record error: {0}")]
    Record(String),

    /// Invalid or unrecognized object format
    #[error("Invalid format: {0}")]
    InvalidFormat(String),

    /// Primitive read past the end of a buffer
    #[error("Binary error: {0}")]
    Binary(#[from] crate::common::binary::BinaryError),
}

/// Result type for stoff operations.
pub type Result<T> = std::result::Result<T, Error>;
