//! Error types for the parslither dissection core.
//!
//! Dissectors report format violations as [`MalformedInputError`], which is
//! cheap to clone so a session can keep the last failure as observable state.
//! Everything else is folded into [`DissectError`].

use thiserror::Error;

use crate::io::error::IoError;

/// A dissector could not parse the given bytes as its format.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{dissector}: malformed input{}: {message}", offset_suffix(.offset))]
pub struct MalformedInputError {
    /// Name of the dissector that rejected the input
    pub dissector: String,
    /// Byte offset where parsing stopped, when known
    pub offset: Option<u64>,
    /// Human readable reason
    pub message: String,
}

fn offset_suffix(offset: &Option<u64>) -> String {
    match offset {
        Some(off) => format!(" at offset {:#x}", off),
        None => String::new(),
    }
}

impl MalformedInputError {
    pub fn new(dissector: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            dissector: dissector.into(),
            offset: None,
            message: message.into(),
        }
    }

    pub fn at(dissector: impl Into<String>, offset: u64, message: impl Into<String>) -> Self {
        Self {
            dissector: dissector.into(),
            offset: Some(offset),
            message: message.into(),
        }
    }
}

/// Main error type for dissection operations.
#[derive(Debug, Error)]
pub enum DissectError {
    /// The bytes do not conform to the dissector's format
    #[error(transparent)]
    Malformed(#[from] MalformedInputError),

    /// A manual override named a dissector the registry does not hold
    #[error("Unknown dissector: {0}")]
    UnknownDissector(String),

    /// A reload supplied two dissectors with the same name
    #[error("Duplicate dissector name: {0}")]
    DuplicateDissector(String),

    /// A dissection was cancelled cooperatively
    #[error("Dissection cancelled")]
    Cancelled,

    /// A newer request replaced this one before it completed
    #[error("Dissection superseded by a newer request")]
    Superseded,

    /// Dissection timeout
    #[error("Dissection timeout after {seconds}s")]
    Timeout { seconds: u64 },

    /// File loading errors
    #[error("I/O error: {0}")]
    Io(#[from] IoError),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Generic internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Result type alias for dissection operations
pub type Result<T> = std::result::Result<T, DissectError>;
