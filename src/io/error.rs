//! Custom error types for the I/O module.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum IoError {
    #[error("File size of {found} bytes exceeds the maximum allowed size of {limit} bytes.")]
    FileTooLarge { limit: u64, found: u64 },

    #[error("Reading {requested} bytes would exceed the read limit of {limit} bytes.")]
    ReadLimitExceeded { limit: u64, requested: u64 },

    #[error("Path has no file name: {0}")]
    NoFileName(String),

    #[error("An underlying I/O error occurred: {0}")]
    StdIo(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, IoError>;
