//! Error types returned at the library boundary
//!
//! Precondition violations are reported before any filesystem walk starts.
//! I/O failures carry the path that failed so the CLI can name it.

use std::path::PathBuf;
use thiserror::Error;

/// Errors produced by discovery, scanning, and input validation
#[derive(Debug, Error)]
pub enum Error {
    #[error("{} is not a directory", .0.display())]
    NotADirectory(PathBuf),

    #[error("Number of lines ({0}) cannot be negative")]
    NegativeMinLines(i64),

    #[error("Number of tests ({0}) cannot be negative")]
    NegativeMaxResults(i64),

    #[error("Failed to read directory: {}", .path.display())]
    ReadDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to read file: {}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl Error {
    /// True for errors raised by input validation rather than by the scan itself
    pub fn is_precondition(&self) -> bool {
        matches!(
            self,
            Error::NotADirectory(_) | Error::NegativeMinLines(_) | Error::NegativeMaxResults(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, Error>;
