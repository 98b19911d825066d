// src/error.rs

use thiserror::Error;

/// Core error types for Forager
#[derive(Error, Debug)]
pub enum Error {
    /// Conflicting or misapplied command-line options
    #[error("usage error: {0}")]
    Usage(String),

    /// Registry unreachable or response body malformed
    #[error("registry error: {0}")]
    Transport(String),

    /// The registry has no record for the queried package
    #[error("package '{0}' not found in the AUR")]
    NotFound(String),

    /// A fetch, build, or system command failed to spawn or exited nonzero
    #[error("command failed: {0}")]
    Subprocess(String),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Environment setup error (e.g. no resolvable cache directory)
    #[error("failed to initialize: {0}")]
    Init(String),
}

/// Result type alias using Forager's Error type
pub type Result<T> = std::result::Result<T, Error>;
