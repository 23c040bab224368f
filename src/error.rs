//! Global error handling for llmcopy
//!
//! This module provides a centralized error type that can represent errors
//! from all modules in the project.

use std::io;
use thiserror::Error;

use crate::clipboard::ClipboardError;

/// Global error type for llmcopy operations
#[derive(Error, Debug)]
pub enum CopyError {
    /// File system errors
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// Settings file (de)serialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Clipboard placement errors
    #[error("Clipboard error: {0}")]
    Clipboard(#[from] ClipboardError),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// The build was cancelled through its progress sink.
    ///
    /// This is a control-flow outcome, not a failure: callers stop quietly.
    #[error("Operation was cancelled")]
    Cancelled,

    /// Unexpected error
    #[error("Unexpected error: {0}")]
    Unexpected(String),
}

impl CopyError {
    /// Whether this error is the cooperative cancellation signal
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }
}

/// Specialized Result type for llmcopy operations
pub type Result<T> = std::result::Result<T, CopyError>;

/// Creates a CopyError with a formatted message
#[macro_export]
macro_rules! error {
    ($error_type:ident, $($arg:tt)*) => {
        $crate::error::CopyError::$error_type(format!($($arg)*))
    };
}

/// Returns an error result with a formatted message
#[macro_export]
macro_rules! bail {
    ($error_type:ident, $($arg:tt)*) => {
        return Err($crate::error!($error_type, $($arg)*))
    };
}

/// Ensures a condition is true, otherwise returns an error
#[macro_export]
macro_rules! ensure {
    ($cond:expr, $error_type:ident, $($arg:tt)*) => {
        if !($cond) {
            $crate::bail!($error_type, $($arg)*)
        }
    };
}
