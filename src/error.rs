//! Error types for tapestry
//!
//! Exit codes:
//! - 0: Success
//! - 2: User error (bad args, unknown task or period, invalid config)
//! - 4: Operation failed (I/O, JSON, lock timeout)
//!
//! Validation and lookup failures inside the state store are not errors:
//! those operations report "nothing changed" instead.

use std::path::PathBuf;
use thiserror::Error;

/// Exit codes for the tapestry CLI
pub mod exit_codes {
    pub const SUCCESS: i32 = 0;
    pub const USER_ERROR: i32 = 2;
    pub const OPERATION_FAILED: i32 = 4;
}

/// Main error type for tapestry operations
#[derive(Error, Debug)]
pub enum Error {
    // User errors (exit code 2)
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Task not found: {0}")]
    TaskNotFound(String),

    #[error("Period not found: {0}")]
    PeriodNotFound(String),

    #[error("Ambiguous task id '{prefix}' matches {count} tasks")]
    AmbiguousTask { prefix: String, count: usize },

    // Operation failures (exit code 4)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML serialize error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    #[error("Lock acquisition failed: {0}")]
    LockFailed(PathBuf),

    #[error("Operation failed: {0}")]
    OperationFailed(String),
}

impl Error {
    /// Get the exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            Error::InvalidConfig(_)
            | Error::InvalidArgument(_)
            | Error::TaskNotFound(_)
            | Error::PeriodNotFound(_)
            | Error::AmbiguousTask { .. } => exit_codes::USER_ERROR,

            Error::Io(_)
            | Error::Json(_)
            | Error::TomlSerialize(_)
            | Error::LockFailed(_)
            | Error::OperationFailed(_) => exit_codes::OPERATION_FAILED,
        }
    }

    /// Structured details for JSON error output, when the variant carries any
    pub fn details(&self) -> Option<serde_json::Value> {
        match self {
            Error::AmbiguousTask { prefix, count } => Some(serde_json::json!({
                "prefix": prefix,
                "matches": count,
            })),
            Error::LockFailed(path) => Some(serde_json::json!({
                "lock": path.display().to_string(),
            })),
            _ => None,
        }
    }
}

/// Result type alias for tapestry operations
pub type Result<T> = std::result::Result<T, Error>;
