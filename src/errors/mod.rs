//! Error handling utilities for the chronicle application.
//!
//! This module provides the central error type `AppError` which represents all
//! possible error conditions that might occur in the application, as well as the
//! convenience type alias `AppResult` for functions that can return these errors.
//!
//! The three error kinds a caller is expected to tell apart are
//! [`AppError::Validation`], [`AppError::NotInitialized`] and
//! [`AppError::Corruption`]. Everything else is an environmental failure.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Represents a persisted record that could not be turned back into an entry.
///
/// # Examples
///
/// ```
/// use chronicle::errors::CorruptionError;
///
/// let error = CorruptionError::MissingFields {
///     missing: vec!["id".to_string(), "meta".to_string()],
/// };
/// assert!(format!("{}", error).contains("id, meta"));
/// ```
#[derive(Debug, Error)]
pub enum CorruptionError {
    /// The line is not valid JSON.
    #[error("Invalid JSONL line{}: {source} (content: {content})", location(.path, .line))]
    InvalidJson {
        /// Partition the line was read from, when known
        path: Option<PathBuf>,
        /// 1-based line number inside the partition, when known
        line: Option<usize>,
        /// The offending text
        content: String,
        /// The underlying parser error
        #[source]
        source: serde_json::Error,
    },

    /// The line is not valid UTF-8.
    #[error("Record{} is not valid UTF-8: {source}", location(.path, .line))]
    InvalidUtf8 {
        /// Partition the line was read from, when known
        path: Option<PathBuf>,
        /// 1-based line number inside the partition, when known
        line: Option<usize>,
        /// The underlying decoding error
        #[source]
        source: std::str::Utf8Error,
    },

    /// The line is valid JSON but not an object.
    #[error("Record{} is not a JSON object", location(.path, .line))]
    NotAnObject {
        /// Partition the line was read from, when known
        path: Option<PathBuf>,
        /// 1-based line number inside the partition, when known
        line: Option<usize>,
    },

    /// The record lacks one or more of the required keys.
    #[error("Entry missing keys: {}", .missing.join(", "))]
    MissingFields {
        /// Names of the absent keys, in canonical order
        missing: Vec<String>,
    },
}

impl CorruptionError {
    /// Attaches the partition path and line number to a decode failure.
    ///
    /// Variants without location information are returned unchanged.
    pub fn at_location(self, at_path: PathBuf, at_line: usize) -> Self {
        match self {
            CorruptionError::InvalidJson {
                content, source, ..
            } => CorruptionError::InvalidJson {
                path: Some(at_path),
                line: Some(at_line),
                content,
                source,
            },
            CorruptionError::InvalidUtf8 { source, .. } => CorruptionError::InvalidUtf8 {
                path: Some(at_path),
                line: Some(at_line),
                source,
            },
            CorruptionError::NotAnObject { .. } => CorruptionError::NotAnObject {
                path: Some(at_path),
                line: Some(at_line),
            },
            other => other,
        }
    }
}

fn location(path: &Option<PathBuf>, line: &Option<usize>) -> String {
    match (path, line) {
        (Some(path), Some(line)) => format!(" at {}:{}", path.display(), line),
        (Some(path), None) => format!(" in {}", path.display()),
        (None, Some(line)) => format!(" at line {}", line),
        (None, None) => String::new(),
    }
}

/// Represents errors that can occur when attempting to lock partition files.
///
/// # Examples
///
/// ```
/// use chronicle::errors::LockError;
/// use std::path::PathBuf;
/// use std::io::{self, ErrorKind};
///
/// let io_error = io::Error::new(ErrorKind::PermissionDenied, "permission denied");
/// let error = LockError::AcquisitionFailed {
///     path: PathBuf::from("/path/to/entries/2024-01.jsonl"),
///     source: io_error,
/// };
///
/// assert!(format!("{}", error).contains("Failed to acquire lock"));
/// assert!(format!("{}", error).contains("permission denied"));
/// ```
#[derive(Debug, Error)]
pub enum LockError {
    /// Error when acquiring the lock fails for a technical reason.
    #[error("Failed to acquire lock for partition {path}: {source}. Please check file permissions and ensure the directory is accessible.")]
    AcquisitionFailed {
        /// The path to the file that couldn't be locked
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: io::Error,
    },

    /// Error when releasing a held lock fails.
    #[error("Failed to release lock for partition {path}: {source}")]
    ReleaseFailed {
        /// The path to the locked file
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: io::Error,
    },
}

/// Represents all possible errors that can occur in the chronicle application.
///
/// This enum is the central error type used across the application, with variants
/// for different error categories. It uses `thiserror` for deriving the `Error` trait
/// implementation and formatted error messages.
///
/// # Examples
///
/// ```
/// use chronicle::errors::AppError;
///
/// let error = AppError::Validation("message cannot be empty".to_string());
/// assert_eq!(format!("{}", error), "message cannot be empty");
/// assert_eq!(error.exit_code(), 2);
/// ```
#[derive(Debug, Error)]
pub enum AppError {
    /// User-supplied input violates an entry or query rule.
    #[error("{0}")]
    Validation(String),

    /// An operation needing the store config ran before `init`.
    #[error("Missing config in {}. Run 'chronicle init'.", .root.display())]
    NotInitialized {
        /// Root directory of the store that was queried
        root: PathBuf,
    },

    /// A persisted record failed to parse.
    #[error("Store corruption: {0}")]
    Corruption(#[from] CorruptionError),

    /// Errors related to configuration loading or validation.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Input/output errors from filesystem operations.
    ///
    /// This variant automatically converts from `std::io::Error` through the `From` trait.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Errors related to file locking.
    #[error("File locking error: {0}")]
    Lock(#[from] LockError),

    /// Serialization failures while encoding records.
    #[error("Serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

impl AppError {
    /// Process exit code for this error.
    ///
    /// Errors the user can fix by changing input or running `init` map to `2`;
    /// everything else maps to `1`.
    pub fn exit_code(&self) -> i32 {
        match self {
            AppError::Validation(_) | AppError::NotInitialized { .. } => 2,
            _ => 1,
        }
    }

    /// Returns true for [`AppError::Validation`].
    pub fn is_validation(&self) -> bool {
        matches!(self, AppError::Validation(_))
    }
}

/// A type alias for `Result<T, AppError>` to simplify function signatures.
///
/// # Examples
///
/// ```
/// use chronicle::errors::{AppResult, AppError};
///
/// fn might_fail(flag: bool) -> AppResult<String> {
///     if flag {
///         return Err(AppError::Validation("limit must be a positive integer".to_string()));
///     }
///     Ok("Operation succeeded".to_string())
/// }
/// assert!(might_fail(true).is_err());
/// ```
pub type AppResult<T> = Result<T, AppError>;
