//! Error types for node-doctor operations.
//!
//! This module defines [`DoctorError`], the primary error type used throughout
//! the crate, and a [`Result`] type alias for convenience.
//!
//! # Error Handling Strategy
//!
//! - Configuration errors (bad detector registration, malformed config file)
//!   are fatal and surface as `DoctorError`
//! - Expected absence (manager not installed, file missing) is modelled as
//!   `None` or empty data, never as an error
//! - Transient I/O failures are recovered where they happen and turned into
//!   degraded data; `anyhow::Error` (via `DoctorError::Other`) covers the rest

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for node-doctor operations.
#[derive(Debug, Error)]
pub enum DoctorError {
    /// A detector failed validation at registration time.
    #[error("Invalid detector '{detector}': {field} {reason}")]
    InvalidDetector {
        detector: String,
        field: &'static str,
        reason: String,
    },

    /// A detector with the same name is already registered.
    #[error("Detector '{name}' is already registered")]
    DuplicateDetector { name: String },

    /// Failed to parse a configuration file.
    #[error("Failed to parse config at {path}: {message}")]
    ConfigParseError { path: PathBuf, message: String },

    /// Failed to render a report.
    #[error("Failed to render report: {message}")]
    ReportError { message: String },

    /// IO error wrapper.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic wrapped error for anyhow interop.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Result type alias for node-doctor operations.
pub type Result<T> = std::result::Result<T, DoctorError>;
