//! Error handling for fabpath
//!
//! Provides the error types reported by a transform:
//! - Transform errors (unknown target, malformed step, bad options)
//! - A unified crate-wide error for callers that also parse or serialize JSON
//!
//! All error types use `thiserror` for ergonomic error handling.

use thiserror::Error;

/// Transform error type
///
/// Every failure of a transform is one of these. They are reported
/// synchronously and the transform produces no output when one occurs.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TransformError {
    /// No emitter is registered for the requested output kind
    #[error("Unsupported target '{target}' (available: {available})")]
    UnsupportedTarget {
        /// The requested target name.
        target: String,
        /// Comma separated list of registered target names.
        available: String,
    },

    /// A step carries a non-finite or otherwise malformed value
    #[error("Invalid value for '{field}' in step {index}: {reason}")]
    InvalidStepValue {
        /// Position of the offending step in the input sequence.
        index: usize,
        /// The field that failed validation.
        field: String,
        /// The reason the value was rejected.
        reason: String,
    },

    /// An option is unrecognized, unparsable, or conflicts with another
    #[error("Invalid configuration: {reason}")]
    InvalidConfiguration {
        /// The reason the configuration was rejected.
        reason: String,
    },
}

impl TransformError {
    /// Build an `InvalidStepValue` error
    pub fn invalid_step(index: usize, field: impl Into<String>, reason: impl Into<String>) -> Self {
        TransformError::InvalidStepValue {
            index,
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// Build an `InvalidConfiguration` error
    pub fn invalid_config(reason: impl Into<String>) -> Self {
        TransformError::InvalidConfiguration {
            reason: reason.into(),
        }
    }
}

/// Main error type for fabpath
///
/// A unified error type for callers that combine a transform with JSON
/// input or output.
#[derive(Error, Debug)]
pub enum Error {
    /// Transform error
    #[error(transparent)]
    Transform(#[from] TransformError),

    /// JSON (de)serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Check if this is an unsupported target error
    pub fn is_unsupported_target(&self) -> bool {
        matches!(
            self,
            Error::Transform(TransformError::UnsupportedTarget { .. })
        )
    }

    /// Check if this is an invalid step value error
    pub fn is_invalid_step(&self) -> bool {
        matches!(
            self,
            Error::Transform(TransformError::InvalidStepValue { .. })
        )
    }

    /// Check if this is a configuration error
    pub fn is_configuration_error(&self) -> bool {
        matches!(
            self,
            Error::Transform(TransformError::InvalidConfiguration { .. })
        )
    }
}

/// Result type using Error
pub type Result<T> = std::result::Result<T, Error>;
