//! Error types for aliasmatch.
//!
//! All errors are strongly typed using thiserror. Configuration problems
//! are detected before any pairwise work begins. Missing record fields and
//! lookups of unknown keys are not errors: the first degrades the affected
//! similarity signal, the second returns `None`.

use thiserror::Error;

/// Configuration errors detected before the pipeline runs.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Distance threshold {value} is out of range [0.0, 1.0]")]
    ThresholdOutOfRange {
        value: f64,
    },

    #[error("Input record set is empty")]
    EmptyInput,

    #[error("Invalid bot filter pattern: {reason}")]
    InvalidBotPattern {
        reason: String,
    },
}

/// Top-level error type for identity resolution.
///
/// This enum encompasses all possible errors that can occur
/// when resolving a record set.
#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Internal error: {message}")]
    Internal {
        message: String,
    },
}

impl ResolveError {
    /// Creates an internal error.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Returns true if this is a configuration error.
    #[must_use]
    pub const fn is_config(&self) -> bool {
        matches!(self, Self::Config(_))
    }

    /// Returns true if this is an internal error.
    #[must_use]
    pub const fn is_internal(&self) -> bool {
        matches!(self, Self::Internal { .. })
    }
}

/// Result type alias for resolution operations.
pub type ResolveResult<T> = Result<T, ResolveError>;
