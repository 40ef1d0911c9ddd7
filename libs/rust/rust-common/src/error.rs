//! Centralized error types for platform clients.
//!
//! Store clients report failures through [`PlatformError`] so that services
//! can tell infrastructure trouble apart from bad input without depending on
//! a particular backend's error type.

use thiserror::Error;

/// Common error type for platform operations.
#[derive(Error, Debug)]
pub enum PlatformError {
    /// Backend could not be reached or rejected the command
    #[error("Service unavailable: {0}")]
    Unavailable(String),

    /// Invalid input provided
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl PlatformError {
    /// Check if this error reflects an infrastructure failure.
    ///
    /// # Examples
    ///
    /// ```
    /// use rust_common::PlatformError;
    ///
    /// let err = PlatformError::unavailable("connection refused");
    /// assert!(err.is_infrastructure());
    ///
    /// let err = PlatformError::invalid_input("empty key");
    /// assert!(!err.is_infrastructure());
    /// ```
    #[must_use]
    pub const fn is_infrastructure(&self) -> bool {
        matches!(self, Self::Unavailable(_) | Self::Internal(_))
    }

    /// Create an unavailable error with the given message.
    #[must_use]
    pub fn unavailable(msg: impl Into<String>) -> Self {
        Self::Unavailable(msg.into())
    }

    /// Create an invalid input error with the given message.
    #[must_use]
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }
}

impl From<redis::RedisError> for PlatformError {
    fn from(err: redis::RedisError) -> Self {
        Self::Unavailable(err.to_string())
    }
}
