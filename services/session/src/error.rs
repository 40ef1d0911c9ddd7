//! Error taxonomy for the session service.
//!
//! Token problems (malformed, wrong algorithm, bad signature, expired,
//! revoked) are caller errors. `StoreUnavailable` is the infrastructure
//! failure and is logged and counted separately. At the gRPC boundary every
//! token problem collapses into the same `Unauthenticated` status so callers
//! cannot probe which check failed.

use jsonwebtoken::errors::ErrorKind;
use rust_common::PlatformError;
use thiserror::Error;
use tonic::Status;

/// Message returned to callers for every token problem.
pub const INVALID_SESSION_TOKEN: &str = "invalid session token";

#[derive(Error, Debug)]
pub enum SessionError {
    #[error("Token malformed: {0}")]
    Malformed(String),

    #[error("Unexpected signing algorithm: {0}")]
    UnexpectedAlgorithm(String),

    #[error("Token signature invalid")]
    InvalidSignature,

    #[error("Token expired")]
    Expired,

    #[error("Session revoked")]
    SessionRevoked,

    #[error("Session store unavailable: {0}")]
    StoreUnavailable(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl SessionError {
    pub fn malformed(msg: impl Into<String>) -> Self {
        Self::Malformed(msg.into())
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    /// True when the failure is ours rather than the caller's.
    #[must_use]
    pub const fn is_infrastructure(&self) -> bool {
        matches!(self, Self::StoreUnavailable(_) | Self::Internal(_) | Self::Config(_))
    }

    /// True for failures caused by the presented token or its session.
    #[must_use]
    pub const fn is_token_problem(&self) -> bool {
        matches!(
            self,
            Self::Malformed(_)
                | Self::UnexpectedAlgorithm(_)
                | Self::InvalidSignature
                | Self::Expired
                | Self::SessionRevoked
        )
    }

    /// Stable label for logs and metrics.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Malformed(_) => "malformed",
            Self::UnexpectedAlgorithm(_) => "unexpected_algorithm",
            Self::InvalidSignature => "invalid_signature",
            Self::Expired => "expired",
            Self::SessionRevoked => "session_revoked",
            Self::StoreUnavailable(_) => "store_unavailable",
            Self::InvalidArgument(_) => "invalid_argument",
            Self::Config(_) => "config",
            Self::Internal(_) => "internal",
        }
    }
}

impl From<PlatformError> for SessionError {
    fn from(err: PlatformError) -> Self {
        match err {
            PlatformError::Unavailable(msg) => Self::StoreUnavailable(msg),
            PlatformError::InvalidInput(msg) | PlatformError::Internal(msg) => Self::Internal(msg),
        }
    }
}

impl From<jsonwebtoken::errors::Error> for SessionError {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        match err.kind() {
            ErrorKind::InvalidSignature => Self::InvalidSignature,
            ErrorKind::ExpiredSignature => Self::Expired,
            ErrorKind::InvalidAlgorithm | ErrorKind::InvalidAlgorithmName => {
                Self::UnexpectedAlgorithm(err.to_string())
            }
            _ => Self::Malformed(err.to_string()),
        }
    }
}

impl From<SessionError> for Status {
    fn from(err: SessionError) -> Self {
        match err {
            e if e.is_token_problem() => Status::unauthenticated(INVALID_SESSION_TOKEN),
            SessionError::StoreUnavailable(_) => Status::unavailable("session store unavailable"),
            SessionError::InvalidArgument(msg) => Status::invalid_argument(msg),
            _ => Status::internal("internal error"),
        }
    }
}
