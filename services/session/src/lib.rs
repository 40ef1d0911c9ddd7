//! Session Service library.
//!
//! Issues short-lived HS256 session tokens, binds each to a revocable record
//! in an expiring key-value store, and answers validation, refresh, revocation
//! and identity queries over gRPC.

#![forbid(unsafe_code)]

pub mod config;
pub mod error;
pub mod grpc;
pub mod jwt;
pub mod metrics;
pub mod session;
pub mod storage;

pub mod proto {
    tonic::include_proto!("session");
}

// Re-exports for convenience
pub use config::Config;
pub use error::SessionError;
