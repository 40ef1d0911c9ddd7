//! Shared library for cross-cutting concerns in session-platform Rust services.
//!
//! This crate provides centralized implementations for:
//! - Error types with infrastructure classification
//! - Expiring key-value store clients (Redis and in-memory)
//! - Tracing subscriber setup

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod error;
pub mod kv_store;
pub mod tracing_config;

pub use error::PlatformError;
pub use kv_store::{KvStore, KvStoreConfig, MemoryStore, RedisStore};
pub use tracing_config::{TracingConfig, init_tracing};
