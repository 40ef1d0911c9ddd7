//! Shared fixtures for session service integration tests.

#![allow(dead_code)]

use async_trait::async_trait;
use proptest::prelude::*;
use rust_common::{KvStore, KvStoreConfig, MemoryStore, PlatformError};
use secrecy::SecretString;
use session_service::config::ACCESS_TOKEN_TTL;
use session_service::jwt::{AccountInfo, AccountType, TokenCodec};
use session_service::session::TokenEngine;
use session_service::storage::SessionStore;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

pub const SECRET: &str = "integration-test-secret-0123456789abcdef";

pub fn codec() -> TokenCodec {
    codec_with_secret(SECRET)
}

pub fn codec_with_secret(secret: &str) -> TokenCodec {
    TokenCodec::new(&SecretString::from(secret.to_string()), ACCESS_TOKEN_TTL)
}

/// Engine over a fresh in-memory store, plus a handle on that store.
pub fn memory_engine() -> (Arc<TokenEngine>, MemoryStore) {
    let kv = MemoryStore::new(
        KvStoreConfig::default().with_namespace(format!("test-{}", uuid::Uuid::new_v4())),
    );
    let engine = TokenEngine::new(codec(), SessionStore::new(Arc::new(kv.clone())));
    (Arc::new(engine), kv)
}

/// Engine whose store refuses every command.
pub fn failing_engine() -> Arc<TokenEngine> {
    Arc::new(TokenEngine::new(
        codec(),
        SessionStore::new(Arc::new(FailingStore)),
    ))
}

/// Store that behaves like an unreachable Redis.
pub struct FailingStore;

#[async_trait]
impl KvStore for FailingStore {
    async fn set_ex(&self, _key: &str, _value: &str, _ttl: Duration) -> Result<(), PlatformError> {
        Err(PlatformError::unavailable("connection refused"))
    }

    async fn get(&self, _key: &str) -> Result<Option<String>, PlatformError> {
        Err(PlatformError::unavailable("connection refused"))
    }

    async fn delete(&self, _key: &str) -> Result<u64, PlatformError> {
        Err(PlatformError::unavailable("connection refused"))
    }
}

/// Store that accepts writes but is unreachable for reads and deletes.
pub struct WriteOnlyStore(pub MemoryStore);

#[async_trait]
impl KvStore for WriteOnlyStore {
    async fn set_ex(&self, key: &str, value: &str, ttl: Duration) -> Result<(), PlatformError> {
        self.0.set_ex(key, value, ttl).await
    }

    async fn get(&self, _key: &str) -> Result<Option<String>, PlatformError> {
        Err(PlatformError::unavailable("read timeout"))
    }

    async fn delete(&self, _key: &str) -> Result<u64, PlatformError> {
        Err(PlatformError::unavailable("read timeout"))
    }
}

/// Store whose writes can be switched off while reads and deletes keep working.
pub struct WriteToggleStore {
    inner: MemoryStore,
    writes_down: AtomicBool,
}

impl WriteToggleStore {
    pub fn new(inner: MemoryStore) -> Self {
        Self {
            inner,
            writes_down: AtomicBool::new(false),
        }
    }

    pub fn fail_writes(&self) {
        self.writes_down.store(true, Ordering::SeqCst);
    }
}

#[async_trait]
impl KvStore for WriteToggleStore {
    async fn set_ex(&self, key: &str, value: &str, ttl: Duration) -> Result<(), PlatformError> {
        if self.writes_down.load(Ordering::SeqCst) {
            return Err(PlatformError::unavailable("write refused"));
        }
        self.inner.set_ex(key, value, ttl).await
    }

    async fn get(&self, key: &str) -> Result<Option<String>, PlatformError> {
        self.inner.get(key).await
    }

    async fn delete(&self, key: &str) -> Result<u64, PlatformError> {
        self.inner.delete(key).await
    }
}

/// Generate arbitrary account types.
pub fn arb_account_type() -> impl Strategy<Value = AccountType> {
    prop::sample::select(AccountType::ALL.to_vec())
}

/// Generate arbitrary account info across the full u64 range.
pub fn arb_account() -> impl Strategy<Value = AccountInfo> {
    (any::<u64>(), arb_account_type()).prop_map(|(id, kind)| AccountInfo::new(id, kind))
}
