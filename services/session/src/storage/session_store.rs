//! Session bindings on top of the expiring key-value store.
//!
//! A binding maps a session id to the decimal account id it was issued for.
//! The store's own TTL is the only expiry mechanism.

use crate::error::SessionError;
use crate::metrics;
use rust_common::KvStore;
use std::sync::Arc;
use std::time::Duration;
use tracing::error;

pub struct SessionStore {
    kv: Arc<dyn KvStore>,
}

impl SessionStore {
    pub fn new(kv: Arc<dyn KvStore>) -> Self {
        SessionStore { kv }
    }

    /// Create or overwrite the binding for `session_id`.
    pub async fn bind(
        &self,
        session_id: &str,
        account_id: u64,
        ttl: Duration,
    ) -> Result<(), SessionError> {
        self.kv
            .set_ex(session_id, &account_id.to_string(), ttl)
            .await
            .map_err(|e| store_failure("bind", e.into()))
    }

    /// The bound account id, or `None` when the session is not live.
    pub async fn lookup(&self, session_id: &str) -> Result<Option<u64>, SessionError> {
        let value = self
            .kv
            .get(session_id)
            .await
            .map_err(|e| store_failure("lookup", e.into()))?;

        match value {
            Some(raw) => raw.parse().map(Some).map_err(|_| {
                store_failure(
                    "lookup",
                    SessionError::StoreUnavailable(format!(
                        "corrupt binding for session {session_id}"
                    )),
                )
            }),
            None => Ok(None),
        }
    }

    /// Delete the binding, returning how many records were removed.
    pub async fn remove(&self, session_id: &str) -> Result<u64, SessionError> {
        self.kv
            .delete(session_id)
            .await
            .map_err(|e| store_failure("remove", e.into()))
    }
}

fn store_failure(operation: &'static str, err: SessionError) -> SessionError {
    metrics::record_store_error(operation);
    error!(
        operation,
        error_kind = err.kind(),
        error = %err,
        "Session store operation failed"
    );
    err
}
