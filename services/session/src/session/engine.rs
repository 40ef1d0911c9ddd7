//! Token lifecycle: issue, validate, refresh, revoke.
//!
//! A token is live only while its session binding exists in the store. The
//! signed claims carry identity; the store only answers "is this session
//! still live". The binding TTL is derived from the claim expiry so both run
//! out together.

use crate::error::SessionError;
use crate::jwt::{AccountInfo, AccountType, TokenClaims, TokenCodec};
use crate::metrics;
use crate::storage::SessionStore;
use tracing::{debug, info, warn};

/// Identity of a live session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessInfo {
    pub session_id: String,
    pub account_id: u64,
    pub account_type: AccountType,
}

impl From<&TokenClaims> for AccessInfo {
    fn from(claims: &TokenClaims) -> Self {
        AccessInfo {
            session_id: claims.session_id.clone(),
            account_id: claims.account_id,
            account_type: claims.account_type,
        }
    }
}

pub struct TokenEngine {
    codec: TokenCodec,
    store: SessionStore,
}

impl TokenEngine {
    pub fn new(codec: TokenCodec, store: SessionStore) -> Self {
        TokenEngine { codec, store }
    }

    /// Mint a token for `account` and bind its session.
    ///
    /// Fails as a whole if the binding cannot be written, so no token is
    /// ever handed out without a backing session.
    pub async fn issue(&self, account: AccountInfo) -> Result<String, SessionError> {
        let claims = TokenClaims::new(account, self.codec.ttl());
        let token = self.codec.encode(&claims)?;

        let ttl = claims
            .remaining_ttl()
            .ok_or_else(|| SessionError::internal("token expired before it was bound"))?;
        self.store
            .bind(&claims.session_id, claims.account_id, ttl)
            .await?;

        metrics::record_token_issued(account.account_type.as_str());
        info!(
            session_id = %claims.session_id,
            account_id = claims.account_id,
            account_type = %claims.account_type,
            "Issued session token"
        );

        Ok(token)
    }

    /// Verify the token and require a live session for it.
    pub async fn validate(&self, token: &str) -> Result<AccessInfo, SessionError> {
        let result = self.validate_inner(token).await;
        metrics::record_validation(match &result {
            Ok(_) => "ok",
            Err(e) => e.kind(),
        });
        result
    }

    async fn validate_inner(&self, token: &str) -> Result<AccessInfo, SessionError> {
        let claims = self.decode(token)?;

        match self.store.lookup(&claims.session_id).await? {
            Some(bound) if bound == claims.account_id => Ok(AccessInfo::from(&claims)),
            Some(bound) => {
                warn!(
                    session_id = %claims.session_id,
                    claimed_account_id = claims.account_id,
                    bound_account_id = bound,
                    "Session bound to a different account"
                );
                Err(SessionError::SessionRevoked)
            }
            None => {
                debug!(session_id = %claims.session_id, "Session not live");
                Err(SessionError::SessionRevoked)
            }
        }
    }

    /// Like [`validate`](Self::validate) without the identity payload.
    pub async fn check(&self, token: &str) -> Result<(), SessionError> {
        self.validate(token).await.map(|_| ())
    }

    /// Replace a live session with a fresh one for the same account.
    ///
    /// The old binding is removed before the new one is written. If that
    /// second write fails the caller holds no live session and has to
    /// authenticate again.
    pub async fn refresh(&self, token: &str) -> Result<String, SessionError> {
        let result = self.refresh_inner(token).await;
        metrics::record_token_refreshed(match &result {
            Ok(_) => "ok",
            Err(e) => e.kind(),
        });
        result
    }

    async fn refresh_inner(&self, token: &str) -> Result<String, SessionError> {
        let claims = self.decode(token)?;

        if self.store.remove(&claims.session_id).await? == 0 {
            info!(session_id = %claims.session_id, "Refresh refused for dead session");
            return Err(SessionError::SessionRevoked);
        }

        let refreshed = self.issue(claims.account()).await.inspect_err(|e| {
            warn!(
                old_session_id = %claims.session_id,
                account_id = claims.account_id,
                error_kind = e.kind(),
                "Old session removed but replacement could not be issued"
            );
        })?;

        info!(old_session_id = %claims.session_id, "Refreshed session token");
        Ok(refreshed)
    }

    /// Terminate the session behind `token`.
    pub async fn revoke(&self, token: &str) -> Result<(), SessionError> {
        let result = self.revoke_inner(token).await;
        metrics::record_token_revoked(match &result {
            Ok(()) => "ok",
            Err(e) => e.kind(),
        });
        result
    }

    async fn revoke_inner(&self, token: &str) -> Result<(), SessionError> {
        let claims = self.decode(token)?;

        if self.store.remove(&claims.session_id).await? == 0 {
            return Err(SessionError::SessionRevoked);
        }

        info!(
            session_id = %claims.session_id,
            account_id = claims.account_id,
            "Revoked session"
        );
        Ok(())
    }

    /// Verify signature and expiry only, without consulting the store.
    pub fn decode(&self, token: &str) -> Result<TokenClaims, SessionError> {
        self.codec.decode(token).inspect_err(|e| {
            debug!(error_kind = e.kind(), "Token rejected");
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_common::{KvStoreConfig, MemoryStore};
    use secrecy::SecretString;
    use std::sync::Arc;
    use std::time::Duration;

    const TTL: Duration = Duration::from_secs(900);

    fn engine() -> TokenEngine {
        let kv = MemoryStore::new(KvStoreConfig::default().with_namespace("session"));
        TokenEngine::new(
            TokenCodec::new(&SecretString::from("engine-test-secret".to_string()), TTL),
            SessionStore::new(Arc::new(kv)),
        )
    }

    #[tokio::test]
    async fn test_issue_then_validate() {
        let engine = engine();
        let token = engine
            .issue(AccountInfo::new(42, AccountType::Premium))
            .await
            .unwrap();

        let access = engine.validate(&token).await.unwrap();
        assert_eq!(access.account_id, 42);
        assert_eq!(access.account_type, AccountType::Premium);
    }

    #[tokio::test]
    async fn test_revoke_twice() {
        let engine = engine();
        let token = engine
            .issue(AccountInfo::new(5, AccountType::Standard))
            .await
            .unwrap();

        engine.revoke(&token).await.unwrap();
        assert!(matches!(
            engine.revoke(&token).await,
            Err(SessionError::SessionRevoked)
        ));
    }

    #[tokio::test]
    async fn test_refresh_rotates_session() {
        let engine = engine();
        let old = engine
            .issue(AccountInfo::new(9, AccountType::Admin))
            .await
            .unwrap();

        let new = engine.refresh(&old).await.unwrap();
        let old_claims = engine.decode(&old).unwrap();
        let new_claims = engine.decode(&new).unwrap();

        assert_ne!(old_claims.session_id, new_claims.session_id);
        assert_eq!(new_claims.account(), old_claims.account());
        assert!(matches!(engine.check(&old).await, Err(SessionError::SessionRevoked)));
        assert!(engine.check(&new).await.is_ok());
    }
}
