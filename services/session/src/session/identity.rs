//! Identity lookups against a presented token.
//!
//! Both lookups go through the same [`LivenessPolicy`], so a revoked token
//! can never answer one identity query while being refused by another.

use crate::error::SessionError;
use crate::jwt::AccountType;
use crate::session::engine::{AccessInfo, TokenEngine};
use std::sync::Arc;

/// Whether identity queries must find a live session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LivenessPolicy {
    /// Route through full validation; revoked sessions answer nothing.
    #[default]
    RequireLiveSession,
    /// Trust a verified signature alone. For offline inspection only.
    SignatureOnly,
}

pub struct IdentityQuery {
    engine: Arc<TokenEngine>,
    policy: LivenessPolicy,
}

impl IdentityQuery {
    pub fn new(engine: Arc<TokenEngine>, policy: LivenessPolicy) -> Self {
        IdentityQuery { engine, policy }
    }

    pub async fn account_id(&self, token: &str) -> Result<u64, SessionError> {
        Ok(self.resolve(token).await?.account_id)
    }

    pub async fn account_type(&self, token: &str) -> Result<AccountType, SessionError> {
        Ok(self.resolve(token).await?.account_type)
    }

    async fn resolve(&self, token: &str) -> Result<AccessInfo, SessionError> {
        match self.policy {
            LivenessPolicy::RequireLiveSession => self.engine.validate(token).await,
            LivenessPolicy::SignatureOnly => {
                let claims = self.engine.decode(token)?;
                Ok(AccessInfo::from(&claims))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::jwt::{AccountInfo, TokenCodec};
    use crate::storage::SessionStore;
    use rust_common::MemoryStore;
    use secrecy::SecretString;
    use std::time::Duration;

    fn engine() -> Arc<TokenEngine> {
        Arc::new(TokenEngine::new(
            TokenCodec::new(
                &SecretString::from("identity-test-secret".to_string()),
                Duration::from_secs(900),
            ),
            SessionStore::new(Arc::new(MemoryStore::default())),
        ))
    }

    #[test]
    fn test_default_policy_requires_live_session() {
        assert_eq!(LivenessPolicy::default(), LivenessPolicy::RequireLiveSession);
    }

    #[tokio::test]
    async fn test_live_session_answers_both_queries() {
        let engine = engine();
        let token = engine
            .issue(AccountInfo::new(42, AccountType::Premium))
            .await
            .unwrap();
        let query = IdentityQuery::new(engine, LivenessPolicy::RequireLiveSession);

        assert_eq!(query.account_id(&token).await.unwrap(), 42);
        assert_eq!(query.account_type(&token).await.unwrap(), AccountType::Premium);
    }

    #[tokio::test]
    async fn test_revoked_session_refused_uniformly() {
        let engine = engine();
        let token = engine
            .issue(AccountInfo::new(42, AccountType::Premium))
            .await
            .unwrap();
        engine.revoke(&token).await.unwrap();
        let query = IdentityQuery::new(Arc::clone(&engine), LivenessPolicy::RequireLiveSession);

        assert!(matches!(query.account_id(&token).await, Err(SessionError::SessionRevoked)));
        assert!(matches!(query.account_type(&token).await, Err(SessionError::SessionRevoked)));
    }

    #[tokio::test]
    async fn test_signature_only_ignores_store() {
        let engine = engine();
        let token = engine
            .issue(AccountInfo::new(8, AccountType::Admin))
            .await
            .unwrap();
        engine.revoke(&token).await.unwrap();
        let query = IdentityQuery::new(engine, LivenessPolicy::SignatureOnly);

        assert_eq!(query.account_id(&token).await.unwrap(), 8);
        assert_eq!(query.account_type(&token).await.unwrap(), AccountType::Admin);
        assert!(query.account_id("not.a.token").await.is_err());
    }
}
