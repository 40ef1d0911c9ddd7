use crate::error::SessionError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;
use uuid::Uuid;

/// Closed set of account types. Unknown names fail deserialization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AccountType {
    Standard,
    Premium,
    Admin,
}

impl AccountType {
    pub const ALL: [AccountType; 3] = [Self::Standard, Self::Premium, Self::Admin];

    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Standard => "STANDARD",
            Self::Premium => "PREMIUM",
            Self::Admin => "ADMIN",
        }
    }
}

impl fmt::Display for AccountType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Identity supplied by the caller when a token is issued.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AccountInfo {
    pub account_id: u64,
    pub account_type: AccountType,
}

impl AccountInfo {
    pub fn new(account_id: u64, account_type: AccountType) -> Self {
        AccountInfo {
            account_id,
            account_type,
        }
    }
}

/// Signed token payload.
///
/// `account_id` travels as a decimal string so that verifiers whose JSON
/// numbers are doubles never round it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TokenClaims {
    pub session_id: String,
    #[serde(with = "decimal_u64")]
    pub account_id: u64,
    pub account_type: AccountType,
    pub authorized: bool,
    pub iat: i64,
    pub exp: i64,
}

impl TokenClaims {
    /// Claims for a brand new session, issued now.
    pub fn new(account: AccountInfo, ttl: Duration) -> Self {
        Self::issued_at(
            account,
            Uuid::new_v4().to_string(),
            chrono::Utc::now().timestamp(),
            ttl,
        )
    }

    pub fn issued_at(account: AccountInfo, session_id: String, iat: i64, ttl: Duration) -> Self {
        TokenClaims {
            session_id,
            account_id: account.account_id,
            account_type: account.account_type,
            authorized: true,
            iat,
            exp: iat + ttl_secs(ttl),
        }
    }

    pub fn account(&self) -> AccountInfo {
        AccountInfo::new(self.account_id, self.account_type)
    }

    #[cfg(test)]
    fn is_expired(&self) -> bool {
        self.exp < chrono::Utc::now().timestamp()
    }

    /// Time left before `exp`, rounded to whole seconds.
    ///
    /// Returns `None` once the token has expired.
    pub fn remaining_ttl(&self) -> Option<Duration> {
        let remaining = self.exp - chrono::Utc::now().timestamp();
        u64::try_from(remaining)
            .ok()
            .filter(|secs| *secs > 0)
            .map(Duration::from_secs)
    }

    /// Reject claims that were not produced by this service's issuer.
    pub fn check_consistency(&self, ttl: Duration) -> Result<(), SessionError> {
        if !self.authorized {
            return Err(SessionError::malformed("authorized flag not set"));
        }
        if Uuid::parse_str(&self.session_id).is_err() {
            return Err(SessionError::malformed("session id is not a UUID"));
        }
        let lifetime = self
            .exp
            .checked_sub(self.iat)
            .ok_or_else(|| SessionError::malformed("lifetime out of range"))?;
        if lifetime != ttl_secs(ttl) {
            return Err(SessionError::malformed(format!(
                "lifetime {}s does not match configured {}s",
                lifetime,
                ttl_secs(ttl)
            )));
        }
        Ok(())
    }
}

fn ttl_secs(ttl: Duration) -> i64 {
    i64::try_from(ttl.as_secs()).unwrap_or(i64::MAX)
}

mod decimal_u64 {
    use serde::{de, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &u64, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(value)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u64, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse()
            .map_err(|_| de::Error::custom(format!("account id {raw:?} is not a decimal u64")))
    }
}
