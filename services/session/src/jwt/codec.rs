//! HS256 token codec.
//!
//! The declared algorithm is read straight from the header segment before
//! `jsonwebtoken` sees the token, so `none` and every non-HS256 algorithm are
//! reported as [`SessionError::UnexpectedAlgorithm`] instead of a generic
//! parse failure.

use crate::error::SessionError;
use crate::jwt::claims::TokenClaims;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine as _;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use std::time::Duration;

/// The only accepted signing algorithm.
pub const ALGORITHM: Algorithm = Algorithm::HS256;
const ALGORITHM_NAME: &str = "HS256";

#[derive(Deserialize)]
struct DeclaredHeader {
    alg: String,
}

pub struct TokenCodec {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    ttl: Duration,
}

impl TokenCodec {
    pub fn new(secret: &SecretString, ttl: Duration) -> Self {
        let secret = secret.expose_secret().as_bytes();

        let mut validation = Validation::new(ALGORITHM);
        validation.leeway = 0;
        validation.validate_exp = true;
        validation.validate_aud = false;
        validation.set_required_spec_claims(&["exp"]);

        TokenCodec {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            validation,
            ttl,
        }
    }

    /// Lifetime stamped into every token this codec issues.
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub fn encode(&self, claims: &TokenClaims) -> Result<String, SessionError> {
        encode(&Header::new(ALGORITHM), claims, &self.encoding_key)
            .map_err(|e| SessionError::internal(format!("token encoding failed: {e}")))
    }

    /// Verify algorithm, signature and expiry, then return the typed claims.
    pub fn decode(&self, token: &str) -> Result<TokenClaims, SessionError> {
        let alg = Self::declared_algorithm(token)?;
        if alg != ALGORITHM_NAME {
            return Err(SessionError::UnexpectedAlgorithm(alg));
        }

        let data = decode::<TokenClaims>(token, &self.decoding_key, &self.validation)?;
        data.claims.check_consistency(self.ttl)?;
        Ok(data.claims)
    }

    fn declared_algorithm(token: &str) -> Result<String, SessionError> {
        let mut segments = token.split('.');
        let header = match (segments.next(), segments.next(), segments.next(), segments.next()) {
            (Some(header), Some(_), Some(_), None) if !header.is_empty() => header,
            _ => return Err(SessionError::malformed("expected three dot-separated segments")),
        };

        let raw = URL_SAFE_NO_PAD
            .decode(header)
            .map_err(|e| SessionError::malformed(format!("header is not base64url: {e}")))?;
        let declared: DeclaredHeader = serde_json::from_slice(&raw)
            .map_err(|e| SessionError::malformed(format!("header is not valid JSON: {e}")))?;

        Ok(declared.alg)
    }
}
