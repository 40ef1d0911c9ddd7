//! Centralized configuration for the session service.
//!
//! All configuration is loaded from environment variables and validated
//! at startup. A missing signing secret or store endpoint stops the process
//! before it accepts any request.

use crate::error::SessionError;
use rust_common::{KvStoreConfig, TracingConfig};
use secrecy::{ExposeSecret, SecretString};
use std::env;
use std::time::Duration;

/// Lifetime of every issued token and of its session binding.
pub const ACCESS_TOKEN_TTL: Duration = Duration::from_secs(15 * 60);

/// Service name used in logs.
pub const SERVICE_NAME: &str = "session-service";

/// Session service configuration.
#[derive(Debug)]
pub struct Config {
    // Server settings
    /// Host to bind to
    pub host: String,
    /// Port to listen on
    pub port: u16,

    // Token settings
    /// Shared HS256 signing secret
    pub access_secret: SecretString,

    // Platform integration
    /// Session store configuration
    pub store: KvStoreConfig,
    /// Tracing configuration
    pub tracing: TracingConfig,
}

impl Config {
    /// Load configuration from the process environment, reading `.env` first.
    ///
    /// # Errors
    ///
    /// Returns an error if required variables are missing or invalid.
    pub fn from_env() -> Result<Self, SessionError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, SessionError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let host = lookup("HOST").unwrap_or_else(|| "0.0.0.0".to_string());
        let port = parse_var(&lookup, "PORT", 8000)?;

        let access_secret = require(&lookup, "ACCESS_SECRET")?;
        let redis_dsn = require(&lookup, "REDIS_DSN")?;

        let namespace = lookup("SESSION_NAMESPACE").unwrap_or_else(|| "session".to_string());
        let store = KvStoreConfig::default()
            .with_address(redis_dsn)
            .with_namespace(namespace);

        let log_level = lookup("LOG_LEVEL").unwrap_or_else(|| "info".to_string());
        let json_output = match lookup("LOG_FORMAT").as_deref() {
            None | Some("text") => false,
            Some("json") => true,
            Some(other) => {
                return Err(SessionError::config(format!(
                    "Invalid LOG_FORMAT: {other} (expected text or json)"
                )))
            }
        };
        let tracing = TracingConfig::default()
            .with_service_name(SERVICE_NAME)
            .with_log_level(log_level)
            .with_json_output(json_output);

        Ok(Self {
            host,
            port,
            access_secret: SecretString::from(access_secret),
            store,
            tracing,
        })
    }

    /// Socket address string for the gRPC listener.
    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Whether the signing secret is long enough for HS256.
    pub fn secret_is_short(&self) -> bool {
        self.access_secret.expose_secret().len() < 32
    }
}

/// Fetch a variable that must be present and non-blank.
fn require<F>(lookup: &F, name: &str) -> Result<String, SessionError>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(name) {
        Some(val) if !val.trim().is_empty() => Ok(val),
        _ => Err(SessionError::config(format!("{name} must be set"))),
    }
}

/// Parse environment variable with default value.
fn parse_var<F, T>(lookup: &F, name: &str, default: T) -> Result<T, SessionError>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(name) {
        Some(val) => val
            .parse()
            .map_err(|e| SessionError::config(format!("Invalid {}: {}", name, e))),
        None => Ok(default),
    }
}
