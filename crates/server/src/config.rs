//! Server configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `DATABASE_URL` - `PostgreSQL` connection string
//! - `ACCESS_TOKEN_PRIVATE_KEY` - base64 of the Ed25519 private key PEM
//! - `ACCESS_TOKEN_PUBLIC_KEY` - base64 of the Ed25519 public key PEM
//!
//! ## Optional
//! - `HOST` - Bind address (default: 127.0.0.1)
//! - `PORT` - Listen port (default: 8000)
//! - `ACCESS_TOKEN_EXPIRED_IN` - Token lifetime in minutes (default: 43200)
//! - `ACCESS_TOKEN_MAXAGE` - Cookie max-age in minutes (default: 43200)
//! - `PRINCIPAL_CACHE_TTL_SECS` - Principal cache life window (default: 10)
//! - `PRINCIPAL_CACHE_CAPACITY` - Max cached principals (default: 100000)
//! - `ORDER_DEADLINE_MS` - Deadline per order operation (default: 5000)
//! - `REQUEST_TIMEOUT_SECS` - Whole-request timeout (default: 30)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name
//! - `SENTRY_SAMPLE_RATE` / `SENTRY_TRACES_SAMPLE_RATE` - 0.0 to 1.0 (default: 1.0)

use std::net::{IpAddr, SocketAddr};
use std::str::FromStr;
use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};
use thiserror::Error;

use crate::services::token::{TokenCodec, TokenError};

const DEFAULT_TOKEN_MINUTES: &str = "43200";

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Server configuration.
///
/// Implements `Debug` manually to redact the database URL and key material.
#[derive(Clone)]
pub struct ServerConfig {
    /// `PostgreSQL` database connection URL (contains password)
    pub database_url: SecretString,
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Token signing and verification keys
    pub access_token: AccessTokenConfig,
    /// Principal cache life window
    pub principal_cache_ttl: Duration,
    /// Maximum number of cached principals
    pub principal_cache_capacity: u64,
    /// Deadline applied to each order processor operation
    pub order_deadline: Duration,
    /// Timeout applied to whole requests
    pub request_timeout: Duration,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment (e.g., "development", "staging", "production")
    pub sentry_environment: Option<String>,
    /// Sentry error sample rate (0.0 to 1.0)
    pub sentry_sample_rate: f32,
    /// Sentry traces sample rate for performance monitoring (0.0 to 1.0)
    pub sentry_traces_sample_rate: f32,
}

impl std::fmt::Debug for ServerConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServerConfig")
            .field("database_url", &"[REDACTED]")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("access_token", &self.access_token)
            .field("principal_cache_ttl", &self.principal_cache_ttl)
            .field("principal_cache_capacity", &self.principal_cache_capacity)
            .field("order_deadline", &self.order_deadline)
            .field("request_timeout", &self.request_timeout)
            .field("sentry_dsn", &self.sentry_dsn.as_ref().map(|_| "[SET]"))
            .field("sentry_environment", &self.sentry_environment)
            .finish_non_exhaustive()
    }
}

/// Access token keys and lifetimes.
#[derive(Clone)]
pub struct AccessTokenConfig {
    /// Base64 of the PKCS#8 private key PEM
    pub private_key: SecretString,
    /// Base64 of the SPKI public key PEM
    pub public_key: String,
    /// How long issued tokens stay valid
    pub ttl: Duration,
    /// `Max-Age` of the `access_token` cookie, in minutes
    pub max_age_minutes: i64,
}

impl std::fmt::Debug for AccessTokenConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AccessTokenConfig")
            .field("private_key", &"[REDACTED]")
            .field("public_key", &"[PUBLIC KEY]")
            .field("ttl", &self.ttl)
            .field("max_age_minutes", &self.max_age_minutes)
            .finish()
    }
}

impl AccessTokenConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let ttl_minutes: u64 = parse_env("ACCESS_TOKEN_EXPIRED_IN", DEFAULT_TOKEN_MINUTES)?;
        let max_age_minutes: i64 = parse_env("ACCESS_TOKEN_MAXAGE", DEFAULT_TOKEN_MINUTES)?;

        Ok(Self {
            private_key: get_required_secret("ACCESS_TOKEN_PRIVATE_KEY")?,
            public_key: get_required_env("ACCESS_TOKEN_PUBLIC_KEY")?,
            ttl: Duration::from_secs(ttl_minutes.saturating_mul(60)),
            max_age_minutes,
        })
    }

    /// Build the codec for these keys.
    ///
    /// # Errors
    ///
    /// Returns `TokenError::InvalidKey` if either key fails to decode.
    pub fn codec(&self) -> Result<TokenCodec, TokenError> {
        TokenCodec::from_base64_pem(self.private_key.expose_secret(), &self.public_key)
    }
}

impl ServerConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present. The
    /// token keys are decoded once here so bad key material fails start-up.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let database_url = get_required_secret("DATABASE_URL")?;
        let host: IpAddr = parse_env("HOST", "127.0.0.1")?;
        let port: u16 = parse_env("PORT", "8000")?;

        let access_token = AccessTokenConfig::from_env()?;
        access_token.codec().map_err(|e| {
            ConfigError::InvalidEnvVar("ACCESS_TOKEN_*".to_string(), e.to_string())
        })?;

        let principal_cache_ttl = Duration::from_secs(parse_env("PRINCIPAL_CACHE_TTL_SECS", "10")?);
        let principal_cache_capacity = parse_env("PRINCIPAL_CACHE_CAPACITY", "100000")?;
        let order_deadline = Duration::from_millis(parse_env("ORDER_DEADLINE_MS", "5000")?);
        let request_timeout = Duration::from_secs(parse_env("REQUEST_TIMEOUT_SECS", "30")?);

        let sentry_dsn = get_optional_env("SENTRY_DSN");
        let sentry_environment = get_optional_env("SENTRY_ENVIRONMENT");
        let sentry_sample_rate = get_optional_env("SENTRY_SAMPLE_RATE")
            .and_then(|s| s.parse().ok())
            .unwrap_or(1.0);
        let sentry_traces_sample_rate = get_optional_env("SENTRY_TRACES_SAMPLE_RATE")
            .and_then(|s| s.parse().ok())
            .unwrap_or(1.0);

        Ok(Self {
            database_url,
            host,
            port,
            access_token,
            principal_cache_ttl,
            principal_cache_capacity,
            order_deadline,
            request_timeout,
            sentry_dsn,
            sentry_environment,
            sentry_sample_rate,
            sentry_traces_sample_rate,
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

// =============================================================================
// Helpers
// =============================================================================

/// Get a required environment variable.
fn get_required_env(key: &str) -> Result<String, ConfigError> {
    std::env::var(key).map_err(|_| ConfigError::MissingEnvVar(key.to_string()))
}

/// Get a required environment variable as a secret.
fn get_required_secret(key: &str) -> Result<SecretString, ConfigError> {
    let value = get_required_env(key)?;
    Ok(SecretString::from(value))
}

/// Get an optional environment variable.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok()
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Parse an environment variable, falling back to `default` when unset.
fn parse_env<T>(key: &str, default: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    parse_value(key, &get_env_or_default(key, default))
}

fn parse_value<T>(key: &str, raw: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    raw.trim()
        .parse::<T>()
        .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
}
