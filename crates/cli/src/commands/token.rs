//! Access token commands.
//!
//! # Usage
//!
//! ```bash
//! em-cli token issue --kind admin --id 1
//! ```
//!
//! # Environment Variables
//!
//! - `ACCESS_TOKEN_PRIVATE_KEY` - base64 of the Ed25519 private key PEM
//! - `ACCESS_TOKEN_PUBLIC_KEY` - base64 of the Ed25519 public key PEM

use std::time::Duration;

use clap::ValueEnum;
use thiserror::Error;

use energy_maximum_core::{AdminId, CustomerId, PrincipalKey};
use energy_maximum_server::services::token::{TokenCodec, TokenError};

/// Principal kind accepted on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SubjectKind {
    Admin,
    Customer,
}

/// Errors that can occur while issuing a token.
#[derive(Debug, Error)]
pub enum IssueError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(&'static str),

    #[error("Invalid id: {0}")]
    InvalidId(i64),

    #[error(transparent)]
    Token(#[from] TokenError),
}

/// Print a freshly signed token for the principal to stdout.
///
/// # Errors
///
/// Returns `IssueError` if keys are missing or invalid, or the id is not positive.
pub fn issue(kind: SubjectKind, id: i64, ttl_minutes: u64) -> Result<(), IssueError> {
    dotenvy::dotenv().ok();

    let private_key = std::env::var("ACCESS_TOKEN_PRIVATE_KEY")
        .map_err(|_| IssueError::MissingEnvVar("ACCESS_TOKEN_PRIVATE_KEY"))?;
    let public_key = std::env::var("ACCESS_TOKEN_PUBLIC_KEY")
        .map_err(|_| IssueError::MissingEnvVar("ACCESS_TOKEN_PUBLIC_KEY"))?;
    let codec = TokenCodec::from_base64_pem(&private_key, &public_key)?;

    let subject = subject(kind, id)?;
    let token = codec.issue(&subject, Duration::from_secs(ttl_minutes.saturating_mul(60)))?;

    tracing::info!(%subject, ttl_minutes, "Token issued");
    #[allow(clippy::print_stdout)]
    {
        println!("{token}");
    }
    Ok(())
}

fn subject(kind: SubjectKind, id: i64) -> Result<PrincipalKey, IssueError> {
    if id <= 0 {
        return Err(IssueError::InvalidId(id));
    }
    Ok(match kind {
        SubjectKind::Admin => PrincipalKey::admin(AdminId::new(id)),
        SubjectKind::Customer => PrincipalKey::customer(CustomerId::new(id)),
    })
}
