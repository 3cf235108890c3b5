//! Admin account management commands.
//!
//! # Usage
//!
//! ```bash
//! em-cli admin create -u operator -p 'correct horse battery' --role-id 2
//! ```
//!
//! # Environment Variables
//!
//! - `DATABASE_URL` - `PostgreSQL` connection string
//! - `ADMIN_PASSWORD` - Password, if not passed with `-p`

use sqlx::PgPool;
use thiserror::Error;

use energy_maximum_core::{AdminId, RoleId};
use energy_maximum_server::db::{AdminRepository, RepositoryError};
use energy_maximum_server::services::password::{PasswordError, hash_password};

const MIN_PASSWORD_LENGTH: usize = 8;

/// Errors that can occur during admin operations.
#[derive(Debug, Error)]
pub enum AdminError {
    /// Required environment variable is missing.
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(&'static str),

    /// Database connection error.
    #[error("Database connection error: {0}")]
    Database(#[from] sqlx::Error),

    /// Insert failed.
    #[error("{0}")]
    Repository(#[from] RepositoryError),

    /// Hashing failed.
    #[error("{0}")]
    Password(#[from] PasswordError),

    /// Invalid username or password.
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

/// Create a new admin account.
///
/// # Returns
///
/// The id of the created admin.
///
/// # Errors
///
/// Returns `AdminError` if validation fails, the username is taken, or the
/// database is unreachable.
pub async fn create_user(
    username: &str,
    password: &str,
    is_superuser: bool,
    role_id: Option<i64>,
) -> Result<AdminId, AdminError> {
    let username = username.trim();
    validate(username, password)?;

    let database_url =
        super::database_url().ok_or(AdminError::MissingEnvVar("DATABASE_URL"))?;

    tracing::info!("Connecting to database...");
    let pool = PgPool::connect(&database_url).await?;

    let password_hash = hash_password(password)?;
    let id = AdminRepository::new(&pool)
        .create(username, &password_hash, is_superuser, role_id.map(RoleId::new))
        .await?;

    tracing::info!(admin_id = %id, username, is_superuser, "Admin created");
    Ok(id)
}

fn validate(username: &str, password: &str) -> Result<(), AdminError> {
    if username.is_empty() {
        return Err(AdminError::InvalidInput("username is empty".to_string()));
    }
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(AdminError::InvalidInput(format!(
            "password must be at least {MIN_PASSWORD_LENGTH} characters"
        )));
    }
    Ok(())
}
