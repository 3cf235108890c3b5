//! Database operations for the catalog `PostgreSQL`.
//!
//! ## Tables
//!
//! - `admins` - Back-office accounts (argon2 password, optional role)
//! - `customers` - Storefront accounts keyed by phone
//! - `roles` / `role_items` - Capability keys granted per role
//! - `orders` / `order_items` - Order headers and their line items
//!
//! # Migrations
//!
//! Migrations are stored in `crates/server/migrations/` and run via:
//! ```bash
//! cargo run -p energy-maximum-cli -- migrate
//! ```

pub mod admins;
pub mod customers;
pub mod orders;
pub mod principals;
pub mod roles;

use std::time::Duration;

use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

pub use admins::AdminRepository;
pub use customers::CustomerRepository;
pub use orders::PgOrderStore;
pub use principals::PgPrincipalStore;
pub use roles::RoleRepository;

/// Errors that can occur during repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Data in the database is corrupted or invalid.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// Requested entity was not found.
    #[error("not found")]
    NotFound,

    /// Constraint violation (e.g., unique username).
    #[error("constraint violation: {0}")]
    Conflict(String),

    /// A foreign key names a row that does not exist.
    #[error("{0} not found")]
    MissingReference(String),
}

impl RepositoryError {
    /// Map a unique violation to [`RepositoryError::Conflict`], anything else to `Database`.
    pub(crate) fn from_insert(e: sqlx::Error, what: &str) -> Self {
        if let sqlx::Error::Database(ref db_err) = e
            && db_err.is_unique_violation()
        {
            return Self::Conflict(format!("{what} already exists"));
        }
        Self::Database(e)
    }

    /// Map a foreign key violation to [`RepositoryError::MissingReference`], anything else to `Database`.
    pub(crate) fn from_reference(e: sqlx::Error, what: &str) -> Self {
        if let sqlx::Error::Database(ref db_err) = e
            && db_err.is_foreign_key_violation()
        {
            return Self::MissingReference(what.to_string());
        }
        Self::Database(e)
    }
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Arguments
///
/// * `database_url` - `PostgreSQL` connection string (wrapped in `SecretString`)
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}
