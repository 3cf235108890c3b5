//! Session resolution error types.

use thiserror::Error;

use crate::db::RepositoryError;
use crate::services::principal_cache::CacheError;
use crate::services::token::TokenError;

/// Message sent when no credential is present.
pub const NOT_LOGGED_IN: &str = "You are not logged in";

/// Message sent when the token is valid but its principal is gone.
pub const PRINCIPAL_GONE: &str = "the user belonging to this token no longer exists";

/// Errors that can occur while resolving a request's principal.
///
/// Every variant rejects the request before the handler runs.
#[derive(Debug, Error)]
pub enum AuthError {
    /// No bearer header and no `access_token` cookie.
    #[error("You are not logged in")]
    Unauthenticated,

    /// Signature, expiry, or format check failed.
    #[error("{0}")]
    InvalidToken(#[from] TokenError),

    /// The token belongs to the other audience.
    #[error("this resource is not available to {0} accounts")]
    WrongAudience(energy_maximum_core::PrincipalKind),

    /// No active, non-deleted row backs the token's subject.
    #[error("the user belonging to this token no longer exists")]
    PrincipalGone,

    /// The principal cache returned an unusable value.
    #[error("principal cache error: {0}")]
    Cache(#[from] CacheError),

    /// The principal lookup failed.
    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),
}

impl AuthError {
    /// Whether this is a server-side failure rather than a rejected credential.
    #[must_use]
    pub const fn is_internal(&self) -> bool {
        matches!(self, Self::Cache(_) | Self::Repository(_))
    }
}
