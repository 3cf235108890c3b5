//! Principal resolution for protected endpoints.
//!
//! # Flow
//!
//! 1. Take the credential from `Authorization` (`Bearer <token>` or a bare
//!    token) or else from the `access_token` cookie.
//! 2. Verify it with the [`TokenCodec`].
//! 3. Reject subjects of the wrong audience.
//! 4. Serve the principal from the [`PrincipalCache`], or on a miss load it
//!    from the store (active, non-deleted rows only) and cache it.
//! 5. After a miss, record the visit on a spawned task. Failures are logged
//!    and never change the outcome.
//!
//! Cached principals may outlive a deactivation for up to one cache life
//! window unless the mutation path calls [`SessionResolver::invalidate`].

mod error;
#[cfg(test)]
pub(crate) mod memory;

use std::future::Future;
use std::sync::Arc;

use axum::http::HeaderMap;
use axum::http::header::{AUTHORIZATION, COOKIE};
use cookie::Cookie;

use energy_maximum_core::{Principal, PrincipalKey, PrincipalKind};

pub use error::{AuthError, NOT_LOGGED_IN, PRINCIPAL_GONE};

use super::principal_cache::PrincipalCache;
use super::token::TokenCodec;
use crate::db::RepositoryError;

/// Name of the cookie that carries the access token.
pub const ACCESS_TOKEN_COOKIE: &str = "access_token";

/// Source of truth for principals.
pub trait PrincipalStore: Send + Sync + 'static {
    /// Load the principal for `key` if its row is active and not deleted.
    fn find_active(
        &self,
        key: PrincipalKey,
    ) -> impl Future<Output = Result<Option<Principal>, RepositoryError>> + Send;

    /// Stamp the row's last visit time.
    fn touch_last_visit(
        &self,
        key: PrincipalKey,
    ) -> impl Future<Output = Result<(), RepositoryError>> + Send;
}

/// Resolves credentials into principals, cache first.
pub struct SessionResolver<S> {
    codec: TokenCodec,
    cache: PrincipalCache,
    store: Arc<S>,
}

impl<S> Clone for SessionResolver<S> {
    fn clone(&self) -> Self {
        Self {
            codec: self.codec.clone(),
            cache: self.cache.clone(),
            store: Arc::clone(&self.store),
        }
    }
}

impl<S: PrincipalStore> SessionResolver<S> {
    /// Create a resolver.
    #[must_use]
    pub fn new(codec: TokenCodec, cache: PrincipalCache, store: S) -> Self {
        Self {
            codec,
            cache,
            store: Arc::new(store),
        }
    }

    /// The codec used to verify credentials.
    #[must_use]
    pub const fn codec(&self) -> &TokenCodec {
        &self.codec
    }

    /// The principal cache consulted before the store.
    #[must_use]
    pub const fn cache(&self) -> &PrincipalCache {
        &self.cache
    }

    /// The backing principal store.
    #[must_use]
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Resolve the credential carried by `headers` for `audience`.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Unauthenticated` when no credential is present,
    /// otherwise whatever [`SessionResolver::resolve`] returns.
    pub async fn resolve_headers(
        &self,
        headers: &HeaderMap,
        audience: PrincipalKind,
    ) -> Result<Principal, AuthError> {
        let credential = extract_credential(headers).ok_or(AuthError::Unauthenticated)?;
        self.resolve(&credential, audience).await
    }

    /// Resolve a raw token for `audience`.
    ///
    /// # Errors
    ///
    /// - `AuthError::InvalidToken` if verification fails
    /// - `AuthError::WrongAudience` if the subject is of the other kind
    /// - `AuthError::PrincipalGone` if no active row backs the subject
    /// - `AuthError::Cache` / `AuthError::Repository` on internal failures
    #[tracing::instrument(skip_all, fields(audience = %audience, principal = tracing::field::Empty))]
    pub async fn resolve(
        &self,
        credential: &str,
        audience: PrincipalKind,
    ) -> Result<Principal, AuthError> {
        let key = self.codec.verify(credential)?;
        tracing::Span::current().record("principal", tracing::field::display(&key));

        if key.kind() != audience {
            return Err(AuthError::WrongAudience(key.kind()));
        }

        if let Some(principal) = self.cache.get(&key).await? {
            tracing::debug!("principal cache hit");
            return Ok(principal);
        }

        let principal = self
            .store
            .find_active(key)
            .await?
            .ok_or(AuthError::PrincipalGone)?;

        self.cache.set(&key, &principal).await?;
        self.spawn_touch(key);

        Ok(principal)
    }

    /// Forget any cached snapshot for `key`.
    pub async fn invalidate(&self, key: &PrincipalKey) {
        self.cache.invalidate(key).await;
    }

    fn spawn_touch(&self, key: PrincipalKey) {
        let store = Arc::clone(&self.store);
        tokio::spawn(async move {
            if let Err(e) = store.touch_last_visit(key).await {
                tracing::warn!(principal = %key, error = %e, "failed to record last visit");
            }
        });
    }
}

/// Pull the access token out of request headers.
///
/// `Authorization` wins when it yields a token; the `access_token` cookie is
/// the fallback.
#[must_use]
pub fn extract_credential(headers: &HeaderMap) -> Option<String> {
    let from_header = headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|raw| {
            let mut fields = raw.split_whitespace();
            match fields.next()? {
                "Bearer" => fields.next(),
                token => Some(token),
            }
        });

    if let Some(token) = from_header {
        return Some(token.to_owned());
    }

    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(Cookie::split_parse)
        .filter_map(Result::ok)
        .find(|c| c.name() == ACCESS_TOKEN_COOKIE && !c.value().is_empty())
        .map(|c| c.value().to_owned())
}
