//! Authentication extractors.
//!
//! Provides extractors that resolve the request's access token into a
//! [`Principal`] of the required audience. A rejected credential ends the
//! request before the handler runs.
//!
//! # Example
//!
//! ```rust,ignore
//! async fn me(RequireAdmin(admin): RequireAdmin) -> impl IntoResponse {
//!     format!("Hello, admin {}!", admin.id)
//! }
//! ```

use axum::{
    Json,
    extract::FromRequestParts,
    http::{StatusCode, request::Parts},
    response::{IntoResponse, Response},
};
use serde_json::json;
use tracing::Span;

use energy_maximum_core::{Principal, PrincipalKind};

use crate::error::set_sentry_user;
use crate::services::session::AuthError;
use crate::state::AppState;

/// Extractor that requires an administrator token.
pub struct RequireAdmin(pub Principal);

/// Extractor that requires a customer token.
pub struct RequireCustomer(pub Principal);

/// Error returned when the request's credential is rejected.
#[derive(Debug)]
pub struct AuthRejection(pub AuthError);

impl From<AuthError> for AuthRejection {
    fn from(err: AuthError) -> Self {
        Self(err)
    }
}

impl IntoResponse for AuthRejection {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            AuthError::Unauthenticated | AuthError::InvalidToken(_) => StatusCode::UNAUTHORIZED,
            AuthError::WrongAudience(_) | AuthError::PrincipalGone => StatusCode::FORBIDDEN,
            AuthError::Cache(_) | AuthError::Repository(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let message = if self.0.is_internal() {
            let event_id = sentry::capture_error(&self.0);
            tracing::error!(
                error = %self.0,
                sentry_event_id = %event_id,
                "Principal resolution failed"
            );
            "Internal server error".to_string()
        } else {
            tracing::debug!(reason = %self.0, "credential rejected");
            self.0.to_string()
        };

        (status, Json(json!({ "status": "fail", "message": message }))).into_response()
    }
}

impl FromRequestParts<AppState> for RequireAdmin {
    type Rejection = AuthRejection;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        resolve(parts, state, PrincipalKind::Admin).await.map(Self)
    }
}

impl FromRequestParts<AppState> for RequireCustomer {
    type Rejection = AuthRejection;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        resolve(parts, state, PrincipalKind::Customer).await.map(Self)
    }
}

async fn resolve(
    parts: &mut Parts,
    state: &AppState,
    audience: PrincipalKind,
) -> Result<Principal, AuthRejection> {
    // Already resolved by an earlier extractor on this request
    if let Some(principal) = parts.extensions.get::<Principal>()
        && principal.kind == audience
    {
        return Ok(principal.clone());
    }

    let principal = state
        .sessions()
        .resolve_headers(&parts.headers, audience)
        .await?;

    let key = principal.key();
    Span::current().record("principal", tracing::field::display(&key));
    set_sentry_user(&key);
    parts.extensions.insert(principal.clone());

    Ok(principal)
}
