//! Password logins that issue access tokens.

use axum::{
    Json, Router,
    extract::State,
    http::header::SET_COOKIE,
    response::IntoResponse,
    routing::post,
};
use cookie::{Cookie, SameSite};
use serde::{Deserialize, Serialize};

use energy_maximum_core::CapabilityKey;

use crate::db::{AdminRepository, CustomerRepository, RoleRepository};
use crate::error::{AppError, Result};
use crate::models::LoginRecord;
use crate::services::password::verify_password;
use crate::services::session::ACCESS_TOKEN_COOKIE;
use crate::state::AppState;

const INVALID_CREDENTIALS: &str = "invalid credentials";

/// Build the login router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/admin/auth", post(admin_login))
        .route("/api/customer/login", post(customer_login))
}

#[derive(Debug, Deserialize)]
struct AdminLoginRequest {
    username: String,
    password: String,
}

#[derive(Debug, Deserialize)]
struct CustomerLoginRequest {
    phone: String,
    password: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct AdminLoginResponse {
    access_token: String,
    module_item_keys: Vec<CapabilityKey>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct CustomerLoginResponse {
    access_token: String,
}

#[tracing::instrument(skip_all, fields(username = %body.username))]
async fn admin_login(
    State(state): State<AppState>,
    Json(body): Json<AdminLoginRequest>,
) -> Result<impl IntoResponse> {
    let record = AdminRepository::new(state.pool())
        .find_login(body.username.trim())
        .await?;
    let record = check_password(record, &body.password)?;

    let module_item_keys = match record.role_id() {
        Some(role_id) => {
            RoleRepository::new(state.pool())
                .capabilities_for(role_id)
                .await?
        }
        None => Vec::new(),
    };

    let access_token = issue(&state, &record)?;
    tracing::info!(principal = %record.principal.key(), "admin logged in");

    Ok((
        [(SET_COOKIE, session_cookie(&state, &access_token))],
        Json(AdminLoginResponse {
            access_token,
            module_item_keys,
        }),
    ))
}

#[tracing::instrument(skip_all)]
async fn customer_login(
    State(state): State<AppState>,
    Json(body): Json<CustomerLoginRequest>,
) -> Result<impl IntoResponse> {
    let record = CustomerRepository::new(state.pool())
        .find_login(body.phone.trim())
        .await?;
    let record = check_password(record, &body.password)?;

    let access_token = issue(&state, &record)?;
    tracing::info!(principal = %record.principal.key(), "customer logged in");

    Ok((
        [(SET_COOKIE, session_cookie(&state, &access_token))],
        Json(CustomerLoginResponse { access_token }),
    ))
}

/// Unknown accounts and wrong passwords get the same answer.
fn check_password(record: Option<LoginRecord>, password: &str) -> Result<LoginRecord> {
    let record = record.ok_or_else(|| AppError::Unauthorized(INVALID_CREDENTIALS.to_string()))?;
    verify_password(password, &record.password_hash)?;
    Ok(record)
}

fn issue(state: &AppState, record: &LoginRecord) -> Result<String> {
    let ttl = state.config().access_token.ttl;
    Ok(state.codec().issue(&record.principal.key(), ttl)?)
}

fn session_cookie(state: &AppState, token: &str) -> String {
    let max_age = state.config().access_token.max_age_minutes;
    Cookie::build((ACCESS_TOKEN_COOKIE, token.to_owned()))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .max_age(cookie::time::Duration::minutes(max_age))
        .build()
        .to_string()
}

#[cfg(test)]
mod tests {
    use energy_maximum_core::{CustomerId, Principal};

    use super::*;
    use crate::services::password::hash_password;

    fn record(password: &str) -> LoginRecord {
        LoginRecord {
            principal: Principal::customer(CustomerId::new(4)),
            password_hash: hash_password(password).unwrap(),
        }
    }

    #[test]
    fn test_check_password_accepts_match() {
        let accepted = check_password(Some(record("s3cret")), "s3cret").unwrap();
        assert_eq!(accepted.principal.id, 4);
    }

    #[test]
    fn test_unknown_account_and_wrong_password_look_alike() {
        let unknown = check_password(None, "s3cret").unwrap_err();
        let wrong = check_password(Some(record("s3cret")), "guess").unwrap_err();

        assert_eq!(unknown.to_string(), wrong.to_string());
        assert!(matches!(unknown, AppError::Unauthorized(_)));
    }
}
