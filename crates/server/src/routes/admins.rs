//! Admin self-service and account status endpoints.
//!
//! Every status mutation drops the target's cached principal so the change
//! is seen by the next request instead of after the cache window.

use axum::{
    Json, Router,
    extract::{Path, State},
    routing::{delete, get, put},
};
use serde::Serialize;
use serde_json::{Value, json};

use energy_maximum_core::{AdminId, CapabilityKey, Principal, PrincipalKey};

use super::parse_id;
use crate::db::{AdminRepository, RoleRepository};
use crate::error::Result;
use crate::middleware::RequireAdmin;
use crate::state::AppState;

/// Build the admin router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/admin/me", get(me))
        .route("/api/admin/activate/{id}", put(activate))
        .route("/api/admin/deactivate/{id}", put(deactivate))
        .route("/api/admin/{id}", delete(remove))
}

#[derive(Debug, Serialize)]
struct MeResponse {
    principal: Principal,
    capabilities: Vec<CapabilityKey>,
}

async fn me(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
) -> Result<Json<MeResponse>> {
    let capabilities = match admin.role_id {
        Some(role_id) => {
            RoleRepository::new(state.pool())
                .capabilities_for(role_id)
                .await?
        }
        None => Vec::new(),
    };

    Ok(Json(MeResponse {
        principal: admin,
        capabilities,
    }))
}

async fn activate(
    State(state): State<AppState>,
    RequireAdmin(actor): RequireAdmin,
    Path(id): Path<i64>,
) -> Result<Json<Value>> {
    set_active(&state, &actor, parse_id(id)?, true).await
}

async fn deactivate(
    State(state): State<AppState>,
    RequireAdmin(actor): RequireAdmin,
    Path(id): Path<i64>,
) -> Result<Json<Value>> {
    set_active(&state, &actor, parse_id(id)?, false).await
}

#[tracing::instrument(skip(state, actor), fields(actor = %actor.key()))]
async fn set_active(
    state: &AppState,
    actor: &Principal,
    id: AdminId,
    active: bool,
) -> Result<Json<Value>> {
    AdminRepository::new(state.pool())
        .set_active(id, active)
        .await?;
    state.sessions().invalidate(&PrincipalKey::admin(id)).await;

    tracing::info!(admin_id = %id, active, "admin status changed");
    Ok(Json(json!({ "message": "success" })))
}

#[tracing::instrument(skip(state, actor), fields(actor = %actor.key()))]
async fn remove(
    State(state): State<AppState>,
    RequireAdmin(actor): RequireAdmin,
    Path(id): Path<i64>,
) -> Result<Json<Value>> {
    let id = parse_id(id)?;
    AdminRepository::new(state.pool()).soft_delete(id).await?;
    state.sessions().invalidate(&PrincipalKey::admin(id)).await;

    tracing::info!(admin_id = %id, "admin deleted");
    Ok(Json(json!({ "message": "success" })))
}
