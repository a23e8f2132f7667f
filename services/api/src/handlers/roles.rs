//! Role administration endpoints

use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use store::{
    models::{
        NewRole, Role, RoleChanges,
        role::{ADMIN, DEVELOPER, SEEDED_ROLES},
    },
    validation::validate_name,
};
use tracing::info;

use crate::{
    error::{ApiError, ApiResult},
    extract::ValidJson,
    handlers::{Deleted, require_changes},
    middleware::Principal,
    policy::require_roles,
    state::AppState,
};

/// Seeded roles may not be renamed or deleted
fn require_mutable(role: &Role) -> ApiResult<()> {
    if SEEDED_ROLES.contains(&role.name.as_str()) {
        return Err(ApiError::Conflict(format!(
            "Role {} is built in and cannot be changed",
            role.name
        )));
    }
    Ok(())
}

/// Get all roles
pub async fn list_roles(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
) -> ApiResult<impl IntoResponse> {
    require_roles(&principal, &[ADMIN, DEVELOPER])?;
    Ok(Json(state.store.list_roles().await?))
}

/// Get a role by ID
pub async fn get_role(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(role_id): Path<i64>,
) -> ApiResult<impl IntoResponse> {
    let role = state.store.get_role(role_id).await?;
    require_roles(&principal, &[ADMIN, DEVELOPER])?;
    Ok(Json(role))
}

/// Users holding a role
pub async fn role_users(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(role_id): Path<i64>,
) -> ApiResult<impl IntoResponse> {
    state.store.get_role(role_id).await?;
    require_roles(&principal, &[ADMIN, DEVELOPER])?;
    Ok(Json(state.store.role_users(role_id).await?))
}

pub async fn create_role(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    ValidJson(payload): ValidJson<NewRole>,
) -> ApiResult<impl IntoResponse> {
    require_roles(&principal, &[ADMIN])?;
    validate_name("role_name", &payload.role_name)?;

    let role = state.store.create_role(payload.role_name.trim()).await?;
    info!("Created role {}", role.name);

    Ok((StatusCode::CREATED, Json(role)))
}

pub async fn rename_role(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(role_id): Path<i64>,
    ValidJson(changes): ValidJson<RoleChanges>,
) -> ApiResult<impl IntoResponse> {
    let role = state.store.get_role(role_id).await?;
    require_roles(&principal, &[ADMIN])?;
    require_mutable(&role)?;
    require_changes(changes.role_name.is_none())?;

    let name = changes.role_name.unwrap_or_default();
    validate_name("role_name", &name)?;

    Ok(Json(state.store.rename_role(role_id, name.trim()).await?))
}

/// Delete a role; memberships go with it
pub async fn delete_role(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(role_id): Path<i64>,
) -> ApiResult<impl IntoResponse> {
    let role = state.store.get_role(role_id).await?;
    require_roles(&principal, &[ADMIN])?;
    require_mutable(&role)?;

    state.store.delete_role(role_id).await?;
    info!("Deleted role {}", role.name);

    Ok(Json(Deleted::new("role", role_id)))
}
