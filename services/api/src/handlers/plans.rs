//! Plan endpoints

use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use store::{
    StoreError,
    models::{
        NewPlan, Plan, PlanChanges,
        role::{ADMIN, DEVELOPER},
    },
    validation::validate_required,
};
use tracing::info;

use crate::{
    error::ApiResult,
    extract::ValidJson,
    handlers::{Deleted, require_changes},
    middleware::Principal,
    policy::{authorize_plan, authorize_user, require_owner, require_roles},
    state::AppState,
};

/// Load a plan through its owner's path
async fn user_plan(
    state: &AppState,
    principal: &Principal,
    user_id: i64,
    plan_id: i64,
) -> ApiResult<Plan> {
    state.store.get_user(user_id).await?;
    let plan = state.store.get_plan(plan_id).await?;
    if plan.user_id != user_id {
        return Err(StoreError::not_found("plan", plan_id).into());
    }
    require_owner(principal, user_id)?;
    Ok(plan)
}

/// Get all plans
pub async fn list_plans(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
) -> ApiResult<impl IntoResponse> {
    require_roles(&principal, &[ADMIN, DEVELOPER])?;
    Ok(Json(state.store.list_plans().await?))
}

/// Get a plan by ID
pub async fn get_plan(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(plan_id): Path<i64>,
) -> ApiResult<impl IntoResponse> {
    Ok(Json(authorize_plan(&state, &principal, plan_id).await?))
}

/// Plans of one user
pub async fn user_plans(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(user_id): Path<i64>,
) -> ApiResult<impl IntoResponse> {
    authorize_user(&state, &principal, user_id).await?;
    Ok(Json(state.store.user_plans(user_id).await?))
}

pub async fn create_plan(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(user_id): Path<i64>,
    ValidJson(payload): ValidJson<NewPlan>,
) -> ApiResult<impl IntoResponse> {
    authorize_user(&state, &principal, user_id).await?;
    validate_required("goal", &payload.goal)?;

    let plan = state.store.create_plan(user_id, payload).await?;
    info!("Created plan {} for user {}", plan.id, user_id);

    Ok((StatusCode::CREATED, Json(plan)))
}

pub async fn get_user_plan(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path((user_id, plan_id)): Path<(i64, i64)>,
) -> ApiResult<impl IntoResponse> {
    Ok(Json(user_plan(&state, &principal, user_id, plan_id).await?))
}

pub async fn update_plan(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path((user_id, plan_id)): Path<(i64, i64)>,
    ValidJson(changes): ValidJson<PlanChanges>,
) -> ApiResult<impl IntoResponse> {
    user_plan(&state, &principal, user_id, plan_id).await?;
    require_changes(changes.is_empty())?;
    if let Some(goal) = &changes.goal {
        validate_required("goal", goal)?;
    }

    Ok(Json(state.store.update_plan(plan_id, changes).await?))
}

/// Delete a plan with its days and sessions
pub async fn delete_plan(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path((user_id, plan_id)): Path<(i64, i64)>,
) -> ApiResult<impl IntoResponse> {
    user_plan(&state, &principal, user_id, plan_id).await?;

    state.store.delete_plan(plan_id).await?;
    info!("Deleted plan {}", plan_id);

    Ok(Json(Deleted::new("plan", plan_id)))
}
