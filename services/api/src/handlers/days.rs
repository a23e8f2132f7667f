//! Day endpoints

use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use store::{
    StoreError,
    models::{
        Day, DayChanges, NewDay,
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
    policy::{authorize_day, authorize_plan, require_owner, require_roles},
    state::AppState,
};

/// Load a day through its plan's path
async fn plan_day(
    state: &AppState,
    principal: &Principal,
    plan_id: i64,
    day_id: i64,
) -> ApiResult<Day> {
    let plan = state.store.get_plan(plan_id).await?;
    let day = state.store.get_day(day_id).await?;
    if day.plan_id != plan_id {
        return Err(StoreError::not_found("day", day_id).into());
    }
    require_owner(principal, plan.user_id)?;
    Ok(day)
}

/// Get all days
pub async fn list_days(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
) -> ApiResult<impl IntoResponse> {
    require_roles(&principal, &[ADMIN, DEVELOPER])?;
    Ok(Json(state.store.list_days().await?))
}

/// Get a day by ID
pub async fn get_day(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(day_id): Path<i64>,
) -> ApiResult<impl IntoResponse> {
    Ok(Json(authorize_day(&state, &principal, day_id).await?))
}

/// Days of one plan
pub async fn plan_days(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(plan_id): Path<i64>,
) -> ApiResult<impl IntoResponse> {
    authorize_plan(&state, &principal, plan_id).await?;
    Ok(Json(state.store.plan_days(plan_id).await?))
}

pub async fn create_day(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(plan_id): Path<i64>,
    ValidJson(payload): ValidJson<NewDay>,
) -> ApiResult<impl IntoResponse> {
    authorize_plan(&state, &principal, plan_id).await?;
    validate_required("title", &payload.title)?;

    let day = state.store.create_day(plan_id, payload).await?;
    info!("Created day {} in plan {}", day.id, plan_id);

    Ok((StatusCode::CREATED, Json(day)))
}

pub async fn get_plan_day(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path((plan_id, day_id)): Path<(i64, i64)>,
) -> ApiResult<impl IntoResponse> {
    Ok(Json(plan_day(&state, &principal, plan_id, day_id).await?))
}

pub async fn update_day(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path((plan_id, day_id)): Path<(i64, i64)>,
    ValidJson(changes): ValidJson<DayChanges>,
) -> ApiResult<impl IntoResponse> {
    plan_day(&state, &principal, plan_id, day_id).await?;
    require_changes(changes.is_empty())?;
    if let Some(title) = &changes.title {
        validate_required("title", title)?;
    }

    Ok(Json(state.store.update_day(day_id, changes).await?))
}

/// Delete a day with its sessions
pub async fn delete_day(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path((plan_id, day_id)): Path<(i64, i64)>,
) -> ApiResult<impl IntoResponse> {
    plan_day(&state, &principal, plan_id, day_id).await?;

    state.store.delete_day(day_id).await?;
    info!("Deleted day {}", day_id);

    Ok(Json(Deleted::new("day", day_id)))
}
