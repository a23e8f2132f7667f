//! Record endpoints

use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use store::{
    StoreError,
    models::{
        NewRecord, Record, RecordChanges,
        role::{ADMIN, DEVELOPER},
    },
    validation::validate_required,
};
use tracing::info;

use crate::{
    error::ApiResult,
    extract::ValidJson,
    handlers::{Deleted, check_exercise_link, require_changes},
    middleware::Principal,
    policy::{authorize_user, require_owner, require_roles},
    state::AppState,
};

/// Load a record through its owner's path
async fn user_record(
    state: &AppState,
    principal: &Principal,
    user_id: i64,
    record_id: i64,
) -> ApiResult<Record> {
    state.store.get_user(user_id).await?;
    let record = state.store.get_record(record_id).await?;
    if record.user_id != user_id {
        return Err(StoreError::not_found("record", record_id).into());
    }
    require_owner(principal, user_id)?;
    Ok(record)
}

/// Get all records
pub async fn list_records(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
) -> ApiResult<impl IntoResponse> {
    require_roles(&principal, &[ADMIN, DEVELOPER])?;
    Ok(Json(state.store.list_records().await?))
}

/// Get a record by ID
pub async fn get_record(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(record_id): Path<i64>,
) -> ApiResult<impl IntoResponse> {
    let record = state.store.get_record(record_id).await?;
    require_roles(&principal, &[ADMIN, DEVELOPER])?;
    Ok(Json(record))
}

/// Records of one user
pub async fn user_records(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(user_id): Path<i64>,
) -> ApiResult<impl IntoResponse> {
    authorize_user(&state, &principal, user_id).await?;
    Ok(Json(state.store.user_records(user_id).await?))
}

pub async fn create_record(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(user_id): Path<i64>,
    ValidJson(payload): ValidJson<NewRecord>,
) -> ApiResult<impl IntoResponse> {
    authorize_user(&state, &principal, user_id).await?;
    validate_required("location", &payload.location)?;
    check_exercise_link(&state, payload.exercise_ref()?, user_id).await?;

    let record = state.store.create_record(user_id, payload).await?;
    info!("Created record {} for user {}", record.id, user_id);

    Ok((StatusCode::CREATED, Json(record)))
}

pub async fn get_user_record(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path((user_id, record_id)): Path<(i64, i64)>,
) -> ApiResult<impl IntoResponse> {
    Ok(Json(user_record(&state, &principal, user_id, record_id).await?))
}

pub async fn update_record(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path((user_id, record_id)): Path<(i64, i64)>,
    ValidJson(changes): ValidJson<RecordChanges>,
) -> ApiResult<impl IntoResponse> {
    user_record(&state, &principal, user_id, record_id).await?;
    require_changes(changes.is_empty())?;
    if let Some(location) = &changes.location {
        validate_required("location", location)?;
    }
    if let Some(link) = changes.exercise_ref()? {
        check_exercise_link(&state, link, user_id).await?;
    }

    Ok(Json(state.store.update_record(record_id, changes).await?))
}

pub async fn delete_record(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path((user_id, record_id)): Path<(i64, i64)>,
) -> ApiResult<impl IntoResponse> {
    user_record(&state, &principal, user_id, record_id).await?;

    state.store.delete_record(record_id).await?;
    info!("Deleted record {}", record_id);

    Ok(Json(Deleted::new("record", record_id)))
}
