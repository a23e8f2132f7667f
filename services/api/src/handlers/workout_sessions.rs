//! Workout session endpoints

use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use store::{
    StoreError,
    models::{
        NewWorkoutSession, WorkoutSession, WorkoutSessionChanges,
        role::{ADMIN, DEVELOPER},
    },
};
use tracing::info;

use crate::{
    error::ApiResult,
    extract::ValidJson,
    handlers::{Deleted, check_exercise_link, require_changes},
    middleware::Principal,
    policy::{authorize_day, day_owner, require_owner, require_roles, session_owner},
    state::AppState,
};

/// Load a session through its day's path, returning it with its owner
async fn day_session(
    state: &AppState,
    principal: &Principal,
    day_id: i64,
    session_id: i64,
) -> ApiResult<(WorkoutSession, i64)> {
    let day = state.store.get_day(day_id).await?;
    let session = state.store.get_workout_session(session_id).await?;
    if session.day_id != day_id {
        return Err(StoreError::not_found("workout session", session_id).into());
    }
    let owner_id = day_owner(state, &day).await?;
    require_owner(principal, owner_id)?;
    Ok((session, owner_id))
}

/// Get all workout sessions
pub async fn list_workout_sessions(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
) -> ApiResult<impl IntoResponse> {
    require_roles(&principal, &[ADMIN, DEVELOPER])?;
    Ok(Json(state.store.list_workout_sessions().await?))
}

/// Get a workout session by ID
pub async fn get_workout_session(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(session_id): Path<i64>,
) -> ApiResult<impl IntoResponse> {
    let session = state.store.get_workout_session(session_id).await?;
    require_owner(&principal, session_owner(&state, &session).await?)?;
    Ok(Json(session))
}

/// Sessions of one day
pub async fn day_workout_sessions(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(day_id): Path<i64>,
) -> ApiResult<impl IntoResponse> {
    authorize_day(&state, &principal, day_id).await?;
    Ok(Json(state.store.day_workout_sessions(day_id).await?))
}

pub async fn create_workout_session(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(day_id): Path<i64>,
    ValidJson(payload): ValidJson<NewWorkoutSession>,
) -> ApiResult<impl IntoResponse> {
    let day = authorize_day(&state, &principal, day_id).await?;
    let owner_id = day_owner(&state, &day).await?;
    check_exercise_link(&state, payload.exercise_ref()?, owner_id).await?;

    let session = state.store.create_workout_session(day_id, payload).await?;
    info!("Created workout session {} in day {}", session.id, day_id);

    Ok((StatusCode::CREATED, Json(session)))
}

pub async fn get_day_workout_session(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path((day_id, session_id)): Path<(i64, i64)>,
) -> ApiResult<impl IntoResponse> {
    let (session, _) = day_session(&state, &principal, day_id, session_id).await?;
    Ok(Json(session))
}

pub async fn update_workout_session(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path((day_id, session_id)): Path<(i64, i64)>,
    ValidJson(changes): ValidJson<WorkoutSessionChanges>,
) -> ApiResult<impl IntoResponse> {
    let (_, owner_id) = day_session(&state, &principal, day_id, session_id).await?;
    require_changes(changes.is_empty())?;
    if let Some(link) = changes.exercise_ref()? {
        check_exercise_link(&state, link, owner_id).await?;
    }

    Ok(Json(
        state
            .store
            .update_workout_session(session_id, changes)
            .await?,
    ))
}

pub async fn delete_workout_session(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path((day_id, session_id)): Path<(i64, i64)>,
) -> ApiResult<impl IntoResponse> {
    day_session(&state, &principal, day_id, session_id).await?;

    state.store.delete_workout_session(session_id).await?;
    info!("Deleted workout session {}", session_id);

    Ok(Json(Deleted::new("workout session", session_id)))
}
