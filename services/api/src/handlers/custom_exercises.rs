//! Custom exercise endpoints

use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use media::MediaOwner;
use store::{
    StoreError,
    models::{
        CustomExercise, ExerciseChanges, NewExercise,
        role::{ADMIN, DEVELOPER},
    },
};
use tracing::info;

use crate::{
    error::ApiResult,
    extract::{MediaPayload, ValidJson},
    handlers::{Deleted, require_changes},
    middleware::Principal,
    policy::{authorize_user, require_owner, require_roles},
    state::AppState,
};

/// Load a custom exercise through its owner's path
async fn user_custom_exercise(
    state: &AppState,
    principal: &Principal,
    user_id: i64,
    exercise_id: i64,
) -> ApiResult<CustomExercise> {
    state.store.get_user(user_id).await?;
    let exercise = state.store.get_custom_exercise(exercise_id).await?;
    if exercise.user_id != user_id {
        return Err(StoreError::not_found("custom exercise", exercise_id).into());
    }
    require_owner(principal, user_id)?;
    Ok(exercise)
}

/// Get all custom exercises
pub async fn list_custom_exercises(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
) -> ApiResult<impl IntoResponse> {
    require_roles(&principal, &[ADMIN, DEVELOPER])?;
    Ok(Json(state.store.list_custom_exercises().await?))
}

/// Get a custom exercise by ID
pub async fn get_custom_exercise(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(exercise_id): Path<i64>,
) -> ApiResult<impl IntoResponse> {
    let exercise = state.store.get_custom_exercise(exercise_id).await?;
    require_owner(&principal, exercise.user_id)?;
    Ok(Json(exercise))
}

/// Custom exercises of one user
pub async fn user_custom_exercises(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(user_id): Path<i64>,
) -> ApiResult<impl IntoResponse> {
    authorize_user(&state, &principal, user_id).await?;
    Ok(Json(state.store.user_custom_exercises(user_id).await?))
}

pub async fn create_custom_exercise(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(user_id): Path<i64>,
    ValidJson(payload): ValidJson<NewExercise>,
) -> ApiResult<impl IntoResponse> {
    authorize_user(&state, &principal, user_id).await?;
    payload.validate()?;
    if let Some(url) = &payload.media_file_url {
        state
            .media
            .check_reference(MediaOwner::CustomExercise { user_id }, url)?;
    }

    let exercise = state
        .store
        .create_custom_exercise(user_id, payload)
        .await?;
    info!("Created custom exercise {} for user {}", exercise.id, user_id);

    Ok((StatusCode::CREATED, Json(exercise)))
}

pub async fn get_user_custom_exercise(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path((user_id, exercise_id)): Path<(i64, i64)>,
) -> ApiResult<impl IntoResponse> {
    Ok(Json(
        user_custom_exercise(&state, &principal, user_id, exercise_id).await?,
    ))
}

pub async fn update_custom_exercise(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path((user_id, exercise_id)): Path<(i64, i64)>,
    ValidJson(changes): ValidJson<ExerciseChanges>,
) -> ApiResult<impl IntoResponse> {
    let exercise = user_custom_exercise(&state, &principal, user_id, exercise_id).await?;
    require_changes(changes.is_empty())?;
    changes.validate()?;
    if let Some(url) = &changes.media_file_url {
        state
            .media
            .check_reference(MediaOwner::CustomExercise { user_id }, url)?;
    }

    let media_changed = changes.media_file_url.is_some();
    let updated = state
        .store
        .update_custom_exercise(exercise_id, changes)
        .await?;
    if media_changed && updated.media_file_url != exercise.media_file_url {
        state
            .media
            .release_best_effort(
                MediaOwner::CustomExercise { user_id },
                exercise.media_file_url.as_deref(),
            )
            .await;
    }

    Ok(Json(updated))
}

/// Delete a custom exercise; sessions and records pointing at it lose the link
pub async fn delete_custom_exercise(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path((user_id, exercise_id)): Path<(i64, i64)>,
) -> ApiResult<impl IntoResponse> {
    let exercise = user_custom_exercise(&state, &principal, user_id, exercise_id).await?;

    if let Some(url) = exercise.media_file_url.as_deref() {
        state
            .media
            .release(MediaOwner::CustomExercise { user_id }, url)
            .await?;
    }
    state.store.delete_custom_exercise(exercise_id).await?;
    info!("Deleted custom exercise {}", exercise_id);

    Ok(Json(Deleted::new("custom exercise", exercise_id)))
}

/// Upload or link new media for a custom exercise
pub async fn put_custom_exercise_media(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path((user_id, exercise_id)): Path<(i64, i64)>,
    MediaPayload(source): MediaPayload,
) -> ApiResult<impl IntoResponse> {
    let exercise = user_custom_exercise(&state, &principal, user_id, exercise_id).await?;

    let url = state
        .media
        .resolve(MediaOwner::CustomExercise { user_id }, source)
        .await?;
    let updated = state
        .store
        .set_custom_exercise_media(exercise_id, Some(url))
        .await?;

    if updated.media_file_url != exercise.media_file_url {
        state
            .media
            .release_best_effort(
                MediaOwner::CustomExercise { user_id },
                exercise.media_file_url.as_deref(),
            )
            .await;
    }

    Ok(Json(updated))
}

pub async fn delete_custom_exercise_media(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path((user_id, exercise_id)): Path<(i64, i64)>,
) -> ApiResult<impl IntoResponse> {
    let exercise = user_custom_exercise(&state, &principal, user_id, exercise_id).await?;

    if let Some(url) = exercise.media_file_url.as_deref() {
        state
            .media
            .release(MediaOwner::CustomExercise { user_id }, url)
            .await?;
    }

    Ok(Json(
        state
            .store
            .set_custom_exercise_media(exercise_id, None)
            .await?,
    ))
}
