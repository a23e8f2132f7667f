//! Catalog exercise endpoints
//!
//! Any authenticated user may read the catalog; only admins and developers
//! write to it.

use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use media::MediaOwner;
use store::models::{
    ExerciseChanges, NewExercise,
    role::{ADMIN, DEVELOPER},
};
use tracing::info;

use crate::{
    error::ApiResult,
    extract::{MediaPayload, ValidJson},
    handlers::{Deleted, require_changes},
    middleware::Principal,
    policy::require_roles,
    state::AppState,
};

const CATALOG_WRITERS: &[&str] = &[ADMIN, DEVELOPER];

/// Get all catalog exercises
pub async fn list_exercises(State(state): State<AppState>) -> ApiResult<impl IntoResponse> {
    Ok(Json(state.store.list_exercises().await?))
}

/// Get a catalog exercise by ID
pub async fn get_exercise(
    State(state): State<AppState>,
    Path(exercise_id): Path<i64>,
) -> ApiResult<impl IntoResponse> {
    Ok(Json(state.store.get_exercise(exercise_id).await?))
}

pub async fn create_exercise(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    ValidJson(payload): ValidJson<NewExercise>,
) -> ApiResult<impl IntoResponse> {
    require_roles(&principal, CATALOG_WRITERS)?;
    payload.validate()?;
    if let Some(url) = &payload.media_file_url {
        state
            .media
            .check_reference(MediaOwner::CatalogExercise, url)?;
    }

    let exercise = state.store.create_exercise(payload).await?;
    info!("Created catalog exercise {}", exercise.id);

    Ok((StatusCode::CREATED, Json(exercise)))
}

pub async fn update_exercise(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(exercise_id): Path<i64>,
    ValidJson(changes): ValidJson<ExerciseChanges>,
) -> ApiResult<impl IntoResponse> {
    let exercise = state.store.get_exercise(exercise_id).await?;
    require_roles(&principal, CATALOG_WRITERS)?;
    require_changes(changes.is_empty())?;
    changes.validate()?;
    if let Some(url) = &changes.media_file_url {
        state
            .media
            .check_reference(MediaOwner::CatalogExercise, url)?;
    }

    let media_changed = changes.media_file_url.is_some();
    let updated = state.store.update_exercise(exercise_id, changes).await?;
    if media_changed && updated.media_file_url != exercise.media_file_url {
        state
            .media
            .release_best_effort(
                MediaOwner::CatalogExercise,
                exercise.media_file_url.as_deref(),
            )
            .await;
    }

    Ok(Json(updated))
}

/// Delete a catalog exercise that nothing references
pub async fn delete_exercise(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(exercise_id): Path<i64>,
) -> ApiResult<impl IntoResponse> {
    let exercise = state.store.get_exercise(exercise_id).await?;
    require_roles(&principal, CATALOG_WRITERS)?;

    // row first: a referenced exercise is refused and keeps its media
    state.store.delete_exercise(exercise_id).await?;
    state
        .media
        .release_best_effort(
            MediaOwner::CatalogExercise,
            exercise.media_file_url.as_deref(),
        )
        .await;
    info!("Deleted catalog exercise {}", exercise_id);

    Ok(Json(Deleted::new("exercise", exercise_id)))
}

/// Upload or link new media for a catalog exercise
pub async fn put_exercise_media(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(exercise_id): Path<i64>,
    MediaPayload(source): MediaPayload,
) -> ApiResult<impl IntoResponse> {
    let exercise = state.store.get_exercise(exercise_id).await?;
    require_roles(&principal, CATALOG_WRITERS)?;

    let url = state
        .media
        .resolve(MediaOwner::CatalogExercise, source)
        .await?;
    let updated = state
        .store
        .set_exercise_media(exercise_id, Some(url))
        .await?;

    if updated.media_file_url != exercise.media_file_url {
        state
            .media
            .release_best_effort(
                MediaOwner::CatalogExercise,
                exercise.media_file_url.as_deref(),
            )
            .await;
    }

    Ok(Json(updated))
}

pub async fn delete_exercise_media(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(exercise_id): Path<i64>,
) -> ApiResult<impl IntoResponse> {
    let exercise = state.store.get_exercise(exercise_id).await?;
    require_roles(&principal, CATALOG_WRITERS)?;

    if let Some(url) = exercise.media_file_url.as_deref() {
        state.media.release(MediaOwner::CatalogExercise, url).await?;
    }

    Ok(Json(state.store.set_exercise_media(exercise_id, None).await?))
}
