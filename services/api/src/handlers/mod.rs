//! Resource controllers
//!
//! Every handler loads its target (and the target's ancestors) before
//! checking permissions, so a missing resource is a 404 for every caller.

pub mod custom_exercises;
pub mod days;
pub mod exercises;
pub mod health;
pub mod plans;
pub mod records;
pub mod roles;
pub mod users;
pub mod workout_sessions;

use serde::Serialize;
use store::{StoreError, models::ExerciseRef};

use crate::{
    error::{ApiError, ApiResult},
    state::AppState,
};

/// Body returned by delete endpoints
#[derive(Debug, Serialize)]
pub struct Deleted {
    pub message: String,
}

impl Deleted {
    pub fn new(entity: &str, id: i64) -> Self {
        Self {
            message: format!("Deleted {} {}", entity, id),
        }
    }
}

/// Reject update payloads that carry no allow-listed key
pub fn require_changes(is_empty: bool) -> ApiResult<()> {
    if is_empty {
        Err(ApiError::BadRequest("No fields to update".to_string()))
    } else {
        Ok(())
    }
}

/// Check that an exercise link points at an existing catalog exercise, or
/// at a custom exercise owned by `owner_id`
pub async fn check_exercise_link(
    state: &AppState,
    link: ExerciseRef,
    owner_id: i64,
) -> ApiResult<()> {
    match link {
        ExerciseRef::Catalog(id) => {
            state.store.get_exercise(id).await?;
        }
        ExerciseRef::Custom(id) => {
            let custom = state.store.get_custom_exercise(id).await?;
            if custom.user_id != owner_id {
                return Err(StoreError::not_found("custom exercise", id).into());
            }
        }
        ExerciseRef::None => {}
    }
    Ok(())
}
