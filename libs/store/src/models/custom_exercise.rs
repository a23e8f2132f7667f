//! User-authored exercise model

use serde::Serialize;
use sqlx::FromRow;

use super::exercise::{ExerciseFields, ExerciseFieldsMut};

/// Custom exercise, owned by a user; the title is unique per user
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct CustomExercise {
    pub id: i64,
    pub user_id: i64,
    pub title: String,
    pub description: Option<String>,
    pub category: String,
    pub muscle_group: String,
    pub equipment: Option<String>,
    pub media_file_url: Option<String>,
}

impl ExerciseFields for CustomExercise {
    fn fields(&mut self) -> ExerciseFieldsMut<'_> {
        ExerciseFieldsMut {
            title: &mut self.title,
            description: &mut self.description,
            category: &mut self.category,
            muscle_group: &mut self.muscle_group,
            equipment: &mut self.equipment,
            media_file_url: &mut self.media_file_url,
        }
    }
}
