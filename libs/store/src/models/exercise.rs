//! Catalog exercise model, plus the payloads shared with custom exercises

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::error::StoreResult;
use crate::validation::validate_required;

/// Catalog exercise, managed by admins and developers
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Exercise {
    pub id: i64,
    pub title: String,
    pub description: Option<String>,
    pub category: String,
    pub muscle_group: String,
    pub equipment: Option<String>,
    pub media_file_url: Option<String>,
}

/// Creation payload for catalog and custom exercises
#[derive(Debug, Clone, Deserialize)]
pub struct NewExercise {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    pub category: String,
    pub muscle_group: String,
    #[serde(default)]
    pub equipment: Option<String>,
    #[serde(default)]
    pub media_file_url: Option<String>,
}

impl NewExercise {
    pub fn validate(&self) -> StoreResult<()> {
        validate_required("title", &self.title)?;
        validate_required("category", &self.category)?;
        validate_required("muscle_group", &self.muscle_group)
    }
}

/// Update payload for catalog and custom exercises
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ExerciseChanges {
    pub title: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub muscle_group: Option<String>,
    pub equipment: Option<String>,
    pub media_file_url: Option<String>,
}

impl ExerciseChanges {
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.category.is_none()
            && self.muscle_group.is_none()
            && self.equipment.is_none()
            && self.media_file_url.is_none()
    }

    /// Required text fields may be replaced but not blanked
    pub fn validate(&self) -> StoreResult<()> {
        for (field, value) in [
            ("title", &self.title),
            ("category", &self.category),
            ("muscle_group", &self.muscle_group),
        ] {
            if let Some(value) = value {
                validate_required(field, value)?;
            }
        }
        Ok(())
    }
}

/// Fields common to both exercise kinds, so one update routine serves both
pub(crate) trait ExerciseFields {
    fn fields(&mut self) -> ExerciseFieldsMut<'_>;
}

pub(crate) struct ExerciseFieldsMut<'a> {
    pub title: &'a mut String,
    pub description: &'a mut Option<String>,
    pub category: &'a mut String,
    pub muscle_group: &'a mut String,
    pub equipment: &'a mut Option<String>,
    pub media_file_url: &'a mut Option<String>,
}

impl ExerciseChanges {
    pub(crate) fn apply_to(self, target: &mut impl ExerciseFields) {
        let fields = target.fields();
        if let Some(title) = self.title {
            *fields.title = title;
        }
        if let Some(description) = self.description {
            *fields.description = Some(description);
        }
        if let Some(category) = self.category {
            *fields.category = category;
        }
        if let Some(muscle_group) = self.muscle_group {
            *fields.muscle_group = muscle_group;
        }
        if let Some(equipment) = self.equipment {
            *fields.equipment = Some(equipment);
        }
        if let Some(media_file_url) = self.media_file_url {
            *fields.media_file_url = Some(media_file_url);
        }
    }
}

impl ExerciseFields for Exercise {
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
