//! Performance record model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::exercise_ref::{ExerciseRef, ref_change};
use crate::{error::StoreResult, numeric};

/// Record entity, owned by a user
#[derive(Debug, Clone, Serialize)]
pub struct Record {
    pub id: i64,
    pub user_id: i64,
    pub difficulty: i32,
    pub sets: i32,
    pub reps: i32,
    pub rest: f64,
    pub weight_lifted: Option<f64>,
    pub user_weight: f64,
    pub location: String,
    pub notes: Option<String>,
    pub date: DateTime<Utc>,
    #[serde(flatten)]
    pub exercise: ExerciseRef,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewRecord {
    #[serde(deserialize_with = "numeric::i32")]
    pub difficulty: i32,
    #[serde(deserialize_with = "numeric::i32")]
    pub sets: i32,
    #[serde(deserialize_with = "numeric::i32")]
    pub reps: i32,
    #[serde(deserialize_with = "numeric::f64")]
    pub rest: f64,
    #[serde(default, deserialize_with = "numeric::opt_f64")]
    pub weight_lifted: Option<f64>,
    #[serde(deserialize_with = "numeric::f64")]
    pub user_weight: f64,
    pub location: String,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default, deserialize_with = "numeric::opt_i64")]
    pub exercise_id: Option<i64>,
    #[serde(default, deserialize_with = "numeric::opt_i64")]
    pub custom_exercise_id: Option<i64>,
}

impl NewRecord {
    pub fn exercise_ref(&self) -> StoreResult<ExerciseRef> {
        ExerciseRef::from_ids(self.exercise_id, self.custom_exercise_id)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RecordChanges {
    #[serde(default, deserialize_with = "numeric::opt_i64")]
    pub exercise_id: Option<i64>,
    #[serde(default, deserialize_with = "numeric::opt_i64")]
    pub custom_exercise_id: Option<i64>,
    #[serde(default, deserialize_with = "numeric::opt_i32")]
    pub difficulty: Option<i32>,
    #[serde(default, deserialize_with = "numeric::opt_i32")]
    pub sets: Option<i32>,
    #[serde(default, deserialize_with = "numeric::opt_i32")]
    pub reps: Option<i32>,
    #[serde(default, deserialize_with = "numeric::opt_f64")]
    pub rest: Option<f64>,
    #[serde(default, deserialize_with = "numeric::opt_f64")]
    pub weight_lifted: Option<f64>,
    #[serde(default, deserialize_with = "numeric::opt_f64")]
    pub user_weight: Option<f64>,
    pub location: Option<String>,
    pub notes: Option<String>,
}

impl RecordChanges {
    pub fn is_empty(&self) -> bool {
        self.exercise_id.is_none()
            && self.custom_exercise_id.is_none()
            && self.difficulty.is_none()
            && self.sets.is_none()
            && self.reps.is_none()
            && self.rest.is_none()
            && self.weight_lifted.is_none()
            && self.user_weight.is_none()
            && self.location.is_none()
            && self.notes.is_none()
    }

    pub fn exercise_ref(&self) -> StoreResult<Option<ExerciseRef>> {
        ref_change(self.exercise_id, self.custom_exercise_id)
    }

    pub fn apply(self, record: &mut Record) -> StoreResult<()> {
        if let Some(link) = self.exercise_ref()? {
            record.exercise = link;
        }
        if let Some(difficulty) = self.difficulty {
            record.difficulty = difficulty;
        }
        if let Some(sets) = self.sets {
            record.sets = sets;
        }
        if let Some(reps) = self.reps {
            record.reps = reps;
        }
        if let Some(rest) = self.rest {
            record.rest = rest;
        }
        if let Some(weight_lifted) = self.weight_lifted {
            record.weight_lifted = Some(weight_lifted);
        }
        if let Some(user_weight) = self.user_weight {
            record.user_weight = user_weight;
        }
        if let Some(location) = self.location {
            record.location = location;
        }
        if let Some(notes) = self.notes {
            record.notes = Some(notes);
        }
        Ok(())
    }
}
