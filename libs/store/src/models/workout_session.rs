//! Workout session model

use serde::{Deserialize, Serialize};

use super::exercise_ref::{ExerciseRef, ref_change};
use crate::{error::StoreResult, numeric};

/// Workout session entity, owned by a day
#[derive(Debug, Clone, Serialize)]
pub struct WorkoutSession {
    pub id: i64,
    pub day_id: i64,
    pub sets: i32,
    pub reps: i32,
    pub rest: f64,
    pub weight_lifted: Option<f64>,
    #[serde(flatten)]
    pub exercise: ExerciseRef,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewWorkoutSession {
    #[serde(deserialize_with = "numeric::i32")]
    pub sets: i32,
    #[serde(deserialize_with = "numeric::i32")]
    pub reps: i32,
    #[serde(deserialize_with = "numeric::f64")]
    pub rest: f64,
    #[serde(default, deserialize_with = "numeric::opt_f64")]
    pub weight_lifted: Option<f64>,
    #[serde(default, deserialize_with = "numeric::opt_i64")]
    pub exercise_id: Option<i64>,
    #[serde(default, deserialize_with = "numeric::opt_i64")]
    pub custom_exercise_id: Option<i64>,
}

impl NewWorkoutSession {
    pub fn exercise_ref(&self) -> StoreResult<ExerciseRef> {
        ExerciseRef::from_ids(self.exercise_id, self.custom_exercise_id)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct WorkoutSessionChanges {
    #[serde(default, deserialize_with = "numeric::opt_i32")]
    pub sets: Option<i32>,
    #[serde(default, deserialize_with = "numeric::opt_i32")]
    pub reps: Option<i32>,
    #[serde(default, deserialize_with = "numeric::opt_f64")]
    pub rest: Option<f64>,
    #[serde(default, deserialize_with = "numeric::opt_f64")]
    pub weight_lifted: Option<f64>,
    #[serde(default, deserialize_with = "numeric::opt_i64")]
    pub exercise_id: Option<i64>,
    #[serde(default, deserialize_with = "numeric::opt_i64")]
    pub custom_exercise_id: Option<i64>,
}

impl WorkoutSessionChanges {
    pub fn is_empty(&self) -> bool {
        self.sets.is_none()
            && self.reps.is_none()
            && self.rest.is_none()
            && self.weight_lifted.is_none()
            && self.exercise_id.is_none()
            && self.custom_exercise_id.is_none()
    }

    /// New exercise link, if the payload names one
    pub fn exercise_ref(&self) -> StoreResult<Option<ExerciseRef>> {
        ref_change(self.exercise_id, self.custom_exercise_id)
    }

    pub fn apply(self, session: &mut WorkoutSession) -> StoreResult<()> {
        if let Some(link) = self.exercise_ref()? {
            session.exercise = link;
        }
        if let Some(sets) = self.sets {
            session.sets = sets;
        }
        if let Some(reps) = self.reps {
            session.reps = reps;
        }
        if let Some(rest) = self.rest {
            session.rest = rest;
        }
        if let Some(weight_lifted) = self.weight_lifted {
            session.weight_lifted = Some(weight_lifted);
        }
        Ok(())
    }
}
