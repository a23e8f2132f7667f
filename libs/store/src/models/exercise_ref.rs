//! Link from a workout session or record to the exercise it performs

use serde::{Serialize, Serializer};

use crate::error::{StoreError, StoreResult};

/// At most one of a catalog exercise or a user-authored custom exercise
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ExerciseRef {
    Catalog(i64),
    Custom(i64),
    #[default]
    None,
}

impl ExerciseRef {
    /// Build from the two nullable columns / payload keys
    ///
    /// Supplying both is rejected.
    pub fn from_ids(exercise_id: Option<i64>, custom_exercise_id: Option<i64>) -> StoreResult<Self> {
        match (exercise_id, custom_exercise_id) {
            (Some(_), Some(_)) => Err(StoreError::Validation(
                "Only one of exercise_id or custom_exercise_id may be set".to_string(),
            )),
            (Some(id), None) => Ok(ExerciseRef::Catalog(id)),
            (None, Some(id)) => Ok(ExerciseRef::Custom(id)),
            (None, None) => Ok(ExerciseRef::None),
        }
    }

    pub fn exercise_id(&self) -> Option<i64> {
        match self {
            ExerciseRef::Catalog(id) => Some(*id),
            _ => None,
        }
    }

    pub fn custom_exercise_id(&self) -> Option<i64> {
        match self {
            ExerciseRef::Custom(id) => Some(*id),
            _ => None,
        }
    }

    /// Drop a link to the given custom exercise
    pub fn clear_custom(&mut self, custom_exercise_id: i64) {
        if *self == ExerciseRef::Custom(custom_exercise_id) {
            *self = ExerciseRef::None;
        }
    }
}

/// Flattened into the owning entity as `exercise_id` / `custom_exercise_id`
impl Serialize for ExerciseRef {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        #[derive(Serialize)]
        struct Columns {
            exercise_id: Option<i64>,
            custom_exercise_id: Option<i64>,
        }

        Columns {
            exercise_id: self.exercise_id(),
            custom_exercise_id: self.custom_exercise_id(),
        }
        .serialize(serializer)
    }
}

/// Pending change to an exercise link carried by an update payload
///
/// `None` leaves the link untouched.
pub fn ref_change(
    exercise_id: Option<i64>,
    custom_exercise_id: Option<i64>,
) -> StoreResult<Option<ExerciseRef>> {
    match ExerciseRef::from_ids(exercise_id, custom_exercise_id)? {
        ExerciseRef::None => Ok(None),
        link => Ok(Some(link)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_both_ids_are_rejected() {
        assert!(matches!(
            ExerciseRef::from_ids(Some(1), Some(2)),
            Err(StoreError::Validation(_))
        ));
    }

    #[test]
    fn test_serializes_as_two_nullable_ids() {
        let value = serde_json::to_value(ExerciseRef::Custom(7)).unwrap();
        assert_eq!(
            value,
            serde_json::json!({"exercise_id": null, "custom_exercise_id": 7})
        );
    }

    #[test]
    fn test_clear_custom_only_touches_matching_link() {
        let mut link = ExerciseRef::Custom(3);
        link.clear_custom(4);
        assert_eq!(link, ExerciseRef::Custom(3));
        link.clear_custom(3);
        assert_eq!(link, ExerciseRef::None);

        let mut catalog = ExerciseRef::Catalog(3);
        catalog.clear_custom(3);
        assert_eq!(catalog, ExerciseRef::Catalog(3));
    }
}
