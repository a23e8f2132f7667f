//! Plan day model

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::numeric;

/// Day entity, owned by a plan
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Day {
    pub id: i64,
    pub plan_id: i64,
    pub title: String,
    pub session_duration: Option<i32>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewDay {
    pub title: String,
    #[serde(default, deserialize_with = "numeric::opt_i32")]
    pub session_duration: Option<i32>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DayChanges {
    pub title: Option<String>,
    #[serde(default, deserialize_with = "numeric::opt_i32")]
    pub session_duration: Option<i32>,
}

impl DayChanges {
    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.session_duration.is_none()
    }

    pub fn apply(self, day: &mut Day) {
        if let Some(title) = self.title {
            day.title = title;
        }
        if let Some(session_duration) = self.session_duration {
            day.session_duration = Some(session_duration);
        }
    }
}
