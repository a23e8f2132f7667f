//! Training plan model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::numeric;

/// Plan entity, owned by a user
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Plan {
    pub id: i64,
    pub user_id: i64,
    pub goal: String,
    pub current_weight: f64,
    pub target_weight: f64,
    pub duration: i32,
    pub days_in_week: i32,
    pub created_at: DateTime<Utc>,
}

/// New plan creation payload
#[derive(Debug, Clone, Deserialize)]
pub struct NewPlan {
    pub goal: String,
    #[serde(deserialize_with = "numeric::f64")]
    pub current_weight: f64,
    #[serde(deserialize_with = "numeric::f64")]
    pub target_weight: f64,
    #[serde(deserialize_with = "numeric::i32")]
    pub duration: i32,
    #[serde(deserialize_with = "numeric::i32")]
    pub days_in_week: i32,
}

/// Plan update payload
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PlanChanges {
    pub goal: Option<String>,
    #[serde(default, deserialize_with = "numeric::opt_f64")]
    pub current_weight: Option<f64>,
    #[serde(default, deserialize_with = "numeric::opt_f64")]
    pub target_weight: Option<f64>,
    #[serde(default, deserialize_with = "numeric::opt_i32")]
    pub duration: Option<i32>,
    #[serde(default, deserialize_with = "numeric::opt_i32")]
    pub days_in_week: Option<i32>,
}

impl PlanChanges {
    pub fn is_empty(&self) -> bool {
        self.goal.is_none()
            && self.current_weight.is_none()
            && self.target_weight.is_none()
            && self.duration.is_none()
            && self.days_in_week.is_none()
    }

    pub fn apply(self, plan: &mut Plan) {
        if let Some(goal) = self.goal {
            plan.goal = goal;
        }
        if let Some(current_weight) = self.current_weight {
            plan.current_weight = current_weight;
        }
        if let Some(target_weight) = self.target_weight {
            plan.target_weight = target_weight;
        }
        if let Some(duration) = self.duration {
            plan.duration = duration;
        }
        if let Some(days_in_week) = self.days_in_week {
            plan.days_in_week = days_in_week;
        }
    }
}
