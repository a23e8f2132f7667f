//! Entity models and request payloads

pub mod custom_exercise;
pub mod day;
pub mod exercise;
pub mod exercise_ref;
pub mod plan;
pub mod record;
pub mod role;
pub mod user;
pub mod workout_session;

// Re-export for convenience
pub use custom_exercise::CustomExercise;
pub use day::{Day, DayChanges, NewDay};
pub use exercise::{Exercise, ExerciseChanges, NewExercise};
pub use exercise_ref::ExerciseRef;
pub use plan::{NewPlan, Plan, PlanChanges};
pub use record::{NewRecord, Record, RecordChanges};
pub use role::{NewRole, Role, RoleChanges};
pub use user::{LoginCredentials, NewUser, Registration, User, UserChanges};
pub use workout_session::{NewWorkoutSession, WorkoutSession, WorkoutSessionChanges};
