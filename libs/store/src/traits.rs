//! FitnessStore trait definition.

use async_trait::async_trait;

use crate::error::StoreResult;
use crate::models::{
    CustomExercise, Day, DayChanges, Exercise, ExerciseChanges, NewDay, NewExercise, NewPlan,
    NewRecord, NewUser, NewWorkoutSession, Plan, PlanChanges, Record, RecordChanges, Role, User,
    UserChanges, WorkoutSession, WorkoutSessionChanges,
};

/// Persistence interface for every fitness entity.
///
/// Implementations must be thread-safe (Send + Sync) and share the same
/// semantics:
///
/// - single-row getters return `StoreError::NotFound` on a miss;
/// - listings return an empty vector when nothing matches;
/// - deleting a user cascades to plans, days, sessions, custom exercises,
///   records and role memberships;
/// - deleting a plan cascades to days and sessions, a day to its sessions;
/// - deleting a catalog exercise that is still referenced fails with
///   `StoreError::InUse`;
/// - deleting a custom exercise clears references to it;
/// - unique keys (user email, role name, exercise title, custom exercise
///   title per user) fail with `StoreError::Conflict`.
///
/// Exercise links are stored as given; callers check that the linked rows
/// exist and belong to the right user before writing.
#[async_trait]
pub trait FitnessStore: Send + Sync + 'static {
    /// Reports whether the backend is reachable.
    async fn health_check(&self) -> StoreResult<bool>;

    // User operations

    async fn list_users(&self) -> StoreResult<Vec<User>>;

    async fn get_user(&self, id: i64) -> StoreResult<User>;

    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>>;

    /// Creates a user holding the default `User` role.
    async fn create_user(&self, new_user: NewUser) -> StoreResult<User>;

    async fn update_user(&self, id: i64, changes: UserChanges) -> StoreResult<User>;

    async fn delete_user(&self, id: i64) -> StoreResult<()>;

    async fn user_roles(&self, user_id: i64) -> StoreResult<Vec<Role>>;

    /// Grants a role. Returns `false` if the user already held it.
    async fn assign_role(&self, user_id: i64, role_id: i64) -> StoreResult<bool>;

    /// Withdraws a role. Returns `false` if the user did not hold it.
    async fn revoke_role(&self, user_id: i64, role_id: i64) -> StoreResult<bool>;

    // Role operations

    async fn list_roles(&self) -> StoreResult<Vec<Role>>;

    async fn get_role(&self, id: i64) -> StoreResult<Role>;

    async fn find_role_by_name(&self, name: &str) -> StoreResult<Option<Role>>;

    async fn create_role(&self, name: &str) -> StoreResult<Role>;

    async fn rename_role(&self, id: i64, name: &str) -> StoreResult<Role>;

    /// Deletes a role together with its memberships.
    async fn delete_role(&self, id: i64) -> StoreResult<()>;

    async fn role_users(&self, role_id: i64) -> StoreResult<Vec<User>>;

    // Plan operations

    async fn list_plans(&self) -> StoreResult<Vec<Plan>>;

    async fn user_plans(&self, user_id: i64) -> StoreResult<Vec<Plan>>;

    async fn get_plan(&self, id: i64) -> StoreResult<Plan>;

    async fn create_plan(&self, user_id: i64, new_plan: NewPlan) -> StoreResult<Plan>;

    async fn update_plan(&self, id: i64, changes: PlanChanges) -> StoreResult<Plan>;

    async fn delete_plan(&self, id: i64) -> StoreResult<()>;

    // Day operations

    async fn list_days(&self) -> StoreResult<Vec<Day>>;

    async fn plan_days(&self, plan_id: i64) -> StoreResult<Vec<Day>>;

    async fn get_day(&self, id: i64) -> StoreResult<Day>;

    async fn create_day(&self, plan_id: i64, new_day: NewDay) -> StoreResult<Day>;

    async fn update_day(&self, id: i64, changes: DayChanges) -> StoreResult<Day>;

    async fn delete_day(&self, id: i64) -> StoreResult<()>;

    // Workout session operations

    async fn list_workout_sessions(&self) -> StoreResult<Vec<WorkoutSession>>;

    async fn day_workout_sessions(&self, day_id: i64) -> StoreResult<Vec<WorkoutSession>>;

    async fn get_workout_session(&self, id: i64) -> StoreResult<WorkoutSession>;

    async fn create_workout_session(
        &self,
        day_id: i64,
        new_session: NewWorkoutSession,
    ) -> StoreResult<WorkoutSession>;

    async fn update_workout_session(
        &self,
        id: i64,
        changes: WorkoutSessionChanges,
    ) -> StoreResult<WorkoutSession>;

    async fn delete_workout_session(&self, id: i64) -> StoreResult<()>;

    // Catalog exercise operations

    async fn list_exercises(&self) -> StoreResult<Vec<Exercise>>;

    async fn get_exercise(&self, id: i64) -> StoreResult<Exercise>;

    async fn create_exercise(&self, new_exercise: NewExercise) -> StoreResult<Exercise>;

    async fn update_exercise(&self, id: i64, changes: ExerciseChanges) -> StoreResult<Exercise>;

    /// Replaces (or clears) the media reference.
    async fn set_exercise_media(&self, id: i64, url: Option<String>) -> StoreResult<Exercise>;

    async fn delete_exercise(&self, id: i64) -> StoreResult<()>;

    // Custom exercise operations

    async fn list_custom_exercises(&self) -> StoreResult<Vec<CustomExercise>>;

    async fn user_custom_exercises(&self, user_id: i64) -> StoreResult<Vec<CustomExercise>>;

    async fn get_custom_exercise(&self, id: i64) -> StoreResult<CustomExercise>;

    async fn create_custom_exercise(
        &self,
        user_id: i64,
        new_exercise: NewExercise,
    ) -> StoreResult<CustomExercise>;

    async fn update_custom_exercise(
        &self,
        id: i64,
        changes: ExerciseChanges,
    ) -> StoreResult<CustomExercise>;

    async fn set_custom_exercise_media(
        &self,
        id: i64,
        url: Option<String>,
    ) -> StoreResult<CustomExercise>;

    async fn delete_custom_exercise(&self, id: i64) -> StoreResult<()>;

    // Record operations

    async fn list_records(&self) -> StoreResult<Vec<Record>>;

    async fn user_records(&self, user_id: i64) -> StoreResult<Vec<Record>>;

    async fn get_record(&self, id: i64) -> StoreResult<Record>;

    async fn create_record(&self, user_id: i64, new_record: NewRecord) -> StoreResult<Record>;

    async fn update_record(&self, id: i64, changes: RecordChanges) -> StoreResult<Record>;

    async fn delete_record(&self, id: i64) -> StoreResult<()>;
}
