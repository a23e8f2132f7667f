//! PostgreSQL store implementation.
//!
//! Cascades, per-user uniqueness and the catalog restrict rule are enforced
//! by the schema in `migrations/`; this module maps the resulting database
//! errors onto `StoreError`.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};
use tracing::{debug, info};

use crate::error::{StoreError, StoreResult};
use crate::models::role::USER;
use crate::models::{
    CustomExercise, Day, DayChanges, Exercise, ExerciseChanges, ExerciseRef, NewDay, NewExercise,
    NewPlan, NewRecord, NewUser, NewWorkoutSession, Plan, PlanChanges, Record, RecordChanges,
    Role, User, UserChanges, WorkoutSession, WorkoutSessionChanges,
};
use crate::traits::FitnessStore;

const USER_COLUMNS: &str =
    "id, first_name, last_name, email, password_hash, profile_picture, created_at";
const PLAN_COLUMNS: &str =
    "id, user_id, goal, current_weight, target_weight, duration, days_in_week, created_at";
const DAY_COLUMNS: &str = "id, plan_id, title, session_duration";
const SESSION_COLUMNS: &str =
    "id, day_id, exercise_id, custom_exercise_id, sets, reps, rest, weight_lifted";
const EXERCISE_COLUMNS: &str =
    "id, title, description, category, muscle_group, equipment, media_file_url";
const CUSTOM_EXERCISE_COLUMNS: &str =
    "id, user_id, title, description, category, muscle_group, equipment, media_file_url";
const RECORD_COLUMNS: &str = "id, user_id, exercise_id, custom_exercise_id, difficulty, sets, \
     reps, rest, weight_lifted, user_weight, location, notes, date";

#[derive(FromRow)]
struct SessionRow {
    id: i64,
    day_id: i64,
    exercise_id: Option<i64>,
    custom_exercise_id: Option<i64>,
    sets: i32,
    reps: i32,
    rest: f64,
    weight_lifted: Option<f64>,
}

impl From<SessionRow> for WorkoutSession {
    fn from(row: SessionRow) -> Self {
        WorkoutSession {
            id: row.id,
            day_id: row.day_id,
            sets: row.sets,
            reps: row.reps,
            rest: row.rest,
            weight_lifted: row.weight_lifted,
            exercise: link_from_columns(row.exercise_id, row.custom_exercise_id),
        }
    }
}

#[derive(FromRow)]
struct RecordRow {
    id: i64,
    user_id: i64,
    exercise_id: Option<i64>,
    custom_exercise_id: Option<i64>,
    difficulty: i32,
    sets: i32,
    reps: i32,
    rest: f64,
    weight_lifted: Option<f64>,
    user_weight: f64,
    location: String,
    notes: Option<String>,
    date: DateTime<Utc>,
}

impl From<RecordRow> for Record {
    fn from(row: RecordRow) -> Self {
        Record {
            id: row.id,
            user_id: row.user_id,
            difficulty: row.difficulty,
            sets: row.sets,
            reps: row.reps,
            rest: row.rest,
            weight_lifted: row.weight_lifted,
            user_weight: row.user_weight,
            location: row.location,
            notes: row.notes,
            date: row.date,
            exercise: link_from_columns(row.exercise_id, row.custom_exercise_id),
        }
    }
}

// the CHECK constraint guarantees at most one column is set
fn link_from_columns(exercise_id: Option<i64>, custom_exercise_id: Option<i64>) -> ExerciseRef {
    ExerciseRef::from_ids(exercise_id, custom_exercise_id).unwrap_or_default()
}

/// Map unique violations to `Conflict`, everything else to `Database`
fn conflict_on_unique(err: sqlx::Error, message: impl FnOnce() -> String) -> StoreError {
    match &err {
        sqlx::Error::Database(db) if db.is_unique_violation() => StoreError::Conflict(message()),
        _ => StoreError::Database(err),
    }
}

/// PostgreSQL implementation of FitnessStore.
#[derive(Debug, Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    /// Wrap an existing pool
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Apply the embedded schema migrations
    pub async fn migrate(&self) -> StoreResult<()> {
        info!("Running database migrations");
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        Ok(())
    }

    async fn ensure_exists(&self, table: &'static str, entity: &'static str, id: i64) -> StoreResult<()> {
        let query = format!("SELECT EXISTS (SELECT 1 FROM {} WHERE id = $1)", table);
        let exists: bool = sqlx::query_scalar(&query)
            .bind(id)
            .fetch_one(&self.pool)
            .await?;
        if exists {
            Ok(())
        } else {
            Err(StoreError::not_found(entity, id))
        }
    }

    async fn delete_by_id(&self, table: &'static str, entity: &'static str, id: i64) -> StoreResult<()> {
        let query = format!("DELETE FROM {} WHERE id = $1", table);
        let result = sqlx::query(&query).bind(id).execute(&self.pool).await?;
        if result.rows_affected() == 0 {
            return Err(StoreError::not_found(entity, id));
        }
        debug!("Deleted {} {}", entity, id);
        Ok(())
    }
}

#[async_trait]
impl FitnessStore for PgStore {
    async fn health_check(&self) -> StoreResult<bool> {
        Ok(common::database::health_check(&self.pool)
            .await
            .unwrap_or(false))
    }

    async fn list_users(&self) -> StoreResult<Vec<User>> {
        let query = format!("SELECT {} FROM users ORDER BY id", USER_COLUMNS);
        Ok(sqlx::query_as::<_, User>(&query)
            .fetch_all(&self.pool)
            .await?)
    }

    async fn get_user(&self, id: i64) -> StoreResult<User> {
        let query = format!("SELECT {} FROM users WHERE id = $1", USER_COLUMNS);
        sqlx::query_as::<_, User>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| StoreError::not_found("user", id))
    }

    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        let query = format!(
            "SELECT {} FROM users WHERE lower(email) = lower($1)",
            USER_COLUMNS
        );
        Ok(sqlx::query_as::<_, User>(&query)
            .bind(email.trim())
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn create_user(&self, new_user: NewUser) -> StoreResult<User> {
        let mut tx = self.pool.begin().await?;

        let query = format!(
            r#"
            INSERT INTO users (first_name, last_name, email, password_hash)
            VALUES ($1, $2, $3, $4)
            RETURNING {}
            "#,
            USER_COLUMNS
        );
        let user = sqlx::query_as::<_, User>(&query)
            .bind(&new_user.first_name)
            .bind(&new_user.last_name)
            .bind(&new_user.email)
            .bind(&new_user.password_hash)
            .fetch_one(&mut *tx)
            .await
            .map_err(|e| {
                conflict_on_unique(e, || {
                    format!("User with email {} already exists", new_user.email)
                })
            })?;

        sqlx::query(
            r#"
            INSERT INTO user_roles (user_id, role_id)
            SELECT $1, id FROM roles WHERE name = $2
            "#,
        )
        .bind(user.id)
        .bind(USER)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        debug!("Created user {}", user.id);
        Ok(user)
    }

    async fn update_user(&self, id: i64, changes: UserChanges) -> StoreResult<User> {
        let query = format!(
            r#"
            UPDATE users SET
                first_name = COALESCE($2, first_name),
                last_name = COALESCE($3, last_name),
                email = COALESCE($4, email),
                password_hash = COALESCE($5, password_hash),
                profile_picture = CASE WHEN $6 THEN $7 ELSE profile_picture END
            WHERE id = $1
            RETURNING {}
            "#,
            USER_COLUMNS
        );
        let email = changes.email.clone();
        sqlx::query_as::<_, User>(&query)
            .bind(id)
            .bind(changes.first_name)
            .bind(changes.last_name)
            .bind(changes.email)
            .bind(changes.password_hash)
            .bind(changes.profile_picture.is_some())
            .bind(changes.profile_picture.flatten())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                conflict_on_unique(e, || {
                    format!(
                        "User with email {} already exists",
                        email.unwrap_or_default()
                    )
                })
            })?
            .ok_or_else(|| StoreError::not_found("user", id))
    }

    async fn delete_user(&self, id: i64) -> StoreResult<()> {
        self.delete_by_id("users", "user", id).await
    }

    async fn user_roles(&self, user_id: i64) -> StoreResult<Vec<Role>> {
        self.ensure_exists("users", "user", user_id).await?;
        Ok(sqlx::query_as::<_, Role>(
            r#"
            SELECT r.id, r.name
            FROM roles r
            JOIN user_roles ur ON ur.role_id = r.id
            WHERE ur.user_id = $1
            ORDER BY r.id
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?)
    }

    async fn assign_role(&self, user_id: i64, role_id: i64) -> StoreResult<bool> {
        self.ensure_exists("users", "user", user_id).await?;
        self.ensure_exists("roles", "role", role_id).await?;
        let result = sqlx::query(
            "INSERT INTO user_roles (user_id, role_id) VALUES ($1, $2) ON CONFLICT DO NOTHING",
        )
        .bind(user_id)
        .bind(role_id)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() == 1)
    }

    async fn revoke_role(&self, user_id: i64, role_id: i64) -> StoreResult<bool> {
        self.ensure_exists("users", "user", user_id).await?;
        self.ensure_exists("roles", "role", role_id).await?;
        let result = sqlx::query("DELETE FROM user_roles WHERE user_id = $1 AND role_id = $2")
            .bind(user_id)
            .bind(role_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() == 1)
    }

    async fn list_roles(&self) -> StoreResult<Vec<Role>> {
        Ok(
            sqlx::query_as::<_, Role>("SELECT id, name FROM roles ORDER BY id")
                .fetch_all(&self.pool)
                .await?,
        )
    }

    async fn get_role(&self, id: i64) -> StoreResult<Role> {
        sqlx::query_as::<_, Role>("SELECT id, name FROM roles WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| StoreError::not_found("role", id))
    }

    async fn find_role_by_name(&self, name: &str) -> StoreResult<Option<Role>> {
        Ok(
            sqlx::query_as::<_, Role>("SELECT id, name FROM roles WHERE name = $1")
                .bind(name)
                .fetch_optional(&self.pool)
                .await?,
        )
    }

    async fn create_role(&self, name: &str) -> StoreResult<Role> {
        sqlx::query_as::<_, Role>("INSERT INTO roles (name) VALUES ($1) RETURNING id, name")
            .bind(name)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| conflict_on_unique(e, || format!("Role {} already exists", name)))
    }

    async fn rename_role(&self, id: i64, name: &str) -> StoreResult<Role> {
        sqlx::query_as::<_, Role>("UPDATE roles SET name = $2 WHERE id = $1 RETURNING id, name")
            .bind(id)
            .bind(name)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| conflict_on_unique(e, || format!("Role {} already exists", name)))?
            .ok_or_else(|| StoreError::not_found("role", id))
    }

    async fn delete_role(&self, id: i64) -> StoreResult<()> {
        self.delete_by_id("roles", "role", id).await
    }

    async fn role_users(&self, role_id: i64) -> StoreResult<Vec<User>> {
        self.ensure_exists("roles", "role", role_id).await?;
        let query = format!(
            r#"
            SELECT {}
            FROM users
            WHERE id IN (SELECT user_id FROM user_roles WHERE role_id = $1)
            ORDER BY id
            "#,
            USER_COLUMNS
        );
        Ok(sqlx::query_as::<_, User>(&query)
            .bind(role_id)
            .fetch_all(&self.pool)
            .await?)
    }

    async fn list_plans(&self) -> StoreResult<Vec<Plan>> {
        let query = format!("SELECT {} FROM plans ORDER BY id", PLAN_COLUMNS);
        Ok(sqlx::query_as::<_, Plan>(&query)
            .fetch_all(&self.pool)
            .await?)
    }

    async fn user_plans(&self, user_id: i64) -> StoreResult<Vec<Plan>> {
        let query = format!(
            "SELECT {} FROM plans WHERE user_id = $1 ORDER BY id",
            PLAN_COLUMNS
        );
        Ok(sqlx::query_as::<_, Plan>(&query)
            .bind(user_id)
            .fetch_all(&self.pool)
            .await?)
    }

    async fn get_plan(&self, id: i64) -> StoreResult<Plan> {
        let query = format!("SELECT {} FROM plans WHERE id = $1", PLAN_COLUMNS);
        sqlx::query_as::<_, Plan>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| StoreError::not_found("plan", id))
    }

    async fn create_plan(&self, user_id: i64, new_plan: NewPlan) -> StoreResult<Plan> {
        self.ensure_exists("users", "user", user_id).await?;
        let query = format!(
            r#"
            INSERT INTO plans (user_id, goal, current_weight, target_weight, duration, days_in_week)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {}
            "#,
            PLAN_COLUMNS
        );
        Ok(sqlx::query_as::<_, Plan>(&query)
            .bind(user_id)
            .bind(new_plan.goal)
            .bind(new_plan.current_weight)
            .bind(new_plan.target_weight)
            .bind(new_plan.duration)
            .bind(new_plan.days_in_week)
            .fetch_one(&self.pool)
            .await?)
    }

    async fn update_plan(&self, id: i64, changes: PlanChanges) -> StoreResult<Plan> {
        let query = format!(
            r#"
            UPDATE plans SET
                goal = COALESCE($2, goal),
                current_weight = COALESCE($3, current_weight),
                target_weight = COALESCE($4, target_weight),
                duration = COALESCE($5, duration),
                days_in_week = COALESCE($6, days_in_week)
            WHERE id = $1
            RETURNING {}
            "#,
            PLAN_COLUMNS
        );
        sqlx::query_as::<_, Plan>(&query)
            .bind(id)
            .bind(changes.goal)
            .bind(changes.current_weight)
            .bind(changes.target_weight)
            .bind(changes.duration)
            .bind(changes.days_in_week)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| StoreError::not_found("plan", id))
    }

    async fn delete_plan(&self, id: i64) -> StoreResult<()> {
        self.delete_by_id("plans", "plan", id).await
    }

    async fn list_days(&self) -> StoreResult<Vec<Day>> {
        let query = format!("SELECT {} FROM days ORDER BY id", DAY_COLUMNS);
        Ok(sqlx::query_as::<_, Day>(&query)
            .fetch_all(&self.pool)
            .await?)
    }

    async fn plan_days(&self, plan_id: i64) -> StoreResult<Vec<Day>> {
        let query = format!(
            "SELECT {} FROM days WHERE plan_id = $1 ORDER BY id",
            DAY_COLUMNS
        );
        Ok(sqlx::query_as::<_, Day>(&query)
            .bind(plan_id)
            .fetch_all(&self.pool)
            .await?)
    }

    async fn get_day(&self, id: i64) -> StoreResult<Day> {
        let query = format!("SELECT {} FROM days WHERE id = $1", DAY_COLUMNS);
        sqlx::query_as::<_, Day>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| StoreError::not_found("day", id))
    }

    async fn create_day(&self, plan_id: i64, new_day: NewDay) -> StoreResult<Day> {
        self.ensure_exists("plans", "plan", plan_id).await?;
        let query = format!(
            "INSERT INTO days (plan_id, title, session_duration) VALUES ($1, $2, $3) RETURNING {}",
            DAY_COLUMNS
        );
        Ok(sqlx::query_as::<_, Day>(&query)
            .bind(plan_id)
            .bind(new_day.title)
            .bind(new_day.session_duration)
            .fetch_one(&self.pool)
            .await?)
    }

    async fn update_day(&self, id: i64, changes: DayChanges) -> StoreResult<Day> {
        let query = format!(
            r#"
            UPDATE days SET
                title = COALESCE($2, title),
                session_duration = COALESCE($3, session_duration)
            WHERE id = $1
            RETURNING {}
            "#,
            DAY_COLUMNS
        );
        sqlx::query_as::<_, Day>(&query)
            .bind(id)
            .bind(changes.title)
            .bind(changes.session_duration)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| StoreError::not_found("day", id))
    }

    async fn delete_day(&self, id: i64) -> StoreResult<()> {
        self.delete_by_id("days", "day", id).await
    }

    async fn list_workout_sessions(&self) -> StoreResult<Vec<WorkoutSession>> {
        let query = format!("SELECT {} FROM workout_sessions ORDER BY id", SESSION_COLUMNS);
        let rows = sqlx::query_as::<_, SessionRow>(&query)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.into_iter().map(WorkoutSession::from).collect())
    }

    async fn day_workout_sessions(&self, day_id: i64) -> StoreResult<Vec<WorkoutSession>> {
        let query = format!(
            "SELECT {} FROM workout_sessions WHERE day_id = $1 ORDER BY id",
            SESSION_COLUMNS
        );
        let rows = sqlx::query_as::<_, SessionRow>(&query)
            .bind(day_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.into_iter().map(WorkoutSession::from).collect())
    }

    async fn get_workout_session(&self, id: i64) -> StoreResult<WorkoutSession> {
        let query = format!("SELECT {} FROM workout_sessions WHERE id = $1", SESSION_COLUMNS);
        sqlx::query_as::<_, SessionRow>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .map(WorkoutSession::from)
            .ok_or_else(|| StoreError::not_found("workout session", id))
    }

    async fn create_workout_session(
        &self,
        day_id: i64,
        new_session: NewWorkoutSession,
    ) -> StoreResult<WorkoutSession> {
        let link = new_session.exercise_ref()?;
        self.ensure_exists("days", "day", day_id).await?;
        let query = format!(
            r#"
            INSERT INTO workout_sessions
                (day_id, exercise_id, custom_exercise_id, sets, reps, rest, weight_lifted)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING {}
            "#,
            SESSION_COLUMNS
        );
        let row = sqlx::query_as::<_, SessionRow>(&query)
            .bind(day_id)
            .bind(link.exercise_id())
            .bind(link.custom_exercise_id())
            .bind(new_session.sets)
            .bind(new_session.reps)
            .bind(new_session.rest)
            .bind(new_session.weight_lifted)
            .fetch_one(&self.pool)
            .await?;
        Ok(row.into())
    }

    async fn update_workout_session(
        &self,
        id: i64,
        changes: WorkoutSessionChanges,
    ) -> StoreResult<WorkoutSession> {
        let link = changes.exercise_ref()?;
        let query = format!(
            r#"
            UPDATE workout_sessions SET
                exercise_id = CASE WHEN $2 THEN $3 ELSE exercise_id END,
                custom_exercise_id = CASE WHEN $2 THEN $4 ELSE custom_exercise_id END,
                sets = COALESCE($5, sets),
                reps = COALESCE($6, reps),
                rest = COALESCE($7, rest),
                weight_lifted = COALESCE($8, weight_lifted)
            WHERE id = $1
            RETURNING {}
            "#,
            SESSION_COLUMNS
        );
        sqlx::query_as::<_, SessionRow>(&query)
            .bind(id)
            .bind(link.is_some())
            .bind(link.and_then(|l| l.exercise_id()))
            .bind(link.and_then(|l| l.custom_exercise_id()))
            .bind(changes.sets)
            .bind(changes.reps)
            .bind(changes.rest)
            .bind(changes.weight_lifted)
            .fetch_optional(&self.pool)
            .await?
            .map(WorkoutSession::from)
            .ok_or_else(|| StoreError::not_found("workout session", id))
    }

    async fn delete_workout_session(&self, id: i64) -> StoreResult<()> {
        self.delete_by_id("workout_sessions", "workout session", id)
            .await
    }

    async fn list_exercises(&self) -> StoreResult<Vec<Exercise>> {
        let query = format!("SELECT {} FROM exercises ORDER BY id", EXERCISE_COLUMNS);
        Ok(sqlx::query_as::<_, Exercise>(&query)
            .fetch_all(&self.pool)
            .await?)
    }

    async fn get_exercise(&self, id: i64) -> StoreResult<Exercise> {
        let query = format!("SELECT {} FROM exercises WHERE id = $1", EXERCISE_COLUMNS);
        sqlx::query_as::<_, Exercise>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| StoreError::not_found("exercise", id))
    }

    async fn create_exercise(&self, new_exercise: NewExercise) -> StoreResult<Exercise> {
        let query = format!(
            r#"
            INSERT INTO exercises
                (title, description, category, muscle_group, equipment, media_file_url)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {}
            "#,
            EXERCISE_COLUMNS
        );
        let title = new_exercise.title.clone();
        sqlx::query_as::<_, Exercise>(&query)
            .bind(new_exercise.title)
            .bind(new_exercise.description)
            .bind(new_exercise.category)
            .bind(new_exercise.muscle_group)
            .bind(new_exercise.equipment)
            .bind(new_exercise.media_file_url)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| conflict_on_unique(e, || format!("Exercise {} already exists", title)))
    }

    async fn update_exercise(&self, id: i64, changes: ExerciseChanges) -> StoreResult<Exercise> {
        let query = format!(
            r#"
            UPDATE exercises SET
                title = COALESCE($2, title),
                description = COALESCE($3, description),
                category = COALESCE($4, category),
                muscle_group = COALESCE($5, muscle_group),
                equipment = COALESCE($6, equipment),
                media_file_url = COALESCE($7, media_file_url)
            WHERE id = $1
            RETURNING {}
            "#,
            EXERCISE_COLUMNS
        );
        let title = changes.title.clone().unwrap_or_default();
        sqlx::query_as::<_, Exercise>(&query)
            .bind(id)
            .bind(changes.title)
            .bind(changes.description)
            .bind(changes.category)
            .bind(changes.muscle_group)
            .bind(changes.equipment)
            .bind(changes.media_file_url)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| conflict_on_unique(e, || format!("Exercise {} already exists", title)))?
            .ok_or_else(|| StoreError::not_found("exercise", id))
    }

    async fn set_exercise_media(&self, id: i64, url: Option<String>) -> StoreResult<Exercise> {
        let query = format!(
            "UPDATE exercises SET media_file_url = $2 WHERE id = $1 RETURNING {}",
            EXERCISE_COLUMNS
        );
        sqlx::query_as::<_, Exercise>(&query)
            .bind(id)
            .bind(url)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| StoreError::not_found("exercise", id))
    }

    async fn delete_exercise(&self, id: i64) -> StoreResult<()> {
        let result = sqlx::query("DELETE FROM exercises WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| match &e {
                sqlx::Error::Database(db) if db.is_foreign_key_violation() => StoreError::InUse(
                    format!("Exercise {} is referenced by workout sessions or records", id),
                ),
                _ => StoreError::Database(e),
            })?;
        if result.rows_affected() == 0 {
            return Err(StoreError::not_found("exercise", id));
        }
        Ok(())
    }

    async fn list_custom_exercises(&self) -> StoreResult<Vec<CustomExercise>> {
        let query = format!(
            "SELECT {} FROM custom_exercises ORDER BY id",
            CUSTOM_EXERCISE_COLUMNS
        );
        Ok(sqlx::query_as::<_, CustomExercise>(&query)
            .fetch_all(&self.pool)
            .await?)
    }

    async fn user_custom_exercises(&self, user_id: i64) -> StoreResult<Vec<CustomExercise>> {
        let query = format!(
            "SELECT {} FROM custom_exercises WHERE user_id = $1 ORDER BY id",
            CUSTOM_EXERCISE_COLUMNS
        );
        Ok(sqlx::query_as::<_, CustomExercise>(&query)
            .bind(user_id)
            .fetch_all(&self.pool)
            .await?)
    }

    async fn get_custom_exercise(&self, id: i64) -> StoreResult<CustomExercise> {
        let query = format!(
            "SELECT {} FROM custom_exercises WHERE id = $1",
            CUSTOM_EXERCISE_COLUMNS
        );
        sqlx::query_as::<_, CustomExercise>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| StoreError::not_found("custom exercise", id))
    }

    async fn create_custom_exercise(
        &self,
        user_id: i64,
        new_exercise: NewExercise,
    ) -> StoreResult<CustomExercise> {
        self.ensure_exists("users", "user", user_id).await?;
        let query = format!(
            r#"
            INSERT INTO custom_exercises
                (user_id, title, description, category, muscle_group, equipment, media_file_url)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING {}
            "#,
            CUSTOM_EXERCISE_COLUMNS
        );
        let title = new_exercise.title.clone();
        sqlx::query_as::<_, CustomExercise>(&query)
            .bind(user_id)
            .bind(new_exercise.title)
            .bind(new_exercise.description)
            .bind(new_exercise.category)
            .bind(new_exercise.muscle_group)
            .bind(new_exercise.equipment)
            .bind(new_exercise.media_file_url)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                conflict_on_unique(e, || format!("Custom exercise {} already exists", title))
            })
    }

    async fn update_custom_exercise(
        &self,
        id: i64,
        changes: ExerciseChanges,
    ) -> StoreResult<CustomExercise> {
        let query = format!(
            r#"
            UPDATE custom_exercises SET
                title = COALESCE($2, title),
                description = COALESCE($3, description),
                category = COALESCE($4, category),
                muscle_group = COALESCE($5, muscle_group),
                equipment = COALESCE($6, equipment),
                media_file_url = COALESCE($7, media_file_url)
            WHERE id = $1
            RETURNING {}
            "#,
            CUSTOM_EXERCISE_COLUMNS
        );
        let title = changes.title.clone().unwrap_or_default();
        sqlx::query_as::<_, CustomExercise>(&query)
            .bind(id)
            .bind(changes.title)
            .bind(changes.description)
            .bind(changes.category)
            .bind(changes.muscle_group)
            .bind(changes.equipment)
            .bind(changes.media_file_url)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                conflict_on_unique(e, || format!("Custom exercise {} already exists", title))
            })?
            .ok_or_else(|| StoreError::not_found("custom exercise", id))
    }

    async fn set_custom_exercise_media(
        &self,
        id: i64,
        url: Option<String>,
    ) -> StoreResult<CustomExercise> {
        let query = format!(
            "UPDATE custom_exercises SET media_file_url = $2 WHERE id = $1 RETURNING {}",
            CUSTOM_EXERCISE_COLUMNS
        );
        sqlx::query_as::<_, CustomExercise>(&query)
            .bind(id)
            .bind(url)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| StoreError::not_found("custom exercise", id))
    }

    async fn delete_custom_exercise(&self, id: i64) -> StoreResult<()> {
        self.delete_by_id("custom_exercises", "custom exercise", id)
            .await
    }

    async fn list_records(&self) -> StoreResult<Vec<Record>> {
        let query = format!("SELECT {} FROM records ORDER BY id", RECORD_COLUMNS);
        let rows = sqlx::query_as::<_, RecordRow>(&query)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.into_iter().map(Record::from).collect())
    }

    async fn user_records(&self, user_id: i64) -> StoreResult<Vec<Record>> {
        let query = format!(
            "SELECT {} FROM records WHERE user_id = $1 ORDER BY id",
            RECORD_COLUMNS
        );
        let rows = sqlx::query_as::<_, RecordRow>(&query)
            .bind(user_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.into_iter().map(Record::from).collect())
    }

    async fn get_record(&self, id: i64) -> StoreResult<Record> {
        let query = format!("SELECT {} FROM records WHERE id = $1", RECORD_COLUMNS);
        sqlx::query_as::<_, RecordRow>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .map(Record::from)
            .ok_or_else(|| StoreError::not_found("record", id))
    }

    async fn create_record(&self, user_id: i64, new_record: NewRecord) -> StoreResult<Record> {
        let link = new_record.exercise_ref()?;
        self.ensure_exists("users", "user", user_id).await?;
        let query = format!(
            r#"
            INSERT INTO records
                (user_id, exercise_id, custom_exercise_id, difficulty, sets, reps, rest,
                 weight_lifted, user_weight, location, notes)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            RETURNING {}
            "#,
            RECORD_COLUMNS
        );
        let row = sqlx::query_as::<_, RecordRow>(&query)
            .bind(user_id)
            .bind(link.exercise_id())
            .bind(link.custom_exercise_id())
            .bind(new_record.difficulty)
            .bind(new_record.sets)
            .bind(new_record.reps)
            .bind(new_record.rest)
            .bind(new_record.weight_lifted)
            .bind(new_record.user_weight)
            .bind(new_record.location)
            .bind(new_record.notes)
            .fetch_one(&self.pool)
            .await?;
        Ok(row.into())
    }

    async fn update_record(&self, id: i64, changes: RecordChanges) -> StoreResult<Record> {
        let link = changes.exercise_ref()?;
        let query = format!(
            r#"
            UPDATE records SET
                exercise_id = CASE WHEN $2 THEN $3 ELSE exercise_id END,
                custom_exercise_id = CASE WHEN $2 THEN $4 ELSE custom_exercise_id END,
                difficulty = COALESCE($5, difficulty),
                sets = COALESCE($6, sets),
                reps = COALESCE($7, reps),
                rest = COALESCE($8, rest),
                weight_lifted = COALESCE($9, weight_lifted),
                user_weight = COALESCE($10, user_weight),
                location = COALESCE($11, location),
                notes = COALESCE($12, notes)
            WHERE id = $1
            RETURNING {}
            "#,
            RECORD_COLUMNS
        );
        sqlx::query_as::<_, RecordRow>(&query)
            .bind(id)
            .bind(link.is_some())
            .bind(link.and_then(|l| l.exercise_id()))
            .bind(link.and_then(|l| l.custom_exercise_id()))
            .bind(changes.difficulty)
            .bind(changes.sets)
            .bind(changes.reps)
            .bind(changes.rest)
            .bind(changes.weight_lifted)
            .bind(changes.user_weight)
            .bind(changes.location)
            .bind(changes.notes)
            .fetch_optional(&self.pool)
            .await?
            .map(Record::from)
            .ok_or_else(|| StoreError::not_found("record", id))
    }

    async fn delete_record(&self, id: i64) -> StoreResult<()> {
        self.delete_by_id("records", "record", id).await
    }
}
