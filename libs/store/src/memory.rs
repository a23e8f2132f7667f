//! In-memory store implementation for tests and local development.
//!
//! All tables live behind one mutex so that cascades and uniqueness checks
//! are applied atomically, mirroring the foreign-key rules of the
//! PostgreSQL schema.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::Mutex;
use tracing::debug;

use crate::error::{StoreError, StoreResult};
use crate::models::role::{SEEDED_ROLES, USER};
use crate::models::{
    CustomExercise, Day, DayChanges, Exercise, ExerciseChanges, ExerciseRef, NewDay, NewExercise,
    NewPlan, NewRecord, NewUser, NewWorkoutSession, Plan, PlanChanges, Record, RecordChanges,
    Role, User, UserChanges, WorkoutSession, WorkoutSessionChanges,
};
use crate::traits::FitnessStore;

#[derive(Debug, Default)]
struct Tables {
    next_id: i64,
    users: BTreeMap<i64, User>,
    roles: BTreeMap<i64, Role>,
    memberships: BTreeSet<(i64, i64)>,
    plans: BTreeMap<i64, Plan>,
    days: BTreeMap<i64, Day>,
    sessions: BTreeMap<i64, WorkoutSession>,
    exercises: BTreeMap<i64, Exercise>,
    custom_exercises: BTreeMap<i64, CustomExercise>,
    records: BTreeMap<i64, Record>,
}

impl Tables {
    fn seeded() -> Self {
        let mut tables = Tables::default();
        for name in SEEDED_ROLES {
            let id = tables.allocate();
            tables.roles.insert(
                id,
                Role {
                    id,
                    name: name.to_string(),
                },
            );
        }
        tables
    }

    /// Ids are unique across tables, which keeps test fixtures unambiguous
    fn allocate(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }

    fn email_taken(&self, email: &str, except: Option<i64>) -> bool {
        self.users
            .values()
            .any(|u| u.email.eq_ignore_ascii_case(email.trim()) && Some(u.id) != except)
    }

    fn role_named(&self, name: &str) -> Option<&Role> {
        self.roles.values().find(|r| r.name == name)
    }

    fn exercise_title_taken(&self, title: &str, except: Option<i64>) -> bool {
        self.exercises
            .values()
            .any(|e| e.title == title && Some(e.id) != except)
    }

    fn custom_title_taken(&self, user_id: i64, title: &str, except: Option<i64>) -> bool {
        self.custom_exercises
            .values()
            .any(|c| c.user_id == user_id && c.title == title && Some(c.id) != except)
    }

    fn remove_day(&mut self, day_id: i64) {
        self.days.remove(&day_id);
        self.sessions.retain(|_, s| s.day_id != day_id);
    }

    fn remove_plan(&mut self, plan_id: i64) {
        self.plans.remove(&plan_id);
        let day_ids: Vec<i64> = self
            .days
            .values()
            .filter(|d| d.plan_id == plan_id)
            .map(|d| d.id)
            .collect();
        for day_id in day_ids {
            self.remove_day(day_id);
        }
    }

    fn remove_custom_exercise(&mut self, id: i64) {
        self.custom_exercises.remove(&id);
        for session in self.sessions.values_mut() {
            session.exercise.clear_custom(id);
        }
        for record in self.records.values_mut() {
            record.exercise.clear_custom(id);
        }
    }

    fn catalog_in_use(&self, exercise_id: i64) -> bool {
        let link = ExerciseRef::Catalog(exercise_id);
        self.sessions.values().any(|s| s.exercise == link)
            || self.records.values().any(|r| r.exercise == link)
    }
}

fn found<T: Clone>(map: &BTreeMap<i64, T>, entity: &'static str, id: i64) -> StoreResult<T> {
    map.get(&id)
        .cloned()
        .ok_or_else(|| StoreError::not_found(entity, id))
}

fn found_mut<'a, T>(
    map: &'a mut BTreeMap<i64, T>,
    entity: &'static str,
    id: i64,
) -> StoreResult<&'a mut T> {
    map.get_mut(&id)
        .ok_or_else(|| StoreError::not_found(entity, id))
}

fn ensure_exists<T>(map: &BTreeMap<i64, T>, entity: &'static str, id: i64) -> StoreResult<()> {
    if map.contains_key(&id) {
        Ok(())
    } else {
        Err(StoreError::not_found(entity, id))
    }
}

/// In-memory implementation of FitnessStore.
#[derive(Debug, Clone)]
pub struct MemoryStore {
    tables: Arc<Mutex<Tables>>,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStore {
    /// Creates an empty store holding only the seeded roles.
    pub fn new() -> Self {
        Self {
            tables: Arc::new(Mutex::new(Tables::seeded())),
        }
    }
}

#[async_trait]
impl FitnessStore for MemoryStore {
    async fn health_check(&self) -> StoreResult<bool> {
        Ok(true)
    }

    async fn list_users(&self) -> StoreResult<Vec<User>> {
        Ok(self.tables.lock().await.users.values().cloned().collect())
    }

    async fn get_user(&self, id: i64) -> StoreResult<User> {
        found(&self.tables.lock().await.users, "user", id)
    }

    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        let tables = self.tables.lock().await;
        let email = email.trim();
        Ok(tables
            .users
            .values()
            .find(|u| u.email.eq_ignore_ascii_case(email))
            .cloned())
    }

    async fn create_user(&self, new_user: NewUser) -> StoreResult<User> {
        let mut tables = self.tables.lock().await;
        if tables.email_taken(&new_user.email, None) {
            return Err(StoreError::Conflict(format!(
                "User with email {} already exists",
                new_user.email
            )));
        }

        let id = tables.allocate();
        let user = User {
            id,
            first_name: new_user.first_name,
            last_name: new_user.last_name,
            email: new_user.email,
            password_hash: new_user.password_hash,
            profile_picture: None,
            created_at: Utc::now(),
        };
        tables.users.insert(id, user.clone());

        if let Some(role_id) = tables.role_named(USER).map(|r| r.id) {
            tables.memberships.insert((id, role_id));
        }

        debug!("Created user {}", id);
        Ok(user)
    }

    async fn update_user(&self, id: i64, changes: UserChanges) -> StoreResult<User> {
        let mut tables = self.tables.lock().await;
        ensure_exists(&tables.users, "user", id)?;
        if let Some(email) = &changes.email {
            if tables.email_taken(email, Some(id)) {
                return Err(StoreError::Conflict(format!(
                    "User with email {} already exists",
                    email
                )));
            }
        }

        let user = found_mut(&mut tables.users, "user", id)?;
        if let Some(first_name) = changes.first_name {
            user.first_name = first_name;
        }
        if let Some(last_name) = changes.last_name {
            user.last_name = last_name;
        }
        if let Some(email) = changes.email {
            user.email = email;
        }
        if let Some(password_hash) = changes.password_hash {
            user.password_hash = password_hash;
        }
        if let Some(profile_picture) = changes.profile_picture {
            user.profile_picture = profile_picture;
        }
        Ok(user.clone())
    }

    async fn delete_user(&self, id: i64) -> StoreResult<()> {
        let mut tables = self.tables.lock().await;
        ensure_exists(&tables.users, "user", id)?;

        let plan_ids: Vec<i64> = tables
            .plans
            .values()
            .filter(|p| p.user_id == id)
            .map(|p| p.id)
            .collect();
        for plan_id in plan_ids {
            tables.remove_plan(plan_id);
        }

        let custom_ids: Vec<i64> = tables
            .custom_exercises
            .values()
            .filter(|c| c.user_id == id)
            .map(|c| c.id)
            .collect();
        for custom_id in custom_ids {
            tables.remove_custom_exercise(custom_id);
        }

        tables.records.retain(|_, r| r.user_id != id);
        tables.memberships.retain(|(user_id, _)| *user_id != id);
        tables.users.remove(&id);

        debug!("Deleted user {} and everything it owned", id);
        Ok(())
    }

    async fn user_roles(&self, user_id: i64) -> StoreResult<Vec<Role>> {
        let tables = self.tables.lock().await;
        ensure_exists(&tables.users, "user", user_id)?;
        Ok(tables
            .memberships
            .iter()
            .filter(|(uid, _)| *uid == user_id)
            .filter_map(|(_, role_id)| tables.roles.get(role_id).cloned())
            .collect())
    }

    async fn assign_role(&self, user_id: i64, role_id: i64) -> StoreResult<bool> {
        let mut tables = self.tables.lock().await;
        ensure_exists(&tables.users, "user", user_id)?;
        ensure_exists(&tables.roles, "role", role_id)?;
        Ok(tables.memberships.insert((user_id, role_id)))
    }

    async fn revoke_role(&self, user_id: i64, role_id: i64) -> StoreResult<bool> {
        let mut tables = self.tables.lock().await;
        ensure_exists(&tables.users, "user", user_id)?;
        ensure_exists(&tables.roles, "role", role_id)?;
        Ok(tables.memberships.remove(&(user_id, role_id)))
    }

    async fn list_roles(&self) -> StoreResult<Vec<Role>> {
        Ok(self.tables.lock().await.roles.values().cloned().collect())
    }

    async fn get_role(&self, id: i64) -> StoreResult<Role> {
        found(&self.tables.lock().await.roles, "role", id)
    }

    async fn find_role_by_name(&self, name: &str) -> StoreResult<Option<Role>> {
        Ok(self.tables.lock().await.role_named(name).cloned())
    }

    async fn create_role(&self, name: &str) -> StoreResult<Role> {
        let mut tables = self.tables.lock().await;
        if tables.role_named(name).is_some() {
            return Err(StoreError::Conflict(format!("Role {} already exists", name)));
        }

        let id = tables.allocate();
        let role = Role {
            id,
            name: name.to_string(),
        };
        tables.roles.insert(id, role.clone());
        Ok(role)
    }

    async fn rename_role(&self, id: i64, name: &str) -> StoreResult<Role> {
        let mut tables = self.tables.lock().await;
        ensure_exists(&tables.roles, "role", id)?;
        if tables.role_named(name).is_some_and(|r| r.id != id) {
            return Err(StoreError::Conflict(format!("Role {} already exists", name)));
        }

        let role = found_mut(&mut tables.roles, "role", id)?;
        role.name = name.to_string();
        Ok(role.clone())
    }

    async fn delete_role(&self, id: i64) -> StoreResult<()> {
        let mut tables = self.tables.lock().await;
        tables
            .roles
            .remove(&id)
            .ok_or_else(|| StoreError::not_found("role", id))?;
        tables.memberships.retain(|(_, role_id)| *role_id != id);
        Ok(())
    }

    async fn role_users(&self, role_id: i64) -> StoreResult<Vec<User>> {
        let tables = self.tables.lock().await;
        ensure_exists(&tables.roles, "role", role_id)?;
        Ok(tables
            .memberships
            .iter()
            .filter(|(_, rid)| *rid == role_id)
            .filter_map(|(user_id, _)| tables.users.get(user_id).cloned())
            .collect())
    }

    async fn list_plans(&self) -> StoreResult<Vec<Plan>> {
        Ok(self.tables.lock().await.plans.values().cloned().collect())
    }

    async fn user_plans(&self, user_id: i64) -> StoreResult<Vec<Plan>> {
        let tables = self.tables.lock().await;
        Ok(tables
            .plans
            .values()
            .filter(|p| p.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn get_plan(&self, id: i64) -> StoreResult<Plan> {
        found(&self.tables.lock().await.plans, "plan", id)
    }

    async fn create_plan(&self, user_id: i64, new_plan: NewPlan) -> StoreResult<Plan> {
        let mut tables = self.tables.lock().await;
        ensure_exists(&tables.users, "user", user_id)?;

        let id = tables.allocate();
        let plan = Plan {
            id,
            user_id,
            goal: new_plan.goal,
            current_weight: new_plan.current_weight,
            target_weight: new_plan.target_weight,
            duration: new_plan.duration,
            days_in_week: new_plan.days_in_week,
            created_at: Utc::now(),
        };
        tables.plans.insert(id, plan.clone());
        Ok(plan)
    }

    async fn update_plan(&self, id: i64, changes: PlanChanges) -> StoreResult<Plan> {
        let mut tables = self.tables.lock().await;
        let plan = found_mut(&mut tables.plans, "plan", id)?;
        changes.apply(plan);
        Ok(plan.clone())
    }

    async fn delete_plan(&self, id: i64) -> StoreResult<()> {
        let mut tables = self.tables.lock().await;
        ensure_exists(&tables.plans, "plan", id)?;
        tables.remove_plan(id);
        Ok(())
    }

    async fn list_days(&self) -> StoreResult<Vec<Day>> {
        Ok(self.tables.lock().await.days.values().cloned().collect())
    }

    async fn plan_days(&self, plan_id: i64) -> StoreResult<Vec<Day>> {
        let tables = self.tables.lock().await;
        Ok(tables
            .days
            .values()
            .filter(|d| d.plan_id == plan_id)
            .cloned()
            .collect())
    }

    async fn get_day(&self, id: i64) -> StoreResult<Day> {
        found(&self.tables.lock().await.days, "day", id)
    }

    async fn create_day(&self, plan_id: i64, new_day: NewDay) -> StoreResult<Day> {
        let mut tables = self.tables.lock().await;
        ensure_exists(&tables.plans, "plan", plan_id)?;

        let id = tables.allocate();
        let day = Day {
            id,
            plan_id,
            title: new_day.title,
            session_duration: new_day.session_duration,
        };
        tables.days.insert(id, day.clone());
        Ok(day)
    }

    async fn update_day(&self, id: i64, changes: DayChanges) -> StoreResult<Day> {
        let mut tables = self.tables.lock().await;
        let day = found_mut(&mut tables.days, "day", id)?;
        changes.apply(day);
        Ok(day.clone())
    }

    async fn delete_day(&self, id: i64) -> StoreResult<()> {
        let mut tables = self.tables.lock().await;
        ensure_exists(&tables.days, "day", id)?;
        tables.remove_day(id);
        Ok(())
    }

    async fn list_workout_sessions(&self) -> StoreResult<Vec<WorkoutSession>> {
        Ok(self.tables.lock().await.sessions.values().cloned().collect())
    }

    async fn day_workout_sessions(&self, day_id: i64) -> StoreResult<Vec<WorkoutSession>> {
        let tables = self.tables.lock().await;
        Ok(tables
            .sessions
            .values()
            .filter(|s| s.day_id == day_id)
            .cloned()
            .collect())
    }

    async fn get_workout_session(&self, id: i64) -> StoreResult<WorkoutSession> {
        found(&self.tables.lock().await.sessions, "workout session", id)
    }

    async fn create_workout_session(
        &self,
        day_id: i64,
        new_session: NewWorkoutSession,
    ) -> StoreResult<WorkoutSession> {
        let exercise = new_session.exercise_ref()?;
        let mut tables = self.tables.lock().await;
        ensure_exists(&tables.days, "day", day_id)?;

        let id = tables.allocate();
        let session = WorkoutSession {
            id,
            day_id,
            sets: new_session.sets,
            reps: new_session.reps,
            rest: new_session.rest,
            weight_lifted: new_session.weight_lifted,
            exercise,
        };
        tables.sessions.insert(id, session.clone());
        Ok(session)
    }

    async fn update_workout_session(
        &self,
        id: i64,
        changes: WorkoutSessionChanges,
    ) -> StoreResult<WorkoutSession> {
        let mut tables = self.tables.lock().await;
        let session = found_mut(&mut tables.sessions, "workout session", id)?;
        let mut updated = session.clone();
        changes.apply(&mut updated)?;
        *session = updated.clone();
        Ok(updated)
    }

    async fn delete_workout_session(&self, id: i64) -> StoreResult<()> {
        let mut tables = self.tables.lock().await;
        tables
            .sessions
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| StoreError::not_found("workout session", id))
    }

    async fn list_exercises(&self) -> StoreResult<Vec<Exercise>> {
        Ok(self.tables.lock().await.exercises.values().cloned().collect())
    }

    async fn get_exercise(&self, id: i64) -> StoreResult<Exercise> {
        found(&self.tables.lock().await.exercises, "exercise", id)
    }

    async fn create_exercise(&self, new_exercise: NewExercise) -> StoreResult<Exercise> {
        let mut tables = self.tables.lock().await;
        if tables.exercise_title_taken(&new_exercise.title, None) {
            return Err(StoreError::Conflict(format!(
                "Exercise {} already exists",
                new_exercise.title
            )));
        }

        let id = tables.allocate();
        let exercise = Exercise {
            id,
            title: new_exercise.title,
            description: new_exercise.description,
            category: new_exercise.category,
            muscle_group: new_exercise.muscle_group,
            equipment: new_exercise.equipment,
            media_file_url: new_exercise.media_file_url,
        };
        tables.exercises.insert(id, exercise.clone());
        Ok(exercise)
    }

    async fn update_exercise(&self, id: i64, changes: ExerciseChanges) -> StoreResult<Exercise> {
        let mut tables = self.tables.lock().await;
        ensure_exists(&tables.exercises, "exercise", id)?;
        if let Some(title) = &changes.title {
            if tables.exercise_title_taken(title, Some(id)) {
                return Err(StoreError::Conflict(format!(
                    "Exercise {} already exists",
                    title
                )));
            }
        }

        let exercise = found_mut(&mut tables.exercises, "exercise", id)?;
        changes.apply_to(exercise);
        Ok(exercise.clone())
    }

    async fn set_exercise_media(&self, id: i64, url: Option<String>) -> StoreResult<Exercise> {
        let mut tables = self.tables.lock().await;
        let exercise = found_mut(&mut tables.exercises, "exercise", id)?;
        exercise.media_file_url = url;
        Ok(exercise.clone())
    }

    async fn delete_exercise(&self, id: i64) -> StoreResult<()> {
        let mut tables = self.tables.lock().await;
        ensure_exists(&tables.exercises, "exercise", id)?;
        if tables.catalog_in_use(id) {
            return Err(StoreError::InUse(format!(
                "Exercise {} is referenced by workout sessions or records",
                id
            )));
        }
        tables.exercises.remove(&id);
        Ok(())
    }

    async fn list_custom_exercises(&self) -> StoreResult<Vec<CustomExercise>> {
        Ok(self
            .tables
            .lock()
            .await
            .custom_exercises
            .values()
            .cloned()
            .collect())
    }

    async fn user_custom_exercises(&self, user_id: i64) -> StoreResult<Vec<CustomExercise>> {
        let tables = self.tables.lock().await;
        Ok(tables
            .custom_exercises
            .values()
            .filter(|c| c.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn get_custom_exercise(&self, id: i64) -> StoreResult<CustomExercise> {
        found(
            &self.tables.lock().await.custom_exercises,
            "custom exercise",
            id,
        )
    }

    async fn create_custom_exercise(
        &self,
        user_id: i64,
        new_exercise: NewExercise,
    ) -> StoreResult<CustomExercise> {
        let mut tables = self.tables.lock().await;
        ensure_exists(&tables.users, "user", user_id)?;
        if tables.custom_title_taken(user_id, &new_exercise.title, None) {
            return Err(StoreError::Conflict(format!(
                "Custom exercise {} already exists",
                new_exercise.title
            )));
        }

        let id = tables.allocate();
        let exercise = CustomExercise {
            id,
            user_id,
            title: new_exercise.title,
            description: new_exercise.description,
            category: new_exercise.category,
            muscle_group: new_exercise.muscle_group,
            equipment: new_exercise.equipment,
            media_file_url: new_exercise.media_file_url,
        };
        tables.custom_exercises.insert(id, exercise.clone());
        Ok(exercise)
    }

    async fn update_custom_exercise(
        &self,
        id: i64,
        changes: ExerciseChanges,
    ) -> StoreResult<CustomExercise> {
        let mut tables = self.tables.lock().await;
        let user_id = found(&tables.custom_exercises, "custom exercise", id)?.user_id;
        if let Some(title) = &changes.title {
            if tables.custom_title_taken(user_id, title, Some(id)) {
                return Err(StoreError::Conflict(format!(
                    "Custom exercise {} already exists",
                    title
                )));
            }
        }

        let exercise = found_mut(&mut tables.custom_exercises, "custom exercise", id)?;
        changes.apply_to(exercise);
        Ok(exercise.clone())
    }

    async fn set_custom_exercise_media(
        &self,
        id: i64,
        url: Option<String>,
    ) -> StoreResult<CustomExercise> {
        let mut tables = self.tables.lock().await;
        let exercise = found_mut(&mut tables.custom_exercises, "custom exercise", id)?;
        exercise.media_file_url = url;
        Ok(exercise.clone())
    }

    async fn delete_custom_exercise(&self, id: i64) -> StoreResult<()> {
        let mut tables = self.tables.lock().await;
        ensure_exists(&tables.custom_exercises, "custom exercise", id)?;
        tables.remove_custom_exercise(id);
        Ok(())
    }

    async fn list_records(&self) -> StoreResult<Vec<Record>> {
        Ok(self.tables.lock().await.records.values().cloned().collect())
    }

    async fn user_records(&self, user_id: i64) -> StoreResult<Vec<Record>> {
        let tables = self.tables.lock().await;
        Ok(tables
            .records
            .values()
            .filter(|r| r.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn get_record(&self, id: i64) -> StoreResult<Record> {
        found(&self.tables.lock().await.records, "record", id)
    }

    async fn create_record(&self, user_id: i64, new_record: NewRecord) -> StoreResult<Record> {
        let exercise = new_record.exercise_ref()?;
        let mut tables = self.tables.lock().await;
        ensure_exists(&tables.users, "user", user_id)?;

        let id = tables.allocate();
        let record = Record {
            id,
            user_id,
            difficulty: new_record.difficulty,
            sets: new_record.sets,
            reps: new_record.reps,
            rest: new_record.rest,
            weight_lifted: new_record.weight_lifted,
            user_weight: new_record.user_weight,
            location: new_record.location,
            notes: new_record.notes,
            date: Utc::now(),
            exercise,
        };
        tables.records.insert(id, record.clone());
        Ok(record)
    }

    async fn update_record(&self, id: i64, changes: RecordChanges) -> StoreResult<Record> {
        let mut tables = self.tables.lock().await;
        let record = found_mut(&mut tables.records, "record", id)?;
        let mut updated = record.clone();
        changes.apply(&mut updated)?;
        *record = updated.clone();
        Ok(updated)
    }

    async fn delete_record(&self, id: i64) -> StoreResult<()> {
        let mut tables = self.tables.lock().await;
        tables
            .records
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| StoreError::not_found("record", id))
    }
}
