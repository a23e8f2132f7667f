//! PgStore against a live PostgreSQL server
//!
//! Ignored by default; run with `cargo test -p store -- --ignored` once
//! `DATABASE_URL` points at a disposable database.

use common::database::{DatabaseConfig, init_pool};
use serde_json::json;
use store::{
    FitnessStore, PgStore, StoreError,
    models::{ExerciseRef, NewUser},
};

async fn store() -> PgStore {
    let pool = init_pool(&DatabaseConfig::from_env().unwrap()).await.unwrap();
    let store = PgStore::new(pool);
    store.migrate().await.unwrap();
    store
}

fn unique(prefix: &str) -> String {
    format!(
        "{}-{}",
        prefix,
        chrono::Utc::now().timestamp_nanos_opt().unwrap_or_default()
    )
}

fn new_user(email: &str) -> NewUser {
    NewUser {
        first_name: "A".to_string(),
        last_name: "B".to_string(),
        email: email.to_string(),
        password_hash: "hash".to_string(),
    }
}

#[tokio::test]
#[ignore = "requires a running PostgreSQL server"]
async fn test_user_lifecycle_cascades() {
    let store = store().await;
    let email = format!("{}@example.com", unique("user"));

    let user = store.create_user(new_user(&email)).await.unwrap();
    let roles = store.user_roles(user.id).await.unwrap();
    assert_eq!(roles.len(), 1);
    assert_eq!(roles[0].name, "User");
    assert!(matches!(
        store.create_user(new_user(&email)).await,
        Err(StoreError::Conflict(_))
    ));

    let plan = store
        .create_plan(
            user.id,
            serde_json::from_value(json!({
                "goal": "Bulk",
                "current_weight": 70,
                "target_weight": 75,
                "duration": 12,
                "days_in_week": 3
            }))
            .unwrap(),
        )
        .await
        .unwrap();
    let day = store
        .create_day(plan.id, serde_json::from_value(json!({"title": "Push"})).unwrap())
        .await
        .unwrap();
    let custom = store
        .create_custom_exercise(
            user.id,
            serde_json::from_value(json!({
                "title": "Curl",
                "category": "Strength",
                "muscle_group": "Arms"
            }))
            .unwrap(),
        )
        .await
        .unwrap();
    let session = store
        .create_workout_session(
            day.id,
            serde_json::from_value(json!({
                "sets": 3,
                "reps": 10,
                "rest": 60,
                "custom_exercise_id": custom.id
            }))
            .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(session.exercise, ExerciseRef::Custom(custom.id));

    store.delete_custom_exercise(custom.id).await.unwrap();
    let session = store.get_workout_session(session.id).await.unwrap();
    assert_eq!(session.exercise, ExerciseRef::None);

    store.delete_user(user.id).await.unwrap();
    assert!(matches!(
        store.get_plan(plan.id).await,
        Err(StoreError::NotFound { .. })
    ));
    assert!(matches!(
        store.get_workout_session(session.id).await,
        Err(StoreError::NotFound { .. })
    ));
}

#[tokio::test]
#[ignore = "requires a running PostgreSQL server"]
async fn test_referenced_catalog_exercise_is_in_use() {
    let store = store().await;
    let user = store
        .create_user(new_user(&format!("{}@example.com", unique("user"))))
        .await
        .unwrap();
    let exercise = store
        .create_exercise(
            serde_json::from_value(json!({
                "title": unique("Squat"),
                "category": "Strength",
                "muscle_group": "Legs"
            }))
            .unwrap(),
        )
        .await
        .unwrap();

    store
        .create_record(
            user.id,
            serde_json::from_value(json!({
                "difficulty": 3,
                "sets": 5,
                "reps": 5,
                "rest": 120,
                "user_weight": 80,
                "location": "Gym",
                "exercise_id": exercise.id
            }))
            .unwrap(),
        )
        .await
        .unwrap();

    assert!(matches!(
        store.delete_exercise(exercise.id).await,
        Err(StoreError::InUse(_))
    ));

    store.delete_user(user.id).await.unwrap();
    store.delete_exercise(exercise.id).await.unwrap();
}
