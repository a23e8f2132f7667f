//! Router-level tests against the in-memory store and object store

use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Request, StatusCode, header},
};
use common::jwt::{JwtConfig, JwtService};
use media::{MediaConfig, MediaService, MemoryObjectStore};
use serde_json::{Value, json};
use std::sync::Arc;
use store::{MemoryStore, models::UserChanges};
use tower::ServiceExt;

use crate::{routes::create_router, state::AppState};

const BOUNDARY: &str = "fitjourney-test-boundary";

struct TestApp {
    router: Router,
    state: AppState,
    objects: MemoryObjectStore,
}

fn app() -> TestApp {
    let objects = MemoryObjectStore::new();
    let state = AppState {
        store: Arc::new(MemoryStore::new()),
        media: MediaService::new(Arc::new(objects.clone()), MediaConfig::default()),
        jwt_service: JwtService::new(JwtConfig::with_secret("test-secret")).unwrap(),
    };

    TestApp {
        router: create_router(state.clone()),
        state,
        objects,
    }
}

impl TestApp {
    async fn send(&self, request: Request<Body>) -> (StatusCode, Value) {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, body)
    }

    async fn request(
        &self,
        method: &str,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        let body = match body {
            Some(value) => {
                builder = builder.header(header::CONTENT_TYPE, "application/json");
                Body::from(value.to_string())
            }
            None => Body::empty(),
        };

        self.send(builder.body(body).unwrap()).await
    }

    async fn upload(&self, uri: &str, token: &str, file_name: &str) -> (StatusCode, Value) {
        let mut body = format!(
            "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"{file_name}\"\r\nContent-Type: image/png\r\n\r\n"
        )
        .into_bytes();
        body.extend_from_slice(b"\x89PNG fake image");
        body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());

        let request = Request::builder()
            .method("PUT")
            .uri(uri)
            .header(header::AUTHORIZATION, format!("Bearer {}", token))
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .body(Body::from(body))
            .unwrap();

        self.send(request).await
    }

    /// Register through the public endpoint and mint an access token
    async fn register(&self, email: &str) -> (i64, String) {
        let (status, body) = self
            .request(
                "POST",
                "/api/v1/users",
                None,
                Some(json!({
                    "first_name": "A",
                    "last_name": "B",
                    "email": email,
                    "password": "x"
                })),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED);

        let token = self.state.jwt_service.generate_access_token(email).unwrap();
        (body["id"].as_i64().unwrap(), token)
    }

    async fn grant(&self, user_id: i64, role_name: &str) {
        let role = self
            .state
            .store
            .find_role_by_name(role_name)
            .await
            .unwrap()
            .unwrap();
        self.state.store.assign_role(user_id, role.id).await.unwrap();
    }

    async fn create_plan(&self, user_id: i64, token: &str) -> i64 {
        let (status, body) = self
            .request(
                "POST",
                &format!("/api/v1/users/{}/plans", user_id),
                Some(token),
                Some(json!({
                    "goal": "Bulk",
                    "current_weight": 70,
                    "target_weight": 75,
                    "duration": 12,
                    "days_in_week": 3
                })),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED);
        body["id"].as_i64().unwrap()
    }

    async fn create_custom_exercise(
        &self,
        user_id: i64,
        token: &str,
        title: &str,
    ) -> (StatusCode, Value) {
        self.request(
            "POST",
            &format!("/api/v1/users/{}/custom_exercises", user_id),
            Some(token),
            Some(json!({
                "title": title,
                "category": "Strength",
                "muscle_group": "Arms"
            })),
        )
        .await
    }
}

#[tokio::test]
async fn test_registration_hides_password_and_rejects_duplicate_email() {
    let app = app();
    let payload = json!({
        "first_name": "A",
        "last_name": "B",
        "email": "a@b.com",
        "password": "x"
    });

    let (status, body) = app
        .request("POST", "/api/v1/users", None, Some(payload.clone()))
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["email"], "a@b.com");
    assert!(body.get("password").is_none());
    assert!(body.get("password_hash").is_none());

    let (status, body) = app
        .request("POST", "/api/v1/users", None, Some(payload))
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert!(body["error"].as_str().unwrap().starts_with("Conflict"));
    assert_eq!(app.state.store.list_users().await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_registration_requires_valid_email() {
    let app = app();
    let (status, _) = app
        .request(
            "POST",
            "/api/v1/users",
            None,
            Some(json!({"first_name": "A", "last_name": "B", "email": "nope", "password": "x"})),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_protected_routes_require_an_access_token() {
    let app = app();
    let (user_id, _) = app.register("a@b.com").await;
    let uri = format!("/api/v1/users/{}", user_id);

    let (status, body) = app.request("GET", &uri, None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "Unauthorized");

    let refresh = app
        .state
        .jwt_service
        .generate_refresh_token("a@b.com")
        .unwrap();
    let (status, _) = app.request("GET", &uri, Some(&refresh), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = app.request("GET", &uri, Some("garbage"), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let ghost = app
        .state
        .jwt_service
        .generate_access_token("ghost@b.com")
        .unwrap();
    let (status, _) = app.request("GET", &uri, Some(&ghost), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_plan_without_days_in_week_names_the_field() {
    let app = app();
    let (user_id, token) = app.register("a@b.com").await;

    let (status, body) = app
        .request(
            "POST",
            &format!("/api/v1/users/{}/plans", user_id),
            Some(&token),
            Some(json!({
                "goal": "Cut",
                "current_weight": 80,
                "target_weight": 75,
                "duration": 8
            })),
        )
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("days_in_week"));
}

#[tokio::test]
async fn test_numeric_strings_are_accepted() {
    let app = app();
    let (user_id, token) = app.register("a@b.com").await;

    let (status, body) = app
        .request(
            "POST",
            &format!("/api/v1/users/{}/plans", user_id),
            Some(&token),
            Some(json!({
                "goal": "Cut",
                "current_weight": "80.5",
                "target_weight": 75,
                "duration": "8",
                "days_in_week": 4
            })),
        )
        .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["current_weight"], 80.5);
    assert_eq!(body["duration"], 8);
}

#[tokio::test]
async fn test_foreign_plan_is_forbidden_unless_admin() {
    let app = app();
    let (alice, alice_token) = app.register("alice@b.com").await;
    let (bob, bob_token) = app.register("bob@b.com").await;
    let plan_id = app.create_plan(alice, &alice_token).await;

    let uri = format!("/api/v1/users/{}/plans/{}", alice, plan_id);
    let (status, body) = app.request("GET", &uri, Some(&bob_token), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"], "Access forbidden: Insufficient permissions");

    let (status, _) = app
        .request("GET", &format!("/api/v1/plans/{}", plan_id), Some(&bob_token), None)
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    app.grant(bob, "Admin").await;
    let (status, body) = app.request("GET", &uri, Some(&bob_token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["id"], plan_id);
}

#[tokio::test]
async fn test_missing_resource_is_not_found_before_forbidden() {
    let app = app();
    let (alice, _) = app.register("alice@b.com").await;
    let (_, bob_token) = app.register("bob@b.com").await;

    let (status, _) = app
        .request(
            "GET",
            &format!("/api/v1/users/{}/plans/9999", alice),
            Some(&bob_token),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = app
        .request("GET", "/api/v1/users/9999", Some(&bob_token), None)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_global_listings_are_role_gated() {
    let app = app();
    let (user_id, token) = app.register("a@b.com").await;

    let (status, _) = app.request("GET", "/api/v1/plans", Some(&token), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    app.grant(user_id, "Developer").await;
    let (status, body) = app.request("GET", "/api/v1/plans", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!([]));
}

#[tokio::test]
async fn test_unknown_update_key_rejects_the_whole_update() {
    let app = app();
    let (user_id, token) = app.register("a@b.com").await;
    let plan_id = app.create_plan(user_id, &token).await;
    let uri = format!("/api/v1/users/{}/plans/{}", user_id, plan_id);

    let (status, body) = app
        .request("PUT", &uri, Some(&token), Some(json!({"goal": "Cut", "colour": "red"})))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("colour"));

    let (_, body) = app.request("GET", &uri, Some(&token), None).await;
    assert_eq!(body["goal"], "Bulk");

    let (status, body) = app
        .request("PUT", &uri, Some(&token), Some(json!({"goal": "Cut"})))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["goal"], "Cut");

    let (status, body) = app.request("PUT", &uri, Some(&token), Some(json!({}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Bad Request: No fields to update");
}

#[tokio::test]
async fn test_password_change_requires_current_password() {
    let app = app();
    let (user_id, token) = app.register("a@b.com").await;
    let uri = format!("/api/v1/users/{}", user_id);

    let (status, _) = app
        .request("PUT", &uri, Some(&token), Some(json!({"password": "new"})))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = app
        .request(
            "PUT",
            &uri,
            Some(&token),
            Some(json!({"password": "new", "current_password": "wrong"})),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = app
        .request(
            "PUT",
            &uri,
            Some(&token),
            Some(json!({"password": "new", "current_password": "x"})),
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    let user = app.state.store.get_user(user_id).await.unwrap();
    assert!(store::password::verify_password("new", &user.password_hash));
}

#[tokio::test]
async fn test_custom_exercise_titles_are_unique_per_user() {
    let app = app();
    let (alice, alice_token) = app.register("alice@b.com").await;
    let (bob, bob_token) = app.register("bob@b.com").await;

    let (status, _) = app.create_custom_exercise(alice, &alice_token, "Curl").await;
    assert_eq!(status, StatusCode::CREATED);
    let (status, _) = app.create_custom_exercise(bob, &bob_token, "Curl").await;
    assert_eq!(status, StatusCode::CREATED);
    let (status, _) = app.create_custom_exercise(alice, &alice_token, "Curl").await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_deleting_custom_exercise_with_vanished_media_succeeds() {
    let app = app();
    let (user_id, token) = app.register("a@b.com").await;
    let (_, body) = app.create_custom_exercise(user_id, &token, "Curl").await;
    let exercise_id = body["id"].as_i64().unwrap();
    let uri = format!("/api/v1/users/{}/custom_exercises/{}", user_id, exercise_id);

    let (status, body) = app
        .upload(&format!("{}/media", uri), &token, "curl.png")
        .await;
    assert_eq!(status, StatusCode::OK);
    let url = body["media_file_url"].as_str().unwrap().to_string();
    assert!(url.ends_with(&format!("Users/{}/custom_exercises/curl.png", user_id)));

    app.objects.evict(&url).await;

    let (status, _) = app.request("DELETE", &uri, Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = app.request("GET", &uri, Some(&token), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_removing_vanished_media_clears_the_reference() {
    let app = app();
    let (user_id, token) = app.register("a@b.com").await;
    let (_, body) = app.create_custom_exercise(user_id, &token, "Curl").await;
    let media_uri = format!(
        "/api/v1/users/{}/custom_exercises/{}/media",
        user_id,
        body["id"].as_i64().unwrap()
    );

    let (_, body) = app.upload(&media_uri, &token, "curl.png").await;
    app.objects
        .evict(body["media_file_url"].as_str().unwrap())
        .await;

    let (status, body) = app.request("DELETE", &media_uri, Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["media_file_url"], Value::Null);
}

#[tokio::test]
async fn test_replacing_profile_picture_releases_the_old_object() {
    let app = app();
    let (user_id, token) = app.register("a@b.com").await;
    let uri = format!("/api/v1/users/{}/profile_picture", user_id);

    let (status, first) = app.upload(&uri, &token, "me.png").await;
    assert_eq!(status, StatusCode::OK);
    let (status, second) = app.upload(&uri, &token, "me2.png").await;
    assert_eq!(status, StatusCode::OK);

    assert_ne!(first["profile_picture"], second["profile_picture"]);
    assert!(
        app.objects
            .get(first["profile_picture"].as_str().unwrap())
            .await
            .is_none()
    );
    assert_eq!(app.objects.file_count().await, 1);

    let (status, _) = app.upload(&uri, &token, "me2.png").await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_unsupported_upload_type_is_rejected() {
    let app = app();
    let (user_id, token) = app.register("a@b.com").await;

    let request = Request::builder()
        .method("PUT")
        .uri(format!("/api/v1/users/{}/profile_picture", user_id))
        .header(header::AUTHORIZATION, format!("Bearer {}", token))
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(format!(
            "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"notes.txt\"\r\nContent-Type: text/plain\r\n\r\nhello\r\n--{BOUNDARY}--\r\n"
        )))
        .unwrap();

    let (status, _) = app.send(request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(app.objects.file_count().await, 0);
}

#[tokio::test]
async fn test_media_of_another_user_cannot_be_linked_or_released() {
    let app = app();
    let (alice, alice_token) = app.register("alice@b.com").await;
    let (mallory, mallory_token) = app.register("mallory@b.com").await;

    let (status, body) = app
        .upload(
            &format!("/api/v1/users/{}/profile_picture", alice),
            &alice_token,
            "me.png",
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    let alice_url = body["profile_picture"].as_str().unwrap().to_string();

    let mallory_picture = format!("/api/v1/users/{}/profile_picture", mallory);
    let (status, _) = app
        .request(
            "PUT",
            &mallory_picture,
            Some(&mallory_token),
            Some(json!({"url": alice_url})),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = app
        .request(
            "PUT",
            &format!("/api/v1/users/{}", mallory),
            Some(&mallory_token),
            Some(json!({"profile_picture": alice_url})),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = app
        .request(
            "POST",
            &format!("/api/v1/users/{}/custom_exercises", mallory),
            Some(&mallory_token),
            Some(json!({
                "title": "Curl",
                "category": "Strength",
                "muscle_group": "Arms",
                "media_file_url": alice_url
            })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    // a reference that predates the check is dropped, not deleted
    app.state
        .store
        .update_user(
            mallory,
            UserChanges {
                profile_picture: Some(Some(alice_url.clone())),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    let (status, body) = app
        .request("DELETE", &mallory_picture, Some(&mallory_token), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["profile_picture"], Value::Null);

    assert!(app.objects.get(&alice_url).await.is_some());
    let alice = app.state.store.get_user(alice).await.unwrap();
    assert_eq!(alice.profile_picture.as_deref(), Some(alice_url.as_str()));
}

#[tokio::test]
async fn test_emails_are_unique_regardless_of_case() {
    let app = app();
    let (user_id, _) = app.register("a@b.com").await;

    let (status, _) = app
        .request(
            "POST",
            "/api/v1/users",
            None,
            Some(json!({
                "first_name": "A",
                "last_name": "B",
                "email": " A@B.com ",
                "password": "x"
            })),
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (other_id, other_token) = app.register("c@d.com").await;
    let (status, _) = app
        .request(
            "PUT",
            &format!("/api/v1/users/{}", other_id),
            Some(&other_token),
            Some(json!({"email": "A@b.COM"})),
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, body) = app
        .request(
            "PUT",
            &format!("/api/v1/users/{}", other_id),
            Some(&other_token),
            Some(json!({"email": "New@D.com"})),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["email"], "new@d.com");
    assert_eq!(
        app.state.store.get_user(user_id).await.unwrap().email,
        "a@b.com"
    );
}

#[tokio::test]
async fn test_seeded_roles_cannot_be_renamed_or_deleted() {
    let app = app();
    let (admin, admin_token) = app.register("admin@b.com").await;
    app.grant(admin, "Admin").await;

    for name in ["Admin", "Developer", "User"] {
        let role = app
            .state
            .store
            .find_role_by_name(name)
            .await
            .unwrap()
            .unwrap();
        let uri = format!("/api/v1/roles/{}", role.id);

        let (status, _) = app
            .request("PUT", &uri, Some(&admin_token), Some(json!({"role_name": "Renamed"})))
            .await;
        assert_eq!(status, StatusCode::CONFLICT);
        let (status, _) = app.request("DELETE", &uri, Some(&admin_token), None).await;
        assert_eq!(status, StatusCode::CONFLICT);
    }

    let (status, coach) = app
        .request("POST", "/api/v1/roles", Some(&admin_token), Some(json!({"role_name": "Coach"})))
        .await;
    assert_eq!(status, StatusCode::CREATED);
    let uri = format!("/api/v1/roles/{}", coach["id"]);
    let (status, body) = app
        .request("PUT", &uri, Some(&admin_token), Some(json!({"role_name": "Trainer"})))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], "Trainer");
    let (status, _) = app.request("DELETE", &uri, Some(&admin_token), None).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_session_links_are_validated() {
    let app = app();
    let (alice, alice_token) = app.register("alice@b.com").await;
    let (bob, bob_token) = app.register("bob@b.com").await;
    let (_, body) = app.create_custom_exercise(alice, &alice_token, "Curl").await;
    let alice_exercise = body["id"].as_i64().unwrap();

    let plan_id = app.create_plan(bob, &bob_token).await;
    let (_, day) = app
        .request(
            "POST",
            &format!("/api/v1/plans/{}/days", plan_id),
            Some(&bob_token),
            Some(json!({"title": "Push"})),
        )
        .await;
    let sessions_uri = format!("/api/v1/days/{}/workout_sessions", day["id"]);

    let (status, _) = app
        .request(
            "POST",
            &sessions_uri,
            Some(&bob_token),
            Some(json!({"sets": 3, "reps": 10, "rest": 60, "custom_exercise_id": alice_exercise})),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = app
        .request(
            "POST",
            &sessions_uri,
            Some(&bob_token),
            Some(json!({"sets": 3, "reps": 10, "rest": 60, "exercise_id": 1, "custom_exercise_id": 2})),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = app
        .request(
            "POST",
            &sessions_uri,
            Some(&bob_token),
            Some(json!({"sets": 3, "reps": 10, "rest": 60})),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["exercise_id"], Value::Null);
    assert_eq!(body["custom_exercise_id"], Value::Null);
}

#[tokio::test]
async fn test_referenced_catalog_exercise_cannot_be_deleted() {
    let app = app();
    let (dev, dev_token) = app.register("dev@b.com").await;
    app.grant(dev, "Developer").await;
    let (user_id, token) = app.register("a@b.com").await;

    let (status, _) = app
        .request(
            "POST",
            "/api/v1/exercises",
            Some(&token),
            Some(json!({"title": "Squat", "category": "Strength", "muscle_group": "Legs"})),
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, exercise) = app
        .request(
            "POST",
            "/api/v1/exercises",
            Some(&dev_token),
            Some(json!({"title": "Squat", "category": "Strength", "muscle_group": "Legs"})),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, _) = app
        .request(
            "POST",
            &format!("/api/v1/users/{}/records", user_id),
            Some(&token),
            Some(json!({
                "difficulty": 3,
                "sets": 5,
                "reps": 5,
                "rest": 120,
                "user_weight": 80,
                "location": "Gym",
                "exercise_id": exercise["id"]
            })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);

    let uri = format!("/api/v1/exercises/{}", exercise["id"]);
    let (status, _) = app.request("DELETE", &uri, Some(&dev_token), None).await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, _) = app.request("GET", &uri, Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_assigning_a_held_role_is_idempotent() {
    let app = app();
    let (admin, admin_token) = app.register("admin@b.com").await;
    app.grant(admin, "Admin").await;
    let (user_id, token) = app.register("a@b.com").await;
    let uri = format!("/api/v1/users/{}/roles/Developer", user_id);

    let (status, _) = app.request("POST", &uri, Some(&token), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = app.request("POST", &uri, Some(&admin_token), None).await;
    assert_eq!(status, StatusCode::CREATED);
    let (status, roles) = app.request("POST", &uri, Some(&admin_token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(roles.as_array().unwrap().len(), 2);

    let (status, _) = app
        .request(
            "POST",
            &format!("/api/v1/users/{}/roles/Wizard", user_id),
            Some(&admin_token),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_deleting_a_user_removes_everything_they_own() {
    let app = app();
    let (user_id, token) = app.register("a@b.com").await;
    let plan_id = app.create_plan(user_id, &token).await;
    let (_, day) = app
        .request(
            "POST",
            &format!("/api/v1/plans/{}/days", plan_id),
            Some(&token),
            Some(json!({"title": "Legs", "session_duration": 45})),
        )
        .await;
    app.request(
        "POST",
        &format!("/api/v1/days/{}/workout_sessions", day["id"]),
        Some(&token),
        Some(json!({"sets": 3, "reps": 8, "rest": 90})),
    )
    .await;
    let (_, exercise) = app.create_custom_exercise(user_id, &token, "Curl").await;
    app.upload(
        &format!(
            "/api/v1/users/{}/custom_exercises/{}/media",
            user_id, exercise["id"]
        ),
        &token,
        "curl.png",
    )
    .await;

    let (status, _) = app
        .request("DELETE", &format!("/api/v1/users/{}", user_id), Some(&token), None)
        .await;
    assert_eq!(status, StatusCode::OK);

    let store = &app.state.store;
    assert!(store.list_plans().await.unwrap().is_empty());
    assert!(store.list_days().await.unwrap().is_empty());
    assert!(store.list_workout_sessions().await.unwrap().is_empty());
    assert!(store.list_custom_exercises().await.unwrap().is_empty());
    assert_eq!(app.objects.file_count().await, 0);
}

#[tokio::test]
async fn test_health_reports_store() {
    let app = app();
    let (status, body) = app.request("GET", "/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["store"], "up");
}
