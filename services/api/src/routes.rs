//! API service routes

use axum::{
    Router,
    extract::DefaultBodyLimit,
    middleware,
    routing::{get, post, put},
};
use tower_http::trace::TraceLayer;

use crate::{
    handlers::{
        custom_exercises, days, exercises, health, plans, records, roles, users, workout_sessions,
    },
    middleware::auth_middleware,
    state::AppState,
};

/// Headroom over the upload limit for multipart framing and other fields
const MULTIPART_OVERHEAD: usize = 64 * 1024;

/// Create the router for the API service
pub fn create_router(state: AppState) -> Router {
    let body_limit = usize::try_from(state.media.max_upload_bytes())
        .unwrap_or(usize::MAX)
        .saturating_add(MULTIPART_OVERHEAD);

    let protected_routes = Router::new()
        // users
        .route("/users", get(users::list_users))
        .route(
            "/users/:user_id",
            get(users::get_user)
                .put(users::update_user)
                .delete(users::delete_user),
        )
        .route(
            "/users/:user_id/profile_picture",
            put(users::put_profile_picture).delete(users::delete_profile_picture),
        )
        .route("/users/:user_id/roles", get(users::user_roles))
        .route(
            "/users/:user_id/roles/:role_name",
            post(users::assign_role).delete(users::revoke_role),
        )
        // roles
        .route("/roles", get(roles::list_roles).post(roles::create_role))
        .route(
            "/roles/:role_id",
            get(roles::get_role)
                .put(roles::rename_role)
                .delete(roles::delete_role),
        )
        .route("/roles/:role_id/users", get(roles::role_users))
        // plans
        .route("/plans", get(plans::list_plans))
        .route("/plans/:plan_id", get(plans::get_plan))
        .route(
            "/users/:user_id/plans",
            get(plans::user_plans).post(plans::create_plan),
        )
        .route(
            "/users/:user_id/plans/:plan_id",
            get(plans::get_user_plan)
                .put(plans::update_plan)
                .delete(plans::delete_plan),
        )
        // days
        .route("/days", get(days::list_days))
        .route("/days/:day_id", get(days::get_day))
        .route(
            "/plans/:plan_id/days",
            get(days::plan_days).post(days::create_day),
        )
        .route(
            "/plans/:plan_id/days/:day_id",
            get(days::get_plan_day)
                .put(days::update_day)
                .delete(days::delete_day),
        )
        // workout sessions
        .route(
            "/workout_sessions",
            get(workout_sessions::list_workout_sessions),
        )
        .route(
            "/workout_sessions/:session_id",
            get(workout_sessions::get_workout_session),
        )
        .route(
            "/days/:day_id/workout_sessions",
            get(workout_sessions::day_workout_sessions)
                .post(workout_sessions::create_workout_session),
        )
        .route(
            "/days/:day_id/workout_sessions/:session_id",
            get(workout_sessions::get_day_workout_session)
                .put(workout_sessions::update_workout_session)
                .delete(workout_sessions::delete_workout_session),
        )
        // catalog exercises
        .route(
            "/exercises",
            get(exercises::list_exercises).post(exercises::create_exercise),
        )
        .route(
            "/exercises/:exercise_id",
            get(exercises::get_exercise)
                .put(exercises::update_exercise)
                .delete(exercises::delete_exercise),
        )
        .route(
            "/exercises/:exercise_id/media",
            put(exercises::put_exercise_media).delete(exercises::delete_exercise_media),
        )
        // custom exercises
        .route(
            "/custom_exercises",
            get(custom_exercises::list_custom_exercises),
        )
        .route(
            "/custom_exercises/:exercise_id",
            get(custom_exercises::get_custom_exercise),
        )
        .route(
            "/users/:user_id/custom_exercises",
            get(custom_exercises::user_custom_exercises)
                .post(custom_exercises::create_custom_exercise),
        )
        .route(
            "/users/:user_id/custom_exercises/:exercise_id",
            get(custom_exercises::get_user_custom_exercise)
                .put(custom_exercises::update_custom_exercise)
                .delete(custom_exercises::delete_custom_exercise),
        )
        .route(
            "/users/:user_id/custom_exercises/:exercise_id/media",
            put(custom_exercises::put_custom_exercise_media)
                .delete(custom_exercises::delete_custom_exercise_media),
        )
        // records
        .route("/records", get(records::list_records))
        .route("/records/:record_id", get(records::get_record))
        .route(
            "/users/:user_id/records",
            get(records::user_records).post(records::create_record),
        )
        .route(
            "/users/:user_id/records/:record_id",
            get(records::get_user_record)
                .put(records::update_record)
                .delete(records::delete_record),
        )
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ));

    let api = Router::new()
        .route("/users", post(users::create_user))
        .merge(protected_routes);

    Router::new()
        .route("/health", get(health::health_check))
        .nest("/api/v1", api)
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
