//! Authentication service routes

use axum::{
    Extension, Json, Router, async_trait,
    extract::{FromRequest, Path, Request, State},
    http::StatusCode,
    middleware,
    response::IntoResponse,
    routing::{get, post},
};
use common::jwt::{Claims, TokenType};
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use serde_json::json;
use store::{
    models::{LoginCredentials, Registration, User, role::ADMIN},
    password::verify_password,
    validation::{normalize_email, validate_name},
};
use tower_http::trace::TraceLayer;
use tracing::{error, info};

use crate::{
    error::{AuthError, AuthResult},
    middleware::{Caller, auth_middleware},
    rate_limiter::Attempt,
    state::AppState,
};

/// Tokens issued on signup, login and refresh
#[derive(Serialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub refresh_token: String,
    pub token_type: String,
    pub expires_in: u64,
}

/// Response for signup and login
#[derive(Serialize)]
pub struct SessionResponse {
    pub user: User,
    #[serde(flatten)]
    pub tokens: TokenResponse,
}

/// Request carrying a refresh token (refresh and logout)
#[derive(Deserialize)]
pub struct RefreshTokenRequest {
    pub refresh_token: String,
}

/// JSON body whose rejections become 400 responses
pub struct ValidJson<T>(pub T);

#[async_trait]
impl<T, S> FromRequest<S> for ValidJson<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        Json::<T>::from_request(req, state)
            .await
            .map(|Json(value)| ValidJson(value))
            .map_err(|rejection| AuthError::BadRequest(rejection.body_text()))
    }
}

/// Create the router for the authentication service
pub fn create_router(state: AppState) -> Router {
    let admin_routes = Router::new()
        .route(
            "/auth/admin/users/:user_id/roles/:role_name",
            post(assign_role),
        )
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ));

    Router::new()
        .route("/health", get(health_check))
        .route("/auth/signup", post(signup))
        .route("/auth/login", post(login))
        .route("/auth/admin/login", post(admin_login))
        .route("/auth/refresh", post(refresh_token))
        .route("/auth/logout", post(logout))
        .merge(admin_routes)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Health check endpoint
pub async fn health_check(State(state): State<AppState>) -> AuthResult<impl IntoResponse> {
    let store_up = state.store.health_check().await.unwrap_or_else(|e| {
        error!("Store health check failed: {}", e);
        false
    });

    if !store_up {
        return Err(AuthError::InternalServerError);
    }

    Ok(Json(json!({
        "status": "ok",
        "service": "auth-service"
    })))
}

fn issue_tokens(state: &AppState, email: &str) -> AuthResult<TokenResponse> {
    Ok(TokenResponse {
        access_token: state.jwt_service.generate_access_token(email)?,
        refresh_token: state.jwt_service.generate_refresh_token(email)?,
        token_type: "Bearer".to_string(),
        expires_in: state.jwt_service.access_token_expiry(),
    })
}

/// Validate a refresh token that has not been revoked
async fn live_refresh_claims(state: &AppState, token: &str) -> AuthResult<Claims> {
    let claims = state
        .jwt_service
        .validate_typed(token, TokenType::Refresh)
        .map_err(|_| AuthError::Unauthorized)?;

    if state.revocations.is_revoked(&claims.jti).await? {
        return Err(AuthError::Unauthorized);
    }

    Ok(claims)
}

async fn revoke(state: &AppState, claims: &Claims) -> AuthResult<()> {
    let ttl = state.jwt_service.remaining_lifetime(claims)?;
    state.revocations.revoke(&claims.jti, ttl).await?;
    Ok(())
}

/// Rate-limit, look up and verify a login attempt
async fn authenticate(state: &AppState, credentials: &LoginCredentials) -> AuthResult<User> {
    let email = normalize_email(&credentials.email);
    if let Attempt::Banned { retry_after } = state.rate_limiter.attempt(&email).await {
        return Err(AuthError::TooManyRequests {
            retry_after: retry_after.as_secs().max(1),
        });
    }

    let user = state
        .store
        .find_user_by_email(&email)
        .await?
        .ok_or_else(|| AuthError::NotFound("User not found".to_string()))?;

    if !verify_password(&credentials.password, &user.password_hash) {
        info!("Failed login for user {}", user.id);
        return Err(AuthError::Unauthorized);
    }

    Ok(user)
}

/// Register a new user and sign them in
pub async fn signup(
    State(state): State<AppState>,
    ValidJson(payload): ValidJson<Registration>,
) -> AuthResult<impl IntoResponse> {
    let user = state.store.create_user(payload.into_new_user()?).await?;
    info!("Signed up user {}", user.id);

    let tokens = issue_tokens(&state, &user.email)?;
    Ok((StatusCode::CREATED, Json(SessionResponse { user, tokens })))
}

/// User login endpoint
pub async fn login(
    State(state): State<AppState>,
    ValidJson(credentials): ValidJson<LoginCredentials>,
) -> AuthResult<impl IntoResponse> {
    let user = authenticate(&state, &credentials).await?;
    info!("User {} logged in", user.id);

    let tokens = issue_tokens(&state, &user.email)?;
    Ok(Json(SessionResponse { user, tokens }))
}

/// Login restricted to administrators
pub async fn admin_login(
    State(state): State<AppState>,
    ValidJson(credentials): ValidJson<LoginCredentials>,
) -> AuthResult<impl IntoResponse> {
    let user = authenticate(&state, &credentials).await?;

    let roles = state.store.user_roles(user.id).await?;
    if !roles.iter().any(|role| role.name == ADMIN) {
        return Err(AuthError::Forbidden);
    }
    info!("Admin {} logged in", user.id);

    let tokens = issue_tokens(&state, &user.email)?;
    Ok(Json(SessionResponse { user, tokens }))
}

/// Exchange a refresh token for a new token pair; the old refresh token is
/// revoked
pub async fn refresh_token(
    State(state): State<AppState>,
    ValidJson(payload): ValidJson<RefreshTokenRequest>,
) -> AuthResult<impl IntoResponse> {
    let claims = live_refresh_claims(&state, &payload.refresh_token).await?;

    let user = state
        .store
        .find_user_by_email(&claims.sub)
        .await?
        .ok_or(AuthError::Unauthorized)?;

    revoke(&state, &claims).await?;
    info!("Rotated refresh token for user {}", user.id);

    Ok(Json(issue_tokens(&state, &user.email)?))
}

/// Logout endpoint
pub async fn logout(
    State(state): State<AppState>,
    ValidJson(payload): ValidJson<RefreshTokenRequest>,
) -> AuthResult<impl IntoResponse> {
    let claims = state
        .jwt_service
        .validate_typed(&payload.refresh_token, TokenType::Refresh)
        .map_err(|_| AuthError::Unauthorized)?;

    revoke(&state, &claims).await?;
    info!("Logged out {}", claims.sub);

    Ok(Json(json!({"message": "Logged out successfully"})))
}

/// Grant a role by name, creating the role when it does not exist yet
pub async fn assign_role(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
    Path((user_id, role_name)): Path<(i64, String)>,
) -> AuthResult<impl IntoResponse> {
    state.store.get_user(user_id).await?;
    if !caller.has_role(ADMIN) {
        return Err(AuthError::Forbidden);
    }

    let role = match state.store.find_role_by_name(&role_name).await? {
        Some(role) => role,
        None => {
            validate_name("role_name", &role_name)?;
            info!("Creating role {}", role_name);
            state.store.create_role(role_name.trim()).await?
        }
    };

    let status = if state.store.assign_role(user_id, role.id).await? {
        info!(
            "User {} granted role {} to user {}",
            caller.user.id, role.name, user_id
        );
        StatusCode::CREATED
    } else {
        StatusCode::OK
    };

    Ok((status, Json(state.store.user_roles(user_id).await?)))
}
