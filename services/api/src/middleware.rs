//! Authentication middleware for JWT token validation

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use axum_extra::{
    TypedHeader,
    headers::{Authorization, authorization::Bearer},
};
use common::jwt::TokenType;
use store::models::role::{ADMIN, DEVELOPER};
use tracing::debug;

use crate::{error::ApiError, state::AppState};

/// The authenticated caller, resolved from the token's identity claim
#[derive(Debug, Clone)]
pub struct Principal {
    pub user_id: i64,
    pub roles: Vec<String>,
}

impl Principal {
    pub fn has_any_role(&self, roles: &[&str]) -> bool {
        self.roles.iter().any(|r| roles.contains(&r.as_str()))
    }

    /// Admins and developers may act on every user's resources
    pub fn is_privileged(&self) -> bool {
        self.has_any_role(&[ADMIN, DEVELOPER])
    }
}

/// Authentication middleware
///
/// Validates the bearer access token, then loads the user named by its
/// identity claim together with the user's current roles.
pub async fn auth_middleware(
    State(state): State<AppState>,
    bearer: Option<TypedHeader<Authorization<Bearer>>>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let TypedHeader(Authorization(bearer)) = bearer.ok_or(ApiError::Unauthorized)?;

    let claims = state
        .jwt_service
        .validate_typed(bearer.token(), TokenType::Access)
        .map_err(|e| {
            debug!("Rejected token: {}", e);
            ApiError::Unauthorized
        })?;

    let user = state
        .store
        .find_user_by_email(&claims.sub)
        .await?
        .ok_or(ApiError::Unauthorized)?;

    let roles = state
        .store
        .user_roles(user.id)
        .await?
        .into_iter()
        .map(|role| role.name)
        .collect();

    req.extensions_mut().insert(Principal {
        user_id: user.id,
        roles,
    });

    Ok(next.run(req).await)
}
