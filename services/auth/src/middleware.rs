//! Bearer token authentication for the administrative routes

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
use store::models::{Role, User};
use tracing::debug;

use crate::{error::AuthError, state::AppState};

/// The authenticated caller with the roles held at request time
#[derive(Debug, Clone)]
pub struct Caller {
    pub user: User,
    pub roles: Vec<Role>,
}

impl Caller {
    pub fn has_role(&self, name: &str) -> bool {
        self.roles.iter().any(|role| role.name == name)
    }
}

pub async fn auth_middleware(
    State(state): State<AppState>,
    bearer: Option<TypedHeader<Authorization<Bearer>>>,
    mut req: Request,
    next: Next,
) -> Result<Response, AuthError> {
    let TypedHeader(Authorization(bearer)) = bearer.ok_or(AuthError::Unauthorized)?;

    let claims = state
        .jwt_service
        .validate_typed(bearer.token(), TokenType::Access)
        .map_err(|e| {
            debug!("Rejected token: {}", e);
            AuthError::Unauthorized
        })?;

    let user = state
        .store
        .find_user_by_email(&claims.sub)
        .await?
        .ok_or(AuthError::Unauthorized)?;
    let roles = state.store.user_roles(user.id).await?;

    req.extensions_mut().insert(Caller { user, roles });

    Ok(next.run(req).await)
}
