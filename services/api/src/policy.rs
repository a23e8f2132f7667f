//! Authorization policy
//!
//! Two access modes: role-gated endpoints require one of a declared role
//! set; ownership-gated endpoints require the owning user or a privileged
//! role. Callers load the target first so a missing resource is reported
//! as 404 before any permission check.

use store::models::{Day, Plan, User, WorkoutSession};

use crate::{
    error::{ApiError, ApiResult},
    middleware::Principal,
    state::AppState,
};

/// Require at least one of `roles`
pub fn require_roles(principal: &Principal, roles: &[&str]) -> ApiResult<()> {
    if principal.has_any_role(roles) {
        Ok(())
    } else {
        Err(ApiError::Forbidden)
    }
}

/// Require the owning user or a privileged role
pub fn require_owner(principal: &Principal, owner_id: i64) -> ApiResult<()> {
    if principal.user_id == owner_id || principal.is_privileged() {
        Ok(())
    } else {
        Err(ApiError::Forbidden)
    }
}

/// Load a user and check the caller is that user or privileged
pub async fn authorize_user(state: &AppState, principal: &Principal, user_id: i64) -> ApiResult<User> {
    let user = state.store.get_user(user_id).await?;
    require_owner(principal, user.id)?;
    Ok(user)
}

/// Owning user of a day, via its plan
pub async fn day_owner(state: &AppState, day: &Day) -> ApiResult<i64> {
    Ok(state.store.get_plan(day.plan_id).await?.user_id)
}

/// Owning user of a workout session, via day and plan
pub async fn session_owner(state: &AppState, session: &WorkoutSession) -> ApiResult<i64> {
    let day = state.store.get_day(session.day_id).await?;
    day_owner(state, &day).await
}

/// Load a plan and check the caller may act on it
pub async fn authorize_plan(state: &AppState, principal: &Principal, plan_id: i64) -> ApiResult<Plan> {
    let plan = state.store.get_plan(plan_id).await?;
    require_owner(principal, plan.user_id)?;
    Ok(plan)
}

/// Load a day and check the caller may act on it
pub async fn authorize_day(state: &AppState, principal: &Principal, day_id: i64) -> ApiResult<Day> {
    let day = state.store.get_day(day_id).await?;
    require_owner(principal, day_owner(state, &day).await?)?;
    Ok(day)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn principal(user_id: i64, roles: &[&str]) -> Principal {
        Principal {
            user_id,
            roles: roles.iter().map(|r| r.to_string()).collect(),
        }
    }

    #[test]
    fn test_owner_passes_and_stranger_is_forbidden() {
        let owner = principal(1, &["User"]);
        let stranger = principal(2, &["User"]);

        assert!(require_owner(&owner, 1).is_ok());
        assert!(matches!(require_owner(&stranger, 1), Err(ApiError::Forbidden)));
    }

    #[test]
    fn test_privileged_roles_bypass_ownership() {
        assert!(require_owner(&principal(2, &["Admin"]), 1).is_ok());
        assert!(require_owner(&principal(2, &["Developer"]), 1).is_ok());
    }

    #[test]
    fn test_role_gate() {
        let developer = principal(1, &["User", "Developer"]);

        assert!(require_roles(&developer, &["Admin", "Developer"]).is_ok());
        assert!(matches!(
            require_roles(&developer, &["Admin"]),
            Err(ApiError::Forbidden)
        ));
    }
}
