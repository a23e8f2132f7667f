//! User endpoints: registration, profile, profile picture and role membership

use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use media::MediaOwner;
use serde::{Deserialize, Deserializer};
use store::{
    models::{
        Registration, User, UserChanges,
        role::{ADMIN, DEVELOPER},
    },
    password::{hash_password, verify_password},
    validation::{
        normalize_email, validate_email, validate_name, validate_password, validate_required,
    },
};
use tracing::info;

use crate::{
    error::{ApiError, ApiResult},
    extract::{MediaPayload, ValidJson},
    handlers::{Deleted, require_changes},
    middleware::Principal,
    policy::{authorize_user, require_roles},
    state::AppState,
};

/// User update request
///
/// `profile_picture: null` clears the stored reference. Changing the
/// password requires the current one.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UserUpdate {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    #[serde(default, deserialize_with = "nullable")]
    pub profile_picture: Option<Option<String>>,
    pub password: Option<String>,
    pub current_password: Option<String>,
}

fn nullable<'de, D>(deserializer: D) -> Result<Option<Option<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<String>::deserialize(deserializer).map(Some)
}

impl UserUpdate {
    fn is_empty(&self) -> bool {
        self.first_name.is_none()
            && self.last_name.is_none()
            && self.email.is_none()
            && self.profile_picture.is_none()
            && self.password.is_none()
    }

    fn into_changes(self, user: &User) -> ApiResult<UserChanges> {
        if let Some(first_name) = &self.first_name {
            validate_name("first_name", first_name)?;
        }
        if let Some(last_name) = &self.last_name {
            validate_name("last_name", last_name)?;
        }
        let email = self.email.as_deref().map(normalize_email);
        if let Some(email) = &email {
            validate_email(email)?;
        }
        if let Some(Some(picture)) = &self.profile_picture {
            validate_required("profile_picture", picture)?;
        }

        let password_hash = match self.password {
            Some(password) => {
                let current = self.current_password.ok_or_else(|| {
                    ApiError::BadRequest(
                        "current_password is required to change the password".to_string(),
                    )
                })?;
                if !verify_password(&current, &user.password_hash) {
                    return Err(ApiError::BadRequest(
                        "Current password is incorrect".to_string(),
                    ));
                }
                validate_password(&password)?;
                Some(hash_password(&password)?)
            }
            None => None,
        };

        Ok(UserChanges {
            first_name: self.first_name.map(|name| name.trim().to_string()),
            last_name: self.last_name.map(|name| name.trim().to_string()),
            email,
            password_hash,
            profile_picture: self.profile_picture,
        })
    }
}

/// Get all users
pub async fn list_users(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
) -> ApiResult<impl IntoResponse> {
    require_roles(&principal, &[ADMIN, DEVELOPER])?;
    Ok(Json(state.store.list_users().await?))
}

/// Register a new user
pub async fn create_user(
    State(state): State<AppState>,
    ValidJson(payload): ValidJson<Registration>,
) -> ApiResult<impl IntoResponse> {
    let user = state.store.create_user(payload.into_new_user()?).await?;
    info!("Registered user {}", user.id);

    Ok((StatusCode::CREATED, Json(user)))
}

/// Get a user by ID
pub async fn get_user(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(user_id): Path<i64>,
) -> ApiResult<impl IntoResponse> {
    Ok(Json(authorize_user(&state, &principal, user_id).await?))
}

/// Update profile fields or the password
pub async fn update_user(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(user_id): Path<i64>,
    ValidJson(update): ValidJson<UserUpdate>,
) -> ApiResult<impl IntoResponse> {
    let user = authorize_user(&state, &principal, user_id).await?;
    require_changes(update.is_empty())?;
    if let Some(Some(picture)) = &update.profile_picture {
        state
            .media
            .check_reference(MediaOwner::UserProfile(user_id), picture)?;
    }

    let changes = update.into_changes(&user)?;
    let picture_changed = changes.profile_picture.is_some();
    let updated = state.store.update_user(user_id, changes).await?;

    if picture_changed && updated.profile_picture != user.profile_picture {
        state
            .media
            .release_best_effort(
                MediaOwner::UserProfile(user_id),
                user.profile_picture.as_deref(),
            )
            .await;
    }

    info!("Updated user {}", user_id);
    Ok(Json(updated))
}

/// Delete a user with everything they own
pub async fn delete_user(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(user_id): Path<i64>,
) -> ApiResult<impl IntoResponse> {
    let user = authorize_user(&state, &principal, user_id).await?;

    state
        .media
        .release_best_effort(
            MediaOwner::UserProfile(user_id),
            user.profile_picture.as_deref(),
        )
        .await;
    for exercise in state.store.user_custom_exercises(user_id).await? {
        state
            .media
            .release_best_effort(
                MediaOwner::CustomExercise { user_id },
                exercise.media_file_url.as_deref(),
            )
            .await;
    }

    state.store.delete_user(user_id).await?;
    info!("Deleted user {}", user_id);

    Ok(Json(Deleted::new("user", user_id)))
}

/// Upload or link a new profile picture
pub async fn put_profile_picture(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(user_id): Path<i64>,
    MediaPayload(source): MediaPayload,
) -> ApiResult<impl IntoResponse> {
    let user = authorize_user(&state, &principal, user_id).await?;

    let url = state
        .media
        .resolve(MediaOwner::UserProfile(user_id), source)
        .await?;
    let updated = state
        .store
        .update_user(
            user_id,
            UserChanges {
                profile_picture: Some(Some(url)),
                ..Default::default()
            },
        )
        .await?;

    if updated.profile_picture != user.profile_picture {
        state
            .media
            .release_best_effort(
                MediaOwner::UserProfile(user_id),
                user.profile_picture.as_deref(),
            )
            .await;
    }

    Ok(Json(updated))
}

/// Remove the profile picture
pub async fn delete_profile_picture(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(user_id): Path<i64>,
) -> ApiResult<impl IntoResponse> {
    let user = authorize_user(&state, &principal, user_id).await?;

    if let Some(url) = user.profile_picture.as_deref() {
        state
            .media
            .release(MediaOwner::UserProfile(user_id), url)
            .await?;
    }

    let updated = state
        .store
        .update_user(
            user_id,
            UserChanges {
                profile_picture: Some(None),
                ..Default::default()
            },
        )
        .await?;

    Ok(Json(updated))
}

/// Roles held by a user
pub async fn user_roles(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(user_id): Path<i64>,
) -> ApiResult<impl IntoResponse> {
    authorize_user(&state, &principal, user_id).await?;
    Ok(Json(state.store.user_roles(user_id).await?))
}

/// Grant a role by name; granting a held role changes nothing
pub async fn assign_role(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path((user_id, role_name)): Path<(i64, String)>,
) -> ApiResult<impl IntoResponse> {
    state.store.get_user(user_id).await?;
    let role = state
        .store
        .find_role_by_name(&role_name)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("role {}", role_name)))?;
    require_roles(&principal, &[ADMIN])?;

    let status = if state.store.assign_role(user_id, role.id).await? {
        info!("Assigned role {} to user {}", role.name, user_id);
        StatusCode::CREATED
    } else {
        StatusCode::OK
    };

    Ok((status, Json(state.store.user_roles(user_id).await?)))
}

/// Revoke a role by name
pub async fn revoke_role(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path((user_id, role_name)): Path<(i64, String)>,
) -> ApiResult<impl IntoResponse> {
    state.store.get_user(user_id).await?;
    let role = state
        .store
        .find_role_by_name(&role_name)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("role {}", role_name)))?;
    require_roles(&principal, &[ADMIN])?;

    if !state.store.revoke_role(user_id, role.id).await? {
        return Err(ApiError::NotFound(format!(
            "user {} does not hold role {}",
            user_id, role.name
        )));
    }
    info!("Revoked role {} from user {}", role.name, user_id);

    Ok(Json(state.store.user_roles(user_id).await?))
}
