use axum::{
    Json,
    extract::{Path, State},
};

use super::{validate_email, validate_name, validate_new_password, validate_phone};
use crate::{
    AppState,
    auth::AuthUser,
    error::{AppError, AppResult, RepositoryError},
    models::{Role, UpdateUserRequest, User, UserProfile},
    password::hash_password,
};

/// get_me
///
/// [Authenticated Route] The caller's own profile.
#[utoipa::path(
    get,
    path = "/api/users/me",
    tag = "users",
    security(("bearer_auth" = [])),
    responses((status = 200, description = "Profile", body = UserProfile))
)]
pub async fn get_me(user: AuthUser, State(state): State<AppState>) -> AppResult<Json<UserProfile>> {
    let account = state
        .repo
        .get_user(user.id)
        .await?
        .ok_or_else(|| AppError::not_found("User not found"))?;
    Ok(Json(account.into()))
}

/// update_user
///
/// [Authenticated Route] Partial profile update. Callers may edit their own account;
/// administrators may edit anyone's.
#[utoipa::path(
    put,
    path = "/api/users/{id}",
    tag = "users",
    security(("bearer_auth" = [])),
    params(("id" = i64, Path, description = "User ID")),
    request_body = UpdateUserRequest,
    responses(
        (status = 200, description = "Updated", body = UserProfile),
        (status = 403, description = "Not your account"),
        (status = 404, description = "User not found"),
        (status = 409, description = "Email already in use")
    )
)]
pub async fn update_user(
    user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(req): Json<UpdateUserRequest>,
) -> AppResult<Json<UserProfile>> {
    user.ensure_self_or_admin(id)?;
    let updated = apply_profile_update(&state, &user, id, req).await?;
    Ok(Json(updated.into()))
}

/// apply_profile_update
///
/// Shared by the self-service and admin update endpoints. Only the provided fields
/// change; an email change must not collide with another account. A SUPER_ADMIN
/// account can only be edited by itself or another SUPER_ADMIN.
pub(crate) async fn apply_profile_update(
    state: &AppState,
    caller: &AuthUser,
    id: i64,
    req: UpdateUserRequest,
) -> AppResult<User> {
    let mut account = state
        .repo
        .get_user(id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("User not found with ID: {id}")))?;

    if account.role == Role::SuperAdmin
        && caller.id != account.id
        && !caller.role.has_authority(Role::SuperAdmin)
    {
        tracing::warn!(caller_id = caller.id, user_id = id, "refused edit of SUPER_ADMIN account");
        return Err(AppError::forbidden("Only a SUPER_ADMIN can manage SUPER_ADMIN accounts"));
    }

    if let Some(first_name) = req.first_name {
        account.first_name = validate_name(&first_name, "First name")?;
    }
    if let Some(last_name) = req.last_name {
        account.last_name = validate_name(&last_name, "Last name")?;
    }
    if let Some(email) = req.email {
        let email = validate_email(&email)?;
        if !email.eq_ignore_ascii_case(&account.email) {
            if let Some(other) = state.repo.find_user_by_email(&email).await? {
                if other.id != account.id {
                    return Err(AppError::Conflict("Email is already in use".to_string()));
                }
            }
        }
        account.email = email;
    }
    if let Some(phone) = req.phone_number {
        account.phone_number = match phone.trim() {
            "" => None,
            value => Some(validate_phone(value)?),
        };
    }
    if req.country.is_some() {
        account.country = req.country;
    }
    if req.city.is_some() {
        account.city = req.city;
    }
    if req.gender.is_some() {
        account.gender = req.gender;
    }
    if req.education_level.is_some() {
        account.education_level = req.education_level;
    }
    if req.university_college.is_some() {
        account.university_college = req.university_college;
    }
    if req.birth_date.is_some() {
        account.birth_date = req.birth_date;
    }
    if let Some(password) = req.password.filter(|p| !p.is_empty()) {
        let confirmation = req.confirm_password.unwrap_or_default();
        validate_new_password(&password, &confirmation)?;
        account.password_hash = hash_password(&password, state.config.bcrypt_cost).await?;
    }

    let saved = state.repo.save_user(&account).await.map_err(|e| match e {
        RepositoryError::UniqueViolation(_) => AppError::Conflict("Email is already in use".to_string()),
        other => other.into(),
    })?;

    tracing::info!(user_id = saved.id, "profile updated");
    Ok(saved)
}
