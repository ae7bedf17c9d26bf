use axum::{
    Json,
    extract::State,
    http::{HeaderName, StatusCode, header},
    response::IntoResponse,
};
use serde_json::{Value, json};

use super::{validate_email, validate_name, validate_new_password, validate_phone};
use crate::{
    AppState,
    auth::AuthUser,
    error::{AppError, AppResult, RepositoryError},
    models::{AuthResponse, LoginRequest, NewUser, RegisterRequest, Role, User, UserStatus},
    password::{hash_password, verify_password},
};

/// register
///
/// [Public Route] Creates an ACTIVE account with the USER role and returns a fresh token.
#[utoipa::path(
    post,
    path = "/api/auth/register",
    tag = "auth",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "Account created", body = AuthResponse),
        (status = 400, description = "Validation failed"),
        (status = 409, description = "Email already registered")
    )
)]
pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> AppResult<(StatusCode, Json<AuthResponse>)> {
    let first_name = validate_name(&req.first_name, "First name")?;
    let last_name = validate_name(&req.last_name, "Last name")?;
    let email = validate_email(&req.email)?;
    validate_new_password(&req.password, &req.confirm_password)?;
    let phone_number = match req.phone_number.as_deref().map(str::trim) {
        Some(phone) if !phone.is_empty() => Some(validate_phone(phone)?),
        _ => None,
    };

    if state.repo.find_user_by_email(&email).await?.is_some() {
        return Err(AppError::Conflict("Email is already registered".to_string()));
    }

    let password_hash = hash_password(&req.password, state.config.bcrypt_cost).await?;
    let user = state
        .repo
        .create_user(NewUser {
            first_name,
            last_name,
            email,
            password_hash,
            country: req.country,
            city: req.city,
            role: Role::User,
            status: UserStatus::Active,
            gender: req.gender,
            education_level: req.education_level,
            university_college: req.university_college,
            birth_date: req.birth_date,
            phone_number,
        })
        .await
        .map_err(|e| match e {
            RepositoryError::UniqueViolation(_) => {
                AppError::Conflict("Email is already registered".to_string())
            }
            other => other.into(),
        })?;

    tracing::info!(user_id = user.id, "account registered");

    let token = state.tokens.issue(&user)?;
    Ok((
        StatusCode::CREATED,
        Json(AuthResponse {
            token,
            user_id: user.id,
        }),
    ))
}

/// login
///
/// [Public Route] Exchanges credentials for a bearer token. The token is returned in the
/// body and in the `Authorization` response header.
#[utoipa::path(
    post,
    path = "/api/auth/login",
    tag = "auth",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Authenticated", body = AuthResponse),
        (status = 401, description = "Invalid credentials or inactive account")
    )
)]
pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> AppResult<impl IntoResponse> {
    let user = authenticate(&state, &req).await?;
    issue_session(&state, &user)
}

/// admin_login
///
/// [Public Route] Same as `login`, restricted to ADMIN and SUPER_ADMIN accounts.
#[utoipa::path(
    post,
    path = "/api/auth/admin-login",
    tag = "auth",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Authenticated", body = AuthResponse),
        (status = 401, description = "Invalid credentials or not an administrator")
    )
)]
pub async fn admin_login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> AppResult<impl IntoResponse> {
    let user = authenticate(&state, &req).await?;
    if !user.role.is_admin() {
        tracing::warn!(user_id = user.id, "admin login refused for non-admin account");
        return Err(AppError::unauthorized("Administrator access required"));
    }
    issue_session(&state, &user)
}

/// logout
///
/// [Authenticated Route] Revokes the presented token for the rest of the process lifetime.
#[utoipa::path(
    post,
    path = "/api/auth/logout",
    tag = "auth",
    security(("bearer_auth" = [])),
    responses((status = 200, description = "Token revoked"))
)]
pub async fn logout(user: AuthUser, State(state): State<AppState>) -> Json<Value> {
    state.tokens.revoke(&user.token);
    tracing::info!(user_id = user.id, "logged out");
    Json(json!({ "message": "Logged out successfully" }))
}

async fn authenticate(state: &AppState, req: &LoginRequest) -> AppResult<User> {
    let invalid = || AppError::unauthorized("Invalid email or password");

    let user = state
        .repo
        .find_user_by_email(req.email.trim())
        .await?
        .ok_or_else(invalid)?;

    if !verify_password(&req.password, &user.password_hash).await? {
        tracing::warn!(user_id = user.id, "login failed: wrong password");
        return Err(invalid());
    }

    if !user.is_active() {
        return Err(AppError::unauthorized("Account is inactive"));
    }

    Ok(user)
}

type Session = ([(HeaderName, String); 1], Json<AuthResponse>);

fn issue_session(state: &AppState, user: &User) -> AppResult<Session> {
    let token = state.tokens.issue(user)?;
    let header_value = format!("Bearer {token}");
    tracing::info!(user_id = user.id, "login succeeded");
    Ok((
        [(header::AUTHORIZATION, header_value)],
        Json(AuthResponse {
            token,
            user_id: user.id,
        }),
    ))
}
