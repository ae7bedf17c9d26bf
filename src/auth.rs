use axum::{
    extract::{FromRef, FromRequestParts},
    http::{header, request::Parts},
};

use crate::{
    error::AppError,
    models::Role,
    repository::RepositoryState,
    token::TokenService,
};

/// AuthUser Extractor Result
///
/// The resolved identity of an authenticated request. The role is read from the database,
/// not from the token, so role changes apply to tokens issued before them.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub id: i64,
    pub email: String,
    pub role: Role,
    /// The raw bearer token, kept so logout can revoke it.
    pub token: String,
}

impl AuthUser {
    pub fn is_admin(&self) -> bool {
        self.role.is_admin()
    }

    /// Owner-or-admin guard shared by the user and feedback handlers.
    pub fn ensure_self_or_admin(&self, owner_id: i64) -> Result<(), AppError> {
        if self.id == owner_id || self.is_admin() {
            Ok(())
        } else {
            Err(AppError::forbidden("You are not allowed to access this resource"))
        }
    }
}

/// Pulls the token out of `Authorization: Bearer <jwt>`. Anything that is not at least
/// shaped like a JWT is rejected before signature verification.
pub fn bearer_token(parts: &Parts) -> Result<&str, AppError> {
    let header_value = parts
        .headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .ok_or_else(|| AppError::unauthorized("Missing Authorization header"))?;

    let token = header_value
        .strip_prefix("Bearer ")
        .ok_or_else(|| AppError::unauthorized("Authorization header must use the Bearer scheme"))?
        .trim();

    if token.is_empty() || !token.contains('.') {
        return Err(AppError::unauthorized("Malformed bearer token"));
    }
    Ok(token)
}

/// AuthUser Extractor Implementation
///
/// Makes `AuthUser` usable as a handler argument. The checks run in order:
/// 1. Token extraction from the `Authorization` header.
/// 2. Revocation check against the logout set.
/// 3. Signature and expiry validation.
/// 4. Account lookup by the subject email.
/// 5. Subject match: the stored id must equal the token's `userId` claim.
/// 6. The account must be ACTIVE.
///
/// Rejection: `AppError::Unauthorized` (401 JSON body) on any failure.
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
    RepositoryState: FromRef<S>,
    TokenService: FromRef<S>,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let repo = RepositoryState::from_ref(state);
        let tokens = TokenService::from_ref(state);

        let token = bearer_token(parts)?.to_string();

        if tokens.is_revoked(&token) {
            return Err(AppError::unauthorized("Token has been revoked"));
        }

        let claims = tokens.decode(&token)?;

        let user = repo
            .find_user_by_email(&claims.sub)
            .await?
            .ok_or_else(|| AppError::unauthorized("Account no longer exists"))?;

        if user.id != claims.user_id {
            tracing::warn!(sub = %claims.sub, "token subject does not match account id");
            return Err(AppError::unauthorized("Invalid token"));
        }

        if !user.is_active() {
            return Err(AppError::unauthorized("Account is inactive"));
        }

        Ok(AuthUser {
            id: user.id,
            email: user.email,
            role: user.role,
            token,
        })
    }
}

/// AdminUser
///
/// An `AuthUser` holding the ADMIN authority (ADMIN or SUPER_ADMIN). Handlers that take
/// this extractor reject everyone else with 403.
#[derive(Debug, Clone)]
pub struct AdminUser(pub AuthUser);

impl<S> FromRequestParts<S> for AdminUser
where
    S: Send + Sync,
    RepositoryState: FromRef<S>,
    TokenService: FromRef<S>,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let user = AuthUser::from_request_parts(parts, state).await?;
        if !user.role.has_authority(Role::Admin) {
            return Err(AppError::forbidden("Administrator privileges required"));
        }
        Ok(AdminUser(user))
    }
}
