use std::{
    collections::HashSet,
    sync::{Arc, RwLock},
    time::{SystemTime, UNIX_EPOCH},
};

use jsonwebtoken::{
    Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode, errors::ErrorKind,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    config::AppConfig,
    error::AppError,
    models::{Role, User},
};

/// Claims
///
/// Payload carried inside every bearer token. The subject is the account email; the
/// numeric id is cross-checked against the stored account on each request.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Claims {
    pub sub: String,
    pub role: Role,
    pub user_id: i64,
    pub iat: u64,
    pub exp: u64,
    /// Unique per token, so a re-login within the same second never reproduces a
    /// revoked token.
    pub jti: String,
}

/// TokenService
///
/// Issues and verifies HS256 tokens and tracks revoked ones. The revocation set lives in
/// process memory only: it is unbounded and is cleared on restart.
#[derive(Clone)]
pub struct TokenService {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl_secs: u64,
    revoked: Arc<RwLock<HashSet<String>>>,
}

impl TokenService {
    pub fn new(secret: &str, ttl_secs: u64) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            ttl_secs,
            revoked: Arc::new(RwLock::new(HashSet::new())),
        }
    }

    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(&config.jwt_secret, config.jwt_ttl_secs)
    }

    /// issue
    ///
    /// Signs a token for the account, valid for the configured lifetime.
    pub fn issue(&self, user: &User) -> Result<String, AppError> {
        let now = now_secs();
        let claims = Claims {
            sub: user.email.clone(),
            role: user.role,
            user_id: user.id,
            iat: now,
            exp: now.saturating_add(self.ttl_secs),
            jti: Uuid::new_v4().to_string(),
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(|e| AppError::Internal(format!("token signing failed: {e}")))
    }

    /// decode
    ///
    /// Verifies signature and expiry. No leeway is granted on `exp`.
    pub fn decode(&self, token: &str) -> Result<Claims, AppError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation.validate_exp = true;
        validation.set_required_spec_claims(&["exp", "sub"]);

        decode::<Claims>(token, &self.decoding, &validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => AppError::unauthorized("Token has expired"),
                ErrorKind::InvalidSignature => AppError::unauthorized("Invalid token signature"),
                _ => AppError::unauthorized("Invalid token"),
            })
    }

    pub fn revoke(&self, token: &str) {
        let mut revoked = self.revoked.write().unwrap_or_else(|e| e.into_inner());
        revoked.insert(token.to_owned());
    }

    pub fn is_revoked(&self, token: &str) -> bool {
        let revoked = self.revoked.read().unwrap_or_else(|e| e.into_inner());
        revoked.contains(token)
    }

    pub fn ttl_secs(&self) -> u64 {
        self.ttl_secs
    }
}

fn now_secs() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or_default()
}
