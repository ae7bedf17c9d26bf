use crate::{
    AppState,
    handlers::{auth, news},
};
use axum::{
    Router,
    routing::{get, post},
};

/// Public Router Module
///
/// Endpoints that need no bearer token. Everything here is mounted under `/api`.
pub fn public_routes() -> Router<AppState> {
    Router::new()
        // POST /auth/register
        // Creates an ACTIVE USER account and returns a token straight away.
        .route("/auth/register", post(auth::register))
        // POST /auth/login
        // Returns `{token, userId}` and echoes the token in the Authorization header.
        .route("/auth/login", post(auth::login))
        // POST /auth/admin-login
        // Same as login, restricted to ADMIN and SUPER_ADMIN accounts.
        .route("/auth/admin-login", post(auth::admin_login))
        // GET /news?category=...
        // Proxies top US headlines from the news provider.
        .route("/news", get(news::get_news))
}
