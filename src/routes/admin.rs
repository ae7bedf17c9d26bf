use crate::{AppState, handlers::admin};
use axum::{
    Router,
    routing::{get, put},
};

/// Admin Router Module
///
/// Account moderation and the statistics dashboard. Each handler takes the `AdminUser`
/// extractor, so a valid token without the ADMIN authority gets 403.
pub fn admin_routes() -> Router<AppState> {
    Router::new()
        // GET /stats
        // Dashboard aggregates: accounts, catalog totals, ages and price rankings.
        .route("/stats", get(admin::get_admin_stats))
        .route("/users", get(admin::list_users))
        .route(
            "/users/{id}",
            get(admin::get_user)
                .put(admin::update_user)
                .delete(admin::delete_user),
        )
        // PUT /users/{id}/role?newRole=ADMIN
        // Only a SUPER_ADMIN may grant or revoke SUPER_ADMIN.
        .route("/users/{id}/role", put(admin::update_user_role))
        .route("/users/{id}/toggle-status", put(admin::toggle_user_status))
}
