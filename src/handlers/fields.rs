use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde_json::Value;

use super::{deleted, require_text};
use crate::{
    AppState,
    auth::{AdminUser, AuthUser},
    error::{AppError, AppResult},
    models::{Field, FieldRequest, SearchQuery},
};

fn validated(req: FieldRequest) -> AppResult<FieldRequest> {
    Ok(FieldRequest {
        name: require_text(&req.name, "Field name")?,
        description: req.description.trim().to_string(),
        image_url: req.image_url,
    })
}

#[utoipa::path(
    post,
    path = "/api/fields",
    tag = "fields",
    security(("bearer_auth" = [])),
    request_body = FieldRequest,
    responses((status = 200, description = "Created", body = Field))
)]
pub async fn create_field(
    _admin: AdminUser,
    State(state): State<AppState>,
    Json(req): Json<FieldRequest>,
) -> AppResult<Json<Field>> {
    let field = state.repo.create_field(&validated(req)?).await?;
    Ok(Json(field))
}

#[utoipa::path(
    get,
    path = "/api/fields/{id}",
    tag = "fields",
    security(("bearer_auth" = [])),
    params(("id" = i64, Path, description = "Field ID")),
    responses(
        (status = 200, description = "Found", body = Field),
        (status = 404, description = "Field not found")
    )
)]
pub async fn get_field(
    _user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> AppResult<Json<Field>> {
    state
        .repo
        .get_field(id)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::not_found(format!("Field not found with ID: {id}")))
}

#[utoipa::path(
    get,
    path = "/api/fields",
    tag = "fields",
    security(("bearer_auth" = [])),
    responses((status = 200, description = "All fields", body = [Field]))
)]
pub async fn list_fields(_user: AuthUser, State(state): State<AppState>) -> AppResult<Json<Vec<Field>>> {
    Ok(Json(state.repo.list_fields().await?))
}

/// update_field
///
/// [Admin Route] Replaces name, description and image.
#[utoipa::path(
    put,
    path = "/api/fields/{id}",
    tag = "fields",
    security(("bearer_auth" = [])),
    params(("id" = i64, Path, description = "Field ID")),
    request_body = FieldRequest,
    responses(
        (status = 200, description = "Updated", body = Field),
        (status = 404, description = "Field not found")
    )
)]
pub async fn update_field(
    _admin: AdminUser,
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(req): Json<FieldRequest>,
) -> AppResult<Json<Field>> {
    state
        .repo
        .update_field(id, &validated(req)?)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::not_found(format!("Field not found with ID: {id}")))
}

/// delete_field
///
/// [Admin Route] Removes the field with all of its courses, certifications and roadmaps
/// in a single transaction.
#[utoipa::path(
    delete,
    path = "/api/fields/{id}",
    tag = "fields",
    security(("bearer_auth" = [])),
    params(("id" = i64, Path, description = "Field ID")),
    responses(
        (status = 200, description = "Deleted with dependents"),
        (status = 404, description = "Field not found")
    )
)]
pub async fn delete_field(
    AdminUser(admin): AdminUser,
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> AppResult<Json<Value>> {
    if !state.repo.delete_field(id).await? {
        return Err(AppError::not_found(format!("Field not found with ID: {id}")));
    }
    tracing::info!(admin_id = admin.id, field_id = id, "field deleted with dependents");
    Ok(deleted("Field"))
}

/// search_fields
///
/// [Authenticated Route] Case-insensitive substring match on field names.
#[utoipa::path(
    get,
    path = "/api/fields/search",
    tag = "fields",
    security(("bearer_auth" = [])),
    params(SearchQuery),
    responses((status = 200, description = "Matching fields", body = [Field]))
)]
pub async fn search_fields(
    _user: AuthUser,
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> AppResult<Json<Vec<Field>>> {
    Ok(Json(state.repo.search_fields(&query.keyword).await?))
}
