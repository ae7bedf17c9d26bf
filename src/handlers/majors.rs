use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde_json::Value;

use super::{deleted, require_text};
use crate::{
    AppState,
    auth::{AdminUser, AuthUser},
    error::{AppError, AppResult, RepositoryError},
    models::{Major, MajorRequest, SearchQuery},
};

/// The exam scores at most this many majors.
pub const MAX_MAJORS: i64 = 6;

fn validated(req: MajorRequest) -> AppResult<MajorRequest> {
    Ok(MajorRequest {
        name: require_text(&req.name, "Major name")?,
        description: req.description.trim().to_string(),
        image_url: req.image_url,
    })
}

/// create_major
///
/// [Admin Route] Rejected with 400 once the catalog already holds six majors.
#[utoipa::path(
    post,
    path = "/api/majors",
    tag = "majors",
    security(("bearer_auth" = [])),
    request_body = MajorRequest,
    responses(
        (status = 200, description = "Created", body = Major),
        (status = 400, description = "Major limit reached")
    )
)]
pub async fn create_major(
    _admin: AdminUser,
    State(state): State<AppState>,
    Json(req): Json<MajorRequest>,
) -> AppResult<Json<Major>> {
    let req = validated(req)?;
    state
        .repo
        .create_major(&req, MAX_MAJORS)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::validation(format!("Cannot add more than {MAX_MAJORS} majors")))
}

#[utoipa::path(
    get,
    path = "/api/majors/{id}",
    tag = "majors",
    security(("bearer_auth" = [])),
    params(("id" = i64, Path, description = "Major ID")),
    responses(
        (status = 200, description = "Found", body = Major),
        (status = 404, description = "Major not found")
    )
)]
pub async fn get_major(
    _user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> AppResult<Json<Major>> {
    state
        .repo
        .get_major(id)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::not_found(format!("Major not found with ID: {id}")))
}

#[utoipa::path(
    get,
    path = "/api/majors",
    tag = "majors",
    security(("bearer_auth" = [])),
    responses((status = 200, description = "All majors", body = [Major]))
)]
pub async fn list_majors(_user: AuthUser, State(state): State<AppState>) -> AppResult<Json<Vec<Major>>> {
    Ok(Json(state.repo.list_majors().await?))
}

#[utoipa::path(
    put,
    path = "/api/majors/{id}",
    tag = "majors",
    security(("bearer_auth" = [])),
    params(("id" = i64, Path, description = "Major ID")),
    request_body = MajorRequest,
    responses(
        (status = 200, description = "Updated", body = Major),
        (status = 404, description = "Major not found")
    )
)]
pub async fn update_major(
    _admin: AdminUser,
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(req): Json<MajorRequest>,
) -> AppResult<Json<Major>> {
    state
        .repo
        .update_major(id, &validated(req)?)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::not_found(format!("Major not found with ID: {id}")))
}

/// delete_major
///
/// [Admin Route] A major still referenced by exam questions or stored results cannot be
/// deleted (400).
#[utoipa::path(
    delete,
    path = "/api/majors/{id}",
    tag = "majors",
    security(("bearer_auth" = [])),
    params(("id" = i64, Path, description = "Major ID")),
    responses(
        (status = 200, description = "Deleted"),
        (status = 400, description = "Major still in use"),
        (status = 404, description = "Major not found")
    )
)]
pub async fn delete_major(
    _admin: AdminUser,
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> AppResult<Json<Value>> {
    match state.repo.delete_major(id).await {
        Ok(true) => Ok(deleted("Major")),
        Ok(false) => Err(AppError::not_found(format!("Major not found with ID: {id}"))),
        Err(RepositoryError::ForeignKey(_)) => Err(AppError::validation(
            "Major is linked to exam questions or results and cannot be deleted",
        )),
        Err(other) => Err(other.into()),
    }
}

#[utoipa::path(
    get,
    path = "/api/majors/search",
    tag = "majors",
    security(("bearer_auth" = [])),
    params(SearchQuery),
    responses((status = 200, description = "Matching majors", body = [Major]))
)]
pub async fn search_majors(
    _user: AuthUser,
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> AppResult<Json<Vec<Major>>> {
    Ok(Json(state.repo.search_majors(&query.keyword).await?))
}
