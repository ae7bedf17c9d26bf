use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};

use super::{non_blank_or, require_text};
use crate::{
    AppState,
    auth::{AdminUser, AuthUser},
    error::{AppError, AppResult},
    models::{FieldIdQuery, Roadmap, RoadmapDraft, RoadmapRequest},
};

async fn ensure_field(state: &AppState, field_id: i64) -> AppResult<()> {
    match state.repo.get_field(field_id).await? {
        Some(_) => Ok(()),
        None => Err(AppError::not_found(format!("Field not found with ID: {field_id}"))),
    }
}

#[utoipa::path(
    post,
    path = "/api/roadmaps",
    tag = "roadmaps",
    security(("bearer_auth" = [])),
    request_body = RoadmapRequest,
    responses(
        (status = 201, description = "Created", body = Roadmap),
        (status = 404, description = "Field not found")
    )
)]
pub async fn create_roadmap(
    _admin: AdminUser,
    State(state): State<AppState>,
    Json(req): Json<RoadmapRequest>,
) -> AppResult<(StatusCode, Json<Roadmap>)> {
    let field_id = req
        .field_id
        .ok_or_else(|| AppError::validation("Field ID is required"))?;
    ensure_field(&state, field_id).await?;

    let draft = RoadmapDraft {
        name: require_text(&req.name, "Roadmap name")?,
        roadmap_stages: req.roadmap_stages,
        field_id,
    };
    let roadmap = state.repo.create_roadmap(&draft).await?;
    Ok((StatusCode::CREATED, Json(roadmap)))
}

#[utoipa::path(
    get,
    path = "/api/roadmaps/{id}",
    tag = "roadmaps",
    security(("bearer_auth" = [])),
    params(("id" = i64, Path, description = "Roadmap ID")),
    responses(
        (status = 200, description = "Found", body = Roadmap),
        (status = 404, description = "Roadmap not found")
    )
)]
pub async fn get_roadmap(
    _user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> AppResult<Json<Roadmap>> {
    state
        .repo
        .get_roadmap(id)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::not_found(format!("Roadmap not found with ID: {id}")))
}

#[utoipa::path(
    get,
    path = "/api/roadmaps",
    tag = "roadmaps",
    security(("bearer_auth" = [])),
    responses((status = 200, description = "All roadmaps", body = [Roadmap]))
)]
pub async fn list_roadmaps(_user: AuthUser, State(state): State<AppState>) -> AppResult<Json<Vec<Roadmap>>> {
    Ok(Json(state.repo.list_roadmaps().await?))
}

#[utoipa::path(
    get,
    path = "/api/roadmaps/field/{field_id}",
    tag = "roadmaps",
    security(("bearer_auth" = [])),
    params(("field_id" = i64, Path, description = "Field ID")),
    responses((status = 200, description = "Roadmaps of the field", body = [Roadmap]))
)]
pub async fn list_roadmaps_by_field(
    _user: AuthUser,
    State(state): State<AppState>,
    Path(field_id): Path<i64>,
) -> AppResult<Json<Vec<Roadmap>>> {
    Ok(Json(state.repo.list_roadmaps_by_field(field_id).await?))
}

/// update_roadmap
///
/// [Admin Route] Blank values keep the stored ones. `?fieldId=` (or `fieldId` in the body)
/// moves the roadmap to another field.
#[utoipa::path(
    put,
    path = "/api/roadmaps/{id}",
    tag = "roadmaps",
    security(("bearer_auth" = [])),
    params(("id" = i64, Path, description = "Roadmap ID"), FieldIdQuery),
    request_body = RoadmapRequest,
    responses(
        (status = 200, description = "Updated", body = Roadmap),
        (status = 404, description = "Roadmap or field not found")
    )
)]
pub async fn update_roadmap(
    _admin: AdminUser,
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Query(query): Query<FieldIdQuery>,
    Json(req): Json<RoadmapRequest>,
) -> AppResult<Json<Roadmap>> {
    let current = state
        .repo
        .get_roadmap(id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Roadmap not found with ID: {id}")))?;

    let field_id = match query.field_id.or(req.field_id) {
        Some(field_id) => {
            ensure_field(&state, field_id).await?;
            field_id
        }
        None => current.field_id,
    };

    let draft = RoadmapDraft {
        name: non_blank_or(&req.name, &current.name),
        roadmap_stages: match req.roadmap_stages.as_deref().map(str::trim) {
            Some(stages) if !stages.is_empty() => Some(stages.to_string()),
            _ => current.roadmap_stages,
        },
        field_id,
    };

    state
        .repo
        .update_roadmap(id, &draft)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::not_found(format!("Roadmap not found with ID: {id}")))
}

#[utoipa::path(
    delete,
    path = "/api/roadmaps/{id}",
    tag = "roadmaps",
    security(("bearer_auth" = [])),
    params(("id" = i64, Path, description = "Roadmap ID")),
    responses(
        (status = 204, description = "Deleted"),
        (status = 404, description = "Roadmap not found")
    )
)]
pub async fn delete_roadmap(
    _admin: AdminUser,
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> AppResult<StatusCode> {
    if state.repo.delete_roadmap(id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::not_found(format!("Roadmap not found with ID: {id}")))
    }
}
