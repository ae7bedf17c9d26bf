use axum::{
    Json,
    extract::{Path, State},
};
use serde_json::Value;

use super::{deleted, require_text};
use crate::{
    AppState,
    auth::{AdminUser, AuthUser},
    error::{AppError, AppResult},
    models::{Certification, CertificationDraft, CertificationRequest},
};

/// Certifications are written in full on both create and update.
async fn draft_from(state: &AppState, req: CertificationRequest) -> AppResult<CertificationDraft> {
    let field_id = req
        .field_id
        .ok_or_else(|| AppError::validation("Field ID is required"))?;
    if state.repo.get_field(field_id).await?.is_none() {
        return Err(AppError::not_found(format!("Field not found with ID: {field_id}")));
    }
    if req.price < 0.0 {
        return Err(AppError::validation("Price cannot be negative"));
    }
    Ok(CertificationDraft {
        name: require_text(&req.name, "Certification name")?,
        platform: req.platform,
        description: req.description.trim().to_string(),
        price: req.price,
        field_id,
    })
}

#[utoipa::path(
    post,
    path = "/api/certifications",
    tag = "certifications",
    security(("bearer_auth" = [])),
    request_body = CertificationRequest,
    responses(
        (status = 200, description = "Created", body = Certification),
        (status = 404, description = "Field not found")
    )
)]
pub async fn create_certification(
    _admin: AdminUser,
    State(state): State<AppState>,
    Json(req): Json<CertificationRequest>,
) -> AppResult<Json<Certification>> {
    let draft = draft_from(&state, req).await?;
    Ok(Json(state.repo.create_certification(&draft).await?))
}

#[utoipa::path(
    get,
    path = "/api/certifications/{id}",
    tag = "certifications",
    security(("bearer_auth" = [])),
    params(("id" = i64, Path, description = "Certification ID")),
    responses(
        (status = 200, description = "Found", body = Certification),
        (status = 404, description = "Certification not found")
    )
)]
pub async fn get_certification(
    _user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> AppResult<Json<Certification>> {
    state
        .repo
        .get_certification(id)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::not_found(format!("Certification not found with ID: {id}")))
}

#[utoipa::path(
    get,
    path = "/api/certifications",
    tag = "certifications",
    security(("bearer_auth" = [])),
    responses((status = 200, description = "All certifications", body = [Certification]))
)]
pub async fn list_certifications(
    _user: AuthUser,
    State(state): State<AppState>,
) -> AppResult<Json<Vec<Certification>>> {
    Ok(Json(state.repo.list_certifications().await?))
}

#[utoipa::path(
    get,
    path = "/api/certifications/field/{field_id}",
    tag = "certifications",
    security(("bearer_auth" = [])),
    params(("field_id" = i64, Path, description = "Field ID")),
    responses((status = 200, description = "Certifications of the field", body = [Certification]))
)]
pub async fn list_certifications_by_field(
    _user: AuthUser,
    State(state): State<AppState>,
    Path(field_id): Path<i64>,
) -> AppResult<Json<Vec<Certification>>> {
    Ok(Json(state.repo.list_certifications_by_field(field_id).await?))
}

#[utoipa::path(
    put,
    path = "/api/certifications/{id}",
    tag = "certifications",
    security(("bearer_auth" = [])),
    params(("id" = i64, Path, description = "Certification ID")),
    request_body = CertificationRequest,
    responses(
        (status = 200, description = "Updated", body = Certification),
        (status = 404, description = "Certification or field not found")
    )
)]
pub async fn update_certification(
    _admin: AdminUser,
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(req): Json<CertificationRequest>,
) -> AppResult<Json<Certification>> {
    if state.repo.get_certification(id).await?.is_none() {
        return Err(AppError::not_found(format!("Certification not found with ID: {id}")));
    }
    let draft = draft_from(&state, req).await?;
    state
        .repo
        .update_certification(id, &draft)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::not_found(format!("Certification not found with ID: {id}")))
}

#[utoipa::path(
    delete,
    path = "/api/certifications/{id}",
    tag = "certifications",
    security(("bearer_auth" = [])),
    params(("id" = i64, Path, description = "Certification ID")),
    responses(
        (status = 200, description = "Deleted"),
        (status = 404, description = "Certification not found")
    )
)]
pub async fn delete_certification(
    _admin: AdminUser,
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> AppResult<Json<Value>> {
    if !state.repo.delete_certification(id).await? {
        return Err(AppError::not_found(format!("Certification not found with ID: {id}")));
    }
    Ok(deleted("Certification"))
}
