use axum::{
    Json,
    extract::{Path, State},
};
use serde_json::Value;

use super::{deleted, non_blank_or, require_text};
use crate::{
    AppState,
    auth::{AdminUser, AuthUser},
    error::{AppError, AppResult},
    models::{Course, CourseDraft, CourseRequest},
};

/// The referenced field must exist; a missing id is a validation error.
async fn resolve_field(state: &AppState, field_id: Option<i64>) -> AppResult<i64> {
    let field_id = field_id.ok_or_else(|| AppError::validation("Field ID is required"))?;
    state
        .repo
        .get_field(field_id)
        .await?
        .map(|field| field.id)
        .ok_or_else(|| AppError::not_found(format!("Field not found with ID: {field_id}")))
}

#[utoipa::path(
    post,
    path = "/api/courses",
    tag = "courses",
    security(("bearer_auth" = [])),
    request_body = CourseRequest,
    responses(
        (status = 200, description = "Created", body = Course),
        (status = 404, description = "Field not found")
    )
)]
pub async fn create_course(
    _admin: AdminUser,
    State(state): State<AppState>,
    Json(req): Json<CourseRequest>,
) -> AppResult<Json<Course>> {
    let field_id = resolve_field(&state, req.field_id).await?;
    if req.price < 0.0 {
        return Err(AppError::validation("Price cannot be negative"));
    }
    let draft = CourseDraft {
        name: require_text(&req.name, "Course name")?,
        platform: req.platform,
        description: req.description.trim().to_string(),
        price: req.price,
        field_id,
    };
    Ok(Json(state.repo.create_course(&draft).await?))
}

#[utoipa::path(
    get,
    path = "/api/courses/{id}",
    tag = "courses",
    security(("bearer_auth" = [])),
    params(("id" = i64, Path, description = "Course ID")),
    responses(
        (status = 200, description = "Found", body = Course),
        (status = 404, description = "Course not found")
    )
)]
pub async fn get_course(
    _user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> AppResult<Json<Course>> {
    state
        .repo
        .get_course(id)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::not_found(format!("Course not found with ID: {id}")))
}

#[utoipa::path(
    get,
    path = "/api/courses",
    tag = "courses",
    security(("bearer_auth" = [])),
    responses((status = 200, description = "All courses", body = [Course]))
)]
pub async fn list_courses(_user: AuthUser, State(state): State<AppState>) -> AppResult<Json<Vec<Course>>> {
    Ok(Json(state.repo.list_courses().await?))
}

#[utoipa::path(
    get,
    path = "/api/courses/field/{field_id}",
    tag = "courses",
    security(("bearer_auth" = [])),
    params(("field_id" = i64, Path, description = "Field ID")),
    responses((status = 200, description = "Courses of the field", body = [Course]))
)]
pub async fn list_courses_by_field(
    _user: AuthUser,
    State(state): State<AppState>,
    Path(field_id): Path<i64>,
) -> AppResult<Json<Vec<Course>>> {
    Ok(Json(state.repo.list_courses_by_field(field_id).await?))
}

/// update_course
///
/// [Admin Route] Blank strings and a non-positive price keep the stored values. The
/// field id is required and must exist.
#[utoipa::path(
    put,
    path = "/api/courses/{id}",
    tag = "courses",
    security(("bearer_auth" = [])),
    params(("id" = i64, Path, description = "Course ID")),
    request_body = CourseRequest,
    responses(
        (status = 200, description = "Updated", body = Course),
        (status = 404, description = "Course or field not found")
    )
)]
pub async fn update_course(
    _admin: AdminUser,
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(req): Json<CourseRequest>,
) -> AppResult<Json<Course>> {
    let current = state
        .repo
        .get_course(id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Course not found with ID: {id}")))?;
    let field_id = resolve_field(&state, req.field_id).await?;

    let draft = CourseDraft {
        name: non_blank_or(&req.name, &current.name),
        platform: match req.platform.as_deref().map(str::trim) {
            Some(p) if !p.is_empty() => Some(p.to_string()),
            _ => current.platform,
        },
        description: non_blank_or(&req.description, &current.description),
        price: if req.price > 0.0 { req.price } else { current.price },
        field_id,
    };

    state
        .repo
        .update_course(id, &draft)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::not_found(format!("Course not found with ID: {id}")))
}

#[utoipa::path(
    delete,
    path = "/api/courses/{id}",
    tag = "courses",
    security(("bearer_auth" = [])),
    params(("id" = i64, Path, description = "Course ID")),
    responses(
        (status = 200, description = "Deleted"),
        (status = 404, description = "Course not found")
    )
)]
pub async fn delete_course(
    _admin: AdminUser,
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> AppResult<Json<Value>> {
    if !state.repo.delete_course(id).await? {
        return Err(AppError::not_found(format!("Course not found with ID: {id}")));
    }
    Ok(deleted("Course"))
}
