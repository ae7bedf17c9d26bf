use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};

use crate::{
    AppState,
    auth::AuthUser,
    error::{AppError, AppResult},
    models::{Feedback, FeedbackRequest, UserIdQuery},
};

async fn ensure_question(state: &AppState, question_id: i64) -> AppResult<()> {
    match state.repo.get_evaluation_question(question_id).await? {
        Some(_) => Ok(()),
        None => Err(AppError::not_found(format!(
            "Evaluation question not found with ID: {question_id}"
        ))),
    }
}

async fn load(state: &AppState, id: i64) -> AppResult<Feedback> {
    state
        .repo
        .get_feedback(id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Feedback not found with ID: {id}")))
}

/// create_feedback
///
/// [Authenticated Route] The author is always the caller; the question must exist.
#[utoipa::path(
    post,
    path = "/api/feedbacks",
    tag = "feedbacks",
    security(("bearer_auth" = [])),
    request_body = FeedbackRequest,
    responses(
        (status = 200, description = "Created", body = Feedback),
        (status = 404, description = "Question not found")
    )
)]
pub async fn create_feedback(
    user: AuthUser,
    State(state): State<AppState>,
    Json(req): Json<FeedbackRequest>,
) -> AppResult<Json<Feedback>> {
    ensure_question(&state, req.question_id).await?;
    Ok(Json(state.repo.create_feedback(user.id, &req).await?))
}

#[utoipa::path(
    get,
    path = "/api/feedbacks/{id}",
    tag = "feedbacks",
    security(("bearer_auth" = [])),
    params(("id" = i64, Path, description = "Feedback ID")),
    responses(
        (status = 200, description = "Found", body = Feedback),
        (status = 404, description = "Feedback not found")
    )
)]
pub async fn get_feedback(
    _user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> AppResult<Json<Feedback>> {
    Ok(Json(load(&state, id).await?))
}

#[utoipa::path(
    get,
    path = "/api/feedbacks",
    tag = "feedbacks",
    security(("bearer_auth" = [])),
    responses((status = 200, description = "All feedback", body = [Feedback]))
)]
pub async fn list_feedbacks(_user: AuthUser, State(state): State<AppState>) -> AppResult<Json<Vec<Feedback>>> {
    Ok(Json(state.repo.list_feedbacks().await?))
}

/// list_user_feedbacks
///
/// [Authenticated Route] Callers may only list their own feedback.
#[utoipa::path(
    get,
    path = "/api/feedbacks/user",
    tag = "feedbacks",
    security(("bearer_auth" = [])),
    params(UserIdQuery),
    responses(
        (status = 200, description = "The caller's feedback", body = [Feedback]),
        (status = 403, description = "Another user's feedback")
    )
)]
pub async fn list_user_feedbacks(
    user: AuthUser,
    State(state): State<AppState>,
    Query(query): Query<UserIdQuery>,
) -> AppResult<Json<Vec<Feedback>>> {
    if query.user_id != user.id {
        return Err(AppError::forbidden("You can only view your own feedback"));
    }
    Ok(Json(state.repo.list_feedbacks_by_user(user.id).await?))
}

#[utoipa::path(
    put,
    path = "/api/feedbacks/{id}",
    tag = "feedbacks",
    security(("bearer_auth" = [])),
    params(("id" = i64, Path, description = "Feedback ID")),
    request_body = FeedbackRequest,
    responses(
        (status = 200, description = "Updated", body = Feedback),
        (status = 403, description = "Not the author"),
        (status = 404, description = "Feedback or question not found")
    )
)]
pub async fn update_feedback(
    user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(req): Json<FeedbackRequest>,
) -> AppResult<Json<Feedback>> {
    let existing = load(&state, id).await?;
    if existing.user_id != user.id {
        return Err(AppError::forbidden("You can only update your own feedback"));
    }
    ensure_question(&state, req.question_id).await?;
    state
        .repo
        .update_feedback(id, &req)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::not_found(format!("Feedback not found with ID: {id}")))
}

#[utoipa::path(
    delete,
    path = "/api/feedbacks/{id}",
    tag = "feedbacks",
    security(("bearer_auth" = [])),
    params(("id" = i64, Path, description = "Feedback ID")),
    responses(
        (status = 204, description = "Deleted"),
        (status = 403, description = "Neither the author nor an admin"),
        (status = 404, description = "Feedback not found")
    )
)]
pub async fn delete_feedback(
    user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> AppResult<StatusCode> {
    let existing = load(&state, id).await?;
    user.ensure_self_or_admin(existing.user_id)?;
    state.repo.delete_feedback(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
