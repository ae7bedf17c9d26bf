use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};

use super::require_text;
use crate::{
    AppState,
    auth::AdminUser,
    error::{AppError, AppResult, RepositoryError},
    models::{EvaluationQuestion, EvaluationQuestionRequest},
};

fn duplicate_or(err: RepositoryError) -> AppError {
    match err {
        RepositoryError::UniqueViolation(_) => {
            AppError::Conflict("An evaluation question with this text already exists".to_string())
        }
        other => other.into(),
    }
}

#[utoipa::path(
    post,
    path = "/api/evaluation-questions",
    tag = "evaluation-questions",
    security(("bearer_auth" = [])),
    request_body = EvaluationQuestionRequest,
    responses(
        (status = 201, description = "Created", body = EvaluationQuestion),
        (status = 409, description = "Duplicate question text")
    )
)]
pub async fn create_evaluation_question(
    _admin: AdminUser,
    State(state): State<AppState>,
    Json(req): Json<EvaluationQuestionRequest>,
) -> AppResult<(StatusCode, Json<EvaluationQuestion>)> {
    let text = require_text(&req.question_text, "Question text")?;
    let question = state
        .repo
        .create_evaluation_question(&text)
        .await
        .map_err(duplicate_or)?;
    Ok((StatusCode::CREATED, Json(question)))
}

#[utoipa::path(
    get,
    path = "/api/evaluation-questions",
    tag = "evaluation-questions",
    security(("bearer_auth" = [])),
    responses((status = 200, description = "All questions", body = [EvaluationQuestion]))
)]
pub async fn list_evaluation_questions(
    _admin: AdminUser,
    State(state): State<AppState>,
) -> AppResult<Json<Vec<EvaluationQuestion>>> {
    Ok(Json(state.repo.list_evaluation_questions().await?))
}

#[utoipa::path(
    get,
    path = "/api/evaluation-questions/{id}",
    tag = "evaluation-questions",
    security(("bearer_auth" = [])),
    params(("id" = i64, Path, description = "Evaluation question ID")),
    responses(
        (status = 200, description = "Found", body = EvaluationQuestion),
        (status = 404, description = "Question not found")
    )
)]
pub async fn get_evaluation_question(
    _admin: AdminUser,
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> AppResult<Json<EvaluationQuestion>> {
    state
        .repo
        .get_evaluation_question(id)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::not_found(format!("Evaluation question not found with ID: {id}")))
}

#[utoipa::path(
    put,
    path = "/api/evaluation-questions/{id}",
    tag = "evaluation-questions",
    security(("bearer_auth" = [])),
    params(("id" = i64, Path, description = "Evaluation question ID")),
    request_body = EvaluationQuestionRequest,
    responses(
        (status = 200, description = "Updated", body = EvaluationQuestion),
        (status = 404, description = "Question not found"),
        (status = 409, description = "Duplicate question text")
    )
)]
pub async fn update_evaluation_question(
    _admin: AdminUser,
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(req): Json<EvaluationQuestionRequest>,
) -> AppResult<Json<EvaluationQuestion>> {
    let text = require_text(&req.question_text, "Question text")?;
    state
        .repo
        .update_evaluation_question(id, &text)
        .await
        .map_err(duplicate_or)?
        .map(Json)
        .ok_or_else(|| AppError::not_found(format!("Evaluation question not found with ID: {id}")))
}

/// delete_evaluation_question
///
/// [Admin Route] Also removes every feedback entry given on the question.
#[utoipa::path(
    delete,
    path = "/api/evaluation-questions/{id}",
    tag = "evaluation-questions",
    security(("bearer_auth" = [])),
    params(("id" = i64, Path, description = "Evaluation question ID")),
    responses(
        (status = 204, description = "Deleted"),
        (status = 404, description = "Question not found")
    )
)]
pub async fn delete_evaluation_question(
    _admin: AdminUser,
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> AppResult<StatusCode> {
    if state.repo.delete_evaluation_question(id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::not_found(format!("Evaluation question not found with ID: {id}")))
    }
}
