use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};

use super::require_text;
use crate::{
    AppState,
    auth::{AdminUser, AuthUser},
    error::{AppError, AppResult, RepositoryError},
    models::{
        AnswerRequest, CreateQuestionRequest, Exam, ExamAnswer, ExamDetail, ExamOutcome,
        ExamQuestion, ExamRequest, ExamResult, ExamSubmission, NewExamResult, QuestionDraft,
        UpdateQuestionRequest,
    },
    scoring::{round2, score_majors},
};

async fn fixed_exam(state: &AppState) -> AppResult<Exam> {
    state
        .repo
        .get_first_exam()
        .await?
        .ok_or_else(|| AppError::not_found("No exam found"))
}

async fn ensure_major(state: &AppState, major_id: i64) -> AppResult<()> {
    match state.repo.get_major(major_id).await? {
        Some(_) => Ok(()),
        None => Err(AppError::not_found(format!("Major not found with ID: {major_id}"))),
    }
}

/// Both majors must exist and a question cannot feed the same major twice.
async fn check_majors(state: &AppState, first: i64, second: Option<i64>) -> AppResult<()> {
    if second == Some(first) {
        return Err(AppError::validation("First and second major must be different"));
    }
    ensure_major(state, first).await?;
    if let Some(second) = second {
        ensure_major(state, second).await?;
    }
    Ok(())
}

/// create_exam
///
/// [Admin Route] Creates the singleton exam. A second exam is refused.
#[utoipa::path(
    post,
    path = "/api/exams",
    tag = "exams",
    security(("bearer_auth" = [])),
    request_body = ExamRequest,
    responses(
        (status = 201, description = "Created", body = Exam),
        (status = 400, description = "Name missing or an exam already exists")
    )
)]
pub async fn create_exam(
    _admin: AdminUser,
    State(state): State<AppState>,
    Json(req): Json<ExamRequest>,
) -> AppResult<(StatusCode, Json<Exam>)> {
    let name = require_text(&req.exam_name, "Exam name")?;
    if state.repo.get_first_exam().await?.is_some() {
        return Err(AppError::validation("An exam already exists"));
    }
    let exam = state.repo.create_exam(&name).await.map_err(|e| match e {
        RepositoryError::UniqueViolation(_) => AppError::validation("An exam already exists"),
        other => other.into(),
    })?;
    tracing::info!(exam_id = exam.id, "exam created");
    Ok((StatusCode::CREATED, Json(exam)))
}

#[utoipa::path(
    get,
    path = "/api/exams/fixed",
    tag = "exams",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "The exam with its questions", body = ExamDetail),
        (status = 404, description = "No exam has been created")
    )
)]
pub async fn get_fixed_exam(_user: AuthUser, State(state): State<AppState>) -> AppResult<Json<ExamDetail>> {
    let exam = fixed_exam(&state).await?;
    let questions = state.repo.list_questions(exam.id).await?;
    Ok(Json(ExamDetail {
        id: exam.id,
        exam_name: exam.exam_name,
        questions,
    }))
}

#[utoipa::path(
    get,
    path = "/api/exams/fixed/questions",
    tag = "exams",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Questions ordered by id", body = [ExamQuestion]),
        (status = 404, description = "No exam or no questions")
    )
)]
pub async fn get_fixed_questions(
    _user: AuthUser,
    State(state): State<AppState>,
) -> AppResult<Json<Vec<ExamQuestion>>> {
    let exam = fixed_exam(&state).await?;
    let questions = state.repo.list_questions(exam.id).await?;
    if questions.is_empty() {
        return Err(AppError::not_found("No questions found for the exam"));
    }
    Ok(Json(questions))
}

#[utoipa::path(
    post,
    path = "/api/exams/fixed/questions",
    tag = "exams",
    security(("bearer_auth" = [])),
    request_body = CreateQuestionRequest,
    responses(
        (status = 201, description = "Created", body = ExamQuestion),
        (status = 400, description = "Invalid question"),
        (status = 404, description = "Exam or major not found")
    )
)]
pub async fn add_question(
    _admin: AdminUser,
    State(state): State<AppState>,
    Json(req): Json<CreateQuestionRequest>,
) -> AppResult<(StatusCode, Json<ExamQuestion>)> {
    let question_text = require_text(&req.question_text, "Question text")?;
    let first_major_id = req
        .first_major_id
        .ok_or_else(|| AppError::validation("First major ID is required"))?;
    check_majors(&state, first_major_id, req.second_major_id).await?;

    let exam = fixed_exam(&state).await?;
    let draft = QuestionDraft {
        question_text,
        first_major_id,
        second_major_id: req.second_major_id,
    };
    let question = state.repo.create_question(exam.id, &draft).await?;
    Ok((StatusCode::CREATED, Json(question)))
}

/// update_question
///
/// [Admin Route] The question id travels in the body. Absent fields keep their stored
/// values, `"secondMajorId": null` clears the second major, and the merged pair of
/// majors must still differ.
#[utoipa::path(
    put,
    path = "/api/exams/questions",
    tag = "exams",
    security(("bearer_auth" = [])),
    request_body = UpdateQuestionRequest,
    responses(
        (status = 200, description = "Updated", body = ExamQuestion),
        (status = 400, description = "Invalid update"),
        (status = 404, description = "Question or major not found")
    )
)]
pub async fn update_question(
    _admin: AdminUser,
    State(state): State<AppState>,
    Json(req): Json<UpdateQuestionRequest>,
) -> AppResult<Json<ExamQuestion>> {
    let id = req
        .id
        .ok_or_else(|| AppError::validation("Question ID is required"))?;
    if req.question_text.is_none() && req.first_major_id.is_none() && req.second_major_id.is_none()
    {
        return Err(AppError::validation("At least one field must be provided"));
    }
    let current = state
        .repo
        .get_question(id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Question not found with ID: {id}")))?;

    let question_text = match req.question_text.as_deref() {
        Some(text) => require_text(text, "Question text")?,
        None => current.question_text,
    };
    let first_major_id = req.first_major_id.unwrap_or(current.first_major_id);
    // An explicit null removes the second major; an absent key keeps it.
    let second_major_id = match req.second_major_id {
        Some(explicit) => explicit,
        None => current.second_major_id,
    };
    check_majors(&state, first_major_id, second_major_id).await?;

    let draft = QuestionDraft {
        question_text,
        first_major_id,
        second_major_id,
    };
    state
        .repo
        .update_question(id, &draft)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::not_found(format!("Question not found with ID: {id}")))
}

#[utoipa::path(
    delete,
    path = "/api/exams/questions/{id}",
    tag = "exams",
    security(("bearer_auth" = [])),
    params(("id" = i64, Path, description = "Question ID")),
    responses(
        (status = 204, description = "Deleted"),
        (status = 404, description = "Question not found")
    )
)]
pub async fn delete_question(
    _admin: AdminUser,
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> AppResult<StatusCode> {
    if state.repo.delete_question(id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::not_found(format!("Question not found with ID: {id}")))
    }
}

#[utoipa::path(
    post,
    path = "/api/exams/questions/{id}/answers",
    tag = "exams",
    security(("bearer_auth" = [])),
    params(("id" = i64, Path, description = "Question ID")),
    request_body = AnswerRequest,
    responses(
        (status = 201, description = "Created", body = ExamAnswer),
        (status = 400, description = "Invalid answer"),
        (status = 404, description = "Question not found")
    )
)]
pub async fn add_answer(
    _admin: AdminUser,
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(req): Json<AnswerRequest>,
) -> AppResult<(StatusCode, Json<ExamAnswer>)> {
    let answer_text = require_text(&req.answer_text, "Answer text")?;
    if !(1..=5).contains(&req.score) {
        return Err(AppError::validation("Score must be between 1 and 5"));
    }
    if state.repo.get_question(id).await?.is_none() {
        return Err(AppError::not_found(format!("Question not found with ID: {id}")));
    }
    let req = AnswerRequest {
        answer_text,
        score: req.score,
    };
    let answer = state.repo.create_answer(id, &req).await?;
    Ok((StatusCode::CREATED, Json(answer)))
}

/// submit_exam
///
/// [Authenticated Route] Scores the submission against the exam's questions, stores the
/// best-matching major as the caller's result and returns every major's percentage.
#[utoipa::path(
    post,
    path = "/api/exams/submit",
    tag = "exams",
    security(("bearer_auth" = [])),
    request_body = ExamSubmission,
    responses(
        (status = 200, description = "Scored", body = ExamOutcome),
        (status = 400, description = "Answers missing or not matching the questions"),
        (status = 404, description = "Exam not found")
    )
)]
pub async fn submit_exam(
    user: AuthUser,
    State(state): State<AppState>,
    Json(submission): Json<ExamSubmission>,
) -> AppResult<Json<ExamOutcome>> {
    let exam = match submission.exam_id {
        Some(exam_id) => state
            .repo
            .get_exam(exam_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Exam not found with ID: {exam_id}")))?,
        None => fixed_exam(&state).await?,
    };

    let questions = state.repo.list_questions(exam.id).await?;
    let percentages = score_majors(&questions, &submission.user_answers)?;
    let Some(top) = percentages.first() else {
        return Err(AppError::Submission("No major could be scored".to_string()));
    };

    let saved = state
        .repo
        .save_exam_result(&NewExamResult {
            score: round2(top.percentage),
            user_id: user.id,
            exam_id: exam.id,
            major_id: top.major_id,
        })
        .await?;

    tracing::info!(
        user_id = user.id,
        exam_id = exam.id,
        major_id = saved.major_id,
        score = saved.score,
        "exam submitted"
    );

    Ok(Json(ExamOutcome {
        id: saved.id,
        score: saved.score,
        user_id: saved.user_id,
        exam_id: saved.exam_id,
        major_id: saved.major_id,
        suggested_major_name: saved.suggested_major_name,
        major_percentages: percentages,
    }))
}

#[utoipa::path(
    get,
    path = "/api/exams/results",
    tag = "exams",
    security(("bearer_auth" = [])),
    responses((status = 200, description = "The caller's stored results", body = [ExamResult]))
)]
pub async fn my_results(user: AuthUser, State(state): State<AppState>) -> AppResult<Json<Vec<ExamResult>>> {
    Ok(Json(state.repo.list_results_by_user(user.id).await?))
}
