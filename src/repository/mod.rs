use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::{
    error::RepositoryError,
    models::{
        AnswerRequest, Certification, CertificationDraft, Course, CourseDraft, EvaluationQuestion,
        Exam, ExamAnswer, ExamQuestion, ExamResult, Feedback, FeedbackRequest, Field, FieldRequest,
        Major, MajorRequest, NewExamResult, NewUser, QuestionDraft, Roadmap, RoadmapDraft,
        StatsSnapshot, User,
    },
};

mod memory;
mod postgres;

pub use memory::InMemoryRepository;
pub use postgres::PostgresRepository;

pub type RepoResult<T> = Result<T, RepositoryError>;

/// Repository Trait
///
/// The abstract contract for all persistence operations. Handlers only see this trait,
/// so the Postgres implementation and the in-memory one used by tests are interchangeable.
///
/// Lookups return `Ok(None)` for a missing row; deletes and updates report whether a row
/// was affected. Constraint violations surface as the classified `RepositoryError` variants.
#[async_trait]
pub trait Repository: Send + Sync {
    // --- Accounts ---
    async fn get_user(&self, id: i64) -> RepoResult<Option<User>>;
    async fn find_user_by_email(&self, email: &str) -> RepoResult<Option<User>>;
    async fn create_user(&self, user: NewUser) -> RepoResult<User>;
    async fn list_users(&self) -> RepoResult<Vec<User>>;
    // Persists every mutable column of the account.
    async fn save_user(&self, user: &User) -> RepoResult<User>;

    // --- Fields ---
    async fn create_field(&self, req: &FieldRequest) -> RepoResult<Field>;
    async fn get_field(&self, id: i64) -> RepoResult<Option<Field>>;
    async fn list_fields(&self) -> RepoResult<Vec<Field>>;
    async fn update_field(&self, id: i64, req: &FieldRequest) -> RepoResult<Option<Field>>;
    /// Deletes the field together with its courses, certifications and roadmaps,
    /// atomically.
    async fn delete_field(&self, id: i64) -> RepoResult<bool>;
    async fn search_fields(&self, keyword: &str) -> RepoResult<Vec<Field>>;

    // --- Courses ---
    async fn create_course(&self, draft: &CourseDraft) -> RepoResult<Course>;
    async fn get_course(&self, id: i64) -> RepoResult<Option<Course>>;
    async fn list_courses(&self) -> RepoResult<Vec<Course>>;
    async fn list_courses_by_field(&self, field_id: i64) -> RepoResult<Vec<Course>>;
    async fn update_course(&self, id: i64, draft: &CourseDraft) -> RepoResult<Option<Course>>;
    async fn delete_course(&self, id: i64) -> RepoResult<bool>;

    // --- Certifications ---
    async fn create_certification(&self, draft: &CertificationDraft) -> RepoResult<Certification>;
    async fn get_certification(&self, id: i64) -> RepoResult<Option<Certification>>;
    async fn list_certifications(&self) -> RepoResult<Vec<Certification>>;
    async fn list_certifications_by_field(&self, field_id: i64) -> RepoResult<Vec<Certification>>;
    async fn update_certification(
        &self,
        id: i64,
        draft: &CertificationDraft,
    ) -> RepoResult<Option<Certification>>;
    async fn delete_certification(&self, id: i64) -> RepoResult<bool>;

    // --- Roadmaps ---
    async fn create_roadmap(&self, draft: &RoadmapDraft) -> RepoResult<Roadmap>;
    async fn get_roadmap(&self, id: i64) -> RepoResult<Option<Roadmap>>;
    async fn list_roadmaps(&self) -> RepoResult<Vec<Roadmap>>;
    async fn list_roadmaps_by_field(&self, field_id: i64) -> RepoResult<Vec<Roadmap>>;
    async fn update_roadmap(&self, id: i64, draft: &RoadmapDraft) -> RepoResult<Option<Roadmap>>;
    async fn delete_roadmap(&self, id: i64) -> RepoResult<bool>;

    // --- Majors ---
    /// Inserts the major unless `limit` majors already exist (`None`). The count and the
    /// insert are atomic with respect to concurrent creations.
    async fn create_major(&self, req: &MajorRequest, limit: i64) -> RepoResult<Option<Major>>;
    async fn get_major(&self, id: i64) -> RepoResult<Option<Major>>;
    async fn list_majors(&self) -> RepoResult<Vec<Major>>;
    async fn update_major(&self, id: i64, req: &MajorRequest) -> RepoResult<Option<Major>>;
    // Fails with `ForeignKey` while exam questions or results still reference the major.
    async fn delete_major(&self, id: i64) -> RepoResult<bool>;
    async fn search_majors(&self, keyword: &str) -> RepoResult<Vec<Major>>;

    // --- Exam ---
    /// The singleton exam: the one with the lowest id, if any.
    async fn get_first_exam(&self) -> RepoResult<Option<Exam>>;
    async fn get_exam(&self, id: i64) -> RepoResult<Option<Exam>>;
    /// Fails with `UniqueViolation` when an exam already exists.
    async fn create_exam(&self, exam_name: &str) -> RepoResult<Exam>;
    /// Questions of the exam ordered by id, answers attached.
    async fn list_questions(&self, exam_id: i64) -> RepoResult<Vec<ExamQuestion>>;
    async fn get_question(&self, id: i64) -> RepoResult<Option<ExamQuestion>>;
    async fn create_question(&self, exam_id: i64, draft: &QuestionDraft)
    -> RepoResult<ExamQuestion>;
    async fn update_question(
        &self,
        id: i64,
        draft: &QuestionDraft,
    ) -> RepoResult<Option<ExamQuestion>>;
    async fn delete_question(&self, id: i64) -> RepoResult<bool>;
    async fn create_answer(&self, question_id: i64, req: &AnswerRequest) -> RepoResult<ExamAnswer>;
    /// Inserts the result and reads it back inside one transaction. A failed read-back
    /// rolls the insert back and reports `Verification`.
    async fn save_exam_result(&self, result: &NewExamResult) -> RepoResult<ExamResult>;
    async fn list_results_by_user(&self, user_id: i64) -> RepoResult<Vec<ExamResult>>;

    // --- Evaluation questions ---
    async fn create_evaluation_question(&self, text: &str) -> RepoResult<EvaluationQuestion>;
    async fn get_evaluation_question(&self, id: i64) -> RepoResult<Option<EvaluationQuestion>>;
    async fn list_evaluation_questions(&self) -> RepoResult<Vec<EvaluationQuestion>>;
    async fn update_evaluation_question(
        &self,
        id: i64,
        text: &str,
    ) -> RepoResult<Option<EvaluationQuestion>>;
    // Cascades to the feedback given on the question.
    async fn delete_evaluation_question(&self, id: i64) -> RepoResult<bool>;

    // --- Feedback ---
    async fn create_feedback(&self, user_id: i64, req: &FeedbackRequest) -> RepoResult<Feedback>;
    async fn get_feedback(&self, id: i64) -> RepoResult<Option<Feedback>>;
    async fn list_feedbacks(&self) -> RepoResult<Vec<Feedback>>;
    async fn list_feedbacks_by_user(&self, user_id: i64) -> RepoResult<Vec<Feedback>>;
    async fn update_feedback(&self, id: i64, req: &FeedbackRequest)
    -> RepoResult<Option<Feedback>>;
    async fn delete_feedback(&self, id: i64) -> RepoResult<bool>;

    // --- Dashboard ---
    /// Aggregates for the admin dashboard. `new_users_since` counts accounts created at or
    /// after `since`.
    async fn stats_snapshot(&self, since: DateTime<Utc>) -> RepoResult<StatsSnapshot>;
}

/// RepositoryState
///
/// The concrete type used to share the persistence layer across the application state.
pub type RepositoryState = Arc<dyn Repository>;
