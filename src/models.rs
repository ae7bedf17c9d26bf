use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use sqlx::FromRow;
use ts_rs::TS;
use utoipa::{IntoParams, ToSchema};

// --- Enumerations (mapped to Postgres enum types) ---

/// Role
///
/// The RBAC role of an account. Each role grants a fixed authority set,
/// `SUPER_ADMIN ⊃ ADMIN ⊃ USER`.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, sqlx::Type, TS, ToSchema,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[sqlx(type_name = "user_role", rename_all = "SCREAMING_SNAKE_CASE")]
#[ts(export)]
pub enum Role {
    #[default]
    User,
    Admin,
    SuperAdmin,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Role::User => "USER",
            Role::Admin => "ADMIN",
            Role::SuperAdmin => "SUPER_ADMIN",
        }
    }

    /// The authorities granted by this role.
    pub fn authorities(self) -> &'static [Role] {
        match self {
            Role::SuperAdmin => &[Role::SuperAdmin, Role::Admin, Role::User],
            Role::Admin => &[Role::Admin, Role::User],
            Role::User => &[Role::User],
        }
    }

    pub fn has_authority(self, authority: Role) -> bool {
        self.authorities().contains(&authority)
    }

    pub fn is_admin(self) -> bool {
        self.has_authority(Role::Admin)
    }
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, sqlx::Type, TS, ToSchema,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[sqlx(type_name = "user_status", rename_all = "SCREAMING_SNAKE_CASE")]
#[ts(export)]
pub enum UserStatus {
    #[default]
    Active,
    Inactive,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, TS, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[sqlx(type_name = "gender", rename_all = "SCREAMING_SNAKE_CASE")]
#[ts(export)]
pub enum Gender {
    Male,
    Female,
}

impl Gender {
    pub fn as_str(self) -> &'static str {
        match self {
            Gender::Male => "MALE",
            Gender::Female => "FEMALE",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, TS, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[sqlx(type_name = "education_level", rename_all = "SCREAMING_SNAKE_CASE")]
#[ts(export)]
pub enum EducationLevel {
    Graduate,
    University,
    Secondary,
    Intermediate,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, TS, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[sqlx(type_name = "university_college", rename_all = "SCREAMING_SNAKE_CASE")]
#[ts(export)]
pub enum UniversityCollege {
    Engineering,
    ComputerScience,
    Science,
    Theoretical,
}

/// FeedbackChoice
///
/// Five-point Likert scale shared by evaluation feedback and exam answers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, TS, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[sqlx(type_name = "feedback_choice", rename_all = "SCREAMING_SNAKE_CASE")]
#[ts(export)]
pub enum FeedbackChoice {
    StronglyAgree,
    Agree,
    Neutral,
    Disagree,
    StronglyDisagree,
}

impl FeedbackChoice {
    /// Points awarded for the choice, from 5 (strongly agree) down to 1.
    pub fn score(self) -> u32 {
        match self {
            FeedbackChoice::StronglyAgree => 5,
            FeedbackChoice::Agree => 4,
            FeedbackChoice::Neutral => 3,
            FeedbackChoice::Disagree => 2,
            FeedbackChoice::StronglyDisagree => 1,
        }
    }
}

// --- Accounts ---

/// User
///
/// The canonical account row from the `users` table. The password hash never leaves
/// the server: responses are built from `UserProfile` instead.
#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password_hash: String,
    pub country: Option<String>,
    pub city: Option<String>,
    pub role: Role,
    pub status: UserStatus,
    pub gender: Option<Gender>,
    pub education_level: Option<EducationLevel>,
    pub university_college: Option<UniversityCollege>,
    pub birth_date: Option<NaiveDate>,
    pub phone_number: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl User {
    pub fn is_active(&self) -> bool {
        self.status == UserStatus::Active
    }
}

/// NewUser
///
/// Insert payload for an account; the id and creation timestamp are assigned by storage.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password_hash: String,
    pub country: Option<String>,
    pub city: Option<String>,
    pub role: Role,
    pub status: UserStatus,
    pub gender: Option<Gender>,
    pub education_level: Option<EducationLevel>,
    pub university_college: Option<UniversityCollege>,
    pub birth_date: Option<NaiveDate>,
    pub phone_number: Option<String>,
}

/// UserProfile
///
/// Public view of an account (GET /users/me, admin listings).
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct UserProfile {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub country: Option<String>,
    pub city: Option<String>,
    pub role: Role,
    pub status: UserStatus,
    pub gender: Option<Gender>,
    pub education_level: Option<EducationLevel>,
    pub university_college: Option<UniversityCollege>,
    #[ts(type = "string | null")]
    pub birth_date: Option<NaiveDate>,
    pub phone_number: Option<String>,
    #[ts(type = "string")]
    pub created_at: DateTime<Utc>,
}

impl From<User> for UserProfile {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            first_name: user.first_name,
            last_name: user.last_name,
            email: user.email,
            country: user.country,
            city: user.city,
            role: user.role,
            status: user.status,
            gender: user.gender,
            education_level: user.education_level,
            university_college: user.university_college,
            birth_date: user.birth_date,
            phone_number: user.phone_number,
            created_at: user.created_at,
        }
    }
}

/// RegisterRequest
///
/// Input payload for POST /auth/register.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[serde(rename_all = "camelCase", default)]
#[ts(export)]
pub struct RegisterRequest {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password: String,
    pub confirm_password: String,
    pub country: Option<String>,
    pub city: Option<String>,
    pub gender: Option<Gender>,
    pub education_level: Option<EducationLevel>,
    pub university_college: Option<UniversityCollege>,
    #[ts(type = "string | null")]
    pub birth_date: Option<NaiveDate>,
    #[schema(example = "0591234567")]
    pub phone_number: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[serde(default)]
#[ts(export)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// AuthResponse
///
/// Returned by register and both login flows. The token is also echoed in the
/// `Authorization` response header on login.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct AuthResponse {
    pub token: String,
    pub user_id: i64,
}

/// UpdateUserRequest
///
/// Partial profile update. Only the provided fields are changed; a password change
/// must carry a matching confirmation.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[serde(rename_all = "camelCase", default)]
#[ts(export)]
pub struct UpdateUserRequest {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub country: Option<String>,
    pub city: Option<String>,
    pub gender: Option<Gender>,
    pub education_level: Option<EducationLevel>,
    pub university_college: Option<UniversityCollege>,
    #[ts(type = "string | null")]
    pub birth_date: Option<NaiveDate>,
    pub phone_number: Option<String>,
    pub password: Option<String>,
    pub confirm_password: Option<String>,
}

#[derive(Debug, Clone, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
pub struct RoleQuery {
    /// USER, ADMIN or SUPER_ADMIN.
    pub new_role: Role,
}

// --- Catalog ---

#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, FromRow)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Field {
    pub id: i64,
    pub name: String,
    pub description: String,
    pub image_url: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[serde(rename_all = "camelCase", default)]
#[ts(export)]
pub struct FieldRequest {
    pub name: String,
    pub description: String,
    pub image_url: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, FromRow)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Course {
    pub id: i64,
    pub name: String,
    pub platform: Option<String>,
    pub description: String,
    pub price: f64,
    pub field_id: i64,
}

/// CourseRequest
///
/// Shared by create and update. On update, blank strings and a non-positive price
/// keep the stored values.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[serde(rename_all = "camelCase", default)]
#[ts(export)]
pub struct CourseRequest {
    pub name: String,
    pub platform: Option<String>,
    pub description: String,
    pub price: f64,
    pub field_id: Option<i64>,
}

/// Certification
///
/// Row joined with its owning field so the response can carry `fieldName`.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, FromRow)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Certification {
    pub id: i64,
    pub name: String,
    pub platform: Option<String>,
    pub description: String,
    pub price: f64,
    pub field_id: i64,
    pub field_name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[serde(rename_all = "camelCase", default)]
#[ts(export)]
pub struct CertificationRequest {
    pub name: String,
    pub platform: Option<String>,
    pub description: String,
    pub price: f64,
    pub field_id: Option<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, FromRow)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Roadmap {
    pub id: i64,
    pub name: String,
    pub roadmap_stages: Option<String>,
    pub field_id: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[serde(rename_all = "camelCase", default)]
#[ts(export)]
pub struct RoadmapRequest {
    pub name: String,
    pub roadmap_stages: Option<String>,
    pub field_id: Option<i64>,
}

/// Optional `?fieldId=` used when updating a roadmap to move it to another field.
#[derive(Debug, Clone, Deserialize, IntoParams, Default)]
#[serde(rename_all = "camelCase")]
pub struct FieldIdQuery {
    pub field_id: Option<i64>,
}

#[derive(Debug, Clone, Deserialize, IntoParams, Default)]
pub struct SearchQuery {
    #[serde(default)]
    pub keyword: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, FromRow)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Major {
    pub id: i64,
    pub name: String,
    pub description: String,
    pub image_url: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[serde(rename_all = "camelCase", default)]
#[ts(export)]
pub struct MajorRequest {
    pub name: String,
    pub description: String,
    pub image_url: Option<String>,
}

// --- Exam ---

#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, FromRow)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Exam {
    pub id: i64,
    pub exam_name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[serde(rename_all = "camelCase", default)]
#[ts(export)]
pub struct ExamRequest {
    pub exam_name: String,
}

/// ExamDetail
///
/// The singleton exam with its questions, as served by GET /exams/fixed.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct ExamDetail {
    pub id: i64,
    pub exam_name: String,
    pub questions: Vec<ExamQuestion>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, FromRow)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct ExamAnswer {
    pub id: i64,
    pub answer_text: String,
    pub score: i32,
    pub question_id: i64,
}

/// ExamQuestion
///
/// A question feeding one or two majors. Major names are loaded via a JOIN and the
/// answer options are attached by the repository after the row is read.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, FromRow)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct ExamQuestion {
    pub id: i64,
    pub question_text: String,
    pub exam_id: i64,
    pub first_major_id: i64,
    pub first_major_name: String,
    pub second_major_id: Option<i64>,
    pub second_major_name: Option<String>,
    #[sqlx(skip)]
    pub answers: Vec<ExamAnswer>,
}

impl ExamQuestion {
    /// The majors this question contributes to, in declaration order.
    pub fn majors(&self) -> impl Iterator<Item = (i64, &str)> {
        std::iter::once((self.first_major_id, self.first_major_name.as_str())).chain(
            self.second_major_id
                .zip(self.second_major_name.as_deref()),
        )
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[serde(rename_all = "camelCase", default)]
#[ts(export)]
pub struct CreateQuestionRequest {
    pub question_text: String,
    pub first_major_id: Option<i64>,
    pub second_major_id: Option<i64>,
}

/// UpdateQuestionRequest
///
/// PUT /exams/questions. The question id travels in the body; absent fields keep
/// their stored values. `secondMajorId` tells an absent key (`None`) apart from an
/// explicit null (`Some(None)`), which removes the second major.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[serde(rename_all = "camelCase", default)]
#[ts(export)]
pub struct UpdateQuestionRequest {
    pub id: Option<i64>,
    pub question_text: Option<String>,
    pub first_major_id: Option<i64>,
    #[serde(deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<i64>)]
    #[ts(type = "number | null")]
    pub second_major_id: Option<Option<i64>>,
}

/// Marks a key that was present in the body, even when its value is null.
fn present<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// Resolved question values handed to storage.
#[derive(Debug, Clone)]
pub struct QuestionDraft {
    pub question_text: String,
    pub first_major_id: i64,
    pub second_major_id: Option<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[serde(rename_all = "camelCase", default)]
#[ts(export)]
pub struct AnswerRequest {
    pub answer_text: String,
    pub score: i32,
}

/// ExamSubmission
///
/// One Likert choice per question, in question order. `examId` is optional and
/// defaults to the singleton exam.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[serde(rename_all = "camelCase", default)]
#[ts(export)]
pub struct ExamSubmission {
    pub user_answers: Vec<FeedbackChoice>,
    pub exam_id: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS, ToSchema)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct MajorPercentage {
    pub major_id: i64,
    pub major_name: String,
    pub percentage: f64,
}

/// ExamResult
///
/// A stored result row, with the suggested major's name loaded via a JOIN.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, FromRow)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct ExamResult {
    pub id: i64,
    pub score: f64,
    pub user_id: i64,
    pub exam_id: i64,
    pub major_id: i64,
    pub suggested_major_name: String,
    #[ts(type = "string")]
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewExamResult {
    pub score: f64,
    pub user_id: i64,
    pub exam_id: i64,
    pub major_id: i64,
}

/// ExamOutcome
///
/// Response of POST /exams/submit: the persisted top suggestion plus the percentage
/// of every major the exam touched, best first.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct ExamOutcome {
    pub id: i64,
    pub score: f64,
    pub user_id: i64,
    pub exam_id: i64,
    pub major_id: i64,
    pub suggested_major_name: String,
    pub major_percentages: Vec<MajorPercentage>,
}

// --- Evaluation ---

#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, FromRow)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct EvaluationQuestion {
    pub id: i64,
    pub question_text: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[serde(rename_all = "camelCase", default)]
#[ts(export)]
pub struct EvaluationQuestionRequest {
    pub question_text: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, FromRow)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Feedback {
    pub id: i64,
    pub user_id: i64,
    pub question_id: i64,
    pub feedback_choice: FeedbackChoice,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct FeedbackRequest {
    pub question_id: i64,
    pub feedback_choice: FeedbackChoice,
}

#[derive(Debug, Clone, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
pub struct UserIdQuery {
    pub user_id: i64,
}

// --- Dashboard ---

/// PricedItem
///
/// Minimal projection used by the dashboard's price rankings.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, FromRow, Default)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct PricedItem {
    pub id: i64,
    pub name: String,
    pub price: f64,
}

/// Youngest and oldest age among accounts with a birth date; both 0 when none has one.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct AgeStats {
    pub min_age: i32,
    pub max_age: i32,
}

/// StatsSnapshot
///
/// Raw aggregates read from storage in one pass; the handler derives the dashboard
/// from it (ages need the current date).
#[derive(Debug, Clone, Default)]
pub struct StatsSnapshot {
    pub total_users: i64,
    pub users_by_role: Vec<(Role, i64)>,
    pub users_by_gender: Vec<(Option<Gender>, i64)>,
    pub new_users_since: i64,
    pub birth_dates: Vec<NaiveDate>,
    pub total_fields: i64,
    pub total_courses: i64,
    pub total_certifications: i64,
    pub total_roadmaps: i64,
    pub total_evaluations: i64,
    pub most_expensive_courses: Vec<PricedItem>,
    pub cheapest_courses: Vec<PricedItem>,
    pub most_expensive_certifications: Vec<PricedItem>,
    pub cheapest_certifications: Vec<PricedItem>,
}

/// AdminDashboardStats
///
/// Output schema for the administrative statistics dashboard (GET /admin/stats).
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct AdminDashboardStats {
    pub total_users: i64,
    pub users_by_role: BTreeMap<String, i64>,
    /// Accounts created during the last 30 days.
    pub new_users_in_period: i64,
    pub total_fields: i64,
    pub total_courses: i64,
    pub total_certifications: i64,
    pub total_roadmaps: i64,
    /// Number of feedback entries submitted against evaluation questions.
    pub total_evaluations: i64,
    pub users_by_gender: BTreeMap<String, i64>,
    pub age_stats: AgeStats,
    pub most_expensive_courses: Vec<PricedItem>,
    pub cheapest_courses: Vec<PricedItem>,
    pub most_expensive_certifications: Vec<PricedItem>,
    pub cheapest_certifications: Vec<PricedItem>,
}

// --- Resolved write payloads (validated by handlers, handed to storage) ---

#[derive(Debug, Clone, PartialEq)]
pub struct CourseDraft {
    pub name: String,
    pub platform: Option<String>,
    pub description: String,
    pub price: f64,
    pub field_id: i64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CertificationDraft {
    pub name: String,
    pub platform: Option<String>,
    pub description: String,
    pub price: f64,
    pub field_id: i64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RoadmapDraft {
    pub name: String,
    pub roadmap_stages: Option<String>,
    pub field_id: i64,
}
