use std::any::Any;

use axum::{
    Router,
    extract::{FromRef, Request},
    http::HeaderName,
    middleware::{self, Next},
    response::{IntoResponse, Response},
};
use utoipa::{
    Modify, OpenApi,
    openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
};
use utoipa_swagger_ui::SwaggerUi;

use tower::ServiceBuilder;
use tower_http::{
    catch_panic::CatchPanicLayer,
    cors::{Any as AnyOrigin, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::{DefaultOnResponse, TraceLayer},
};
use tracing::{Level, Span};

// --- Module Structure ---

pub mod auth;
pub mod config;
pub mod error;
pub mod handlers;
pub mod models;
pub mod news;
pub mod password;
pub mod repository;
pub mod scoring;
pub mod token;

// Routers grouped by access level (public, authenticated, admin).
pub mod routes;
use auth::AuthUser;
use routes::{admin, authenticated, public};

// --- Public Re-exports ---

pub use config::AppConfig;
pub use error::{AppError, AppResult};
pub use news::{MockNewsService, NewsApiClient, NewsState};
pub use repository::{InMemoryRepository, PostgresRepository, RepositoryState};
pub use token::TokenService;

use models::{NewUser, Role, UserStatus};

/// ApiDoc
///
/// Aggregates every `#[utoipa::path]` handler and `ToSchema` model into the OpenAPI
/// document served at `/api-docs/openapi.json`.
#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::auth::register, handlers::auth::login, handlers::auth::admin_login,
        handlers::auth::logout,
        handlers::users::get_me, handlers::users::update_user,
        handlers::admin::list_users, handlers::admin::get_user, handlers::admin::update_user_role,
        handlers::admin::toggle_user_status, handlers::admin::delete_user,
        handlers::admin::update_user, handlers::admin::get_admin_stats,
        handlers::fields::create_field, handlers::fields::get_field, handlers::fields::list_fields,
        handlers::fields::update_field, handlers::fields::delete_field,
        handlers::fields::search_fields,
        handlers::courses::create_course, handlers::courses::get_course,
        handlers::courses::list_courses, handlers::courses::list_courses_by_field,
        handlers::courses::update_course, handlers::courses::delete_course,
        handlers::certifications::create_certification,
        handlers::certifications::get_certification,
        handlers::certifications::list_certifications,
        handlers::certifications::list_certifications_by_field,
        handlers::certifications::update_certification,
        handlers::certifications::delete_certification,
        handlers::roadmaps::create_roadmap, handlers::roadmaps::get_roadmap,
        handlers::roadmaps::list_roadmaps, handlers::roadmaps::list_roadmaps_by_field,
        handlers::roadmaps::update_roadmap, handlers::roadmaps::delete_roadmap,
        handlers::majors::create_major, handlers::majors::get_major, handlers::majors::list_majors,
        handlers::majors::update_major, handlers::majors::delete_major,
        handlers::majors::search_majors,
        handlers::exams::create_exam, handlers::exams::get_fixed_exam,
        handlers::exams::get_fixed_questions, handlers::exams::add_question,
        handlers::exams::update_question, handlers::exams::delete_question,
        handlers::exams::add_answer, handlers::exams::submit_exam, handlers::exams::my_results,
        handlers::evaluation::create_evaluation_question,
        handlers::evaluation::list_evaluation_questions,
        handlers::evaluation::get_evaluation_question,
        handlers::evaluation::update_evaluation_question,
        handlers::evaluation::delete_evaluation_question,
        handlers::feedback::create_feedback, handlers::feedback::get_feedback,
        handlers::feedback::list_feedbacks, handlers::feedback::list_user_feedbacks,
        handlers::feedback::update_feedback, handlers::feedback::delete_feedback,
        handlers::news::get_news,
    ),
    components(
        schemas(
            models::Role, models::UserStatus, models::Gender, models::EducationLevel,
            models::UniversityCollege, models::FeedbackChoice,
            models::UserProfile, models::RegisterRequest, models::LoginRequest,
            models::AuthResponse, models::UpdateUserRequest,
            models::Field, models::FieldRequest, models::Course, models::CourseRequest,
            models::Certification, models::CertificationRequest, models::Roadmap,
            models::RoadmapRequest, models::Major, models::MajorRequest,
            models::Exam, models::ExamRequest, models::ExamDetail, models::ExamQuestion,
            models::ExamAnswer, models::CreateQuestionRequest, models::UpdateQuestionRequest,
            models::AnswerRequest, models::ExamSubmission, models::MajorPercentage,
            models::ExamResult, models::ExamOutcome,
            models::EvaluationQuestion, models::EvaluationQuestionRequest, models::Feedback,
            models::FeedbackRequest,
            models::PricedItem, models::AgeStats, models::AdminDashboardStats,
        )
    ),
    modifiers(&BearerSecurity),
    tags(
        (name = "auth", description = "Registration, login and logout"),
        (name = "users", description = "The caller's own account"),
        (name = "admin", description = "Account moderation and dashboard"),
        (name = "fields", description = "Career fields"),
        (name = "courses", description = "Courses per field"),
        (name = "certifications", description = "Certifications per field"),
        (name = "roadmaps", description = "Learning roadmaps per field"),
        (name = "majors", description = "University majors scored by the exam"),
        (name = "exams", description = "The major-recommendation exam"),
        (name = "evaluation-questions", description = "Platform evaluation questions"),
        (name = "feedbacks", description = "Answers to evaluation questions"),
        (name = "news", description = "Headlines proxy"),
    )
)]
pub struct ApiDoc;

/// Registers the `bearer_auth` scheme referenced by the handlers' `security(...)` blocks.
struct BearerSecurity;

impl Modify for BearerSecurity {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

/// AppState
///
/// Implements the **Unified State Pattern**: one cheaply clonable container holding every
/// service a handler may need. Extractors pull individual parts out through `FromRef`.
#[derive(Clone)]
pub struct AppState {
    /// Persistence layer (Postgres in production, in-memory in tests).
    pub repo: RepositoryState,
    /// Headlines provider client.
    pub news: NewsState,
    /// Token issuing, verification and the logout blacklist.
    pub tokens: TokenService,
    /// The loaded, immutable environment configuration.
    pub config: AppConfig,
}

// --- Axum FromRef Extractor Implementations ---

impl FromRef<AppState> for RepositoryState {
    fn from_ref(app_state: &AppState) -> RepositoryState {
        app_state.repo.clone()
    }
}

impl FromRef<AppState> for NewsState {
    fn from_ref(app_state: &AppState) -> NewsState {
        app_state.news.clone()
    }
}

impl FromRef<AppState> for TokenService {
    fn from_ref(app_state: &AppState) -> TokenService {
        app_state.tokens.clone()
    }
}

impl FromRef<AppState> for AppConfig {
    fn from_ref(app_state: &AppState) -> AppConfig {
        app_state.config.clone()
    }
}

/// auth_middleware
///
/// Runs the `AuthUser` extractor before any authenticated route. A missing, revoked,
/// expired or forged token, or an inactive account, is rejected with a 401 JSON body
/// before the handler is reached.
async fn auth_middleware(_auth_user: AuthUser, request: Request, next: Next) -> Response {
    next.run(request).await
}

/// JSON 404 for any path no router matched.
async fn fallback() -> AppError {
    AppError::not_found("Resource not found")
}

/// Turns a handler panic into the standard 500 JSON body.
fn handle_panic(err: Box<dyn Any + Send + 'static>) -> Response {
    let detail = err
        .downcast_ref::<String>()
        .map(String::as_str)
        .or_else(|| err.downcast_ref::<&str>().copied())
        .unwrap_or("handler panicked");
    AppError::Internal(detail.to_string()).into_response()
}

/// create_router
///
/// Assembles the routing tree, applies the observability layers and registers the
/// application state.
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_methods(AnyOrigin)
        .allow_origin(AnyOrigin)
        .allow_headers(AnyOrigin);

    let x_request_id = HeaderName::from_static("x-request-id");

    let api = Router::new()
        .merge(public::public_routes())
        .merge(
            authenticated::authenticated_routes().route_layer(middleware::from_fn_with_state(
                state.clone(),
                auth_middleware,
            )),
        )
        .nest("/admin", admin::admin_routes());

    let base_router = Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        // GET /health
        // Liveness probe for load balancers; no database round-trip.
        .route("/health", axum::routing::get(|| async { "ok" }))
        .nest("/api", api)
        .fallback(fallback)
        .with_state(state);

    base_router
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::new(x_request_id.clone(), MakeRequestUuid))
                .layer(
                    TraceLayer::new_for_http()
                        .make_span_with(trace_span_logger)
                        .on_response(
                            DefaultOnResponse::new()
                                .level(Level::INFO)
                                .latency_unit(tower_http::LatencyUnit::Millis),
                        ),
                )
                .layer(PropagateRequestIdLayer::new(x_request_id))
                .layer(CatchPanicLayer::custom(handle_panic)),
        )
        .layer(cors)
}

/// trace_span_logger
///
/// Opens the per-request span, tagged with the `x-request-id` so every log line of a
/// request can be correlated.
fn trace_span_logger(request: &axum::http::Request<axum::body::Body>) -> Span {
    let request_id = request
        .headers()
        .get("x-request-id")
        .and_then(|value| value.to_str().ok())
        .unwrap_or("unknown");

    tracing::info_span!(
        "http_request",
        method = ?request.method(),
        uri = ?request.uri(),
        req_id = %request_id,
    )
}

/// bootstrap_super_admin
///
/// Creates the configured SUPER_ADMIN account on startup when `SUPER_ADMIN_EMAIL` and
/// `SUPER_ADMIN_PASSWORD` are both set and no account uses that email yet. Returns
/// whether an account was created.
pub async fn bootstrap_super_admin(state: &AppState) -> AppResult<bool> {
    let (Some(email), Some(password)) = (
        state.config.super_admin_email.as_deref(),
        state.config.super_admin_password.as_deref(),
    ) else {
        return Ok(false);
    };

    if state.repo.find_user_by_email(email).await?.is_some() {
        tracing::debug!(email, "bootstrap account already present");
        return Ok(false);
    }

    let password_hash = password::hash_password(password, state.config.bcrypt_cost).await?;
    let user = state
        .repo
        .create_user(NewUser {
            first_name: "Super".to_string(),
            last_name: "Admin".to_string(),
            email: email.to_string(),
            password_hash,
            country: None,
            city: None,
            role: Role::SuperAdmin,
            status: UserStatus::Active,
            gender: None,
            education_level: None,
            university_college: None,
            birth_date: None,
            phone_number: None,
        })
        .await?;

    tracing::info!(user_id = user.id, "bootstrap SUPER_ADMIN account created");
    Ok(true)
}
