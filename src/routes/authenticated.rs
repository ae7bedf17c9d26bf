use crate::{
    AppState,
    handlers::{
        auth, certifications, courses, evaluation, exams, feedback, fields, majors, roadmaps,
        users,
    },
};
use axum::{
    Router,
    routing::{delete, get, post, put},
};

/// Authenticated Router Module
///
/// Every route here sits behind the `AuthUser` middleware layer. Catalog reads are open
/// to any active account; catalog writes take the `AdminUser` extractor and answer 403
/// for plain users.
pub fn authenticated_routes() -> Router<AppState> {
    Router::<AppState>::new()
        // POST /auth/logout
        // Revokes the presented token for the rest of the process lifetime.
        .route("/auth/logout", post(auth::logout))
        // --- Own account ---
        .route("/users/me", get(users::get_me))
        .route("/users/{id}", put(users::update_user))
        // --- Fields ---
        .route("/fields", get(fields::list_fields).post(fields::create_field))
        .route("/fields/search", get(fields::search_fields))
        .route(
            "/fields/{id}",
            get(fields::get_field)
                .put(fields::update_field)
                .delete(fields::delete_field),
        )
        // --- Courses ---
        .route("/courses", get(courses::list_courses).post(courses::create_course))
        .route("/courses/field/{field_id}", get(courses::list_courses_by_field))
        .route(
            "/courses/{id}",
            get(courses::get_course)
                .put(courses::update_course)
                .delete(courses::delete_course),
        )
        // --- Certifications ---
        .route(
            "/certifications",
            get(certifications::list_certifications).post(certifications::create_certification),
        )
        .route(
            "/certifications/field/{field_id}",
            get(certifications::list_certifications_by_field),
        )
        .route(
            "/certifications/{id}",
            get(certifications::get_certification)
                .put(certifications::update_certification)
                .delete(certifications::delete_certification),
        )
        // --- Roadmaps ---
        .route("/roadmaps", get(roadmaps::list_roadmaps).post(roadmaps::create_roadmap))
        .route("/roadmaps/field/{field_id}", get(roadmaps::list_roadmaps_by_field))
        .route(
            "/roadmaps/{id}",
            get(roadmaps::get_roadmap)
                .put(roadmaps::update_roadmap)
                .delete(roadmaps::delete_roadmap),
        )
        // --- Majors ---
        .route("/majors", get(majors::list_majors).post(majors::create_major))
        .route("/majors/search", get(majors::search_majors))
        .route(
            "/majors/{id}",
            get(majors::get_major)
                .put(majors::update_major)
                .delete(majors::delete_major),
        )
        // --- Exam ---
        // The exam is a singleton: "fixed" always resolves to the first exam created.
        .route("/exams", post(exams::create_exam))
        .route("/exams/fixed", get(exams::get_fixed_exam))
        .route(
            "/exams/fixed/questions",
            get(exams::get_fixed_questions).post(exams::add_question),
        )
        .route("/exams/questions", put(exams::update_question))
        .route("/exams/questions/{id}", delete(exams::delete_question))
        .route("/exams/questions/{id}/answers", post(exams::add_answer))
        .route("/exams/submit", post(exams::submit_exam))
        .route("/exams/results", get(exams::my_results))
        // --- Evaluation questions (ADMIN only) ---
        .route(
            "/evaluation-questions",
            get(evaluation::list_evaluation_questions).post(evaluation::create_evaluation_question),
        )
        .route(
            "/evaluation-questions/{id}",
            get(evaluation::get_evaluation_question)
                .put(evaluation::update_evaluation_question)
                .delete(evaluation::delete_evaluation_question),
        )
        // --- Feedback ---
        .route(
            "/feedbacks",
            get(feedback::list_feedbacks).post(feedback::create_feedback),
        )
        .route("/feedbacks/user", get(feedback::list_user_feedbacks))
        .route(
            "/feedbacks/{id}",
            get(feedback::get_feedback)
                .put(feedback::update_feedback)
                .delete(feedback::delete_feedback),
        )
}
