mod common;

use axum::http::StatusCode;
use career_map::models::Role;
use common::{TestApp, id_of};
use serde_json::json;

async fn evaluation_question(app: &TestApp, admin: &str, text: &str) -> i64 {
    let (status, body) = app
        .post("/api/evaluation-questions", admin, json!({ "questionText": text }))
        .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    id_of(&body)
}

#[tokio::test]
async fn evaluation_questions_are_admin_only_and_unique() {
    let app = TestApp::new();
    let (_, admin) = app.login_as("admin@example.com", Role::Admin).await;
    let (_, user) = app.login_as("user@example.com", Role::User).await;

    let id = evaluation_question(&app, &admin, "Was the roadmap useful?").await;

    let (status, _) = app.get("/api/evaluation-questions", &user).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = app
        .post(
            "/api/evaluation-questions",
            &admin,
            json!({ "questionText": "Was the roadmap useful?" }),
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "Conflict");

    let (status, _) = app
        .post("/api/evaluation-questions", &admin, json!({ "questionText": "   " }))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, updated) = app
        .put(
            &format!("/api/evaluation-questions/{id}"),
            &admin,
            json!({ "questionText": "Was the roadmap clear?" }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["questionText"], "Was the roadmap clear?");
}

#[tokio::test]
async fn feedback_author_comes_from_the_token() {
    let app = TestApp::new();
    let (_, admin) = app.login_as("admin@example.com", Role::Admin).await;
    let (user, token) = app.login_as("user@example.com", Role::User).await;
    let question = evaluation_question(&app, &admin, "Did you find a major?").await;

    let (status, feedback) = app
        .post(
            "/api/feedbacks",
            &token,
            json!({ "questionId": question, "feedbackChoice": "AGREE" }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(feedback["userId"], user.id);
    assert_eq!(feedback["feedbackChoice"], "AGREE");

    let (status, _) = app
        .post(
            "/api/feedbacks",
            &token,
            json!({ "questionId": 9999, "feedbackChoice": "AGREE" }),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = app.get("/api/feedbacks/9999", &token).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn users_see_and_edit_only_their_own_feedback() {
    let app = TestApp::new();
    let (_, admin) = app.login_as("admin@example.com", Role::Admin).await;
    let (alice, alice_token) = app.login_as("alice@example.com", Role::User).await;
    let (bob, bob_token) = app.login_as("bob@example.com", Role::User).await;
    let question = evaluation_question(&app, &admin, "Would you recommend us?").await;

    let (_, feedback) = app
        .post(
            "/api/feedbacks",
            &alice_token,
            json!({ "questionId": question, "feedbackChoice": "NEUTRAL" }),
        )
        .await;
    let feedback_id = id_of(&feedback);

    let (status, own) = app
        .get(&format!("/api/feedbacks/user?userId={}", alice.id), &alice_token)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(own.as_array().unwrap().len(), 1);

    let (status, _) = app
        .get(&format!("/api/feedbacks/user?userId={}", alice.id), &bob_token)
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = app
        .put(
            &format!("/api/feedbacks/{feedback_id}"),
            &bob_token,
            json!({ "questionId": question, "feedbackChoice": "DISAGREE" }),
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, updated) = app
        .put(
            &format!("/api/feedbacks/{feedback_id}"),
            &alice_token,
            json!({ "questionId": question, "feedbackChoice": "STRONGLY_AGREE" }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["feedbackChoice"], "STRONGLY_AGREE");

    let (status, _) = app
        .delete(&format!("/api/feedbacks/{feedback_id}"), &bob_token)
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (_, bobs) = app
        .get(&format!("/api/feedbacks/user?userId={}", bob.id), &bob_token)
        .await;
    assert!(bobs.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn admins_may_delete_any_feedback() {
    let app = TestApp::new();
    let (_, admin) = app.login_as("admin@example.com", Role::Admin).await;
    let (_, token) = app.login_as("user@example.com", Role::User).await;
    let question = evaluation_question(&app, &admin, "Rate the courses").await;

    let (_, feedback) = app
        .post(
            "/api/feedbacks",
            &token,
            json!({ "questionId": question, "feedbackChoice": "DISAGREE" }),
        )
        .await;

    let (status, body) = app
        .delete(&format!("/api/feedbacks/{}", id_of(&feedback)), &admin)
        .await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    assert!(body.is_null());
}

#[tokio::test]
async fn deleting_a_question_removes_its_feedback() {
    let app = TestApp::new();
    let (_, admin) = app.login_as("admin@example.com", Role::Admin).await;
    let (_, token) = app.login_as("user@example.com", Role::User).await;
    let question = evaluation_question(&app, &admin, "Temporary question").await;

    let (_, feedback) = app
        .post(
            "/api/feedbacks",
            &token,
            json!({ "questionId": question, "feedbackChoice": "AGREE" }),
        )
        .await;

    let (status, _) = app
        .delete(&format!("/api/evaluation-questions/{question}"), &admin)
        .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = app
        .get(&format!("/api/feedbacks/{}", id_of(&feedback)), &token)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = app
        .delete(&format!("/api/evaluation-questions/{question}"), &admin)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
