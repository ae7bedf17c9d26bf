mod common;

use axum::http::StatusCode;
use career_map::models::Role;
use common::{TestApp, id_of};
use serde_json::json;

struct ExamFixture {
    admin: String,
    cs: i64,
    eng: i64,
    questions: Vec<i64>,
}

/// Two majors and three questions: CS only, CS + Engineering, Engineering only.
async fn exam_fixture(app: &TestApp) -> ExamFixture {
    let (_, admin) = app.login_as("admin@example.com", Role::Admin).await;

    let (_, cs) = app
        .post("/api/majors", &admin, json!({ "name": "Computer Science" }))
        .await;
    let (_, eng) = app
        .post("/api/majors", &admin, json!({ "name": "Engineering" }))
        .await;
    let (cs, eng) = (id_of(&cs), id_of(&eng));

    let (status, _) = app
        .post("/api/exams", &admin, json!({ "examName": "Major Finder" }))
        .await;
    assert_eq!(status, StatusCode::CREATED);

    let mut questions = Vec::new();
    for body in [
        json!({ "questionText": "I like writing code", "firstMajorId": cs }),
        json!({ "questionText": "I like solving maths problems", "firstMajorId": cs, "secondMajorId": eng }),
        json!({ "questionText": "I like building machines", "firstMajorId": eng }),
    ] {
        let (status, question) = app.post("/api/exams/fixed/questions", &admin, body).await;
        assert_eq!(status, StatusCode::CREATED, "{question}");
        questions.push(id_of(&question));
    }

    ExamFixture {
        admin,
        cs,
        eng,
        questions,
    }
}

#[tokio::test]
async fn fixed_exam_is_missing_until_created() {
    let app = TestApp::new();
    let (_, admin) = app.login_as("admin@example.com", Role::Admin).await;

    let (status, _) = app.get("/api/exams/fixed", &admin).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    app.post("/api/exams", &admin, json!({ "examName": "Major Finder" }))
        .await;
    let (status, exam) = app.get("/api/exams/fixed", &admin).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(exam["examName"], "Major Finder");
    assert!(exam["questions"].as_array().unwrap().is_empty());

    let (status, _) = app.get("/api/exams/fixed/questions", &admin).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, body) = app
        .post("/api/exams", &admin, json!({ "examName": "Second" }))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "An exam already exists");
}

#[tokio::test]
async fn submission_scores_every_major_and_stores_the_best() {
    let app = TestApp::new();
    let fx = exam_fixture(&app).await;
    let (student, token) = app.login_as("student@example.com", Role::User).await;

    let (status, outcome) = app
        .post(
            "/api/exams/submit",
            &token,
            json!({ "userAnswers": ["STRONGLY_AGREE", "AGREE", "NEUTRAL"] }),
        )
        .await;

    assert_eq!(status, StatusCode::OK, "{outcome}");
    assert_eq!(outcome["userId"], student.id);
    assert_eq!(outcome["majorId"], fx.cs);
    assert_eq!(outcome["suggestedMajorName"], "Computer Science");
    assert_eq!(outcome["score"], 90.0);

    let percentages = outcome["majorPercentages"].as_array().unwrap();
    assert_eq!(percentages.len(), 2);
    assert_eq!(percentages[0]["majorId"], fx.cs);
    assert_eq!(percentages[0]["percentage"], 90.0);
    assert_eq!(percentages[1]["majorId"], fx.eng);
    assert_eq!(percentages[1]["percentage"], 70.0);

    let (status, results) = app.get("/api/exams/results", &token).await;
    assert_eq!(status, StatusCode::OK);
    let results = results.as_array().unwrap();
    assert_eq!(results.len(), 1);
    assert_eq!(results[0]["id"], outcome["id"]);
    assert_eq!(results[0]["suggestedMajorName"], "Computer Science");
}

#[tokio::test]
async fn answer_count_must_match_question_count() {
    let app = TestApp::new();
    exam_fixture(&app).await;
    let (_, token) = app.login_as("student@example.com", Role::User).await;

    let (status, body) = app
        .post(
            "/api/exams/submit",
            &token,
            json!({ "userAnswers": ["AGREE", "AGREE"] }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Expected 3 answers but received 2");

    let (status, body) = app
        .post("/api/exams/submit", &token, json!({ "userAnswers": [] }))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "User answers cannot be empty");

    let (_, results) = app.get("/api/exams/results", &token).await;
    assert!(results.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn submission_to_an_unknown_exam_is_not_found() {
    let app = TestApp::new();
    exam_fixture(&app).await;
    let (_, token) = app.login_as("student@example.com", Role::User).await;

    let (status, body) = app
        .post(
            "/api/exams/submit",
            &token,
            json!({ "userAnswers": ["AGREE", "AGREE", "AGREE"], "examId": 9999 }),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Exam not found with ID: 9999");

    let (_, results) = app.get("/api/exams/results", &token).await;
    assert!(results.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn question_majors_must_exist_and_differ() {
    let app = TestApp::new();
    let fx = exam_fixture(&app).await;

    let (status, _) = app
        .post(
            "/api/exams/fixed/questions",
            &fx.admin,
            json!({ "questionText": "Same twice", "firstMajorId": fx.cs, "secondMajorId": fx.cs }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = app
        .post(
            "/api/exams/fixed/questions",
            &fx.admin,
            json!({ "questionText": "Unknown major", "firstMajorId": 9999 }),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = app
        .post(
            "/api/exams/fixed/questions",
            &fx.admin,
            json!({ "questionText": "No major" }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn question_update_merges_with_stored_values() {
    let app = TestApp::new();
    let fx = exam_fixture(&app).await;
    let mixed = fx.questions[1];

    let (status, _) = app
        .put("/api/exams/questions", &fx.admin, json!({ "id": mixed }))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    // The stored second major is Engineering, so this would pair it with itself.
    let (status, _) = app
        .put(
            "/api/exams/questions",
            &fx.admin,
            json!({ "id": mixed, "firstMajorId": fx.eng }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, updated) = app
        .put(
            "/api/exams/questions",
            &fx.admin,
            json!({ "id": mixed, "questionText": "I enjoy proofs" }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["questionText"], "I enjoy proofs");
    assert_eq!(updated["firstMajorId"], fx.cs);
    assert_eq!(updated["secondMajorId"], fx.eng);

    let (status, _) = app
        .put(
            "/api/exams/questions",
            &fx.admin,
            json!({ "id": 9999, "questionText": "Nobody" }),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn explicit_null_clears_the_second_major() {
    let app = TestApp::new();
    let fx = exam_fixture(&app).await;
    let mixed = fx.questions[1];

    let (status, updated) = app
        .put(
            "/api/exams/questions",
            &fx.admin,
            json!({ "id": mixed, "secondMajorId": null }),
        )
        .await;
    assert_eq!(status, StatusCode::OK, "{updated}");
    assert!(updated["secondMajorId"].is_null());
    assert_eq!(updated["firstMajorId"], fx.cs);

    // With the pairing gone the question can move to Engineering alone.
    let (status, updated) = app
        .put(
            "/api/exams/questions",
            &fx.admin,
            json!({ "id": mixed, "firstMajorId": fx.eng }),
        )
        .await;
    assert_eq!(status, StatusCode::OK, "{updated}");
    assert_eq!(updated["firstMajorId"], fx.eng);
    assert!(updated["secondMajorId"].is_null());

    let (status, updated) = app
        .put(
            "/api/exams/questions",
            &fx.admin,
            json!({ "id": mixed, "secondMajorId": fx.cs }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["secondMajorId"], fx.cs);

    let (_, questions) = app.get("/api/exams/fixed/questions", &fx.admin).await;
    let stored = questions
        .as_array()
        .unwrap()
        .iter()
        .find(|q| q["id"] == mixed)
        .unwrap();
    assert_eq!(stored["firstMajorId"], fx.eng);
    assert_eq!(stored["secondMajorId"], fx.cs);
}

#[tokio::test]
async fn answers_attach_to_questions_and_go_with_them() {
    let app = TestApp::new();
    let fx = exam_fixture(&app).await;
    let question = fx.questions[0];

    let (status, _) = app
        .post(
            &format!("/api/exams/questions/{question}/answers"),
            &fx.admin,
            json!({ "answerText": "Off the scale", "score": 6 }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, answer) = app
        .post(
            &format!("/api/exams/questions/{question}/answers"),
            &fx.admin,
            json!({ "answerText": "Very much", "score": 5 }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(answer["questionId"], question);

    let (_, questions) = app.get("/api/exams/fixed/questions", &fx.admin).await;
    assert_eq!(questions[0]["answers"][0]["answerText"], "Very much");

    let (status, _) = app
        .delete(&format!("/api/exams/questions/{question}"), &fx.admin)
        .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (_, questions) = app.get("/api/exams/fixed/questions", &fx.admin).await;
    assert_eq!(questions.as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn exam_administration_requires_admin() {
    let app = TestApp::new();
    let fx = exam_fixture(&app).await;
    let (_, token) = app.login_as("student@example.com", Role::User).await;

    let (status, _) = app
        .post(
            "/api/exams/fixed/questions",
            &token,
            json!({ "questionText": "Sneaky", "firstMajorId": fx.cs }),
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = app
        .delete(&format!("/api/exams/questions/{}", fx.questions[0]), &token)
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}
