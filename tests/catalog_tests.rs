mod common;

use axum::http::StatusCode;
use career_map::models::Role;
use common::{TestApp, id_of};
use serde_json::{Value, json};

async fn create_field(app: &TestApp, token: &str, name: &str) -> i64 {
    let (status, body) = app
        .post(
            "/api/fields",
            token,
            json!({ "name": name, "description": format!("{name} careers") }),
        )
        .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    id_of(&body)
}

fn names(body: &Value) -> Vec<String> {
    body.as_array()
        .unwrap()
        .iter()
        .map(|v| v["name"].as_str().unwrap().to_string())
        .collect()
}

#[tokio::test]
async fn reads_need_a_token_and_writes_need_admin() {
    let app = TestApp::new();
    let (_, user) = app.login_as("reader@example.com", Role::User).await;
    let (_, admin) = app.login_as("admin@example.com", Role::Admin).await;

    let (status, _) = app
        .post("/api/fields", &user, json!({ "name": "Design" }))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let field_id = create_field(&app, &admin, "Design").await;

    let (status, body) = app.get(&format!("/api/fields/{field_id}"), &user).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], "Design");

    let (status, body) = app.get("/api/fields/9999", &user).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Not Found");
}

#[tokio::test]
async fn field_search_is_case_insensitive() {
    let app = TestApp::new();
    let (_, admin) = app.login_as("admin@example.com", Role::Admin).await;
    create_field(&app, &admin, "Software Engineering").await;
    create_field(&app, &admin, "Data Science").await;
    create_field(&app, &admin, "Network Engineering").await;

    let (status, body) = app.get("/api/fields/search?keyword=ENGINEER", &admin).await;
    assert_eq!(status, StatusCode::OK);
    let mut found = names(&body);
    found.sort();
    assert_eq!(found, vec!["Network Engineering", "Software Engineering"]);
}

#[tokio::test]
async fn deleting_a_field_removes_its_catalog() {
    let app = TestApp::new();
    let (_, admin) = app.login_as("admin@example.com", Role::Admin).await;
    let doomed = create_field(&app, &admin, "Security").await;
    let kept = create_field(&app, &admin, "Cloud").await;

    for field_id in [doomed, kept] {
        let (status, _) = app
            .post(
                "/api/courses",
                &admin,
                json!({ "name": "Intro", "description": "basics", "price": 10.0, "fieldId": field_id }),
            )
            .await;
        assert_eq!(status, StatusCode::OK);
        let (status, _) = app
            .post(
                "/api/certifications",
                &admin,
                json!({ "name": "Cert", "description": "exam", "price": 100.0, "fieldId": field_id }),
            )
            .await;
        assert_eq!(status, StatusCode::OK);
        let (status, _) = app
            .post(
                "/api/roadmaps",
                &admin,
                json!({ "name": "Path", "roadmapStages": "a,b,c", "fieldId": field_id }),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED);
    }

    let (status, body) = app.delete(&format!("/api/fields/{doomed}"), &admin).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Field deleted successfully.");

    let (_, courses) = app.get(&format!("/api/courses/field/{doomed}"), &admin).await;
    assert!(courses.as_array().unwrap().is_empty());
    let (_, certs) = app.get(&format!("/api/certifications/field/{doomed}"), &admin).await;
    assert!(certs.as_array().unwrap().is_empty());
    let (_, roadmaps) = app.get(&format!("/api/roadmaps/field/{doomed}"), &admin).await;
    assert!(roadmaps.as_array().unwrap().is_empty());

    let (_, courses) = app.get("/api/courses", &admin).await;
    assert_eq!(courses.as_array().unwrap().len(), 1);

    let (status, _) = app.delete(&format!("/api/fields/{doomed}"), &admin).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn course_requires_an_existing_field() {
    let app = TestApp::new();
    let (_, admin) = app.login_as("admin@example.com", Role::Admin).await;

    let (status, _) = app
        .post(
            "/api/courses",
            &admin,
            json!({ "name": "Orphan", "price": 5.0, "fieldId": 4242 }),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = app
        .post("/api/courses", &admin, json!({ "name": "No field", "price": 5.0 }))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn course_update_keeps_blank_values_and_non_positive_price() {
    let app = TestApp::new();
    let (_, admin) = app.login_as("admin@example.com", Role::Admin).await;
    let field_id = create_field(&app, &admin, "Web").await;

    let (_, course) = app
        .post(
            "/api/courses",
            &admin,
            json!({
                "name": "Rust for the Web",
                "platform": "Udemy",
                "description": "axum and friends",
                "price": 49.5,
                "fieldId": field_id
            }),
        )
        .await;
    let course_id = id_of(&course);

    let (status, updated) = app
        .put(
            &format!("/api/courses/{course_id}"),
            &admin,
            json!({ "name": "  ", "platform": "", "description": "", "price": 0, "fieldId": field_id }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["name"], "Rust for the Web");
    assert_eq!(updated["platform"], "Udemy");
    assert_eq!(updated["description"], "axum and friends");
    assert_eq!(updated["price"], 49.5);

    let (status, updated) = app
        .put(
            &format!("/api/courses/{course_id}"),
            &admin,
            json!({ "name": "Rust Web II", "price": 60.0, "fieldId": field_id }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["name"], "Rust Web II");
    assert_eq!(updated["price"], 60.0);

    let (status, body) = app.delete(&format!("/api/courses/{course_id}"), &admin).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Course deleted successfully.");
}

#[tokio::test]
async fn certification_carries_its_field_name() {
    let app = TestApp::new();
    let (_, admin) = app.login_as("admin@example.com", Role::Admin).await;
    let cloud = create_field(&app, &admin, "Cloud").await;
    let data = create_field(&app, &admin, "Data").await;

    let (status, cert) = app
        .post(
            "/api/certifications",
            &admin,
            json!({ "name": "Solutions Architect", "platform": "AWS", "price": 150.0, "fieldId": cloud }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(cert["fieldName"], "Cloud");

    let (status, moved) = app
        .put(
            &format!("/api/certifications/{}", id_of(&cert)),
            &admin,
            json!({ "name": "Data Engineer", "platform": "GCP", "price": 200.0, "fieldId": data }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(moved["fieldName"], "Data");
    assert_eq!(moved["name"], "Data Engineer");
}

#[tokio::test]
async fn roadmap_lifecycle() {
    let app = TestApp::new();
    let (_, admin) = app.login_as("admin@example.com", Role::Admin).await;
    let first = create_field(&app, &admin, "Mobile").await;
    let second = create_field(&app, &admin, "Games").await;

    let (status, roadmap) = app
        .post(
            "/api/roadmaps",
            &admin,
            json!({ "name": "Android", "roadmapStages": "Kotlin,Jetpack", "fieldId": first }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    let id = id_of(&roadmap);

    let (status, updated) = app
        .put(
            &format!("/api/roadmaps/{id}?fieldId={second}"),
            &admin,
            json!({ "name": "", "roadmapStages": "" }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["name"], "Android");
    assert_eq!(updated["roadmapStages"], "Kotlin,Jetpack");
    assert_eq!(updated["fieldId"], second);

    let (status, _) = app
        .put(&format!("/api/roadmaps/{id}?fieldId=777"), &admin, json!({}))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, body) = app.delete(&format!("/api/roadmaps/{id}"), &admin).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    assert!(body.is_null());
}

#[tokio::test]
async fn at_most_six_majors() {
    let app = TestApp::new();
    let (_, admin) = app.login_as("admin@example.com", Role::Admin).await;

    for n in 1..=6 {
        let (status, _) = app
            .post("/api/majors", &admin, json!({ "name": format!("Major {n}") }))
            .await;
        assert_eq!(status, StatusCode::OK);
    }

    let (status, body) = app
        .post("/api/majors", &admin, json!({ "name": "Major 7" }))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Cannot add more than 6 majors");

    let (_, found) = app.get("/api/majors/search?keyword=major%203", &admin).await;
    assert_eq!(names(&found), vec!["Major 3"]);
}

#[tokio::test]
async fn major_used_by_a_question_cannot_be_deleted() {
    let app = TestApp::new();
    let (_, admin) = app.login_as("admin@example.com", Role::Admin).await;

    let (_, major) = app
        .post("/api/majors", &admin, json!({ "name": "Computer Science" }))
        .await;
    let (_, spare) = app.post("/api/majors", &admin, json!({ "name": "Law" })).await;
    app.post("/api/exams", &admin, json!({ "examName": "Placement" }))
        .await;
    let (status, _) = app
        .post(
            "/api/exams/fixed/questions",
            &admin,
            json!({ "questionText": "I enjoy programming", "firstMajorId": id_of(&major) }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = app
        .delete(&format!("/api/majors/{}", id_of(&major)), &admin)
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Validation Error");

    let (status, body) = app
        .delete(&format!("/api/majors/{}", id_of(&spare)), &admin)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Major deleted successfully.");
}
