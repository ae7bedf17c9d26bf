#![allow(dead_code)]

use std::sync::Arc;

use axum::{
    Router,
    body::Body,
    http::{Method, Request, StatusCode, header},
};
use career_map::{
    AppConfig, AppState, InMemoryRepository, MockNewsService, NewsState, RepositoryState,
    TokenService, create_router,
    models::{NewUser, Role, User, UserStatus},
    password::hash_password,
};
use serde_json::Value;
use tower::ServiceExt;

pub const PASSWORD: &str = "secret123";

/// A router over the in-memory repository, plus direct access to its state for seeding.
pub struct TestApp {
    pub router: Router,
    pub state: AppState,
}

impl TestApp {
    pub fn new() -> Self {
        Self::with_news(MockNewsService::new())
    }

    pub fn with_news(news: MockNewsService) -> Self {
        let config = AppConfig::default();
        let state = AppState {
            repo: Arc::new(InMemoryRepository::new()) as RepositoryState,
            news: Arc::new(news) as NewsState,
            tokens: TokenService::from_config(&config),
            config,
        };
        Self {
            router: create_router(state.clone()),
            state,
        }
    }

    /// Inserts an ACTIVE account with `PASSWORD` directly through the repository.
    pub async fn seed_user(&self, email: &str, role: Role) -> User {
        let password_hash = hash_password(PASSWORD, self.state.config.bcrypt_cost)
            .await
            .unwrap();
        self.state
            .repo
            .create_user(NewUser {
                first_name: "Test".to_string(),
                last_name: "User".to_string(),
                email: email.to_string(),
                password_hash,
                country: None,
                city: None,
                role,
                status: UserStatus::Active,
                gender: None,
                education_level: None,
                university_college: None,
                birth_date: None,
                phone_number: None,
            })
            .await
            .unwrap()
    }

    pub fn token_for(&self, user: &User) -> String {
        self.state.tokens.issue(user).unwrap()
    }

    /// Seeds an account of the given role and returns it with a valid token.
    pub async fn login_as(&self, email: &str, role: Role) -> (User, String) {
        let user = self.seed_user(email, role).await;
        let token = self.token_for(&user);
        (user, token)
    }

    pub async fn send(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let (status, _, body) = self.send_raw(method, uri, token, body).await;
        (status, body)
    }

    /// Like `send`, also returning the response headers.
    pub async fn send_raw(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, axum::http::HeaderMap, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        let request = match body {
            Some(json) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let headers = response.headers().clone();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes)
                .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()))
        };
        (status, headers, body)
    }

    pub async fn get(&self, uri: &str, token: &str) -> (StatusCode, Value) {
        self.send(Method::GET, uri, Some(token), None).await
    }

    pub async fn post(&self, uri: &str, token: &str, body: Value) -> (StatusCode, Value) {
        self.send(Method::POST, uri, Some(token), Some(body)).await
    }

    pub async fn put(&self, uri: &str, token: &str, body: Value) -> (StatusCode, Value) {
        self.send(Method::PUT, uri, Some(token), Some(body)).await
    }

    pub async fn delete(&self, uri: &str, token: &str) -> (StatusCode, Value) {
        self.send(Method::DELETE, uri, Some(token), None).await
    }
}

pub fn id_of(body: &Value) -> i64 {
    body["id"].as_i64().expect("response carries an id")
}
