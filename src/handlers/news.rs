use axum::{
    Json,
    extract::{Query, State},
};
use serde::Deserialize;
use serde_json::Value;
use utoipa::IntoParams;

use crate::{
    error::{AppError, AppResult},
    news::{NEWS_CATEGORIES, NewsState, is_known_category},
};

#[derive(Debug, Deserialize, IntoParams)]
pub struct NewsQuery {
    /// One of business, entertainment, general, health, science, sports, technology.
    pub category: String,
}

/// get_news
///
/// [Public Route] Proxies the provider's top US headlines for a category and returns the
/// provider document untouched.
#[utoipa::path(
    get,
    path = "/api/news",
    tag = "news",
    params(NewsQuery),
    responses(
        (status = 200, description = "Provider JSON document"),
        (status = 400, description = "Unknown category"),
        (status = 502, description = "Provider unavailable")
    )
)]
pub async fn get_news(
    State(news): State<NewsState>,
    Query(query): Query<NewsQuery>,
) -> AppResult<Json<Value>> {
    let category = query.category.trim().to_ascii_lowercase();
    if !is_known_category(&category) {
        return Err(AppError::validation(format!(
            "Unknown category '{}'. Expected one of: {}",
            query.category,
            NEWS_CATEGORIES.join(", ")
        )));
    }

    match news.top_headlines(&category).await {
        Ok(document) => Ok(Json(document)),
        Err(err) => {
            tracing::error!(error = %err, category = %category, "news provider call failed");
            Err(AppError::Upstream("Could not fetch news at this time".to_string()))
        }
    }
}
