use std::sync::Arc;

use anyhow::Context;
use career_map::{
    AppState, NewsApiClient, NewsState, PostgresRepository, RepositoryState, TokenService,
    bootstrap_super_admin,
    config::{AppConfig, Env},
    create_router,
};
use sqlx::postgres::PgPoolOptions;
use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// main
///
/// Entry point: configuration, logging, database (with migrations), external clients,
/// then the HTTP server.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 1. Configuration (fail fast on missing production secrets).
    dotenv::dotenv().ok();
    let config = AppConfig::load().context("invalid configuration")?;

    // 2. Logging. RUST_LOG wins over the defaults.
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "career_map=debug,tower_http=info,axum=trace".into());

    match config.env {
        Env::Local => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().pretty())
                .init();
        }
        Env::Production => {
            // JSON lines for the log aggregator.
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().json())
                .init();
        }
    }

    tracing::info!("Application starting in {:?} mode", config.env);

    // 3. Database and schema.
    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&config.db_url)
        .await
        .context("failed to connect to Postgres, check DATABASE_URL")?;

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .context("failed to apply database migrations")?;

    let repo = Arc::new(PostgresRepository::new(pool)) as RepositoryState;

    // 4. External services.
    if config.news_api_key.is_empty() {
        tracing::warn!("NEWS_API_KEY is not set; /api/news will fail upstream");
    }
    let news = Arc::new(
        NewsApiClient::new(&config.news_api_url, &config.news_api_key)
            .context("failed to build the news client")?,
    ) as NewsState;

    let tokens = TokenService::from_config(&config);
    let bind_addr = config.bind_addr.clone();

    // 5. Unified state.
    let app_state = AppState {
        repo,
        news,
        tokens,
        config,
    };

    bootstrap_super_admin(&app_state)
        .await
        .context("failed to create the bootstrap SUPER_ADMIN account")?;

    // 6. Server.
    let app = create_router(app_state);
    let listener = TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {bind_addr}"))?;

    tracing::info!("Listening on {bind_addr}");
    tracing::info!("API Documentation (Swagger UI) available at: http://{bind_addr}/swagger-ui");

    axum::serve(listener, app).await?;
    Ok(())
}
