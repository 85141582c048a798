use std::sync::Arc;

use anyhow::{Context, Result};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use sop_author::config::{database::create_pool, AppConfig, AppState};
use sop_author::create_app;
use sop_author::repositories::{InMemorySopRepository, PgSopRepository, SopRepository};
use sop_author::services::{OllamaClient, TracingAuditSink};

#[tokio::main]
async fn main() -> Result<()> {
    // Default to INFO; override with RUST_LOG
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "sop_author=info,tower_http=info,sqlx=warn".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = AppConfig::from_env()?;

    let repository: Arc<dyn SopRepository> = match config.database_url.as_deref() {
        Some(url) => {
            let pool = create_pool(url).await.context("Failed to connect to database")?;
            let repo = PgSopRepository::new(pool);
            repo.migrate().await?;
            tracing::info!("Using Postgres SOP store");
            Arc::new(repo)
        }
        None => {
            tracing::warn!("DATABASE_URL not set, SOP jobs are kept in memory only");
            Arc::new(InMemorySopRepository::new())
        }
    };

    let ollama = OllamaClient::new(&config.ollama.host, &config.ollama.model, config.ollama.timeout)?;
    match ollama.check_model_availability().await {
        Ok(true) => tracing::info!("Ollama model {} is available", config.ollama.model),
        Ok(false) => tracing::warn!("Ollama model {} is not pulled yet", config.ollama.model),
        Err(e) => tracing::warn!("Ollama server not reachable at startup: {}", e),
    }

    let addr = config.server_address();
    let state = AppState::new(config, repository, Arc::new(ollama), Arc::new(TracingAuditSink))?;
    let app = create_app(state);

    tracing::info!("Starting SOP authoring service on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
