mod db;
mod domain;
mod policy;
mod scoring;
mod services;
mod state;
mod web;

use crate::scoring::NeutralPolicy;
use crate::state::SharedState;
use base64::{engine::general_purpose, Engine as _};
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let database_url = std::env::var("DATABASE_URL").expect("DATABASE_URL missing");
    tracing::info!("Connecting to database...");
    let pool = PgPoolOptions::new()
        .max_connections(10)
        .connect(&database_url)
        .await
        .map_err(|e| {
            tracing::error!("Failed to connect to database: {}", e);
            e
        })?;

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to run database migrations: {}", e);
            e
        })?;
    tracing::info!("Database migrations completed");

    let session_key_b64 = std::env::var("SESSION_KEY").expect("SESSION_KEY missing");
    let session_key = general_purpose::STANDARD
        .decode(session_key_b64)
        .expect("SESSION_KEY must be base64");

    let neutral_policy = neutral_policy_from_env();
    tracing::info!("Neutral answer policy: {:?}", neutral_policy);

    let store = Arc::new(db::postgres::PostgresStore::new(pool));
    db::seed::seed_catalog(store.as_ref()).await?;

    let shared: SharedState = Arc::new(state::AppState {
        diagnostics: services::DiagnosticService::new(store.clone(), store.clone(), neutral_policy),
        catalog: services::CatalogService::new(store),
        session_key,
    });

    let app = web::routes(shared)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr = std::env::var("BIND_ADDR").unwrap_or_else(|_| {
        let port = std::env::var("PORT").unwrap_or_else(|_| "3000".to_string());
        format!("0.0.0.0:{}", port)
    });
    tracing::info!("Listening on {addr}");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

fn neutral_policy_from_env() -> NeutralPolicy {
    match std::env::var("NEUTRAL_COUNTS_TOWARD_MAX") {
        Ok(val) if matches!(val.trim().to_lowercase().as_str(), "1" | "true" | "yes") => {
            NeutralPolicy::CountTowardMax
        }
        _ => NeutralPolicy::ExcludeFromMax,
    }
}
