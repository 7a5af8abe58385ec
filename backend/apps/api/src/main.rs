//! API Server Entry Point
//!
//! Application entry point and server initialization.
//! Uses `anyhow` for startup errors, but application-level
//! errors should use `kernel::error::AppError`.

use axum::{Json, Router, routing::get};
use base64::Engine;
use base64::engine::general_purpose;
use reset::{Mailer, PgResetRepository, ResetConfig, SmtpSettings, reset_router};
use serde_json::json;
use sqlx::postgres::PgPoolOptions;
use std::env;
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

// Re-export unified error types for use in handlers
pub use kernel::error::{
    app_error::{AppError, AppResult},
    kind::ErrorKind,
};

fn env_flag(name: &str, default: bool) -> bool {
    match env::var(name) {
        Ok(v) => !v.eq_ignore_ascii_case("false"),
        Err(_) => default,
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "api=info,reset=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Database connection
    let database_url = env::var("DATABASE_URL").expect("DATABASE_URL must be set in environment");

    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&database_url)
        .await?;

    tracing::info!("Connected to database");

    // Run migrations
    sqlx::migrate!("../../../database/migrations")
        .run(&pool)
        .await?;

    tracing::info!("Migrations completed");

    // Startup cleanup: remove expired reset records and stale limiter rows.
    // Errors here should not prevent server startup
    let repo = PgResetRepository::new(pool.clone());
    match repo.cleanup_expired().await {
        Ok(deleted) => {
            tracing::info!(resets_deleted = deleted, "Reset cleanup completed");
        }
        Err(e) => {
            tracing::warn!(error = %e, "Reset cleanup failed, continuing anyway");
        }
    }

    // Reset flow configuration
    let port: u16 = env::var("PORT")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(3001);
    let demo_mode = env_flag("DEMO_MODE", true);
    let allow_provisioning = env_flag("DEMO_ALLOW_USER_PROVISIONING", true);
    let base_url =
        env::var("PUBLIC_BASE_URL").unwrap_or_else(|_| format!("http://localhost:{port}"));

    let pepper = match env::var("PASSWORD_PEPPER") {
        Ok(b64) => Some(Engine::decode(&general_purpose::STANDARD, &b64)?),
        Err(_) => None,
    };

    let config = ResetConfig::new(demo_mode, allow_provisioning, base_url, pepper);
    let mailer = Mailer::log_only(SmtpSettings::from_env());

    // Build router
    let app = Router::new()
        .nest("/api", reset_router(repo, config, mailer))
        .route("/health", get(|| async { Json(json!({ "ok": true })) }))
        .layer(TraceLayer::new_for_http());

    // Start server
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    tracing::info!("Listening on {}", addr);

    let listener = TcpListener::bind(addr).await?;
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}
