pub mod customers;
pub mod errors;
pub mod oauth;
pub mod vehicles;

use anyhow::Result;
use axum::{extract::State, http::StatusCode, response::Json, routing::get, Router};
use serde_json::{json, Value};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::error;

use crate::auth::extractors::AppState;

pub async fn create_router() -> Result<Router<AppState>> {
    let router = Router::new()
        .route("/status", get(status_handler))
        .nest("/customers", customers::create_router().await?)
        .nest("/vehicles", vehicles::create_router().await?);

    Ok(router)
}

/// The full service: OAuth endpoints, the versioned API and health check.
pub async fn create_app(app_state: AppState) -> Result<Router> {
    let app = Router::new()
        .route("/", get(root_handler))
        .route("/health", get(health_handler))
        .nest("/oauth", oauth::create_router().await?)
        .nest("/api/v1", create_router().await?)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(app_state);

    Ok(app)
}

async fn status_handler() -> &'static str {
    "API is running"
}

async fn root_handler() -> &'static str {
    "Lubricentro API"
}

async fn health_handler(State(app_state): State<AppState>) -> (StatusCode, Json<Value>) {
    let uptime = app_state.startup_time.elapsed().as_secs();

    match app_state.database.health_check().await {
        Ok(_) => (
            StatusCode::OK,
            Json(json!({ "status": "ok", "database": "ok", "uptime_seconds": uptime })),
        ),
        Err(e) => {
            error!("Health check failed: {}", e);
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({ "status": "degraded", "database": "unavailable", "uptime_seconds": uptime })),
            )
        }
    }
}
