use axum::{http::StatusCode, extract::State, response::{IntoResponse, Json}};
use serde_json::{json, Value};

use crate::app::AppState;

/// GET / - service description
pub async fn root() -> Json<Value> {
    let version = env!("CARGO_PKG_VERSION");

    Json(json!({
        "name": "Student Registry API",
        "version": version,
        "endpoints": {
            "students": "/api/students[/:id] (GET, POST, PATCH, DELETE)",
            "auth": "/auth/login (POST), /auth/whoami (GET)",
            "health": "/health",
        }
    }))
}

/// GET /health - liveness plus a store ping
pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    let now = chrono::Utc::now();
    let backend = state.store.backend();

    match state.store.health_check().await {
        Ok(_) => (
            StatusCode::OK,
            Json(json!({
                "status": "ok",
                "timestamp": now,
                "database": "ok",
                "backend": backend,
            })),
        ),
        Err(e) => {
            tracing::error!("Health check failed: {}", e);
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({
                    "status": "degraded",
                    "timestamp": now,
                    "database": "unavailable",
                    "backend": backend,
                })),
            )
        }
    }
}
