use axum::{extract::State, http::StatusCode, Json};
use serde::Serialize;

use super::state::AppState;

#[derive(Debug, Clone, Serialize)]
pub struct HealthData {
    pub status: String,
    pub version: String,
    pub database: DatabaseStatus,
    pub ai: AiStatus,
}

#[derive(Debug, Clone, Serialize)]
pub struct DatabaseStatus {
    pub status: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct AiStatus {
    pub model: String,
}

/// `GET /health`
pub async fn health_check(State(state): State<AppState>) -> (StatusCode, Json<HealthData>) {
    let (code, db_status) = match state.db.ping().await {
        Ok(()) => (StatusCode::OK, "ok"),
        Err(error) => {
            tracing::warn!(error = %error, "Database health check failed");
            (StatusCode::SERVICE_UNAVAILABLE, "error")
        }
    };

    let data = HealthData {
        status: if code.is_success() { "ok" } else { "degraded" }.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        database: DatabaseStatus {
            status: db_status.to_string(),
        },
        ai: AiStatus {
            model: state.assistant.model().to_string(),
        },
    };

    (code, Json(data))
}
