use axum::{extract::State, routing::get, Json, Router};
use serde::Serialize;
use time::OffsetDateTime;
use tracing::warn;

use crate::state::AppState;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    pub status: &'static str,
    pub service: &'static str,
    pub version: &'static str,
    #[serde(with = "time::serde::rfc3339")]
    pub timestamp: OffsetDateTime,
    pub uptime_seconds: u64,
    pub environment: &'static str,
    pub database: &'static str,
    pub settings: SettingsCheck,
}

/// Which settings are present, never their values.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SettingsCheck {
    pub jwt_secret: bool,
    pub storage_bucket: bool,
    pub cors_origins: usize,
}

pub fn routes() -> Router<AppState> {
    Router::new().route("/health", get(health))
}

pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    let database = match sqlx::query("SELECT 1").execute(&state.db).await {
        Ok(_) => "connected",
        Err(e) => {
            warn!(error = %e, "health check: database unreachable");
            "disconnected"
        }
    };

    let cfg = &state.config;
    Json(HealthResponse {
        status: "online",
        service: env!("CARGO_PKG_NAME"),
        version: env!("CARGO_PKG_VERSION"),
        timestamp: OffsetDateTime::now_utc(),
        uptime_seconds: state.started_at.elapsed().as_secs(),
        environment: cfg.environment.as_str(),
        database,
        settings: SettingsCheck {
            jwt_secret: !cfg.jwt.secret.is_empty(),
            storage_bucket: !cfg.storage.bucket.is_empty(),
            cors_origins: cfg.cors_origins.len(),
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn reports_disconnected_database_without_failing() {
        let state = AppState::fake();
        let Json(body) = health(State(state)).await;
        assert_eq!(body.status, "online");
        assert_eq!(body.database, "disconnected");
        assert!(body.settings.jwt_secret);
        let json = serde_json::to_string(&body).unwrap();
        assert!(!json.contains("test-secret"));
    }
}
