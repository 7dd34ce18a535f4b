use axum::{extract::State, Json};
use serde::Serialize;
use time::OffsetDateTime;
use tracing::instrument;

use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    #[serde(with = "time::serde::rfc3339")]
    pub timestamp: OffsetDateTime,
    pub version: &'static str,
    pub database: &'static str,
}

/// Store reachability, process version, UTC timestamp. No side effects.
#[instrument(skip(state))]
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let database = if state.db.is_closed() {
        "disconnected"
    } else {
        match sqlx::query("SELECT 1").execute(&state.db).await {
            Ok(_) => "connected",
            Err(_) => "unavailable",
        }
    };

    Json(HealthResponse {
        status: "healthy",
        timestamp: OffsetDateTime::now_utc(),
        version: env!("CARGO_PKG_VERSION"),
        database,
    })
}
