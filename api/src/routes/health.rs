//! Health check.

use axum::extract::State;
use axum::Json;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::ws::{WsMetricsSnapshot, WsState};

/// `GET /health` response body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Always `healthy` while the process serves requests.
    pub status: String,
    /// Server time.
    pub timestamp: DateTime<Utc>,
    /// Realtime counters.
    pub realtime: WsMetricsSnapshot,
}

/// `GET /health`
pub async fn health(State(ws): State<WsState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        timestamp: Utc::now(),
        realtime: ws.metrics.snapshot(),
    })
}
