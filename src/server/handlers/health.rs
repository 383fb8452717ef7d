//! Liveness endpoint.

use axum::Json;
use chrono::Utc;
use serde_json::{json, Value};

/// `GET /health` - liveness probe.
pub async fn health_handler() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "timestamp": Utc::now(),
    }))
}
