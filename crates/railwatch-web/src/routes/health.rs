//! Health route handler.

use axum::{extract::State, Json};
use serde_json::{json, Value};

use crate::state::AppState;

/// GET /api/health - Process liveness plus the startup fetch outcome.
pub async fn health(State(state): State<AppState>) -> Json<Value> {
    let relay = &state.relay;
    Json(json!({
        "status": "ok",
        "upstreamFetch": relay.fetch_state(),
        "subscribers": relay.subscriber_count(),
        "services": relay.service_count(),
    }))
}
