//! Webhook ingress from the deployment platform.

use axum::body::Bytes;
use axum::{extract::State, http::StatusCode};
use railwatch_core::status::model::WebhookPayload;
use tracing::{debug, warn};

use crate::state::AppState;

/// POST /webhook - Receive a deployment notification.
///
/// Always acknowledges with 200, so the platform never retries — even for
/// payloads this relay cannot use. The body is parsed leniently rather than
/// through the `Json` extractor, which would reject malformed bodies before
/// the handler runs.
pub async fn receive(State(state): State<AppState>, body: Bytes) -> StatusCode {
    let payload: WebhookPayload = match serde_json::from_slice(&body) {
        Ok(payload) => payload,
        Err(e) => {
            warn!(error = %e, "ignoring unparseable webhook body");
            return StatusCode::OK;
        }
    };

    match state.relay.ingest(&payload) {
        Some(update) => {
            debug!(
                service = %update.service_id,
                status = %update.status,
                "webhook update applied"
            );
        }
        None => debug!("webhook without deployment ignored"),
    }

    StatusCode::OK
}

#[cfg(test)]
mod tests {
    use super::*;
    use railwatch_core::Relay;
    use std::sync::Arc;

    fn state() -> AppState {
        AppState::new(Arc::new(Relay::new()))
    }

    #[tokio::test]
    async fn acknowledges_valid_payload() {
        let state = state();
        let body = Bytes::from_static(
            br#"{"deployment":{"serviceId":"svc1","status":"SUCCESS"},
                "service":{"id":"svc1","name":"api"},
                "project":{"name":"demo"}}"#,
        );

        assert_eq!(receive(State(state.clone()), body).await, StatusCode::OK);
        assert_eq!(state.relay.snapshot()["svc1"].status, "SUCCESS");
    }

    #[tokio::test]
    async fn acknowledges_payload_without_deployment() {
        let state = state();
        let body = Bytes::from_static(br#"{"status":"SUCCESS"}"#);

        assert_eq!(receive(State(state.clone()), body).await, StatusCode::OK);
        assert!(state.relay.snapshot().is_empty());
    }

    #[tokio::test]
    async fn acknowledges_malformed_body() {
        let state = state();
        let body = Bytes::from_static(b"\xff\xfe not json");

        assert_eq!(receive(State(state.clone()), body).await, StatusCode::OK);
        assert!(state.relay.snapshot().is_empty());
    }
}
