//! Axum routes for the webhook gateway.

use std::sync::Arc;

use axum::{
    Json, Router,
    body::Bytes,
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use tower_http::trace::TraceLayer;
use tracing::{Instrument, debug, info_span, warn};
use uuid::Uuid;

use crate::channels::{SignatureVerifier, decode_events};
use crate::error::WebhookError;
use crate::pipeline::processor::EventProcessor;
use crate::pipeline::types::BatchReport;

pub const SIGNATURE_HEADER: &str = "X-Line-Signature";

/// Body returned once a batch has been processed.
pub const WEBHOOK_ACK: &str = "OK";

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    pub verifier: SignatureVerifier,
    pub processor: Arc<EventProcessor>,
}

impl AppState {
    pub fn new(verifier: SignatureVerifier, processor: Arc<EventProcessor>) -> Self {
        Self {
            verifier,
            processor,
        }
    }

    /// Authenticate, decode, and process one webhook request.
    ///
    /// Nothing is processed unless the signature matches.
    pub async fn handle_webhook(
        &self,
        headers: &HeaderMap,
        body: &[u8],
    ) -> Result<BatchReport, WebhookError> {
        let signature = headers
            .get(SIGNATURE_HEADER)
            .and_then(|v| v.to_str().ok())
            .ok_or(WebhookError::MissingSignature)?;

        self.verifier.verify(body, signature)?;
        let batch = decode_events(body)?;
        debug!(received = batch.received, text_events = batch.events.len(), "Webhook decoded");

        Ok(self.processor.process_batch(batch).await)
    }
}

/// Build the Axum router with the health and webhook routes.
pub fn app_routes(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/webhooks/line", post(line_webhook))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}

// ── Health ──────────────────────────────────────────────────────────────

async fn health() -> &'static str {
    "ok"
}

// ── Webhook ─────────────────────────────────────────────────────────────

async fn line_webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let request_id = Uuid::new_v4();
    let span = info_span!("line_webhook", %request_id);

    async move {
        match state.handle_webhook(&headers, &body).await {
            Ok(_) => (StatusCode::OK, WEBHOOK_ACK).into_response(),
            Err(e) => {
                warn!(error = %e, "Rejected webhook request");
                (
                    StatusCode::BAD_REQUEST,
                    Json(serde_json::json!({"error": e.to_string()})),
                )
                    .into_response()
            }
        }
    }
    .instrument(span)
    .await
}
