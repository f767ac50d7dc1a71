//! Webhook handlers.

use std::sync::Arc;

use axum::{Json, extract::State, response::IntoResponse};
use serde_json::{Value, json};
use tokio::sync::broadcast;

use mpesa_types::{WebhookEvent, WebhookKind};

/// Decides whether a C2B validation request should be accepted.
pub type C2bValidator = Arc<dyn Fn(&Value) -> bool + Send + Sync>;

/// State shared across webhook handlers.
pub struct WebhookState {
    pub events: broadcast::Sender<WebhookEvent>,
    pub log_payloads: bool,
    pub c2b_validator: Option<C2bValidator>,
}

impl WebhookState {
    fn publish(&self, kind: WebhookKind, payload: Value) -> WebhookEvent {
        if self.log_payloads {
            tracing::info!(event = %kind, payload = %payload, "M-Pesa webhook received");
        }
        let event = WebhookEvent::new(kind, payload);
        if self.events.send(event.clone()).is_err() {
            tracing::debug!(event = %kind, "No subscribers for webhook event");
        }
        event
    }
}

fn accepted() -> Json<Value> {
    Json(json!({ "ResultCode": 0, "ResultDesc": "Success" }))
}

/// Health check endpoint.
pub async fn health() -> impl IntoResponse {
    Json(json!({ "status": "healthy" }))
}

/// Any notification that only needs to be republished and acknowledged.
#[tracing::instrument(skip(state, payload))]
pub async fn receive(
    State(state): State<Arc<WebhookState>>,
    kind: WebhookKind,
    Json(payload): Json<Value>,
) -> impl IntoResponse {
    state.publish(kind, payload);
    accepted()
}

/// C2B validation. The registered validator may reject the payment.
#[tracing::instrument(skip(state, payload))]
pub async fn c2b_validation(
    State(state): State<Arc<WebhookState>>,
    Json(payload): Json<Value>,
) -> impl IntoResponse {
    let event = state.publish(WebhookKind::C2bValidation, payload);

    let accept = state
        .c2b_validator
        .as_ref()
        .is_none_or(|validator| validator(&event.payload));

    if accept {
        accepted()
    } else {
        tracing::warn!("C2B validation rejected");
        Json(json!({ "ResultCode": "C2B00011", "ResultDesc": "Invalid Account" }))
    }
}
