//! Dialogflow webhook
//!
//! POST / always answers 200 with `{"fulfillmentText": ...}`, including
//! for malformed bodies and handler panics.

use std::panic::AssertUnwindSafe;

use axum::Json;
use axum::body::Bytes;
use axum::extract::State;
use futures::FutureExt;
use serde_json::Value;
use shared::{FulfillmentResponse, Intent, RequestError, WebhookRequest};

use crate::core::panic_message;
use crate::intent::{self, SESSION_NOT_FOUND, UNKNOWN_INTENT};
use crate::state::AppState;

pub const UNEXPECTED_ERROR: &str = "An unexpected error occurred. Please try again later.";

pub async fn handle_webhook(State(state): State<AppState>, body: Bytes) -> Json<FulfillmentResponse> {
    Json(FulfillmentResponse::new(fulfill(&state, &body).await))
}

async fn fulfill(state: &AppState, body: &[u8]) -> String {
    let payload: Value = match serde_json::from_slice(body) {
        Ok(v) => v,
        Err(e) => {
            tracing::warn!(error = %e, "Webhook body is not JSON");
            return UNEXPECTED_ERROR.to_string();
        }
    };
    tracing::debug!(%payload, "Received webhook request");

    let request = match WebhookRequest::from_value(payload) {
        Ok(r) => r,
        Err(e @ RequestError::MissingField(_)) => {
            tracing::warn!(error = %e, "Rejected webhook request");
            return e.to_string();
        }
        Err(e @ RequestError::Malformed(_)) => {
            tracing::warn!(error = %e, "Rejected webhook request");
            return UNEXPECTED_ERROR.to_string();
        }
    };

    if request.query_result.output_contexts.is_empty() {
        return SESSION_NOT_FOUND.to_string();
    }

    let Some(intent) = Intent::from_display_name(request.intent_name()) else {
        tracing::info!(
            intent = request.intent_name(),
            parameters = ?request.query_result.parameters,
            "Intent not handled"
        );
        return UNKNOWN_INTENT.to_string();
    };

    let session_id = match request.session_id() {
        Some(id) => id,
        None if intent.uses_session() => return SESSION_NOT_FOUND.to_string(),
        None => String::new(),
    };

    let params = &request.query_result.parameters;
    match AssertUnwindSafe(intent::dispatch(state, intent, params, &session_id))
        .catch_unwind()
        .await
    {
        Ok(text) => text,
        Err(panic_info) => {
            let panic_msg = panic_message(panic_info.as_ref());
            tracing::error!(%intent, panic = %panic_msg, "Intent handler panicked");
            UNEXPECTED_ERROR.to_string()
        }
    }
}
