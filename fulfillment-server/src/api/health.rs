//! Health check endpoint

use axum::Json;
use axum::extract::State;

use crate::state::AppState;

pub async fn health_check(State(state): State<AppState>) -> Json<serde_json::Value> {
    let database = match state.db.ping().await {
        Ok(()) => "ok",
        Err(e) => {
            tracing::warn!(error = %e, "Health check database ping failed");
            "unavailable"
        }
    };

    Json(serde_json::json!({
        "status": "ok",
        "service": "fulfillment-server",
        "version": env!("CARGO_PKG_VERSION"),
        "database": database,
        "pending_orders": state.finalizer.pending(),
    }))
}

pub async fn welcome() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "message": "Welcome to the chatbot API!" }))
}
