//! HTTP surface
//!
//! - `POST /`         Dialogflow webhook
//! - `GET  /`         welcome message
//! - `GET  /health`   liveness plus database probe
//! - `POST /register` account creation
//! - `POST /login`    credential check

pub mod health;
pub mod users;
pub mod webhook;

use axum::Router;
use axum::routing::{get, post};
use tower_http::trace::TraceLayer;

use crate::state::AppState;

pub fn create_router(state: AppState) -> Router {
    let accounts = Router::new()
        .route("/register", post(users::register))
        .route("/login", post(users::login));

    Router::new()
        .route("/", post(webhook::handle_webhook).get(health::welcome))
        .route("/health", get(health::health_check))
        .merge(accounts)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
