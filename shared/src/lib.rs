//! Shared types for the fulfillment backend
//!
//! Wire types of the webhook and REST surfaces, intents, row models and the
//! unified error vocabulary. Used by `fulfillment-server` and its tests.

pub mod error;
pub mod intent;
pub mod models;
pub mod request;
pub mod response;

// Re-exports
pub use intent::Intent;
pub use request::{Parameters, RequestError, WebhookRequest};
pub use response::{FulfillmentResponse, MessageResponse};
pub use serde::{Deserialize, Serialize};
