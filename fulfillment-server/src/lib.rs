//! fulfillment-server: webhook backend for a conversational ordering and
//! reservation assistant
//!
//! Receives intent payloads from the NLU platform, keeps each conversation's
//! in-progress order in memory, persists completed orders and reservations to
//! SQLite and replies with short fulfillment text.
//!
//! # Modules
//!
//! - [`api`]: axum router (webhook, accounts, health)
//! - [`intent`]: intent → workflow dispatch
//! - [`orders`]: add / remove / complete / cancel / track
//! - [`reservations`]: book / check / cancel
//! - [`session`]: session order store
//! - [`core`]: background order persistence
//! - [`db`]: SQL accessors, one connection per call

pub mod api;
pub mod config;
pub mod core;
pub mod db;
pub mod error;
pub mod intent;
pub mod orders;
pub mod reservations;
pub mod session;
pub mod state;
pub mod utils;

pub use config::Config;
pub use error::{ServiceError, WorkflowError};
pub use state::AppState;
