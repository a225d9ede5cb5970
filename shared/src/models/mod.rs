//! Data models
//!
//! DB row types use `#[cfg_attr(feature = "db", derive(sqlx::FromRow))]`.
//! All IDs are `i64` (SQLite INTEGER PRIMARY KEY).

pub mod menu_item;
pub mod order;
pub mod reservation;
pub mod user;

// Re-exports
pub use menu_item::*;
pub use order::*;
pub use reservation::*;
pub use user::*;
