//! User Model

use serde::{Deserialize, Serialize};

/// Registered user (`users` row)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct User {
    pub id: i64,
    pub username: String,
    pub email: String,
    /// Argon2 PHC string
    #[serde(skip_serializing)]
    pub password: String,
}
