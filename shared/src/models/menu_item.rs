//! Menu Item Model

use serde::{Deserialize, Serialize};

/// Menu item entity (`food_items` row)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct MenuItem {
    pub item_id: i64,
    /// Lookup key, matched case-insensitively
    pub name: String,
    /// Price in currency unit
    pub price: f64,
}
