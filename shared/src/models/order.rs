//! Order Model

use serde::{Deserialize, Serialize};

/// Tracking status assumed for an order that has no tracking row
pub const STATUS_IN_PROGRESS: &str = "in progress";
pub const STATUS_DELIVERED: &str = "delivered";
pub const STATUS_CANCELLED: &str = "cancelled";

/// Persisted order line (`orders` row)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct OrderLine {
    pub order_id: i64,
    pub item_id: i64,
    pub quantity: i64,
    /// Price in currency unit (unit price × quantity)
    pub total_price: f64,
}

/// Order tracking row (`order_tracking`)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct OrderTracking {
    pub order_id: i64,
    pub status: String,
}

/// Whether a status forbids cancellation (case-insensitive)
pub fn is_closed_status(status: &str) -> bool {
    let status = status.trim();
    status.eq_ignore_ascii_case(STATUS_CANCELLED) || status.eq_ignore_ascii_case(STATUS_DELIVERED)
}
