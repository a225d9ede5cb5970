//! Reservation Model

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

/// Table reservation (`reservations` row)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Reservation {
    pub reservation_id: i64,
    pub customer_name: String,
    pub reservation_date: NaiveDate,
    pub time: NaiveTime,
}

/// Create reservation payload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReservationCreate {
    pub customer_name: String,
    pub reservation_date: NaiveDate,
    pub time: NaiveTime,
}
