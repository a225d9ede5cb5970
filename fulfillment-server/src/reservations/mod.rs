//! Reservation workflow
//!
//! Book, check and cancel table reservations. Date and time parameters
//! arrive as ISO-8601 strings; only their wall-clock parts are kept.

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime};
use shared::models::{Reservation, ReservationCreate};

use crate::db::{self, Database};
use crate::error::WorkflowResult;

pub const MISSING_DETAILS: &str =
    "Missing reservation details. Please provide your name, the date and the time.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BookOutcome {
    Confirmed { reservation_id: i64 },
    MissingDetails,
}

impl BookOutcome {
    pub fn fulfillment_text(&self) -> String {
        match self {
            BookOutcome::Confirmed { reservation_id } => {
                format!("Reservation confirmed! Your reservation ID is {reservation_id}.")
            }
            BookOutcome::MissingDetails => MISSING_DETAILS.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckOutcome {
    Found(Reservation),
    NotFound,
}

impl CheckOutcome {
    pub fn fulfillment_text(&self) -> String {
        match self {
            CheckOutcome::Found(r) => format!(
                "Your reservation is on {} at {}, under the name {}.",
                r.reservation_date.format("%Y-%m-%d"),
                r.time.format("%H:%M:%S"),
                r.customer_name
            ),
            CheckOutcome::NotFound => "No reservation found for the provided id.".to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CancelOutcome {
    Cancelled,
    NotFound,
}

impl CancelOutcome {
    pub fn fulfillment_text(&self) -> String {
        match self {
            CancelOutcome::Cancelled => "Your reservation has been canceled successfully.",
            CancelOutcome::NotFound => "No reservation found with the provided ID.",
        }
        .to_string()
    }
}

#[derive(Debug, Clone)]
pub struct ReservationWorkflow {
    db: Database,
}

impl ReservationWorkflow {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Book from raw parameters; any missing or unparseable part is reported
    /// as missing details
    pub async fn book(
        &self,
        customer_name: Option<&str>,
        date: Option<&str>,
        time: Option<&str>,
    ) -> WorkflowResult<BookOutcome> {
        let name = customer_name.map(str::trim).filter(|n| !n.is_empty());
        let date = date.and_then(parse_date);
        let time = time.and_then(parse_time);
        let (Some(name), Some(date), Some(time)) = (name, date, time) else {
            return Ok(BookOutcome::MissingDetails);
        };

        let data = ReservationCreate {
            customer_name: name.to_string(),
            reservation_date: date,
            time,
        };
        let reservation_id = db::reservations::create(&self.db, &data).await?;
        tracing::info!(reservation_id, %date, %time, "Reservation booked");
        Ok(BookOutcome::Confirmed { reservation_id })
    }

    pub async fn check(&self, reservation_id: i64) -> WorkflowResult<CheckOutcome> {
        Ok(match db::reservations::find_by_id(&self.db, reservation_id).await? {
            Some(reservation) => CheckOutcome::Found(reservation),
            None => CheckOutcome::NotFound,
        })
    }

    pub async fn cancel(&self, reservation_id: i64) -> WorkflowResult<CancelOutcome> {
        if db::reservations::delete(&self.db, reservation_id).await? {
            tracing::info!(reservation_id, "Reservation cancelled");
            Ok(CancelOutcome::Cancelled)
        } else {
            Ok(CancelOutcome::NotFound)
        }
    }
}

/// Strip a literal trailing `Z`; the value is kept as wall-clock time
fn strip_zulu(raw: &str) -> &str {
    let raw = raw.trim();
    raw.strip_suffix('Z')
        .or_else(|| raw.strip_suffix('z'))
        .unwrap_or(raw)
}

fn parse_datetime(raw: &str) -> Option<NaiveDateTime> {
    let raw = strip_zulu(raw);
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.naive_local());
    }
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
        .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S%.f"))
        .ok()
}

/// Date part of an ISO-8601 date or date-time
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    if let Some(dt) = parse_datetime(raw) {
        return Some(dt.date());
    }
    NaiveDate::parse_from_str(strip_zulu(raw), "%Y-%m-%d").ok()
}

/// Time part of an ISO-8601 date-time, or a bare `HH:MM[:SS]`
pub fn parse_time(raw: &str) -> Option<NaiveTime> {
    if let Some(dt) = parse_datetime(raw) {
        return Some(dt.time());
    }
    let raw = strip_zulu(raw);
    NaiveTime::parse_from_str(raw, "%H:%M:%S%.f")
        .or_else(|_| NaiveTime::parse_from_str(raw, "%H:%M"))
        .ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::testing::test_db;

    #[test]
    fn parses_dialogflow_date_and_time() {
        assert_eq!(
            parse_date("2025-03-14T12:00:00+05:30"),
            NaiveDate::from_ymd_opt(2025, 3, 14)
        );
        assert_eq!(
            parse_time("2025-03-13T19:30:00+05:30"),
            NaiveTime::from_hms_opt(19, 30, 0)
        );
        assert_eq!(
            parse_time("2025-03-13T19:30:00Z"),
            NaiveTime::from_hms_opt(19, 30, 0)
        );
        assert_eq!(parse_date("2025-03-14"), NaiveDate::from_ymd_opt(2025, 3, 14));
        assert_eq!(parse_time("07:05"), NaiveTime::from_hms_opt(7, 5, 0));
    }

    #[test]
    fn rejects_garbage() {
        assert_eq!(parse_date("tomorrow"), None);
        assert_eq!(parse_time("half past seven"), None);
        assert_eq!(parse_date(""), None);
    }

    #[tokio::test]
    async fn book_check_cancel() {
        let (_dir, db) = test_db().await;
        let wf = ReservationWorkflow::new(db);

        let booked = wf
            .book(
                Some("Ayesha"),
                Some("2025-03-14T12:00:00+05:30"),
                Some("2025-03-13T19:30:00+05:30"),
            )
            .await
            .unwrap();
        let BookOutcome::Confirmed { reservation_id } = booked else {
            panic!("expected confirmation, got {booked:?}");
        };
        assert_eq!(
            booked.fulfillment_text(),
            format!("Reservation confirmed! Your reservation ID is {reservation_id}.")
        );

        let checked = wf.check(reservation_id).await.unwrap();
        assert_eq!(
            checked.fulfillment_text(),
            "Your reservation is on 2025-03-14 at 19:30:00, under the name Ayesha."
        );

        assert_eq!(wf.cancel(reservation_id).await.unwrap(), CancelOutcome::Cancelled);
        assert_eq!(wf.cancel(reservation_id).await.unwrap(), CancelOutcome::NotFound);
        assert_eq!(wf.check(reservation_id).await.unwrap(), CheckOutcome::NotFound);
    }

    #[tokio::test]
    async fn missing_parts_are_reported() {
        let (_dir, db) = test_db().await;
        let wf = ReservationWorkflow::new(db);
        assert_eq!(
            wf.book(Some("  "), Some("2025-03-14"), Some("19:00")).await.unwrap(),
            BookOutcome::MissingDetails
        );
        assert_eq!(
            wf.book(Some("Ravi"), None, Some("19:00")).await.unwrap(),
            BookOutcome::MissingDetails
        );
        assert_eq!(
            wf.book(Some("Ravi"), Some("2025-03-14"), Some("soon")).await.unwrap(),
            BookOutcome::MissingDetails
        );
    }
}
