//! Order workflow
//!
//! Add and remove operate on the session store only. Complete turns a
//! session order into a persisted order: it takes the session, allocates an
//! id, prices every line once and hands exactly those lines to the
//! [`FinalizeQueue`]. Cancel and track go straight to the database.

mod quote;

use std::sync::Arc;
use std::sync::atomic::{AtomicI64, Ordering};

use rust_decimal::Decimal;
use shared::models::OrderLine;
use thiserror::Error;

use crate::core::FinalizeQueue;
use crate::db::orders::{self as order_rows, SaveOutcome};
use crate::db::{self, Database};
use crate::error::{WorkflowError, WorkflowResult};
use crate::session::{InProgressOrder, Removal, SessionStore};
use crate::utils::money;

pub use quote::{Quote, QuotedLine};

pub const CLARIFY_ITEMS: &str = "Please specify food items and quantities clearly.";

/// Persistence failure of a finalize job
#[derive(Debug, Error)]
pub enum FinalizeError {
    #[error("item {0} no longer exists; order rolled back")]
    MissingItem(i64),
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddOutcome {
    pub order: InProgressOrder,
}

impl AddOutcome {
    pub fn fulfillment_text(&self) -> String {
        format!(
            "So far, you have: {}. Do you need anything else?",
            self.order.summary()
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RemoveOutcome {
    NoOrder,
    Removed(Removal),
}

impl RemoveOutcome {
    pub fn fulfillment_text(&self) -> String {
        let removal = match self {
            RemoveOutcome::NoOrder => {
                return "I'm having trouble finding your order. Please place a new order."
                    .to_string();
            }
            RemoveOutcome::Removed(removal) => removal,
        };

        let mut text = String::new();
        if !removal.removed.is_empty() {
            text.push_str(&format!(
                "Removed {} from your order!",
                removal.removed.join(", ")
            ));
        }
        if !removal.missing.is_empty() {
            text.push_str(&format!(
                " Your current order does not contain {}.",
                removal.missing.join(", ")
            ));
        }
        match &removal.remaining {
            None => text.push_str(" Your order is now empty!"),
            Some(order) => text.push_str(&format!(
                " Here is what remains in your order: {}.",
                order.summary()
            )),
        }
        text
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CompleteOutcome {
    NoSession,
    /// None of the items could be priced; nothing was queued
    Unpriced,
    Accepted { order_id: i64, total: Decimal },
}

impl CompleteOutcome {
    pub fn fulfillment_text(&self) -> String {
        match self {
            CompleteOutcome::NoSession => {
                "I'm having trouble finding your order. Please start a new one.".to_string()
            }
            CompleteOutcome::Unpriced => {
                "Error calculating order total. Please check your items and try again.".to_string()
            }
            CompleteOutcome::Accepted { order_id, total } => format!(
                "Got it! Your order is being processed. Order ID: #{}. Total: ${}",
                order_id,
                money::format(*total)
            ),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CancelOutcome {
    Cancelled { order_id: i64 },
    Refused { order_id: i64 },
}

impl CancelOutcome {
    pub fn fulfillment_text(&self) -> String {
        match self {
            CancelOutcome::Cancelled { order_id } => {
                format!("✅ Order #{order_id} has been successfully canceled.")
            }
            CancelOutcome::Refused { order_id } => format!(
                "Unable to cancel order #{order_id}. Order may not exist or has already been delivered/cancelled."
            ),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TrackOutcome {
    Status { order_id: i64, status: String },
    NotFound { order_id: i64 },
}

impl TrackOutcome {
    pub fn fulfillment_text(&self) -> String {
        match self {
            TrackOutcome::Status { order_id, status } => {
                format!("The order status for order ID #{order_id} is: {status}.")
            }
            TrackOutcome::NotFound { order_id } => format!(
                "No order found with order ID #{order_id}. Please check your order ID and try again."
            ),
        }
    }
}

/// Session-scoped ordering operations
#[derive(Clone)]
pub struct OrderWorkflow {
    db: Database,
    sessions: Arc<dyn SessionStore>,
    finalizer: FinalizeQueue,
    /// Highest order id handed out by this process
    last_issued: Arc<AtomicI64>,
}

impl OrderWorkflow {
    pub fn new(db: Database, sessions: Arc<dyn SessionStore>, finalizer: FinalizeQueue) -> Self {
        Self {
            db,
            sessions,
            finalizer,
            last_issued: Arc::new(AtomicI64::new(0)),
        }
    }

    pub fn sessions(&self) -> &Arc<dyn SessionStore> {
        &self.sessions
    }

    pub fn finalizer(&self) -> &FinalizeQueue {
        &self.finalizer
    }

    /// Merge parallel name/quantity lists into the session order
    pub async fn add(
        &self,
        session_id: &str,
        names: &[String],
        quantities: &[u32],
    ) -> WorkflowResult<AddOutcome> {
        if names.len() != quantities.len() || quantities.contains(&0) {
            return Err(WorkflowError::validation(CLARIFY_ITEMS));
        }

        let items: InProgressOrder = names.iter().zip(quantities.iter().copied()).collect();
        let order = self.sessions.merge(session_id, items).await;
        tracing::debug!(session_id, items = order.len(), "Session order updated");
        Ok(AddOutcome { order })
    }

    pub async fn remove(&self, session_id: &str, names: &[String]) -> RemoveOutcome {
        match self.sessions.remove_items(session_id, names).await {
            Some(removal) => {
                if removal.remaining.is_none() {
                    tracing::debug!(session_id, "Session order emptied");
                }
                RemoveOutcome::Removed(removal)
            }
            None => RemoveOutcome::NoOrder,
        }
    }

    /// Price the session order, answer with its id and persist in the background
    pub async fn complete(&self, session_id: &str) -> WorkflowResult<CompleteOutcome> {
        let Some(order) = self.sessions.take(session_id).await else {
            return Ok(CompleteOutcome::NoSession);
        };

        let order_id = self.allocate_order_id().await?;

        let quote = Quote::price(&self.db, &order).await?;
        for name in &quote.unpriced {
            tracing::warn!(session_id, order_id, item = %name, "Skipping unknown menu item");
        }
        if quote.lines.is_empty() {
            // The id is left unused; nothing references it
            return Ok(CompleteOutcome::Unpriced);
        }

        let total = quote.total();
        let lines = quote.order_lines(order_id);
        tracing::info!(
            order_id,
            session_id,
            total = %money::format(total),
            lines = lines.len(),
            "Order accepted"
        );

        let db = self.db.clone();
        self.finalizer.submit(order_id, async move {
            finalize(&db, order_id, &lines).await
        });

        Ok(CompleteOutcome::Accepted { order_id, total })
    }

    pub async fn cancel(&self, order_id: i64) -> WorkflowResult<CancelOutcome> {
        let outcome = match order_rows::cancel_order(&self.db, order_id).await? {
            order_rows::CancelOutcome::Cancelled { rows } => {
                tracing::info!(order_id, rows, "Order cancelled");
                CancelOutcome::Cancelled { order_id }
            }
            order_rows::CancelOutcome::Closed(status) => {
                tracing::info!(order_id, status = %status, "Cancel refused for closed order");
                CancelOutcome::Refused { order_id }
            }
            order_rows::CancelOutcome::NotFound => CancelOutcome::Refused { order_id },
        };
        Ok(outcome)
    }

    pub async fn track(&self, order_id: i64) -> WorkflowResult<TrackOutcome> {
        if tracing::enabled!(tracing::Level::DEBUG) {
            match order_rows::snapshot(&self.db, order_id).await {
                Ok(snapshot) => tracing::debug!(order_id, ?snapshot, "Order rows"),
                Err(e) => tracing::debug!(order_id, error = %e, "Order snapshot unavailable"),
            }
        }

        let outcome = match db::tracking::order_status(&self.db, order_id).await? {
            Some(status) => TrackOutcome::Status { order_id, status },
            None => TrackOutcome::NotFound { order_id },
        };
        Ok(outcome)
    }

    /// max(storage max + 1, last issued + 1)
    async fn allocate_order_id(&self) -> Result<i64, sqlx::Error> {
        let next = order_rows::next_order_id(&self.db).await?;
        let claim = |prev: i64| next.max(prev + 1);
        let previous = match self
            .last_issued
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |prev| Some(claim(prev)))
        {
            Ok(prev) | Err(prev) => prev,
        };
        Ok(claim(previous))
    }
}

async fn finalize(db: &Database, order_id: i64, lines: &[OrderLine]) -> Result<(), FinalizeError> {
    match order_rows::save_order(db, order_id, lines).await? {
        SaveOutcome::Saved => Ok(()),
        SaveOutcome::MissingItem(item_id) => Err(FinalizeError::MissingItem(item_id)),
    }
}
