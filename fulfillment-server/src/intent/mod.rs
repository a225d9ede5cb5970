//! Intent router
//!
//! Maps a typed [`Intent`] plus its parameters onto a workflow call and
//! renders the outcome as fulfillment text. Every failure ends up as text
//! here; nothing propagates to the HTTP layer.

use shared::{Intent, Parameters};

use crate::error::WorkflowError;
use crate::orders::CLARIFY_ITEMS;
use crate::state::AppState;

pub const SESSION_NOT_FOUND: &str = "Session not found. Please start a new order.";
pub const UNKNOWN_INTENT: &str = "I didn't understand that request.";

const FOOD_ITEM: &str = "food-item";
const NUMBER: &str = "number";

/// Run one intent and produce the reply
///
/// `session_id` is required by the session-order intents; callers resolve
/// it before dispatching.
pub async fn dispatch(
    state: &AppState,
    intent: Intent,
    params: &Parameters,
    session_id: &str,
) -> String {
    tracing::debug!(%intent, session_id, "Dispatching intent");
    match intent {
        Intent::OrderAdd => order_add(state, params, session_id).await,
        Intent::OrderRemove => {
            let names = params.strings(FOOD_ITEM);
            state.orders.remove(session_id, &names).await.fulfillment_text()
        }
        Intent::OrderComplete => match state.orders.complete(session_id).await {
            Ok(outcome) => outcome.fulfillment_text(),
            Err(e) => failure(intent, e, "An error occurred while completing your order."),
        },
        Intent::OrderCancel => order_cancel(state, params).await,
        Intent::TrackOrder => track_order(state, params).await,
        Intent::BookReservation => {
            let name = params.first_text(&["given-name", "person", "name"]);
            let date = params.text("date");
            let time = params.text("time");
            match state
                .reservations
                .book(name.as_deref(), date.as_deref(), time.as_deref())
                .await
            {
                Ok(outcome) => outcome.fulfillment_text(),
                Err(WorkflowError::Persistence(e)) => {
                    tracing::error!(%intent, error = %e, "Reservation insert failed");
                    "Failed to book reservation. Please try again.".to_string()
                }
                Err(e) => failure(intent, e, "An error occurred while booking the reservation."),
            }
        }
        Intent::CheckReservation => match params.id(&["id"]) {
            Ok(None) => "Please provide your id to check reservation.".to_string(),
            Err(_) => "No reservation found for the provided id.".to_string(),
            Ok(Some(id)) => match state.reservations.check(id).await {
                Ok(outcome) => outcome.fulfillment_text(),
                Err(e) => failure(
                    intent,
                    e,
                    "An error occurred while checking your reservation.",
                ),
            },
        },
        Intent::CancelReservation => match params.id(&["id"]) {
            Ok(None) => "Please provide your reservation ID to cancel it.".to_string(),
            Err(_) => "No reservation found with the provided ID.".to_string(),
            Ok(Some(id)) => match state.reservations.cancel(id).await {
                Ok(outcome) => outcome.fulfillment_text(),
                Err(e) => failure(
                    intent,
                    e,
                    "An error occurred while canceling your reservation.",
                ),
            },
        },
    }
}

async fn order_add(state: &AppState, params: &Parameters, session_id: &str) -> String {
    let (names, quantities) = match params.item_quantities(FOOD_ITEM, NUMBER) {
        Ok(lists) => lists,
        Err(e) => {
            tracing::debug!(session_id, error = %e, "Rejected add parameters");
            return CLARIFY_ITEMS.to_string();
        }
    };

    match state.orders.add(session_id, &names, &quantities).await {
        Ok(outcome) => outcome.fulfillment_text(),
        Err(e) => failure(Intent::OrderAdd, e, CLARIFY_ITEMS),
    }
}

async fn order_cancel(state: &AppState, params: &Parameters) -> String {
    let order_id = match params.id(&[NUMBER]) {
        Ok(Some(id)) => id,
        Ok(None) => return "Please provide your order ID to cancel the order.".to_string(),
        Err(_) => return "Invalid order ID. Please provide a valid number.".to_string(),
    };

    match state.orders.cancel(order_id).await {
        Ok(outcome) => outcome.fulfillment_text(),
        Err(e) => failure(
            Intent::OrderCancel,
            e,
            "An error occurred while trying to cancel your order.",
        ),
    }
}

async fn track_order(state: &AppState, params: &Parameters) -> String {
    let order_id = match params.id(&["order_id", NUMBER, "item_id"]) {
        Ok(Some(id)) => id,
        Ok(None) => return "Please provide your order ID to track your order.".to_string(),
        Err(_) => {
            return "Invalid order ID provided. Please provide a valid number.".to_string();
        }
    };

    match state.orders.track(order_id).await {
        Ok(outcome) => outcome.fulfillment_text(),
        Err(e) => failure(
            Intent::TrackOrder,
            e,
            "An error occurred while tracking your order.",
        ),
    }
}

/// Validation errors carry their own text; persistence errors get `generic`
fn failure(intent: Intent, err: WorkflowError, generic: &str) -> String {
    match err {
        WorkflowError::Validation(msg) => msg,
        WorkflowError::Persistence(e) => {
            tracing::error!(%intent, error = %e, "Workflow persistence error");
            generic.to_string()
        }
    }
}
