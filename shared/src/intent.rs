//! Intent 模块 - webhook intent labels and their typed form
//!
//! The NLU platform classifies every utterance into an intent whose display
//! name carries the context it was matched in. Dispatch works on the typed
//! [`Intent`] so unknown labels are rejected once, at the edge.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Caller-classified user goal driving dispatch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Intent {
    // ===== 订单域 =====
    OrderAdd,
    OrderRemove,
    OrderComplete,
    OrderCancel,
    TrackOrder,

    // ===== 预订域 =====
    BookReservation,
    CheckReservation,
    CancelReservation,
}

impl Intent {
    pub const ALL: [Intent; 8] = [
        Intent::OrderAdd,
        Intent::OrderRemove,
        Intent::OrderComplete,
        Intent::OrderCancel,
        Intent::TrackOrder,
        Intent::BookReservation,
        Intent::CheckReservation,
        Intent::CancelReservation,
    ];

    /// Display name configured on the NLU agent
    pub const fn display_name(&self) -> &'static str {
        match self {
            Intent::OrderAdd => "order.add - context: ongoing-order",
            Intent::OrderRemove => "order.remove - context: ongoing-order",
            Intent::OrderComplete => "order.complete - context: ongoing-order",
            Intent::OrderCancel => "order.cancel - context: cancel-order",
            Intent::TrackOrder => "track.order - context: ongoing-tracking",
            Intent::BookReservation => "book_reservation",
            Intent::CheckReservation => "check_reservation",
            Intent::CancelReservation => "cancel_reservation",
        }
    }

    pub fn from_display_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|i| i.display_name() == name)
    }

    /// Whether the handler reads or writes the session order
    pub const fn uses_session(&self) -> bool {
        matches!(
            self,
            Intent::OrderAdd | Intent::OrderRemove | Intent::OrderComplete
        )
    }
}

impl fmt::Display for Intent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

/// Unknown intent display name
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownIntent(pub String);

impl fmt::Display for UnknownIntent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown intent: {}", self.0)
    }
}

impl std::error::Error for UnknownIntent {}

impl FromStr for Intent {
    type Err = UnknownIntent;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_display_name(s).ok_or_else(|| UnknownIntent(s.to_string()))
    }
}
