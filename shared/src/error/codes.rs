//! Unified error codes for the fulfillment backend
//!
//! Error codes are organized by category:
//! - 0xxx: General errors
//! - 1xxx: Account errors
//! - 9xxx: System errors

use serde::{Deserialize, Serialize};
use std::fmt;

/// Unified error code enum
///
/// Represented as u16 values on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u16", try_from = "u16")]
#[repr(u16)]
pub enum ErrorCode {
    // ==================== 0xxx: General ====================
    /// Required field missing
    RequiredField = 7,

    // ==================== 1xxx: Account ====================
    /// Invalid credentials (email/password)
    InvalidCredentials = 1002,
    /// Email is already registered
    EmailAlreadyRegistered = 1010,

    // ==================== 9xxx: System ====================
    /// Internal server error
    InternalError = 9001,
}

impl ErrorCode {
    /// Numeric value of the code
    #[inline]
    pub const fn code(&self) -> u16 {
        *self as u16
    }

    /// Default human-readable message
    pub const fn message(&self) -> &'static str {
        match self {
            ErrorCode::RequiredField => "Required field is missing",
            ErrorCode::InvalidCredentials => "Invalid credentials",
            ErrorCode::EmailAlreadyRegistered => "Email already exists or failed to register",
            ErrorCode::InternalError => "Internal server error",
        }
    }
}

impl From<ErrorCode> for u16 {
    #[inline]
    fn from(code: ErrorCode) -> Self {
        code.code()
    }
}

/// Error when converting from an invalid u16 to ErrorCode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidErrorCode(pub u16);

impl fmt::Display for InvalidErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid error code: {}", self.0)
    }
}

impl std::error::Error for InvalidErrorCode {}

impl TryFrom<u16> for ErrorCode {
    type Error = InvalidErrorCode;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        match value {
            7 => Ok(ErrorCode::RequiredField),
            1002 => Ok(ErrorCode::InvalidCredentials),
            1010 => Ok(ErrorCode::EmailAlreadyRegistered),
            9001 => Ok(ErrorCode::InternalError),
            _ => Err(InvalidErrorCode(value)),
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}
