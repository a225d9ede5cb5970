//! Unified error system
//!
//! - [`ErrorCode`]: Standardized error codes
//! - [`ErrorCategory`]: Classification of errors by domain
//! - [`AppError`]: Rich error type with codes, messages, and details
//! - [`ErrorBody`]: `{"error": ...}` body returned by the REST endpoints
//!
//! # Error Code Ranges
//!
//! - 0xxx: General errors
//! - 1xxx: Account errors
//! - 9xxx: System errors
//!
//! # Example
//!
//! ```
//! use shared::error::{AppError, ErrorBody, ErrorCode};
//!
//! let err = AppError::new(ErrorCode::EmailAlreadyRegistered);
//! let body = ErrorBody::from(&err);
//! assert_eq!(body.error, "Email already exists or failed to register");
//! ```

mod category;
mod codes;
mod http;
mod types;

pub use category::ErrorCategory;
pub use codes::{ErrorCode, InvalidErrorCode};
pub use types::{AppError, ErrorBody};
