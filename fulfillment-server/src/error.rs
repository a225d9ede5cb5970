//! Error types of the fulfillment server
//!
//! `ServiceError` bridges `sqlx::Error` into the REST error vocabulary
//! (`AppError`) so account handlers can use `?` directly. `WorkflowError`
//! is what the conversational workflows return; the intent router turns it
//! into fulfillment text and never into an HTTP error.

use axum::response::IntoResponse;
use shared::error::{AppError, ErrorCode};
use thiserror::Error;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Service-layer error for the REST endpoints
///
/// - `Db`: Database/infrastructure errors (auto-logged, mapped to InternalError)
/// - `App`: Business-rule errors (transparent pass-through to client)
#[derive(Debug)]
pub enum ServiceError {
    Db(BoxError),
    App(AppError),
}

impl From<sqlx::Error> for ServiceError {
    fn from(e: sqlx::Error) -> Self {
        ServiceError::Db(e.into())
    }
}

impl From<argon2::password_hash::Error> for ServiceError {
    fn from(e: argon2::password_hash::Error) -> Self {
        ServiceError::Db(e.to_string().into())
    }
}

impl From<AppError> for ServiceError {
    fn from(e: AppError) -> Self {
        ServiceError::App(e)
    }
}

impl From<ServiceError> for AppError {
    fn from(e: ServiceError) -> Self {
        match e {
            ServiceError::App(app_err) => app_err,
            ServiceError::Db(db_err) => {
                tracing::error!(error = %db_err, "Service database error");
                AppError::new(ErrorCode::InternalError)
            }
        }
    }
}

impl IntoResponse for ServiceError {
    fn into_response(self) -> axum::response::Response {
        let app_error: AppError = self.into();
        app_error.into_response()
    }
}

pub type ServiceResult<T> = Result<T, ServiceError>;

/// Failure of a conversational workflow step
#[derive(Debug, Error)]
pub enum WorkflowError {
    /// Input the caller can fix; the message is shown as-is
    #[error("{0}")]
    Validation(String),
    /// Store failure; already rolled back, the connection is closed
    #[error("database error: {0}")]
    Persistence(#[from] sqlx::Error),
}

impl WorkflowError {
    pub fn validation(msg: impl Into<String>) -> Self {
        WorkflowError::Validation(msg.into())
    }
}

pub type WorkflowResult<T> = Result<T, WorkflowError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn db_errors_become_internal() {
        let err: AppError = ServiceError::from(sqlx::Error::RowNotFound).into();
        assert_eq!(err.code, ErrorCode::InternalError);
    }

    #[test]
    fn app_errors_pass_through() {
        let err: AppError = ServiceError::from(AppError::invalid_credentials()).into();
        assert_eq!(err.code, ErrorCode::InvalidCredentials);
    }

    #[test]
    fn validation_displays_message() {
        let err = WorkflowError::validation("Please specify food items and quantities clearly.");
        assert_eq!(
            err.to_string(),
            "Please specify food items and quantities clearly."
        );
    }
}
