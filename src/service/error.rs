use axum::http::StatusCode;
use thiserror::Error;
use uuid::Uuid;

use crate::error::HttpError;
use crate::utils::currency::format_paise_as_rupees;

#[derive(Error, Debug)]
pub enum ServiceError {
    #[error("Job {0} not found")]
    JobNotFound(Uuid),

    #[error("User {0} not found")]
    UserNotFound(Uuid),

    #[error("Notification {0} not found")]
    NotificationNotFound(Uuid),

    #[error("Invalid status transition: {0}")]
    InvalidTransition(String),

    #[error("Job {0} already has all the workers it needs")]
    JobFull(Uuid),

    #[error("You have already applied to this job")]
    AlreadyApplied,

    #[error("Worker {0} has not applied to this job")]
    NotAnApplicant(Uuid),

    #[error("Worker {0} is already selected for this job")]
    AlreadySelected(Uuid),

    #[error("{0}")]
    Forbidden(String),

    #[error(
        "Insufficient funds: required {}, available {}",
        rupees(.required),
        rupees(.available)
    )]
    InsufficientFunds { required: i64, available: i64 },

    #[error("{0}")]
    Conflict(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

fn rupees(paise: &i64) -> String {
    format_paise_as_rupees(*paise)
}

impl ServiceError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ServiceError::JobNotFound(_)
            | ServiceError::UserNotFound(_)
            | ServiceError::NotificationNotFound(_) => StatusCode::NOT_FOUND,

            ServiceError::InvalidTransition(_)
            | ServiceError::NotAnApplicant(_)
            | ServiceError::Validation(_) => StatusCode::BAD_REQUEST,

            ServiceError::Forbidden(_) => StatusCode::FORBIDDEN,

            ServiceError::JobFull(_)
            | ServiceError::AlreadyApplied
            | ServiceError::AlreadySelected(_)
            | ServiceError::Conflict(_) => StatusCode::CONFLICT,

            ServiceError::InsufficientFunds { .. } => StatusCode::PAYMENT_REQUIRED,

            ServiceError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<ServiceError> for HttpError {
    fn from(error: ServiceError) -> Self {
        let status = error.status_code();
        match error {
            ServiceError::Database(e) => {
                tracing::error!("Database error: {}", e);
                HttpError::server_error("Server Error. Please try again later")
            }
            other => HttpError::new(other.to_string(), status),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(ServiceError::JobNotFound(Uuid::nil()).status_code(), StatusCode::NOT_FOUND);
        assert_eq!(
            ServiceError::InvalidTransition("open -> draft".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(ServiceError::JobFull(Uuid::nil()).status_code(), StatusCode::CONFLICT);
        assert_eq!(
            ServiceError::InsufficientFunds { required: 1, available: 0 }.status_code(),
            StatusCode::PAYMENT_REQUIRED
        );
    }

    #[test]
    fn test_database_message_is_not_leaked() {
        let http: HttpError = ServiceError::Database(sqlx::Error::RowNotFound).into();
        assert_eq!(http.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(!http.message.contains("no rows"));
    }

    #[test]
    fn test_insufficient_funds_message_in_rupees() {
        let error = ServiceError::InsufficientFunds { required: 150_050, available: 10_000 };
        assert_eq!(
            error.to_string(),
            "Insufficient funds: required ₹1500.50, available ₹100.00"
        );
    }
}
