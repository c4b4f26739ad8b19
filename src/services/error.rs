use compute::ComputeError;
use sea_orm::DbErr;
use thiserror::Error;
use tracing::warn;

/// Errors surfaced by the service layer
#[derive(Error, Debug)]
pub enum ServiceError {
    /// The addressed record does not exist
    #[error("{0}")]
    NotFound(String),

    /// The input is malformed or violates a business rule
    #[error("{0}")]
    Validation(String),

    /// The operation clashes with the current state of the data
    #[error("{0}")]
    Conflict(String),

    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

/// Type alias for Result with ServiceError
pub type ServiceResult<T> = Result<T, ServiceError>;

impl ServiceError {
    pub fn not_found(entity: &str, id: i32) -> Self {
        ServiceError::NotFound(format!("{} {} not found", entity, id))
    }

    /// Machine readable code carried by error responses.
    pub fn code(&self) -> &'static str {
        match self {
            ServiceError::NotFound(_) => "NOT_FOUND",
            ServiceError::Validation(_) => "VALIDATION_ERROR",
            ServiceError::Conflict(_) => "CONFLICT",
            ServiceError::Database(_) => "DATABASE_ERROR",
        }
    }
}

impl From<ComputeError> for ServiceError {
    fn from(error: ComputeError) -> Self {
        warn!(%error, "Computation rejected the request");
        match error {
            ComputeError::Loan(message) | ComputeError::Transfer(message) => {
                ServiceError::Conflict(message)
            }
            other => ServiceError::Validation(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        assert_eq!(ServiceError::not_found("Loan", 3).code(), "NOT_FOUND");
        assert_eq!(ServiceError::not_found("Loan", 3).to_string(), "Loan 3 not found");
        assert_eq!(ServiceError::Validation("bad".into()).code(), "VALIDATION_ERROR");
        assert_eq!(ServiceError::Conflict("busy".into()).code(), "CONFLICT");
        assert_eq!(
            ServiceError::from(DbErr::Custom("boom".into())).code(),
            "DATABASE_ERROR"
        );
    }

    #[test]
    fn test_compute_errors_map_to_service_errors() {
        let overdue = ServiceError::from(ComputeError::Loan("overdue".into()));
        assert!(matches!(overdue, ServiceError::Conflict(_)));

        let rule = ServiceError::from(ComputeError::Recurrence("interval".into()));
        assert!(matches!(rule, ServiceError::Validation(_)));
        assert_eq!(rule.to_string(), "Recurrence error: interval");
    }
}
