use thiserror::Error;

/// Error types for the compute module
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ComputeError {
    /// Invalid or unsatisfiable recurrence rule
    #[error("Recurrence error: {0}")]
    Recurrence(String),

    /// Invalid loan parameters or schedule computation failure
    #[error("Amortization error: {0}")]
    Amortization(String),

    /// Operation not allowed in the loan's current state
    #[error("Loan error: {0}")]
    Loan(String),

    /// Invalid debt transfer
    #[error("Transfer error: {0}")]
    Transfer(String),

    /// Date arithmetic left the representable range
    #[error("Date error: {0}")]
    Date(String),

    /// Decimal arithmetic overflowed
    #[error("Decimal error: {0}")]
    Decimal(String),
}

/// Type alias for Result with ComputeError
pub type Result<T> = std::result::Result<T, ComputeError>;
