use thiserror::Error;
use uuid::Uuid;

/// Failure modes of the core services. All are synchronous caller-input
/// errors surfaced directly; none are retried.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("Amount must be positive")]
    InvalidAmount,
    #[error("Insufficient funds in account {0}")]
    InsufficientFunds(String),
    #[error("Account {number} is not active: {status}")]
    AccountNotActive { number: String, status: String },
    #[error("Loan {0} is not active")]
    LoanNotActive(String),
    #[error("Invalid loan term: {0} months")]
    InvalidTerm(u32),
    #[error("A loan already exists for this application: {0}")]
    DuplicateLoan(String),
    #[error("Application {0} has not been disbursed")]
    ApplicationNotDisbursed(String),
    #[error("Member not found: {0}")]
    MemberNotFound(Uuid),
    #[error("Account not found: {0}")]
    AccountNotFound(Uuid),
    #[error("Loan not found: {0}")]
    LoanNotFound(Uuid),
    #[error("Application not found: {0}")]
    ApplicationNotFound(Uuid),
    #[error("Validation failed: {0}")]
    Validation(String),
    #[error("Persistence error: {0}")]
    Storage(String),
    #[error("Serialization error: {0}")]
    Serde(String),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
