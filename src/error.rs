use rust_decimal::Decimal;
use std::fmt;
use thiserror::Error;

/// External collaborator a failed call was addressed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExternalService {
    Ledger,
    PaymentProcessor,
}

impl fmt::Display for ExternalService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExternalService::Ledger => f.write_str("ledger"),
            ExternalService::PaymentProcessor => f.write_str("payment processor"),
        }
    }
}

#[derive(Error, Debug)]
pub enum PaymentError {
    #[error("Validation error: {0}")]
    ValidationError(String),
    #[error("Insufficient funds: available {available}, requested {requested}")]
    InsufficientFunds {
        available: Decimal,
        requested: Decimal,
    },
    #[error("External service error ({service}): {message}")]
    ExternalServiceError {
        service: ExternalService,
        message: String,
    },
    /// The transaction row could not be written after the external operation
    /// already took effect.
    #[error("Persistence error: {0}")]
    PersistenceError(String),
    #[error("{service} call timed out after {elapsed_ms} ms")]
    Timeout {
        service: ExternalService,
        elapsed_ms: u64,
    },
    #[error("Configuration error: {0}")]
    ConfigError(String),
}

impl PaymentError {
    pub fn ledger(message: impl Into<String>) -> Self {
        Self::ExternalServiceError {
            service: ExternalService::Ledger,
            message: message.into(),
        }
    }

    pub fn processor(message: impl Into<String>) -> Self {
        Self::ExternalServiceError {
            service: ExternalService::PaymentProcessor,
            message: message.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, PaymentError>;
