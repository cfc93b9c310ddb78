use crate::domain::ids::{OrderId, PaymentId};
use crate::domain::order::OrderStatus;
use thiserror::Error;

/// Coarse classification of a [`LifecycleError`].
///
/// Callers that translate engine errors into another protocol (HTTP status
/// codes, provider acknowledgements) match on this instead of every variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    NotFound,
    Validation,
    IllegalTransition,
    NotEditable,
    AlreadyConfirmed,
    Internal,
}

#[derive(Error, Debug)]
pub enum LifecycleError {
    #[error("Order {0} not found")]
    OrderNotFound(OrderId),
    #[error("Payment {0} not found")]
    PaymentNotFound(PaymentId),
    #[error("Validation error: {0}")]
    Validation(String),
    #[error("Invalid pages: {0}")]
    InvalidPages(String),
    #[error("Invalid status: {0}")]
    InvalidStatus(String),
    #[error("Invalid urgency: {0}")]
    InvalidUrgency(String),
    #[error("Unsupported provider: {0}")]
    UnsupportedProvider(String),
    #[error("Illegal transition from {from} to {to}")]
    IllegalTransition { from: OrderStatus, to: OrderStatus },
    #[error("Order {id} is {status} and can no longer be edited")]
    NotEditable { id: OrderId, status: OrderStatus },
    #[error("Order {id} is {status}, payments require pending_payment")]
    OrderNotPayable { id: OrderId, status: OrderStatus },
    #[error("Payment {0} is already confirmed")]
    AlreadyConfirmed(PaymentId),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Storage error: {0}")]
    Storage(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl LifecycleError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::OrderNotFound(_) | Self::PaymentNotFound(_) => ErrorKind::NotFound,
            Self::Validation(_)
            | Self::InvalidPages(_)
            | Self::InvalidStatus(_)
            | Self::InvalidUrgency(_)
            | Self::UnsupportedProvider(_) => ErrorKind::Validation,
            Self::IllegalTransition { .. } | Self::OrderNotPayable { .. } => {
                ErrorKind::IllegalTransition
            }
            Self::NotEditable { .. } => ErrorKind::NotEditable,
            Self::AlreadyConfirmed(_) => ErrorKind::AlreadyConfirmed,
            Self::Io(_) | Self::Csv(_) | Self::Json(_) | Self::Storage(_) => ErrorKind::Internal,
        }
    }
}

#[cfg(feature = "storage-rocksdb")]
impl From<rocksdb::Error> for LifecycleError {
    fn from(err: rocksdb::Error) -> Self {
        Self::Storage(Box::new(err))
    }
}

pub type Result<T> = std::result::Result<T, LifecycleError>;
