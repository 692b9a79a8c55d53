use thiserror::Error;

/// Expected outcomes of calling the core with invalid intent, plus one
/// unclassified bucket for everything that is not the caller's fault.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DomainError {
    /// Malformed input: bad format or a missing required part.
    #[error("{0}")]
    Validation(String),
    /// A uniqueness or referential rule would be broken.
    #[error("{0}")]
    Conflict(String),
    #[error("{0}")]
    NotFound(String),
    /// Not permitted in the record's current lifecycle state.
    #[error("{0}")]
    InvalidState(String),
    #[error("Internal error: {0}")]
    Internal(String),
}

impl DomainError {
    pub fn validation(msg: impl Into<String>) -> Self {
        DomainError::Validation(msg.into())
    }

    pub fn conflict(msg: impl Into<String>) -> Self {
        DomainError::Conflict(msg.into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        DomainError::NotFound(msg.into())
    }

    pub fn invalid_state(msg: impl Into<String>) -> Self {
        DomainError::InvalidState(msg.into())
    }
}

pub const CUSTOMER_NOT_FOUND: &str = "customer not found";
pub const ORDER_NOT_FOUND: &str = "order not found";
pub const PRODUCT_NOT_FOUND: &str = "product not found";

pub const EMAIL_TAKEN: &str = "email already registered";
pub const NATIONAL_ID_TAKEN: &str = "national ID already registered";
pub const PHONE_TAKEN: &str = "phone already registered";

pub const CUSTOMER_HAS_OPEN_ORDER: &str = "cannot delete a customer with an OPEN order";
pub const CUSTOMER_HAS_ORDERS: &str = "cannot delete a customer with linked orders";
pub const PAID_ORDER_NOT_DELETABLE: &str = "cannot delete a PAID order";
