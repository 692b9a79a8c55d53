//! Preconditions checked before anything is deleted.

use super::errors::{
    DomainError, CUSTOMER_HAS_OPEN_ORDER, CUSTOMER_HAS_ORDERS, PAID_ORDER_NOT_DELETABLE,
};
use super::order::OrderStatus;

/// What the store knows about the orders pointing at one customer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OrderReferences {
    pub has_open_order: bool,
    pub has_any_order: bool,
}

/// A customer goes only when no order references it. An OPEN order is
/// reported with its own message before the general "any order" rule.
pub fn ensure_customer_deletable(refs: OrderReferences) -> Result<(), DomainError> {
    if refs.has_open_order {
        return Err(DomainError::conflict(CUSTOMER_HAS_OPEN_ORDER));
    }
    if refs.has_any_order {
        return Err(DomainError::conflict(CUSTOMER_HAS_ORDERS));
    }
    Ok(())
}

pub fn ensure_order_deletable(status: OrderStatus) -> Result<(), DomainError> {
    match status {
        OrderStatus::Paid => Err(DomainError::invalid_state(PAID_ORDER_NOT_DELETABLE)),
        OrderStatus::Open | OrderStatus::Cancelled => Ok(()),
    }
}
