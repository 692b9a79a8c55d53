use std::fmt;
use std::str::FromStr;

use bigdecimal::{BigDecimal, Signed, Zero};
use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::customer::Customer;
use super::errors::DomainError;
use super::product::Product;

/// Currency amounts carry two fractional digits.
pub const MONEY_SCALE: i64 = 2;

/// Digits left of the decimal point that a stored amount may use
/// (`NUMERIC(12, 2)`).
pub const MONEY_INTEGER_DIGITS: i64 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OrderStatus {
    Open,
    Paid,
    Cancelled,
}

impl OrderStatus {
    pub const ALL: [OrderStatus; 3] = [OrderStatus::Open, OrderStatus::Paid, OrderStatus::Cancelled];

    pub fn as_str(self) -> &'static str {
        match self {
            OrderStatus::Open => "OPEN",
            OrderStatus::Paid => "PAID",
            OrderStatus::Cancelled => "CANCELLED",
        }
    }

    /// The order state machine. Every `(from, to)` pair is listed so that a
    /// new state forces this table to be revisited.
    pub fn transition(self, to: OrderStatus) -> Result<OrderStatus, DomainError> {
        use OrderStatus::*;
        match (self, to) {
            (Open, Open) | (Open, Paid) | (Open, Cancelled) => Ok(to),
            (Paid, Open) | (Paid, Paid) | (Paid, Cancelled) => {
                Err(DomainError::invalid_state("cannot modify a PAID order"))
            }
            (Cancelled, Open) | (Cancelled, Paid) | (Cancelled, Cancelled) => {
                Err(DomainError::invalid_state("cannot modify a CANCELLED order"))
            }
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrderStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "OPEN" => Ok(OrderStatus::Open),
            "PAID" => Ok(OrderStatus::Paid),
            "CANCELLED" => Ok(OrderStatus::Cancelled),
            other => Err(DomainError::validation(format!(
                "unknown order status '{other}' (expected OPEN, PAID or CANCELLED)"
            ))),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct OrderItemInput {
    pub product_id: Uuid,
    pub quantity: i32,
    pub unit_price: BigDecimal,
}

#[derive(Debug, Clone, PartialEq)]
pub struct OrderItem {
    pub id: Uuid,
    pub product_id: Uuid,
    pub quantity: i32,
    pub unit_price: BigDecimal,
    /// Current catalog entry, only filled in when a listing asks for it.
    pub product: Option<Product>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Order {
    pub id: Uuid,
    pub customer_id: Uuid,
    pub total: BigDecimal,
    pub status: OrderStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub items: Vec<OrderItem>,
    /// Denormalized snapshot, only filled in when a listing asks for it.
    pub customer: Option<Customer>,
}

/// Checks a non-empty item list: positive quantities and non-negative
/// prices with at most two decimal places that fit a stored amount.
pub fn validate_items(items: &[OrderItemInput]) -> Result<(), DomainError> {
    if items.is_empty() {
        return Err(DomainError::validation(
            "an order must contain at least one item",
        ));
    }
    for item in items {
        if item.quantity <= 0 {
            return Err(DomainError::validation("item quantity must be positive"));
        }
        if item.unit_price.is_negative() {
            return Err(DomainError::validation(
                "item unit price must not be negative",
            ));
        }
        if !fits_money_column(&item.unit_price) {
            return Err(DomainError::validation(format!(
                "item unit price must be less than 1{}",
                "0".repeat(MONEY_INTEGER_DIGITS as usize)
            )));
        }
        if !has_money_scale(&item.unit_price) {
            return Err(DomainError::validation(
                "item unit price must have at most 2 decimal places",
            ));
        }
    }
    Ok(())
}

/// `|value| < 10^MONEY_INTEGER_DIGITS`, decided from the digit count and
/// exponent alone so huge exponents cost nothing.
fn fits_money_column(value: &BigDecimal) -> bool {
    if value.is_zero() {
        return true;
    }
    let (_, scale) = value.as_bigint_and_exponent();
    (value.digits() as i64).saturating_sub(scale) <= MONEY_INTEGER_DIGITS
}

/// No non-zero digit beyond the second decimal place.
fn has_money_scale(value: &BigDecimal) -> bool {
    if value.is_zero() {
        return true;
    }
    let (_, scale) = value.as_bigint_and_exponent();
    if scale <= MONEY_SCALE {
        return true;
    }
    // A mantissa shorter than the digits to drop cannot end in that many zeros.
    if scale - MONEY_SCALE > value.digits() as i64 {
        return false;
    }
    value.with_scale(MONEY_SCALE) == *value
}

/// `Σ quantity × unit_price`, exact, scaled to cents.
pub fn compute_total(items: &[OrderItemInput]) -> BigDecimal {
    items
        .iter()
        .fold(BigDecimal::from(0), |acc, item| {
            acc + &item.unit_price * &BigDecimal::from(item.quantity)
        })
        .with_scale(MONEY_SCALE)
}

/// [`compute_total`] for items that passed [`validate_items`], refused when
/// the sum no longer fits a stored amount.
pub fn priced_total(items: &[OrderItemInput]) -> Result<BigDecimal, DomainError> {
    let total = compute_total(items);
    if !fits_money_column(&total) {
        return Err(DomainError::validation(format!(
            "order total must be less than 1{}",
            "0".repeat(MONEY_INTEGER_DIGITS as usize)
        )));
    }
    Ok(total)
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct OrderFilter {
    pub customer_id: Option<Uuid>,
    pub status: Option<OrderStatus>,
    pub include_customer: bool,
    pub include_products: bool,
}

impl OrderFilter {
    pub fn matches(&self, order: &Order) -> bool {
        self.customer_id.map_or(true, |c| order.customer_id == c)
            && self.status.map_or(true, |s| order.status == s)
    }
}

/// What a caller asks of an existing order. A missing status keeps the
/// current one; an empty item list keeps the current items and total.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OrderUpdate {
    pub status: Option<OrderStatus>,
    pub items: Vec<OrderItemInput>,
}

/// The write an accepted [`OrderUpdate`] resolves to.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderChange {
    pub status: OrderStatus,
    pub total: BigDecimal,
    /// `Some` replaces the stored items.
    pub items: Option<Vec<OrderItemInput>>,
}

impl Order {
    /// Decides an update against the current state without touching storage.
    pub fn plan_update(&self, update: &OrderUpdate) -> Result<OrderChange, DomainError> {
        let requested = update.status.unwrap_or(self.status);
        let status = self.status.transition(requested)?;

        if update.items.is_empty() {
            return Ok(OrderChange {
                status,
                total: self.total.clone(),
                items: None,
            });
        }

        validate_items(&update.items)?;
        Ok(OrderChange {
            status,
            total: priced_total(&update.items)?,
            items: Some(update.items.clone()),
        })
    }
}
