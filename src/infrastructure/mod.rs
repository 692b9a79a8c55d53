pub mod customer_repo;
pub mod models;
pub mod order_repo;
pub mod product_repo;

#[cfg(test)]
pub(crate) mod test_db;

use diesel::result::{DatabaseErrorKind, Error as DieselError};

use crate::domain::errors::{
    DomainError, CUSTOMER_NOT_FOUND, EMAIL_TAKEN, NATIONAL_ID_TAKEN, PHONE_TAKEN,
    PRODUCT_NOT_FOUND,
};

pub use customer_repo::DieselCustomerRepository;
pub use order_repo::DieselOrderRepository;
pub use product_repo::DieselProductRepository;

// ── Error conversions (infrastructure concern only) ──────────────────────────

impl From<DieselError> for DomainError {
    fn from(e: DieselError) -> Self {
        if let DieselError::DatabaseError(kind, info) = &e {
            if let Some(mapped) = constraint_error(kind, info.constraint_name()) {
                return mapped;
            }
        }
        DomainError::Internal(e.to_string())
    }
}

impl From<r2d2::Error> for DomainError {
    fn from(e: r2d2::Error) -> Self {
        DomainError::Internal(e.to_string())
    }
}

/// Translates a named constraint violation into the error the pre-checks
/// would have produced, so a lost race looks the same as a normal rejection.
fn constraint_error(kind: &DatabaseErrorKind, constraint: Option<&str>) -> Option<DomainError> {
    let constraint = constraint?;
    let err = match (kind, constraint) {
        (DatabaseErrorKind::UniqueViolation, "customers_email_key") => {
            DomainError::conflict(EMAIL_TAKEN)
        }
        (DatabaseErrorKind::UniqueViolation, "customers_national_id_key") => {
            DomainError::conflict(NATIONAL_ID_TAKEN)
        }
        (DatabaseErrorKind::UniqueViolation, "customers_phone_key") => {
            DomainError::conflict(PHONE_TAKEN)
        }
        (DatabaseErrorKind::ForeignKeyViolation, "orders_customer_id_fkey") => {
            DomainError::not_found(CUSTOMER_NOT_FOUND)
        }
        (DatabaseErrorKind::ForeignKeyViolation, "order_items_product_id_fkey") => {
            DomainError::not_found(PRODUCT_NOT_FOUND)
        }
        (DatabaseErrorKind::CheckViolation, name) => {
            DomainError::validation(format!("value rejected by constraint {name}"))
        }
        _ => return None,
    };
    Some(err)
}

/// `%value%` for LIKE/ILIKE with the pattern metacharacters escaped.
fn contains_pattern(value: &str) -> String {
    let mut pattern = String::with_capacity(value.len() + 2);
    pattern.push('%');
    for ch in value.chars() {
        if matches!(ch, '\\' | '%' | '_') {
            pattern.push('\\');
        }
        pattern.push(ch);
    }
    pattern.push('%');
    pattern
}
