use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::errors::DomainError;

pub const NATIONAL_ID_LEN: usize = 11;
pub const POSTAL_CODE_LEN: usize = 8;

// Column widths of the customers table, in characters.
pub const NAME_MAX_LEN: usize = 255;
pub const PHONE_MAX_LEN: usize = 32;
pub const EMAIL_MAX_LEN: usize = 255;
pub const ADDRESS_LINE_MAX_LEN: usize = 255;
pub const NEIGHBORHOOD_MAX_LEN: usize = 255;
pub const LOCALITY_MAX_LEN: usize = 255;
pub const REGION_CODE_MAX_LEN: usize = 8;

#[derive(Debug, Clone, PartialEq)]
pub struct Customer {
    pub id: Uuid,
    pub name: String,
    pub phone: String,
    pub email: String,
    pub national_id: String,
    pub postal_code: String,
    pub address_line: String,
    pub neighborhood: String,
    pub locality: String,
    pub region_code: String,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Complete attribute set for registering or replacing a customer.
///
/// Updates never merge partial fields onto a stored record: the caller
/// always hands over every attribute and the whole set is re-validated.
#[derive(Debug, Clone, PartialEq)]
pub struct CustomerInput {
    pub name: String,
    pub phone: String,
    pub email: String,
    pub national_id: String,
    pub postal_code: String,
    pub address_line: String,
    pub neighborhood: String,
    pub locality: String,
    pub region_code: String,
    pub active: bool,
}

impl CustomerInput {
    /// Field-level checks that need no storage access: presence first, then
    /// column widths, then the national ID format, then the postal code
    /// format.
    pub fn validate(&self) -> Result<(), DomainError> {
        let required = [
            ("name", &self.name),
            ("phone", &self.phone),
            ("email", &self.email),
            ("national_id", &self.national_id),
            ("postal_code", &self.postal_code),
            ("address_line", &self.address_line),
            ("neighborhood", &self.neighborhood),
            ("locality", &self.locality),
            ("region_code", &self.region_code),
        ];
        if let Some((field, _)) = required.iter().find(|(_, v)| v.trim().is_empty()) {
            return Err(DomainError::validation(format!("{field} is required")));
        }

        let bounded = [
            ("name", &self.name, NAME_MAX_LEN),
            ("phone", &self.phone, PHONE_MAX_LEN),
            ("email", &self.email, EMAIL_MAX_LEN),
            ("address_line", &self.address_line, ADDRESS_LINE_MAX_LEN),
            ("neighborhood", &self.neighborhood, NEIGHBORHOOD_MAX_LEN),
            ("locality", &self.locality, LOCALITY_MAX_LEN),
            ("region_code", &self.region_code, REGION_CODE_MAX_LEN),
        ];
        if let Some((field, _, max)) = bounded.iter().find(|(_, v, max)| v.chars().count() > *max) {
            return Err(DomainError::validation(format!(
                "{field} must be at most {max} characters"
            )));
        }

        if !is_digits(&self.national_id, NATIONAL_ID_LEN) {
            return Err(DomainError::validation(
                "national ID must be 11 numeric digits",
            ));
        }
        if !is_digits(&self.postal_code, POSTAL_CODE_LEN) {
            return Err(DomainError::validation(
                "postal code must be 8 numeric digits",
            ));
        }
        Ok(())
    }
}

/// `^\d{len}$` restricted to ASCII digits.
fn is_digits(value: &str, len: usize) -> bool {
    value.len() == len && value.bytes().all(|b| b.is_ascii_digit())
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct CustomerFilter {
    /// Case-insensitive substring of the name.
    pub name: Option<String>,
    /// Substring of the national ID.
    pub national_id: Option<String>,
    pub active: Option<bool>,
}

impl CustomerFilter {
    pub fn matches(&self, customer: &Customer) -> bool {
        let name_ok = self.name.as_ref().map_or(true, |n| {
            customer.name.to_lowercase().contains(&n.to_lowercase())
        });
        let national_id_ok = self
            .national_id
            .as_ref()
            .map_or(true, |n| customer.national_id.contains(n.as_str()));
        let active_ok = self.active.map_or(true, |a| customer.active == a);
        name_ok && national_id_ok && active_ok
    }
}
