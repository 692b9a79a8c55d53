use std::fmt;
use std::str::FromStr;

use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::errors::DomainError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProductCategory {
    Snack,
    Drink,
    Dessert,
    Combo,
}

impl ProductCategory {
    pub fn as_str(self) -> &'static str {
        match self {
            ProductCategory::Snack => "SNACK",
            ProductCategory::Drink => "DRINK",
            ProductCategory::Dessert => "DESSERT",
            ProductCategory::Combo => "COMBO",
        }
    }
}

impl fmt::Display for ProductCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProductCategory {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "SNACK" => Ok(ProductCategory::Snack),
            "DRINK" => Ok(ProductCategory::Drink),
            "DESSERT" => Ok(ProductCategory::Dessert),
            "COMBO" => Ok(ProductCategory::Combo),
            other => Err(DomainError::validation(format!(
                "unknown product category '{other}'"
            ))),
        }
    }
}

/// Catalog entry. Read-only from the service's point of view.
#[derive(Debug, Clone, PartialEq)]
pub struct Product {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub category: ProductCategory,
    pub price: BigDecimal,
    pub created_at: DateTime<Utc>,
}
