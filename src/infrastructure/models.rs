use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::customer::{Customer, CustomerInput};
use crate::domain::errors::DomainError;
use crate::domain::order::{Order, OrderItem, OrderItemInput, OrderStatus};
use crate::domain::product::{Product, ProductCategory};
use crate::schema::{customers, order_items, orders, products};

// ── customers ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize, Queryable, Selectable, Identifiable)]
#[diesel(table_name = customers)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct CustomerRow {
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

impl From<CustomerRow> for Customer {
    fn from(r: CustomerRow) -> Self {
        Customer {
            id: r.id,
            name: r.name,
            phone: r.phone,
            email: r.email,
            national_id: r.national_id,
            postal_code: r.postal_code,
            address_line: r.address_line,
            neighborhood: r.neighborhood,
            locality: r.locality,
            region_code: r.region_code,
            active: r.active,
            created_at: r.created_at,
            updated_at: r.updated_at,
        }
    }
}

#[derive(Debug, Insertable)]
#[diesel(table_name = customers)]
pub struct NewCustomerRow<'a> {
    pub id: Uuid,
    pub name: &'a str,
    pub phone: &'a str,
    pub email: &'a str,
    pub national_id: &'a str,
    pub postal_code: &'a str,
    pub address_line: &'a str,
    pub neighborhood: &'a str,
    pub locality: &'a str,
    pub region_code: &'a str,
    pub active: bool,
}

impl<'a> NewCustomerRow<'a> {
    pub fn new(id: Uuid, c: &'a CustomerInput) -> Self {
        Self {
            id,
            name: &c.name,
            phone: &c.phone,
            email: &c.email,
            national_id: &c.national_id,
            postal_code: &c.postal_code,
            address_line: &c.address_line,
            neighborhood: &c.neighborhood,
            locality: &c.locality,
            region_code: &c.region_code,
            active: c.active,
        }
    }
}

/// Full replacement of a customer's attributes.
#[derive(Debug, AsChangeset)]
#[diesel(table_name = customers)]
pub struct CustomerChangeset<'a> {
    pub name: &'a str,
    pub phone: &'a str,
    pub email: &'a str,
    pub national_id: &'a str,
    pub postal_code: &'a str,
    pub address_line: &'a str,
    pub neighborhood: &'a str,
    pub locality: &'a str,
    pub region_code: &'a str,
    pub active: bool,
    pub updated_at: DateTime<Utc>,
}

impl<'a> CustomerChangeset<'a> {
    pub fn new(c: &'a CustomerInput) -> Self {
        Self {
            name: &c.name,
            phone: &c.phone,
            email: &c.email,
            national_id: &c.national_id,
            postal_code: &c.postal_code,
            address_line: &c.address_line,
            neighborhood: &c.neighborhood,
            locality: &c.locality,
            region_code: &c.region_code,
            active: c.active,
            updated_at: Utc::now(),
        }
    }
}

// ── products ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize, Queryable, Selectable, Identifiable)]
#[diesel(table_name = products)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct ProductRow {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub category: String,
    pub price: BigDecimal,
    pub created_at: DateTime<Utc>,
}

impl TryFrom<ProductRow> for Product {
    type Error = DomainError;

    fn try_from(r: ProductRow) -> Result<Self, Self::Error> {
        let category: ProductCategory = r.category.parse().map_err(|_| {
            DomainError::Internal(format!(
                "product {} has unknown category '{}'",
                r.id, r.category
            ))
        })?;
        Ok(Product {
            id: r.id,
            name: r.name,
            description: r.description,
            category,
            price: r.price,
            created_at: r.created_at,
        })
    }
}

// ── orders ───────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize, Queryable, Selectable, Identifiable)]
#[diesel(table_name = orders)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct OrderRow {
    pub id: Uuid,
    pub customer_id: Uuid,
    pub total: BigDecimal,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl OrderRow {
    /// Assembles the domain order; `items` must already be in position order.
    pub fn into_domain(self, items: Vec<OrderItemRow>) -> Result<Order, DomainError> {
        let status: OrderStatus = self.status.parse().map_err(|_| {
            DomainError::Internal(format!(
                "order {} has unknown status '{}'",
                self.id, self.status
            ))
        })?;
        Ok(Order {
            id: self.id,
            customer_id: self.customer_id,
            total: self.total,
            status,
            created_at: self.created_at,
            updated_at: self.updated_at,
            items: items.into_iter().map(OrderItem::from).collect(),
            customer: None,
        })
    }
}

#[derive(Debug, Insertable)]
#[diesel(table_name = orders)]
pub struct NewOrderRow {
    pub id: Uuid,
    pub customer_id: Uuid,
    pub total: BigDecimal,
    pub status: String,
}

#[derive(
    Debug, Clone, Serialize, Deserialize, Queryable, Selectable, Identifiable, Associations,
)]
#[diesel(table_name = order_items)]
#[diesel(belongs_to(OrderRow, foreign_key = order_id))]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct OrderItemRow {
    pub id: Uuid,
    pub order_id: Uuid,
    pub position: i32,
    pub product_id: Uuid,
    pub quantity: i32,
    pub unit_price: BigDecimal,
}

impl From<OrderItemRow> for OrderItem {
    fn from(r: OrderItemRow) -> Self {
        OrderItem {
            id: r.id,
            product_id: r.product_id,
            quantity: r.quantity,
            unit_price: r.unit_price,
            product: None,
        }
    }
}

#[derive(Debug, Insertable)]
#[diesel(table_name = order_items)]
pub struct NewOrderItemRow {
    pub id: Uuid,
    pub order_id: Uuid,
    pub position: i32,
    pub product_id: Uuid,
    pub quantity: i32,
    pub unit_price: BigDecimal,
}

impl NewOrderItemRow {
    pub fn for_order(order_id: Uuid, items: &[OrderItemInput]) -> Vec<Self> {
        items
            .iter()
            .zip(0..)
            .map(|(item, position)| NewOrderItemRow {
                id: Uuid::new_v4(),
                order_id,
                position,
                product_id: item.product_id,
                quantity: item.quantity,
                unit_price: item.unit_price.clone(),
            })
            .collect()
    }
}
