use bigdecimal::BigDecimal;
use uuid::Uuid;

use super::customer::{Customer, CustomerFilter, CustomerInput};
use super::deletion_guard::OrderReferences;
use super::errors::DomainError;
use super::order::{Order, OrderChange, OrderFilter, OrderItemInput};
use super::product::{Product, ProductCategory};

pub trait CustomerRepository: Send + Sync + 'static {
    /// Stores a new customer and returns it with its assigned id.
    fn insert(&self, customer: &CustomerInput) -> Result<Customer, DomainError>;
    fn find_by_id(&self, id: Uuid) -> Result<Option<Customer>, DomainError>;
    fn find_by_ids(&self, ids: &[Uuid]) -> Result<Vec<Customer>, DomainError>;
    fn find_by_email(&self, email: &str) -> Result<Option<Customer>, DomainError>;
    fn find_by_national_id(&self, national_id: &str) -> Result<Option<Customer>, DomainError>;
    fn find_by_phone(&self, phone: &str) -> Result<Option<Customer>, DomainError>;
    fn list(&self, filter: &CustomerFilter) -> Result<Vec<Customer>, DomainError>;
    /// Replaces every attribute. `Ok(None)` when the id is unknown.
    fn update(&self, id: Uuid, customer: &CustomerInput)
        -> Result<Option<Customer>, DomainError>;
    /// Locks the customer, hands the orders referencing it to `guard`, and
    /// deletes only if the guard agrees, all in one transaction.
    fn delete_with<G>(&self, id: Uuid, guard: G) -> Result<(), DomainError>
    where
        G: FnOnce(OrderReferences) -> Result<(), DomainError>;
}

pub trait OrderRepository: Send + Sync + 'static {
    /// Inserts the order and its items atomically, status OPEN.
    fn create(
        &self,
        customer_id: Uuid,
        total: &BigDecimal,
        items: &[OrderItemInput],
    ) -> Result<Order, DomainError>;
    fn find_by_id(&self, id: Uuid) -> Result<Option<Order>, DomainError>;
    fn list(&self, filter: &OrderFilter) -> Result<Vec<Order>, DomainError>;
    /// Locks the order, asks `plan` what to write, and writes it in the same
    /// transaction.
    fn update_with<P>(&self, id: Uuid, plan: P) -> Result<Order, DomainError>
    where
        P: FnOnce(&Order) -> Result<OrderChange, DomainError>;
    /// Locks the order, runs `guard`, then removes the items and the order
    /// in the same transaction.
    fn delete_with<G>(&self, id: Uuid, guard: G) -> Result<(), DomainError>
    where
        G: FnOnce(&Order) -> Result<(), DomainError>;
}

pub trait ProductRepository: Send + Sync + 'static {
    fn find_by_id(&self, id: Uuid) -> Result<Option<Product>, DomainError>;
    fn find_by_ids(&self, ids: &[Uuid]) -> Result<Vec<Product>, DomainError>;
    fn list(&self, category: Option<ProductCategory>) -> Result<Vec<Product>, DomainError>;
}
