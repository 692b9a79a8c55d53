use std::collections::HashMap;

use uuid::Uuid;

use crate::domain::deletion_guard::ensure_order_deletable;
use crate::domain::errors::{DomainError, CUSTOMER_NOT_FOUND};
use crate::domain::order::{
    priced_total, validate_items, Order, OrderFilter, OrderItemInput, OrderUpdate,
};
use crate::domain::ports::{CustomerRepository, OrderRepository, ProductRepository};

pub struct OrderService<R, C, P> {
    repo: R,
    customers: C,
    products: P,
}

impl<R: OrderRepository, C: CustomerRepository, P: ProductRepository> OrderService<R, C, P> {
    pub fn new(repo: R, customers: C, products: P) -> Self {
        Self {
            repo,
            customers,
            products,
        }
    }

    /// Places a new OPEN order. The total is always computed from `items`.
    pub fn place_order(
        &self,
        customer_id: Uuid,
        items: Vec<OrderItemInput>,
    ) -> Result<Order, DomainError> {
        validate_items(&items)?;
        if self.customers.find_by_id(customer_id)?.is_none() {
            return Err(DomainError::not_found(CUSTOMER_NOT_FOUND));
        }
        let total = priced_total(&items)?;
        self.repo.create(customer_id, &total, &items)
    }

    pub fn update_order(&self, id: Uuid, update: OrderUpdate) -> Result<Order, DomainError> {
        self.repo.update_with(id, |current| current.plan_update(&update))
    }

    pub fn delete_order(&self, id: Uuid) -> Result<(), DomainError> {
        self.repo.delete_with(id, |order| ensure_order_deletable(order.status))
    }

    pub fn get(&self, id: Uuid) -> Result<Option<Order>, DomainError> {
        self.repo.find_by_id(id)
    }

    /// Newest first. With `include_customer` each order carries its
    /// customer's current record, and with `include_products` each item
    /// carries its product's current catalog entry. Each is one lookup.
    pub fn list(&self, filter: &OrderFilter) -> Result<Vec<Order>, DomainError> {
        let mut orders = self.repo.list(filter)?;
        if orders.is_empty() {
            return Ok(orders);
        }

        if filter.include_customer {
            let ids = distinct(orders.iter().map(|o| o.customer_id));
            let customers: HashMap<Uuid, _> = self
                .customers
                .find_by_ids(&ids)?
                .into_iter()
                .map(|c| (c.id, c))
                .collect();
            for order in &mut orders {
                order.customer = customers.get(&order.customer_id).cloned();
            }
        }

        if filter.include_products {
            let ids = distinct(orders.iter().flat_map(|o| &o.items).map(|i| i.product_id));
            let products: HashMap<Uuid, _> = self
                .products
                .find_by_ids(&ids)?
                .into_iter()
                .map(|p| (p.id, p))
                .collect();
            for item in orders.iter_mut().flat_map(|o| &mut o.items) {
                item.product = products.get(&item.product_id).cloned();
            }
        }
        Ok(orders)
    }
}

fn distinct(ids: impl Iterator<Item = Uuid>) -> Vec<Uuid> {
    let mut ids: Vec<Uuid> = ids.collect();
    ids.sort_unstable();
    ids.dedup();
    ids
}
