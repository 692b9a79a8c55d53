//! In-memory repositories for service tests. They mirror the constraints the
//! PostgreSQL schema enforces (unique customer fields, foreign keys).

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use bigdecimal::BigDecimal;
use chrono::Utc;
use uuid::Uuid;

use crate::domain::customer::{Customer, CustomerFilter, CustomerInput};
use crate::domain::deletion_guard::OrderReferences;
use crate::domain::errors::{
    DomainError, CUSTOMER_HAS_ORDERS, CUSTOMER_NOT_FOUND, EMAIL_TAKEN, NATIONAL_ID_TAKEN,
    ORDER_NOT_FOUND, PHONE_TAKEN, PRODUCT_NOT_FOUND,
};
use crate::domain::order::{Order, OrderChange, OrderFilter, OrderItem, OrderItemInput, OrderStatus};
use crate::domain::ports::{CustomerRepository, OrderRepository, ProductRepository};
use crate::domain::product::{Product, ProductCategory};

#[derive(Default)]
struct State {
    customers: HashMap<Uuid, Customer>,
    orders: HashMap<Uuid, Order>,
    products: HashMap<Uuid, Product>,
}

#[derive(Clone, Default)]
pub struct InMemoryStore {
    state: Arc<Mutex<State>>,
}

impl InMemoryStore {
    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().expect("store mutex poisoned")
    }

    pub fn customers(&self) -> InMemoryCustomers {
        InMemoryCustomers(self.clone())
    }

    pub fn orders(&self) -> InMemoryOrders {
        InMemoryOrders(self.clone())
    }

    pub fn products(&self) -> InMemoryProducts {
        InMemoryProducts(self.clone())
    }

    pub fn seed_product(&self, name: &str, category: ProductCategory, price: BigDecimal) -> Uuid {
        let id = Uuid::new_v4();
        self.lock().products.insert(
            id,
            Product {
                id,
                name: name.to_string(),
                description: String::new(),
                category,
                price,
                created_at: Utc::now(),
            },
        );
        id
    }

    /// Inserts an order row directly, bypassing the ledger rules.
    pub fn seed_order(&self, customer_id: Uuid, status: OrderStatus, total: BigDecimal) -> Uuid {
        let id = Uuid::new_v4();
        let now = Utc::now();
        self.lock().orders.insert(
            id,
            Order {
                id,
                customer_id,
                total,
                status,
                created_at: now,
                updated_at: now,
                items: vec![],
                customer: None,
            },
        );
        id
    }

    pub fn set_order_status(&self, id: Uuid, status: OrderStatus) {
        if let Some(order) = self.lock().orders.get_mut(&id) {
            order.status = status;
        }
    }

    pub fn remove_order(&self, id: Uuid) {
        self.lock().orders.remove(&id);
    }
}

fn unique_violation(state: &State, input: &CustomerInput, owner: Option<Uuid>) -> Option<&'static str> {
    state
        .customers
        .values()
        .filter(|c| Some(c.id) != owner)
        .find_map(|c| {
            if c.email == input.email {
                Some(EMAIL_TAKEN)
            } else if c.national_id == input.national_id {
                Some(NATIONAL_ID_TAKEN)
            } else if c.phone == input.phone {
                Some(PHONE_TAKEN)
            } else {
                None
            }
        })
}

fn apply_input(customer: &mut Customer, input: &CustomerInput) {
    customer.name = input.name.clone();
    customer.phone = input.phone.clone();
    customer.email = input.email.clone();
    customer.national_id = input.national_id.clone();
    customer.postal_code = input.postal_code.clone();
    customer.address_line = input.address_line.clone();
    customer.neighborhood = input.neighborhood.clone();
    customer.locality = input.locality.clone();
    customer.region_code = input.region_code.clone();
    customer.active = input.active;
    customer.updated_at = Utc::now();
}

fn find_customer(state: &State, pred: impl Fn(&Customer) -> bool) -> Option<Customer> {
    state.customers.values().find(|c| pred(c)).cloned()
}

pub struct InMemoryCustomers(InMemoryStore);

impl CustomerRepository for InMemoryCustomers {
    fn insert(&self, input: &CustomerInput) -> Result<Customer, DomainError> {
        let mut state = self.0.lock();
        if let Some(msg) = unique_violation(&state, input, None) {
            return Err(DomainError::conflict(msg));
        }
        let now = Utc::now();
        let mut customer = Customer {
            id: Uuid::new_v4(),
            name: String::new(),
            phone: String::new(),
            email: String::new(),
            national_id: String::new(),
            postal_code: String::new(),
            address_line: String::new(),
            neighborhood: String::new(),
            locality: String::new(),
            region_code: String::new(),
            active: true,
            created_at: now,
            updated_at: now,
        };
        apply_input(&mut customer, input);
        state.customers.insert(customer.id, customer.clone());
        Ok(customer)
    }

    fn find_by_id(&self, id: Uuid) -> Result<Option<Customer>, DomainError> {
        Ok(self.0.lock().customers.get(&id).cloned())
    }

    fn find_by_ids(&self, ids: &[Uuid]) -> Result<Vec<Customer>, DomainError> {
        let state = self.0.lock();
        Ok(ids.iter().filter_map(|id| state.customers.get(id).cloned()).collect())
    }

    fn find_by_email(&self, email: &str) -> Result<Option<Customer>, DomainError> {
        Ok(find_customer(&self.0.lock(), |c| c.email == email))
    }

    fn find_by_national_id(&self, national_id: &str) -> Result<Option<Customer>, DomainError> {
        Ok(find_customer(&self.0.lock(), |c| c.national_id == national_id))
    }

    fn find_by_phone(&self, phone: &str) -> Result<Option<Customer>, DomainError> {
        Ok(find_customer(&self.0.lock(), |c| c.phone == phone))
    }

    fn list(&self, filter: &CustomerFilter) -> Result<Vec<Customer>, DomainError> {
        let state = self.0.lock();
        let mut found: Vec<Customer> = state
            .customers
            .values()
            .filter(|c| filter.matches(c))
            .cloned()
            .collect();
        found.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(found)
    }

    fn update(&self, id: Uuid, input: &CustomerInput) -> Result<Option<Customer>, DomainError> {
        let mut state = self.0.lock();
        if let Some(msg) = unique_violation(&state, input, Some(id)) {
            return Err(DomainError::conflict(msg));
        }
        Ok(state.customers.get_mut(&id).map(|c| {
            apply_input(c, input);
            c.clone()
        }))
    }

    fn delete_with<G>(&self, id: Uuid, guard: G) -> Result<(), DomainError>
    where
        G: FnOnce(OrderReferences) -> Result<(), DomainError>,
    {
        let mut state = self.0.lock();
        if !state.customers.contains_key(&id) {
            return Err(DomainError::not_found(CUSTOMER_NOT_FOUND));
        }
        let mut refs = OrderReferences::default();
        for order in state.orders.values().filter(|o| o.customer_id == id) {
            refs.has_any_order = true;
            refs.has_open_order |= order.status == OrderStatus::Open;
        }
        guard(refs)?;
        if refs.has_any_order {
            return Err(DomainError::conflict(CUSTOMER_HAS_ORDERS));
        }
        state.customers.remove(&id);
        Ok(())
    }
}

pub struct InMemoryOrders(InMemoryStore);

fn store_items(state: &State, items: &[OrderItemInput]) -> Result<Vec<OrderItem>, DomainError> {
    items
        .iter()
        .map(|i| {
            if !state.products.contains_key(&i.product_id) {
                return Err(DomainError::not_found(PRODUCT_NOT_FOUND));
            }
            Ok(OrderItem {
                id: Uuid::new_v4(),
                product_id: i.product_id,
                quantity: i.quantity,
                unit_price: i.unit_price.clone(),
                product: None,
            })
        })
        .collect()
}

impl OrderRepository for InMemoryOrders {
    fn create(
        &self,
        customer_id: Uuid,
        total: &BigDecimal,
        items: &[OrderItemInput],
    ) -> Result<Order, DomainError> {
        let mut state = self.0.lock();
        if !state.customers.contains_key(&customer_id) {
            return Err(DomainError::not_found(CUSTOMER_NOT_FOUND));
        }
        let items = store_items(&state, items)?;
        let now = Utc::now();
        let order = Order {
            id: Uuid::new_v4(),
            customer_id,
            total: total.clone(),
            status: OrderStatus::Open,
            created_at: now,
            updated_at: now,
            items,
            customer: None,
        };
        state.orders.insert(order.id, order.clone());
        Ok(order)
    }

    fn find_by_id(&self, id: Uuid) -> Result<Option<Order>, DomainError> {
        Ok(self.0.lock().orders.get(&id).cloned())
    }

    fn list(&self, filter: &OrderFilter) -> Result<Vec<Order>, DomainError> {
        let state = self.0.lock();
        let mut found: Vec<Order> = state
            .orders
            .values()
            .filter(|o| filter.matches(o))
            .cloned()
            .collect();
        found.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(found)
    }

    fn update_with<P>(&self, id: Uuid, plan: P) -> Result<Order, DomainError>
    where
        P: FnOnce(&Order) -> Result<OrderChange, DomainError>,
    {
        let mut state = self.0.lock();
        let current = state
            .orders
            .get(&id)
            .cloned()
            .ok_or_else(|| DomainError::not_found(ORDER_NOT_FOUND))?;
        let change = plan(&current)?;
        let items = match &change.items {
            Some(items) => Some(store_items(&state, items)?),
            None => None,
        };

        let mut updated = current;
        updated.status = change.status;
        updated.total = change.total;
        updated.updated_at = Utc::now();
        if let Some(items) = items {
            updated.items = items;
        }
        state.orders.insert(id, updated.clone());
        Ok(updated)
    }

    fn delete_with<G>(&self, id: Uuid, guard: G) -> Result<(), DomainError>
    where
        G: FnOnce(&Order) -> Result<(), DomainError>,
    {
        let mut state = self.0.lock();
        let order = state
            .orders
            .get(&id)
            .ok_or_else(|| DomainError::not_found(ORDER_NOT_FOUND))?;
        guard(order)?;
        state.orders.remove(&id);
        Ok(())
    }
}

pub struct InMemoryProducts(InMemoryStore);

impl ProductRepository for InMemoryProducts {
    fn find_by_id(&self, id: Uuid) -> Result<Option<Product>, DomainError> {
        Ok(self.0.lock().products.get(&id).cloned())
    }

    fn find_by_ids(&self, ids: &[Uuid]) -> Result<Vec<Product>, DomainError> {
        let state = self.0.lock();
        Ok(ids.iter().filter_map(|id| state.products.get(id).cloned()).collect())
    }

    fn list(&self, category: Option<ProductCategory>) -> Result<Vec<Product>, DomainError> {
        let state = self.0.lock();
        let mut found: Vec<Product> = state
            .products
            .values()
            .filter(|p| category.map_or(true, |c| p.category == c))
            .cloned()
            .collect();
        found.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(found)
    }
}
