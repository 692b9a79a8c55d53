pub mod customers;
pub mod orders;
pub mod products;

use std::str::FromStr;

use actix_web::web;
use bigdecimal::BigDecimal;
use serde::Serialize;
use utoipa::ToSchema;

use crate::application::{CatalogService, CustomerService, OrderService};
use crate::db::DbPool;
use crate::errors::AppError;
use crate::infrastructure::{
    DieselCustomerRepository, DieselOrderRepository, DieselProductRepository,
};

/// Services shared by every worker, wired to the Diesel repositories.
pub struct AppState {
    pub customers: CustomerService<DieselCustomerRepository>,
    pub orders:
        OrderService<DieselOrderRepository, DieselCustomerRepository, DieselProductRepository>,
    pub catalog: CatalogService<DieselProductRepository>,
}

impl AppState {
    pub fn new(pool: DbPool) -> Self {
        Self {
            customers: CustomerService::new(DieselCustomerRepository::new(pool.clone())),
            orders: OrderService::new(
                DieselOrderRepository::new(pool.clone()),
                DieselCustomerRepository::new(pool.clone()),
                DieselProductRepository::new(pool.clone()),
            ),
            catalog: CatalogService::new(DieselProductRepository::new(pool)),
        }
    }
}

/// Body of every non-2xx response.
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    pub error: String,
}

/// Registers all resource routes.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/customers")
            .route("", web::post().to(customers::create_customer))
            .route("", web::get().to(customers::list_customers))
            .route("/{id}", web::get().to(customers::get_customer))
            .route("/{id}", web::put().to(customers::update_customer))
            .route("/{id}", web::delete().to(customers::delete_customer)),
    )
    .service(
        web::scope("/orders")
            .route("", web::post().to(orders::create_order))
            .route("", web::get().to(orders::list_orders))
            .route("/{id}", web::get().to(orders::get_order))
            .route("/{id}", web::put().to(orders::update_order))
            .route("/{id}", web::delete().to(orders::delete_order)),
    )
    .service(
        web::scope("/products")
            .route("", web::get().to(products::list_products))
            .route("/{id}", web::get().to(products::get_product)),
    );
}

/// Longest money string accepted: `-` + 10 integer digits + `.` + a
/// generous run of (zero) decimals.
const MAX_MONEY_CHARS: usize = 24;

/// Plain decimal strings only, e.g. "9.99". Exponents and floats never
/// reach the domain.
fn parse_money(field: &str, raw: &str) -> Result<BigDecimal, AppError> {
    let invalid = || AppError::Validation(format!("{field} must be a plain decimal string such as \"9.99\""));
    let value = raw.trim();
    if value.len() > MAX_MONEY_CHARS || !is_plain_decimal(value) {
        return Err(invalid());
    }
    BigDecimal::from_str(value).map_err(|_| invalid())
}

/// `-?digits(.digits)?`
fn is_plain_decimal(value: &str) -> bool {
    let unsigned = value.strip_prefix('-').unwrap_or(value);
    let (int, frac) = match unsigned.split_once('.') {
        Some((int, frac)) => (int, Some(frac)),
        None => (unsigned, None),
    };
    let all_digits = |s: &str| !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit());
    all_digits(int) && frac.map_or(true, all_digits)
}
