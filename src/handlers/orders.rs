use std::str::FromStr;

use actix_web::{web, HttpResponse};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use super::customers::CustomerResponse;
use super::products::ProductResponse;
use super::{parse_money, AppState, ErrorResponse};
use crate::domain::errors::ORDER_NOT_FOUND;
use crate::domain::order::{Order, OrderFilter, OrderItem, OrderItemInput, OrderStatus, OrderUpdate};
use crate::errors::AppError;

// ── Request / response DTOs ──────────────────────────────────────────────────

#[derive(Debug, Deserialize, ToSchema)]
pub struct OrderItemRequest {
    pub product_id: Uuid,
    pub quantity: i32,
    /// Decimal price as a string to avoid floating-point issues, e.g. "9.99"
    pub unit_price: String,
}

/// A `total` or `status` sent by the client is ignored: new orders are
/// always OPEN and their total is computed from the items.
#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateOrderRequest {
    pub customer_id: Uuid,
    #[serde(default)]
    pub items: Vec<OrderItemRequest>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateOrderRequest {
    /// OPEN, PAID or CANCELLED. Omitted keeps the current status.
    pub status: Option<String>,
    /// Non-empty replaces the items and recomputes the total.
    #[serde(default)]
    pub items: Vec<OrderItemRequest>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct OrderItemResponse {
    pub id: Uuid,
    pub product_id: Uuid,
    pub quantity: i32,
    pub unit_price: String,
    /// Present only when requested with `include_products=true`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub product: Option<ProductResponse>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct OrderResponse {
    pub id: Uuid,
    pub customer_id: Uuid,
    pub total: String,
    pub status: String,
    pub created_at: String,
    pub updated_at: String,
    pub items: Vec<OrderItemResponse>,
    /// Present only when requested with `include_customer=true`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub customer: Option<CustomerResponse>,
}

impl From<OrderItem> for OrderItemResponse {
    fn from(i: OrderItem) -> Self {
        OrderItemResponse {
            id: i.id,
            product_id: i.product_id,
            quantity: i.quantity,
            unit_price: i.unit_price.to_string(),
            product: i.product.map(Into::into),
        }
    }
}

impl From<Order> for OrderResponse {
    fn from(o: Order) -> Self {
        OrderResponse {
            id: o.id,
            customer_id: o.customer_id,
            total: o.total.to_string(),
            status: o.status.to_string(),
            created_at: o.created_at.to_rfc3339(),
            updated_at: o.updated_at.to_rfc3339(),
            items: o.items.into_iter().map(Into::into).collect(),
            customer: o.customer.map(Into::into),
        }
    }
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ListOrdersParams {
    pub customer_id: Option<Uuid>,
    /// OPEN, PAID or CANCELLED.
    pub status: Option<String>,
    /// Attach each order's customer record.
    #[serde(default)]
    pub include_customer: bool,
    /// Attach each item's product record.
    #[serde(default)]
    pub include_products: bool,
}

fn to_item_inputs(items: Vec<OrderItemRequest>) -> Result<Vec<OrderItemInput>, AppError> {
    items
        .into_iter()
        .map(|i| {
            parse_money("unit_price", &i.unit_price).map(|unit_price| OrderItemInput {
                product_id: i.product_id,
                quantity: i.quantity,
                unit_price,
            })
        })
        .collect()
}

fn parse_status(raw: Option<String>) -> Result<Option<OrderStatus>, AppError> {
    raw.map(|s| OrderStatus::from_str(s.trim()))
        .transpose()
        .map_err(AppError::from)
}

// ── Handlers ─────────────────────────────────────────────────────────────────

/// POST /orders
///
/// Places an OPEN order for an existing customer. The order and its items
/// are written in one transaction.
#[utoipa::path(
    post,
    path = "/orders",
    request_body = CreateOrderRequest,
    responses(
        (status = 201, description = "Order placed", body = OrderResponse),
        (status = 400, description = "Invalid items", body = ErrorResponse),
        (status = 404, description = "Customer or product not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    ),
    tag = "orders"
)]
pub async fn create_order(
    state: web::Data<AppState>,
    body: web::Json<CreateOrderRequest>,
) -> Result<HttpResponse, AppError> {
    let body = body.into_inner();
    let customer_id = body.customer_id;
    let items = to_item_inputs(body.items)?;

    let order = web::block(move || state.orders.place_order(customer_id, items)).await??;

    log::info!("placed order {} for customer {} (total {})", order.id, customer_id, order.total);
    Ok(HttpResponse::Created().json(OrderResponse::from(order)))
}

/// GET /orders
///
/// Orders with their items, newest first.
#[utoipa::path(
    get,
    path = "/orders",
    params(ListOrdersParams),
    responses(
        (status = 200, description = "Matching orders", body = [OrderResponse]),
        (status = 400, description = "Unknown status", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    ),
    tag = "orders"
)]
pub async fn list_orders(
    state: web::Data<AppState>,
    query: web::Query<ListOrdersParams>,
) -> Result<HttpResponse, AppError> {
    let params = query.into_inner();
    let filter = OrderFilter {
        customer_id: params.customer_id,
        status: parse_status(params.status.filter(|s| !s.is_empty()))?,
        include_customer: params.include_customer,
        include_products: params.include_products,
    };

    let orders = web::block(move || state.orders.list(&filter)).await??;

    let body: Vec<OrderResponse> = orders.into_iter().map(Into::into).collect();
    Ok(HttpResponse::Ok().json(body))
}

/// GET /orders/{id}
///
/// Returns the order together with its items.
#[utoipa::path(
    get,
    path = "/orders/{id}",
    params(
        ("id" = Uuid, Path, description = "Order UUID"),
    ),
    responses(
        (status = 200, description = "Order found", body = OrderResponse),
        (status = 404, description = "Order not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    ),
    tag = "orders"
)]
pub async fn get_order(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let order_id = path.into_inner();

    match web::block(move || state.orders.get(order_id)).await?? {
        Some(order) => Ok(HttpResponse::Ok().json(OrderResponse::from(order))),
        None => Err(AppError::NotFound(ORDER_NOT_FOUND.to_string())),
    }
}

/// PUT /orders/{id}
///
/// Moves an OPEN order to another status and optionally replaces its
/// items. PAID and CANCELLED orders are frozen.
#[utoipa::path(
    put,
    path = "/orders/{id}",
    params(
        ("id" = Uuid, Path, description = "Order UUID"),
    ),
    request_body = UpdateOrderRequest,
    responses(
        (status = 200, description = "Order updated", body = OrderResponse),
        (status = 400, description = "Unknown status or invalid items", body = ErrorResponse),
        (status = 404, description = "Order or product not found", body = ErrorResponse),
        (status = 422, description = "Transition not allowed from the current status", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    ),
    tag = "orders"
)]
pub async fn update_order(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
    body: web::Json<UpdateOrderRequest>,
) -> Result<HttpResponse, AppError> {
    let order_id = path.into_inner();
    let body = body.into_inner();
    let update = OrderUpdate {
        status: parse_status(body.status)?,
        items: to_item_inputs(body.items)?,
    };

    let order = web::block(move || state.orders.update_order(order_id, update)).await??;

    log::info!("order {} is now {}", order.id, order.status);
    Ok(HttpResponse::Ok().json(OrderResponse::from(order)))
}

/// DELETE /orders/{id}
///
/// Removes an OPEN or CANCELLED order with its items. PAID orders stay.
#[utoipa::path(
    delete,
    path = "/orders/{id}",
    params(
        ("id" = Uuid, Path, description = "Order UUID"),
    ),
    responses(
        (status = 204, description = "Order deleted"),
        (status = 404, description = "Order not found", body = ErrorResponse),
        (status = 422, description = "Order is PAID", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    ),
    tag = "orders"
)]
pub async fn delete_order(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let order_id = path.into_inner();

    web::block(move || state.orders.delete_order(order_id)).await??;

    log::info!("deleted order {order_id}");
    Ok(HttpResponse::NoContent().finish())
}
