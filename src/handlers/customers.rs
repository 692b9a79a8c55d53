use actix_web::{web, HttpResponse};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use super::{AppState, ErrorResponse};
use crate::domain::customer::{Customer, CustomerFilter, CustomerInput};
use crate::domain::errors::CUSTOMER_NOT_FOUND;
use crate::errors::AppError;

// ── Request / response DTOs ──────────────────────────────────────────────────

/// Every attribute of a customer. Missing text fields arrive empty and are
/// reported by the required-field check.
#[derive(Debug, Deserialize, ToSchema)]
pub struct CustomerRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub email: String,
    /// Exactly 11 digits.
    #[serde(default)]
    pub national_id: String,
    /// Exactly 8 digits.
    #[serde(default)]
    pub postal_code: String,
    #[serde(default)]
    pub address_line: String,
    #[serde(default)]
    pub neighborhood: String,
    #[serde(default)]
    pub locality: String,
    #[serde(default)]
    pub region_code: String,
    /// Ignored on registration; defaults to `true` on update.
    #[serde(default = "default_active")]
    pub active: bool,
}

fn default_active() -> bool {
    true
}

impl From<CustomerRequest> for CustomerInput {
    fn from(r: CustomerRequest) -> Self {
        CustomerInput {
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
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CustomerResponse {
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
    pub created_at: String,
    pub updated_at: String,
}

impl From<Customer> for CustomerResponse {
    fn from(c: Customer) -> Self {
        CustomerResponse {
            id: c.id,
            name: c.name,
            phone: c.phone,
            email: c.email,
            national_id: c.national_id,
            postal_code: c.postal_code,
            address_line: c.address_line,
            neighborhood: c.neighborhood,
            locality: c.locality,
            region_code: c.region_code,
            active: c.active,
            created_at: c.created_at.to_rfc3339(),
            updated_at: c.updated_at.to_rfc3339(),
        }
    }
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ListCustomersParams {
    /// Case-insensitive substring of the name.
    pub name: Option<String>,
    /// Substring of the national ID.
    pub national_id: Option<String>,
    pub active: Option<bool>,
}

// ── Handlers ─────────────────────────────────────────────────────────────────

/// POST /customers
///
/// Registers a new, active customer. Email, national ID and phone must be
/// unused.
#[utoipa::path(
    post,
    path = "/customers",
    request_body = CustomerRequest,
    responses(
        (status = 201, description = "Customer registered", body = CustomerResponse),
        (status = 400, description = "Missing or malformed field", body = ErrorResponse),
        (status = 409, description = "Email, national ID or phone already registered", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    ),
    tag = "customers"
)]
pub async fn create_customer(
    state: web::Data<AppState>,
    body: web::Json<CustomerRequest>,
) -> Result<HttpResponse, AppError> {
    let input = CustomerInput::from(body.into_inner());

    let customer = web::block(move || state.customers.register(input)).await??;

    log::info!("registered customer {}", customer.id);
    Ok(HttpResponse::Created().json(CustomerResponse::from(customer)))
}

/// GET /customers
#[utoipa::path(
    get,
    path = "/customers",
    params(ListCustomersParams),
    responses(
        (status = 200, description = "Matching customers ordered by name", body = [CustomerResponse]),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    ),
    tag = "customers"
)]
pub async fn list_customers(
    state: web::Data<AppState>,
    query: web::Query<ListCustomersParams>,
) -> Result<HttpResponse, AppError> {
    let params = query.into_inner();
    let filter = CustomerFilter {
        name: params.name.filter(|v| !v.is_empty()),
        national_id: params.national_id.filter(|v| !v.is_empty()),
        active: params.active,
    };

    let customers = web::block(move || state.customers.list(&filter)).await??;

    let body: Vec<CustomerResponse> = customers.into_iter().map(Into::into).collect();
    Ok(HttpResponse::Ok().json(body))
}

/// GET /customers/{id}
#[utoipa::path(
    get,
    path = "/customers/{id}",
    params(
        ("id" = Uuid, Path, description = "Customer UUID"),
    ),
    responses(
        (status = 200, description = "Customer found", body = CustomerResponse),
        (status = 404, description = "Customer not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    ),
    tag = "customers"
)]
pub async fn get_customer(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let id = path.into_inner();

    match web::block(move || state.customers.get(id)).await?? {
        Some(customer) => Ok(HttpResponse::Ok().json(CustomerResponse::from(customer))),
        None => Err(AppError::NotFound(CUSTOMER_NOT_FOUND.to_string())),
    }
}

/// PUT /customers/{id}
///
/// Replaces every attribute of the customer; nothing is merged.
#[utoipa::path(
    put,
    path = "/customers/{id}",
    params(
        ("id" = Uuid, Path, description = "Customer UUID"),
    ),
    request_body = CustomerRequest,
    responses(
        (status = 200, description = "Customer updated", body = CustomerResponse),
        (status = 400, description = "Missing or malformed field", body = ErrorResponse),
        (status = 404, description = "Customer not found", body = ErrorResponse),
        (status = 409, description = "Email, national ID or phone owned by another customer", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    ),
    tag = "customers"
)]
pub async fn update_customer(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
    body: web::Json<CustomerRequest>,
) -> Result<HttpResponse, AppError> {
    let id = path.into_inner();
    let input = CustomerInput::from(body.into_inner());

    let customer = web::block(move || state.customers.update(id, input)).await??;

    Ok(HttpResponse::Ok().json(CustomerResponse::from(customer)))
}

/// DELETE /customers/{id}
///
/// Refused while the customer has any order.
#[utoipa::path(
    delete,
    path = "/customers/{id}",
    params(
        ("id" = Uuid, Path, description = "Customer UUID"),
    ),
    responses(
        (status = 204, description = "Customer deleted"),
        (status = 404, description = "Customer not found", body = ErrorResponse),
        (status = 409, description = "Customer still has orders", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    ),
    tag = "customers"
)]
pub async fn delete_customer(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let id = path.into_inner();

    web::block(move || state.customers.delete(id)).await??;

    log::info!("deleted customer {id}");
    Ok(HttpResponse::NoContent().finish())
}
