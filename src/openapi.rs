use utoipa::OpenApi;

use crate::handlers::{customers, orders, products, ErrorResponse};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Food order service",
        description = "Customers, product catalog and the order lifecycle"
    ),
    paths(
        customers::create_customer,
        customers::list_customers,
        customers::get_customer,
        customers::update_customer,
        customers::delete_customer,
        orders::create_order,
        orders::list_orders,
        orders::get_order,
        orders::update_order,
        orders::delete_order,
        products::list_products,
        products::get_product,
    ),
    components(schemas(
        customers::CustomerRequest,
        customers::CustomerResponse,
        orders::CreateOrderRequest,
        orders::UpdateOrderRequest,
        orders::OrderItemRequest,
        orders::OrderItemResponse,
        orders::OrderResponse,
        products::ProductResponse,
        ErrorResponse,
    )),
    tags(
        (name = "customers", description = "Customer registration and maintenance"),
        (name = "orders", description = "Order lifecycle"),
        (name = "products", description = "Read-only product catalog"),
    )
)]
pub struct ApiDoc;
