use actix_web::{web, HttpResponse};
use serde::{Deserialize, Serialize};
use serde_json::json;
use utoipa::ToSchema;

use crate::domain::order::{CartLine, Order, OrderLineItem, PlaceOrder};
use crate::errors::AppError;
use crate::handlers::auth::AuthenticatedPersonnel;
use crate::AppState;

// ── Request / response DTOs ──────────────────────────────────────────────────

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CartLineRequest {
    pub menu_item: Option<String>,
    pub quantity: Option<i64>,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PlaceOrderRequest {
    pub customer_id: Option<String>,
    pub restaurant_id: Option<String>,
    #[serde(default)]
    pub items: Vec<CartLineRequest>,
    /// RFC 3339, `YYYY-MM-DDTHH:MM:SS` or `YYYY-MM-DD`; naive values are UTC.
    pub delivery_time: Option<String>,
}

impl From<PlaceOrderRequest> for PlaceOrder {
    fn from(body: PlaceOrderRequest) -> Self {
        PlaceOrder {
            customer_id: body.customer_id,
            restaurant_id: body.restaurant_id,
            items: body
                .items
                .into_iter()
                .map(|l| CartLine {
                    menu_item: l.menu_item,
                    quantity: l.quantity,
                })
                .collect(),
            delivery_time: body.delivery_time,
        }
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct SetStatusRequest {
    pub status: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OrderItemResponse {
    pub id: String,
    pub menu_item: String,
    pub quantity: i32,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OrderResponse {
    pub id: String,
    pub customer: String,
    pub restaurant: String,
    pub order_date: String,
    pub order_status: String,
    /// Exact decimal rendered as a string, e.g. "24.98"
    pub total_amount: String,
    pub delivery_time: Option<String>,
    pub delivery_personnel: Option<String>,
    pub items: Vec<OrderItemResponse>,
    pub created_at: String,
    pub updated_at: String,
}

impl From<OrderLineItem> for OrderItemResponse {
    fn from(item: OrderLineItem) -> Self {
        Self {
            id: item.id.into(),
            menu_item: item.menu_item_id.into(),
            quantity: item.quantity,
        }
    }
}

impl From<Order> for OrderResponse {
    fn from(order: Order) -> Self {
        Self {
            id: order.id.into(),
            customer: order.customer_id.into(),
            restaurant: order.restaurant_id.into(),
            order_date: order.order_date.to_rfc3339(),
            order_status: order.status.to_string(),
            total_amount: order.total_amount.to_string(),
            delivery_time: order.delivery_time.map(|t| t.to_rfc3339()),
            delivery_personnel: order.delivery_personnel_id.map(String::from),
            items: order.items.into_iter().map(OrderItemResponse::from).collect(),
            created_at: order.created_at.to_rfc3339(),
            updated_at: order.updated_at.to_rfc3339(),
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct OrderEnvelope {
    pub message: String,
    pub order: OrderResponse,
}

// ── Handlers ─────────────────────────────────────────────────────────────────

/// POST /api/customer/place-order
///
/// Validates the cart, prices it from the menu and stores the order with its
/// line items in one transaction.
#[utoipa::path(
    post,
    path = "/api/customer/place-order",
    request_body = PlaceOrderRequest,
    responses(
        (status = 201, description = "Order placed", body = OrderEnvelope),
        (status = 400, description = "Missing or malformed fields"),
        (status = 404, description = "Customer, restaurant or menu item not found"),
        (status = 500, description = "Internal server error"),
    ),
    tag = "orders"
)]
pub async fn place_order(
    state: web::Data<AppState>,
    body: web::Json<PlaceOrderRequest>,
) -> Result<HttpResponse, AppError> {
    let request = PlaceOrder::from(body.into_inner());
    let order = web::block(move || state.orders.place_order(request)).await??;

    Ok(HttpResponse::Created().json(OrderEnvelope {
        message: "Order placed successfully".to_string(),
        order: order.into(),
    }))
}

/// GET /api/customer/orders
///
/// Orders still waiting for a delivery partner.
#[utoipa::path(
    get,
    path = "/api/customer/orders",
    responses(
        (status = 200, description = "Pending orders", body = [OrderResponse]),
        (status = 401, description = "Missing, invalid or superseded token"),
        (status = 500, description = "Internal server error"),
    ),
    security(("bearer_auth" = [])),
    tag = "orders"
)]
pub async fn list_available(
    state: web::Data<AppState>,
    _personnel: AuthenticatedPersonnel,
) -> Result<HttpResponse, AppError> {
    let orders = web::block(move || state.orders.list_available()).await??;
    let body: Vec<OrderResponse> = orders.into_iter().map(OrderResponse::from).collect();
    Ok(HttpResponse::Ok().json(body))
}

#[utoipa::path(
    get,
    path = "/api/customer/orders/{id}",
    params(
        ("id" = String, Path, description = "24-character hex order id"),
    ),
    responses(
        (status = 200, description = "Order found", body = OrderResponse),
        (status = 400, description = "Malformed order id"),
        (status = 401, description = "Missing, invalid or superseded token"),
        (status = 404, description = "Order not found"),
    ),
    security(("bearer_auth" = [])),
    tag = "orders"
)]
pub async fn get_order(
    state: web::Data<AppState>,
    _personnel: AuthenticatedPersonnel,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let order_id = path.into_inner();
    let order = web::block(move || state.orders.get_order(&order_id)).await??;
    Ok(HttpResponse::Ok().json(OrderResponse::from(order)))
}

/// PUT /api/customer/orders/{id}/accept
///
/// Claims a pending order for the calling delivery partner. Only one caller
/// can win a given order.
#[utoipa::path(
    put,
    path = "/api/customer/orders/{id}/accept",
    params(
        ("id" = String, Path, description = "24-character hex order id"),
    ),
    responses(
        (status = 200, description = "Order accepted", body = OrderEnvelope),
        (status = 400, description = "Malformed order id"),
        (status = 401, description = "Missing, invalid or superseded token"),
        (status = 403, description = "Caller is marked unavailable"),
        (status = 404, description = "Order not found"),
        (status = 409, description = "Order is no longer pending"),
    ),
    security(("bearer_auth" = [])),
    tag = "orders"
)]
pub async fn accept_order(
    state: web::Data<AppState>,
    caller: AuthenticatedPersonnel,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let order_id = path.into_inner();
    let personnel = caller.0;
    let order = web::block(move || state.orders.accept(&order_id, &personnel)).await??;

    Ok(HttpResponse::Ok().json(OrderEnvelope {
        message: "Order accepted successfully".to_string(),
        order: order.into(),
    }))
}

#[utoipa::path(
    put,
    path = "/api/customer/orders/{id}/status",
    params(
        ("id" = String, Path, description = "24-character hex order id"),
    ),
    request_body = SetStatusRequest,
    responses(
        (status = 200, description = "Status updated or already set", body = OrderEnvelope),
        (status = 400, description = "Invalid or missing status, or malformed id"),
        (status = 401, description = "Missing, invalid or superseded token"),
        (status = 404, description = "Order not found"),
        (status = 409, description = "Transition not allowed or raced"),
    ),
    security(("bearer_auth" = [])),
    tag = "orders"
)]
pub async fn set_status(
    state: web::Data<AppState>,
    _personnel: AuthenticatedPersonnel,
    path: web::Path<String>,
    body: web::Json<SetStatusRequest>,
) -> Result<HttpResponse, AppError> {
    let order_id = path.into_inner();
    let status = body.into_inner().status;
    let change =
        web::block(move || state.orders.set_status(&order_id, status.as_deref())).await??;

    let message = if change.changed {
        "Order status updated successfully"
    } else {
        "Order status is already set to the requested status"
    };
    Ok(HttpResponse::Ok().json(json!({
        "message": message,
        "order": OrderResponse::from(change.order),
    })))
}
