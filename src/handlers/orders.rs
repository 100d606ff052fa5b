use actix_web::{web, HttpRequest, HttpResponse};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::application::order_builder::OrderBuilder;
use crate::application::order_service::OrderService;
use crate::domain::order::{
    Customer, LineRequest, Order, OrderItem, OrderStatus, OrderView, PaymentMethod, PlaceOrder,
};
use crate::errors::AppError;
use crate::handlers::require_admin;
use crate::AppState;

// ── Request / response DTOs ──────────────────────────────────────────────────

/// A cart line. Any price or name the client sends alongside is ignored.
#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateOrderLineRequest {
    pub product_id: Uuid,
    pub quantity: i32,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateOrderRequest {
    pub user_id: Option<Uuid>,
    pub items: Vec<CreateOrderLineRequest>,
    pub shipping_address: String,
    /// One of `mercadopago`, `transfer`, `cash`.
    pub payment_method: Option<String>,
    pub customer_name: Option<String>,
    pub customer_email: Option<String>,
}

/// Shared by the order and checkout endpoints.
pub(crate) fn place_order_from(
    user_id: Option<Uuid>,
    items: Vec<CreateOrderLineRequest>,
    shipping_address: String,
    payment_method: Option<PaymentMethod>,
    customer_name: Option<String>,
    customer_email: Option<String>,
) -> PlaceOrder {
    PlaceOrder {
        user_id,
        items: items
            .into_iter()
            .map(|l| LineRequest {
                product_id: l.product_id,
                quantity: l.quantity,
            })
            .collect(),
        shipping_address,
        payment_method,
        customer: Customer {
            user_id,
            name: customer_name,
            email: customer_email,
        },
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct OrderItemResponse {
    pub product_id: Uuid,
    pub product_name: String,
    pub quantity: i32,
    /// Unit price captured when the order was placed.
    pub price: String,
    pub image_url: Option<String>,
}

impl From<OrderItem> for OrderItemResponse {
    fn from(i: OrderItem) -> Self {
        Self {
            product_id: i.product_id,
            product_name: i.product_name,
            quantity: i.quantity,
            price: i.unit_price.to_string(),
            image_url: i.image_url,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct OrderResponse {
    pub id: Uuid,
    pub user_id: Option<Uuid>,
    pub status: String,
    pub total: String,
    pub shipping_address: String,
    pub payment_method: Option<String>,
    pub payment_status: Option<String>,
    pub external_reference: String,
    pub created_at: String,
    pub items: Vec<OrderItemResponse>,
}

impl From<Order> for OrderResponse {
    fn from(o: Order) -> Self {
        Self {
            id: o.id,
            user_id: o.user_id,
            status: o.status.to_string(),
            total: o.total.to_string(),
            shipping_address: o.shipping_address,
            payment_method: o.payment_method.map(|m| m.as_str().to_string()),
            payment_status: o.payment_status,
            external_reference: o.external_reference,
            created_at: o.created_at.to_rfc3339(),
            items: vec![],
        }
    }
}

impl From<OrderView> for OrderResponse {
    fn from(v: OrderView) -> Self {
        let mut response = OrderResponse::from(v.order);
        response.items = v.items.into_iter().map(Into::into).collect();
        response
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateStatusRequest {
    /// One of `pending`, `pending_payment`, `paid`, `cancelled`.
    pub status: String,
}

// ── Pagination ───────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize, ToSchema)]
pub struct ListOrdersParams {
    /// Page number (1-based). Defaults to 1.
    #[serde(default = "default_page")]
    pub page: i64,
    /// Number of items per page. Defaults to 20, maximum 100.
    #[serde(default = "default_limit")]
    pub limit: i64,
}

fn default_page() -> i64 {
    1
}

fn default_limit() -> i64 {
    20
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ListOrdersResponse {
    pub items: Vec<OrderResponse>,
    pub total: i64,
    pub page: i64,
    pub limit: i64,
}

// ── Handlers ─────────────────────────────────────────────────────────────────

/// POST /orders
///
/// Places an order priced from the catalog. The order, its items and the
/// stock decrements are committed in a single transaction.
#[utoipa::path(
    post,
    path = "/orders",
    request_body = CreateOrderRequest,
    responses(
        (status = 201, description = "Order created successfully", body = OrderResponse),
        (status = 400, description = "Invalid cart"),
        (status = 404, description = "Unknown product"),
        (status = 409, description = "Insufficient stock"),
        (status = 503, description = "Store unavailable"),
    ),
    tag = "orders"
)]
pub async fn create_order(
    state: web::Data<AppState>,
    body: web::Json<CreateOrderRequest>,
) -> Result<HttpResponse, AppError> {
    let body = body.into_inner();
    let payment_method = body
        .payment_method
        .as_deref()
        .map(str::parse::<PaymentMethod>)
        .transpose()?;
    let request = place_order_from(
        body.user_id,
        body.items,
        body.shipping_address,
        payment_method,
        body.customer_name,
        body.customer_email,
    );
    let (store, notifier) = (state.store.clone(), state.notifier.clone());

    let view = web::block(move || OrderBuilder::new(store, notifier).place_order(request))
        .await
        .map_err(|e| AppError::Internal(e.to_string()))??;

    Ok(HttpResponse::Created().json(OrderResponse::from(view)))
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
        (status = 404, description = "Order not found"),
        (status = 503, description = "Store unavailable"),
    ),
    tag = "orders"
)]
pub async fn get_order(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let order_id = path.into_inner();
    let store = state.store.clone();

    let view = web::block(move || OrderService::new(store).get_order(order_id))
        .await
        .map_err(|e| AppError::Internal(e.to_string()))??;

    Ok(HttpResponse::Ok().json(OrderResponse::from(view)))
}

/// GET /orders/user/{user_id}
///
/// A customer's orders with their items, newest first.
#[utoipa::path(
    get,
    path = "/orders/user/{user_id}",
    params(
        ("user_id" = Uuid, Path, description = "Customer UUID"),
    ),
    responses(
        (status = 200, description = "Customer order history", body = [OrderResponse]),
        (status = 503, description = "Store unavailable"),
    ),
    tag = "orders"
)]
pub async fn list_user_orders(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let user_id = path.into_inner();
    let store = state.store.clone();

    let views = web::block(move || OrderService::new(store).list_orders_for_user(user_id))
        .await
        .map_err(|e| AppError::Internal(e.to_string()))??;

    let body: Vec<OrderResponse> = views.into_iter().map(Into::into).collect();
    Ok(HttpResponse::Ok().json(body))
}

/// GET /orders
///
/// Returns a paginated list of orders (without their items).
/// Use `page` (1-based) and `limit` to control pagination.
#[utoipa::path(
    get,
    path = "/orders",
    params(
        ("page" = Option<i64>, Query, description = "Page number (1-based, default 1)"),
        ("limit" = Option<i64>, Query, description = "Items per page (default 20, max 100)"),
    ),
    responses(
        (status = 200, description = "Paginated list of orders", body = ListOrdersResponse),
        (status = 403, description = "Missing or wrong admin key"),
        (status = 503, description = "Store unavailable"),
    ),
    tag = "orders"
)]
pub async fn list_orders(
    req: HttpRequest,
    state: web::Data<AppState>,
    query: web::Query<ListOrdersParams>,
) -> Result<HttpResponse, AppError> {
    require_admin(&req, &state)?;
    let params = query.into_inner();
    let page = params.page.max(1);
    let limit = params.limit.clamp(1, 100);
    let store = state.store.clone();

    let result = web::block(move || OrderService::new(store).list_orders(page, limit))
        .await
        .map_err(|e| AppError::Internal(e.to_string()))??;

    Ok(HttpResponse::Ok().json(ListOrdersResponse {
        items: result.items.into_iter().map(Into::into).collect(),
        total: result.total,
        page,
        limit,
    }))
}

/// PATCH /orders/{id}/status
///
/// Manual status change, used to confirm cash and transfer payments.
#[utoipa::path(
    patch,
    path = "/orders/{id}/status",
    params(
        ("id" = Uuid, Path, description = "Order UUID"),
    ),
    request_body = UpdateStatusRequest,
    responses(
        (status = 200, description = "Status updated", body = OrderResponse),
        (status = 400, description = "Unknown status"),
        (status = 403, description = "Missing or wrong admin key"),
        (status = 404, description = "Order not found"),
    ),
    tag = "orders"
)]
pub async fn update_order_status(
    req: HttpRequest,
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
    body: web::Json<UpdateStatusRequest>,
) -> Result<HttpResponse, AppError> {
    require_admin(&req, &state)?;
    let order_id = path.into_inner();
    let status: OrderStatus = body.into_inner().status.parse()?;
    let store = state.store.clone();

    let order = web::block(move || OrderService::new(store).update_status(order_id, status))
        .await
        .map_err(|e| AppError::Internal(e.to_string()))??;

    Ok(HttpResponse::Ok().json(OrderResponse::from(order)))
}
