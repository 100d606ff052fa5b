use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::handlers::health::health,
        crate::handlers::products::list_products,
        crate::handlers::products::get_product,
        crate::handlers::products::create_product,
        crate::handlers::products::update_product,
        crate::handlers::products::delete_product,
        crate::handlers::orders::create_order,
        crate::handlers::orders::get_order,
        crate::handlers::orders::list_user_orders,
        crate::handlers::orders::list_orders,
        crate::handlers::orders::update_order_status,
        crate::handlers::payments::create_preference,
        crate::handlers::payments::webhook,
        crate::handlers::payments::payment_status,
        crate::handlers::contact::submit_contact
    ),
    components(
        schemas(
            crate::handlers::products::ProductRequest,
            crate::handlers::products::ProductResponse,
            crate::handlers::orders::CreateOrderLineRequest,
            crate::handlers::orders::CreateOrderRequest,
            crate::handlers::orders::OrderItemResponse,
            crate::handlers::orders::OrderResponse,
            crate::handlers::orders::UpdateStatusRequest,
            crate::handlers::orders::ListOrdersResponse,
            crate::handlers::payments::CheckoutRequest,
            crate::handlers::payments::CheckoutResponse,
            crate::handlers::payments::WebhookPayload,
            crate::handlers::payments::WebhookData,
            crate::handlers::payments::PaymentStatusResponse,
            crate::handlers::payments::PaymentStatusOrder,
            crate::handlers::contact::ContactRequest
        )
    ),
    tags(
        (name = "health", description = "Liveness"),
        (name = "products", description = "Product catalog"),
        (name = "orders", description = "Order placement and history"),
        (name = "payments", description = "Mercado Pago checkout and webhook"),
        (name = "contact", description = "Contact form")
    )
)]
pub struct ApiDoc;
