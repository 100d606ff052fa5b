use actix_web::{web, HttpResponse};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::application::order_builder::OrderBuilder;
use crate::application::order_service::OrderService;
use crate::application::payment_reconciler::PaymentReconciler;
use crate::domain::order::{OrderStatus, PaymentMeta, PaymentMethod};
use crate::errors::AppError;
use crate::handlers::orders::{place_order_from, CreateOrderLineRequest};
use crate::AppState;

// ── Request / response DTOs ──────────────────────────────────────────────────

#[derive(Debug, Deserialize, ToSchema)]
pub struct CheckoutRequest {
    pub user_id: Option<Uuid>,
    pub items: Vec<CreateOrderLineRequest>,
    pub shipping_address: String,
    pub customer_name: Option<String>,
    pub customer_email: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CheckoutResponse {
    pub success: bool,
    pub preference_id: String,
    pub init_point: String,
    pub sandbox_init_point: String,
    pub order_id: Uuid,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct WebhookData {
    /// Provider payment id; sent either as a string or a number.
    #[schema(value_type = String)]
    pub id: Value,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct WebhookPayload {
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub data: Option<WebhookData>,
}

impl WebhookPayload {
    /// Provider payment ids are numeric; letters, `_` and `-` are also let
    /// through for sandbox references. Anything else is rejected before it
    /// can reach a provider URL.
    fn payment_id(&self) -> Option<String> {
        let id = match &self.data.as_ref()?.id {
            Value::String(s) => s.clone(),
            Value::Number(n) if n.is_u64() => n.to_string(),
            _ => return None,
        };
        let valid = !id.is_empty()
            && id.len() <= 64
            && id
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
        valid.then_some(id)
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PaymentStatusOrder {
    pub id: Uuid,
    pub status: String,
    pub payment_status: Option<String>,
    pub total: String,
    pub created_at: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PaymentStatusResponse {
    pub success: bool,
    pub order: PaymentStatusOrder,
}

// ── Handlers ─────────────────────────────────────────────────────────────────

/// POST /payments/create-preference
///
/// Places the order, then asks the payment provider for a checkout. If the
/// provider refuses, the order is cancelled and its stock returned.
#[utoipa::path(
    post,
    path = "/payments/create-preference",
    request_body = CheckoutRequest,
    responses(
        (status = 200, description = "Checkout created", body = CheckoutResponse),
        (status = 400, description = "Invalid cart"),
        (status = 404, description = "Unknown product"),
        (status = 409, description = "Insufficient stock"),
        (status = 502, description = "Payment provider error"),
    ),
    tag = "payments"
)]
pub async fn create_preference(
    state: web::Data<AppState>,
    body: web::Json<CheckoutRequest>,
) -> Result<HttpResponse, AppError> {
    let body = body.into_inner();
    let request = place_order_from(
        body.user_id,
        body.items,
        body.shipping_address,
        Some(PaymentMethod::MercadoPago),
        body.customer_name,
        body.customer_email,
    );
    let (store, notifier) = (state.store.clone(), state.notifier.clone());

    // 1. Persist the order (status pending)
    let view = web::block(move || OrderBuilder::new(store, notifier).place_order(request))
        .await
        .map_err(|e| AppError::Internal(e.to_string()))??;
    let order_id = view.order.id;

    // 2. Hand it to the provider, compensating on failure
    let checkout = match state.payments.create_checkout(&view).await {
        Ok(checkout) => checkout,
        Err(e) => {
            let store = state.store.clone();
            let cancelled = web::block(move || OrderService::new(store).cancel(order_id)).await;
            if !matches!(cancelled, Ok(Ok(_))) {
                log::error!(
                    "Order {} could not be cancelled after checkout failure",
                    order_id
                );
            }
            return Err(e.into());
        }
    };

    // 3. Await the webhook, unless one already moved the order on
    let store = state.store.clone();
    let provider_ref = checkout.provider_ref.clone();
    let awaiting = web::block(move || {
        store.update_order_status_if(
            order_id,
            OrderStatus::Pending,
            OrderStatus::PendingPayment,
            PaymentMeta {
                payment_id: Some(provider_ref),
                payment_status: None,
            },
        )
    })
    .await
    .map_err(|e| AppError::Internal(e.to_string()))??;
    if awaiting.is_none() {
        log::info!("Order {} was updated before its checkout was recorded", order_id);
    }

    Ok(HttpResponse::Ok().json(CheckoutResponse {
        success: true,
        preference_id: checkout.provider_ref,
        init_point: checkout.checkout_url.clone(),
        sandbox_init_point: checkout.checkout_url,
        order_id,
    }))
}

/// POST /payments/webhook
///
/// Provider notification `{"type": "payment", "data": {"id": ...}}`. The
/// payment is resolved through the provider before the order is touched.
/// Other notification types are acknowledged and ignored.
#[utoipa::path(
    post,
    path = "/payments/webhook",
    request_body = WebhookPayload,
    responses(
        (status = 200, description = "Webhook processed or ignored"),
        (status = 400, description = "Payment notification without data.id"),
        (status = 404, description = "No order matches the payment's external reference"),
        (status = 502, description = "Payment provider error"),
    ),
    tag = "payments"
)]
pub async fn webhook(
    state: web::Data<AppState>,
    body: web::Json<WebhookPayload>,
) -> Result<HttpResponse, AppError> {
    let payload = body.into_inner();

    if payload.kind.as_deref() != Some("payment") {
        log::debug!("Ignoring webhook of type {:?}", payload.kind);
        return Ok(HttpResponse::Ok().json(json!({ "message": "Webhook ignored" })));
    }

    let payment_id = payload
        .payment_id()
        .ok_or_else(|| AppError::BadRequest("data.id must be a payment id".to_string()))?;

    let details = state.payments.lookup_payment(&payment_id).await?;

    let store = state.store.clone();
    let order = web::block(move || {
        PaymentReconciler::new(store).apply_payment_event(
            &payment_id,
            &details.external_reference,
            &details.status,
        )
    })
    .await
    .map_err(|e| AppError::Internal(e.to_string()))?
    .inspect_err(|e| log::warn!("Webhook not applied: {}", e))?;

    Ok(HttpResponse::Ok().json(json!({
        "message": "Webhook processed",
        "order_id": order.id,
        "status": order.status.as_str(),
    })))
}

/// GET /payments/payment-status/{payment_id}
#[utoipa::path(
    get,
    path = "/payments/payment-status/{payment_id}",
    params(
        ("payment_id" = String, Path, description = "Provider payment id"),
    ),
    responses(
        (status = 200, description = "Order for this payment", body = PaymentStatusResponse),
        (status = 404, description = "No order for this payment"),
    ),
    tag = "payments"
)]
pub async fn payment_status(
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let payment_id = path.into_inner();
    let store = state.store.clone();

    let order = web::block(move || OrderService::new(store).payment_status(&payment_id))
        .await
        .map_err(|e| AppError::Internal(e.to_string()))??;

    Ok(HttpResponse::Ok().json(PaymentStatusResponse {
        success: true,
        order: PaymentStatusOrder {
            id: order.id,
            status: order.status.to_string(),
            payment_status: order.payment_status,
            total: order.total.to_string(),
            created_at: order.created_at.to_rfc3339(),
        },
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn payment_id_accepts_strings_and_numbers() {
        let numeric: WebhookPayload =
            serde_json::from_value(json!({"type": "payment", "data": {"id": 1234567}})).unwrap();
        assert_eq!(numeric.payment_id().as_deref(), Some("1234567"));

        let text: WebhookPayload =
            serde_json::from_value(json!({"type": "payment", "data": {"id": "abc"}})).unwrap();
        assert_eq!(text.payment_id().as_deref(), Some("abc"));

        let missing: WebhookPayload = serde_json::from_value(json!({"type": "payment"})).unwrap();
        assert!(missing.payment_id().is_none());
    }

    #[test]
    fn payment_id_rejects_path_characters() {
        for id in ["../../users/me?x=", "1/2", "12 34", "", "-1.5"] {
            let payload: WebhookPayload =
                serde_json::from_value(json!({"type": "payment", "data": {"id": id}})).unwrap();
            assert!(payload.payment_id().is_none(), "{id:?} accepted");
        }

        let negative: WebhookPayload =
            serde_json::from_value(json!({"type": "payment", "data": {"id": -7}})).unwrap();
        assert!(negative.payment_id().is_none());
    }
}
