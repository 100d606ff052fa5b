//! Mercado Pago checkout preferences and payment lookups.
//!
//! Authorization: `Authorization: Bearer <access token>`.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use bigdecimal::ToPrimitive;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::errors::DomainError;
use crate::domain::order::OrderView;
use crate::domain::payment::{Checkout, PaymentDetails};
use crate::domain::ports::PaymentProvider;

pub const MERCADOPAGO_API_BASE: &str = "https://api.mercadopago.com";
const CURRENCY: &str = "ARS";
const SANDBOX_CHECKOUT_URL: &str = "https://www.mercadopago.com.ar/checkout/v1/redirect";

#[derive(Debug, Error)]
pub enum MercadoPagoError {
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("mercado pago api error status={status} body={body}")]
    Api { status: u16, body: String },
    #[error("invalid response: {0}")]
    InvalidResponse(String),
    #[error("invalid api url: {0}")]
    InvalidUrl(String),
}

impl From<MercadoPagoError> for DomainError {
    fn from(e: MercadoPagoError) -> Self {
        DomainError::PaymentProvider(e.to_string())
    }
}

#[derive(Debug, Serialize)]
pub struct PreferenceItem {
    pub id: String,
    pub title: String,
    pub description: String,
    pub quantity: i32,
    pub unit_price: f64,
    pub currency_id: &'static str,
}

#[derive(Debug, Serialize)]
pub struct BackUrls {
    pub success: String,
    pub failure: String,
    pub pending: String,
}

#[derive(Debug, Serialize)]
pub struct PreferenceMetadata {
    pub order_id: String,
    pub user_id: String,
    pub shipping_address: String,
    pub total_amount: String,
}

#[derive(Debug, Serialize)]
pub struct PreferenceRequest {
    pub items: Vec<PreferenceItem>,
    pub back_urls: BackUrls,
    pub auto_return: &'static str,
    pub external_reference: String,
    pub notification_url: String,
    pub metadata: PreferenceMetadata,
}

#[derive(Debug, Deserialize)]
struct PreferenceResponse {
    id: String,
    init_point: String,
}

#[derive(Debug, Deserialize)]
struct PaymentResponse {
    status: String,
    external_reference: Option<String>,
}

pub struct MercadoPagoClient {
    http: reqwest::Client,
    api_url: String,
    access_token: String,
    frontend_url: String,
    backend_url: String,
}

impl MercadoPagoClient {
    pub fn new(
        access_token: impl Into<String>,
        api_url: impl Into<String>,
        frontend_url: impl Into<String>,
        backend_url: impl Into<String>,
    ) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_url: api_url.into(),
            access_token: access_token.into(),
            frontend_url: frontend_url.into(),
            backend_url: backend_url.into(),
        }
    }

    /// Builds the preference body from the persisted order, so the prices the
    /// provider charges are the catalog prices captured on the order items.
    pub fn build_preference(&self, view: &OrderView) -> Result<PreferenceRequest, DomainError> {
        let items = view
            .items
            .iter()
            .map(|i| {
                let unit_price = i.unit_price.to_f64().ok_or_else(|| {
                    DomainError::Internal(format!("price {} is not representable", i.unit_price))
                })?;
                Ok(PreferenceItem {
                    id: i.product_id.to_string(),
                    title: i.product_name.clone(),
                    description: format!("Producto: {}", i.product_name),
                    quantity: i.quantity,
                    unit_price,
                    currency_id: CURRENCY,
                })
            })
            .collect::<Result<Vec<_>, DomainError>>()?;

        let order = &view.order;
        Ok(PreferenceRequest {
            items,
            back_urls: BackUrls {
                success: format!("{}/payment/success", self.frontend_url),
                failure: format!("{}/payment/failure", self.frontend_url),
                pending: format!("{}/payment/pending", self.frontend_url),
            },
            auto_return: "approved",
            external_reference: order.external_reference.clone(),
            notification_url: format!("{}/payments/webhook", self.backend_url),
            metadata: PreferenceMetadata {
                order_id: order.id.to_string(),
                user_id: order
                    .user_id
                    .map(|id| id.to_string())
                    .unwrap_or_else(|| "guest".to_string()),
                shipping_address: order.shipping_address.clone(),
                total_amount: order.total.to_string(),
            },
        })
    }

    /// `{api}/v1/payments/{id}` with the id kept as one encoded path segment.
    pub fn payment_url(&self, payment_id: &str) -> Result<reqwest::Url, MercadoPagoError> {
        let mut url = reqwest::Url::parse(&self.api_url)
            .map_err(|e| MercadoPagoError::InvalidUrl(format!("{}: {e}", self.api_url)))?;
        url.path_segments_mut()
            .map_err(|_| MercadoPagoError::InvalidUrl(self.api_url.clone()))?
            .pop_if_empty()
            .extend(["v1", "payments", payment_id]);
        Ok(url)
    }

    async fn read_json<T: for<'de> Deserialize<'de>>(
        resp: reqwest::Response,
    ) -> Result<T, MercadoPagoError> {
        let status = resp.status();
        let body = resp.text().await?;

        if !status.is_success() {
            return Err(MercadoPagoError::Api {
                status: status.as_u16(),
                body,
            });
        }

        serde_json::from_str::<T>(&body)
            .map_err(|e| MercadoPagoError::InvalidResponse(format!("{e}; body={body}")))
    }
}

#[async_trait]
impl PaymentProvider for MercadoPagoClient {
    async fn create_checkout(&self, order: &OrderView) -> Result<Checkout, DomainError> {
        let preference = self.build_preference(order)?;

        let resp = self
            .http
            .post(format!("{}/checkout/preferences", self.api_url))
            .bearer_auth(&self.access_token)
            .json(&preference)
            .send()
            .await
            .map_err(MercadoPagoError::from)?;
        let created: PreferenceResponse = Self::read_json(resp).await?;

        Ok(Checkout {
            checkout_url: created.init_point,
            provider_ref: created.id,
        })
    }

    async fn lookup_payment(&self, payment_id: &str) -> Result<PaymentDetails, DomainError> {
        let resp = self
            .http
            .get(self.payment_url(payment_id)?)
            .bearer_auth(&self.access_token)
            .send()
            .await
            .map_err(MercadoPagoError::from)?;
        let payment: PaymentResponse = Self::read_json(resp).await?;

        let external_reference = payment.external_reference.ok_or_else(|| {
            MercadoPagoError::InvalidResponse(format!(
                "payment {payment_id} has no external_reference"
            ))
        })?;

        Ok(PaymentDetails {
            external_reference,
            status: payment.status,
        })
    }
}

/// Stand-in used when no access token is configured. Checkouts are recorded
/// as approved payments keyed by their provider reference.
#[derive(Default)]
pub struct SandboxPaymentProvider {
    payments: Mutex<HashMap<String, PaymentDetails>>,
}

impl SandboxPaymentProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Overrides what a later `lookup_payment(payment_id)` returns.
    pub fn record_payment(&self, payment_id: impl Into<String>, details: PaymentDetails) {
        if let Ok(mut payments) = self.payments.lock() {
            payments.insert(payment_id.into(), details);
        }
    }
}

#[async_trait]
impl PaymentProvider for SandboxPaymentProvider {
    async fn create_checkout(&self, order: &OrderView) -> Result<Checkout, DomainError> {
        let provider_ref = format!("test_{}", order.order.id.simple());
        self.record_payment(
            provider_ref.clone(),
            PaymentDetails {
                external_reference: order.order.external_reference.clone(),
                status: "approved".to_string(),
            },
        );

        Ok(Checkout {
            checkout_url: format!("{SANDBOX_CHECKOUT_URL}?pref_id={provider_ref}"),
            provider_ref,
        })
    }

    async fn lookup_payment(&self, payment_id: &str) -> Result<PaymentDetails, DomainError> {
        let payments = self
            .payments
            .lock()
            .map_err(|_| DomainError::PaymentProvider("sandbox state poisoned".to_string()))?;
        payments
            .get(payment_id)
            .cloned()
            .ok_or_else(|| DomainError::PaymentProvider(format!("unknown payment {payment_id}")))
    }
}
