/// Result of handing an order to the payment provider.
#[derive(Debug, Clone)]
pub struct Checkout {
    pub checkout_url: String,
    pub provider_ref: String,
}

/// Provider-side view of a payment, as resolved from a webhook payment id.
#[derive(Debug, Clone, PartialEq)]
pub struct PaymentDetails {
    pub external_reference: String,
    pub status: String,
}
