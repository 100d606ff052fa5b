use crate::domain::errors::NotifyError;
use crate::domain::order::{Customer, OrderView};
use crate::domain::ports::Notifier;

/// Writes the client and admin order confirmations to the log.
pub struct LogNotifier {
    admin_email: String,
}

impl LogNotifier {
    pub fn new(admin_email: impl Into<String>) -> Self {
        Self {
            admin_email: admin_email.into(),
        }
    }
}

impl Notifier for LogNotifier {
    fn send_order_confirmation(
        &self,
        order: &OrderView,
        customer: &Customer,
    ) -> Result<(), NotifyError> {
        let lines: Vec<String> = order
            .items
            .iter()
            .map(|i| format!("{} x{} @ {}", i.product_name, i.quantity, i.unit_price))
            .collect();

        let recipient = customer
            .email
            .as_deref()
            .map(str::to_string)
            .or_else(|| customer.user_id.map(|id| format!("user {id}")))
            .unwrap_or_else(|| "guest".to_string());

        log::info!(
            "Order confirmation to {}: order {} total {} shipping to '{}' [{}]",
            recipient,
            order.order.id,
            order.order.total,
            order.order.shipping_address,
            lines.join(", ")
        );
        log::info!(
            "New order notice to {}: order {} from {} total {}",
            self.admin_email,
            order.order.id,
            customer.name.as_deref().unwrap_or("guest"),
            order.order.total
        );
        Ok(())
    }
}
