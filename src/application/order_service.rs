use std::sync::Arc;

use uuid::Uuid;

use crate::domain::errors::DomainError;
use crate::domain::order::{ListResult, Order, OrderStatus, OrderView, PaymentMeta};
use crate::domain::ports::Store;

/// Order reads and admin-side status changes.
pub struct OrderService<S: ?Sized> {
    store: Arc<S>,
}

impl<S: Store + ?Sized> OrderService<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    pub fn get_order(&self, id: Uuid) -> Result<OrderView, DomainError> {
        self.store
            .get_order(id)?
            .ok_or_else(|| DomainError::OrderNotFound(id.to_string()))
    }

    pub fn list_orders(&self, page: i64, limit: i64) -> Result<ListResult, DomainError> {
        self.store.list_orders(page.max(1), limit.clamp(1, 100))
    }

    pub fn list_orders_for_user(&self, user_id: Uuid) -> Result<Vec<OrderView>, DomainError> {
        self.store.list_orders_for_user(user_id)
    }

    /// Manual status change, e.g. confirming a cash or transfer payment.
    /// Stock follows the order in and out of `cancelled`.
    pub fn update_status(&self, id: Uuid, status: OrderStatus) -> Result<Order, DomainError> {
        let order = self
            .store
            .update_order_status(id, status, PaymentMeta::default())?;
        log::info!("Order {} set to {} by admin", id, status);
        Ok(order)
    }

    pub fn payment_status(&self, payment_id: &str) -> Result<Order, DomainError> {
        self.store
            .get_order_by_payment_id(payment_id)?
            .ok_or_else(|| DomainError::OrderNotFound(payment_id.to_string()))
    }

    /// Compensation for an order whose checkout could not be created.
    pub fn cancel(&self, id: Uuid) -> Result<Order, DomainError> {
        let order = self.store.cancel_order(id)?;
        log::warn!("Order {} cancelled and stock restored", id);
        Ok(order)
    }
}
