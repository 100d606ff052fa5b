use std::sync::Arc;

use bigdecimal::{BigDecimal, Zero};
use chrono::Utc;
use uuid::Uuid;

use crate::domain::errors::DomainError;
use crate::domain::order::{
    external_reference, NewOrder, NewOrderItem, OrderStatus, OrderView, PlaceOrder,
};
use crate::domain::ports::{Notifier, Store};
use crate::domain::product::check_amount;

/// Turns a submitted cart into a persisted order.
///
/// Prices always come from the catalog; whatever the client believes an item
/// costs is never consulted.
pub struct OrderBuilder<S: ?Sized, N: ?Sized> {
    store: Arc<S>,
    notifier: Arc<N>,
}

impl<S, N> OrderBuilder<S, N>
where
    S: Store + ?Sized,
    N: Notifier + ?Sized,
{
    pub fn new(store: Arc<S>, notifier: Arc<N>) -> Self {
        Self { store, notifier }
    }

    pub fn place_order(&self, request: PlaceOrder) -> Result<OrderView, DomainError> {
        let shipping_address = validate(&request)?;

        // 1. Price every line from the current catalog record
        let mut total = BigDecimal::zero();
        let mut items = Vec::with_capacity(request.items.len());
        for line in &request.items {
            let product = self
                .store
                .get_product(line.product_id)?
                .ok_or(DomainError::ProductNotFound(line.product_id))?;

            if line.quantity > product.stock {
                return Err(DomainError::OutOfStock {
                    product_id: product.id,
                    requested: line.quantity,
                    available: product.stock,
                });
            }

            total += &product.price * BigDecimal::from(line.quantity);
            items.push(NewOrderItem {
                product_id: product.id,
                product_name: product.name,
                image_url: product.image_url,
                quantity: line.quantity,
                unit_price: product.price,
            });
        }

        check_amount("order total", &total)?;

        // 2. Persist order, items and stock decrements as one unit. The store
        //    re-checks stock, so a concurrent order can still turn this into
        //    OutOfStock with nothing committed.
        let id = Uuid::new_v4();
        let order = NewOrder {
            id,
            user_id: request.user_id,
            total,
            status: OrderStatus::Pending,
            shipping_address,
            payment_method: request.payment_method,
            external_reference: external_reference(id, Utc::now()),
        };
        let view = self.store.create_order(order, items)?;

        log::info!(
            "Order {} placed: {} item(s), total {}",
            view.order.id,
            view.items.len(),
            view.order.total
        );

        // 3. Best effort; the order stands regardless.
        if let Err(e) = self
            .notifier
            .send_order_confirmation(&view, &request.customer)
        {
            log::warn!("Order {} confirmation not sent: {}", view.order.id, e);
        }

        Ok(view)
    }
}

fn validate(request: &PlaceOrder) -> Result<String, DomainError> {
    if request.items.is_empty() {
        return Err(DomainError::validation("at least one item is required"));
    }
    if let Some(line) = request.items.iter().find(|l| l.quantity <= 0) {
        return Err(DomainError::validation(format!(
            "quantity for product {} must be a positive integer",
            line.product_id
        )));
    }
    let address = request.shipping_address.trim();
    if address.is_empty() {
        return Err(DomainError::validation("shipping address is required"));
    }
    Ok(address.to_string())
}
