use std::sync::Arc;

use crate::domain::errors::DomainError;
use crate::domain::order::{Order, OrderStatus, PaymentMeta};
use crate::domain::ports::Store;

/// Applies provider payment events to orders.
///
/// Each event is an absolute assignment of the mapped status, so duplicate
/// deliveries converge on the same state. Delivery order is not guaranteed by
/// the provider; the last event to arrive wins. A rejection releases the
/// order's stock through the store, and a later approval reserves it again.
pub struct PaymentReconciler<S: ?Sized> {
    store: Arc<S>,
}

impl<S: Store + ?Sized> PaymentReconciler<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    pub fn apply_payment_event(
        &self,
        provider_payment_id: &str,
        external_reference: &str,
        provider_status: &str,
    ) -> Result<Order, DomainError> {
        let order = self
            .store
            .get_order_by_external_ref(external_reference)?
            .ok_or_else(|| DomainError::OrderNotFound(external_reference.to_string()))?;

        let status = OrderStatus::from_provider_status(provider_status);
        let updated = self.store.update_order_status(
            order.id,
            status,
            PaymentMeta {
                payment_id: Some(provider_payment_id.to_string()),
                payment_status: Some(provider_status.to_string()),
            },
        )?;

        if order.status == status {
            log::debug!("Order {} already {}, event re-applied", order.id, status);
        } else {
            log::info!(
                "Order {} moved from {} to {} (payment {}, provider status '{}')",
                order.id,
                order.status,
                status,
                provider_payment_id,
                provider_status
            );
        }

        Ok(updated)
    }
}

#[cfg(test)]
mod tests {
    use bigdecimal::BigDecimal;
    use uuid::Uuid;

    use super::*;
    use crate::domain::order::{NewOrder, NewOrderItem, OrderView};
    use crate::domain::product::ProductDraft;
    use crate::infrastructure::memory_store::InMemoryStore;

    fn seeded(reference: &str) -> (Arc<InMemoryStore>, OrderView) {
        let store = Arc::new(InMemoryStore::new());
        let view = store
            .create_order(
                NewOrder {
                    id: Uuid::new_v4(),
                    user_id: None,
                    total: BigDecimal::from(10),
                    status: OrderStatus::PendingPayment,
                    shipping_address: "addr".to_string(),
                    payment_method: None,
                    external_reference: reference.to_string(),
                },
                vec![],
            )
            .unwrap();
        (store, view)
    }

    #[test]
    fn approved_twice_stays_paid() {
        let (store, view) = seeded("order_1700000000_42");
        let reconciler = PaymentReconciler::new(store.clone());

        let first = reconciler
            .apply_payment_event("991", "order_1700000000_42", "approved")
            .expect("first delivery");
        let second = reconciler
            .apply_payment_event("991", "order_1700000000_42", "approved")
            .expect("duplicate delivery");

        assert_eq!(first.status, OrderStatus::Paid);
        assert_eq!(second.status, OrderStatus::Paid);
        let stored = store.get_order(view.order.id).unwrap().unwrap().order;
        assert_eq!(stored.status, OrderStatus::Paid);
        assert_eq!(stored.payment_id.as_deref(), Some("991"));
        assert_eq!(stored.payment_status.as_deref(), Some("approved"));
    }

    #[test]
    fn rejected_cancels_and_pending_waits() {
        let (store, _) = seeded("ref-a");
        let reconciler = PaymentReconciler::new(store);

        assert_eq!(
            reconciler.apply_payment_event("1", "ref-a", "pending").unwrap().status,
            OrderStatus::PendingPayment
        );
        assert_eq!(
            reconciler.apply_payment_event("1", "ref-a", "rejected").unwrap().status,
            OrderStatus::Cancelled
        );
    }

    #[test]
    fn unknown_provider_status_falls_back_to_pending() {
        let (store, _) = seeded("ref-b");
        let reconciler = PaymentReconciler::new(store);

        let order = reconciler
            .apply_payment_event("2", "ref-b", "in_mediation")
            .unwrap();
        assert_eq!(order.status, OrderStatus::Pending);
        assert_eq!(order.payment_status.as_deref(), Some("in_mediation"));
    }

    #[test]
    fn last_arrival_wins() {
        let (store, _) = seeded("ref-c");
        let reconciler = PaymentReconciler::new(store);

        reconciler.apply_payment_event("3", "ref-c", "approved").unwrap();
        let late = reconciler.apply_payment_event("3", "ref-c", "pending").unwrap();
        assert_eq!(late.status, OrderStatus::PendingPayment);
    }

    #[test]
    fn unmatched_reference_is_not_found_and_changes_nothing() {
        let (store, view) = seeded("ref-d");
        let reconciler = PaymentReconciler::new(store.clone());

        let err = reconciler
            .apply_payment_event("4", "order_0_missing", "approved")
            .unwrap_err();

        assert!(matches!(err, DomainError::OrderNotFound(r) if r == "order_0_missing"));
        let stored = store.get_order(view.order.id).unwrap().unwrap().order;
        assert_eq!(stored.status, OrderStatus::PendingPayment);
        assert!(stored.payment_id.is_none());
    }

    #[test]
    fn rejection_returns_stock_exactly_once() {
        let store = Arc::new(InMemoryStore::new());
        let product = store
            .insert_product(ProductDraft {
                name: "Inodoro Ecológico".to_string(),
                description: None,
                price: BigDecimal::from(85000),
                stock: 10,
                category: None,
                image_url: None,
            })
            .unwrap();
        let view = store
            .create_order(
                NewOrder {
                    id: Uuid::new_v4(),
                    user_id: None,
                    total: BigDecimal::from(255000),
                    status: OrderStatus::PendingPayment,
                    shipping_address: "addr".to_string(),
                    payment_method: None,
                    external_reference: "ref-e".to_string(),
                },
                vec![NewOrderItem {
                    product_id: product.id,
                    product_name: product.name.clone(),
                    image_url: None,
                    quantity: 3,
                    unit_price: product.price.clone(),
                }],
            )
            .unwrap();
        let reconciler = PaymentReconciler::new(store.clone());

        reconciler.apply_payment_event("5", "ref-e", "rejected").unwrap();
        reconciler.apply_payment_event("5", "ref-e", "rejected").unwrap();
        store.cancel_order(view.order.id).unwrap();
        assert_eq!(store.get_product(product.id).unwrap().unwrap().stock, 10);

        let paid = reconciler.apply_payment_event("6", "ref-e", "approved").unwrap();
        assert_eq!(paid.status, OrderStatus::Paid);
        assert_eq!(store.get_product(product.id).unwrap().unwrap().stock, 7);
    }
}
