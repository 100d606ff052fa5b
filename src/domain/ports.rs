use async_trait::async_trait;
use uuid::Uuid;

use super::contact::{ContactMessage, NewContactMessage};
use super::errors::{DomainError, NotifyError};
use super::order::{
    Customer, ListResult, NewOrder, NewOrderItem, Order, OrderStatus, OrderView, PaymentMeta,
};
use super::payment::{Checkout, PaymentDetails};
use super::product::{Product, ProductDraft};

/// Persistence for the catalog, orders and contact messages.
///
/// Implementations must make `create_order` all-or-nothing: the order row,
/// every item and every stock decrement commit together or not at all.
pub trait Store: Send + Sync + 'static {
    fn get_product(&self, id: Uuid) -> Result<Option<Product>, DomainError>;
    fn list_products(&self) -> Result<Vec<Product>, DomainError>;
    fn insert_product(&self, draft: ProductDraft) -> Result<Product, DomainError>;
    fn update_product(&self, id: Uuid, draft: ProductDraft) -> Result<Option<Product>, DomainError>;
    /// Returns `false` when no product had that id.
    fn delete_product(&self, id: Uuid) -> Result<bool, DomainError>;

    /// Fails with `OutOfStock` instead of letting stock go negative.
    fn decrement_stock(&self, id: Uuid, amount: i32) -> Result<Product, DomainError>;

    fn create_order(&self, order: NewOrder, items: Vec<NewOrderItem>)
        -> Result<OrderView, DomainError>;
    fn get_order(&self, id: Uuid) -> Result<Option<OrderView>, DomainError>;
    fn get_order_by_external_ref(&self, reference: &str) -> Result<Option<Order>, DomainError>;
    fn get_order_by_payment_id(&self, payment_id: &str) -> Result<Option<Order>, DomainError>;
    fn list_orders(&self, page: i64, limit: i64) -> Result<ListResult, DomainError>;
    fn list_orders_for_user(&self, user_id: Uuid) -> Result<Vec<OrderView>, DomainError>;

    /// Absolute assignment of the status, keyed on order id.
    ///
    /// Entering `cancelled` returns the order's quantities to stock; leaving
    /// it takes them again and fails with `OutOfStock` if they are gone.
    fn update_order_status(
        &self,
        id: Uuid,
        status: OrderStatus,
        meta: PaymentMeta,
    ) -> Result<Order, DomainError>;

    /// Same as `update_order_status`, applied only while the order is still
    /// in `expected`. Returns `None` when it has already moved on.
    fn update_order_status_if(
        &self,
        id: Uuid,
        expected: OrderStatus,
        status: OrderStatus,
        meta: PaymentMeta,
    ) -> Result<Option<Order>, DomainError>;

    /// Marks the order cancelled and returns its quantities to stock. A
    /// second call on an already cancelled order changes nothing.
    fn cancel_order(&self, id: Uuid) -> Result<Order, DomainError>;

    fn insert_contact(&self, msg: NewContactMessage) -> Result<ContactMessage, DomainError>;
}

pub trait Notifier: Send + Sync + 'static {
    fn send_order_confirmation(
        &self,
        order: &OrderView,
        customer: &Customer,
    ) -> Result<(), NotifyError>;
}

#[async_trait]
pub trait PaymentProvider: Send + Sync + 'static {
    async fn create_checkout(&self, order: &OrderView) -> Result<Checkout, DomainError>;
    async fn lookup_payment(&self, payment_id: &str) -> Result<PaymentDetails, DomainError>;
}
