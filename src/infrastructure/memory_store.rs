use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use chrono::Utc;
use uuid::Uuid;

use crate::domain::contact::{ContactMessage, NewContactMessage};
use crate::domain::errors::DomainError;
use crate::domain::order::{
    ListResult, NewOrder, NewOrderItem, Order, OrderItem, OrderStatus, OrderView, PaymentMeta,
};
use crate::domain::ports::Store;
use crate::domain::product::{Product, ProductDraft};

#[derive(Default)]
struct Inner {
    products: HashMap<Uuid, Product>,
    orders: HashMap<Uuid, Order>,
    items: HashMap<Uuid, Vec<OrderItem>>,
    contacts: Vec<ContactMessage>,
}

impl Inner {
    fn view(&self, order: &Order) -> OrderView {
        OrderView {
            order: order.clone(),
            items: self.items.get(&order.id).cloned().unwrap_or_default(),
        }
    }

    fn orders_newest_first(&self) -> Vec<&Order> {
        let mut orders: Vec<&Order> = self.orders.values().collect();
        orders.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        orders
    }

    /// Moves an order to `status`. Entering `cancelled` releases its stock,
    /// leaving it reserves the stock again. `None` means `expected` no longer
    /// holds and nothing was written.
    fn transition(
        &mut self,
        id: Uuid,
        expected: Option<OrderStatus>,
        status: OrderStatus,
        meta: PaymentMeta,
    ) -> Result<Option<Order>, DomainError> {
        let current = self
            .orders
            .get(&id)
            .ok_or_else(|| DomainError::OrderNotFound(id.to_string()))?
            .status;
        if expected.is_some_and(|e| e != current) {
            return Ok(None);
        }

        let releasing = status == OrderStatus::Cancelled && current != OrderStatus::Cancelled;
        let reserving = current == OrderStatus::Cancelled && status != OrderStatus::Cancelled;
        let now = Utc::now();

        if releasing || reserving {
            let mut lines: HashMap<Uuid, i32> = HashMap::new();
            for item in self.items.get(&id).into_iter().flatten() {
                let quantity = lines.entry(item.product_id).or_insert(0);
                *quantity = quantity.saturating_add(item.quantity);
            }

            if reserving {
                for (product_id, quantity) in &lines {
                    let product = self
                        .products
                        .get(product_id)
                        .ok_or(DomainError::ProductNotFound(*product_id))?;
                    if product.stock < *quantity {
                        return Err(DomainError::OutOfStock {
                            product_id: *product_id,
                            requested: *quantity,
                            available: product.stock,
                        });
                    }
                }
            }

            // Products deleted since the order was placed are skipped.
            for (product_id, quantity) in lines {
                if let Some(product) = self.products.get_mut(&product_id) {
                    product.stock = if reserving {
                        product.stock - quantity
                    } else {
                        product.stock.saturating_add(quantity)
                    };
                    product.updated_at = now;
                }
            }
        }

        let order = self
            .orders
            .get_mut(&id)
            .ok_or_else(|| DomainError::OrderNotFound(id.to_string()))?;
        order.status = status;
        if meta.payment_id.is_some() {
            order.payment_id = meta.payment_id;
        }
        if meta.payment_status.is_some() {
            order.payment_status = meta.payment_status;
        }
        order.updated_at = now;
        Ok(Some(order.clone()))
    }
}

/// Process-local store. Every operation runs under one mutex, which gives
/// `create_order` and status transitions the same all-or-nothing behaviour as
/// the PostgreSQL transaction.
#[derive(Default)]
pub struct InMemoryStore {
    inner: Mutex<Inner>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, Inner>, DomainError> {
        self.inner
            .lock()
            .map_err(|_| DomainError::StoreUnavailable("in-memory store lock poisoned".to_string()))
    }

    /// Number of stored contact messages.
    pub fn contact_count(&self) -> Result<usize, DomainError> {
        Ok(self.lock()?.contacts.len())
    }
}

impl Store for InMemoryStore {
    fn get_product(&self, id: Uuid) -> Result<Option<Product>, DomainError> {
        Ok(self.lock()?.products.get(&id).cloned())
    }

    fn list_products(&self) -> Result<Vec<Product>, DomainError> {
        let inner = self.lock()?;
        let mut products: Vec<Product> = inner.products.values().cloned().collect();
        products.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(products)
    }

    fn insert_product(&self, draft: ProductDraft) -> Result<Product, DomainError> {
        let now = Utc::now();
        let product = Product {
            id: Uuid::new_v4(),
            name: draft.name,
            description: draft.description,
            price: draft.price,
            stock: draft.stock,
            category: draft.category,
            image_url: draft.image_url,
            created_at: now,
            updated_at: now,
        };
        self.lock()?.products.insert(product.id, product.clone());
        Ok(product)
    }

    fn update_product(&self, id: Uuid, draft: ProductDraft) -> Result<Option<Product>, DomainError> {
        let mut inner = self.lock()?;
        let Some(product) = inner.products.get_mut(&id) else {
            return Ok(None);
        };
        product.name = draft.name;
        product.description = draft.description;
        product.price = draft.price;
        product.stock = draft.stock;
        product.category = draft.category;
        product.image_url = draft.image_url;
        product.updated_at = Utc::now();
        Ok(Some(product.clone()))
    }

    fn delete_product(&self, id: Uuid) -> Result<bool, DomainError> {
        Ok(self.lock()?.products.remove(&id).is_some())
    }

    fn decrement_stock(&self, id: Uuid, amount: i32) -> Result<Product, DomainError> {
        if amount <= 0 {
            return Err(DomainError::validation("quantity must be positive"));
        }
        let mut inner = self.lock()?;
        let product = inner
            .products
            .get_mut(&id)
            .ok_or(DomainError::ProductNotFound(id))?;
        if product.stock < amount {
            return Err(DomainError::OutOfStock {
                product_id: id,
                requested: amount,
                available: product.stock,
            });
        }
        product.stock -= amount;
        product.updated_at = Utc::now();
        Ok(product.clone())
    }

    fn create_order(
        &self,
        order: NewOrder,
        items: Vec<NewOrderItem>,
    ) -> Result<OrderView, DomainError> {
        let mut inner = self.lock()?;

        // Check every line before touching anything.
        let mut requested: HashMap<Uuid, i32> = HashMap::new();
        for item in &items {
            if item.quantity <= 0 {
                return Err(DomainError::validation("quantity must be positive"));
            }
            let product = inner
                .products
                .get(&item.product_id)
                .ok_or(DomainError::ProductNotFound(item.product_id))?;
            let wanted = requested.entry(item.product_id).or_insert(0);
            *wanted = wanted
                .checked_add(item.quantity)
                .filter(|combined| *combined <= product.stock)
                .ok_or(DomainError::OutOfStock {
                    product_id: item.product_id,
                    requested: wanted.saturating_add(item.quantity),
                    available: product.stock,
                })?;
        }
        if inner
            .orders
            .values()
            .any(|o| o.external_reference == order.external_reference)
        {
            return Err(DomainError::Internal(format!(
                "duplicate external reference {}",
                order.external_reference
            )));
        }

        let now = Utc::now();
        for (product_id, quantity) in requested {
            if let Some(product) = inner.products.get_mut(&product_id) {
                product.stock -= quantity;
                product.updated_at = now;
            }
        }

        let stored = Order {
            id: order.id,
            user_id: order.user_id,
            total: order.total,
            status: order.status,
            shipping_address: order.shipping_address,
            payment_method: order.payment_method,
            payment_id: None,
            payment_status: None,
            external_reference: order.external_reference,
            created_at: now,
            updated_at: now,
        };
        let stored_items: Vec<OrderItem> = items
            .into_iter()
            .map(|i| OrderItem {
                id: Uuid::new_v4(),
                product_id: i.product_id,
                product_name: i.product_name,
                image_url: i.image_url,
                quantity: i.quantity,
                unit_price: i.unit_price,
            })
            .collect();

        inner.items.insert(stored.id, stored_items.clone());
        inner.orders.insert(stored.id, stored.clone());

        Ok(OrderView {
            order: stored,
            items: stored_items,
        })
    }

    fn get_order(&self, id: Uuid) -> Result<Option<OrderView>, DomainError> {
        let inner = self.lock()?;
        Ok(inner.orders.get(&id).map(|o| inner.view(o)))
    }

    fn get_order_by_external_ref(&self, reference: &str) -> Result<Option<Order>, DomainError> {
        Ok(self
            .lock()?
            .orders
            .values()
            .find(|o| o.external_reference == reference)
            .cloned())
    }

    fn get_order_by_payment_id(&self, payment_id: &str) -> Result<Option<Order>, DomainError> {
        let inner = self.lock()?;
        Ok(inner
            .orders_newest_first()
            .into_iter()
            .find(|o| o.payment_id.as_deref() == Some(payment_id))
            .cloned())
    }

    fn list_orders(&self, page: i64, limit: i64) -> Result<ListResult, DomainError> {
        let inner = self.lock()?;
        let orders = inner.orders_newest_first();
        let total = orders.len() as i64;
        let offset = page.saturating_sub(1).saturating_mul(limit).max(0);

        Ok(ListResult {
            items: orders
                .into_iter()
                .skip(usize::try_from(offset).unwrap_or(usize::MAX))
                .take(usize::try_from(limit).unwrap_or(0))
                .cloned()
                .collect(),
            total,
        })
    }

    fn list_orders_for_user(&self, user_id: Uuid) -> Result<Vec<OrderView>, DomainError> {
        let inner = self.lock()?;
        Ok(inner
            .orders_newest_first()
            .into_iter()
            .filter(|o| o.user_id == Some(user_id))
            .map(|o| inner.view(o))
            .collect())
    }

    fn update_order_status(
        &self,
        id: Uuid,
        status: OrderStatus,
        meta: PaymentMeta,
    ) -> Result<Order, DomainError> {
        self.lock()?
            .transition(id, None, status, meta)?
            .ok_or_else(|| DomainError::OrderNotFound(id.to_string()))
    }

    fn update_order_status_if(
        &self,
        id: Uuid,
        expected: OrderStatus,
        status: OrderStatus,
        meta: PaymentMeta,
    ) -> Result<Option<Order>, DomainError> {
        self.lock()?.transition(id, Some(expected), status, meta)
    }

    fn cancel_order(&self, id: Uuid) -> Result<Order, DomainError> {
        let mut inner = self.lock()?;
        let order = inner
            .orders
            .get(&id)
            .ok_or_else(|| DomainError::OrderNotFound(id.to_string()))?;
        if order.status == OrderStatus::Cancelled {
            return Ok(order.clone());
        }

        inner
            .transition(id, None, OrderStatus::Cancelled, PaymentMeta::default())?
            .ok_or_else(|| DomainError::OrderNotFound(id.to_string()))
    }

    fn insert_contact(&self, msg: NewContactMessage) -> Result<ContactMessage, DomainError> {
        let contact = ContactMessage {
            id: Uuid::new_v4(),
            name: msg.name,
            email: msg.email,
            message: msg.message,
            created_at: Utc::now(),
        };
        self.lock()?.contacts.push(contact.clone());
        Ok(contact)
    }
}
