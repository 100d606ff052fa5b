use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use crate::domain::contact::{ContactMessage, NewContactMessage};
use crate::domain::errors::DomainError;
use crate::domain::order::{NewOrder, NewOrderItem, Order, OrderItem};
use crate::domain::product::{Product, ProductDraft};
use crate::schema::{contact_messages, order_items, orders, products};

#[derive(Debug, Clone, Queryable, Selectable, Identifiable)]
#[diesel(table_name = products)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct ProductRow {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub price: BigDecimal,
    pub stock: i32,
    pub category: Option<String>,
    pub image_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<ProductRow> for Product {
    fn from(r: ProductRow) -> Self {
        Product {
            id: r.id,
            name: r.name,
            description: r.description,
            price: r.price,
            stock: r.stock,
            category: r.category,
            image_url: r.image_url,
            created_at: r.created_at,
            updated_at: r.updated_at,
        }
    }
}

#[derive(Debug, Insertable)]
#[diesel(table_name = products)]
pub struct NewProductRow {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub price: BigDecimal,
    pub stock: i32,
    pub category: Option<String>,
    pub image_url: Option<String>,
}

impl NewProductRow {
    pub fn from_draft(id: Uuid, d: ProductDraft) -> Self {
        Self {
            id,
            name: d.name,
            description: d.description,
            price: d.price,
            stock: d.stock,
            category: d.category,
            image_url: d.image_url,
        }
    }
}

/// Full replacement of the editable product columns; `None` clears a column.
#[derive(Debug, AsChangeset)]
#[diesel(table_name = products)]
#[diesel(treat_none_as_null = true)]
pub struct ProductChangeset {
    pub name: String,
    pub description: Option<String>,
    pub price: BigDecimal,
    pub stock: i32,
    pub category: Option<String>,
    pub image_url: Option<String>,
    pub updated_at: DateTime<Utc>,
}

impl ProductChangeset {
    pub fn from_draft(d: ProductDraft) -> Self {
        Self {
            name: d.name,
            description: d.description,
            price: d.price,
            stock: d.stock,
            category: d.category,
            image_url: d.image_url,
            updated_at: Utc::now(),
        }
    }
}

#[derive(Debug, Clone, Queryable, Selectable, Identifiable)]
#[diesel(table_name = orders)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct OrderRow {
    pub id: Uuid,
    pub user_id: Option<Uuid>,
    pub total: BigDecimal,
    pub status: String,
    pub shipping_address: String,
    pub payment_method: Option<String>,
    pub payment_id: Option<String>,
    pub payment_status: Option<String>,
    pub external_reference: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<OrderRow> for Order {
    type Error = DomainError;

    fn try_from(r: OrderRow) -> Result<Self, Self::Error> {
        let status = r
            .status
            .parse()
            .map_err(|e: DomainError| DomainError::Internal(e.to_string()))?;
        let payment_method = r
            .payment_method
            .as_deref()
            .map(str::parse)
            .transpose()
            .map_err(|e: DomainError| DomainError::Internal(e.to_string()))?;

        Ok(Order {
            id: r.id,
            user_id: r.user_id,
            total: r.total,
            status,
            shipping_address: r.shipping_address,
            payment_method,
            payment_id: r.payment_id,
            payment_status: r.payment_status,
            external_reference: r.external_reference,
            created_at: r.created_at,
            updated_at: r.updated_at,
        })
    }
}

#[derive(Debug, Insertable)]
#[diesel(table_name = orders)]
pub struct NewOrderRow {
    pub id: Uuid,
    pub user_id: Option<Uuid>,
    pub total: BigDecimal,
    pub status: String,
    pub shipping_address: String,
    pub payment_method: Option<String>,
    pub external_reference: String,
}

impl From<&NewOrder> for NewOrderRow {
    fn from(o: &NewOrder) -> Self {
        Self {
            id: o.id,
            user_id: o.user_id,
            total: o.total.clone(),
            status: o.status.as_str().to_string(),
            shipping_address: o.shipping_address.clone(),
            payment_method: o.payment_method.map(|m| m.as_str().to_string()),
            external_reference: o.external_reference.clone(),
        }
    }
}

/// Status update; payment fields left as `None` keep their stored value.
#[derive(Debug, AsChangeset)]
#[diesel(table_name = orders)]
pub struct OrderStatusChangeset {
    pub status: String,
    pub payment_id: Option<String>,
    pub payment_status: Option<String>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Queryable, Selectable, Identifiable, Associations)]
#[diesel(table_name = order_items)]
#[diesel(belongs_to(OrderRow, foreign_key = order_id))]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct OrderItemRow {
    pub id: Uuid,
    pub order_id: Uuid,
    pub product_id: Uuid,
    pub product_name: String,
    pub image_url: Option<String>,
    pub quantity: i32,
    pub unit_price: BigDecimal,
    pub created_at: DateTime<Utc>,
}

impl From<OrderItemRow> for OrderItem {
    fn from(r: OrderItemRow) -> Self {
        OrderItem {
            id: r.id,
            product_id: r.product_id,
            product_name: r.product_name,
            image_url: r.image_url,
            quantity: r.quantity,
            unit_price: r.unit_price,
        }
    }
}

#[derive(Debug, Insertable)]
#[diesel(table_name = order_items)]
pub struct NewOrderItemRow {
    pub id: Uuid,
    pub order_id: Uuid,
    pub product_id: Uuid,
    pub product_name: String,
    pub image_url: Option<String>,
    pub quantity: i32,
    pub unit_price: BigDecimal,
}

impl NewOrderItemRow {
    pub fn new(order_id: Uuid, item: &NewOrderItem) -> Self {
        Self {
            id: Uuid::new_v4(),
            order_id,
            product_id: item.product_id,
            product_name: item.product_name.clone(),
            image_url: item.image_url.clone(),
            quantity: item.quantity,
            unit_price: item.unit_price.clone(),
        }
    }
}

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = contact_messages)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct ContactMessageRow {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub message: String,
    pub created_at: DateTime<Utc>,
}

impl From<ContactMessageRow> for ContactMessage {
    fn from(r: ContactMessageRow) -> Self {
        ContactMessage {
            id: r.id,
            name: r.name,
            email: r.email,
            message: r.message,
            created_at: r.created_at,
        }
    }
}

#[derive(Debug, Insertable)]
#[diesel(table_name = contact_messages)]
pub struct NewContactMessageRow {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub message: String,
}

impl From<NewContactMessage> for NewContactMessageRow {
    fn from(m: NewContactMessage) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: m.name,
            email: m.email,
            message: m.message,
        }
    }
}
