pub mod diesel_store;
pub mod memory_store;
pub mod mercadopago;
pub mod models;
pub mod notifier;
