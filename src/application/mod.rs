pub mod catalog_service;
pub mod contact_service;
pub mod order_builder;
pub mod order_service;
pub mod payment_reconciler;
