use std::sync::Arc;

use crate::domain::contact::{ContactMessage, NewContactMessage};
use crate::domain::errors::DomainError;
use crate::domain::ports::Store;

pub struct ContactService<S: ?Sized> {
    store: Arc<S>,
}

impl<S: Store + ?Sized> ContactService<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    pub fn submit(&self, msg: NewContactMessage) -> Result<ContactMessage, DomainError> {
        let stored = self.store.insert_contact(msg.validate()?)?;
        log::info!("Contact message {} from {}", stored.id, stored.email);
        Ok(stored)
    }
}
