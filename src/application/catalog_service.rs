use std::sync::Arc;

use uuid::Uuid;

use crate::domain::errors::DomainError;
use crate::domain::ports::Store;
use crate::domain::product::{Product, ProductDraft};

pub struct CatalogService<S: ?Sized> {
    store: Arc<S>,
}

impl<S: Store + ?Sized> CatalogService<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    pub fn list_products(&self) -> Result<Vec<Product>, DomainError> {
        self.store.list_products()
    }

    pub fn get_product(&self, id: Uuid) -> Result<Product, DomainError> {
        self.store
            .get_product(id)?
            .ok_or(DomainError::ProductNotFound(id))
    }

    pub fn create_product(&self, draft: ProductDraft) -> Result<Product, DomainError> {
        let product = self.store.insert_product(draft.validate()?)?;
        log::info!("Product {} '{}' created", product.id, product.name);
        Ok(product)
    }

    pub fn update_product(&self, id: Uuid, draft: ProductDraft) -> Result<Product, DomainError> {
        self.store
            .update_product(id, draft.validate()?)?
            .ok_or(DomainError::ProductNotFound(id))
    }

    /// Order history keeps its own name and price snapshot, so deletion is
    /// always allowed.
    pub fn delete_product(&self, id: Uuid) -> Result<(), DomainError> {
        if self.store.delete_product(id)? {
            log::info!("Product {} deleted", id);
            Ok(())
        } else {
            Err(DomainError::ProductNotFound(id))
        }
    }
}

#[cfg(test)]
mod tests {
    use bigdecimal::BigDecimal;

    use super::*;
    use crate::infrastructure::memory_store::InMemoryStore;

    fn draft(name: &str, stock: i32) -> ProductDraft {
        ProductDraft {
            name: name.to_string(),
            description: Some("Grifo con ahorro de agua".to_string()),
            price: BigDecimal::from(25000),
            stock,
            category: Some("Cocina".to_string()),
            image_url: None,
        }
    }

    #[test]
    fn create_update_delete_cycle() {
        let catalog = CatalogService::new(Arc::new(InMemoryStore::new()));

        let created = catalog.create_product(draft(" Grifo ", 15)).unwrap();
        assert_eq!(created.name, "Grifo");

        let mut change = draft("Grifo Premium", 20);
        change.description = None;
        let updated = catalog.update_product(created.id, change).unwrap();
        assert_eq!(updated.name, "Grifo Premium");
        assert_eq!(updated.stock, 20);
        assert!(updated.description.is_none());

        catalog.delete_product(created.id).unwrap();
        assert!(matches!(
            catalog.get_product(created.id),
            Err(DomainError::ProductNotFound(_))
        ));
    }

    #[test]
    fn invalid_draft_is_not_stored() {
        let store = Arc::new(InMemoryStore::new());
        let catalog = CatalogService::new(store.clone());

        assert!(matches!(
            catalog.create_product(draft("", 1)),
            Err(DomainError::Validation(_))
        ));
        assert!(store.list_products().unwrap().is_empty());
    }

    #[test]
    fn unknown_ids_are_not_found() {
        let catalog = CatalogService::new(Arc::new(InMemoryStore::new()));
        let id = Uuid::new_v4();

        assert!(matches!(
            catalog.update_product(id, draft("x", 1)),
            Err(DomainError::ProductNotFound(_))
        ));
        assert!(matches!(
            catalog.delete_product(id),
            Err(DomainError::ProductNotFound(_))
        ));
    }
}
