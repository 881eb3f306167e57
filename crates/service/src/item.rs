//! Item catalog maintenance.

use domain::{Item, ItemId};
use store::ShopStore;

use crate::error::ServiceError;

/// Service for managing the item catalog.
pub struct ItemService<S: ShopStore> {
    store: S,
}

impl<S: ShopStore> ItemService<S> {
    /// Creates a new item service over the given store.
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Adds an item to the catalog.
    #[tracing::instrument(skip(self, item), fields(name = %item.name))]
    pub async fn save_item(&self, item: Item) -> Result<ItemId, ServiceError> {
        self.store.insert_item(&item).await?;
        Ok(item.id)
    }

    /// Loads an item by ID.
    #[tracing::instrument(skip(self))]
    pub async fn item(&self, id: ItemId) -> Result<Item, ServiceError> {
        self.store
            .item(id)
            .await?
            .ok_or(ServiceError::ItemNotFound(id))
    }

    /// Lists all catalog items.
    #[tracing::instrument(skip(self))]
    pub async fn items(&self) -> Result<Vec<Item>, ServiceError> {
        Ok(self.store.items().await?)
    }

    /// Updates an item's catalog fields: load, change, write back.
    #[tracing::instrument(skip(self, name))]
    pub async fn update_item(
        &self,
        id: ItemId,
        name: &str,
        price: i64,
        stock_quantity: u32,
    ) -> Result<(), ServiceError> {
        let mut item = self.item(id).await?;
        item.change(name, price, stock_quantity);
        self.store.update_item(&item).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use store::MemoryStore;

    fn book() -> Item {
        Item::book("Book One", 10_000, 100, "Jane Doe", "9780000000001")
    }

    #[tokio::test]
    async fn save_and_load_item() {
        let store = MemoryStore::new();
        let service = ItemService::new(store);

        let id = service.save_item(book()).await.unwrap();
        let loaded = service.item(id).await.unwrap();
        assert_eq!(loaded.name, "Book One");
        assert_eq!(loaded.stock_quantity, 100);
    }

    #[tokio::test]
    async fn update_item_changes_catalog_fields() {
        let store = MemoryStore::new();
        let service = ItemService::new(store);

        let id = service.save_item(book()).await.unwrap();
        service
            .update_item(id, "Book One (2nd ed.)", 12_000, 80)
            .await
            .unwrap();

        let loaded = service.item(id).await.unwrap();
        assert_eq!(loaded.name, "Book One (2nd ed.)");
        assert_eq!(loaded.price, 12_000);
        assert_eq!(loaded.stock_quantity, 80);
    }

    #[tokio::test]
    async fn update_item_fails_for_unknown_item() {
        let store = MemoryStore::new();
        let service = ItemService::new(store);

        let err = service
            .update_item(ItemId::new(), "Book", 1, 1)
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::ItemNotFound(_)));
    }
}
