use crate::domain::{ItemRef, LibraryItem};
use crate::ports::item_catalog::{ItemCatalog as ItemCatalogTrait, Result};
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::{Mutex, PoisonError};

/// In-memory item catalog
///
/// Items are keyed by (type, identifier), so a book and a CD may share an identifier.
#[derive(Default)]
pub struct ItemCatalog {
    items: Mutex<BTreeMap<ItemRef, LibraryItem>>,
}

impl ItemCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a catalog from a list of items
    pub fn with_items(items: impl IntoIterator<Item = LibraryItem>) -> Self {
        let catalog = Self::new();
        for item in items {
            catalog.add_item(item);
        }
        catalog
    }

    /// Add or replace an item
    pub fn add_item(&self, item: LibraryItem) {
        self.items
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(item.item_ref(), item);
    }

    /// All items ordered by type, then identifier
    pub fn items(&self) -> Vec<LibraryItem> {
        self.items
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .values()
            .cloned()
            .collect()
    }
}

#[async_trait]
impl ItemCatalogTrait for ItemCatalog {
    async fn get(&self, item: &ItemRef) -> Result<Option<LibraryItem>> {
        let items = self.items.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(items.get(item).cloned())
    }

    async fn set_availability(&self, item: &ItemRef, available: bool) -> Result<bool> {
        let mut items = self.items.lock().unwrap_or_else(PoisonError::into_inner);
        match items.get_mut(item) {
            Some(entry) => {
                entry.available = available;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn reserve(&self, item: &ItemRef) -> Result<bool> {
        let mut items = self.items.lock().unwrap_or_else(PoisonError::into_inner);
        match items.get_mut(item) {
            Some(entry) if entry.available => {
                entry.available = false;
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn register(&self, item: &LibraryItem) -> Result<bool> {
        let mut items = self.items.lock().unwrap_or_else(PoisonError::into_inner);
        let key = item.item_ref();
        if items.contains_key(&key) {
            return Ok(false);
        }
        items.insert(key, item.clone());
        Ok(true)
    }

    async fn list(&self) -> Result<Vec<LibraryItem>> {
        Ok(self.items())
    }
}
