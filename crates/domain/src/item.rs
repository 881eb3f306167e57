//! Catalog items with checked stock arithmetic.

use serde::{Deserialize, Serialize};

use crate::error::DomainError;
use crate::ids::ItemId;

/// Kind-specific fields of an item.
///
/// Maps the single-table item hierarchy of the source data model; books are
/// the only variant the catalog currently sells.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ItemDetails {
    Book { author: String, isbn: String },
}

/// A sellable catalog item.
///
/// `stock_quantity` is a `u32`, so negative stock is unrepresentable;
/// `remove_stock` is the only way a decrement happens and it is checked.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    pub id: ItemId,
    pub name: String,
    /// Unit price in the smallest currency unit.
    pub price: i64,
    pub stock_quantity: u32,
    pub details: ItemDetails,
}

impl Item {
    /// Creates a new book with a fresh ID.
    pub fn book(
        name: impl Into<String>,
        price: i64,
        stock_quantity: u32,
        author: impl Into<String>,
        isbn: impl Into<String>,
    ) -> Self {
        Self {
            id: ItemId::new(),
            name: name.into(),
            price,
            stock_quantity,
            details: ItemDetails::Book {
                author: author.into(),
                isbn: isbn.into(),
            },
        }
    }

    /// Puts `quantity` units back into stock. Inverse of [`Item::remove_stock`].
    pub fn add_stock(&mut self, quantity: u32) {
        self.stock_quantity += quantity;
    }

    /// Takes `quantity` units out of stock.
    ///
    /// Fails with [`DomainError::InsufficientStock`] when fewer units are
    /// left than requested; the item is untouched in that case.
    pub fn remove_stock(&mut self, quantity: u32) -> Result<(), DomainError> {
        match self.stock_quantity.checked_sub(quantity) {
            Some(rest) => {
                self.stock_quantity = rest;
                Ok(())
            }
            None => Err(DomainError::InsufficientStock {
                requested: quantity,
                available: self.stock_quantity,
            }),
        }
    }

    /// Applies a catalog update to the loaded item.
    ///
    /// The modified item still has to be written back through the store;
    /// there is no change tracking.
    pub fn change(&mut self, name: impl Into<String>, price: i64, stock_quantity: u32) {
        self.name = name.into();
        self.price = price;
        self.stock_quantity = stock_quantity;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn book() -> Item {
        Item::book("Book One", 10_000, 10, "Jane Doe", "9780000000001")
    }

    #[test]
    fn remove_stock_decrements() {
        let mut item = book();
        item.remove_stock(3).unwrap();
        assert_eq!(item.stock_quantity, 7);
    }

    #[test]
    fn remove_stock_fails_beyond_available() {
        let mut item = book();
        let err = item.remove_stock(11).unwrap_err();
        assert!(matches!(
            err,
            DomainError::InsufficientStock {
                requested: 11,
                available: 10
            }
        ));
        // the failed call must not touch the item
        assert_eq!(item.stock_quantity, 10);
    }

    #[test]
    fn remove_stock_allows_exact_drain() {
        let mut item = book();
        item.remove_stock(10).unwrap();
        assert_eq!(item.stock_quantity, 0);
        assert!(item.remove_stock(1).is_err());
    }

    #[test]
    fn add_stock_restores() {
        let mut item = book();
        item.remove_stock(4).unwrap();
        item.add_stock(4);
        assert_eq!(item.stock_quantity, 10);
    }

    #[test]
    fn change_updates_catalog_fields() {
        let mut item = book();
        item.change("Book One (2nd ed.)", 12_000, 50);
        assert_eq!(item.name, "Book One (2nd ed.)");
        assert_eq!(item.price, 12_000);
        assert_eq!(item.stock_quantity, 50);
        // kind-specific fields are not part of a catalog update
        assert!(matches!(item.details, ItemDetails::Book { .. }));
    }

    #[test]
    fn details_tagged_serialization() {
        let item = book();
        let json = serde_json::to_value(&item).unwrap();
        assert_eq!(json["details"]["type"], "book");
        assert_eq!(json["details"]["author"], "Jane Doe");
    }
}
