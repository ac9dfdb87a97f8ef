use crate::error::{DepotError, Result};
use crate::model::{Product, ProductUpdate};

/// Products on hand, in insertion order.
///
/// Linear scans throughout; a console warehouse holds tens of products, not millions.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Inventory {
    products: Vec<Product>,
}

impl Inventory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds an inventory from loaded records, keeping the first of any duplicate ids.
    /// Returns the ids that were dropped.
    pub fn from_records(records: Vec<Product>) -> (Self, Vec<String>) {
        let mut inventory = Self::new();
        let mut dropped = Vec::new();
        for product in records {
            if inventory.contains(&product.id) {
                dropped.push(product.id);
            } else {
                inventory.products.push(product);
            }
        }
        (inventory, dropped)
    }

    pub fn list(&self) -> &[Product] {
        &self.products
    }

    pub fn len(&self) -> usize {
        self.products.len()
    }

    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.find(id).is_some()
    }

    pub fn find(&self, id: &str) -> Option<&Product> {
        self.products.iter().find(|p| p.id == id)
    }

    pub fn get(&self, id: &str) -> Result<&Product> {
        self.find(id)
            .ok_or_else(|| DepotError::ProductNotFound(id.to_string()))
    }

    fn get_mut(&mut self, id: &str) -> Result<&mut Product> {
        self.products
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or_else(|| DepotError::ProductNotFound(id.to_string()))
    }

    /// Adds `product` with its id and name trimmed.
    pub fn add(&mut self, mut product: Product) -> Result<()> {
        product.id = product.id.trim().to_string();
        product.name = product.name.trim().to_string();
        product.validate()?;
        if self.contains(&product.id) {
            return Err(DepotError::DuplicateProduct(product.id));
        }
        self.products.push(product);
        Ok(())
    }

    /// Applies every field of `update` or none of them.
    pub fn update(&mut self, id: &str, update: &ProductUpdate) -> Result<&Product> {
        let product = self.get_mut(id)?;
        let mut changed = product.clone();
        if let Some(name) = &update.name {
            changed.name = name.trim().to_string();
        }
        if let Some(quantity) = update.quantity {
            changed.quantity = quantity;
        }
        if let Some(price) = update.price {
            changed.price = price;
        }
        changed.validate()?;
        *product = changed;
        Ok(&*product)
    }

    pub fn remove(&mut self, id: &str) -> Result<Product> {
        let pos = self
            .products
            .iter()
            .position(|p| p.id == id)
            .ok_or_else(|| DepotError::ProductNotFound(id.to_string()))?;
        Ok(self.products.remove(pos))
    }

    /// Products matching `term` by exact id or by name (case-insensitive).
    ///
    /// Ranked: id match, exact name, then name containing the term.
    pub fn search(&self, term: &str) -> Vec<&Product> {
        let term = term.trim();
        let term_lower = term.to_lowercase();
        if term_lower.is_empty() {
            return Vec::new();
        }

        let mut matches: Vec<(&Product, u8)> = self
            .products
            .iter()
            .filter_map(|p| {
                let name_lower = p.name.to_lowercase();
                let score = if p.id == term {
                    1
                } else if name_lower == term_lower {
                    2
                } else if name_lower.contains(&term_lower) {
                    3
                } else {
                    return None;
                };
                Some((p, score))
            })
            .collect();

        // Stable sort keeps insertion order within a score
        matches.sort_by_key(|(_, score)| *score);
        matches.into_iter().map(|(p, _)| p).collect()
    }

    pub(crate) fn take_stock(&mut self, id: &str, quantity: u32) -> Result<()> {
        let product = self.get_mut(id)?;
        if product.quantity < quantity {
            return Err(DepotError::InsufficientStock {
                product_id: id.to_string(),
                requested: quantity,
                available: product.quantity,
            });
        }
        product.quantity -= quantity;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stocked() -> Inventory {
        let mut inv = Inventory::new();
        inv.add(Product::new("P1", "Widget", 10, 2.5)).unwrap();
        inv.add(Product::new("P2", "Widget Pro", 3, 9.0)).unwrap();
        inv.add(Product::new("P3", "Gadget", 0, 4.0)).unwrap();
        inv
    }

    #[test]
    fn add_rejects_duplicate_id() {
        let mut inv = stocked();
        let err = inv.add(Product::new("P1", "Other", 1, 1.0)).unwrap_err();
        assert!(matches!(err, DepotError::DuplicateProduct(id) if id == "P1"));
        assert_eq!(inv.len(), 3);
    }

    #[test]
    fn add_trims_and_rejects_line_breaks() {
        let mut inv = Inventory::new();
        inv.add(Product::new(" P1 ", " Widget ", 1, 1.0)).unwrap();
        assert_eq!(inv.get("P1").unwrap().name, "Widget");

        let err = inv.add(Product::new("P2", "Wid\nget", 1, 1.0)).unwrap_err();
        assert!(matches!(err, DepotError::InvalidInput(_)));
        assert_eq!(inv.len(), 1);
    }

    #[test]
    fn from_records_drops_later_duplicates() {
        let (inv, dropped) = Inventory::from_records(vec![
            Product::new("P1", "First", 1, 1.0),
            Product::new("P1", "Second", 2, 2.0),
        ]);
        assert_eq!(inv.len(), 1);
        assert_eq!(inv.get("P1").unwrap().name, "First");
        assert_eq!(dropped, vec!["P1".to_string()]);
    }

    #[test]
    fn update_changes_only_given_fields() {
        let mut inv = stocked();
        inv.update("P1", &ProductUpdate::default().price(3.0)).unwrap();
        let p = inv.get("P1").unwrap();
        assert_eq!(p.price, 3.0);
        assert_eq!(p.quantity, 10);
        assert_eq!(p.name, "Widget");
    }

    #[test]
    fn invalid_update_leaves_product_untouched() {
        let mut inv = stocked();
        let update = ProductUpdate::default().quantity(1).name("Bad,Name");
        assert!(inv.update("P1", &update).is_err());
        assert_eq!(inv.get("P1").unwrap().quantity, 10);
    }

    #[test]
    fn update_unknown_product() {
        let mut inv = stocked();
        let result = inv.update("P9", &ProductUpdate::default().quantity(1));
        assert!(matches!(result, Err(DepotError::ProductNotFound(_))));
    }

    #[test]
    fn remove_returns_product() {
        let mut inv = stocked();
        let removed = inv.remove("P2").unwrap();
        assert_eq!(removed.name, "Widget Pro");
        assert!(!inv.contains("P2"));
        assert!(inv.remove("P2").is_err());
    }

    #[test]
    fn search_ranks_id_then_exact_then_substring() {
        let inv = stocked();
        let names: Vec<_> = inv.search("widget").iter().map(|p| p.id.clone()).collect();
        assert_eq!(names, vec!["P1", "P2"]);

        let by_id = inv.search("P3");
        assert_eq!(by_id.len(), 1);
        assert_eq!(by_id[0].name, "Gadget");

        assert!(inv.search("  ").is_empty());
        assert!(inv.search("sprocket").is_empty());
    }

    #[test]
    fn take_stock_refuses_to_go_negative() {
        let mut inv = stocked();
        inv.take_stock("P2", 3).unwrap();
        assert_eq!(inv.get("P2").unwrap().quantity, 0);
        let err = inv.take_stock("P2", 1).unwrap_err();
        assert!(matches!(
            err,
            DepotError::InsufficientStock {
                requested: 1,
                available: 0,
                ..
            }
        ));
    }
}
