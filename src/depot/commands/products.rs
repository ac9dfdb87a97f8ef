use crate::commands::{CmdMessage, CmdResult};
use crate::error::{DepotError, Result};
use crate::model::{Product, ProductUpdate};
use crate::store::warehouse::Warehouse;
use crate::store::StorageBackend;
use tracing::debug;

pub fn add<B: StorageBackend>(warehouse: &mut Warehouse<B>, product: Product) -> Result<CmdResult> {
    let product = Product {
        id: product.id.trim().to_string(),
        name: product.name.trim().to_string(),
        ..product
    };
    warehouse.inventory_mut().add(product.clone())?;
    debug!(product_id = %product.id, "product added");

    let mut result = CmdResult::default();
    result.add_message(CmdMessage::success(format!(
        "Product added: {} ({})",
        product.name, product.id
    )));
    Ok(result.with_affected_products(vec![product]))
}

pub fn update<B: StorageBackend>(
    warehouse: &mut Warehouse<B>,
    id: &str,
    update: &ProductUpdate,
) -> Result<CmdResult> {
    if update.is_empty() {
        return Err(DepotError::InvalidInput(
            "nothing to update: give a new name, quantity or price".into(),
        ));
    }
    // Checked up front so an unknown id does not mark the warehouse dirty
    warehouse.inventory().get(id)?;
    let product = warehouse.inventory_mut().update(id, update)?.clone();
    debug!(product_id = %product.id, "product updated");

    let mut result = CmdResult::default();
    result.add_message(CmdMessage::success(format!(
        "Product updated: {} ({}), {} in stock at {:.2}",
        product.name, product.id, product.quantity, product.price
    )));
    Ok(result.with_affected_products(vec![product]))
}

pub fn remove<B: StorageBackend>(warehouse: &mut Warehouse<B>, id: &str) -> Result<CmdResult> {
    warehouse.inventory().get(id)?;
    let product = warehouse.inventory_mut().remove(id)?;
    debug!(product_id = %product.id, "product removed");

    let mut result = CmdResult::default();
    result.add_message(CmdMessage::success(format!(
        "Product removed: {} ({})",
        product.name, product.id
    )));
    Ok(result.with_affected_products(vec![product]))
}

pub fn list<B: StorageBackend>(warehouse: &Warehouse<B>) -> Result<CmdResult> {
    let products = warehouse.inventory().list().to_vec();
    let mut result = CmdResult::default();
    if products.is_empty() {
        result.add_message(CmdMessage::info("Inventory is empty."));
    }
    Ok(result.with_listed_products(products))
}

pub fn search<B: StorageBackend>(warehouse: &Warehouse<B>, term: &str) -> Result<CmdResult> {
    let term = term.trim();
    if term.is_empty() {
        return Err(DepotError::InvalidInput("search term cannot be empty".into()));
    }
    let products: Vec<Product> = warehouse
        .inventory()
        .search(term)
        .into_iter()
        .cloned()
        .collect();

    let mut result = CmdResult::default();
    if products.is_empty() {
        result.add_message(CmdMessage::info(format!("No products match '{}'.", term)));
    }
    Ok(result.with_listed_products(products))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::MessageLevel;
    use crate::store::memory::fixtures::WarehouseFixture;
    use crate::store::mem_backend::MemBackend;
    use crate::store::memory::InMemoryWarehouse;
    use crate::store::DataFile;

    #[test]
    fn adds_trimmed_product() {
        let mut wh = InMemoryWarehouse::new();
        let result = add(&mut wh, Product::new(" P1 ", " Widget ", 10, 2.5)).unwrap();
        assert_eq!(result.affected_products[0].id, "P1");
        assert_eq!(wh.inventory().get("P1").unwrap().name, "Widget");
        assert!(matches!(result.messages[0].level, MessageLevel::Success));
    }

    #[test]
    fn rejects_duplicate_id() {
        let mut wh = WarehouseFixture::new().with_products(1).build();
        let err = add(&mut wh, Product::new("P1", "Other", 1, 1.0)).unwrap_err();
        assert!(matches!(err, DepotError::DuplicateProduct(id) if id == "P1"));
        assert_eq!(wh.inventory().len(), 1);
    }

    #[test]
    fn rejects_delimiters_in_names() {
        let mut wh = InMemoryWarehouse::new();
        assert!(add(&mut wh, Product::new("P1", "Nuts, bolts", 1, 1.0)).is_err());
        assert!(add(&mut wh, Product::new("P|2", "Pipe", 1, 1.0)).is_err());
        assert!(wh.inventory().is_empty());
    }

    #[test]
    fn saved_products_survive_reload() {
        let mut wh = InMemoryWarehouse::new();
        assert!(add(&mut wh, Product::new("P1", "Wid\nget", 10, 2.5)).is_err());
        add(&mut wh, Product::new("P2", " Gadget ", 3, 1.0)).unwrap();
        wh.save().unwrap();

        let text = wh.backend().contents(DataFile::Inventory).unwrap();
        let (reloaded, report) =
            Warehouse::open(MemBackend::new().with_file(DataFile::Inventory, &text)).unwrap();
        assert!(report.is_clean());
        assert_eq!(reloaded.inventory().list(), wh.inventory().list());
    }

    #[test]
    fn updates_selected_fields() {
        let mut wh = WarehouseFixture::new()
            .with_product("P1", "Widget", 10, 2.5)
            .build();
        update(&mut wh, "P1", &ProductUpdate::default().quantity(4).price(3.0)).unwrap();
        let product = wh.inventory().get("P1").unwrap();
        assert_eq!(product.name, "Widget");
        assert_eq!(product.quantity, 4);
        assert_eq!(product.price, 3.0);
    }

    #[test]
    fn update_unknown_or_empty_fails_cleanly() {
        let mut wh = WarehouseFixture::new().with_products(1).build();
        wh.save().unwrap();

        let err = update(&mut wh, "NOPE", &ProductUpdate::default().quantity(1)).unwrap_err();
        assert!(matches!(err, DepotError::ProductNotFound(_)));
        assert!(update(&mut wh, "P1", &ProductUpdate::default()).is_err());
        assert!(!wh.is_dirty());
    }

    #[test]
    fn removes_product() {
        let mut wh = WarehouseFixture::new().with_products(2).build();
        let result = remove(&mut wh, "P1").unwrap();
        assert_eq!(result.affected_products[0].id, "P1");
        assert!(!wh.inventory().contains("P1"));
        assert!(matches!(
            remove(&mut wh, "P1"),
            Err(DepotError::ProductNotFound(_))
        ));
    }

    #[test]
    fn lists_in_insertion_order() {
        let wh = WarehouseFixture::new()
            .with_product("B", "Bolt", 1, 0.1)
            .with_product("A", "Anchor", 1, 5.0)
            .build();
        let result = list(&wh).unwrap();
        let ids: Vec<_> = result.listed_products.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, vec!["B", "A"]);
        assert!(result.messages.is_empty());

        let empty = list(&InMemoryWarehouse::new()).unwrap();
        assert!(empty.listed_products.is_empty());
        assert_eq!(empty.messages.len(), 1);
    }

    #[test]
    fn searches_by_id_and_name() {
        let wh = WarehouseFixture::new()
            .with_product("P1", "Widget", 1, 1.0)
            .with_product("P2", "Widget Pro", 1, 1.0)
            .with_product("P3", "Gadget", 1, 1.0)
            .build();

        let by_id = search(&wh, "P3").unwrap();
        assert_eq!(by_id.listed_products[0].name, "Gadget");

        let by_name = search(&wh, "widget").unwrap();
        let ids: Vec<_> = by_name.listed_products.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, vec!["P1", "P2"]);

        let none = search(&wh, "sprocket").unwrap();
        assert!(none.listed_products.is_empty());
        assert_eq!(none.messages.len(), 1);

        assert!(search(&wh, "  ").is_err());
    }
}
