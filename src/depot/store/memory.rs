use super::mem_backend::MemBackend;
use super::warehouse::Warehouse;

pub type InMemoryWarehouse = Warehouse<MemBackend>;

impl Default for InMemoryWarehouse {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryWarehouse {
    pub fn new() -> Self {
        Warehouse::with_backend(MemBackend::new())
    }
}

// --- Test Fixtures ---

#[cfg(any(test, feature = "test_utils"))]
pub mod fixtures {
    use super::*;
    use crate::model::{OrderLine, Product};
    use chrono::{DateTime, Utc};

    pub struct WarehouseFixture {
        pub warehouse: InMemoryWarehouse,
    }

    impl Default for WarehouseFixture {
        fn default() -> Self {
            Self::new()
        }
    }

    impl WarehouseFixture {
        pub fn new() -> Self {
            Self {
                warehouse: InMemoryWarehouse::new(),
            }
        }

        pub fn with_product(mut self, id: &str, name: &str, quantity: u32, price: f64) -> Self {
            self.warehouse
                .inventory_mut()
                .add(Product::new(id, name, quantity, price))
                .unwrap();
            self
        }

        /// Generic stock: `P1..=Pn` named `Item n`, 100 units at n dollars each.
        pub fn with_products(mut self, count: usize) -> Self {
            for i in 1..=count {
                self = self.with_product(&format!("P{}", i), &format!("Item {}", i), 100, i as f64);
            }
            self
        }

        pub fn with_order_at(mut self, at: DateTime<Utc>, lines: &[(&str, u32)]) -> Self {
            let lines = lines
                .iter()
                .map(|(id, qty)| OrderLine::new(*id, *qty))
                .collect();
            self.warehouse.place_order(lines, at).unwrap();
            self
        }

        pub fn with_order(self, lines: &[(&str, u32)]) -> Self {
            self.with_order_at(Utc::now(), lines)
        }

        pub fn build(self) -> InMemoryWarehouse {
            self.warehouse
        }
    }
}

#[cfg(test)]
mod tests {
    use super::fixtures::WarehouseFixture;

    #[test]
    fn test_fixtures_coverage() {
        let wh = WarehouseFixture::default()
            .with_products(2)
            .with_product("W1", "Widget", 5, 2.5)
            .with_order(&[("W1", 2), ("P1", 1)])
            .build();

        assert_eq!(wh.inventory().len(), 3);
        assert_eq!(wh.inventory().get("W1").unwrap().quantity, 3);
        assert_eq!(wh.inventory().get("P1").unwrap().quantity, 99);
        assert_eq!(wh.inventory().get("P2").unwrap().price, 2.0);
        assert_eq!(wh.orders().len(), 1);
        assert!(wh.is_dirty());
    }
}
