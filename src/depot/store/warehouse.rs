use super::inventory::Inventory;
use super::order_book::OrderBook;
use super::{DataFile, StorageBackend};
use crate::codec::{self, MalformedLine, Parsed};
use crate::error::{DepotError, Result};
use crate::model::{Credential, LockoutState, Order, OrderLine, Role};
use chrono::{DateTime, Utc};
use std::collections::{BTreeMap, HashMap};
use tracing::{debug, info, warn};

/// What happened while loading the data files.
#[derive(Debug, Default)]
pub struct LoadReport {
    pub products: usize,
    pub orders: usize,
    pub skipped: Vec<(DataFile, MalformedLine)>,
    pub duplicate_products: Vec<String>,
}

impl LoadReport {
    pub fn is_clean(&self) -> bool {
        self.skipped.is_empty() && self.duplicate_products.is_empty()
    }
}

/// The session state: products and orders held in memory over a storage backend.
///
/// Every UI handler receives the warehouse explicitly; there is no global state.
pub struct Warehouse<B: StorageBackend> {
    backend: B,
    inventory: Inventory,
    orders: OrderBook,
    dirty: bool,
}

impl<B: StorageBackend> Warehouse<B> {
    /// An empty warehouse that has not read anything from `backend`.
    pub fn with_backend(backend: B) -> Self {
        Self {
            backend,
            inventory: Inventory::new(),
            orders: OrderBook::new(),
            dirty: false,
        }
    }

    /// Loads products and orders from `backend`, skipping malformed records.
    pub fn open(backend: B) -> Result<(Self, LoadReport)> {
        let mut report = LoadReport::default();

        let products = read_parsed(&backend, DataFile::Inventory, codec::parse_products)?;
        let orders = read_parsed(&backend, DataFile::Orders, codec::parse_orders)?;

        report.skipped.extend(
            products
                .skipped
                .into_iter()
                .map(|m| (DataFile::Inventory, m)),
        );
        report
            .skipped
            .extend(orders.skipped.into_iter().map(|m| (DataFile::Orders, m)));

        let (inventory, duplicates) = Inventory::from_records(products.records);
        for id in &duplicates {
            warn!(product_id = %id, "duplicate product id in inventory file, keeping the first");
        }
        report.duplicate_products = duplicates;
        report.products = inventory.len();
        report.orders = orders.records.len();

        info!(
            products = report.products,
            orders = report.orders,
            skipped = report.skipped.len(),
            "warehouse loaded"
        );

        let warehouse = Self {
            backend,
            inventory,
            orders: OrderBook::from_records(orders.records),
            dirty: false,
        };
        Ok((warehouse, report))
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn inventory(&self) -> &Inventory {
        &self.inventory
    }

    /// Mutable access marks the warehouse as having unsaved changes.
    pub fn inventory_mut(&mut self) -> &mut Inventory {
        self.dirty = true;
        &mut self.inventory
    }

    pub fn orders(&self) -> &OrderBook {
        &self.orders
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Validates every line against current stock, then records the order and
    /// decrements stock together. Nothing changes if any line is rejected.
    pub fn place_order(&mut self, lines: Vec<OrderLine>, now: DateTime<Utc>) -> Result<Order> {
        if lines.is_empty() {
            return Err(DepotError::InvalidInput("an order needs at least one item".into()));
        }

        let mut requested: BTreeMap<&str, u32> = BTreeMap::new();
        for line in &lines {
            if line.quantity == 0 {
                return Err(DepotError::InvalidInput(format!(
                    "quantity for {} must be at least 1",
                    line.product_id
                )));
            }
            let product = self.inventory.get(&line.product_id)?;
            let total = requested.entry(product.id.as_str()).or_insert(0);
            *total = total.saturating_add(line.quantity);
            if *total > product.quantity {
                return Err(DepotError::InsufficientStock {
                    product_id: product.id.clone(),
                    requested: *total,
                    available: product.quantity,
                });
            }
        }

        for line in &lines {
            self.inventory.take_stock(&line.product_id, line.quantity)?;
        }

        let order = Order {
            id: self.orders.next_order_id(),
            created_at: now,
            lines,
        };
        debug!(order_id = %order.id, lines = order.lines.len(), "order placed");
        self.orders.push(order.clone());
        self.dirty = true;
        Ok(order)
    }

    /// Writes both collections back in full.
    pub fn save(&mut self) -> Result<()> {
        self.backend.write(
            DataFile::Inventory,
            &codec::format_products(self.inventory.list()),
        )?;
        self.backend
            .write(DataFile::Orders, &codec::format_orders(self.orders.list()))?;
        self.dirty = false;
        info!(
            products = self.inventory.len(),
            orders = self.orders.len(),
            "warehouse saved"
        );
        Ok(())
    }

    pub fn describe(&self, file: DataFile) -> String {
        self.backend.describe(file)
    }

    // --- Credentials & lockouts ---

    pub fn credentials(&self, role: Role) -> Result<Parsed<Credential>> {
        let file = DataFile::Credentials(role);
        let parsed = read_parsed(&self.backend, file, codec::parse_credentials)?;
        for bad in &parsed.skipped {
            warn!(file = %self.backend.describe(file), "skipping credential {}", bad);
        }
        Ok(parsed)
    }

    pub fn append_credential(&self, role: Role, credential: &Credential) -> Result<()> {
        self.backend.append_line(
            DataFile::Credentials(role),
            &codec::format_credential(credential),
        )
    }

    pub fn load_lockouts(&self) -> Result<HashMap<String, LockoutState>> {
        match self.backend.read(DataFile::Lockouts)? {
            Some(text) if !text.trim().is_empty() => Ok(serde_json::from_str(&text)?),
            _ => Ok(HashMap::new()),
        }
    }

    pub fn save_lockouts(&self, lockouts: &HashMap<String, LockoutState>) -> Result<()> {
        let content = serde_json::to_string_pretty(lockouts)?;
        self.backend.write(DataFile::Lockouts, &content)
    }
}

fn read_parsed<B: StorageBackend, T>(
    backend: &B,
    file: DataFile,
    parse: fn(&str) -> Parsed<T>,
) -> Result<Parsed<T>> {
    let parsed = match backend.read(file)? {
        Some(text) => parse(&text),
        None => {
            debug!(file = %backend.describe(file), "data file missing, starting empty");
            Parsed::default()
        }
    };
    for bad in &parsed.skipped {
        warn!(file = %backend.describe(file), "skipping malformed record {}", bad);
    }
    Ok(parsed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Product;
    use crate::store::mem_backend::MemBackend;
    use crate::store::memory::InMemoryWarehouse;

    fn stocked() -> InMemoryWarehouse {
        let mut wh = InMemoryWarehouse::new();
        wh.inventory_mut()
            .add(Product::new("P1", "Widget", 10, 2.5))
            .unwrap();
        wh.inventory_mut()
            .add(Product::new("P2", "Gadget", 2, 8.0))
            .unwrap();
        wh
    }

    #[test]
    fn placing_an_order_decrements_stock() {
        let mut wh = stocked();
        let order = wh
            .place_order(vec![OrderLine::new("P1", 3)], Utc::now())
            .unwrap();
        assert_eq!(order.id, "O1");
        assert_eq!(wh.inventory().get("P1").unwrap().quantity, 7);
        assert_eq!(wh.orders().len(), 1);
    }

    #[test]
    fn insufficient_stock_changes_nothing() {
        let mut wh = stocked();
        let err = wh
            .place_order(
                vec![OrderLine::new("P1", 1), OrderLine::new("P2", 3)],
                Utc::now(),
            )
            .unwrap_err();
        assert!(matches!(err, DepotError::InsufficientStock { .. }));
        assert_eq!(wh.inventory().get("P1").unwrap().quantity, 10);
        assert_eq!(wh.inventory().get("P2").unwrap().quantity, 2);
        assert!(wh.orders().is_empty());
    }

    #[test]
    fn repeated_lines_count_against_the_same_stock() {
        let mut wh = stocked();
        let result = wh.place_order(
            vec![OrderLine::new("P2", 2), OrderLine::new("P2", 1)],
            Utc::now(),
        );
        assert!(matches!(
            result,
            Err(DepotError::InsufficientStock {
                requested: 3,
                available: 2,
                ..
            })
        ));
        assert_eq!(wh.inventory().get("P2").unwrap().quantity, 2);
    }

    #[test]
    fn unknown_product_is_rejected_and_not_persisted() {
        let mut wh = stocked();
        let result = wh.place_order(
            vec![OrderLine::new("P1", 1), OrderLine::new("NOPE", 1)],
            Utc::now(),
        );
        assert!(matches!(result, Err(DepotError::ProductNotFound(id)) if id == "NOPE"));
        wh.save().unwrap();
        let orders = wh.backend().contents(DataFile::Orders).unwrap();
        assert!(!orders.contains("NOPE"));
        assert!(orders.is_empty());
    }

    #[test]
    fn empty_and_zero_quantity_orders_are_rejected() {
        let mut wh = stocked();
        assert!(wh.place_order(vec![], Utc::now()).is_err());
        assert!(wh
            .place_order(vec![OrderLine::new("P1", 0)], Utc::now())
            .is_err());
        assert!(wh.orders().is_empty());
    }

    #[test]
    fn save_then_open_round_trips() {
        let mut wh = stocked();
        wh.place_order(vec![OrderLine::new("P2", 2)], Utc::now())
            .unwrap();
        wh.save().unwrap();
        assert!(!wh.is_dirty());

        let inventory = wh.backend().contents(DataFile::Inventory).unwrap();
        let orders = wh.backend().contents(DataFile::Orders).unwrap();
        let backend = MemBackend::new()
            .with_file(DataFile::Inventory, &inventory)
            .with_file(DataFile::Orders, &orders);

        let (reopened, report) = Warehouse::open(backend).unwrap();
        assert!(report.is_clean());
        assert_eq!(reopened.inventory(), wh.inventory());
        assert_eq!(reopened.orders().len(), 1);
        assert_eq!(reopened.orders().list()[0].lines, vec![OrderLine::new("P2", 2)]);
        // Epoch seconds are what is persisted
        assert_eq!(
            reopened.orders().list()[0].created_at.timestamp(),
            wh.orders().list()[0].created_at.timestamp()
        );
    }

    #[test]
    fn open_reports_malformed_records() {
        let backend = MemBackend::new()
            .with_file(DataFile::Inventory, "P1,Widget,10,2.5\nP2,Bad,many,1\nP1,Again,1,1\n")
            .with_file(DataFile::Orders, "O1,notatime|P1,1\n");
        let (wh, report) = Warehouse::open(backend).unwrap();
        assert_eq!(wh.inventory().len(), 1);
        assert!(wh.orders().is_empty());
        assert_eq!(report.skipped.len(), 2);
        assert_eq!(report.skipped[0].0, DataFile::Inventory);
        assert_eq!(report.skipped[1].0, DataFile::Orders);
        assert_eq!(report.duplicate_products, vec!["P1".to_string()]);
        assert!(!report.is_clean());
    }

    #[test]
    fn failed_save_keeps_changes_unsaved() {
        let mut wh = stocked();
        wh.backend().set_simulate_write_error(true);
        assert!(wh.save().is_err());
        assert!(wh.is_dirty());
    }

    #[test]
    fn lockouts_round_trip() {
        let wh = InMemoryWarehouse::new();
        assert!(wh.load_lockouts().unwrap().is_empty());

        let mut map = HashMap::new();
        map.insert(
            "admin:root".to_string(),
            LockoutState {
                failed_attempts: 2,
                locked_until: None,
                last_failure: DateTime::from_timestamp(1_700_000_000, 0),
            },
        );
        wh.save_lockouts(&map).unwrap();
        assert_eq!(wh.load_lockouts().unwrap(), map);
    }
}
