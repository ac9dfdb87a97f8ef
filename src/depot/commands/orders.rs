use crate::commands::{CmdMessage, CmdResult};
use crate::error::{DepotError, Result};
use crate::model::{Order, OrderLine};
use crate::store::inventory::Inventory;
use crate::store::warehouse::Warehouse;
use crate::store::StorageBackend;
use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::info;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InvoiceLine {
    pub product_id: String,
    pub name: String,
    pub quantity: u32,
    pub unit_price: f64,
    pub line_total: f64,
}

/// Receipt for a placed order, priced at the unit prices in effect when it was placed.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Invoice {
    pub order_id: String,
    pub created_at: DateTime<Utc>,
    pub lines: Vec<InvoiceLine>,
    pub total: f64,
}

impl Invoice {
    fn for_order(order: &Order, inventory: &Inventory) -> Self {
        let lines: Vec<InvoiceLine> = order
            .lines
            .iter()
            .map(|line| {
                let (name, unit_price) = match inventory.find(&line.product_id) {
                    Some(p) => (p.name.clone(), p.price),
                    None => (line.product_id.clone(), 0.0),
                };
                InvoiceLine {
                    product_id: line.product_id.clone(),
                    name,
                    quantity: line.quantity,
                    unit_price,
                    line_total: unit_price * f64::from(line.quantity),
                }
            })
            .collect();
        let total = lines.iter().map(|l| l.line_total).sum();
        Self {
            order_id: order.id.clone(),
            created_at: order.created_at,
            lines,
            total,
        }
    }
}

/// One line of a stored order, joined against the current inventory.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OrderLineView {
    pub product_id: String,
    /// `None` once the product has been removed.
    pub name: Option<String>,
    pub quantity: u32,
    pub unit_price: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OrderView {
    pub id: String,
    pub created_at: DateTime<Utc>,
    pub lines: Vec<OrderLineView>,
    pub total_units: u64,
}

impl OrderView {
    fn new(order: &Order, inventory: &Inventory) -> Self {
        let lines = order
            .lines
            .iter()
            .map(|line| {
                let product = inventory.find(&line.product_id);
                OrderLineView {
                    product_id: line.product_id.clone(),
                    name: product.map(|p| p.name.clone()),
                    quantity: line.quantity,
                    unit_price: product.map(|p| p.price),
                }
            })
            .collect();
        Self {
            id: order.id.clone(),
            created_at: order.created_at,
            lines,
            total_units: order.total_units(),
        }
    }
}

/// An order being assembled one line at a time.
///
/// Each line is checked against what the inventory has left after the lines
/// already in the draft, so a rejected line can be reported and skipped while
/// the rest of the draft survives. Nothing is taken from stock until the draft
/// is placed.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DraftOrder {
    lines: Vec<OrderLine>,
}

impl DraftOrder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lines(&self) -> &[OrderLine] {
        &self.lines
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Units of `product_id` already claimed by this draft.
    pub fn claimed(&self, product_id: &str) -> u32 {
        self.lines
            .iter()
            .filter(|l| l.product_id == product_id)
            .fold(0u32, |acc, l| acc.saturating_add(l.quantity))
    }

    pub fn add_line(&mut self, inventory: &Inventory, line: OrderLine) -> Result<()> {
        if line.quantity == 0 {
            return Err(DepotError::InvalidInput(format!(
                "quantity for {} must be at least 1",
                line.product_id
            )));
        }
        let product = inventory.get(&line.product_id)?;
        let requested = self.claimed(&product.id).saturating_add(line.quantity);
        if requested > product.quantity {
            return Err(DepotError::InsufficientStock {
                product_id: product.id.clone(),
                requested,
                available: product.quantity,
            });
        }
        self.lines.push(line);
        Ok(())
    }

    pub fn into_lines(self) -> Vec<OrderLine> {
        self.lines
    }
}

pub fn place<B: StorageBackend>(
    warehouse: &mut Warehouse<B>,
    lines: Vec<OrderLine>,
    now: DateTime<Utc>,
) -> Result<CmdResult> {
    let order = warehouse.place_order(lines, now)?;
    let invoice = Invoice::for_order(&order, warehouse.inventory());
    info!(
        order_id = %order.id,
        units = order.total_units(),
        total = invoice.total,
        "order placed"
    );

    let mut result = CmdResult::default();
    result.add_message(CmdMessage::success(format!(
        "Order {} placed: {} units, total {:.2}",
        order.id,
        order.total_units(),
        invoice.total
    )));
    Ok(result.with_invoice(invoice))
}

pub fn place_draft<B: StorageBackend>(
    warehouse: &mut Warehouse<B>,
    draft: DraftOrder,
    now: DateTime<Utc>,
) -> Result<CmdResult> {
    place(warehouse, draft.into_lines(), now)
}

pub fn list<B: StorageBackend>(warehouse: &Warehouse<B>) -> Result<CmdResult> {
    let inventory = warehouse.inventory();
    let orders: Vec<OrderView> = warehouse
        .orders()
        .list()
        .iter()
        .map(|o| OrderView::new(o, inventory))
        .collect();

    let mut result = CmdResult::default();
    if orders.is_empty() {
        result.add_message(CmdMessage::info("No orders yet."));
    }
    Ok(result.with_listed_orders(orders))
}
