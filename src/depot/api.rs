//! # API Facade
//!
//! The API layer is a thin facade over the command layer and the single entry
//! point for every depot operation, whichever UI drives it.
//!
//! It dispatches to `commands/*`, normalizes inputs (order line arguments,
//! timestamps, settings taken from [`DepotConfig`]) and returns
//! `Result<CmdResult>`. It does no printing and holds no business logic.
//!
//! `DepotApi<B>` is generic over the storage backend:
//! - Production: `DepotApi<FsBackend>` (see [`crate::init`])
//! - Testing: `DepotApi<MemBackend>`

use crate::auth::LockoutPolicy;
use crate::commands;
use crate::config::DepotConfig;
use crate::error::{DepotError, Result};
use crate::model::{OrderLine, Product, ProductUpdate, Role, Session};
use crate::report::{ReportOptions, TimeFrame};
use crate::store::warehouse::Warehouse;
use crate::store::StorageBackend;
use chrono::{Local, Utc};
use std::path::{Path, PathBuf};

pub struct DepotApi<B: StorageBackend> {
    warehouse: Warehouse<B>,
    config: DepotConfig,
    data_dir: PathBuf,
}

impl<B: StorageBackend> DepotApi<B> {
    pub fn new(warehouse: Warehouse<B>, config: DepotConfig, data_dir: PathBuf) -> Self {
        Self {
            warehouse,
            config,
            data_dir,
        }
    }

    // --- Credential gate ---

    pub fn register(&self, role: Role, username: &str, password: &str) -> Result<CmdResult> {
        commands::auth::register(&self.warehouse, role, username, password)
    }

    pub fn login(&self, role: Role, username: &str, password: &str) -> Result<CmdResult> {
        commands::auth::login(
            &self.warehouse,
            role,
            username,
            password,
            Utc::now(),
            &LockoutPolicy::from_config(&self.config),
        )
    }

    /// Logs in and hands back the session, for callers that only need that.
    pub fn authenticate(&self, role: Role, username: &str, password: &str) -> Result<Session> {
        self.login(role, username, password)?
            .session
            .ok_or_else(|| DepotError::Api("login produced no session".into()))
    }

    // --- Products ---

    pub fn add_product(
        &mut self,
        id: &str,
        name: &str,
        quantity: u32,
        price: f64,
    ) -> Result<CmdResult> {
        commands::products::add(
            &mut self.warehouse,
            Product::new(id, name, quantity, price),
        )
    }

    pub fn update_product(&mut self, id: &str, update: &ProductUpdate) -> Result<CmdResult> {
        commands::products::update(&mut self.warehouse, id.trim(), update)
    }

    pub fn remove_product(&mut self, id: &str) -> Result<CmdResult> {
        commands::products::remove(&mut self.warehouse, id.trim())
    }

    pub fn list_products(&self) -> Result<CmdResult> {
        commands::products::list(&self.warehouse)
    }

    pub fn search_products(&self, term: &str) -> Result<CmdResult> {
        commands::products::search(&self.warehouse, term)
    }

    // --- Orders ---

    /// Places an order from `ID:QTY` arguments.
    pub fn place_order<I: AsRef<str>>(&mut self, items: &[I]) -> Result<CmdResult> {
        let lines = parse_order_lines(items)?;
        commands::orders::place(&mut self.warehouse, lines, Utc::now())
    }

    pub fn new_draft(&self) -> DraftOrder {
        DraftOrder::new()
    }

    pub fn add_to_draft(&self, draft: &mut DraftOrder, line: OrderLine) -> Result<()> {
        draft.add_line(self.warehouse.inventory(), line)
    }

    pub fn place_draft(&mut self, draft: DraftOrder) -> Result<CmdResult> {
        commands::orders::place_draft(&mut self.warehouse, draft, Utc::now())
    }

    pub fn list_orders(&self) -> Result<CmdResult> {
        commands::orders::list(&self.warehouse)
    }

    pub fn next_order_id(&self) -> String {
        self.warehouse.orders().next_order_id()
    }

    // --- Reporting ---

    pub fn sales_report(&self, timeframe: TimeFrame) -> Result<CmdResult> {
        commands::report::run(
            &self.warehouse,
            timeframe,
            &Local::now(),
            ReportOptions::from_config(&self.config),
        )
    }

    // --- Persistence & settings ---

    pub fn save(&mut self) -> Result<CmdResult> {
        commands::save::run(&mut self.warehouse)
    }

    /// Saves only when something changed since the last load or save.
    pub fn save_if_dirty(&mut self) -> Result<Option<CmdResult>> {
        if self.warehouse.is_dirty() {
            self.save().map(Some)
        } else {
            Ok(None)
        }
    }

    pub fn has_unsaved_changes(&self) -> bool {
        self.warehouse.is_dirty()
    }

    pub fn config(&self, action: ConfigAction) -> Result<CmdResult> {
        commands::config::run(&self.data_dir, action)
    }

    pub fn settings(&self) -> &DepotConfig {
        &self.config
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    pub fn warehouse(&self) -> &Warehouse<B> {
        &self.warehouse
    }
}

fn parse_order_lines<I: AsRef<str>>(items: &[I]) -> Result<Vec<OrderLine>> {
    items
        .iter()
        .map(|item| item.as_ref().parse::<OrderLine>())
        .collect()
}

pub use crate::commands::config::ConfigAction;
pub use commands::{CmdMessage, CmdResult, DraftOrder, Invoice, MessageLevel, OrderView};
