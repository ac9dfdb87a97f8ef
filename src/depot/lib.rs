//! # Depot Architecture
//!
//! Depot keeps a small warehouse: products with stock and prices, customer
//! orders that draw that stock down, and sales reports over recent orders.
//! Everything lives in flat text files in one data directory, and every
//! session goes through a username/password gate per role.
//!
//! The library is the application; the `depot` binary is one client of it.
//!
//! ## The Layers
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │  CLI Layer (cli/, wired by main.rs)                         │
//! │  - Subcommands, the interactive menu, terminal rendering    │
//! │  - The ONLY place that knows about stdout/stderr/exit codes │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  API Layer (api.rs)                                         │
//! │  - Thin facade over commands                                │
//! │  - Normalizes inputs (ID:QTY arguments, clock, settings)    │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Command Layer (commands/*.rs)                              │
//! │  - Business logic, returns CmdResult                        │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Storage Layer (store/)                                     │
//! │  - Warehouse<B>: inventory + order book in memory           │
//! │  - StorageBackend: FsBackend (production), MemBackend       │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## No I/O Assumptions in Core
//!
//! From `api.rs` inward, code takes Rust arguments and returns
//! `Result<CmdResult>`. It never writes to stdout/stderr, never exits the
//! process, and reads the clock only in the API layer (commands take `now`).
//! Diagnostics go through `tracing`; the binary decides where they end up.
//!
//! ## Testing Strategy
//!
//! 1. **Commands** and **store**: unit tests against `InMemoryWarehouse` and
//!    the `WarehouseFixture` builder. This is where most tests live.
//! 2. **API**: dispatch and input normalization.
//! 3. **CLI**: rendering and the menu in unit tests, whole-binary runs in
//!    `tests/` with `assert_cmd`.
//!
//! ## Module Overview
//!
//! - [`api`]: The API facade
//! - [`commands`]: Business logic for each operation
//! - [`store`]: Warehouse state and storage backends
//! - [`model`]: Products, orders, roles and credentials
//! - [`codec`]: The delimited record formats
//! - [`report`]: Sales report aggregation
//! - [`auth`]: Password checksums and the lockout policy
//! - [`config`]: Settings stored in the data directory
//! - [`init`]: Data directory resolution and startup
//! - [`error`]: Error types

pub mod api;
pub mod auth;
pub mod codec;
pub mod commands;
pub mod config;
pub mod error;
pub mod init;
pub mod model;
pub mod report;
pub mod store;
