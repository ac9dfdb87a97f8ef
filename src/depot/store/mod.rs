//! # Storage Layer
//!
//! The storage layer is split in two:
//!
//! 1. **[`StorageBackend`]** is raw I/O: read, write and append whole text files.
//!    [`fs_backend::FsBackend`] talks to a data directory; [`mem_backend::MemBackend`]
//!    keeps the same text in memory for tests.
//! 2. **[`warehouse::Warehouse`]** is the session state: the product and order
//!    collections, loaded wholesale from the backend and saved back wholesale.
//!
//! ## Persistence Model
//!
//! - Products and orders are loaded once when the warehouse is opened.
//! - Mutations only touch memory until [`warehouse::Warehouse::save`] is called
//!   (explicitly, or by the UI on exit). Killing the process loses them.
//! - Credential files are append-only and go straight to the backend.
//! - Lockout state is rewritten after every login attempt.
//!
//! ## Storage Layout
//!
//! ```text
//! <data dir>/
//! ├── config.json               # Optional configuration
//! ├── inventory.txt             # id,name,quantity,price
//! ├── orders.txt                # id,epoch|product,qty|...
//! ├── admin_credentials.csv     # username,checksum
//! ├── customer_credentials.csv  # username,checksum
//! └── lockouts.json             # failed-login state
//! ```
//!
//! File names are configurable (see [`crate::config::DepotConfig`]).

use crate::error::Result;
use crate::model::Role;

pub mod fs;
pub mod fs_backend;
pub mod inventory;
pub mod mem_backend;
pub mod memory;
pub mod order_book;
pub mod warehouse;

/// The files a warehouse reads and writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DataFile {
    Inventory,
    Orders,
    Credentials(Role),
    Lockouts,
}

/// Abstract interface for raw storage I/O.
///
/// Backends move text around; parsing and business rules live in
/// [`warehouse::Warehouse`].
pub trait StorageBackend {
    /// Read the whole file. Returns Ok(None) if it does not exist yet.
    fn read(&self, file: DataFile) -> Result<Option<String>>;

    /// Replace the whole file.
    /// MUST be atomic (e.g. write to tmp then rename) to avoid partial writes.
    fn write(&self, file: DataFile, content: &str) -> Result<()>;

    /// Append a single line, creating the file if needed.
    fn append_line(&self, file: DataFile, line: &str) -> Result<()>;

    /// Human readable location, used in messages.
    fn describe(&self, file: DataFile) -> String;
}
