use super::{DataFile, StorageBackend};
use crate::error::{DepotError, Result};
use std::cell::RefCell;
use std::collections::HashMap;

/// In-memory storage backend for testing.
///
/// Holds the same text the filesystem backend would, so parsing and
/// serialization are exercised exactly as in production.
/// Uses `RefCell` for interior mutability since depot is single-threaded.
#[derive(Default)]
pub struct MemBackend {
    files: RefCell<HashMap<DataFile, String>>,
    simulate_write_error: RefCell<bool>,
}

impl MemBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a file with raw text (e.g. to test malformed records).
    pub fn with_file(self, file: DataFile, content: &str) -> Self {
        self.files.borrow_mut().insert(file, content.to_string());
        self
    }

    /// Raw text currently stored for a file.
    pub fn contents(&self, file: DataFile) -> Option<String> {
        self.files.borrow().get(&file).cloned()
    }

    /// Enable write error simulation for testing error handling.
    pub fn set_simulate_write_error(&self, simulate: bool) {
        *self.simulate_write_error.borrow_mut() = simulate;
    }

    fn check_writable(&self) -> Result<()> {
        if *self.simulate_write_error.borrow() {
            return Err(DepotError::Store("Simulated write error".to_string()));
        }
        Ok(())
    }
}

impl StorageBackend for MemBackend {
    fn read(&self, file: DataFile) -> Result<Option<String>> {
        Ok(self.files.borrow().get(&file).cloned())
    }

    fn write(&self, file: DataFile, content: &str) -> Result<()> {
        self.check_writable()?;
        self.files.borrow_mut().insert(file, content.to_string());
        Ok(())
    }

    fn append_line(&self, file: DataFile, line: &str) -> Result<()> {
        self.check_writable()?;
        let mut files = self.files.borrow_mut();
        let entry = files.entry(file).or_default();
        entry.push_str(line);
        entry.push('\n');
        Ok(())
    }

    fn describe(&self, file: DataFile) -> String {
        format!("memory://{:?}", file).to_lowercase()
    }
}
