use super::fs_backend::FsBackend;
use super::warehouse::{LoadReport, Warehouse};
use crate::config::DepotConfig;
use crate::error::Result;
use std::path::PathBuf;

pub type FileWarehouse = Warehouse<FsBackend>;

impl FileWarehouse {
    /// Opens the warehouse stored in `root`, using the file names from `config`.
    pub fn open_dir(root: PathBuf, config: &DepotConfig) -> Result<(Self, LoadReport)> {
        Warehouse::open(FsBackend::with_config(root, config.clone()))
    }
}
