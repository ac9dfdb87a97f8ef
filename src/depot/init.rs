use crate::api::DepotApi;
use crate::config::DepotConfig;
use crate::error::Result;
use crate::store::fs::FileWarehouse;
use crate::store::fs_backend::FsBackend;
use crate::store::warehouse::LoadReport;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Environment variable naming the data directory when `--data-dir` is not given.
pub const DATA_DIR_ENV: &str = "DEPOT_HOME";

pub struct DepotContext {
    pub api: DepotApi<FsBackend>,
    pub config: DepotConfig,
    pub load_report: LoadReport,
}

/// Picks the data directory: explicit flag, then `DEPOT_HOME`, then `cwd`.
/// Relative paths are taken relative to `cwd`.
pub fn resolve_data_dir(flag: Option<&Path>, env: Option<OsString>, cwd: &Path) -> PathBuf {
    let chosen = flag
        .map(Path::to_path_buf)
        .or_else(|| env.filter(|v| !v.is_empty()).map(PathBuf::from))
        .unwrap_or_else(|| cwd.to_path_buf());
    if chosen.is_absolute() {
        chosen
    } else {
        cwd.join(chosen)
    }
}

pub fn initialize(cwd: &Path, data_dir: Option<&Path>) -> Result<DepotContext> {
    let data_dir = resolve_data_dir(data_dir, std::env::var_os(DATA_DIR_ENV), cwd);
    debug!(data_dir = %data_dir.display(), "using data directory");

    let config = DepotConfig::load(&data_dir).unwrap_or_else(|e| {
        warn!("ignoring unreadable config in {}: {}", data_dir.display(), e);
        DepotConfig::default()
    });

    let (warehouse, load_report) = FileWarehouse::open_dir(data_dir.clone(), &config)?;
    let api = DepotApi::new(warehouse, config.clone(), data_dir);

    Ok(DepotContext {
        api,
        config,
        load_report,
    })
}
