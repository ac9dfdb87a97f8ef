use super::{DataFile, StorageBackend};
use crate::config::DepotConfig;
use crate::error::Result;
use crate::model::Role;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use uuid::Uuid;

/// Storage backend rooted at a data directory.
pub struct FsBackend {
    root: PathBuf,
    config: DepotConfig,
}

impl FsBackend {
    pub fn new(root: PathBuf) -> Self {
        Self::with_config(root, DepotConfig::default())
    }

    pub fn with_config(root: PathBuf, config: DepotConfig) -> Self {
        Self { root, config }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn path_for(&self, file: DataFile) -> PathBuf {
        let name = match file {
            DataFile::Inventory => &self.config.inventory_file,
            DataFile::Orders => &self.config.orders_file,
            DataFile::Credentials(Role::Admin) => &self.config.admin_credentials_file,
            DataFile::Credentials(Role::Customer) => &self.config.customer_credentials_file,
            DataFile::Lockouts => &self.config.lockouts_file,
        };
        self.root.join(name)
    }

    fn ensure_dir(&self) -> Result<()> {
        if !self.root.exists() {
            fs::create_dir_all(&self.root)?;
        }
        Ok(())
    }
}

impl StorageBackend for FsBackend {
    fn read(&self, file: DataFile) -> Result<Option<String>> {
        let path = self.path_for(file);
        if !path.exists() {
            return Ok(None);
        }
        Ok(Some(fs::read_to_string(path)?))
    }

    fn write(&self, file: DataFile, content: &str) -> Result<()> {
        self.ensure_dir()?;
        let target = self.path_for(file);

        // Atomic write
        let tmp = self.root.join(format!(".depot-{}.tmp", Uuid::new_v4()));
        fs::write(&tmp, content)?;
        fs::rename(&tmp, &target)?;
        Ok(())
    }

    fn append_line(&self, file: DataFile, line: &str) -> Result<()> {
        self.ensure_dir()?;
        let mut handle = OpenOptions::new()
            .create(true)
            .append(true)
            .open(self.path_for(file))?;
        writeln!(handle, "{}", line)?;
        Ok(())
    }

    fn describe(&self, file: DataFile) -> String {
        self.path_for(file).display().to_string()
    }
}
