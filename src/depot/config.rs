//! # Configuration
//!
//! Stored as `config.json` in the data directory. A missing file means defaults;
//! missing keys fall back to their defaults individually.
//!
//! | Key | Default | Description |
//! |-----|---------|-------------|
//! | `inventory_file` | `inventory.txt` | Product records |
//! | `orders_file` | `orders.txt` | Order records |
//! | `admin_credentials_file` | `admin_credentials.csv` | Admin logins |
//! | `customer_credentials_file` | `customer_credentials.csv` | Customer logins |
//! | `lockouts_file` | `lockouts.json` | Failed-login state |
//! | `max_failed_attempts` | `3` | Failures before an account locks |
//! | `lockout_minutes` | `15` | How long a lock lasts |
//! | `report_bar_width` | `50` | Width of the largest bar in sales charts |
//! | `report_top_n` | `5` | Entries in the top-sellers ranking |

use crate::error::{DepotError, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

pub const CONFIG_FILENAME: &str = "config.json";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct DepotConfig {
    pub inventory_file: String,
    pub orders_file: String,
    pub admin_credentials_file: String,
    pub customer_credentials_file: String,
    pub lockouts_file: String,
    pub max_failed_attempts: u32,
    pub lockout_minutes: i64,
    pub report_bar_width: usize,
    pub report_top_n: usize,
}

impl Default for DepotConfig {
    fn default() -> Self {
        Self {
            inventory_file: "inventory.txt".to_string(),
            orders_file: "orders.txt".to_string(),
            admin_credentials_file: "admin_credentials.csv".to_string(),
            customer_credentials_file: "customer_credentials.csv".to_string(),
            lockouts_file: "lockouts.json".to_string(),
            max_failed_attempts: 3,
            lockout_minutes: 15,
            report_bar_width: 50,
            report_top_n: 5,
        }
    }
}

pub const KEYS: [&str; 9] = [
    "inventory_file",
    "orders_file",
    "admin_credentials_file",
    "customer_credentials_file",
    "lockouts_file",
    "max_failed_attempts",
    "lockout_minutes",
    "report_bar_width",
    "report_top_n",
];

impl DepotConfig {
    /// Load config from the given directory, or return defaults if not found
    pub fn load<P: AsRef<Path>>(config_dir: P) -> Result<Self> {
        let config_path = config_dir.as_ref().join(CONFIG_FILENAME);

        if !config_path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(&config_path)?;
        let config: DepotConfig = serde_json::from_str(&content)?;
        Ok(config)
    }

    pub fn save<P: AsRef<Path>>(&self, config_dir: P) -> Result<()> {
        let config_dir = config_dir.as_ref();
        if !config_dir.exists() {
            fs::create_dir_all(config_dir)?;
        }

        let content = serde_json::to_string_pretty(self)?;
        fs::write(config_dir.join(CONFIG_FILENAME), content)?;
        Ok(())
    }

    pub fn get(&self, key: &str) -> Option<String> {
        let value = match key {
            "inventory_file" => self.inventory_file.clone(),
            "orders_file" => self.orders_file.clone(),
            "admin_credentials_file" => self.admin_credentials_file.clone(),
            "customer_credentials_file" => self.customer_credentials_file.clone(),
            "lockouts_file" => self.lockouts_file.clone(),
            "max_failed_attempts" => self.max_failed_attempts.to_string(),
            "lockout_minutes" => self.lockout_minutes.to_string(),
            "report_bar_width" => self.report_bar_width.to_string(),
            "report_top_n" => self.report_top_n.to_string(),
            _ => return None,
        };
        Some(value)
    }

    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        let invalid = || DepotError::InvalidInput(format!("invalid value for {}: {}", key, value));
        match key {
            "inventory_file" => self.inventory_file = file_name(value)?,
            "orders_file" => self.orders_file = file_name(value)?,
            "admin_credentials_file" => self.admin_credentials_file = file_name(value)?,
            "customer_credentials_file" => self.customer_credentials_file = file_name(value)?,
            "lockouts_file" => self.lockouts_file = file_name(value)?,
            "max_failed_attempts" => {
                self.max_failed_attempts = value
                    .parse()
                    .ok()
                    .filter(|n| *n > 0)
                    .ok_or_else(invalid)?
            }
            "lockout_minutes" => {
                self.lockout_minutes = value
                    .parse()
                    .ok()
                    .filter(|n| *n >= 0)
                    .ok_or_else(invalid)?
            }
            "report_bar_width" => {
                self.report_bar_width = value
                    .parse()
                    .ok()
                    .filter(|n| *n > 0)
                    .ok_or_else(invalid)?
            }
            "report_top_n" => self.report_top_n = value.parse().map_err(|_| invalid())?,
            _ => {
                return Err(DepotError::InvalidInput(format!(
                    "unknown config key: {}",
                    key
                )))
            }
        }
        Ok(())
    }
}

fn file_name(value: &str) -> Result<String> {
    let value = value.trim();
    if value.is_empty() {
        return Err(DepotError::InvalidInput("file name cannot be empty".into()));
    }
    Ok(value.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = DepotConfig::default();
        assert_eq!(config.inventory_file, "inventory.txt");
        assert_eq!(config.max_failed_attempts, 3);
        assert_eq!(config.report_top_n, 5);
    }

    #[test]
    fn test_load_missing_config() {
        let temp = TempDir::new().unwrap();
        let config = DepotConfig::load(temp.path()).unwrap();
        assert_eq!(config, DepotConfig::default());
    }

    #[test]
    fn test_save_and_load() {
        let temp = TempDir::new().unwrap();
        let mut config = DepotConfig::default();
        config.set("lockout_minutes", "30").unwrap();
        config.set("orders_file", "sales.txt").unwrap();
        config.save(temp.path()).unwrap();

        let loaded = DepotConfig::load(temp.path()).unwrap();
        assert_eq!(loaded.lockout_minutes, 30);
        assert_eq!(loaded.orders_file, "sales.txt");
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join(CONFIG_FILENAME), r#"{"report_top_n": 3}"#).unwrap();
        let loaded = DepotConfig::load(temp.path()).unwrap();
        assert_eq!(loaded.report_top_n, 3);
        assert_eq!(loaded.inventory_file, "inventory.txt");
    }

    #[test]
    fn test_every_key_is_readable() {
        let config = DepotConfig::default();
        for key in KEYS {
            assert!(config.get(key).is_some(), "missing getter for {}", key);
        }
        assert!(config.get("nope").is_none());
    }

    #[test]
    fn test_set_rejects_bad_values() {
        let mut config = DepotConfig::default();
        assert!(config.set("max_failed_attempts", "0").is_err());
        assert!(config.set("report_bar_width", "wide").is_err());
        assert!(config.set("colour", "blue").is_err());
        assert!(config.set("inventory_file", "  ").is_err());
    }
}
