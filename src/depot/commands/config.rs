use crate::commands::{CmdMessage, CmdResult};
use crate::config::DepotConfig;
use crate::error::Result;
use std::path::Path;

#[derive(Debug, Clone)]
pub enum ConfigAction {
    ShowAll,
    ShowKey(String),
    Set(String, String),
}

pub fn run(data_dir: &Path, action: ConfigAction) -> Result<CmdResult> {
    let mut config = DepotConfig::load(data_dir)?;
    match action {
        ConfigAction::ShowAll => Ok(CmdResult::default().with_config(config)),
        ConfigAction::ShowKey(key) => {
            let mut result = CmdResult::default();
            match config.get(&key) {
                Some(value) => result.add_message(CmdMessage::info(value)),
                None => result.add_message(CmdMessage::error(format!(
                    "Unknown config key: {}",
                    key
                ))),
            }
            Ok(result)
        }
        ConfigAction::Set(key, value) => {
            config.set(&key, &value)?;
            config.save(data_dir)?;
            let shown = config.get(&key).unwrap_or(value);
            let mut result = CmdResult::default();
            result.add_message(CmdMessage::success(format!("{} set to {}", key, shown)));
            Ok(result.with_config(config))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::MessageLevel;
    use tempfile::TempDir;

    #[test]
    fn show_all_returns_defaults() {
        let temp = TempDir::new().unwrap();
        let result = run(temp.path(), ConfigAction::ShowAll).unwrap();
        assert_eq!(result.config.unwrap(), DepotConfig::default());
    }

    #[test]
    fn set_persists() {
        let temp = TempDir::new().unwrap();
        run(
            temp.path(),
            ConfigAction::Set("report_top_n".into(), "3".into()),
        )
        .unwrap();

        let shown = run(temp.path(), ConfigAction::ShowKey("report_top_n".into())).unwrap();
        assert_eq!(shown.messages[0].content, "3");
        assert_eq!(DepotConfig::load(temp.path()).unwrap().report_top_n, 3);
    }

    #[test]
    fn bad_values_are_rejected() {
        let temp = TempDir::new().unwrap();
        assert!(run(
            temp.path(),
            ConfigAction::Set("max_failed_attempts".into(), "zero".into())
        )
        .is_err());
        assert!(!temp.path().join("config.json").exists());

        let unknown = run(temp.path(), ConfigAction::ShowKey("colour".into())).unwrap();
        assert!(matches!(unknown.messages[0].level, MessageLevel::Error));
    }
}
