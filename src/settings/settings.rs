use anyhow::{Result, anyhow};
use config::{Config, File};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct Settings {
    pub log: Log,
    pub relationship: Relationship,
    pub store: Store,
}

#[derive(Debug, Deserialize)]
pub struct Log {
    pub filter: String,
}

#[derive(Debug, Deserialize)]
pub struct Relationship {
    pub max_duration_secs: u64,
    #[serde(default = "default_sweep_on_read")]
    pub sweep_on_read: bool,
}

#[derive(Debug, Deserialize)]
pub struct Store {
    pub backend: String, // "memory" or "mysql"
    pub mysql_dsn: Option<String>,
}

impl Store {
    /// True when the store is dropped with the process.
    pub fn is_ephemeral(&self) -> bool {
        self.backend == "memory"
    }
}

fn default_sweep_on_read() -> bool {
    true
}

#[cfg(debug_assertions)]
const SETTINGS_PATH: &str = "settings/dev.toml";
#[cfg(not(debug_assertions))]
const SETTINGS_PATH: &str = "settings/release.toml";

pub fn parse_settings(path: Option<&str>) -> Result<Settings> {
    let path = path.unwrap_or(SETTINGS_PATH);

    let settings: Settings = Config::builder()
        .add_source(File::with_name(path))
        .build()
        .map_err(|e| anyhow!(e))?
        .try_deserialize()
        .map_err(|e| anyhow!(e))?;

    Ok(settings)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dev_settings_use_a_persistent_store() {
        let settings = parse_settings(Some("settings/dev.toml")).unwrap();
        assert_eq!(settings.store.backend, "mysql");
        assert!(settings.store.mysql_dsn.is_some());
        assert!(!settings.store.is_ephemeral());
    }

    #[test]
    fn test_settings_use_the_memory_store() {
        let settings = parse_settings(Some("settings/test.toml")).unwrap();
        assert!(settings.store.is_ephemeral());
        assert!(settings.relationship.sweep_on_read);
    }

    #[test]
    fn missing_file_is_an_error() {
        assert!(parse_settings(Some("settings/does-not-exist.toml")).is_err());
    }
}
