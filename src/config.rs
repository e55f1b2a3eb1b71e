use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use crate::storage::StoreOptions;

pub const DEFAULT_PORT: u16 = 8080;

/// Optional settings read from `sqlgate.toml`
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct GatewayConfig {
    pub database: Option<String>,
    pub port: Option<u16>,
    pub static_dir: Option<String>,
    pub enforce_foreign_keys: Option<bool>,
}

impl GatewayConfig {
    /// Config with every default spelled out, as written by `sqlgate init`
    pub fn with_defaults() -> Self {
        Self {
            database: Some(default_database_path().display().to_string()),
            port: Some(DEFAULT_PORT),
            static_dir: Some(default_static_dir().display().to_string()),
            enforce_foreign_keys: Some(false),
        }
    }

    /// Flag value if given, else config value, else default
    pub fn database_path(&self, flag: Option<PathBuf>) -> PathBuf {
        flag.or_else(|| self.database.as_ref().map(PathBuf::from))
            .unwrap_or_else(default_database_path)
    }

    pub fn port(&self, flag: Option<u16>) -> u16 {
        flag.or(self.port).unwrap_or(DEFAULT_PORT)
    }

    pub fn static_dir(&self, flag: Option<PathBuf>) -> PathBuf {
        flag.or_else(|| self.static_dir.as_ref().map(PathBuf::from))
            .unwrap_or_else(default_static_dir)
    }

    /// A set flag always turns enforcement on
    pub fn store_options(&self, foreign_keys_flag: bool) -> StoreOptions {
        StoreOptions {
            enforce_foreign_keys: foreign_keys_flag || self.enforce_foreign_keys.unwrap_or(false),
        }
    }
}

pub fn default_config_path() -> PathBuf {
    PathBuf::from("sqlgate.toml")
}

pub fn default_database_path() -> PathBuf {
    PathBuf::from("./mydb.db")
}

pub fn default_static_dir() -> PathBuf {
    PathBuf::from("./static")
}

pub fn load_config(path: Option<&Path>) -> anyhow::Result<Option<GatewayConfig>> {
    let path = path.map(Path::to_path_buf).unwrap_or_else(default_config_path);
    if !path.exists() {
        return Ok(None);
    }

    let contents = std::fs::read_to_string(&path)?;
    let config: GatewayConfig = toml::from_str(&contents)?;
    Ok(Some(config))
}

pub fn write_config(path: &Path, config: &GatewayConfig, force: bool) -> anyhow::Result<()> {
    if path.exists() && !force {
        anyhow::bail!("config already exists at {} (use --force to overwrite)", path.display());
    }

    let contents = toml::to_string_pretty(config)?;
    std::fs::write(path, contents)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_config_is_none() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(load_config(Some(&dir.path().join("absent.toml"))).unwrap(), None);
    }

    #[test]
    fn test_write_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sqlgate.toml");

        write_config(&path, &GatewayConfig::with_defaults(), false).unwrap();
        assert!(write_config(&path, &GatewayConfig::default(), false).is_err());

        let loaded = load_config(Some(&path)).unwrap().unwrap();
        assert_eq!(loaded, GatewayConfig::with_defaults());
    }

    #[test]
    fn test_precedence() {
        let config: GatewayConfig = toml::from_str("port = 9000\ndatabase = \"data/app.db\"").unwrap();

        assert_eq!(config.port(None), 9000);
        assert_eq!(config.port(Some(3000)), 3000);
        assert_eq!(config.database_path(None), PathBuf::from("data/app.db"));
        assert_eq!(config.database_path(Some("x.db".into())), PathBuf::from("x.db"));
        assert_eq!(config.static_dir(None), default_static_dir());
        assert!(!config.store_options(false).enforce_foreign_keys);
        assert!(config.store_options(true).enforce_foreign_keys);
    }
}
