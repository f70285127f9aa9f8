//! Application configuration: defaults, config file, environment overrides.

use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use config::{Config, Environment, File};
use serde::Deserialize;

use crate::store::{DEFAULT_DATA_DIR, PROFILE_FILE};

const CONFIG_FILE: &str = "config.toml";

const DEFAULT_CONFIG: &str = r#"# quarry configuration
#
# Uncomment to override. Environment variables with a QUARRY_ prefix
# (QUARRY_DATA_DIR, QUARRY_STARTING_BALANCE) win over this file.
#
# data_dir = "~/.config/quarry"
# starting_balance = 100
"#;

/// Runtime settings shared by the engine and the frontend.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Directory holding the profile file.
    pub data_dir: PathBuf,
    /// Rocks granted to a brand-new profile.
    pub starting_balance: u64,
}

impl AppConfig {
    /// Load settings: built-in defaults, then the config file, then
    /// `QUARRY_*` environment variables.
    pub fn load() -> Result<Self> {
        Self::load_from(config_root().join(CONFIG_FILE))
    }

    fn load_from(config_path: impl AsRef<Path>) -> Result<Self> {
        let config_path = config_path.as_ref();
        let settings = Config::builder()
            .set_default("data_dir", config_root().to_string_lossy().into_owned())?
            .set_default("starting_balance", 100_i64)?
            .add_source(File::from(config_path.to_path_buf()).required(false))
            .add_source(Environment::with_prefix("QUARRY"))
            .build()
            .with_context(|| format!("failed to load {}", config_path.display()))?;

        settings
            .try_deserialize()
            .context("invalid configuration values")
    }

    /// Path of the profile file inside the data directory.
    pub fn profile_path(&self) -> PathBuf {
        self.data_dir.join(PROFILE_FILE)
    }
}

/// Platform config directory for quarry, `~/.config/quarry` on Linux.
pub fn config_root() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(DEFAULT_DATA_DIR)
}

/// Write a commented default config file if none exists yet.
pub fn ensure_default_config() -> Result<PathBuf> {
    ensure_config_at(&config_root())
}

fn ensure_config_at(root: &Path) -> Result<PathBuf> {
    fs::create_dir_all(root).with_context(|| format!("failed to create {}", root.display()))?;
    let path = root.join(CONFIG_FILE);
    if !path.exists() {
        fs::write(&path, DEFAULT_CONFIG)
            .with_context(|| format!("failed to write {}", path.display()))?;
    }
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn defaults_apply_without_a_config_file() -> Result<()> {
        let dir = tempdir()?;
        let config = AppConfig::load_from(dir.path().join("missing.toml"))?;
        assert_eq!(config.starting_balance, 100);
        assert!(config.profile_path().ends_with("profile.json"));
        Ok(())
    }

    #[test]
    fn file_values_override_defaults() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("config.toml");
        fs::write(
            &path,
            "starting_balance = 250\ndata_dir = \"/tmp/quarry-test\"\n",
        )?;

        let config = AppConfig::load_from(&path)?;
        assert_eq!(config.starting_balance, 250);
        assert_eq!(config.data_dir, PathBuf::from("/tmp/quarry-test"));
        Ok(())
    }

    #[test]
    fn default_config_is_written_once() -> Result<()> {
        let dir = tempdir()?;
        let path = ensure_config_at(dir.path())?;
        assert!(path.exists());

        let first = fs::read_to_string(&path)?;
        fs::write(&path, "starting_balance = 9\n")?;
        ensure_config_at(dir.path())?;
        let second = fs::read_to_string(&path)?;
        assert_ne!(first, second);
        assert_eq!(second, "starting_balance = 9\n");
        Ok(())
    }
}
