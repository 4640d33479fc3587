//! Configuration management.
//!
//! Configuration is read from `~/.config/gazette/config.toml` at startup.
//! If the file doesn't exist, a default configuration with comments is
//! created. Missing fields fall back to defaults.

use std::fs;
use std::io::Write;
use std::path::PathBuf;

use serde::Deserialize;

use crate::app::{GazetteError, Result};
use crate::domain::DEFAULT_COUNTRY;

pub const DEFAULT_BASE_URL: &str = "https://newsapi.org/";

// Upstream's embedded key; override it in the config file.
const DEFAULT_API_KEY: &str = "2eaa769a0696417d889a734041735560";

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    pub api_key: String,
    pub base_url: String,
    pub default_country: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_key: DEFAULT_API_KEY.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
            default_country: DEFAULT_COUNTRY.to_string(),
        }
    }
}

impl Config {
    /// Load configuration from the default path, creating a commented
    /// default file on first run.
    pub fn load() -> Result<Self> {
        let config_path = Self::default_config_path()?;

        if !config_path.exists() {
            Self::create_default_config(&config_path)?;
            return Ok(Self::default());
        }

        let content = fs::read_to_string(&config_path)?;
        let config: Config = toml::from_str(&content).map_err(|e| {
            GazetteError::Config(format!("{}: {}", config_path.display(), e))
        })?;

        Ok(config)
    }

    /// `~/.config/gazette/config.toml`
    pub fn default_config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| GazetteError::Config("Could not find config directory".into()))?;
        Ok(config_dir.join("gazette").join("config.toml"))
    }

    fn create_default_config(path: &PathBuf) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let mut file = fs::File::create(path)?;
        file.write_all(Self::default_config_content().as_bytes())?;

        Ok(())
    }

    fn default_config_content() -> String {
        format!(
            r#"# Gazette configuration
#
# api_key: your newsapi.org API key
# base_url: API endpoint, only worth changing for testing
# default_country: two-letter country code used when --country is absent

api_key = "{DEFAULT_API_KEY}"
base_url = "{DEFAULT_BASE_URL}"
default_country = "{DEFAULT_COUNTRY}"
"#
        )
    }
}
