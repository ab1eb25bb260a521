// Unscroll - CLI Config Module
// Persisted CLI settings: backend URL, bearer token, device identity

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

const APP_DOMAIN: &str = "unscroll.app";

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CliConfig {
    /// Backend base URL
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,

    /// Bearer token from the last successful authentication
    #[serde(default)]
    pub auth_token: String,

    /// Stable per-device identity, generated on first run
    #[serde(default)]
    pub device_id: String,
}

fn default_api_base_url() -> String {
    "https://api.unscroll.app".to_string()
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            api_base_url: default_api_base_url(),
            auth_token: String::new(),
            device_id: String::new(),
        }
    }
}

impl CliConfig {
    /// Load the CLI configuration, creating the device identity on first run
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path()?;

        let mut config = if config_path.exists() {
            let contents =
                fs::read_to_string(&config_path).context("Failed to read CLI configuration")?;
            toml::from_str(&contents).context("Failed to parse CLI configuration")?
        } else {
            Self::default()
        };

        if config.device_id.is_empty() {
            config.device_id = Uuid::new_v4().simple().to_string();
            config.save()?;
        }

        Ok(config)
    }

    /// Persist the CLI configuration
    pub fn save(&self) -> Result<()> {
        let config_path = Self::config_path()?;

        if let Some(parent) = config_path.parent() {
            fs::create_dir_all(parent).context("Failed to create config directory")?;
        }

        let contents = toml::to_string_pretty(self).context("Failed to serialize configuration")?;
        fs::write(&config_path, contents)
            .context(format!("Failed to write {}", config_path.display()))?;

        Ok(())
    }

    /// The app domain used for derived registration emails
    pub fn app_domain(&self) -> &'static str {
        APP_DOMAIN
    }

    pub fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))?;
        Ok(config_dir.join("unscroll").join("cli.toml"))
    }
}
