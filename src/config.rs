//! Application configuration management.
//!
//! This module handles loading and saving the client configuration, which
//! includes the API base URL and the last used username.
//!
//! Configuration is stored at `~/.config/sueldos-admin/config.json`; the
//! base URL can be overridden with the `SUELDOS_API_URL` environment
//! variable (a `.env` file is honored).

use std::path::PathBuf;

use anyhow::Result;
use serde::{Deserialize, Serialize};

/// Application name used for config/cache directory paths
const APP_NAME: &str = "sueldos-admin";

/// Config file name
const CONFIG_FILE: &str = "config.json";

/// Environment variable overriding the configured API base URL
const API_URL_ENV: &str = "SUELDOS_API_URL";

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    pub api_url: Option<String>,
    pub last_username: Option<String>,
}

impl Config {
    pub fn load() -> Result<Self> {
        // Load .env file if present (silently ignore if not found)
        let _ = dotenvy::dotenv();

        let path = Self::config_path()?;
        if path.exists() {
            let contents = std::fs::read_to_string(&path)?;
            Ok(serde_json::from_str(&contents)?)
        } else {
            Ok(Self::default())
        }
    }

    pub fn save(&self) -> Result<()> {
        let path = Self::config_path()?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let contents = serde_json::to_string_pretty(self)?;
        std::fs::write(path, contents)?;
        Ok(())
    }

    /// The API base URL: environment override first, then the config file.
    /// Empty when neither is set, which keeps requests relative.
    pub fn api_url(&self) -> String {
        std::env::var(API_URL_ENV)
            .ok()
            .or_else(|| self.api_url.clone())
            .unwrap_or_default()
    }

    fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find config directory"))?;
        Ok(config_dir.join(APP_NAME).join(CONFIG_FILE))
    }

    /// Directory for locally persisted state such as the token file.
    pub fn cache_dir(&self) -> Result<PathBuf> {
        let cache_dir = dirs::cache_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find cache directory"))?;
        Ok(cache_dir.join(APP_NAME))
    }
}
