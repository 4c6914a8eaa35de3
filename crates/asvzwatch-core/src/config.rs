//! Application configuration management.
//!
//! The configuration holds the backend URL, the last account used to log in
//! and the listing page size. It is stored at
//! `~/.config/asvzwatch/config.json`; `ASVZWATCH_URL` overrides the stored
//! backend URL.

use std::path::{Path, PathBuf};

use anyhow::Result;
use serde::{Deserialize, Serialize};

/// Application name used for config/cache directory paths
const APP_NAME: &str = "asvzwatch";

/// Config file name
const CONFIG_FILE: &str = "config.json";

/// Environment variable overriding the backend URL
pub const URL_ENV_VAR: &str = "ASVZWATCH_URL";

/// Backend URL when nothing is configured (PocketBase's default bind address)
pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:8090";

/// Listings shown per page. 24 fills a 4- or 6-column card grid.
pub const DEFAULT_PAGE_SIZE: usize = 24;

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct Config {
    pub base_url: Option<String>,
    pub last_email: Option<String>,
    pub page_size: Option<usize>,
}

impl Config {
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let contents = std::fs::read_to_string(path)?;
            Ok(serde_json::from_str(&contents)?)
        } else {
            Ok(Self::default())
        }
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let contents = serde_json::to_string_pretty(self)?;
        std::fs::write(path, contents)?;
        Ok(())
    }

    fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find config directory"))?;
        Ok(config_dir.join(APP_NAME).join(CONFIG_FILE))
    }

    pub fn cache_dir(&self) -> Result<PathBuf> {
        let cache_dir =
            dirs::cache_dir().ok_or_else(|| anyhow::anyhow!("Could not find cache directory"))?;
        Ok(cache_dir.join(APP_NAME))
    }

    /// Backend URL: environment, then config file, then default
    pub fn base_url(&self) -> String {
        self.resolve_base_url(std::env::var(URL_ENV_VAR).ok())
    }

    fn resolve_base_url(&self, env_value: Option<String>) -> String {
        env_value
            .filter(|v| !v.trim().is_empty())
            .or_else(|| self.base_url.clone())
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string())
    }

    pub fn page_size(&self) -> usize {
        self.page_size
            .filter(|&size| size > 0)
            .unwrap_or(DEFAULT_PAGE_SIZE)
    }
}
