use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Session file name in cache directory
const SESSION_FILE: &str = "session.json";

/// Token lifetime in days.
/// PocketBase issues auth-collection tokens valid for 14 days by default.
const TOKEN_EXPIRY_DAYS: i64 = 14;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionData {
    pub token: String,
    pub user_id: String,
    pub email: String,
    pub created_at: DateTime<Utc>,
}

impl SessionData {
    pub fn expires_at(&self) -> DateTime<Utc> {
        self.created_at + Duration::days(TOKEN_EXPIRY_DAYS)
    }

    pub fn is_expired(&self) -> bool {
        Utc::now() > self.expires_at()
    }

    /// Days remaining until expiry (for display)
    pub fn days_until_expiry(&self) -> i64 {
        (self.expires_at() - Utc::now()).num_days().max(0)
    }
}

pub struct Session {
    cache_dir: PathBuf,
    pub data: Option<SessionData>,
}

impl Session {
    pub fn new(cache_dir: PathBuf) -> Self {
        Self {
            cache_dir,
            data: None,
        }
    }

    /// Load session from disk. Returns false if there is none or it expired.
    pub fn load(&mut self) -> Result<bool> {
        let path = self.session_path();
        if path.exists() {
            let contents = std::fs::read_to_string(&path).context("Failed to read session file")?;
            let data: SessionData =
                serde_json::from_str(&contents).context("Failed to parse session file")?;

            if !data.is_expired() {
                self.data = Some(data);
                return Ok(true);
            }
            debug!(email = %data.email, "Stored session expired");
        }
        Ok(false)
    }

    /// Save session to disk
    pub fn save(&self) -> Result<()> {
        if let Some(ref data) = self.data {
            let path = self.session_path();
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            let contents = serde_json::to_string_pretty(data)?;
            std::fs::write(path, contents)?;
        }
        Ok(())
    }

    /// Clear session data (logout)
    pub fn clear(&mut self) -> Result<()> {
        self.data = None;
        let path = self.session_path();
        if path.exists() {
            std::fs::remove_file(path)?;
        }
        Ok(())
    }

    pub fn update(&mut self, data: SessionData) {
        self.data = Some(data);
    }

    /// The auth token if the session is valid
    pub fn token(&self) -> Option<&str> {
        self.data
            .as_ref()
            .filter(|d| !d.is_expired())
            .map(|d| d.token.as_str())
    }

    pub fn email(&self) -> Option<&str> {
        self.data.as_ref().map(|d| d.email.as_str())
    }

    /// Check if session is valid (exists and not expired)
    pub fn is_valid(&self) -> bool {
        self.data.as_ref().map(|d| !d.is_expired()).unwrap_or(false)
    }

    fn session_path(&self) -> PathBuf {
        self.cache_dir.join(SESSION_FILE)
    }
}
