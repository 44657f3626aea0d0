use std::{
    path::{Path, PathBuf},
    time::Duration,
};

use serde::{Deserialize, Serialize};
use tokio::fs;
use tracing::debug;

use crate::error::{Result, WordjumpError};

pub const DEFAULT_TRANSCRIPT_ENDPOINT: &str = "https://youtube-transcript-api-55qp.onrender.com";
pub const DEFAULT_DEMO_VIDEO_ID: &str = "dQw4w9WgXcQ";

pub const ENV_TRANSCRIPT_ENDPOINT: &str = "WORDJUMP_TRANSCRIPT_ENDPOINT";
pub const ENV_DEMO_VIDEO_ID: &str = "WORDJUMP_DEMO_VIDEO_ID";
pub const ENV_POLL_INTERVAL_MS: &str = "WORDJUMP_POLL_INTERVAL_MS";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WordjumpConfig {
    /// Base URL of the transcript service, without the `/api/transcript` path
    pub transcript_endpoint: String,

    /// Video used when the current page cannot be reached
    pub demo_video_id: String,

    pub poll_interval_ms: u64,
}

impl Default for WordjumpConfig {
    fn default() -> Self {
        Self {
            transcript_endpoint: DEFAULT_TRANSCRIPT_ENDPOINT.to_string(),
            demo_video_id: DEFAULT_DEMO_VIDEO_ID.to_string(),
            poll_interval_ms: 1000,
        }
    }
}

/// Default config file location, e.g. `~/.config/wordjump/config.json`
pub fn get_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("wordjump").join("config.json"))
}

impl WordjumpConfig {
    /// Load the config file if one exists, then apply environment overrides.
    pub async fn load() -> Result<Self> {
        let config = match get_config_path() {
            Some(path) if path.exists() => Self::load_from(&path).await?,
            _ => Self::default(),
        };
        Ok(config.with_env(|key| std::env::var(key).ok()))
    }

    pub async fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).await?;
        let config: Self =
            serde_json::from_str(&content).map_err(|e| WordjumpError::InvalidConfig {
                path: path.to_path_buf(),
                reason: e.to_string(),
            })?;
        debug!(path = %path.display(), "config loaded");
        Ok(config)
    }

    /// Override fields from `lookup`, which maps an env var name to its value.
    pub fn with_env(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(endpoint) = lookup(ENV_TRANSCRIPT_ENDPOINT) {
            self.transcript_endpoint = endpoint;
        }
        if let Some(video_id) = lookup(ENV_DEMO_VIDEO_ID) {
            self.demo_video_id = video_id;
        }
        if let Some(ms) = lookup(ENV_POLL_INTERVAL_MS).and_then(|v| v.parse().ok()) {
            self.poll_interval_ms = ms;
        }
        self
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms.max(1))
    }
}
