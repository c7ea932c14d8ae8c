//! Compute service settings

use serde::{Deserialize, Serialize};

pub const DEFAULT_COMPUTE_URL: &str = "http://localhost:8081/";

/// Connection settings for the compute service
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComputeSettings {
    /// Compute server base URL
    pub url: String,
    /// API key sent as `RhinoComputeKey`; empty for a local server
    #[serde(default)]
    pub api_key: Option<String>,
    /// Request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Base URL that relative definition names are resolved against
    #[serde(default)]
    pub assets_url: Option<String>,
}

fn default_timeout_secs() -> u64 {
    120
}

impl Default for ComputeSettings {
    fn default() -> Self {
        Self {
            url: DEFAULT_COMPUTE_URL.to_string(),
            api_key: None,
            timeout_secs: default_timeout_secs(),
            assets_url: None,
        }
    }
}

impl ComputeSettings {
    fn config_path() -> Option<std::path::PathBuf> {
        directories::ProjectDirs::from("com", "compute-gui", "compute-gui")
            .map(|dirs| dirs.config_dir().join("settings.json"))
    }

    /// Load settings from file (or defaults), then apply environment overrides
    pub fn load() -> Self {
        let mut settings = Self::config_path()
            .and_then(|path| std::fs::read_to_string(path).ok())
            .map(|json| Self::from_json(&json))
            .unwrap_or_default();
        settings.apply_env(|key| std::env::var(key).ok());
        settings
    }

    /// Parse a settings file; unreadable content falls back to defaults
    fn from_json(json: &str) -> Self {
        serde_json::from_str::<Self>(json).unwrap_or_default()
    }

    /// Apply `RHINO_COMPUTE_URL`, `RHINO_COMPUTE_KEY`, `COMPUTE_TIMEOUT_SECS`
    /// and `COMPUTE_ASSETS_URL` from the given lookup.
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(url) = lookup("RHINO_COMPUTE_URL").filter(|v| !v.trim().is_empty()) {
            self.url = url;
        }
        if let Some(key) = lookup("RHINO_COMPUTE_KEY") {
            self.api_key = Some(key).filter(|k| !k.is_empty());
        }
        if let Some(secs) = lookup("COMPUTE_TIMEOUT_SECS").and_then(|v| v.parse().ok()) {
            self.timeout_secs = secs;
        }
        if let Some(assets) = lookup("COMPUTE_ASSETS_URL").filter(|v| !v.trim().is_empty()) {
            self.assets_url = Some(assets);
        }
    }

    /// Save settings to file
    pub fn save(&self) {
        if let Some(path) = Self::config_path() {
            if let Some(parent) = path.parent() {
                let _ = std::fs::create_dir_all(parent);
            }
            if let Ok(json) = serde_json::to_string_pretty(self) {
                if let Err(e) = std::fs::write(&path, json) {
                    tracing::warn!("Failed to save settings to {}: {e}", path.display());
                }
            }
        }
    }
}
