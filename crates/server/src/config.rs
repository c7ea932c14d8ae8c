//! Server configuration loaded from environment variables.

use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct Config {
    /// Port to listen on (`PORT`)
    pub port: u16,
    /// Directory served under `/files` and listed by `/api/assets` (`ASSETS_DIR`)
    pub assets_dir: PathBuf,
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        Self {
            port: lookup("PORT").and_then(|v| v.parse().ok()).unwrap_or(3001),
            assets_dir: lookup("ASSETS_DIR")
                .filter(|v| !v.is_empty())
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("./assets")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::from_lookup(|_| None);
        assert_eq!(config.port, 3001);
        assert_eq!(config.assets_dir, PathBuf::from("./assets"));
    }

    #[test]
    fn test_invalid_port_falls_back() {
        let config = Config::from_lookup(|key| match key {
            "PORT" => Some("not-a-port".into()),
            "ASSETS_DIR" => Some("/srv/definitions".into()),
            _ => None,
        });
        assert_eq!(config.port, 3001);
        assert_eq!(config.assets_dir, PathBuf::from("/srv/definitions"));
    }
}
