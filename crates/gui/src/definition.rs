//! Loading of definitions and model files.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use base64::Engine;

use crate::error::LoadError;

/// Compiled definition: an opaque blob, immutable once loaded
#[derive(Debug, Clone)]
pub struct Definition {
    name: String,
    bytes: Arc<[u8]>,
}

impl Definition {
    pub fn from_bytes(name: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            name: name.into(),
            bytes: Arc::from(bytes.into()),
        }
    }

    /// Load from a path, an absolute URL, or a name relative to `assets_url`
    pub async fn load(
        http: &reqwest::Client,
        source: &str,
        assets_url: Option<&str>,
    ) -> Result<Self, LoadError> {
        let bytes = read_source(http, source, assets_url).await?;
        let name = source.rsplit(['/', '\\']).next().unwrap_or(source);
        tracing::info!("Loaded definition {name} ({} bytes)", bytes.len());
        Ok(Self::from_bytes(name, bytes))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn to_base64(&self) -> String {
        base64::engine::general_purpose::STANDARD.encode(&self.bytes)
    }
}

/// Where a definition or model comes from
#[derive(Debug, Clone, PartialEq)]
pub enum Source {
    Url(String),
    File(PathBuf),
}

impl Source {
    /// Absolute URLs are fetched; other names are resolved against
    /// `assets_url` when one is configured, or read from disk.
    pub fn resolve(source: &str, assets_url: Option<&str>) -> Self {
        if source.starts_with("http://") || source.starts_with("https://") {
            return Source::Url(source.to_string());
        }
        match assets_url {
            Some(base) if !Path::new(source).is_absolute() => Source::Url(format!(
                "{}/{}",
                base.trim_end_matches('/'),
                source.trim_start_matches("./")
            )),
            _ => Source::File(PathBuf::from(source)),
        }
    }
}

/// Read the bytes of a definition or model file.
pub async fn read_source(
    http: &reqwest::Client,
    source: &str,
    assets_url: Option<&str>,
) -> Result<Vec<u8>, LoadError> {
    match Source::resolve(source, assets_url) {
        Source::File(path) => tokio::fs::read(&path)
            .await
            .map_err(|source| LoadError::Io { path, source }),
        Source::Url(url) => {
            tracing::debug!("Fetching {url}");
            let response = http.get(&url).send().await.map_err(|source| LoadError::Network {
                url: url.clone(),
                source,
            })?;
            let status = response.status();
            if !status.is_success() {
                return Err(LoadError::Status {
                    url,
                    status: status.as_u16(),
                });
            }
            let bytes = response
                .bytes()
                .await
                .map_err(|source| LoadError::Network { url, source })?;
            Ok(bytes.to_vec())
        }
    }
}
