use axum::{extract::State, response::Json};
use serde_json::{json, Value};

use crate::error::ApiError;
use crate::AppState;
use shared::{AssetEntry, AssetKind};

/// Health check
pub async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

/// Files in the assets directory, sorted by name
pub async fn list_assets(State(state): State<AppState>) -> Result<Json<Vec<AssetEntry>>, ApiError> {
    let mut dir = tokio::fs::read_dir(state.assets_dir.as_path())
        .await
        .map_err(ApiError::AssetsUnavailable)?;

    let mut assets = Vec::new();
    while let Some(entry) = dir.next_entry().await.map_err(ApiError::AssetsUnavailable)? {
        let metadata = entry
            .metadata()
            .await
            .map_err(|e| ApiError::Internal(e.to_string()))?;
        if !metadata.is_file() {
            continue;
        }
        let name = entry.file_name().to_string_lossy().into_owned();
        assets.push(AssetEntry {
            kind: AssetKind::from_file_name(&name),
            size: metadata.len(),
            name,
        });
    }
    assets.sort_by(|a, b| a.name.cmp(&b.name));

    tracing::debug!("Listed {} assets", assets.len());
    Ok(Json(assets))
}
