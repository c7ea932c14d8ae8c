//! HTTP client for the remote compute service.

use std::time::{Duration, Instant};

use reqwest::Url;
use serde::de::DeserializeOwned;
use serde::Serialize;
use shared::{DataItem, DataTree, EvaluationRequest, EvaluationResponse, MeshPayload};

use crate::definition::Definition;
use crate::error::{ConfigError, EvaluationError};
use crate::state::settings::ComputeSettings;

const API_KEY_HEADER: &str = "RhinoComputeKey";
const EVALUATE_ROUTE: &str = "grasshopper";
const MESH_UNION_ROUTE: &str = "rhino/geometry/mesh/createbooleanunion";
/// Longest error body kept in `EvaluationError::Status`
const MAX_ERROR_BODY: usize = 512;

/// Compute service client. Cheap to clone; clones share the connection pool.
#[derive(Debug, Clone)]
pub struct ComputeClient {
    base: Url,
    api_key: Option<String>,
    http: reqwest::Client,
}

impl ComputeClient {
    pub fn new(settings: &ComputeSettings) -> Result<Self, ConfigError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs))
            .user_agent(concat!("compute-gui/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| ConfigError::Client(e.to_string()))?;
        Ok(Self {
            base: parse_endpoint(&settings.url)?,
            api_key: settings.api_key.clone().filter(|k| !k.is_empty()),
            http,
        })
    }

    /// Point the client at another server.
    pub fn configure(&mut self, endpoint: &str, api_key: Option<&str>) -> Result<(), ConfigError> {
        self.base = parse_endpoint(endpoint)?;
        self.api_key = api_key.filter(|k| !k.is_empty()).map(str::to_string);
        tracing::info!("Compute endpoint set to {}", self.base);
        Ok(())
    }

    pub fn endpoint(&self) -> &Url {
        &self.base
    }

    /// Underlying HTTP client, reused for asset downloads
    pub fn http(&self) -> &reqwest::Client {
        &self.http
    }

    /// Evaluate `definition` with the given input trees.
    pub async fn evaluate_definition(
        &self,
        definition: &Definition,
        trees: &[DataTree],
    ) -> Result<EvaluationResponse, EvaluationError> {
        let request = EvaluationRequest {
            algo: definition.to_base64(),
            pointer: None,
            values: trees.to_vec(),
        };
        let response: EvaluationResponse = self.post(EVALUATE_ROUTE, &request).await?;

        for warning in &response.warnings {
            tracing::warn!("Compute warning: {warning}");
        }
        if !response.errors.is_empty() {
            return Err(EvaluationError::Remote(response.errors));
        }
        Ok(response)
    }

    /// Boolean union of `meshes`; returns the merged mesh records.
    pub async fn mesh_boolean_union(
        &self,
        meshes: &[MeshPayload],
    ) -> Result<Vec<DataItem>, EvaluationError> {
        let records: Vec<DataItem> = meshes.iter().map(MeshPayload::to_item).collect();
        // Positional arguments: the only argument is the mesh list
        self.post(MESH_UNION_ROUTE, &[records]).await
    }

    async fn post<B, R>(&self, route: &str, body: &B) -> Result<R, EvaluationError>
    where
        B: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        let url = self
            .base
            .join(route)
            .map_err(|e| EvaluationError::MalformedResponse(format!("bad route {route}: {e}")))?;

        let mut request = self.http.post(url).json(body);
        if let Some(key) = &self.api_key {
            request = request.header(API_KEY_HEADER, key);
        }

        let started = Instant::now();
        let response = request.send().await?;
        let status = response.status();
        tracing::debug!(route, status = status.as_u16(), elapsed_ms = started.elapsed().as_millis() as u64, "Compute response");

        if !status.is_success() {
            let mut body = response.text().await.unwrap_or_default();
            if body.len() > MAX_ERROR_BODY {
                let mut cut = MAX_ERROR_BODY;
                while !body.is_char_boundary(cut) {
                    cut -= 1;
                }
                body.truncate(cut);
            }
            return Err(EvaluationError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let bytes = response.bytes().await?;
        serde_json::from_slice(&bytes).map_err(|e| EvaluationError::MalformedResponse(e.to_string()))
    }
}

/// Validate and normalize the endpoint; a trailing `/` is added so routes join under it.
fn parse_endpoint(endpoint: &str) -> Result<Url, ConfigError> {
    let trimmed = endpoint.trim();
    if trimmed.is_empty() {
        return Err(ConfigError::EmptyEndpoint);
    }
    let normalized = if trimmed.ends_with('/') {
        trimmed.to_string()
    } else {
        format!("{trimmed}/")
    };
    Url::parse(&normalized).map_err(|_| ConfigError::InvalidEndpoint(trimmed.to_string()))
}
