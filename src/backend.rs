//! Layer Registry Backend
//!
//! Client for the agent vendor's layer registry, used by the template
//! paths to resolve the published layer ARN for a region/runtime pair.
//! Authenticates with a bearer token, not cloud credentials; the cloud
//! provider is never contacted from here.

use crate::error::ApiError;
use crate::types::LayerReference;
use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;

/// Published-layer lookup against the vendor backend.
#[async_trait]
pub trait LayerRegistry: Send + Sync {
    /// Layers published for a region/runtime pair.
    async fn published_layers(
        &self,
        region: &str,
        runtime: &str,
    ) -> Result<Vec<LayerReference>, ApiError>;
}

#[derive(Debug, Deserialize)]
struct PublishedLayer {
    arn: String,
    version: i64,
}

#[derive(Debug, Deserialize)]
struct LayersResponse {
    layers: Vec<PublishedLayer>,
}

/// Parse the registry's layer listing payload.
fn parse_response(body: &str) -> Result<Vec<LayerReference>, ApiError> {
    let response: LayersResponse = serde_json::from_str(body)
        .map_err(|e| ApiError::BackendError(format!("Invalid layer listing: {}", e)))?;
    Ok(response
        .layers
        .into_iter()
        .map(|l| LayerReference {
            arn: l.arn,
            version: l.version,
        })
        .collect())
}

/// HTTP implementation of [`LayerRegistry`].
pub struct HttpLayerRegistry {
    http: reqwest::Client,
    base_url: String,
    token: String,
}

impl HttpLayerRegistry {
    pub fn new(base_url: &str, token: &str) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            token: token.to_string(),
        }
    }

    fn layers_url(&self) -> String {
        format!("{}/v1/layers", self.base_url)
    }
}

#[async_trait]
impl LayerRegistry for HttpLayerRegistry {
    async fn published_layers(
        &self,
        region: &str,
        runtime: &str,
    ) -> Result<Vec<LayerReference>, ApiError> {
        debug!(region, runtime, "querying layer registry");
        let response = self
            .http
            .get(self.layers_url())
            .query(&[("region", region), ("runtime", runtime)])
            .bearer_auth(&self.token)
            .send()
            .await
            .map_err(|e| ApiError::BackendError(e.to_string()))?;
        let response = response
            .error_for_status()
            .map_err(|e| ApiError::BackendError(e.to_string()))?;
        let body = response
            .text()
            .await
            .map_err(|e| ApiError::BackendError(e.to_string()))?;
        parse_response(&body)
    }
}
