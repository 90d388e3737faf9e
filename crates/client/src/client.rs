//! HTTP client for the analysis service.

use std::time::Duration;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use spe_core::config::ServiceConfig;
use spe_core::{EmbeddingResult, HeatmapCell, Scenario, SearchHit};
use tracing::debug;

use crate::error::ClientError;
use crate::remote_config::RemoteConfig;
use crate::service::AnalysisService;
use crate::types::{
    HeatmapQuery, HeatmapResponse, IndexRequest, IndexResponse, SaveResponse, SearchRequest,
    SearchResponse, SimulateRequest, SimulationOutcome,
};

/// JSON-over-HTTP client for the `/api` endpoints.
pub struct AnalysisClient {
    base_url: String,
    http: reqwest::Client,
}

impl AnalysisClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, ClientError> {
        let base_url = base_url.trim().trim_end_matches('/').to_string();
        if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
            return Err(ClientError::NotConfigured(format!(
                "analysis service URL must be http(s), got '{}'",
                base_url
            )));
        }
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self { base_url, http })
    }

    pub fn from_config(config: &ServiceConfig) -> Result<Self, ClientError> {
        Self::new(&config.base_url, Duration::from_millis(config.request_timeout_ms))
    }

    fn url(&self, path: &str) -> String {
        format!("{}/api/{}", self.base_url, path)
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ClientError> {
        let url = self.url(path);
        debug!("GET {}", url);
        let resp = self.http.get(&url).send().await?;
        Self::decode(resp).await
    }

    async fn post_json<B, T>(&self, path: &str, body: &B) -> Result<T, ClientError>
    where
        B: Serialize + ?Sized + Sync,
        T: DeserializeOwned,
    {
        let url = self.url(path);
        debug!("POST {}", url);
        let resp = self.http.post(&url).json(body).send().await?;
        Self::decode(resp).await
    }

    async fn decode<T: DeserializeOwned>(resp: reqwest::Response) -> Result<T, ClientError> {
        let status = resp.status();
        let body = resp.text().await.unwrap_or_default();
        if !status.is_success() {
            return Err(ClientError::Api {
                status: status.as_u16(),
                body,
            });
        }
        serde_json::from_str(&body).map_err(|e| ClientError::Parse(e.to_string()))
    }
}

#[async_trait]
impl AnalysisService for AnalysisClient {
    async fn config(&self) -> Result<RemoteConfig, ClientError> {
        self.get_json("config").await
    }

    async fn embed(&self, scenario: &Scenario) -> Result<EmbeddingResult, ClientError> {
        self.post_json("embed", scenario).await
    }

    async fn save_scenario(&self, scenario: &Scenario) -> Result<String, ClientError> {
        let resp: SaveResponse = self.post_json("scenario/save", scenario).await?;
        Ok(resp.id)
    }

    async fn index(&self, scenario_id: &str, vector: &[f64]) -> Result<String, ClientError> {
        let resp: IndexResponse = self
            .post_json("index", &IndexRequest { scenario_id, vector })
            .await?;
        Ok(resp.embedding_id)
    }

    async fn search(&self, vector: &[f64], k: usize) -> Result<Vec<SearchHit>, ClientError> {
        let resp: SearchResponse = self.post_json("search", &SearchRequest { vector, k }).await?;
        Ok(resp.hits)
    }

    async fn simulate(
        &self,
        scenario: &Scenario,
        day: u32,
    ) -> Result<SimulationOutcome, ClientError> {
        self.post_json("simulate", &SimulateRequest { scenario, day }).await
    }

    async fn heatmap(&self, query: &HeatmapQuery) -> Result<Vec<HeatmapCell>, ClientError> {
        let resp: HeatmapResponse = self.post_json("heatmap", query).await?;
        Ok(resp.cells)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_non_http_url() {
        let err = AnalysisClient::new("localhost:8080", Duration::from_secs(1)).err().unwrap();
        assert!(matches!(err, ClientError::NotConfigured(_)));
    }

    #[test]
    fn test_trailing_slash_trimmed() {
        let client = AnalysisClient::new("http://localhost:8080/", Duration::from_secs(1)).unwrap();
        assert_eq!(client.url("embed"), "http://localhost:8080/api/embed");
    }
}
