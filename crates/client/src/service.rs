use async_trait::async_trait;
use spe_core::{EmbeddingResult, HeatmapCell, Scenario, SearchHit};
use tracing::{info, warn};

use crate::error::ClientError;
use crate::remote_config::RemoteConfig;
use crate::types::{HeatmapQuery, SimulationOutcome};

/// The analysis service as seen by the editor. [`crate::AnalysisClient`]
/// talks to it over HTTP; tests substitute in-memory implementations.
#[async_trait]
pub trait AnalysisService: Send + Sync {
    async fn config(&self) -> Result<RemoteConfig, ClientError>;

    async fn embed(&self, scenario: &Scenario) -> Result<EmbeddingResult, ClientError>;

    /// Persist a scenario and return its id.
    async fn save_scenario(&self, scenario: &Scenario) -> Result<String, ClientError>;

    /// Add a vector to the similarity index under a saved scenario id.
    /// Returns the embedding id.
    async fn index(&self, scenario_id: &str, vector: &[f64]) -> Result<String, ClientError>;

    async fn search(&self, vector: &[f64], k: usize) -> Result<Vec<SearchHit>, ClientError>;

    async fn simulate(&self, scenario: &Scenario, day: u32)
        -> Result<SimulationOutcome, ClientError>;

    async fn heatmap(&self, query: &HeatmapQuery) -> Result<Vec<HeatmapCell>, ClientError>;
}

/// Fetch the remote configuration, substituting the built-in default on any
/// failure. Never returns an error.
pub async fn fetch_config_or_default(service: &dyn AnalysisService) -> RemoteConfig {
    match service.config().await {
        Ok(cfg) => {
            info!(
                lat = cfg.initial_view_state.latitude,
                lng = cfg.initial_view_state.longitude,
                "remote config loaded"
            );
            cfg
        }
        Err(e) => {
            warn!(error = %e, "failed to load remote config, using built-in default");
            RemoteConfig::default()
        }
    }
}
