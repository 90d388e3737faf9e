//! Request and response bodies of the analysis API.

use serde::{Deserialize, Serialize};
use spe_core::{HeatmapCell, HeatmapFeature, Scenario, SearchHit, SimulationStats};

#[derive(Debug, Serialize)]
pub(crate) struct IndexRequest<'a> {
    pub scenario_id: &'a str,
    pub vector: &'a [f64],
}

#[derive(Debug, Serialize)]
pub(crate) struct SearchRequest<'a> {
    pub vector: &'a [f64],
    pub k: usize,
}

#[derive(Debug, Serialize)]
pub(crate) struct SimulateRequest<'a> {
    pub scenario: &'a Scenario,
    pub day: u32,
}

/// Parameters of a heatmap aggregation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HeatmapQuery {
    pub scenario: Scenario,
    pub feature: HeatmapFeature,
    pub day: u32,
    pub h3_level: u8,
}

#[derive(Debug, Deserialize)]
pub(crate) struct SaveResponse {
    pub id: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct IndexResponse {
    pub embedding_id: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct SearchResponse {
    #[serde(default)]
    pub hits: Vec<SearchHit>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct HeatmapResponse {
    #[serde(default)]
    pub cells: Vec<HeatmapCell>,
}

/// Result of `POST /api/simulate`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SimulationOutcome {
    #[serde(default)]
    pub stats: SimulationStats,
    /// Feature vector derived from the stats, when the service provides one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vector: Option<Vec<f64>>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use spe_core::{build_scenario, ResolutionConfig, ScenarioSettings};

    #[test]
    fn test_heatmap_query_body() {
        let query = HeatmapQuery {
            scenario: build_scenario(
                std::iter::empty(),
                std::iter::empty(),
                &ResolutionConfig::default(),
                &ScenarioSettings::default(),
            ),
            feature: HeatmapFeature::ServiceWindowStart,
            day: 3,
            h3_level: 7,
        };
        let json = serde_json::to_value(&query).unwrap();
        assert_eq!(json["feature"], "service_window_start");
        assert_eq!(json["day"], 3);
        assert_eq!(json["h3_level"], 7);
        assert_eq!(json["scenario"]["globals"]["max_agents"], 1);
    }

    #[test]
    fn test_missing_collections_are_empty() {
        let search: SearchResponse = serde_json::from_str("{}").unwrap();
        assert!(search.hits.is_empty());
        let heat: HeatmapResponse = serde_json::from_str("{}").unwrap();
        assert!(heat.cells.is_empty());
        let sim: SimulationOutcome =
            serde_json::from_str(r#"{"stats":{"unassigned_stops":2}}"#).unwrap();
        assert_eq!(sim.stats.unassigned_stops, 2);
        assert!(sim.vector.is_none());
    }
}
