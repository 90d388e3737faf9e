//! Result types returned by the analysis service.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Heatmap feature the service can aggregate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HeatmapFeature {
    #[default]
    ServiceStopTime,
    ServiceWindowStart,
    ServiceWindowDuration,
    PinnedAccounts,
    AgentsAvailable,
}

impl HeatmapFeature {
    pub fn all() -> &'static [HeatmapFeature] {
        &[
            HeatmapFeature::ServiceStopTime,
            HeatmapFeature::ServiceWindowStart,
            HeatmapFeature::ServiceWindowDuration,
            HeatmapFeature::PinnedAccounts,
            HeatmapFeature::AgentsAvailable,
        ]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            HeatmapFeature::ServiceStopTime => "service_stop_time",
            HeatmapFeature::ServiceWindowStart => "service_window_start",
            HeatmapFeature::ServiceWindowDuration => "service_window_duration",
            HeatmapFeature::PinnedAccounts => "pinned_accounts",
            HeatmapFeature::AgentsAvailable => "agents_available",
        }
    }
}

impl std::fmt::Display for HeatmapFeature {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for HeatmapFeature {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase().replace('-', "_");
        HeatmapFeature::all()
            .iter()
            .copied()
            .find(|f| f.as_str() == wanted)
            .ok_or_else(|| format!("unknown heatmap feature '{}'", s))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EmbeddingMeta {
    /// Display order of the component blocks.
    #[serde(default)]
    pub order: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub h3_levels: Option<Vec<u8>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cycle_days: Option<u32>,
}

/// Feature embedding of a scenario: the concatenated vector plus its named
/// blocks. Names in `meta.order` are expected to match `components` but this
/// is not checked.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EmbeddingResult {
    #[serde(default)]
    pub embedding: Vec<f64>,
    #[serde(default)]
    pub components: IndexMap<String, Vec<f64>>,
    /// Half-open `[start, end)` range of each block within `embedding`.
    #[serde(default)]
    pub offsets: IndexMap<String, [usize; 2]>,
    #[serde(default)]
    pub meta: EmbeddingMeta,
}

impl EmbeddingResult {
    /// Component names in display order: `meta.order` first (skipping names
    /// with no data), then any remaining components as received.
    pub fn component_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self
            .meta
            .order
            .iter()
            .map(String::as_str)
            .filter(|n| self.components.contains_key(*n))
            .collect();
        for key in self.components.keys() {
            if !names.contains(&key.as_str()) {
                names.push(key);
            }
        }
        names
    }

    pub fn component(&self, name: &str) -> Option<&[f64]> {
        self.components.get(name).map(Vec::as_slice)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchHit {
    #[serde(rename = "ref")]
    pub reference: String,
    pub distance: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HeatmapCell {
    pub lat: f64,
    pub lng: f64,
    pub value: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub h3: Option<String>,
}

/// Summary of a simulated service day.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationStats {
    pub unassigned_stops: u64,
    pub driving_sec_per_rep: Vec<f64>,
    pub service_sec_per_rep: Vec<f64>,
    pub reps_used_per_day: Vec<u32>,
    pub total_travel_sec: f64,
    pub total_service_sec: f64,
    pub total_idle_sec: f64,
}

impl SimulationStats {
    pub fn reps_used(&self) -> usize {
        self.driving_sec_per_rep.len()
    }
}
