//! Configuration served by the analysis service at `GET /api/config`.

use serde::{Deserialize, Deserializer, Serialize};
use spe_core::{scenario::default_h3_levels, ResolutionConfig, ScenarioSettings};

pub const DEFAULT_LATITUDE: f64 = 37.8;
pub const DEFAULT_LONGITUDE: f64 = -85.0;
pub const DEFAULT_ZOOM: f64 = 6.0;
pub const DEFAULT_BASE_FREQUENCY: f64 = 16.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteConfig {
    #[serde(default)]
    pub mapbox_token: String,
    #[serde(default, deserialize_with = "view_or_default")]
    pub initial_view_state: ViewState,
    #[serde(default)]
    pub ui: UiToggles,
    #[serde(default)]
    pub defaults: ResolutionDefaults,
    #[serde(default)]
    pub h3_levels: Vec<u8>,
    #[serde(default)]
    pub cycle_days: u32,
    #[serde(default)]
    pub base_frequency: f64,
}

impl Default for RemoteConfig {
    /// Built-in configuration used whenever the service cannot provide one.
    fn default() -> Self {
        let res = ResolutionConfig::default();
        Self {
            mapbox_token: String::new(),
            initial_view_state: ViewState::default(),
            ui: UiToggles::default(),
            defaults: ResolutionDefaults {
                res_service_stop_time: Some(res.res_service_stop_time),
                res_service_window_start: Some(res.res_service_window_start),
                res_service_window_duration: Some(res.res_service_window_duration),
                res_pinned_accounts: Some(res.res_pinned_accounts),
                res_agents_available: Some(res.res_agents_available),
                res_agent_start_locations: Some(res.res_agent_start_locations),
            },
            h3_levels: default_h3_levels(),
            cycle_days: spe_core::DEFAULT_CYCLE_DAYS,
            base_frequency: DEFAULT_BASE_FREQUENCY,
        }
    }
}

impl RemoteConfig {
    /// Resolution values with each missing or zero entry replaced by its
    /// built-in default.
    pub fn resolution(&self) -> ResolutionConfig {
        let fallback = ResolutionConfig::default();
        let pick = |v: Option<u32>, d: u32| v.filter(|&v| v != 0).unwrap_or(d);
        let d = &self.defaults;
        ResolutionConfig {
            res_service_stop_time: pick(d.res_service_stop_time, fallback.res_service_stop_time),
            res_service_window_start: pick(
                d.res_service_window_start,
                fallback.res_service_window_start,
            ),
            res_service_window_duration: pick(
                d.res_service_window_duration,
                fallback.res_service_window_duration,
            ),
            res_pinned_accounts: pick(d.res_pinned_accounts, fallback.res_pinned_accounts),
            res_agents_available: pick(d.res_agents_available, fallback.res_agents_available),
            res_agent_start_locations: pick(
                d.res_agent_start_locations,
                fallback.res_agent_start_locations,
            ),
        }
    }

    /// Scenario settings carrying the served H3 levels and cycle length.
    pub fn scenario_settings(&self, name: &str) -> ScenarioSettings {
        ScenarioSettings {
            name: name.to_string(),
            h3_levels: if self.h3_levels.is_empty() {
                default_h3_levels()
            } else {
                self.h3_levels.clone()
            },
            cycle_days: if self.cycle_days == 0 {
                spe_core::DEFAULT_CYCLE_DAYS
            } else {
                self.cycle_days
            },
        }
    }

    /// True when the initial view can be used to create the map surface.
    pub fn has_valid_view(&self) -> bool {
        self.initial_view_state.latitude.is_finite() && self.initial_view_state.longitude.is_finite()
    }
}

/// Initial camera position. Missing or `null` values take the built-in
/// default; any other non-number deserializes as NaN so the caller can
/// refuse to initialize the surface.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ViewState {
    #[serde(default = "default_latitude", deserialize_with = "latitude_or_default")]
    pub latitude: f64,
    #[serde(default = "default_longitude", deserialize_with = "longitude_or_default")]
    pub longitude: f64,
    #[serde(default = "default_zoom", deserialize_with = "zoom_or_default")]
    pub zoom: f64,
}

impl Default for ViewState {
    fn default() -> Self {
        Self {
            latitude: DEFAULT_LATITUDE,
            longitude: DEFAULT_LONGITUDE,
            zoom: DEFAULT_ZOOM,
        }
    }
}

fn default_latitude() -> f64 {
    DEFAULT_LATITUDE
}

fn default_longitude() -> f64 {
    DEFAULT_LONGITUDE
}

fn default_zoom() -> f64 {
    DEFAULT_ZOOM
}

fn view_or_default<'de, D>(deserializer: D) -> Result<ViewState, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<ViewState>::deserialize(deserializer)?.unwrap_or_default())
}

fn latitude_or_default<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
    lenient_f64(deserializer, DEFAULT_LATITUDE)
}

fn longitude_or_default<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
    lenient_f64(deserializer, DEFAULT_LONGITUDE)
}

fn zoom_or_default<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
    lenient_f64(deserializer, DEFAULT_ZOOM)
}

fn lenient_f64<'de, D>(deserializer: D, default: f64) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(match value {
        serde_json::Value::Null => default,
        serde_json::Value::Number(n) => n.as_f64().unwrap_or(f64::NAN),
        serde_json::Value::String(s) => s.trim().parse().unwrap_or(f64::NAN),
        _ => f64::NAN,
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UiToggles {
    #[serde(default = "enabled")]
    pub embedding_tab: bool,
    #[serde(default = "enabled")]
    pub spectral_tab: bool,
    #[serde(default = "enabled")]
    pub heatmap_tab: bool,
}

impl Default for UiToggles {
    fn default() -> Self {
        Self {
            embedding_tab: true,
            spectral_tab: true,
            heatmap_tab: true,
        }
    }
}

fn enabled() -> bool {
    true
}

/// Resolution defaults as served. Every entry is optional; use
/// [`RemoteConfig::resolution`] to resolve them.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolutionDefaults {
    #[serde(default)]
    pub res_service_stop_time: Option<u32>,
    #[serde(default)]
    pub res_service_window_start: Option<u32>,
    #[serde(default)]
    pub res_service_window_duration: Option<u32>,
    #[serde(default)]
    pub res_pinned_accounts: Option<u32>,
    #[serde(default)]
    pub res_agents_available: Option<u32>,
    #[serde(default)]
    pub res_agent_start_locations: Option<u32>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_default() {
        let cfg = RemoteConfig::default();
        assert_eq!(cfg.mapbox_token, "");
        assert_eq!(cfg.initial_view_state, ViewState { latitude: 37.8, longitude: -85.0, zoom: 6.0 });
        assert!(cfg.ui.embedding_tab && cfg.ui.spectral_tab && cfg.ui.heatmap_tab);
        assert_eq!(cfg.h3_levels, vec![5, 6, 7, 8, 9, 10, 11]);
        assert_eq!(cfg.cycle_days, 28);
        assert_eq!(cfg.base_frequency, 16.0);
        assert_eq!(cfg.resolution(), ResolutionConfig::default());
    }

    #[test]
    fn test_zero_and_missing_defaults_fall_back_per_field() {
        let cfg: RemoteConfig = serde_json::from_str(
            r#"{"defaults":{"resServiceStopTime":0,"resPinnedAccounts":96}}"#,
        )
        .unwrap();
        let res = cfg.resolution();
        assert_eq!(res.res_service_stop_time, 1024);
        assert_eq!(res.res_pinned_accounts, 96);
        assert_eq!(res.res_agents_available, 128);
        assert_eq!(res.res_agent_start_locations, 64);
    }

    #[test]
    fn test_camel_case_wire_names() {
        let cfg: RemoteConfig = serde_json::from_str(
            r#"{
                "mapboxToken": "pk.test",
                "initialViewState": {"latitude": 40.0, "longitude": -74.0, "zoom": 9},
                "ui": {"embeddingTab": true, "spectralTab": false, "heatmapTab": true},
                "h3Levels": [7, 8],
                "cycleDays": 14,
                "baseFrequency": 8
            }"#,
        )
        .unwrap();
        assert_eq!(cfg.mapbox_token, "pk.test");
        assert_eq!(cfg.initial_view_state.zoom, 9.0);
        assert!(!cfg.ui.spectral_tab);

        let settings = cfg.scenario_settings("POC");
        assert_eq!(settings.h3_levels, vec![7, 8]);
        assert_eq!(settings.cycle_days, 14);
    }

    #[test]
    fn test_non_numeric_view_is_invalid() {
        let cfg: RemoteConfig =
            serde_json::from_str(r#"{"initialViewState":{"latitude":"north","longitude":-85}}"#)
                .unwrap();
        assert!(cfg.initial_view_state.latitude.is_nan());
        assert!(!cfg.has_valid_view());
        assert!(RemoteConfig::default().has_valid_view());
    }

    #[test]
    fn test_null_coordinate_uses_default() {
        let cfg: RemoteConfig =
            serde_json::from_str(r#"{"initialViewState":{"latitude":null,"longitude":-80}}"#)
                .unwrap();
        assert_eq!(cfg.initial_view_state.latitude, DEFAULT_LATITUDE);
        assert_eq!(cfg.initial_view_state.longitude, -80.0);
        assert!(cfg.has_valid_view());
    }

    #[test]
    fn test_null_view_keeps_other_served_values() {
        let cfg: RemoteConfig = serde_json::from_str(
            r#"{"initialViewState":null,"defaults":{"resPinnedAccounts":96},"cycleDays":14}"#,
        )
        .unwrap();
        assert_eq!(cfg.initial_view_state, ViewState::default());
        assert!(cfg.has_valid_view());
        assert_eq!(cfg.resolution().res_pinned_accounts, 96);
        assert_eq!(cfg.cycle_days, 14);
    }

    #[test]
    fn test_missing_view_uses_default_position() {
        let cfg: RemoteConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(cfg.initial_view_state, ViewState::default());
        assert!(cfg.has_valid_view());
    }
}
