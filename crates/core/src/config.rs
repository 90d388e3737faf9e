use std::env;

use serde::{Deserialize, Serialize};

/// Load .env file (silently ignores if missing).
pub fn load_dotenv() {
    dotenvy::dotenv().ok();
}

fn env_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

fn env_opt(key: &str) -> Option<String> {
    env::var(key).ok().filter(|s| !s.is_empty())
}

/// Read a profiled env var: tries {PROFILE}_{KEY} first, falls back to {KEY}.
fn profiled_env_opt(profile: &str, key: &str) -> Option<String> {
    if !profile.is_empty() {
        let prefixed = format!("{}_{}", profile, key);
        if let Some(v) = env_opt(&prefixed) {
            return Some(v);
        }
    }
    env_opt(key)
}

fn profiled_env_or(profile: &str, key: &str, default: &str) -> String {
    profiled_env_opt(profile, key).unwrap_or_else(|| default.to_string())
}

fn profiled_env_u64(profile: &str, key: &str, default: u64) -> u64 {
    profiled_env_opt(profile, key)
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

fn profiled_env_f64(profile: &str, key: &str, default: f64) -> f64 {
    profiled_env_opt(profile, key)
        .and_then(|v| v.parse::<f64>().ok())
        .filter(|v| v.is_finite())
        .unwrap_or(default)
}

/// Default analysis service location.
pub const DEFAULT_API_URL: &str = "http://localhost:8080";

/// Radius within which an erase click picks up an entity.
pub const DEFAULT_ERASE_THRESHOLD_KM: f64 = 0.5;

// ── Top-level config ──────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Active profile name (empty = default).
    pub profile: String,
    pub service: ServiceConfig,
    pub editor: EditorConfig,
}

impl Config {
    /// Build config from environment variables (call `load_dotenv()` first).
    /// Profile is read from `SPE_PROFILE`. When set (e.g. `STAGING`), every
    /// key is first looked up as `{PROFILE}_{KEY}`, falling back to `{KEY}`.
    pub fn from_env() -> Self {
        let profile = env_or("SPE_PROFILE", "").to_uppercase();
        Self::for_profile(&profile)
    }

    /// Build config for a specific named profile (empty string = default).
    pub fn for_profile(profile: &str) -> Self {
        let p = profile.to_uppercase();
        let p = p.as_str();
        Self {
            profile: p.to_string(),
            service: ServiceConfig::from_env_profiled(p),
            editor: EditorConfig::from_env_profiled(p),
        }
    }

    pub fn profile_label(&self) -> &str {
        if self.profile.is_empty() { "default" } else { &self.profile }
    }

    /// Print a summary for startup logs.
    pub fn log_summary(&self) {
        tracing::info!("Config loaded (profile: {}):", self.profile_label());
        tracing::info!(
            "  service:  url={}, timeout_ms={}",
            self.service.base_url,
            self.service.request_timeout_ms
        );
        tracing::info!(
            "  editor:   scenario={}, erase_threshold_km={}",
            self.editor.scenario_name,
            self.editor.erase_threshold_km
        );
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            profile: String::new(),
            service: ServiceConfig::default(),
            editor: EditorConfig::default(),
        }
    }
}

// ── Analysis service ──────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceConfig {
    pub base_url: String,
    pub request_timeout_ms: u64,
}

impl ServiceConfig {
    fn from_env_profiled(p: &str) -> Self {
        Self {
            base_url: profiled_env_or(p, "SPE_API_URL", DEFAULT_API_URL),
            request_timeout_ms: profiled_env_u64(p, "SPE_REQUEST_TIMEOUT_MS", 30_000),
        }
    }
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_API_URL.to_string(),
            request_timeout_ms: 30_000,
        }
    }
}

// ── Editor ────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EditorConfig {
    /// Name carried on every outbound scenario.
    pub scenario_name: String,
    pub erase_threshold_km: f64,
}

impl EditorConfig {
    fn from_env_profiled(p: &str) -> Self {
        Self {
            scenario_name: profiled_env_or(p, "SPE_SCENARIO_NAME", "POC"),
            erase_threshold_km: profiled_env_f64(
                p,
                "SPE_ERASE_THRESHOLD_KM",
                DEFAULT_ERASE_THRESHOLD_KM,
            ),
        }
    }
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            scenario_name: "POC".to_string(),
            erase_threshold_km: DEFAULT_ERASE_THRESHOLD_KM,
        }
    }
}
