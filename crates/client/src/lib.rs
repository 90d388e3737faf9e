pub mod client;
pub mod error;
pub mod remote_config;
pub mod service;
pub mod types;

pub use client::AnalysisClient;
pub use error::ClientError;
pub use remote_config::{RemoteConfig, ResolutionDefaults, UiToggles, ViewState};
pub use service::{fetch_config_or_default, AnalysisService};
pub use types::{HeatmapQuery, SimulationOutcome};
