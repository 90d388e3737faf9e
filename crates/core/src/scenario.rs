//! Outbound scenario payload and the settings it is built from.

use serde::{Deserialize, Serialize};

use crate::entity::{Account, Agent};

pub const DEFAULT_SCENARIO_NAME: &str = "POC";
pub const DEFAULT_CYCLE_DAYS: u32 = 28;
pub const MAX_WORK_MINUTES_PER_WEEK: f64 = 2400.0;
pub const MAX_WORK_MINUTES_PER_DAY: f64 = 600.0;
pub const MAX_TRAVEL_MINUTES_PER_DAY: f64 = 480.0;

pub fn default_h3_levels() -> Vec<u8> {
    (5..=11).collect()
}

/// Resolution of each embedding feature block. These are passed through to
/// the analysis service untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolutionConfig {
    pub res_service_stop_time: u32,
    pub res_service_window_start: u32,
    pub res_service_window_duration: u32,
    pub res_pinned_accounts: u32,
    pub res_agents_available: u32,
    pub res_agent_start_locations: u32,
}

impl Default for ResolutionConfig {
    fn default() -> Self {
        Self {
            res_service_stop_time: 1024,
            res_service_window_start: 1024,
            res_service_window_duration: 1024,
            res_pinned_accounts: 64,
            res_agents_available: 128,
            res_agent_start_locations: 64,
        }
    }
}

impl ResolutionConfig {
    pub fn get(&self, field: ResolutionField) -> u32 {
        match field {
            ResolutionField::ServiceStopTime => self.res_service_stop_time,
            ResolutionField::ServiceWindowStart => self.res_service_window_start,
            ResolutionField::ServiceWindowDuration => self.res_service_window_duration,
            ResolutionField::PinnedAccounts => self.res_pinned_accounts,
            ResolutionField::AgentsAvailable => self.res_agents_available,
            ResolutionField::AgentStartLocations => self.res_agent_start_locations,
        }
    }

    pub fn set(&mut self, field: ResolutionField, value: u32) {
        let slot = match field {
            ResolutionField::ServiceStopTime => &mut self.res_service_stop_time,
            ResolutionField::ServiceWindowStart => &mut self.res_service_window_start,
            ResolutionField::ServiceWindowDuration => &mut self.res_service_window_duration,
            ResolutionField::PinnedAccounts => &mut self.res_pinned_accounts,
            ResolutionField::AgentsAvailable => &mut self.res_agents_available,
            ResolutionField::AgentStartLocations => &mut self.res_agent_start_locations,
        };
        *slot = value;
    }
}

/// One of the six resolution knobs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResolutionField {
    ServiceStopTime,
    ServiceWindowStart,
    ServiceWindowDuration,
    PinnedAccounts,
    AgentsAvailable,
    AgentStartLocations,
}

impl ResolutionField {
    pub fn all() -> &'static [ResolutionField] {
        &[
            ResolutionField::ServiceStopTime,
            ResolutionField::ServiceWindowStart,
            ResolutionField::ServiceWindowDuration,
            ResolutionField::PinnedAccounts,
            ResolutionField::AgentsAvailable,
            ResolutionField::AgentStartLocations,
        ]
    }

    /// UI step for the control; the time-of-day fields move in coarser steps.
    pub fn step(&self) -> u32 {
        match self {
            ResolutionField::ServiceStopTime
            | ResolutionField::ServiceWindowStart
            | ResolutionField::ServiceWindowDuration => 32,
            _ => 16,
        }
    }

    pub fn wire_name(&self) -> &'static str {
        match self {
            ResolutionField::ServiceStopTime => "res_service_stop_time",
            ResolutionField::ServiceWindowStart => "res_service_window_start",
            ResolutionField::ServiceWindowDuration => "res_service_window_duration",
            ResolutionField::PinnedAccounts => "res_pinned_accounts",
            ResolutionField::AgentsAvailable => "res_agents_available",
            ResolutionField::AgentStartLocations => "res_agent_start_locations",
        }
    }

    /// Name without the `res_` prefix, as typed at the prompt.
    pub fn short_name(&self) -> &'static str {
        &self.wire_name()[4..]
    }
}

impl std::fmt::Display for ResolutionField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.short_name())
    }
}

impl std::str::FromStr for ResolutionField {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase().replace('-', "_");
        let wanted = wanted.strip_prefix("res_").unwrap_or(&wanted);
        ResolutionField::all()
            .iter()
            .copied()
            .find(|f| f.short_name() == wanted)
            .ok_or_else(|| format!("unknown resolution field '{}'", s))
    }
}

/// Session-level knobs that end up in every outbound scenario.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioSettings {
    pub name: String,
    pub h3_levels: Vec<u8>,
    pub cycle_days: u32,
}

impl Default for ScenarioSettings {
    fn default() -> Self {
        Self {
            name: DEFAULT_SCENARIO_NAME.to_string(),
            h3_levels: default_h3_levels(),
            cycle_days: DEFAULT_CYCLE_DAYS,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Globals {
    pub max_agents: usize,
    pub max_work_minutes_per_week: f64,
    pub max_work_minutes_per_day: f64,
    pub max_travel_minutes_per_day: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioParams {
    #[serde(flatten)]
    pub resolution: ResolutionConfig,
    pub h3_levels: Vec<u8>,
    pub cycle_days: u32,
}

/// The request body sent to the analysis service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scenario {
    pub name: String,
    pub agents: Vec<Agent>,
    pub accounts: Vec<Account>,
    pub globals: Globals,
    pub params: ScenarioParams,
}

/// Snapshot the editor state into an outbound scenario.
///
/// Entities are copied, so later edits never leak into a request already
/// in flight. `max_agents` is never below one.
pub fn build_scenario<'a>(
    agents: impl IntoIterator<Item = &'a Agent>,
    accounts: impl IntoIterator<Item = &'a Account>,
    resolution: &ResolutionConfig,
    settings: &ScenarioSettings,
) -> Scenario {
    let agents: Vec<Agent> = agents.into_iter().cloned().collect();
    let accounts: Vec<Account> = accounts.into_iter().cloned().collect();
    Scenario {
        name: settings.name.clone(),
        globals: Globals {
            max_agents: agents.len().max(1),
            max_work_minutes_per_week: MAX_WORK_MINUTES_PER_WEEK,
            max_work_minutes_per_day: MAX_WORK_MINUTES_PER_DAY,
            max_travel_minutes_per_day: MAX_TRAVEL_MINUTES_PER_DAY,
        },
        params: ScenarioParams {
            resolution: *resolution,
            h3_levels: settings.h3_levels.clone(),
            cycle_days: settings.cycle_days,
        },
        agents,
        accounts,
    }
}
