use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::geo::GeoPoint;
use crate::schedule::{Schedule, SchedulePatch};

/// Default service time for a freshly placed account, in minutes.
pub const DEFAULT_SERVICE_MINUTES: f64 = 60.0;
/// Default window opening (08:00), minutes after midnight.
pub const DEFAULT_WINDOW_START_MIN: f64 = 480.0;
/// Default window length (five hours), in minutes.
pub const DEFAULT_WINDOW_DURATION_MIN: f64 = 300.0;
/// Minutes in a day; upper bound for window fields.
pub const MINUTES_PER_DAY: f64 = 1440.0;

/// Opaque entity identifier. Ids minted by the editor are UUID v4 strings,
/// ids loaded from elsewhere are kept verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntityId(String);

impl EntityId {
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for EntityId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for EntityId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl std::fmt::Display for EntityId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    Agent,
    Account,
}

impl std::fmt::Display for EntityKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EntityKind::Agent => write!(f, "agent"),
            EntityKind::Account => write!(f, "account"),
        }
    }
}

/// Typed reference to an entity in the store.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EntityRef {
    pub kind: EntityKind,
    pub id: EntityId,
}

impl EntityRef {
    pub fn agent(id: EntityId) -> Self {
        Self { kind: EntityKind::Agent, id }
    }

    pub fn account(id: EntityId) -> Self {
        Self { kind: EntityKind::Account, id }
    }
}

impl std::fmt::Display for EntityRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.kind, self.id)
    }
}

/// A mobile worker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Agent {
    pub id: EntityId,
    pub name: String,
    pub lat: f64,
    pub lng: f64,
    #[serde(default)]
    pub schedule: Schedule,
}

impl Agent {
    pub fn position(&self) -> GeoPoint {
        GeoPoint::new(self.lat, self.lng)
    }
}

/// A service location.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Account {
    pub id: EntityId,
    pub name: String,
    pub lat: f64,
    pub lng: f64,
    pub estimated_service_minutes: f64,
    pub service_window_start_min: f64,
    pub service_window_duration_min: f64,
    /// Empty when the account is not pinned.
    #[serde(default)]
    pub pinned_agent_id: String,
    /// Share of agents able to serve this account; 0 lets the service derive it.
    #[serde(default)]
    pub agents_available_ratio: f64,
    #[serde(default)]
    pub schedule: Schedule,
}

impl Account {
    pub fn position(&self) -> GeoPoint {
        GeoPoint::new(self.lat, self.lng)
    }

    pub fn pinned_agent(&self) -> Option<EntityId> {
        let pinned = self.pinned_agent_id.trim();
        if pinned.is_empty() {
            None
        } else {
            Some(EntityId::from(pinned))
        }
    }
}

/// Fields for a new agent; the store assigns the id.
#[derive(Debug, Clone, PartialEq)]
pub struct AgentDraft {
    pub name: String,
    pub position: GeoPoint,
    pub schedule: Schedule,
}

/// Fields for a new account; the store assigns the id.
#[derive(Debug, Clone, PartialEq)]
pub struct AccountDraft {
    pub name: String,
    pub position: GeoPoint,
    pub estimated_service_minutes: f64,
    pub service_window_start_min: f64,
    pub service_window_duration_min: f64,
    pub pinned_agent_id: String,
    pub schedule: Schedule,
}

impl AccountDraft {
    /// Draft with the editor's default service fields.
    pub fn with_defaults(name: impl Into<String>, position: GeoPoint) -> Self {
        Self {
            name: name.into(),
            position,
            estimated_service_minutes: DEFAULT_SERVICE_MINUTES,
            service_window_start_min: DEFAULT_WINDOW_START_MIN,
            service_window_duration_min: DEFAULT_WINDOW_DURATION_MIN,
            pinned_agent_id: String::new(),
            schedule: Schedule::default(),
        }
    }
}

/// Partial update for an agent. `schedule` merges field-wise, everything
/// else replaces wholesale.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AgentPatch {
    pub name: Option<String>,
    pub position: Option<GeoPoint>,
    pub schedule: Option<SchedulePatch>,
}

/// Partial update for an account. Same merge rules as [`AgentPatch`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AccountPatch {
    pub name: Option<String>,
    pub position: Option<GeoPoint>,
    pub estimated_service_minutes: Option<f64>,
    pub service_window_start_min: Option<f64>,
    pub service_window_duration_min: Option<f64>,
    pub pinned_agent_id: Option<String>,
    pub agents_available_ratio: Option<f64>,
    pub schedule: Option<SchedulePatch>,
}
