use indexmap::IndexMap;
use serde::Serialize;
use tracing::debug;

use crate::entity::{
    Account, AccountDraft, AccountPatch, Agent, AgentDraft, AgentPatch, EntityId, EntityKind,
    MINUTES_PER_DAY,
};
use crate::error::SpeError;

/// Borrowed view of a single entity, returned by [`EntityStore::get`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum EntityView<'a> {
    Agent(&'a Agent),
    Account(&'a Account),
}

impl EntityView<'_> {
    pub fn name(&self) -> &str {
        match self {
            EntityView::Agent(a) => &a.name,
            EntityView::Account(a) => &a.name,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct StoreStats {
    pub agent_count: usize,
    pub account_count: usize,
    pub pinned_accounts: usize,
    pub dangling_pins: usize,
}

/// Owns every agent and account of an editing session.
///
/// Both collections keep insertion order; removal preserves the relative
/// order of the remaining entries.
#[derive(Debug, Clone, Default)]
pub struct EntityStore {
    agents: IndexMap<EntityId, Agent>,
    accounts: IndexMap<EntityId, Account>,
}

impl EntityStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_agent(&mut self, draft: AgentDraft) -> EntityId {
        let id = EntityId::generate();
        let agent = Agent {
            id: id.clone(),
            name: draft.name,
            lat: draft.position.lat,
            lng: draft.position.lng,
            schedule: draft.schedule,
        };
        debug!(id = %id, name = %agent.name, "agent added");
        self.agents.insert(id.clone(), agent);
        id
    }

    pub fn add_account(&mut self, draft: AccountDraft) -> EntityId {
        let id = EntityId::generate();
        let account = Account {
            id: id.clone(),
            name: draft.name,
            lat: draft.position.lat,
            lng: draft.position.lng,
            estimated_service_minutes: draft.estimated_service_minutes,
            service_window_start_min: draft.service_window_start_min,
            service_window_duration_min: draft.service_window_duration_min,
            pinned_agent_id: draft.pinned_agent_id,
            agents_available_ratio: 0.0,
            schedule: draft.schedule,
        };
        debug!(id = %id, name = %account.name, "account added");
        self.accounts.insert(id.clone(), account);
        id
    }

    /// Insert an agent that already carries an id (external load).
    pub fn insert_agent(&mut self, agent: Agent) -> Result<(), SpeError> {
        if self.agents.contains_key(&agent.id) {
            return Err(SpeError::DuplicateId(agent.id.to_string()));
        }
        self.agents.insert(agent.id.clone(), agent);
        Ok(())
    }

    /// Insert an account that already carries an id (external load).
    pub fn insert_account(&mut self, account: Account) -> Result<(), SpeError> {
        if self.accounts.contains_key(&account.id) {
            return Err(SpeError::DuplicateId(account.id.to_string()));
        }
        self.accounts.insert(account.id.clone(), account);
        Ok(())
    }

    /// Remove an agent. Unknown ids are ignored.
    pub fn remove_agent(&mut self, id: &EntityId) -> Option<Agent> {
        let removed = self.agents.shift_remove(id);
        if removed.is_some() {
            debug!(id = %id, "agent removed");
        }
        removed
    }

    /// Remove an account. Unknown ids are ignored.
    pub fn remove_account(&mut self, id: &EntityId) -> Option<Account> {
        let removed = self.accounts.shift_remove(id);
        if removed.is_some() {
            debug!(id = %id, "account removed");
        }
        removed
    }

    pub fn remove(&mut self, kind: EntityKind, id: &EntityId) -> bool {
        match kind {
            EntityKind::Agent => self.remove_agent(id).is_some(),
            EntityKind::Account => self.remove_account(id).is_some(),
        }
    }

    /// Apply a patch to an agent. Returns `Ok(false)` when the id is unknown.
    pub fn update_agent(&mut self, id: &EntityId, patch: AgentPatch) -> Result<bool, SpeError> {
        let Some(agent) = self.agents.get_mut(id) else {
            return Ok(false);
        };
        if let Some(position) = patch.position {
            if !position.is_valid() {
                return Err(SpeError::InvalidCoordinate { lat: position.lat, lng: position.lng });
            }
            agent.lat = position.lat;
            agent.lng = position.lng;
        }
        if let Some(name) = patch.name {
            agent.name = name;
        }
        if let Some(schedule) = patch.schedule {
            schedule.apply(&mut agent.schedule);
        }
        Ok(true)
    }

    /// Apply a patch to an account. Returns `Ok(false)` when the id is unknown.
    ///
    /// Every field is validated before anything is written, so a rejected
    /// patch leaves the account untouched.
    pub fn update_account(
        &mut self,
        id: &EntityId,
        patch: AccountPatch,
    ) -> Result<bool, SpeError> {
        let Some(account) = self.accounts.get_mut(id) else {
            return Ok(false);
        };
        validate_account_patch(&patch)?;

        if let Some(name) = patch.name {
            account.name = name;
        }
        if let Some(position) = patch.position {
            account.lat = position.lat;
            account.lng = position.lng;
        }
        if let Some(v) = patch.estimated_service_minutes {
            account.estimated_service_minutes = v;
        }
        if let Some(v) = patch.service_window_start_min {
            account.service_window_start_min = v;
        }
        if let Some(v) = patch.service_window_duration_min {
            account.service_window_duration_min = v;
        }
        if let Some(pin) = patch.pinned_agent_id {
            account.pinned_agent_id = pin;
        }
        if let Some(ratio) = patch.agents_available_ratio {
            account.agents_available_ratio = ratio;
        }
        if let Some(schedule) = patch.schedule {
            schedule.apply(&mut account.schedule);
        }
        Ok(true)
    }

    pub fn get(&self, kind: EntityKind, id: &EntityId) -> Option<EntityView<'_>> {
        match kind {
            EntityKind::Agent => self.agents.get(id).map(EntityView::Agent),
            EntityKind::Account => self.accounts.get(id).map(EntityView::Account),
        }
    }

    pub fn agent(&self, id: &EntityId) -> Option<&Agent> {
        self.agents.get(id)
    }

    pub fn account(&self, id: &EntityId) -> Option<&Account> {
        self.accounts.get(id)
    }

    pub fn contains(&self, kind: EntityKind, id: &EntityId) -> bool {
        self.get(kind, id).is_some()
    }

    pub fn agents(&self) -> impl ExactSizeIterator<Item = &Agent> + '_ {
        self.agents.values()
    }

    pub fn accounts(&self) -> impl ExactSizeIterator<Item = &Account> + '_ {
        self.accounts.values()
    }

    pub fn agent_count(&self) -> usize {
        self.agents.len()
    }

    pub fn account_count(&self) -> usize {
        self.accounts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.agents.is_empty() && self.accounts.is_empty()
    }

    /// Accounts pinned to an agent id that is not in the store.
    pub fn dangling_pins(&self) -> Vec<&Account> {
        self.accounts
            .values()
            .filter(|a| match a.pinned_agent() {
                Some(pin) => !self.agents.contains_key(&pin),
                None => false,
            })
            .collect()
    }

    pub fn stats(&self) -> StoreStats {
        StoreStats {
            agent_count: self.agents.len(),
            account_count: self.accounts.len(),
            pinned_accounts: self
                .accounts
                .values()
                .filter(|a| a.pinned_agent().is_some())
                .count(),
            dangling_pins: self.dangling_pins().len(),
        }
    }
}

fn validate_account_patch(patch: &AccountPatch) -> Result<(), SpeError> {
    if let Some(position) = patch.position {
        if !position.is_valid() {
            return Err(SpeError::InvalidCoordinate { lat: position.lat, lng: position.lng });
        }
    }
    if let Some(v) = patch.estimated_service_minutes {
        if !(v.is_finite() && v >= 0.0) {
            return Err(SpeError::InvalidField {
                field: "estimated_service_minutes",
                reason: format!("must be a non-negative number, got {}", v),
            });
        }
    }
    check_minute_of_day("service_window_start_min", patch.service_window_start_min)?;
    check_minute_of_day("service_window_duration_min", patch.service_window_duration_min)?;
    if let Some(ratio) = patch.agents_available_ratio {
        if !(0.0..=1.0).contains(&ratio) {
            return Err(SpeError::InvalidField {
                field: "agents_available_ratio",
                reason: format!("must be within [0, 1], got {}", ratio),
            });
        }
    }
    Ok(())
}

fn check_minute_of_day(field: &'static str, value: Option<f64>) -> Result<(), SpeError> {
    match value {
        Some(v) if !(0.0..=MINUTES_PER_DAY).contains(&v) => Err(SpeError::InvalidField {
            field,
            reason: format!("must be within [0, {}], got {}", MINUTES_PER_DAY, v),
        }),
        _ => Ok(()),
    }
}
