//! The editing session: entity store, interaction mode and analysis state.
//!
//! A session is a single owned value. Every pointer event and every accepted
//! analysis reply is applied through `&mut self`, so handlers always see the
//! current mode and entity lists.

use indexmap::IndexMap;
use spe_client::{HeatmapQuery, RemoteConfig, SimulationOutcome, ViewState};
use spe_compute::{component_spectra, magnitude_spectrum};
use spe_core::config::EditorConfig;
use spe_core::{
    build_scenario, find_nearest, Account, AccountDraft, AccountPatch, Agent, AgentDraft,
    AgentPatch, EmbeddingResult, EntityKind, EntityRef, EntityStore, EntityView, GeoPoint,
    HeatmapCell, ResolutionConfig, ResolutionField, Scenario, ScenarioSettings, Schedule,
    SchedulePatch, SearchHit, SpeError,
};
use tracing::{debug, info, warn};

use crate::error::EditorError;
use crate::filter::VisibilityFilter;
use crate::mode::EditorMode;
use crate::notices::{NoticeLevel, NoticeLog};
use crate::panel::AnalysisPanel;

/// Effect of a map click.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClickOutcome {
    /// Select mode: nothing changes.
    Ignored,
    Created(EntityRef),
    Erased(EntityRef),
    /// Erase mode with no entity inside the threshold.
    NoMatch,
}

/// Lifecycle of the map surface.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SurfaceState {
    Pending,
    Ready(ViewState),
}

/// Latest accepted analysis responses. Each field is replaced wholesale.
#[derive(Debug, Clone, Default)]
pub struct AnalysisResults {
    pub embedding: Option<EmbeddingResult>,
    pub hits: Vec<SearchHit>,
    pub cells: Vec<HeatmapCell>,
    pub simulation: Option<SimulationOutcome>,
    pub saved_scenario_id: Option<String>,
    pub embedding_id: Option<String>,
}

#[derive(Debug)]
pub struct EditorSession {
    store: EntityStore,
    mode: EditorMode,
    selection: Option<EntityRef>,
    filter: VisibilityFilter,
    panel: AnalysisPanel,
    resolution: ResolutionConfig,
    settings: ScenarioSettings,
    erase_threshold_km: f64,
    surface: SurfaceState,
    remote: Option<RemoteConfig>,
    results: AnalysisResults,
    notices: NoticeLog,
}

impl Default for EditorSession {
    fn default() -> Self {
        Self::new(&EditorConfig::default())
    }
}

impl EditorSession {
    pub fn new(config: &EditorConfig) -> Self {
        Self {
            store: EntityStore::new(),
            mode: EditorMode::default(),
            selection: None,
            filter: VisibilityFilter::default(),
            panel: AnalysisPanel::default(),
            resolution: ResolutionConfig::default(),
            settings: ScenarioSettings {
                name: config.scenario_name.clone(),
                ..ScenarioSettings::default()
            },
            erase_threshold_km: config.erase_threshold_km,
            surface: SurfaceState::Pending,
            remote: None,
            results: AnalysisResults::default(),
            notices: NoticeLog::default(),
        }
    }

    // ── Interaction ─────────────────────────────────────────────

    pub fn mode(&self) -> EditorMode {
        self.mode
    }

    pub fn set_mode(&mut self, mode: EditorMode) {
        debug!(from = %self.mode, to = %mode, "mode changed");
        self.mode = mode;
    }

    /// Apply a click at `point` according to the current mode.
    ///
    /// Clicks are ignored until the map surface exists.
    pub fn on_map_click(&mut self, point: GeoPoint) -> Result<ClickOutcome, SpeError> {
        if self.surface == SurfaceState::Pending {
            debug!(at = %point, "click ignored: map surface not initialized");
            return Ok(ClickOutcome::Ignored);
        }
        match self.mode {
            EditorMode::Select => Ok(ClickOutcome::Ignored),
            EditorMode::CreateAgent => {
                ensure_valid(point)?;
                let draft = AgentDraft {
                    name: format!("Agent {}", self.store.agent_count() + 1),
                    position: point,
                    schedule: Schedule::default(),
                };
                let id = self.store.add_agent(draft);
                info!(id = %id, at = %point, "agent created");
                Ok(ClickOutcome::Created(EntityRef::agent(id)))
            }
            EditorMode::CreateAccount => {
                ensure_valid(point)?;
                let name = format!("Account {}", self.store.account_count() + 1);
                let id = self.store.add_account(AccountDraft::with_defaults(name, point));
                info!(id = %id, at = %point, "account created");
                Ok(ClickOutcome::Created(EntityRef::account(id)))
            }
            EditorMode::Erase => {
                let found = find_nearest(
                    point,
                    self.store.agents(),
                    self.store.accounts(),
                    self.erase_threshold_km,
                );
                let Some(target) = found else {
                    debug!(at = %point, "erase: nothing in range");
                    return Ok(ClickOutcome::NoMatch);
                };
                self.store.remove(target.kind, &target.id);
                if self.selection.as_ref() == Some(&target) {
                    self.selection = None;
                }
                info!(entity = %target, "entity erased");
                Ok(ClickOutcome::Erased(target))
            }
        }
    }

    pub fn select(&mut self, target: EntityRef) -> Result<(), EditorError> {
        if !self.store.contains(target.kind, &target.id) {
            return Err(SpeError::UnknownEntity(target.to_string()).into());
        }
        self.selection = Some(target);
        Ok(())
    }

    pub fn clear_selection(&mut self) {
        self.selection = None;
    }

    pub fn selection(&self) -> Option<&EntityRef> {
        self.selection.as_ref()
    }

    pub fn selected(&self) -> Option<EntityView<'_>> {
        let target = self.selection.as_ref()?;
        self.store.get(target.kind, &target.id)
    }

    pub fn rename_selected(&mut self, name: &str) -> Result<(), EditorError> {
        let target = self.selection.clone().ok_or(EditorError::NothingSelected)?;
        let name = name.trim().to_string();
        if name.is_empty() {
            return Err(SpeError::InvalidField {
                field: "name",
                reason: "must not be empty".to_string(),
            }
            .into());
        }
        let found = match target.kind {
            EntityKind::Agent => self.store.update_agent(
                &target.id,
                AgentPatch { name: Some(name), ..Default::default() },
            )?,
            EntityKind::Account => self.store.update_account(
                &target.id,
                AccountPatch { name: Some(name), ..Default::default() },
            )?,
        };
        ensure_found(found, &target)
    }

    pub fn patch_selected_schedule(&mut self, patch: SchedulePatch) -> Result<(), EditorError> {
        let target = self.selection.clone().ok_or(EditorError::NothingSelected)?;
        let found = match target.kind {
            EntityKind::Agent => self.store.update_agent(
                &target.id,
                AgentPatch { schedule: Some(patch), ..Default::default() },
            )?,
            EntityKind::Account => self.store.update_account(
                &target.id,
                AccountPatch { schedule: Some(patch), ..Default::default() },
            )?,
        };
        ensure_found(found, &target)
    }

    /// Patch the selected account's service fields.
    pub fn update_selected_account(&mut self, patch: AccountPatch) -> Result<(), EditorError> {
        let target = self.selection.clone().ok_or(EditorError::NothingSelected)?;
        if target.kind != EntityKind::Account {
            return Err(EditorError::NotAnAccount(target));
        }
        let found = self.store.update_account(&target.id, patch)?;
        ensure_found(found, &target)
    }

    // ── Store access ────────────────────────────────────────────

    pub fn store(&self) -> &EntityStore {
        &self.store
    }

    pub fn filter(&self) -> &VisibilityFilter {
        &self.filter
    }

    pub fn filter_mut(&mut self) -> &mut VisibilityFilter {
        &mut self.filter
    }

    pub fn visible_agents(&self) -> Vec<&Agent> {
        self.store.agents().filter(|a| self.filter.matches(&a.schedule)).collect()
    }

    pub fn visible_accounts(&self) -> Vec<&Account> {
        self.store.accounts().filter(|a| self.filter.matches(&a.schedule)).collect()
    }

    /// Accounts whose schedule is active on `day` of the cycle.
    pub fn accounts_active_on(&self, day: u32) -> usize {
        let cycle = self.settings.cycle_days;
        self.store
            .accounts()
            .filter(|a| a.schedule.is_active_on(day, cycle))
            .count()
    }

    // ── Scenario parameters ─────────────────────────────────────

    pub fn resolution(&self) -> &ResolutionConfig {
        &self.resolution
    }

    pub fn set_resolution(&mut self, field: ResolutionField, value: u32) {
        self.resolution.set(field, value);
    }

    pub fn settings(&self) -> &ScenarioSettings {
        &self.settings
    }

    pub fn panel(&self) -> &AnalysisPanel {
        &self.panel
    }

    pub fn panel_mut(&mut self) -> &mut AnalysisPanel {
        &mut self.panel
    }

    /// Snapshot of the live state as an outbound scenario.
    pub fn build_scenario(&self) -> Scenario {
        build_scenario(
            self.store.agents(),
            self.store.accounts(),
            &self.resolution,
            &self.settings,
        )
    }

    pub fn heatmap_query(&self) -> HeatmapQuery {
        let controls = self.panel.heatmap();
        HeatmapQuery {
            scenario: self.build_scenario(),
            feature: controls.feature,
            day: controls.day,
            h3_level: controls.h3_level,
        }
    }

    // ── Remote configuration & surface ──────────────────────────

    /// Adopt a configuration from the analysis service.
    ///
    /// Resolution defaults and scenario settings are always taken over. The
    /// map surface is created at most once, and only when the configured
    /// initial position is finite. Returns true when this call created it.
    pub fn apply_remote_config(&mut self, config: RemoteConfig) -> bool {
        self.resolution = config.resolution();
        self.settings = config.scenario_settings(&self.settings.name);
        self.panel.set_cycle_days(self.settings.cycle_days);

        let mut initialized = false;
        if self.surface == SurfaceState::Pending {
            if config.has_valid_view() {
                self.surface = SurfaceState::Ready(config.initial_view_state);
                info!(
                    lat = config.initial_view_state.latitude,
                    lng = config.initial_view_state.longitude,
                    zoom = config.initial_view_state.zoom,
                    "map surface initialized"
                );
                initialized = true;
            } else {
                warn!(view = ?config.initial_view_state, "invalid initial coordinates, surface not initialized");
                self.notices.push(
                    NoticeLevel::Warning,
                    "Map not initialized: configuration has invalid coordinates",
                );
            }
        }
        self.remote = Some(config);
        initialized
    }

    pub fn surface(&self) -> SurfaceState {
        self.surface
    }

    pub fn remote_config(&self) -> Option<&RemoteConfig> {
        self.remote.as_ref()
    }

    // ── Analysis results ────────────────────────────────────────

    pub fn results(&self) -> &AnalysisResults {
        &self.results
    }

    pub fn has_embedding(&self) -> bool {
        self.results.embedding.is_some()
    }

    pub(crate) fn set_embedding(&mut self, embedding: EmbeddingResult) {
        let message = format!(
            "Embedding computed: {} values in {} components",
            embedding.embedding.len(),
            embedding.components.len()
        );
        self.results.embedding = Some(embedding);
        self.notices.push(NoticeLevel::Success, message);
    }

    pub(crate) fn set_saved(&mut self, scenario_id: String) {
        self.notices.push(NoticeLevel::Success, format!("Saved scenario id: {}", scenario_id));
        self.results.saved_scenario_id = Some(scenario_id);
    }

    pub(crate) fn set_indexed(&mut self, scenario_id: String, embedding_id: String) {
        self.notices.push(NoticeLevel::Success, format!("Indexed embedding: {}", embedding_id));
        self.results.saved_scenario_id = Some(scenario_id);
        self.results.embedding_id = Some(embedding_id);
    }

    pub(crate) fn set_hits(&mut self, hits: Vec<SearchHit>) {
        self.notices.push(NoticeLevel::Info, format!("{} similar scenarios", hits.len()));
        self.results.hits = hits;
    }

    pub(crate) fn set_simulation(&mut self, outcome: SimulationOutcome) {
        self.notices.push(
            NoticeLevel::Success,
            format!("Sim complete. Unassigned: {}", outcome.stats.unassigned_stops),
        );
        self.results.simulation = Some(outcome);
    }

    pub(crate) fn set_cells(&mut self, cells: Vec<HeatmapCell>) {
        self.notices.push(NoticeLevel::Info, format!("Heatmap: {} cells", cells.len()));
        self.results.cells = cells;
    }

    /// Spectrum of the component chosen in the panel, if the latest
    /// embedding has it.
    pub fn selected_spectrum(&self) -> Option<Vec<f64>> {
        self.component_spectrum(self.panel.component())
    }

    pub fn component_spectrum(&self, name: &str) -> Option<Vec<f64>> {
        let embedding = self.results.embedding.as_ref()?;
        embedding.component(name).map(magnitude_spectrum)
    }

    pub fn all_spectra(&self) -> IndexMap<String, Vec<f64>> {
        self.results
            .embedding
            .as_ref()
            .map(component_spectra)
            .unwrap_or_default()
    }

    // ── Notices ─────────────────────────────────────────────────

    pub fn notify(&mut self, level: NoticeLevel, message: impl Into<String>) {
        self.notices.push(level, message);
    }

    pub fn notices(&self) -> &NoticeLog {
        &self.notices
    }

    pub fn notices_mut(&mut self) -> &mut NoticeLog {
        &mut self.notices
    }
}

fn ensure_valid(point: GeoPoint) -> Result<(), SpeError> {
    if point.is_valid() {
        Ok(())
    } else {
        Err(SpeError::InvalidCoordinate { lat: point.lat, lng: point.lng })
    }
}

fn ensure_found(found: bool, target: &EntityRef) -> Result<(), EditorError> {
    if found {
        Ok(())
    } else {
        Err(SpeError::UnknownEntity(target.to_string()).into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use spe_core::{distance_km, Anchor, ScheduleType, EARTH_RADIUS_KM};

    /// Session whose map surface has been created from the built-in config.
    fn session() -> EditorSession {
        let mut s = EditorSession::default();
        assert!(s.apply_remote_config(RemoteConfig::default()));
        s
    }

    fn created(outcome: ClickOutcome) -> EntityRef {
        match outcome {
            ClickOutcome::Created(r) => r,
            other => panic!("expected Created, got {other:?}"),
        }
    }

    #[test]
    fn test_create_then_erase_agent() {
        let mut s = session();
        let here = GeoPoint::new(37.8, -85.0);

        s.set_mode(EditorMode::CreateAgent);
        let r = created(s.on_map_click(here).unwrap());
        assert_eq!(r.kind, EntityKind::Agent);

        let agent = s.store().agent(&r.id).unwrap();
        assert_eq!(agent.name, "Agent 1");
        assert_eq!((agent.lat, agent.lng), (37.8, -85.0));
        assert_eq!(agent.schedule, Schedule::new(ScheduleType::Weekly, Anchor::Mon));

        s.set_mode(EditorMode::Erase);
        assert_eq!(s.on_map_click(here).unwrap(), ClickOutcome::Erased(r));
        assert!(s.store().is_empty());
    }

    #[test]
    fn test_account_defaults_and_numbering() {
        let mut s = session();
        s.set_mode(EditorMode::CreateAccount);
        created(s.on_map_click(GeoPoint::new(1.0, 1.0)).unwrap());
        let r = created(s.on_map_click(GeoPoint::new(2.0, 2.0)).unwrap());

        let account = s.store().account(&r.id).unwrap();
        assert_eq!(account.name, "Account 2");
        assert_eq!(account.estimated_service_minutes, 60.0);
        assert_eq!(account.service_window_start_min, 480.0);
        assert_eq!(account.service_window_duration_min, 300.0);
        assert_eq!(account.pinned_agent_id, "");
        assert_eq!(account.schedule, Schedule::default());
    }

    #[test]
    fn test_select_mode_ignores_clicks() {
        let mut s = session();
        assert_eq!(s.on_map_click(GeoPoint::new(0.0, 0.0)).unwrap(), ClickOutcome::Ignored);
        assert!(s.store().is_empty());
    }

    #[test]
    fn test_create_rejects_invalid_coordinates() {
        let mut s = session();
        s.set_mode(EditorMode::CreateAgent);
        let err = s.on_map_click(GeoPoint::new(91.0, 0.0)).unwrap_err();
        assert!(matches!(err, SpeError::InvalidCoordinate { .. }));
        assert!(s.store().is_empty());
    }

    #[test]
    fn test_erase_threshold_boundary() {
        let deg_per_km = 180.0 / (std::f64::consts::PI * EARTH_RADIUS_KM);
        let click = GeoPoint::new(0.0, 0.0);

        let mut s = session();
        s.set_mode(EditorMode::CreateAgent);
        s.on_map_click(GeoPoint::new(0.500001 * deg_per_km, 0.0)).unwrap();
        s.set_mode(EditorMode::Erase);
        assert_eq!(s.on_map_click(click).unwrap(), ClickOutcome::NoMatch);
        assert_eq!(s.store().agent_count(), 1);

        let mut s = session();
        s.set_mode(EditorMode::CreateAgent);
        let near = GeoPoint::new(0.499999 * deg_per_km, 0.0);
        assert!(distance_km(click, near) < 0.5);
        s.on_map_click(near).unwrap();
        s.set_mode(EditorMode::Erase);
        assert!(matches!(s.on_map_click(click).unwrap(), ClickOutcome::Erased(_)));
        assert!(s.store().is_empty());
    }

    #[test]
    fn test_erase_clears_matching_selection() {
        let mut s = session();
        s.set_mode(EditorMode::CreateAccount);
        let r = created(s.on_map_click(GeoPoint::new(10.0, 10.0)).unwrap());
        s.select(r.clone()).unwrap();
        assert_eq!(s.selected().map(|v| v.name().to_string()), Some("Account 1".into()));

        s.set_mode(EditorMode::Erase);
        s.on_map_click(GeoPoint::new(10.0, 10.0)).unwrap();
        assert!(s.selection().is_none());
    }

    #[test]
    fn test_select_unknown_rejected() {
        let mut s = session();
        let err = s.select(EntityRef::agent("ghost".into())).unwrap_err();
        assert_eq!(err, EditorError::Core(SpeError::UnknownEntity("agent:ghost".into())));
    }

    #[test]
    fn test_edit_selected_account() {
        let mut s = session();
        s.set_mode(EditorMode::CreateAccount);
        let r = created(s.on_map_click(GeoPoint::new(5.0, 5.0)).unwrap());

        assert_eq!(s.rename_selected("x"), Err(EditorError::NothingSelected));
        s.select(r.clone()).unwrap();
        s.rename_selected("Clinic").unwrap();
        s.patch_selected_schedule(SchedulePatch {
            kind: Some(ScheduleType::BiweeklyBd),
            anchor: Some(Anchor::Wed),
        })
        .unwrap();
        s.update_selected_account(AccountPatch {
            service_window_start_min: Some(540.0),
            ..Default::default()
        })
        .unwrap();

        let account = s.store().account(&r.id).unwrap();
        assert_eq!(account.name, "Clinic");
        assert_eq!(account.service_window_start_min, 540.0);
        assert_eq!(account.schedule.active_days(28), vec![9, 23]);
        assert_eq!(s.accounts_active_on(9), 1);
        assert_eq!(s.accounts_active_on(2), 0);
    }

    #[test]
    fn test_account_patch_on_agent_rejected() {
        let mut s = session();
        s.set_mode(EditorMode::CreateAgent);
        let r = created(s.on_map_click(GeoPoint::new(5.0, 5.0)).unwrap());
        s.select(r.clone()).unwrap();
        let err = s.update_selected_account(AccountPatch::default()).unwrap_err();
        assert_eq!(err, EditorError::NotAnAccount(r));
    }

    #[test]
    fn test_visibility_follows_filters() {
        let mut s = session();
        s.set_mode(EditorMode::CreateAgent);
        let r = created(s.on_map_click(GeoPoint::new(5.0, 5.0)).unwrap());
        s.on_map_click(GeoPoint::new(6.0, 6.0)).unwrap();
        assert_eq!(s.visible_agents().len(), 2);

        s.select(r).unwrap();
        s.patch_selected_schedule(SchedulePatch { kind: None, anchor: Some(Anchor::Fri) })
            .unwrap();
        s.filter_mut().toggle_day(Anchor::Fri);
        assert_eq!(s.visible_agents().len(), 1);
    }

    #[test]
    fn test_surface_requires_finite_view() {
        let mut s = EditorSession::default();
        let mut bad = RemoteConfig::default();
        bad.initial_view_state.latitude = f64::NAN;

        assert!(!s.apply_remote_config(bad));
        assert_eq!(s.surface(), SurfaceState::Pending);
        assert_eq!(s.notices().last().map(|n| n.level), Some(NoticeLevel::Warning));

        assert!(s.apply_remote_config(RemoteConfig::default()));
        assert!(matches!(s.surface(), SurfaceState::Ready(_)));

        // A second valid config never re-creates the surface.
        let mut other = RemoteConfig::default();
        other.initial_view_state.latitude = 10.0;
        assert!(!s.apply_remote_config(other));
        match s.surface() {
            SurfaceState::Ready(view) => assert_eq!(view.latitude, 37.8),
            SurfaceState::Pending => panic!("surface should be ready"),
        }
    }

    #[test]
    fn test_clicks_ignored_while_surface_pending() {
        let mut s = EditorSession::default();
        s.set_mode(EditorMode::CreateAgent);
        let here = GeoPoint::new(37.8, -85.0);
        assert_eq!(s.on_map_click(here).unwrap(), ClickOutcome::Ignored);

        let mut bad = RemoteConfig::default();
        bad.initial_view_state.latitude = f64::NAN;
        s.apply_remote_config(bad);
        assert_eq!(s.surface(), SurfaceState::Pending);
        assert_eq!(s.on_map_click(here).unwrap(), ClickOutcome::Ignored);
        assert_eq!(s.store().agent_count(), 0);

        s.apply_remote_config(RemoteConfig::default());
        assert!(matches!(s.on_map_click(here).unwrap(), ClickOutcome::Created(_)));
        assert_eq!(s.store().agent_count(), 1);
    }

    #[test]
    fn test_heatmap_day_follows_served_cycle() {
        let mut s = session();
        let mut cfg = RemoteConfig::default();
        cfg.cycle_days = 14;
        s.apply_remote_config(cfg);
        assert_eq!(s.panel().cycle_days(), 14);
        assert!(s.panel_mut().set_day(13).is_ok());
        assert!(s.panel_mut().set_day(20).is_err());
    }

    #[test]
    fn test_remote_config_sets_resolution_and_settings() {
        let mut s = session();
        let mut cfg = RemoteConfig::default();
        cfg.defaults.res_agents_available = Some(256);
        cfg.h3_levels = vec![8, 9];
        s.apply_remote_config(cfg);

        let scenario = s.build_scenario();
        assert_eq!(scenario.name, "POC");
        assert_eq!(scenario.params.resolution.res_agents_available, 256);
        assert_eq!(scenario.params.h3_levels, vec![8, 9]);
        assert_eq!(scenario.globals.max_agents, 1);
    }

    #[test]
    fn test_heatmap_query_uses_panel() {
        let mut s = session();
        s.panel_mut().set_day(3).unwrap();
        s.panel_mut().set_h3_level(9).unwrap();
        let q = s.heatmap_query();
        assert_eq!((q.day, q.h3_level), (3, 9));
    }

    #[test]
    fn test_spectrum_of_selected_component() {
        let mut s = session();
        assert!(s.selected_spectrum().is_none());

        let mut components = IndexMap::new();
        components.insert("service_stop_time".to_string(), vec![1.0, 0.0, -1.0, 0.0]);
        s.set_embedding(EmbeddingResult { components, ..Default::default() });

        let spectrum = s.selected_spectrum().unwrap();
        assert_eq!(spectrum[1], 1.0);
        assert_eq!(s.all_spectra().len(), 1);
        assert!(s.component_spectrum("missing").is_none());
    }
}
