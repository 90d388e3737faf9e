//! Drives analysis requests for a session.
//!
//! Requests run on spawned tasks that never touch the session. Each task
//! sends one [`AnalysisReply`] back over a channel; the owner of the runtime
//! feeds replies to [`EditorRuntime::apply_reply`] on its own task, where
//! stale generations are dropped.

use std::future::Future;
use std::sync::Arc;

use spe_client::{
    fetch_config_or_default, AnalysisService, ClientError, RemoteConfig, SimulationOutcome,
};
use spe_core::{EmbeddingResult, HeatmapCell, SearchHit};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::generation::{Generation, RequestKind, RequestTracker};
use crate::notices::NoticeLevel;
use crate::session::EditorSession;

/// Capacity of the reply queue.
pub const REPLY_QUEUE: usize = 64;

/// A user-triggered analysis request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnalysisAction {
    Embed,
    Save,
    /// Save the scenario, then index the latest embedding under its id.
    Index,
    Search,
    Simulate { day: u32 },
    Heatmap,
}

impl AnalysisAction {
    pub fn kind(&self) -> RequestKind {
        match self {
            AnalysisAction::Embed => RequestKind::Embed,
            AnalysisAction::Save => RequestKind::Save,
            AnalysisAction::Index => RequestKind::Index,
            AnalysisAction::Search => RequestKind::Search,
            AnalysisAction::Simulate { .. } => RequestKind::Simulate,
            AnalysisAction::Heatmap => RequestKind::Heatmap,
        }
    }
}

#[derive(Debug)]
pub enum ReplyPayload {
    Config(RemoteConfig),
    Embedded(EmbeddingResult),
    Saved(String),
    Indexed { scenario_id: String, embedding_id: String },
    Hits(Vec<SearchHit>),
    Simulated(SimulationOutcome),
    Heatmap(Vec<HeatmapCell>),
    Failed(String),
}

#[derive(Debug)]
pub struct AnalysisReply {
    pub kind: RequestKind,
    pub generation: Generation,
    pub payload: ReplyPayload,
}

pub struct EditorRuntime {
    session: EditorSession,
    service: Arc<dyn AnalysisService>,
    tracker: RequestTracker,
    replies: mpsc::Sender<AnalysisReply>,
}

impl EditorRuntime {
    /// Create a runtime and the receiving end of its reply queue.
    pub fn new(
        session: EditorSession,
        service: Arc<dyn AnalysisService>,
    ) -> (Self, mpsc::Receiver<AnalysisReply>) {
        let (tx, rx) = mpsc::channel(REPLY_QUEUE);
        let runtime = Self {
            session,
            service,
            tracker: RequestTracker::new(),
            replies: tx,
        };
        (runtime, rx)
    }

    pub fn session(&self) -> &EditorSession {
        &self.session
    }

    pub fn session_mut(&mut self) -> &mut EditorSession {
        &mut self.session
    }

    pub fn latest_generation(&self, kind: RequestKind) -> Option<Generation> {
        self.tracker.latest(kind)
    }

    /// Fetch the remote configuration. Failures resolve to the built-in
    /// default inside the task, so this reply always carries a config.
    pub fn load_config(&mut self) -> Generation {
        let service = Arc::clone(&self.service);
        self.spawn(RequestKind::Config, async move {
            ReplyPayload::Config(fetch_config_or_default(service.as_ref()).await)
        })
    }

    /// Start an analysis request built from the live session state.
    ///
    /// Returns `None` without issuing anything when the action needs an
    /// embedding and none has been accepted yet.
    pub fn dispatch(&mut self, action: AnalysisAction) -> Option<Generation> {
        let service = Arc::clone(&self.service);
        let generation = match action {
            AnalysisAction::Embed => {
                let scenario = self.session.build_scenario();
                info!(
                    agents = scenario.agents.len(),
                    accounts = scenario.accounts.len(),
                    "embedding scenario"
                );
                self.spawn(RequestKind::Embed, async move {
                    payload(service.embed(&scenario).await, ReplyPayload::Embedded)
                })
            }
            AnalysisAction::Save => {
                let scenario = self.session.build_scenario();
                self.spawn(RequestKind::Save, async move {
                    payload(service.save_scenario(&scenario).await, ReplyPayload::Saved)
                })
            }
            AnalysisAction::Index => {
                let Some(vector) = self.embedding_vector() else {
                    debug!("index skipped: no embedding yet");
                    return None;
                };
                let scenario = self.session.build_scenario();
                self.spawn(RequestKind::Index, async move {
                    let scenario_id = match service.save_scenario(&scenario).await {
                        Ok(id) => id,
                        Err(e) => return ReplyPayload::Failed(e.to_string()),
                    };
                    match service.index(&scenario_id, &vector).await {
                        Ok(embedding_id) => ReplyPayload::Indexed { scenario_id, embedding_id },
                        Err(e) => ReplyPayload::Failed(e.to_string()),
                    }
                })
            }
            AnalysisAction::Search => {
                let Some(vector) = self.embedding_vector() else {
                    debug!("search skipped: no embedding yet");
                    return None;
                };
                let k = self.session.panel().search_k();
                self.spawn(RequestKind::Search, async move {
                    payload(service.search(&vector, k).await, ReplyPayload::Hits)
                })
            }
            AnalysisAction::Simulate { day } => {
                let scenario = self.session.build_scenario();
                self.spawn(RequestKind::Simulate, async move {
                    payload(service.simulate(&scenario, day).await, ReplyPayload::Simulated)
                })
            }
            AnalysisAction::Heatmap => {
                let query = self.session.heatmap_query();
                self.spawn(RequestKind::Heatmap, async move {
                    payload(service.heatmap(&query).await, ReplyPayload::Heatmap)
                })
            }
        };
        Some(generation)
    }

    /// Apply a reply if it answers the latest request of its kind.
    /// Returns false for stale replies, which leave the session untouched.
    pub fn apply_reply(&mut self, reply: AnalysisReply) -> bool {
        if !self.tracker.is_current(reply.kind, reply.generation) {
            return false;
        }
        let session = &mut self.session;
        match reply.payload {
            ReplyPayload::Config(config) => {
                session.apply_remote_config(config);
            }
            ReplyPayload::Embedded(embedding) => session.set_embedding(embedding),
            ReplyPayload::Saved(id) => session.set_saved(id),
            ReplyPayload::Indexed { scenario_id, embedding_id } => {
                session.set_indexed(scenario_id, embedding_id)
            }
            ReplyPayload::Hits(hits) => session.set_hits(hits),
            ReplyPayload::Simulated(outcome) => session.set_simulation(outcome),
            ReplyPayload::Heatmap(cells) => session.set_cells(cells),
            ReplyPayload::Failed(message) => {
                warn!(kind = %reply.kind, error = %message, "analysis request failed");
                session.notify(NoticeLevel::Error, format!("{} failed: {}", reply.kind, message));
            }
        }
        true
    }

    fn embedding_vector(&self) -> Option<Vec<f64>> {
        self.session
            .results()
            .embedding
            .as_ref()
            .map(|e| e.embedding.clone())
    }

    fn spawn<F>(&mut self, kind: RequestKind, work: F) -> Generation
    where
        F: Future<Output = ReplyPayload> + Send + 'static,
    {
        let generation = self.tracker.issue(kind);
        let tx = self.replies.clone();
        debug!(kind = %kind, generation = generation.0, "request issued");
        tokio::spawn(async move {
            let payload = work.await;
            let reply = AnalysisReply { kind, generation, payload };
            if tx.send(reply).await.is_err() {
                debug!(kind = %kind, "reply queue closed, dropping reply");
            }
        });
        generation
    }
}

fn payload<T>(
    result: Result<T, ClientError>,
    ok: impl FnOnce(T) -> ReplyPayload,
) -> ReplyPayload {
    match result {
        Ok(value) => ok(value),
        Err(e) => ReplyPayload::Failed(e.to_string()),
    }
}
