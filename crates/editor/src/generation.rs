//! Request generations: only the reply to the latest request of each kind
//! may change session state.

use std::collections::HashMap;

use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RequestKind {
    Config,
    Embed,
    Save,
    Index,
    Search,
    Simulate,
    Heatmap,
}

impl RequestKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            RequestKind::Config => "config",
            RequestKind::Embed => "embed",
            RequestKind::Save => "save",
            RequestKind::Index => "index",
            RequestKind::Search => "search",
            RequestKind::Simulate => "simulate",
            RequestKind::Heatmap => "heatmap",
        }
    }
}

impl std::fmt::Display for RequestKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Monotonic per-kind sequence number attached to a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Generation(pub u64);

#[derive(Debug, Default)]
pub struct RequestTracker {
    latest: HashMap<RequestKind, u64>,
}

impl RequestTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new request of `kind`, superseding any in flight.
    pub fn issue(&mut self, kind: RequestKind) -> Generation {
        let next = self.latest.entry(kind).or_insert(0);
        *next += 1;
        Generation(*next)
    }

    pub fn latest(&self, kind: RequestKind) -> Option<Generation> {
        self.latest.get(&kind).copied().map(Generation)
    }

    /// Whether a reply carrying `generation` is still current.
    pub fn is_current(&self, kind: RequestKind, generation: Generation) -> bool {
        let current = self.latest(kind) == Some(generation);
        if !current {
            debug!(kind = %kind, generation = generation.0, "stale reply discarded");
        }
        current
    }
}
