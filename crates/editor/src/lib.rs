pub mod error;
pub mod filter;
pub mod generation;
pub mod mode;
pub mod notices;
pub mod panel;
pub mod runtime;
pub mod session;

pub use error::EditorError;
pub use filter::VisibilityFilter;
pub use generation::{Generation, RequestKind, RequestTracker};
pub use mode::EditorMode;
pub use notices::{Notice, NoticeLevel, NoticeLog};
pub use panel::{AnalysisPanel, HeatmapControls};
pub use runtime::{AnalysisAction, AnalysisReply, EditorRuntime, ReplyPayload};
pub use session::{AnalysisResults, ClickOutcome, EditorSession, SurfaceState};
