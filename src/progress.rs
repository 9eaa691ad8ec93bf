//! Progress/event stream emitted by the import driver.
//!
//! The core never touches a rendering surface; it reports stage changes and
//! human-readable log lines through a [`ProgressSink`] that the presentation
//! layer (CLI, tests) implements.

use tracing::info;

/// The driver's state machine. `Failed` is reachable from every working
/// stage; the other transitions are strictly forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImportStage {
    Idle,
    Parsing,
    ResolvingLists,
    ResolvingLabels,
    CreatingCards,
    Done,
    Failed,
}

impl std::fmt::Display for ImportStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            ImportStage::Idle => "idle",
            ImportStage::Parsing => "parsing",
            ImportStage::ResolvingLists => "resolving lists",
            ImportStage::ResolvingLabels => "resolving labels",
            ImportStage::CreatingCards => "creating cards",
            ImportStage::Done => "done",
            ImportStage::Failed => "failed",
        };
        write!(f, "{s}")
    }
}

/// Per-run counters. `skipped` counts rows dropped by normalization;
/// `failed` is at most 1 since the first failure aborts the run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Counters {
    pub created: usize,
    pub skipped: usize,
    pub failed: usize,
}

/// Observer for one import run. Counters are included with every stage
/// change so partial progress is visible even when the run fails.
pub trait ProgressSink: Send + Sync {
    fn on_stage(&self, stage: ImportStage, counters: &Counters);
    fn on_log(&self, message: &str);
}

/// Default sink: forwards everything to tracing.
pub struct TracingSink;

impl ProgressSink for TracingSink {
    fn on_stage(&self, stage: ImportStage, counters: &Counters) {
        info!(
            stage = %stage,
            created = counters.created,
            skipped = counters.skipped,
            failed = counters.failed,
            "Import stage"
        );
    }

    fn on_log(&self, message: &str) {
        info!("{message}");
    }
}
