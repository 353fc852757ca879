use std::fmt;

use sommelier_model::{RunId, ScanStage, WineResult};

/// Where the wines on screen came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResultOrigin {
    Live,
    Offline,
}

/// Why a run was started.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StartTrigger {
    Start,
    Retry,
}

impl fmt::Display for StartTrigger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StartTrigger::Start => f.write_str("start"),
            StartTrigger::Retry => f.write_str("retry"),
        }
    }
}

/// Result of a command that is allowed to be a no-op.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandOutcome {
    Applied,
    /// The command did not apply in the current state and changed nothing.
    Ignored,
    /// The command ran and moved the lifecycle into the error stage.
    Failed,
}

/// Lifecycle notifications fanned out to renderers and navigation.
///
/// Snapshots of the state travel separately over the watch channel; these
/// events exist for consumers that need every transition or a navigation
/// intent.
#[derive(Debug, Clone)]
pub enum ControllerEvent {
    RunStarted {
        run_id: RunId,
        trigger: StartTrigger,
    },
    StageEntered {
        run_id: Option<RunId>,
        stage: ScanStage,
    },
    RunFinished {
        run_id: RunId,
        stage: ScanStage,
    },
    /// The user asked to see the results of a completed scan.
    ShowResults {
        wines: Vec<WineResult>,
        origin: ResultOrigin,
    },
}
