use sommelier_model::ScanStage;
use thiserror::Error;

/// Command rejections surfaced to callers of the controller handle.
///
/// Pipeline failures are not errors at this level: they become the `error`
/// stage of the published state.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ControllerError {
    #[error("A scan is already running (stage: {stage})")]
    AlreadyRunning { stage: ScanStage },

    #[error("Scan controller is closed")]
    Closed,
}

#[derive(Error, Debug)]
pub enum NetworkError {
    #[error("Invalid probe URL: {0}")]
    InvalidProbeUrl(String),

    #[cfg(feature = "probe")]
    #[error("HTTP client error: {0}")]
    Client(#[from] reqwest::Error),
}

pub type Result<T> = std::result::Result<T, ControllerError>;
