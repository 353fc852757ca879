use async_trait::async_trait;
use sommelier_model::FailureReport;

#[derive(Debug, thiserror::Error)]
pub enum ReportError {
    #[error("Error reporter unavailable: {0}")]
    Unavailable(String),

    #[error("Error report rejected: {0}")]
    Rejected(String),
}

/// Receives a report for every pipeline failure.
///
/// Delivery is best effort: the controller runs `report` on a detached task
/// and only logs what comes back.
#[async_trait]
pub trait ErrorReporter: Send + Sync {
    async fn report(&self, report: FailureReport) -> Result<(), ReportError>;
}
