use async_trait::async_trait;
use sommelier_contracts::reporting::{ErrorReporter, ReportError};
use sommelier_model::FailureReport;
use tracing::error;

/// Default error reporter: writes every failure report to the log.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingErrorReporter;

#[async_trait]
impl ErrorReporter for TracingErrorReporter {
    async fn report(&self, report: FailureReport) -> Result<(), ReportError> {
        error!(target: "scan::failure", stage = %report.stage, context = %report.context, "scan failure reported");
        Ok(())
    }
}
