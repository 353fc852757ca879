use std::fmt;

use crate::pipeline::ScanServiceError;
use crate::stage::ScanStage;

/// Failures that move the lifecycle into [`ScanStage::Error`].
///
/// Renderers never see these values directly; they observe the error stage
/// and the [`message`](ScanFailure::message) it produced.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ScanFailure {
    CaptureFailed(String),
    ProcessingFailed(String),
    AnalysisFailed(String),
    /// The offline cache advertised results but returned none.
    OfflineLoadEmpty,
}

impl ScanFailure {
    /// Failure of the pipeline step running `stage`.
    pub fn at(stage: ScanStage, reason: impl Into<String>) -> Self {
        let reason = reason.into();
        match stage {
            ScanStage::Capturing => ScanFailure::CaptureFailed(reason),
            ScanStage::Processing => ScanFailure::ProcessingFailed(reason),
            // Outside the pipeline stages the failure is attributed to
            // matching, the last step that can fail.
            ScanStage::Analyzing
            | ScanStage::Idle
            | ScanStage::Complete
            | ScanStage::Error => ScanFailure::AnalysisFailed(reason),
        }
    }

    /// Stage in which the failure happened.
    pub const fn stage(&self) -> ScanStage {
        match self {
            ScanFailure::CaptureFailed(_) => ScanStage::Capturing,
            ScanFailure::ProcessingFailed(_) => ScanStage::Processing,
            ScanFailure::AnalysisFailed(_) => ScanStage::Analyzing,
            ScanFailure::OfflineLoadEmpty => ScanStage::Error,
        }
    }

    /// User facing status message for the error stage.
    pub fn message(&self) -> String {
        match self {
            ScanFailure::CaptureFailed(reason) => {
                format!("Failed to capture image: {reason}")
            }
            ScanFailure::ProcessingFailed(reason) => {
                format!("Failed to process wine list: {reason}")
            }
            ScanFailure::AnalysisFailed(reason) => {
                format!("Failed to analyze wines: {reason}")
            }
            ScanFailure::OfflineLoadEmpty => {
                "No cached results are available offline".to_string()
            }
        }
    }

    pub const fn kind(&self) -> &'static str {
        match self {
            ScanFailure::CaptureFailed(_) => "capture_failed",
            ScanFailure::ProcessingFailed(_) => "processing_failed",
            ScanFailure::AnalysisFailed(_) => "analysis_failed",
            ScanFailure::OfflineLoadEmpty => "offline_load_empty",
        }
    }
}

impl fmt::Display for ScanFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message())
    }
}

impl From<ScanServiceError> for ScanFailure {
    fn from(err: ScanServiceError) -> Self {
        ScanFailure::at(err.stage, err.reason)
    }
}

/// Notification delivered to the error reporting collaborator.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FailureReport {
    pub context: String,
    pub stage: ScanStage,
}

impl From<&ScanFailure> for FailureReport {
    fn from(failure: &ScanFailure) -> Self {
        Self {
            context: format!("{}: {}", failure.kind(), failure.message()),
            stage: failure.stage(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn service_errors_map_by_stage() {
        let failure =
            ScanFailure::from(ScanServiceError::processing("blurry photo"));
        assert_eq!(
            failure,
            ScanFailure::ProcessingFailed("blurry photo".into())
        );
        assert_eq!(failure.stage(), ScanStage::Processing);
        assert_eq!(
            failure.message(),
            "Failed to process wine list: blurry photo"
        );
    }

    #[test]
    fn report_carries_kind_and_stage() {
        let failure = ScanFailure::CaptureFailed("camera busy".into());
        let report = FailureReport::from(&failure);
        assert_eq!(report.stage, ScanStage::Capturing);
        assert_eq!(
            report.context,
            "capture_failed: Failed to capture image: camera busy"
        );
    }
}
