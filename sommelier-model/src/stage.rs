use std::fmt;
use std::str::FromStr;

use crate::error::ModelError;

/// Discrete phase of the scan pipeline.
///
/// The normal progression is `Idle -> Capturing -> Processing -> Analyzing ->
/// Complete`. `Error` is reachable from any in-flight stage and, like
/// `Complete`, holds until a new scan is started.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum ScanStage {
    #[default]
    Idle,
    Capturing,
    Processing,
    Analyzing,
    Complete,
    Error,
}

impl ScanStage {
    pub const ALL: [ScanStage; 6] = [
        ScanStage::Idle,
        ScanStage::Capturing,
        ScanStage::Processing,
        ScanStage::Analyzing,
        ScanStage::Complete,
        ScanStage::Error,
    ];

    /// True while a pipeline step is in flight.
    pub const fn is_processing(self) -> bool {
        matches!(
            self,
            ScanStage::Capturing | ScanStage::Processing | ScanStage::Analyzing
        )
    }

    /// Terminal until the user starts another scan.
    pub const fn is_terminal(self) -> bool {
        matches!(self, ScanStage::Complete | ScanStage::Error)
    }

    /// Stages from which `start()` begins a fresh run.
    pub const fn can_start(self) -> bool {
        matches!(
            self,
            ScanStage::Idle | ScanStage::Complete | ScanStage::Error
        )
    }

    /// Next stage of the successful progression, if any.
    pub const fn next(self) -> Option<ScanStage> {
        match self {
            ScanStage::Capturing => Some(ScanStage::Processing),
            ScanStage::Processing => Some(ScanStage::Analyzing),
            ScanStage::Analyzing => Some(ScanStage::Complete),
            ScanStage::Idle | ScanStage::Complete | ScanStage::Error => None,
        }
    }

    pub const fn default_message(self) -> &'static str {
        match self {
            ScanStage::Idle => "Ready to scan a wine list",
            ScanStage::Capturing => "Capturing image...",
            ScanStage::Processing => "Processing wine list image...",
            ScanStage::Analyzing => {
                "Analyzing wines and matching with database..."
            }
            ScanStage::Complete => "Scan complete",
            ScanStage::Error => "Something went wrong",
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            ScanStage::Idle => "idle",
            ScanStage::Capturing => "capturing",
            ScanStage::Processing => "processing",
            ScanStage::Analyzing => "analyzing",
            ScanStage::Complete => "complete",
            ScanStage::Error => "error",
        }
    }
}

impl fmt::Display for ScanStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ScanStage {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase();
        ScanStage::ALL
            .into_iter()
            .find(|stage| stage.as_str() == normalized)
            .ok_or_else(|| ModelError::UnknownStage(s.to_string()))
    }
}
