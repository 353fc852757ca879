use crate::failure::ScanFailure;
use crate::stage::ScanStage;
use crate::wine::WineResult;

/// Derived offline flags.
///
/// Both flags are a pure function of the connectivity signal and the cache
/// presence predicate; they are never set independently.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct OfflineAvailability {
    pub offline_available: bool,
    pub show_offline_options: bool,
}

impl OfflineAvailability {
    pub const fn derive(network_error: bool, has_cached_results: bool) -> Self {
        let offline_available = network_error && has_cached_results;
        Self {
            offline_available,
            show_offline_options: network_error && offline_available,
        }
    }
}

/// Snapshot of a scan session.
///
/// The controller owns the only mutable instance and publishes clones of it;
/// the processing flag is derived from the stage rather than stored.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ScanState {
    stage: ScanStage,
    message: String,
    found_wines: Vec<WineResult>,
    network_error: bool,
    offline_available: bool,
    show_offline_options: bool,
}

impl Default for ScanState {
    fn default() -> Self {
        Self::new()
    }
}

impl ScanState {
    pub fn new() -> Self {
        Self {
            stage: ScanStage::Idle,
            message: ScanStage::Idle.default_message().to_string(),
            found_wines: Vec::new(),
            network_error: false,
            offline_available: false,
            show_offline_options: false,
        }
    }

    pub fn stage(&self) -> ScanStage {
        self.stage
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn is_processing(&self) -> bool {
        self.stage.is_processing()
    }

    pub fn found_wines(&self) -> &[WineResult] {
        &self.found_wines
    }

    pub fn network_error(&self) -> bool {
        self.network_error
    }

    pub fn offline_available(&self) -> bool {
        self.offline_available
    }

    pub fn show_offline_options(&self) -> bool {
        self.show_offline_options
    }

    /// Advance to a pipeline stage. Previously found wines stay visible
    /// until the run completes.
    pub fn enter(&mut self, stage: ScanStage, message: impl Into<String>) {
        self.stage = stage;
        self.message = message.into();
    }

    /// Finish with a fresh result list, replacing the previous one wholesale.
    pub fn complete(
        &mut self,
        wines: Vec<WineResult>,
        message: impl Into<String>,
    ) {
        self.stage = ScanStage::Complete;
        self.message = message.into();
        self.found_wines = wines;
    }

    /// Move to the error stage. `found_wines` is left untouched.
    pub fn fail(&mut self, failure: &ScanFailure) {
        self.stage = ScanStage::Error;
        self.message = failure.message();
    }

    /// Update the connectivity side-fields. Returns whether anything changed.
    pub fn apply_connectivity(
        &mut self,
        network_error: bool,
        has_cached_results: bool,
    ) -> bool {
        let derived =
            OfflineAvailability::derive(network_error, has_cached_results);
        let changed = self.network_error != network_error
            || self.offline_available != derived.offline_available
            || self.show_offline_options != derived.show_offline_options;

        self.network_error = network_error;
        self.offline_available = derived.offline_available;
        self.show_offline_options = derived.show_offline_options;
        changed
    }
}
