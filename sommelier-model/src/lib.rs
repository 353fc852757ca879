//! Core data model definitions shared across Sommelier crates.
//!
//! The scan lifecycle is described by [`ScanStage`] and aggregated in
//! [`ScanState`]. Wine records ([`WineResult`]) are opaque to the lifecycle:
//! they are produced by the matching service or the offline cache and only
//! ever moved around as whole lists.

pub mod error;
pub mod failure;
pub mod ids;
pub mod pipeline;
pub mod stage;
pub mod state;
pub mod wine;

pub use error::{ModelError, Result as ModelResult};
pub use failure::{FailureReport, ScanFailure};
pub use ids::{RunId, WineId};
pub use pipeline::{CapturedImage, ProcessedWineList, ScanServiceError};
pub use stage::ScanStage;
pub use state::{OfflineAvailability, ScanState};
pub use wine::WineResult;
