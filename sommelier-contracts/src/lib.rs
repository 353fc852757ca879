//! Trait surfaces for the external collaborators of the scan lifecycle.
//!
//! The controller in `sommelier-core` only ever talks to these traits, so the
//! real backend, the offline cache engine and error reporting can be swapped
//! for simulators or test doubles.

pub mod offline_store;
pub mod reporting;
pub mod scan_service;

/// Frequently used trait combinators for hosts wiring a controller.
pub mod prelude {
    pub use super::offline_store::{OfflineStore, OfflineStoreError};
    pub use super::reporting::{ErrorReporter, ReportError};
    pub use super::scan_service::ScanService;
}
