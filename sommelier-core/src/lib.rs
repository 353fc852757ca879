//! # Sommelier Core
//!
//! Core library for Sommelier: the scan lifecycle controller that drives a
//! wine list scan from capture to matched results, and keeps the session
//! usable when the network drops by falling back to cached results.
//!
//! ## Overview
//!
//! - **Controller**: [`controller::ScanController`] owns the scan state and
//!   sequences the capture, process and analyze steps of a
//!   [`ScanService`](sommelier_contracts::scan_service::ScanService)
//! - **Connectivity**: [`network::NetworkStatusMonitor`] debounces platform
//!   signals into a single online/offline value
//! - **Offline fallback**: [`offline`] adapters for the cached result store
//! - **Simulation**: [`simulator::SimulatedScanService`] with fixed timing
//!
//! ## Feature Flags
//!
//! - `disk-cache`: persistent offline store backed by `cacache`
//! - `probe`: HTTP reachability probe feeding the network monitor
//!
//! ## Examples
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use sommelier_core::{
//!     config::{ControllerConfig, NetworkMonitorConfig, SimulatorConfig},
//!     controller::{ControllerDeps, ScanController},
//!     network::NetworkStatusMonitor,
//!     offline::InMemoryOfflineStore,
//!     reporting::TracingErrorReporter,
//!     simulator::SimulatedScanService,
//! };
//! use sommelier_model::ScanStage;
//!
//! async fn scan_once() -> Result<(), Box<dyn std::error::Error>> {
//!     let (monitor, _reporter) =
//!         NetworkStatusMonitor::spawn(true, &NetworkMonitorConfig::default());
//!     let controller = ScanController::spawn(
//!         ControllerDeps {
//!             service: Arc::new(SimulatedScanService::new(SimulatorConfig::default())),
//!             store: Arc::new(InMemoryOfflineStore::new()),
//!             reporter: Arc::new(TracingErrorReporter),
//!             network: monitor.subscribe(),
//!         },
//!         ControllerConfig::default(),
//!     );
//!
//!     controller.start().await?;
//!     let state = controller.wait_for(|state| state.stage().is_terminal()).await?;
//!     assert_eq!(state.stage(), ScanStage::Complete);
//!     Ok(())
//! }
//! ```

#![cfg_attr(docsrs, feature(doc_cfg))]

/// Runtime configuration structs with serde defaults
pub mod config;

/// Scan lifecycle controller
pub mod controller;

/// Error types and error handling utilities
pub mod error;

/// Connectivity monitoring and reachability probing
pub mod network;

/// Offline result store adapters
pub mod offline;

/// Error reporting collaborators
pub mod reporting;

/// Scripted scan service with fixed timing
pub mod simulator;

pub use controller::{
    CommandOutcome, ControllerDeps, ControllerEvent, ResultOrigin,
    ScanController, StartTrigger,
};
pub use error::{ControllerError, NetworkError};
