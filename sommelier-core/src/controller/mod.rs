//! Scan lifecycle controller.
//!
//! [`ScanController`] is a cheap, cloneable handle to an actor task that owns
//! the [`ScanState`] of one scan session. Renderers read snapshots through
//! [`ScanController::state`] or [`ScanController::subscribe`] and send user
//! intents back as commands:
//!
//! - `start` / `retry` run the capture -> process -> analyze pipeline. At most
//!   one run is in flight; a second start is rejected with
//!   [`ControllerError::AlreadyRunning`] and leaves the state untouched.
//! - `request_results` asks navigation to show a completed scan.
//! - `request_offline_results` falls back to the offline cache when the
//!   network is down and cached results exist.
//!
//! Connectivity changes from the network monitor are folded in as they
//! arrive and only ever touch the network/offline side-fields.
//!
//! A rescan keeps the previous `found_wines` visible until the new run
//! completes; if the rescan fails they stay as they were.

mod actor;
pub mod events;
mod pipeline;

use std::fmt;
use std::sync::Arc;

use sommelier_contracts::prelude::{ErrorReporter, OfflineStore, ScanService};
use sommelier_model::{RunId, ScanState};
use tokio::sync::{broadcast, mpsc, oneshot, watch};

use crate::config::ControllerConfig;
use crate::error::{ControllerError, Result};
use actor::{ActorParts, ControllerActor, ControllerCommand};
pub use events::{CommandOutcome, ControllerEvent, ResultOrigin, StartTrigger};

/// Collaborators injected into a controller.
pub struct ControllerDeps {
    pub service: Arc<dyn ScanService>,
    pub store: Arc<dyn OfflineStore>,
    pub reporter: Arc<dyn ErrorReporter>,
    /// Debounced online/offline signal, usually
    /// [`NetworkStatusMonitor::subscribe`](crate::network::NetworkStatusMonitor::subscribe).
    pub network: watch::Receiver<bool>,
}

impl fmt::Debug for ControllerDeps {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ControllerDeps")
            .field("online", &*self.network.borrow())
            .finish_non_exhaustive()
    }
}

/// Handle to a running scan lifecycle controller.
#[derive(Clone)]
pub struct ScanController {
    commands: mpsc::Sender<ControllerCommand>,
    snapshots: watch::Receiver<ScanState>,
    events: broadcast::Sender<ControllerEvent>,
}

impl fmt::Debug for ScanController {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let snapshot = self.snapshots.borrow();
        f.debug_struct("ScanController")
            .field("stage", &snapshot.stage())
            .field("network_error", &snapshot.network_error())
            .field("event_subscribers", &self.events.receiver_count())
            .field("closed", &self.commands.is_closed())
            .finish()
    }
}

impl ScanController {
    /// Spawn the controller actor on the current tokio runtime.
    pub fn spawn(deps: ControllerDeps, config: ControllerConfig) -> Self {
        let (commands_tx, commands_rx) =
            mpsc::channel(config.command_buffer.max(1));
        let (snapshots_tx, snapshots_rx) = watch::channel(ScanState::new());
        let (events_tx, _) = broadcast::channel(config.event_capacity.max(1));

        let actor = ControllerActor::new(ActorParts {
            config,
            service: deps.service,
            store: deps.store,
            reporter: deps.reporter,
            commands: commands_rx,
            network: deps.network,
            snapshots: snapshots_tx,
            events: events_tx.clone(),
        });
        tokio::spawn(actor.run());

        Self {
            commands: commands_tx,
            snapshots: snapshots_rx,
            events: events_tx,
        }
    }

    /// Begin a scan from `idle`, `complete` (rescan) or `error`.
    pub async fn start(&self) -> Result<RunId> {
        self.start_with(StartTrigger::Start).await
    }

    /// Start a fresh attempt after a failure. Same rules as [`start`](Self::start).
    pub async fn retry(&self) -> Result<RunId> {
        self.start_with(StartTrigger::Retry).await
    }

    async fn start_with(&self, trigger: StartTrigger) -> Result<RunId> {
        self.call(|reply| ControllerCommand::Start { trigger, reply })
            .await?
    }

    /// Ask navigation to show the results of a completed scan. Ignored
    /// unless the stage is `complete`.
    pub async fn request_results(&self) -> Result<CommandOutcome> {
        self.call(|reply| ControllerCommand::RequestResults { reply })
            .await
    }

    /// Show cached results while offline. Ignored unless offline results are
    /// available and no scan is in flight.
    pub async fn request_offline_results(&self) -> Result<CommandOutcome> {
        self.call(|reply| ControllerCommand::RequestOfflineResults { reply })
            .await
    }

    /// Re-query the offline store after it changed underneath the controller.
    pub async fn refresh_offline_availability(&self) -> Result<()> {
        self.call(|reply| ControllerCommand::RefreshOfflineAvailability {
            reply,
        })
        .await
    }

    /// Latest published snapshot.
    pub fn state(&self) -> ScanState {
        self.snapshots.borrow().clone()
    }

    /// Snapshot stream; a new value is published on every state change.
    pub fn subscribe(&self) -> watch::Receiver<ScanState> {
        self.snapshots.clone()
    }

    pub fn subscribe_events(&self) -> broadcast::Receiver<ControllerEvent> {
        self.events.subscribe()
    }

    /// Wait until a published snapshot satisfies `predicate`.
    pub async fn wait_for<F>(&self, mut predicate: F) -> Result<ScanState>
    where
        F: FnMut(&ScanState) -> bool,
    {
        let mut snapshots = self.snapshots.clone();
        let state = snapshots
            .wait_for(|state| predicate(state))
            .await
            .map_err(|_| ControllerError::Closed)?;
        Ok(state.clone())
    }

    /// Stop the actor. Later commands fail with [`ControllerError::Closed`].
    pub async fn shutdown(&self) {
        let _ = self.commands.send(ControllerCommand::Shutdown).await;
    }

    pub fn is_closed(&self) -> bool {
        self.commands.is_closed()
    }

    async fn call<T>(
        &self,
        command: impl FnOnce(oneshot::Sender<T>) -> ControllerCommand,
    ) -> Result<T> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.commands
            .send(command(reply_tx))
            .await
            .map_err(|_| ControllerError::Closed)?;
        reply_rx.await.map_err(|_| ControllerError::Closed)
    }
}
