//! Controller wiring over scripted collaborators.

use std::sync::Arc;
use std::time::Duration;

use sommelier_core::config::ControllerConfig;
use sommelier_core::controller::{ControllerDeps, ControllerEvent, ScanController};
use sommelier_model::{FailureReport, ScanStage, ScanState};
use tokio::sync::{broadcast, mpsc, watch};
use tokio::time::timeout;

use super::fakes::{
    BrokenReporter, RecordingReporter, ScriptedScanService, ScriptedStore,
};

pub const WAIT: Duration = Duration::from_secs(5);

pub struct Harness {
    pub controller: ScanController,
    pub network: watch::Sender<bool>,
    pub service: Arc<ScriptedScanService>,
    pub store: Arc<ScriptedStore>,
    pub reports: mpsc::UnboundedReceiver<FailureReport>,
}

impl Harness {
    pub fn new(service: ScriptedScanService, store: ScriptedStore) -> Self {
        Self::with_config(service, store, ControllerConfig::default())
    }

    pub fn with_config(
        service: ScriptedScanService,
        store: ScriptedStore,
        config: ControllerConfig,
    ) -> Self {
        let (reporter, reports) = RecordingReporter::new();
        let (network, network_rx) = watch::channel(true);
        let service = Arc::new(service);
        let store = Arc::new(store);

        let controller = ScanController::spawn(
            ControllerDeps {
                service: service.clone(),
                store: store.clone(),
                reporter: Arc::new(reporter),
                network: network_rx,
            },
            config,
        );

        Self {
            controller,
            network,
            service,
            store,
            reports,
        }
    }

    /// Same wiring, but every report fails (or panics) inside the reporter.
    pub fn with_broken_reporter(
        service: ScriptedScanService,
        panics: bool,
    ) -> Self {
        let (network, network_rx) = watch::channel(true);
        let service = Arc::new(service);
        let store = Arc::new(ScriptedStore::empty());
        let (_unused, reports) = mpsc::unbounded_channel();

        let controller = ScanController::spawn(
            ControllerDeps {
                service: service.clone(),
                store: store.clone(),
                reporter: Arc::new(BrokenReporter { panics }),
                network: network_rx,
            },
            ControllerConfig::default(),
        );

        Self {
            controller,
            network,
            service,
            store,
            reports,
        }
    }

    pub async fn wait_for(
        &self,
        predicate: impl FnMut(&ScanState) -> bool,
    ) -> ScanState {
        timeout(WAIT, self.controller.wait_for(predicate))
            .await
            .expect("timed out waiting for controller state")
            .expect("controller closed")
    }

    pub async fn wait_for_stage(&self, stage: ScanStage) -> ScanState {
        self.wait_for(|state| state.stage() == stage).await
    }

    pub async fn go_offline(&self) -> ScanState {
        self.network.send_replace(false);
        self.wait_for(|state| state.network_error()).await
    }

    pub async fn go_online(&self) -> ScanState {
        self.network.send_replace(true);
        self.wait_for(|state| !state.network_error()).await
    }

    pub async fn next_report(&mut self) -> FailureReport {
        timeout(WAIT, self.reports.recv())
            .await
            .expect("timed out waiting for a failure report")
            .expect("reporter dropped")
    }
}

/// Stages entered until the run reaches `complete` or `error`.
pub async fn stages_until_terminal(
    events: &mut broadcast::Receiver<ControllerEvent>,
) -> Vec<ScanStage> {
    let mut stages = Vec::new();
    loop {
        let event = timeout(WAIT, events.recv())
            .await
            .expect("timed out waiting for controller events")
            .expect("event stream closed");
        if let ControllerEvent::StageEntered { stage, .. } = event {
            stages.push(stage);
            if stage.is_terminal() {
                return stages;
            }
        }
    }
}
