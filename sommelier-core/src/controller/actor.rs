use std::sync::Arc;

use futures::future::OptionFuture;
use sommelier_contracts::prelude::{ErrorReporter, OfflineStore, ScanService};
use sommelier_model::{
    FailureReport, RunId, ScanFailure, ScanStage, ScanState, WineResult,
};
use tokio::sync::{broadcast, mpsc, oneshot, watch};
use tracing::{debug, info, warn};

use super::events::{
    CommandOutcome, ControllerEvent, ResultOrigin, StartTrigger,
};
use super::pipeline::{self, StepFuture, StepOutcome};
use crate::config::ControllerConfig;
use crate::error::ControllerError;

const TARGET: &str = "scan::controller";

pub(crate) enum ControllerCommand {
    Start {
        trigger: StartTrigger,
        reply: oneshot::Sender<Result<RunId, ControllerError>>,
    },
    RequestResults {
        reply: oneshot::Sender<CommandOutcome>,
    },
    RequestOfflineResults {
        reply: oneshot::Sender<CommandOutcome>,
    },
    RefreshOfflineAvailability {
        reply: oneshot::Sender<()>,
    },
    Shutdown,
}

struct ActiveRun {
    id: RunId,
    step: StepFuture,
}

/// Sole owner of the [`ScanState`].
///
/// Commands, debounced connectivity changes and step completions are
/// handled one at a time from a single select loop, so the state never has
/// more than one writer.
pub(crate) struct ControllerActor {
    state: ScanState,
    config: ControllerConfig,
    service: Arc<dyn ScanService>,
    store: Arc<dyn OfflineStore>,
    reporter: Arc<dyn ErrorReporter>,
    commands: mpsc::Receiver<ControllerCommand>,
    network: watch::Receiver<bool>,
    network_open: bool,
    snapshots: watch::Sender<ScanState>,
    events: broadcast::Sender<ControllerEvent>,
    run: Option<ActiveRun>,
    results_origin: ResultOrigin,
}

pub(crate) struct ActorParts {
    pub(crate) config: ControllerConfig,
    pub(crate) service: Arc<dyn ScanService>,
    pub(crate) store: Arc<dyn OfflineStore>,
    pub(crate) reporter: Arc<dyn ErrorReporter>,
    pub(crate) commands: mpsc::Receiver<ControllerCommand>,
    pub(crate) network: watch::Receiver<bool>,
    pub(crate) snapshots: watch::Sender<ScanState>,
    pub(crate) events: broadcast::Sender<ControllerEvent>,
}

impl ControllerActor {
    pub(crate) fn new(parts: ActorParts) -> Self {
        let state = parts.snapshots.borrow().clone();
        Self {
            state,
            config: parts.config,
            service: parts.service,
            store: parts.store,
            reporter: parts.reporter,
            commands: parts.commands,
            network: parts.network,
            network_open: true,
            snapshots: parts.snapshots,
            events: parts.events,
            run: None,
            results_origin: ResultOrigin::Live,
        }
    }

    pub(crate) async fn run(mut self) {
        self.sync_connectivity().await;

        loop {
            tokio::select! {
                command = self.commands.recv() => match command {
                    Some(ControllerCommand::Shutdown) | None => break,
                    Some(command) => self.handle_command(command).await,
                },
                changed = self.network.changed(), if self.network_open => {
                    if changed.is_err() {
                        debug!(target: TARGET, "network monitor closed; keeping last known status");
                        self.network_open = false;
                        continue;
                    }
                    self.sync_connectivity().await;
                }
                Some(outcome) = OptionFuture::from(self.run.as_mut().map(|run| &mut run.step)),
                    if self.run.is_some() =>
                {
                    self.on_step_outcome(outcome).await;
                }
            }
        }

        if let Some(run) = self.run.take() {
            warn!(target: TARGET, run_id = %run.id, stage = %self.state.stage(), "controller stopped with a scan in flight");
        }
        debug!(target: TARGET, "scan controller stopped");
    }

    async fn handle_command(&mut self, command: ControllerCommand) {
        match command {
            ControllerCommand::Start { trigger, reply } => {
                let _ = reply.send(self.start(trigger));
            }
            ControllerCommand::RequestResults { reply } => {
                let _ = reply.send(self.request_results());
            }
            ControllerCommand::RequestOfflineResults { reply } => {
                let outcome = self.request_offline_results().await;
                let _ = reply.send(outcome);
            }
            ControllerCommand::RefreshOfflineAvailability { reply } => {
                self.sync_connectivity().await;
                let _ = reply.send(());
            }
            ControllerCommand::Shutdown => {}
        }
    }

    fn start(
        &mut self,
        trigger: StartTrigger,
    ) -> Result<RunId, ControllerError> {
        let stage = self.state.stage();
        if self.run.is_some() || !stage.can_start() {
            warn!(target: TARGET, %stage, %trigger, "scan already in flight; rejecting");
            return Err(ControllerError::AlreadyRunning { stage });
        }

        let run_id = RunId::new();
        info!(target: TARGET, %run_id, %trigger, from = %stage, "starting scan");
        self.emit(ControllerEvent::RunStarted { run_id, trigger });
        self.enter_stage(run_id, ScanStage::Capturing);
        self.run = Some(ActiveRun {
            id: run_id,
            step: pipeline::capture(Arc::clone(&self.service)),
        });
        Ok(run_id)
    }

    fn request_results(&mut self) -> CommandOutcome {
        if self.state.stage() != ScanStage::Complete {
            debug!(target: TARGET, stage = %self.state.stage(), "results requested before completion; ignoring");
            return CommandOutcome::Ignored;
        }

        self.emit(ControllerEvent::ShowResults {
            wines: self.state.found_wines().to_vec(),
            origin: self.results_origin,
        });
        CommandOutcome::Applied
    }

    async fn request_offline_results(&mut self) -> CommandOutcome {
        if !self.state.offline_available() {
            debug!(target: TARGET, "offline results requested but none are available; ignoring");
            return CommandOutcome::Ignored;
        }
        if self.run.is_some() {
            debug!(target: TARGET, stage = %self.state.stage(), "offline results requested mid-scan; ignoring");
            return CommandOutcome::Ignored;
        }

        let wines = self.store.load_cached_results().await;
        if wines.is_empty() {
            warn!(target: "scan::offline", "offline cache advertised results but returned none");
            let failure = ScanFailure::OfflineLoadEmpty;
            self.state.fail(&failure);
            self.publish();
            self.emit(ControllerEvent::StageEntered {
                run_id: None,
                stage: ScanStage::Error,
            });
            self.report_failure(&failure);
            // The store evidently no longer holds anything worth offering.
            self.sync_connectivity().await;
            return CommandOutcome::Failed;
        }

        info!(target: "scan::offline", count = wines.len(), "showing cached results");
        let message = offline_message(wines.len());
        self.state.complete(wines, message);
        self.results_origin = ResultOrigin::Offline;
        self.publish();
        self.emit(ControllerEvent::StageEntered {
            run_id: None,
            stage: ScanStage::Complete,
        });
        CommandOutcome::Applied
    }

    async fn on_step_outcome(&mut self, outcome: StepOutcome) {
        let Some(run_id) = self.run.as_ref().map(|run| run.id) else {
            return;
        };
        let stage = outcome.stage();

        match outcome {
            StepOutcome::Captured(Ok(image)) => {
                debug!(target: TARGET, %run_id, image = ?image, "capture finished");
                self.enter_stage(run_id, ScanStage::Processing);
                self.set_step(run_id, pipeline::process(self.service(), image));
            }
            StepOutcome::Processed(Ok(processed)) => {
                debug!(target: TARGET, %run_id, entries = processed.entries.len(), "processing finished");
                self.enter_stage(run_id, ScanStage::Analyzing);
                self.set_step(
                    run_id,
                    pipeline::analyze(self.service(), processed),
                );
            }
            StepOutcome::Analyzed(Ok(wines)) => {
                self.run = None;
                self.finish_live(run_id, wines).await;
            }
            StepOutcome::Captured(Err(err))
            | StepOutcome::Processed(Err(err))
            | StepOutcome::Analyzed(Err(err)) => {
                if err.stage != stage {
                    debug!(target: TARGET, %run_id, reported = %err.stage, %stage, "service reported a failure for another stage");
                }
                self.run = None;
                self.fail_run(run_id, ScanFailure::at(stage, err.reason));
            }
            StepOutcome::Panicked(_) => {
                self.run = None;
                self.fail_run(
                    run_id,
                    ScanFailure::at(stage, "scan service crashed"),
                );
            }
        }
    }

    async fn finish_live(&mut self, run_id: RunId, wines: Vec<WineResult>) {
        let count = wines.len();
        info!(target: TARGET, %run_id, count, "scan complete");

        let to_cache = (self.config.cache_completed_scans && count > 0)
            .then(|| wines.clone());

        self.state.complete(wines, completion_message(count));
        self.results_origin = ResultOrigin::Live;
        self.publish();
        self.emit(ControllerEvent::StageEntered {
            run_id: Some(run_id),
            stage: ScanStage::Complete,
        });
        self.emit(ControllerEvent::RunFinished {
            run_id,
            stage: ScanStage::Complete,
        });

        if let Some(wines) = to_cache {
            if let Err(err) = self.store.cache_results(&wines).await {
                warn!(target: "scan::offline", %run_id, error = %err, "failed to cache scan results");
            }
            self.sync_connectivity().await;
        }
    }

    fn fail_run(&mut self, run_id: RunId, failure: ScanFailure) {
        warn!(target: TARGET, %run_id, stage = %failure.stage(), kind = failure.kind(), "scan failed");
        self.state.fail(&failure);
        self.publish();
        self.emit(ControllerEvent::StageEntered {
            run_id: Some(run_id),
            stage: ScanStage::Error,
        });
        self.emit(ControllerEvent::RunFinished {
            run_id,
            stage: ScanStage::Error,
        });
        self.report_failure(&failure);
    }

    fn enter_stage(&mut self, run_id: RunId, stage: ScanStage) {
        let message = self
            .service
            .stage_message(stage)
            .unwrap_or_else(|| stage.default_message().to_string());
        debug!(target: TARGET, %run_id, %stage, "entering stage");
        self.state.enter(stage, message);
        self.publish();
        self.emit(ControllerEvent::StageEntered {
            run_id: Some(run_id),
            stage,
        });
    }

    fn set_step(&mut self, run_id: RunId, step: StepFuture) {
        self.run = Some(ActiveRun { id: run_id, step });
    }

    fn service(&self) -> Arc<dyn ScanService> {
        Arc::clone(&self.service)
    }

    async fn sync_connectivity(&mut self) {
        let online = *self.network.borrow_and_update();
        let network_error = !online;
        let has_cached_results =
            network_error && self.store.has_cached_results().await;

        if self
            .state
            .apply_connectivity(network_error, has_cached_results)
        {
            info!(
                target: "scan::network",
                online,
                offline_available = self.state.offline_available(),
                stage = %self.state.stage(),
                "connectivity reconciled"
            );
            self.publish();
        }
    }

    fn report_failure(&self, failure: &ScanFailure) {
        let reporter = Arc::clone(&self.reporter);
        let report = FailureReport::from(failure);
        tokio::spawn(async move {
            if let Err(err) = reporter.report(report).await {
                warn!(target: TARGET, error = %err, "failure report was not delivered");
            }
        });
    }

    fn publish(&self) {
        self.snapshots.send_replace(self.state.clone());
    }

    fn emit(&self, event: ControllerEvent) {
        let _ = self.events.send(event);
    }
}

fn completion_message(count: usize) -> String {
    match count {
        0 => "No wines found on the list".to_string(),
        1 => "Found 1 wine on the list".to_string(),
        n => format!("Found {n} wines on the list"),
    }
}

fn offline_message(count: usize) -> String {
    match count {
        1 => "Showing 1 cached wine while offline".to_string(),
        n => format!("Showing {n} cached wines while offline"),
    }
}

#[cfg(test)]
mod tests {
    use super::{completion_message, offline_message};

    #[test]
    fn messages_pluralise() {
        assert_eq!(completion_message(0), "No wines found on the list");
        assert_eq!(completion_message(1), "Found 1 wine on the list");
        assert_eq!(completion_message(4), "Found 4 wines on the list");
        assert_eq!(offline_message(1), "Showing 1 cached wine while offline");
        assert_eq!(offline_message(3), "Showing 3 cached wines while offline");
    }
}
