//! Connectivity changes never touch the pipeline, only the offline flags.

#[path = "support/mod.rs"]
mod support;

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use sommelier_core::config::{
    ControllerConfig, NetworkMonitorConfig, SimulatorConfig,
};
use sommelier_core::controller::{ControllerDeps, ScanController};
use sommelier_core::network::NetworkStatusMonitor;
use sommelier_core::offline::InMemoryOfflineStore;
use sommelier_core::simulator::SimulatedScanService;
use sommelier_model::{ScanStage, ScanState};
use support::fakes::{
    RecordingReporter, ScriptedScanService, ScriptedStore, sample_wines,
};
use support::harness::Harness;
use tokio::time::{Instant, timeout};

fn offline_flags_consistent(state: &ScanState, has_cache: bool) -> bool {
    state.offline_available() == (state.network_error() && has_cache)
        && state.show_offline_options() == state.offline_available()
}

#[tokio::test]
async fn network_changes_mid_scan_leave_the_pipeline_alone() -> Result<()> {
    let (service, gate) = ScriptedScanService::gated(sample_wines(2));
    let harness =
        Harness::new(service, ScriptedStore::with_results(sample_wines(1)));

    harness.controller.start().await?;
    harness.wait_for_stage(ScanStage::Capturing).await;

    let state = harness.go_offline().await;
    assert_eq!(state.stage(), ScanStage::Capturing);
    assert!(state.is_processing());
    assert_eq!(state.message(), "Capturing image...");
    assert!(state.offline_available());

    gate.release(1);
    harness.wait_for_stage(ScanStage::Processing).await;
    let state = harness.go_online().await;
    assert_eq!(state.stage(), ScanStage::Processing);
    assert!(!state.offline_available());

    gate.release(2);
    let state = harness.wait_for_stage(ScanStage::Complete).await;
    assert_eq!(state.found_wines().len(), 2);
    assert!(!state.network_error());
    assert_eq!(harness.service.calls().len(), 3);
    Ok(())
}

#[tokio::test]
async fn offline_flags_stay_consistent_while_flapping() {
    for has_cache in [false, true] {
        let store = if has_cache {
            ScriptedStore::with_results(sample_wines(1))
        } else {
            ScriptedStore::empty()
        };
        let harness =
            Harness::new(ScriptedScanService::succeeding(Vec::new()), store);

        for _ in 0..3 {
            let state = harness.go_offline().await;
            assert!(offline_flags_consistent(&state, has_cache));
            assert_eq!(state.stage(), ScanStage::Idle);

            let state = harness.go_online().await;
            assert!(offline_flags_consistent(&state, has_cache));
            assert_eq!(state.stage(), ScanStage::Idle);
        }
    }
}

#[tokio::test]
async fn network_drop_after_completion_keeps_results() -> Result<()> {
    let harness = Harness::new(
        ScriptedScanService::succeeding(sample_wines(4)),
        ScriptedStore::empty(),
    );

    harness.controller.start().await?;
    let complete = harness.wait_for_stage(ScanStage::Complete).await;
    let state = harness.go_offline().await;

    assert_eq!(state.stage(), ScanStage::Complete);
    assert_eq!(state.message(), complete.message());
    assert_eq!(state.found_wines(), complete.found_wines());
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn monitor_drives_controller_connectivity() -> Result<()> {
    let (monitor, connectivity) = NetworkStatusMonitor::spawn(
        true,
        &NetworkMonitorConfig {
            debounce_ms: 100,
            ..NetworkMonitorConfig::default()
        },
    );
    let (reporter, _reports) = RecordingReporter::new();
    let controller = ScanController::spawn(
        ControllerDeps {
            service: Arc::new(SimulatedScanService::new(
                SimulatorConfig::default(),
            )),
            store: Arc::new(InMemoryOfflineStore::with_results(sample_wines(2))),
            reporter: Arc::new(reporter),
            network: monitor.subscribe(),
        },
        ControllerConfig::default(),
    );

    // A short blip inside the debounce window never reaches the controller.
    connectivity.report(false);
    tokio::time::sleep(Duration::from_millis(20)).await;
    connectivity.report(true);
    tokio::time::sleep(Duration::from_millis(500)).await;
    assert!(!controller.state().network_error());

    connectivity.report(false);
    let state = timeout(
        Duration::from_secs(1),
        controller.wait_for(|state| state.network_error()),
    )
    .await??;
    assert!(state.offline_available());

    // Dropping the monitor's reporters keeps the last known status.
    drop(connectivity);
    let started = Instant::now();
    controller.start().await?;
    let state = timeout(
        Duration::from_secs(30),
        controller.wait_for(|state| state.stage().is_terminal()),
    )
    .await??;
    assert_eq!(state.stage(), ScanStage::Complete);
    assert!(state.network_error());
    assert!(started.elapsed() >= Duration::from_millis(5000));
    Ok(())
}
