//! `sommelier` command line driver.
//!
//! Wires a scan controller to the simulated scan service, the connectivity
//! monitor and the on-disk offline cache, then runs one scan and prints every
//! snapshot the controller publishes.

mod render;

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand, ValueEnum};
use sommelier_config::SommelierConfig;
use sommelier_contracts::prelude::OfflineStore;
use sommelier_core::config::SimulatorConfig;
use sommelier_core::controller::{
    CommandOutcome, ControllerDeps, ControllerEvent, ScanController,
};
use sommelier_core::network::{NetworkStatusMonitor, ReachabilityProbe};
use sommelier_core::offline::DiskOfflineStore;
use sommelier_core::reporting::TracingErrorReporter;
use sommelier_core::simulator::{SimulatedScanService, demo_catalogue};
use sommelier_model::{ScanStage, ScanState};
use tokio::sync::broadcast;
use tokio::time::timeout;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const RESULTS_WAIT: Duration = Duration::from_secs(5);

#[derive(Parser)]
#[command(name = "sommelier", about = "Scan a wine list and match it")]
struct Cli {
    /// Configuration file (TOML or JSON); overrides $SOMMELIER_CONFIG_PATH
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run one scan against the simulated scan service
    Scan {
        /// Make the simulated service fail during this stage
        #[arg(long, value_enum)]
        fail_at: Option<StageArg>,
        /// Start with the network reported as down
        #[arg(long)]
        offline: bool,
        /// Write the demo catalogue to the offline cache first
        #[arg(long)]
        seed_cache: bool,
        /// Skip the simulated step delays
        #[arg(long)]
        instant: bool,
    },
    /// Inspect or clear the offline cache
    Cache {
        #[command(subcommand)]
        action: CacheAction,
    },
}

#[derive(Subcommand)]
enum CacheAction {
    /// Print the cached results for the configured session
    Show,
    /// Remove the cached results for the configured session
    Clear,
}

#[derive(Clone, Copy, ValueEnum)]
enum StageArg {
    Capturing,
    Processing,
    Analyzing,
}

impl From<StageArg> for ScanStage {
    fn from(value: StageArg) -> Self {
        match value {
            StageArg::Capturing => ScanStage::Capturing,
            StageArg::Processing => ScanStage::Processing,
            StageArg::Analyzing => ScanStage::Analyzing,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    if let Err(err) = dotenvy::dotenv()
        && !err.not_found()
    {
        return Err(err).context("failed to read .env");
    }

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,scan::controller=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();
    let (config, source) = SommelierConfig::load(cli.config.as_deref())?;
    info!(source = %source.describe(), "configuration loaded");

    match cli.command {
        Command::Scan {
            fail_at,
            offline,
            seed_cache,
            instant,
        } => {
            let mut config = config;
            if let Some(stage) = fail_at {
                config.simulator.fail_at = Some(stage.into());
            }
            if instant {
                config.simulator = SimulatorConfig {
                    fail_at: config.simulator.fail_at,
                    ..SimulatorConfig::instant()
                };
            }
            run_scan(config, offline, seed_cache).await
        }
        Command::Cache { action } => {
            let store = DiskOfflineStore::from_config(&config.offline);
            match action {
                CacheAction::Show => {
                    let wines = store.load_cached_results().await;
                    if wines.is_empty() {
                        println!(
                            "no cached results in {}",
                            store.root().display()
                        );
                    } else {
                        render::print_wines(&wines);
                    }
                }
                CacheAction::Clear => {
                    store
                        .evict()
                        .await
                        .context("failed to clear offline cache")?;
                    println!("cleared {}", store.key());
                }
            }
            Ok(())
        }
    }
}

async fn run_scan(
    config: SommelierConfig,
    offline: bool,
    seed_cache: bool,
) -> Result<()> {
    let store = Arc::new(DiskOfflineStore::from_config(&config.offline));
    if seed_cache {
        store
            .cache_results(&demo_catalogue())
            .await
            .context("failed to seed offline cache")?;
        info!(dir = %store.root().display(), "seeded offline cache with demo catalogue");
    }

    let (monitor, connectivity) =
        NetworkStatusMonitor::spawn(!offline, &config.network);
    let _probe = match ReachabilityProbe::from_config(&config.network)? {
        Some(_) if offline => {
            warn!("--offline given; reachability probe disabled");
            None
        }
        Some(probe) => Some(probe.spawn(connectivity.clone())),
        None => None,
    };

    let controller = ScanController::spawn(
        ControllerDeps {
            service: Arc::new(SimulatedScanService::new(
                config.simulator.clone(),
            )),
            store,
            reporter: Arc::new(TracingErrorReporter),
            network: monitor.subscribe(),
        },
        config.controller.clone(),
    );

    let printer = tokio::spawn(render::print_snapshots(controller.subscribe()));
    let mut events = controller.subscribe_events();

    controller.start().await?;
    let state = controller
        .wait_for(|state| state.stage().is_terminal())
        .await?;

    let outcome = match state.stage() {
        ScanStage::Complete => show_results(&controller, &mut events).await,
        _ => fall_back_offline(&controller, &mut events, &state).await,
    };

    controller.shutdown().await;
    // The printer ends once the controller drops its snapshot sender.
    let _ = printer.await;
    drop(connectivity);
    outcome
}

async fn show_results(
    controller: &ScanController,
    events: &mut broadcast::Receiver<ControllerEvent>,
) -> Result<()> {
    if controller.request_results().await? != CommandOutcome::Applied {
        bail!("scan finished but results could not be shown");
    }

    let shown = timeout(RESULTS_WAIT, async {
        loop {
            match events.recv().await {
                Ok(ControllerEvent::ShowResults { wines, origin }) => {
                    return Some((wines, origin));
                }
                Ok(_) | Err(broadcast::error::RecvError::Lagged(_)) => {}
                Err(broadcast::error::RecvError::Closed) => return None,
            }
        }
    })
    .await
    .context("timed out waiting for results")?;

    match shown {
        Some((wines, origin)) => {
            render::print_results(&wines, origin);
            Ok(())
        }
        None => bail!("controller stopped before showing results"),
    }
}

async fn fall_back_offline(
    controller: &ScanController,
    events: &mut broadcast::Receiver<ControllerEvent>,
    failed: &ScanState,
) -> Result<()> {
    if !failed.offline_available() {
        bail!("scan failed: {}", failed.message());
    }

    warn!(message = failed.message(), "scan failed; falling back to cached results");
    match controller.request_offline_results().await? {
        CommandOutcome::Applied => show_results(controller, events).await,
        CommandOutcome::Ignored | CommandOutcome::Failed => {
            bail!("scan failed: {}", controller.state().message())
        }
    }
}
