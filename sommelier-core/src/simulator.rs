//! Scripted stand-in for the scanning backend.
//!
//! Every step sleeps for its configured delay and then succeeds with a fixed
//! catalogue, unless failure injection targets that step.

use async_trait::async_trait;
use sommelier_contracts::scan_service::ScanService;
use sommelier_model::{
    CapturedImage, ProcessedWineList, ScanServiceError, ScanStage, WineResult,
};
use tokio::time::sleep;
use tracing::debug;

use crate::config::SimulatorConfig;

#[derive(Debug, Clone)]
pub struct SimulatedScanService {
    config: SimulatorConfig,
    catalogue: Vec<WineResult>,
}

impl SimulatedScanService {
    pub fn new(config: SimulatorConfig) -> Self {
        Self::with_catalogue(config, demo_catalogue())
    }

    pub fn with_catalogue(
        config: SimulatorConfig,
        catalogue: Vec<WineResult>,
    ) -> Self {
        Self { config, catalogue }
    }

    pub fn catalogue(&self) -> &[WineResult] {
        &self.catalogue
    }

    async fn step(&self, stage: ScanStage) -> Result<(), ScanServiceError> {
        let delay = self.config.delay_for(stage);
        debug!(target: "scan::simulator", %stage, delay_ms = delay.as_millis() as u64, "simulating step");
        sleep(delay).await;

        if self.config.fail_at == Some(stage) {
            return Err(ScanServiceError::new(stage, injected_reason(stage)));
        }
        Ok(())
    }
}

#[async_trait]
impl ScanService for SimulatedScanService {
    async fn capture(&self) -> Result<CapturedImage, ScanServiceError> {
        self.step(ScanStage::Capturing).await?;
        Ok(CapturedImage::new(b"simulated wine list".to_vec()))
    }

    async fn process(
        &self,
        image: CapturedImage,
    ) -> Result<ProcessedWineList, ScanServiceError> {
        self.step(ScanStage::Processing).await?;
        let entries = self
            .catalogue
            .iter()
            .map(|wine| match (&wine.vintage, &wine.list_price) {
                (Some(vintage), Some(price)) => {
                    format!("{} {vintage} .... {price}", wine.name)
                }
                (Some(vintage), None) => format!("{} {vintage}", wine.name),
                (None, Some(price)) => format!("{} .... {price}", wine.name),
                (None, None) => wine.name.clone(),
            })
            .collect();
        Ok(ProcessedWineList::new(image.id, entries))
    }

    async fn analyze(
        &self,
        _processed: ProcessedWineList,
    ) -> Result<Vec<WineResult>, ScanServiceError> {
        self.step(ScanStage::Analyzing).await?;
        Ok(self.catalogue.clone())
    }

    fn stage_message(&self, stage: ScanStage) -> Option<String> {
        match stage {
            ScanStage::Processing => Some("Processing wine list...".to_string()),
            _ => None,
        }
    }
}

fn injected_reason(stage: ScanStage) -> &'static str {
    match stage {
        ScanStage::Capturing => "camera unavailable",
        ScanStage::Processing => "upload interrupted",
        _ => "matching service unavailable",
    }
}

/// Wines returned by the simulator.
pub fn demo_catalogue() -> Vec<WineResult> {
    vec![
        WineResult::new("Barolo Cannubi")
            .with_producer("Luciano Sandrone")
            .with_vintage(2017)
            .with_region("Piedmont")
            .with_list_price("$185")
            .with_match_score(0.94),
        WineResult::new("Sancerre Les Romains")
            .with_producer("Domaine Vacheron")
            .with_vintage(2021)
            .with_region("Loire Valley")
            .with_list_price("$96")
            .with_match_score(0.88),
        WineResult::new("Rioja Gran Reserva 904")
            .with_producer("La Rioja Alta")
            .with_vintage(2015)
            .with_region("Rioja")
            .with_list_price("$140")
            .with_match_score(0.91),
        WineResult::new("Willamette Valley Pinot Noir")
            .with_producer("Bergström")
            .with_vintage(2020)
            .with_region("Oregon")
            .with_list_price("$110")
            .with_match_score(0.79),
    ]
}
