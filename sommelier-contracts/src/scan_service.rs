use async_trait::async_trait;
use sommelier_model::{
    CapturedImage, ProcessedWineList, ScanServiceError, ScanStage, WineResult,
};

/// The capture -> process -> analyze pipeline behind a scan.
///
/// Each method is one suspension point of the lifecycle controller. They are
/// called strictly in order and never concurrently for the same run.
#[async_trait]
pub trait ScanService: Send + Sync {
    /// Acquire an image of the wine list.
    async fn capture(&self) -> Result<CapturedImage, ScanServiceError>;

    /// Upload and ingest the captured image.
    async fn process(
        &self,
        image: CapturedImage,
    ) -> Result<ProcessedWineList, ScanServiceError>;

    /// Match the recognised entries against the wine database.
    async fn analyze(
        &self,
        processed: ProcessedWineList,
    ) -> Result<Vec<WineResult>, ScanServiceError>;

    /// Status text shown while `stage` runs. `None` keeps the stage default.
    fn stage_message(&self, _stage: ScanStage) -> Option<String> {
        None
    }
}
