//! One future per pipeline step.
//!
//! Each step owns an `Arc` of the scan service so the actor can hold the
//! in-flight step alongside its other state and keep serving commands and
//! network updates while it is pending.

use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures::FutureExt;
use futures::future::BoxFuture;
use sommelier_contracts::scan_service::ScanService;
use sommelier_model::{
    CapturedImage, ProcessedWineList, ScanServiceError, ScanStage, WineResult,
};

pub(crate) type StepFuture = BoxFuture<'static, StepOutcome>;

#[derive(Debug)]
pub(crate) enum StepOutcome {
    Captured(Result<CapturedImage, ScanServiceError>),
    Processed(Result<ProcessedWineList, ScanServiceError>),
    Analyzed(Result<Vec<WineResult>, ScanServiceError>),
    /// The service panicked while running the step.
    Panicked(ScanStage),
}

impl StepOutcome {
    pub(crate) fn stage(&self) -> ScanStage {
        match self {
            StepOutcome::Captured(_) => ScanStage::Capturing,
            StepOutcome::Processed(_) => ScanStage::Processing,
            StepOutcome::Analyzed(_) => ScanStage::Analyzing,
            StepOutcome::Panicked(stage) => *stage,
        }
    }
}

pub(crate) fn capture(service: Arc<dyn ScanService>) -> StepFuture {
    guarded(ScanStage::Capturing, async move {
        StepOutcome::Captured(service.capture().await)
    })
}

pub(crate) fn process(
    service: Arc<dyn ScanService>,
    image: CapturedImage,
) -> StepFuture {
    guarded(ScanStage::Processing, async move {
        StepOutcome::Processed(service.process(image).await)
    })
}

pub(crate) fn analyze(
    service: Arc<dyn ScanService>,
    processed: ProcessedWineList,
) -> StepFuture {
    guarded(ScanStage::Analyzing, async move {
        StepOutcome::Analyzed(service.analyze(processed).await)
    })
}

// A panicking service must not take the actor down with it.
fn guarded<F>(stage: ScanStage, step: F) -> StepFuture
where
    F: Future<Output = StepOutcome> + Send + 'static,
{
    AssertUnwindSafe(step)
        .catch_unwind()
        .map(move |result| {
            result.unwrap_or(StepOutcome::Panicked(stage))
        })
        .boxed()
}
