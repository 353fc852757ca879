//! Scripted collaborators for driving the controller deterministically.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use sommelier_contracts::prelude::{
    ErrorReporter, OfflineStore, OfflineStoreError, ReportError, ScanService,
};
use sommelier_model::{
    CapturedImage, FailureReport, ProcessedWineList, ScanServiceError,
    ScanStage, WineResult,
};
use tokio::sync::{Semaphore, mpsc};

pub fn sample_wines(count: usize) -> Vec<WineResult> {
    (0..count)
        .map(|i| {
            WineResult::new(format!("Test Wine {i}"))
                .with_vintage(2010 + i as u16)
                .with_match_score(0.9)
        })
        .collect()
}

/// Releases gated pipeline steps one permit at a time.
#[derive(Clone)]
pub struct Gate(Arc<Semaphore>);

impl Gate {
    pub fn release(&self, steps: usize) {
        self.0.add_permits(steps);
    }
}

pub struct ScriptedScanService {
    wines: Vec<WineResult>,
    gate: Option<Arc<Semaphore>>,
    fail_at: Mutex<Option<ScanStage>>,
    panic_at: Mutex<Option<ScanStage>>,
    messages: HashMap<ScanStage, String>,
    calls: Mutex<Vec<ScanStage>>,
}

impl ScriptedScanService {
    pub fn succeeding(wines: Vec<WineResult>) -> Self {
        Self {
            wines,
            gate: None,
            fail_at: Mutex::new(None),
            panic_at: Mutex::new(None),
            messages: HashMap::new(),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Every step waits for one permit from the returned gate.
    pub fn gated(wines: Vec<WineResult>) -> (Self, Gate) {
        let semaphore = Arc::new(Semaphore::new(0));
        let service = Self {
            gate: Some(Arc::clone(&semaphore)),
            ..Self::succeeding(wines)
        };
        (service, Gate(semaphore))
    }

    pub fn with_message(mut self, stage: ScanStage, message: &str) -> Self {
        self.messages.insert(stage, message.to_string());
        self
    }

    pub fn fail_at(&self, stage: Option<ScanStage>) {
        *self.fail_at.lock().unwrap() = stage;
    }

    pub fn panic_at(&self, stage: Option<ScanStage>) {
        *self.panic_at.lock().unwrap() = stage;
    }

    pub fn calls(&self) -> Vec<ScanStage> {
        self.calls.lock().unwrap().clone()
    }

    async fn step(&self, stage: ScanStage) -> Result<(), ScanServiceError> {
        self.calls.lock().unwrap().push(stage);
        if let Some(gate) = &self.gate {
            gate.acquire().await.expect("gate closed").forget();
        }

        let panic_here = *self.panic_at.lock().unwrap() == Some(stage);
        if panic_here {
            panic!("scripted panic during {stage}");
        }
        let fail_here = *self.fail_at.lock().unwrap() == Some(stage);
        if fail_here {
            return Err(ScanServiceError::new(stage, "scripted failure"));
        }
        Ok(())
    }
}

#[async_trait]
impl ScanService for ScriptedScanService {
    async fn capture(&self) -> Result<CapturedImage, ScanServiceError> {
        self.step(ScanStage::Capturing).await?;
        Ok(CapturedImage::new(vec![0xFF, 0xD8]))
    }

    async fn process(
        &self,
        image: CapturedImage,
    ) -> Result<ProcessedWineList, ScanServiceError> {
        self.step(ScanStage::Processing).await?;
        let entries = self.wines.iter().map(|w| w.name.clone()).collect();
        Ok(ProcessedWineList::new(image.id, entries))
    }

    async fn analyze(
        &self,
        _processed: ProcessedWineList,
    ) -> Result<Vec<WineResult>, ScanServiceError> {
        self.step(ScanStage::Analyzing).await?;
        Ok(self.wines.clone())
    }

    fn stage_message(&self, stage: ScanStage) -> Option<String> {
        self.messages.get(&stage).cloned()
    }
}

/// Offline store whose answers can be scripted, including the eviction race
/// where presence is advertised but the load comes back empty.
#[derive(Default)]
pub struct ScriptedStore {
    contents: Mutex<Vec<WineResult>>,
    advertise_without_contents: AtomicBool,
    fail_writes: AtomicBool,
    writes: Mutex<Vec<usize>>,
}

impl ScriptedStore {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn with_results(wines: Vec<WineResult>) -> Self {
        let store = Self::default();
        *store.contents.lock().unwrap() = wines;
        store
    }

    /// Claims to hold results until the first load, which finds nothing.
    pub fn evicted_before_load() -> Self {
        let store = Self::default();
        store.advertise_without_contents.store(true, Ordering::SeqCst);
        store
    }

    pub fn replace(&self, wines: Vec<WineResult>) {
        *self.contents.lock().unwrap() = wines;
    }

    pub fn fail_writes(&self) {
        self.fail_writes.store(true, Ordering::SeqCst);
    }

    /// Sizes of the result lists written so far.
    pub fn writes(&self) -> Vec<usize> {
        self.writes.lock().unwrap().clone()
    }
}

#[async_trait]
impl OfflineStore for ScriptedStore {
    async fn has_cached_results(&self) -> bool {
        self.advertise_without_contents.load(Ordering::SeqCst)
            || !self.contents.lock().unwrap().is_empty()
    }

    async fn load_cached_results(&self) -> Vec<WineResult> {
        self.advertise_without_contents.store(false, Ordering::SeqCst);
        self.contents.lock().unwrap().clone()
    }

    async fn cache_results(
        &self,
        wines: &[WineResult],
    ) -> Result<(), OfflineStoreError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(OfflineStoreError::Write("disk full".into()));
        }
        self.writes.lock().unwrap().push(wines.len());
        *self.contents.lock().unwrap() = wines.to_vec();
        Ok(())
    }
}

pub struct RecordingReporter {
    tx: mpsc::UnboundedSender<FailureReport>,
}

impl RecordingReporter {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<FailureReport>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

#[async_trait]
impl ErrorReporter for RecordingReporter {
    async fn report(&self, report: FailureReport) -> Result<(), ReportError> {
        let _ = self.tx.send(report);
        Ok(())
    }
}

/// Reporter that always errors, or panics when asked to.
pub struct BrokenReporter {
    pub panics: bool,
}

#[async_trait]
impl ErrorReporter for BrokenReporter {
    async fn report(&self, _report: FailureReport) -> Result<(), ReportError> {
        if self.panics {
            panic!("reporter exploded");
        }
        Err(ReportError::Unavailable("collector offline".into()))
    }
}
