//! Payloads exchanged with the scan service between pipeline steps.

use std::fmt;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::stage::ScanStage;

/// Raw image produced by the capture step.
#[derive(Clone, PartialEq, Eq)]
pub struct CapturedImage {
    pub id: Uuid,
    pub bytes: Vec<u8>,
    pub captured_at: DateTime<Utc>,
}

impl CapturedImage {
    pub fn new(bytes: Vec<u8>) -> Self {
        Self {
            id: Uuid::now_v7(),
            bytes,
            captured_at: Utc::now(),
        }
    }
}

// Image payloads can be megabytes; keep them out of logs.
impl fmt::Debug for CapturedImage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CapturedImage")
            .field("id", &self.id)
            .field("byte_len", &self.bytes.len())
            .field("captured_at", &self.captured_at)
            .finish()
    }
}

/// Text entries recognised on the list by the processing step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessedWineList {
    pub image_id: Uuid,
    pub entries: Vec<String>,
}

impl ProcessedWineList {
    pub fn new(image_id: Uuid, entries: Vec<String>) -> Self {
        Self { image_id, entries }
    }
}

/// Failure reported by one step of the scan service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanServiceError {
    pub stage: ScanStage,
    pub reason: String,
}

impl ScanServiceError {
    pub fn new(stage: ScanStage, reason: impl Into<String>) -> Self {
        Self {
            stage,
            reason: reason.into(),
        }
    }

    pub fn capture(reason: impl Into<String>) -> Self {
        Self::new(ScanStage::Capturing, reason)
    }

    pub fn processing(reason: impl Into<String>) -> Self {
        Self::new(ScanStage::Processing, reason)
    }

    pub fn analysis(reason: impl Into<String>) -> Self {
        Self::new(ScanStage::Analyzing, reason)
    }
}

impl fmt::Display for ScanServiceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} step failed: {}", self.stage, self.reason)
    }
}

impl std::error::Error for ScanServiceError {}
