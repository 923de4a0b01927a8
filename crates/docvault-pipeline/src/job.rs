//! Upload job state
//!
//! A job walks `idle → uploading → uploaded → extracting → extracted →
//! interpreting → interpreted`, stopping early at `upload-failed`,
//! `extract-failed` or `interpret-failed`. Results live on the stage that
//! produced them, so an `interpreted` job always has both results.

use docvault_core::{ExtractionResult, InterpretationResult, StorageTier};
use serde::Serialize;
use std::fmt::{Display, Formatter, Result as FmtResult};

/// Identifies one submission. Ids increase with every submit on a pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize)]
#[serde(transparent)]
pub struct JobId(u64);

impl JobId {
    pub fn next(self) -> Self {
        JobId(self.0 + 1)
    }
}

impl Display for JobId {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum JobStatus {
    Idle,
    Uploading,
    Uploaded,
    UploadFailed,
    Extracting,
    Extracted,
    ExtractFailed,
    Interpreting,
    Interpreted,
    InterpretFailed,
}

impl JobStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            JobStatus::Idle => "idle",
            JobStatus::Uploading => "uploading",
            JobStatus::Uploaded => "uploaded",
            JobStatus::UploadFailed => "upload-failed",
            JobStatus::Extracting => "extracting",
            JobStatus::Extracted => "extracted",
            JobStatus::ExtractFailed => "extract-failed",
            JobStatus::Interpreting => "interpreting",
            JobStatus::Interpreted => "interpreted",
            JobStatus::InterpretFailed => "interpret-failed",
        }
    }

    /// No further transition will happen for this job.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            JobStatus::Idle
                | JobStatus::UploadFailed
                | JobStatus::ExtractFailed
                | JobStatus::Interpreted
                | JobStatus::InterpretFailed
        )
    }
}

impl Display for JobStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(self.as_str())
    }
}

/// Stage of a job together with the results valid at that stage.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "kebab-case")]
pub enum JobStage {
    Idle,
    Uploading,
    Uploaded,
    UploadFailed,
    Extracting,
    Extracted {
        extraction: ExtractionResult,
    },
    ExtractFailed,
    Interpreting {
        extraction: ExtractionResult,
    },
    Interpreted {
        extraction: ExtractionResult,
        interpretation: InterpretationResult,
    },
    InterpretFailed {
        extraction: ExtractionResult,
    },
}

impl JobStage {
    pub fn status(&self) -> JobStatus {
        match self {
            JobStage::Idle => JobStatus::Idle,
            JobStage::Uploading => JobStatus::Uploading,
            JobStage::Uploaded => JobStatus::Uploaded,
            JobStage::UploadFailed => JobStatus::UploadFailed,
            JobStage::Extracting => JobStatus::Extracting,
            JobStage::Extracted { .. } => JobStatus::Extracted,
            JobStage::ExtractFailed => JobStatus::ExtractFailed,
            JobStage::Interpreting { .. } => JobStatus::Interpreting,
            JobStage::Interpreted { .. } => JobStatus::Interpreted,
            JobStage::InterpretFailed { .. } => JobStatus::InterpretFailed,
        }
    }

    pub fn extraction(&self) -> Option<&ExtractionResult> {
        match self {
            JobStage::Extracted { extraction }
            | JobStage::Interpreting { extraction }
            | JobStage::Interpreted { extraction, .. }
            | JobStage::InterpretFailed { extraction } => Some(extraction),
            _ => None,
        }
    }

    pub fn interpretation(&self) -> Option<&InterpretationResult> {
        match self {
            JobStage::Interpreted { interpretation, .. } => Some(interpretation),
            _ => None,
        }
    }
}

/// User-facing error record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorPanel {
    pub header: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub content: String,
    pub id: String,
}

impl ErrorPanel {
    /// Shown for every extraction failure, whatever the underlying cause.
    pub fn no_valid_data() -> Self {
        Self {
            header: "Text identification data error - No valid data".to_string(),
            kind: "error".to_string(),
            content: "This function only works for PDF files.".to_string(),
            id: "message_error".to_string(),
        }
    }
}

/// One in-flight or finished upload as observed by subscribers.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UploadJob {
    pub id: JobId,
    /// `None` until a file has been submitted.
    pub filename: Option<String>,
    pub tier: StorageTier,
    /// Percent in `[0, 100]`; `None` until the total size is known.
    pub progress: Option<f64>,
    pub stage: JobStage,
    pub error_panel: Option<ErrorPanel>,
}

impl UploadJob {
    pub fn idle(tier: StorageTier) -> Self {
        Self {
            id: JobId::default(),
            filename: None,
            tier,
            progress: None,
            stage: JobStage::Idle,
            error_panel: None,
        }
    }

    /// Fresh job for a new submission: uploading, no progress, no results.
    pub fn started(id: JobId, filename: impl Into<String>, tier: StorageTier) -> Self {
        Self {
            id,
            filename: Some(filename.into()),
            tier,
            progress: None,
            stage: JobStage::Uploading,
            error_panel: None,
        }
    }

    pub fn status(&self) -> JobStatus {
        self.stage.status()
    }

    pub fn extraction(&self) -> Option<&ExtractionResult> {
        self.stage.extraction()
    }

    pub fn interpretation(&self) -> Option<&InterpretationResult> {
        self.stage.interpretation()
    }

    /// Raise progress to `percent` (clamped to `[0, 100]`). Lower values are
    /// ignored. Returns whether the visible progress changed.
    pub fn record_progress(&mut self, percent: f64) -> bool {
        if percent.is_nan() {
            return false;
        }
        let percent = percent.clamp(0.0, 100.0);
        match self.progress {
            Some(current) if current >= percent => false,
            _ => {
                self.progress = Some(percent);
                true
            }
        }
    }
}
