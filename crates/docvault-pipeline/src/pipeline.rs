//! Upload pipeline: persist → extract → interpret.
//!
//! Each submit replaces the current [`UploadJob`] and spawns a run on the tokio
//! runtime. Runs are never cancelled; instead every state write names the job
//! it belongs to and is dropped once a newer job has taken over. A superseded
//! run also stops before starting its next stage.

use docvault_analysis::{TextExtractor, TextInterpreter};
use docvault_core::{SourceFile, StorageTier};
use docvault_storage::{ObjectStore, ProgressCallback, TransferProgress};
use std::fmt::Display;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use crate::error::PipelineError;
use crate::job::{ErrorPanel, JobId, JobStage, UploadJob};
use crate::policy::{failure_policy, FailurePolicy, Stage};

/// Handle to a spawned run.
#[derive(Debug)]
pub struct JobHandle {
    id: JobId,
    task: JoinHandle<()>,
}

impl JobHandle {
    pub fn id(&self) -> JobId {
        self.id
    }

    /// Wait for the run to finish, whether it completed, failed, or was superseded.
    pub async fn wait(self) -> Result<(), PipelineError> {
        self.task
            .await
            .map_err(|e| PipelineError::Task(format!("Task join error: {}", e)))
    }
}

pub struct UploadPipeline {
    storage: Arc<dyn ObjectStore>,
    extractor: Arc<dyn TextExtractor>,
    interpreter: Arc<dyn TextInterpreter>,
    state: Arc<watch::Sender<UploadJob>>,
    max_file_size: Option<u64>,
}

impl UploadPipeline {
    pub fn new(
        storage: Arc<dyn ObjectStore>,
        extractor: Arc<dyn TextExtractor>,
        interpreter: Arc<dyn TextInterpreter>,
        tier: StorageTier,
    ) -> Self {
        let (state, _) = watch::channel(UploadJob::idle(tier));
        Self {
            storage,
            extractor,
            interpreter,
            state: Arc::new(state),
            max_file_size: None,
        }
    }

    /// Reject files larger than `bytes` at submit time.
    pub fn with_max_file_size(mut self, bytes: u64) -> Self {
        self.max_file_size = Some(bytes);
        self
    }

    /// Snapshot of the current job.
    pub fn current(&self) -> UploadJob {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<UploadJob> {
        self.state.subscribe()
    }

    /// Start a new job for `file`, superseding whatever job is current.
    ///
    /// Must be called from within a tokio runtime.
    pub fn submit(&self, file: SourceFile, tier: StorageTier) -> Result<JobHandle, PipelineError> {
        if file.is_empty() {
            return Err(PipelineError::EmptyFile(file.name));
        }
        if let Some(limit) = self.max_file_size {
            if file.size() > limit {
                return Err(PipelineError::FileTooLarge {
                    size: file.size(),
                    filename: file.name,
                    limit,
                });
            }
        }

        let mut id = JobId::default();
        self.state.send_modify(|job| {
            id = job.id.next();
            *job = UploadJob::started(id, file.name.clone(), tier);
        });

        info!(
            job_id = %id,
            filename = %file.name,
            tier = %tier,
            size_bytes = file.size(),
            "Upload job submitted"
        );

        let run = JobRun {
            id,
            tier,
            state: self.state.clone(),
            storage: self.storage.clone(),
            extractor: self.extractor.clone(),
            interpreter: self.interpreter.clone(),
        };
        let task = tokio::spawn(run.execute(file));

        Ok(JobHandle { id, task })
    }

    /// Caller-level entry: nothing selected is a no-op.
    pub fn submit_selection(
        &self,
        file: Option<SourceFile>,
        tier: StorageTier,
    ) -> Result<Option<JobHandle>, PipelineError> {
        match file {
            Some(file) => self.submit(file, tier).map(Some),
            None => {
                debug!("No file selected; nothing to upload");
                Ok(None)
            }
        }
    }
}

/// One spawned run. Every write goes through [`JobRun::update`] so that a run
/// cannot touch a job other than its own.
struct JobRun {
    id: JobId,
    tier: StorageTier,
    state: Arc<watch::Sender<UploadJob>>,
    storage: Arc<dyn ObjectStore>,
    extractor: Arc<dyn TextExtractor>,
    interpreter: Arc<dyn TextInterpreter>,
}

impl JobRun {
    async fn execute(self, file: SourceFile) {
        let start = Instant::now();

        if let Err(e) = self
            .storage
            .put(&file.name, self.tier, file.content.clone(), self.progress_callback())
            .await
        {
            self.fail(Stage::Upload, JobStage::UploadFailed, &e);
            return;
        }
        info!(
            job_id = %self.id,
            filename = %file.name,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "File uploaded"
        );
        if !self.enter(JobStage::Uploaded) || !self.enter(JobStage::Extracting) {
            return;
        }

        // The original bytes go to the extractor, not a re-download.
        let extraction = match self.extractor.extract(&file).await {
            Ok(extraction) => extraction,
            Err(e) => {
                self.fail(Stage::Extract, JobStage::ExtractFailed, &e);
                return;
            }
        };
        debug!(
            job_id = %self.id,
            extractor = self.extractor.name(),
            lines = extraction.lines.len(),
            "Extraction completed"
        );
        if !self.enter(JobStage::Extracted {
            extraction: extraction.clone(),
        }) {
            return;
        }
        if !self.enter(JobStage::Interpreting {
            extraction: extraction.clone(),
        }) {
            return;
        }

        match self.interpreter.interpret(&extraction.full_text).await {
            Ok(interpretation) => {
                if self.enter(JobStage::Interpreted {
                    extraction,
                    interpretation,
                }) {
                    info!(
                        job_id = %self.id,
                        filename = %file.name,
                        duration_ms = start.elapsed().as_secs_f64() * 1000.0,
                        "Upload job completed"
                    );
                }
            }
            Err(e) => {
                self.fail(Stage::Interpret, JobStage::InterpretFailed { extraction }, &e);
            }
        }
    }

    fn progress_callback(&self) -> ProgressCallback {
        let state = self.state.clone();
        let id = self.id;
        Arc::new(move |progress: TransferProgress| {
            if let Some(percent) = progress.percent() {
                state.send_if_modified(|job| job.id == id && job.record_progress(percent));
            }
        })
    }

    /// Apply `change` if this run's job is still current.
    fn update(&self, change: impl FnOnce(&mut UploadJob)) -> bool {
        let applied = self.state.send_if_modified(|job| {
            if job.id != self.id {
                return false;
            }
            change(job);
            true
        });
        if !applied {
            debug!(job_id = %self.id, "Job superseded; dropping state update");
        }
        applied
    }

    fn enter(&self, stage: JobStage) -> bool {
        self.update(|job| job.stage = stage)
    }

    fn fail(&self, stage: Stage, next: JobStage, err: &dyn Display) -> bool {
        match failure_policy(stage) {
            FailurePolicy::Surface => {
                warn!(job_id = %self.id, stage = %stage, error = %err, "Stage failed");
                self.update(|job| {
                    job.stage = next;
                    job.error_panel = Some(ErrorPanel::no_valid_data());
                })
            }
            FailurePolicy::LogOnly => {
                match stage {
                    Stage::Upload => {
                        error!(job_id = %self.id, stage = %stage, error = %err, "Stage failed")
                    }
                    _ => warn!(job_id = %self.id, stage = %stage, error = %err, "Stage failed"),
                }
                self.enter(next)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use docvault_analysis::test_helpers::{MockExtractor, MockInterpreter};
    use docvault_core::{ExtractionResult, InterpretationResult};
    use docvault_storage::MemoryStorage;

    fn pipeline(storage: MemoryStorage) -> UploadPipeline {
        UploadPipeline::new(
            Arc::new(storage),
            Arc::new(MockExtractor::new(ExtractionResult::from_lines(["hello"]))),
            Arc::new(MockInterpreter::new(InterpretationResult::default())),
            StorageTier::Private,
        )
    }

    #[tokio::test]
    async fn starts_idle() {
        let pipeline = pipeline(MemoryStorage::new());
        let job = pipeline.current();
        assert_eq!(job.status(), crate::JobStatus::Idle);
        assert!(job.filename.is_none());
    }

    #[tokio::test]
    async fn empty_file_is_rejected_without_replacing_job() {
        let pipeline = pipeline(MemoryStorage::new());
        let result = pipeline.submit(
            SourceFile::new("empty.pdf", Vec::<u8>::new()),
            StorageTier::Private,
        );

        assert!(matches!(result, Err(PipelineError::EmptyFile(name)) if name == "empty.pdf"));
        assert_eq!(pipeline.current().id, JobId::default());
    }

    #[tokio::test]
    async fn oversized_file_is_rejected() {
        let pipeline = pipeline(MemoryStorage::new()).with_max_file_size(4);
        let result =
            pipeline.submit(SourceFile::new("big.pdf", vec![0u8; 5]), StorageTier::Private);

        assert!(matches!(
            result,
            Err(PipelineError::FileTooLarge { size: 5, limit: 4, .. })
        ));
    }

    #[tokio::test]
    async fn no_selection_is_a_no_op() {
        let storage = MemoryStorage::new();
        let pipeline = pipeline(storage.clone());

        let handle = pipeline.submit_selection(None, StorageTier::Private).unwrap();
        assert!(handle.is_none());
        assert_eq!(storage.put_calls(), 0);
        assert_eq!(pipeline.current().status(), crate::JobStatus::Idle);
    }

    #[tokio::test]
    async fn submit_assigns_increasing_ids() {
        let pipeline = pipeline(MemoryStorage::new());
        let first = pipeline
            .submit(SourceFile::new("a.pdf", vec![1u8]), StorageTier::Private)
            .unwrap();
        let second = pipeline
            .submit(SourceFile::new("b.pdf", vec![1u8]), StorageTier::Private)
            .unwrap();

        let second_id = second.id();
        assert!(second_id > first.id());
        first.wait().await.unwrap();
        second.wait().await.unwrap();
        assert_eq!(pipeline.current().id, second_id);
    }
}
