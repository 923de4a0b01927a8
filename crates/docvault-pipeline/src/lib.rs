//! Docvault Pipeline
//!
//! The upload-and-analysis workflow and the state around it:
//!
//! - [`UploadPipeline`]: persist with progress, then extract, then interpret,
//!   publishing an [`UploadJob`] stream
//! - [`aggregate`]: pure shaping of results into display records
//! - [`FileListController`]: listing, download links, and deletion per tier
//! - [`TierSelector`]: the active storage tier

pub mod aggregate;
pub mod error;
pub mod file_list;
pub mod job;
pub mod pipeline;
pub mod policy;
pub mod tier;

pub use aggregate::{
    entity_table, extraction_summary, job_view, key_value_tokens, line_preview_tokens,
    percentage_label, progress_label, sentiment_series, DisplayToken, EntityRow,
    ExtractionSummary, JobView, SentimentSlice,
};
pub use error::PipelineError;
pub use file_list::{FileListController, EMPTY_STATE_MESSAGE};
pub use job::{ErrorPanel, JobId, JobStage, JobStatus, UploadJob};
pub use pipeline::{JobHandle, UploadPipeline};
pub use policy::{failure_policy, FailurePolicy, Stage};
pub use tier::TierSelector;
