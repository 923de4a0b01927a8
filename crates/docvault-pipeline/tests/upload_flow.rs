use docvault_analysis::test_helpers::{MockExtractor, MockInterpreter, MockOutcome};
use docvault_core::{
    ExtractionResult, InterpretationResult, KeyValue, Sentiment, SourceFile, StorageTier,
    TextEntity,
};
use docvault_pipeline::{
    entity_table, job_view, sentiment_series, EntityRow, ErrorPanel, JobId, JobStatus,
    UploadJob, UploadPipeline,
};
use docvault_storage::MemoryStorage;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;

const TIER: StorageTier = StorageTier::Private;

struct Harness {
    storage: MemoryStorage,
    extractor: Arc<MockExtractor>,
    interpreter: Arc<MockInterpreter>,
    pipeline: UploadPipeline,
}

impl Harness {
    fn new(storage: MemoryStorage, extractor: MockExtractor, interpreter: MockInterpreter) -> Self {
        let extractor = Arc::new(extractor);
        let interpreter = Arc::new(interpreter);
        let pipeline = UploadPipeline::new(
            Arc::new(storage.clone()),
            extractor.clone(),
            interpreter.clone(),
            TIER,
        );
        Self {
            storage,
            extractor,
            interpreter,
            pipeline,
        }
    }
}

fn invoice_extraction() -> ExtractionResult {
    let mut extraction = ExtractionResult::from_lines(["Invoice #123", "Total: $50"])
        .with_key_values(vec![KeyValue::new("Total", "$50")]);
    extraction.full_text = "Invoice #123".to_string();
    extraction
}

fn invoice_interpretation() -> InterpretationResult {
    InterpretationResult {
        sentiment: Sentiment::new(0.05, 0.02, 0.83, 0.10),
        text_entities: vec![
            TextEntity::new("ORGANIZATION", "Acme"),
            TextEntity::new("QUANTITY", "$50"),
        ],
        language: Some("en".to_string()),
    }
}

async fn wait_until(
    rx: &mut watch::Receiver<UploadJob>,
    id: JobId,
    status: JobStatus,
) -> UploadJob {
    tokio::time::timeout(
        Duration::from_secs(5),
        rx.wait_for(|job| job.id == id && job.status() == status),
    )
    .await
    .expect("timed out waiting for job status")
    .expect("pipeline dropped")
    .clone()
}

/// Record every distinct state a subscriber observes until the job settles.
fn record_states(mut rx: watch::Receiver<UploadJob>) -> tokio::task::JoinHandle<Vec<UploadJob>> {
    tokio::spawn(async move {
        let mut seen = Vec::new();
        while rx.changed().await.is_ok() {
            let job = rx.borrow_and_update().clone();
            let settled = job.status().is_terminal() && job.status() != JobStatus::Idle;
            seen.push(job);
            if settled {
                break;
            }
        }
        seen
    })
}

#[tokio::test]
async fn invoice_flows_through_every_stage() {
    let h = Harness::new(
        MemoryStorage::new().with_chunk_size(512 * 1024),
        MockExtractor::new(invoice_extraction()),
        MockInterpreter::new(invoice_interpretation()),
    );
    let recorder = record_states(h.pipeline.subscribe());

    let file = SourceFile::new("invoice.pdf", vec![0x25u8; 2 * 1024 * 1024]);
    let handle = h.pipeline.submit(file.clone(), TIER).unwrap();
    handle.wait().await.unwrap();
    let states = recorder.await.unwrap();

    let job = h.pipeline.current();
    assert_eq!(job.status(), JobStatus::Interpreted);
    assert_eq!(job.progress, Some(100.0));
    assert!(job.error_panel.is_none());

    // Observed progress never goes down.
    let progress: Vec<f64> = states.iter().filter_map(|s| s.progress).collect();
    assert!(!progress.is_empty());
    assert!(progress.windows(2).all(|w| w[0] <= w[1]));

    // The original bytes were stored and handed to the extractor.
    assert_eq!(h.storage.get(TIER, "invoice.pdf"), Some(file.content.clone()));
    assert_eq!(h.extractor.calls(), vec!["invoice.pdf"]);
    let received = h.extractor.received();
    assert_eq!(received.len(), 1);
    assert_eq!(received[0].content, file.content);
    assert_eq!(h.interpreter.calls(), vec!["Invoice #123"]);

    assert_eq!(
        entity_table(job.interpretation()),
        vec![
            EntityRow {
                entity_type: "ORGANIZATION".into(),
                text: "Acme".into()
            },
            EntityRow {
                entity_type: "QUANTITY".into(),
                text: "$50".into()
            },
        ]
    );
    let series: Vec<_> = sentiment_series(job.interpretation().unwrap())
        .into_iter()
        .map(|s| (s.title, s.value))
        .collect();
    assert_eq!(
        series,
        vec![
            ("Mixed", 5.0),
            ("Negative", 2.0),
            ("Neutral", 83.0),
            ("Positive", 10.0)
        ]
    );

    let view = job_view(&job);
    assert_eq!(view.progress_label, "Uploading file invoice.pdf");
    assert_eq!(view.key_values.len(), 1);
    assert_eq!(view.line_preview[1].label, "Line 1: Total: $50");
}

#[tokio::test]
async fn rejected_image_surfaces_panel_and_skips_interpretation() {
    let h = Harness::new(
        MemoryStorage::new(),
        MockExtractor::rejecting(),
        MockInterpreter::new(InterpretationResult::default()),
    );

    let handle = h
        .pipeline
        .submit(SourceFile::new("photo.jpg", vec![0xFFu8, 0xD8, 0xFF]), TIER)
        .unwrap();
    handle.wait().await.unwrap();

    let job = h.pipeline.current();
    assert_eq!(job.status(), JobStatus::ExtractFailed);
    assert_eq!(job.error_panel, Some(ErrorPanel::no_valid_data()));
    assert_eq!(
        job.error_panel.as_ref().map(|p| p.content.as_str()),
        Some("This function only works for PDF files.")
    );
    assert_eq!(h.interpreter.call_count(), 0);
    // The upload itself stands.
    assert!(h.storage.get(TIER, "photo.jpg").is_some());
    assert_eq!(job.progress, Some(100.0));
}

#[tokio::test]
async fn service_errors_during_extraction_use_the_same_panel() {
    let extractor = MockExtractor::new(invoice_extraction());
    extractor.respond("scan.pdf", MockOutcome::ServiceError("throttled".into()));
    let h = Harness::new(
        MemoryStorage::new(),
        extractor,
        MockInterpreter::new(InterpretationResult::default()),
    );

    h.pipeline
        .submit(SourceFile::new("scan.pdf", vec![1u8; 16]), TIER)
        .unwrap()
        .wait()
        .await
        .unwrap();

    let job = h.pipeline.current();
    assert_eq!(job.status(), JobStatus::ExtractFailed);
    assert_eq!(job.error_panel, Some(ErrorPanel::no_valid_data()));
}

#[tokio::test]
async fn interpretation_failure_is_log_only() {
    let h = Harness::new(
        MemoryStorage::new(),
        MockExtractor::new(invoice_extraction()),
        MockInterpreter::failing("access denied"),
    );

    h.pipeline
        .submit(SourceFile::new("invoice.pdf", vec![1u8; 64]), TIER)
        .unwrap()
        .wait()
        .await
        .unwrap();

    let job = h.pipeline.current();
    assert_eq!(job.status(), JobStatus::InterpretFailed);
    assert!(job.error_panel.is_none());
    assert_eq!(job.extraction(), Some(&invoice_extraction()));
    assert!(entity_table(job.interpretation()).is_empty());
}

#[tokio::test]
async fn upload_failure_stops_the_job() {
    let storage = MemoryStorage::new().with_chunk_size(8);
    storage.fail_puts(true);
    let h = Harness::new(
        storage,
        MockExtractor::new(invoice_extraction()),
        MockInterpreter::new(InterpretationResult::default()),
    );

    h.pipeline
        .submit(SourceFile::new("invoice.pdf", vec![1u8; 32]), TIER)
        .unwrap()
        .wait()
        .await
        .unwrap();

    let job = h.pipeline.current();
    assert_eq!(job.status(), JobStatus::UploadFailed);
    assert!(job.error_panel.is_none());
    assert_eq!(job.progress, Some(100.0));
    assert_eq!(h.extractor.call_count(), 0);
    assert_eq!(h.interpreter.call_count(), 0);
}

#[tokio::test]
async fn progress_stays_unset_without_total() {
    let h = Harness::new(
        MemoryStorage::new().without_total().with_chunk_size(4),
        MockExtractor::new(invoice_extraction()),
        MockInterpreter::new(InterpretationResult::default()),
    );
    let recorder = record_states(h.pipeline.subscribe());

    h.pipeline
        .submit(SourceFile::new("invoice.pdf", vec![1u8; 32]), TIER)
        .unwrap()
        .wait()
        .await
        .unwrap();
    let states = recorder.await.unwrap();

    assert!(states.iter().all(|s| s.progress.is_none()));
    assert_eq!(h.pipeline.current().status(), JobStatus::Interpreted);
}

#[tokio::test]
async fn uploads_land_in_the_selected_tier() {
    let h = Harness::new(
        MemoryStorage::new(),
        MockExtractor::new(invoice_extraction()),
        MockInterpreter::new(InterpretationResult::default()),
    );

    h.pipeline
        .submit(SourceFile::new("shared.pdf", vec![1u8; 8]), StorageTier::Guest)
        .unwrap()
        .wait()
        .await
        .unwrap();

    assert!(h.storage.get(StorageTier::Guest, "shared.pdf").is_some());
    assert!(h.storage.get(StorageTier::Private, "shared.pdf").is_none());
    assert_eq!(h.pipeline.current().tier, StorageTier::Guest);
}

#[tokio::test]
async fn superseded_job_cannot_touch_the_new_one() {
    let extractor = MockExtractor::new(invoice_extraction());
    extractor.respond("first.pdf", MockOutcome::Unsupported("late".into()));
    let first_gate = extractor.hold("first.pdf");
    let h = Harness::new(
        MemoryStorage::new(),
        extractor,
        MockInterpreter::new(invoice_interpretation()),
    );
    let mut rx = h.pipeline.subscribe();

    let first = h
        .pipeline
        .submit(SourceFile::new("first.pdf", vec![1u8; 8]), TIER)
        .unwrap();
    let first_id = first.id();
    wait_until(&mut rx, first_id, JobStatus::Extracting).await;

    let second = h
        .pipeline
        .submit(SourceFile::new("second.pdf", vec![1u8; 8]), TIER)
        .unwrap();
    let second_id = second.id();
    assert!(second_id > first_id);

    // The new job starts from a clean slate.
    let fresh = h.pipeline.current();
    assert_eq!(fresh.id, second_id);
    assert_eq!(fresh.filename.as_deref(), Some("second.pdf"));
    assert_eq!(fresh.status(), JobStatus::Uploading);
    assert_eq!(fresh.progress, None);
    assert!(fresh.error_panel.is_none());

    second.wait().await.unwrap();
    let settled = h.pipeline.current();
    assert_eq!(settled.status(), JobStatus::Interpreted);

    // The old extraction now fails; its panel must not reach the new job.
    first_gate.notify_one();
    first.wait().await.unwrap();

    assert_eq!(h.pipeline.current(), settled);
    assert_eq!(h.extractor.calls(), vec!["first.pdf", "second.pdf"]);
}

#[tokio::test]
async fn superseded_job_does_not_start_interpretation() {
    let extractor = MockExtractor::new(invoice_extraction());
    extractor.respond(
        "first.pdf",
        MockOutcome::Ok(ExtractionResult::from_lines(["first text"])),
    );
    extractor.respond(
        "second.pdf",
        MockOutcome::Ok(ExtractionResult::from_lines(["second text"])),
    );
    let first_gate = extractor.hold("first.pdf");
    let h = Harness::new(
        MemoryStorage::new(),
        extractor,
        MockInterpreter::new(invoice_interpretation()),
    );
    let mut rx = h.pipeline.subscribe();

    let first = h
        .pipeline
        .submit(SourceFile::new("first.pdf", vec![1u8; 8]), TIER)
        .unwrap();
    wait_until(&mut rx, first.id(), JobStatus::Extracting).await;

    let second = h
        .pipeline
        .submit(SourceFile::new("second.pdf", vec![1u8; 8]), TIER)
        .unwrap();
    second.wait().await.unwrap();
    let settled = h.pipeline.current();

    first_gate.notify_one();
    first.wait().await.unwrap();

    assert_eq!(h.interpreter.calls(), vec!["second text"]);
    assert_eq!(h.pipeline.current(), settled);
    assert_eq!(
        settled.extraction().map(|e| e.full_text.as_str()),
        Some("second text")
    );
}
