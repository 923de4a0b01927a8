use docvault_pipeline::{percentage_label, progress_label, UploadJob};

/// One status line per observed job state, e.g.
/// `Uploading file invoice.pdf [extracting] 100.00 %`.
pub fn status_line(job: &UploadJob) -> String {
    let progress = job
        .progress
        .map(percentage_label)
        .unwrap_or_else(|| "--".to_string());
    format!("{} [{}] {}", progress_label(job), job.status(), progress)
}

/// Initialize tracing for the CLI. `LOG_FORMAT=json` switches to JSON lines.
pub fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("docvault=info"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);

    match std::env::var("LOG_FORMAT").as_deref() {
        Ok("json") => builder.json().init(),
        _ => builder.init(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use docvault_core::StorageTier;
    use docvault_pipeline::JobId;

    #[test]
    fn status_line_before_any_upload() {
        let job = UploadJob::idle(StorageTier::Private);
        assert_eq!(
            status_line(&job),
            "Click in the button to upload a file [idle] --"
        );
    }

    #[test]
    fn status_line_with_progress() {
        let mut job = UploadJob::started(JobId::default().next(), "a.pdf", StorageTier::Guest);
        job.record_progress(42.5);
        assert_eq!(status_line(&job), "Uploading file a.pdf [uploading] 42.50 %");
    }
}
