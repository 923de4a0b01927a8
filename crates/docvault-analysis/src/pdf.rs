//! Local PDF text extractor.
//!
//! Uses pdf-extract for the text layer. Anything that is not a PDF is rejected
//! as unsupported, matching the managed extractor's document-only policy.

use async_trait::async_trait;
use docvault_core::{ExtractionResult, KeyValue, SourceFile};
use tracing::{debug, warn};

use crate::error::{AnalysisError, AnalysisResult};
use crate::traits::TextExtractor;

const PDF_MAGIC: &[u8] = b"%PDF-";
const MAX_KEY_LEN: usize = 40;

/// Extractor for PDF files.
#[derive(Debug, Default, Clone)]
pub struct PdfTextExtractor;

impl PdfTextExtractor {
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl TextExtractor for PdfTextExtractor {
    fn name(&self) -> &str {
        "pdf"
    }

    async fn extract(&self, file: &SourceFile) -> AnalysisResult<ExtractionResult> {
        if !is_pdf(&file.content) {
            return Err(AnalysisError::UnsupportedInput(format!(
                "{} is not a PDF document",
                file.name
            )));
        }

        debug!(filename = %file.name, size_bytes = file.size(), "Extracting PDF text");

        let content = file.content.clone();
        let text = tokio::task::spawn_blocking(move || pdf_extract::extract_text_from_mem(&content))
            .await
            .map_err(|e| join_failure(&file.name, e))?
            .map_err(|e| {
                warn!(filename = %file.name, error = %e, "PDF text extraction failed");
                AnalysisError::UnsupportedInput(format!("PDF extraction failed: {e}"))
            })?;

        let result = build_result(&text);
        debug!(
            filename = %file.name,
            lines = result.lines.len(),
            words = result.words.len(),
            key_values = result.key_values.len(),
            "PDF text extracted"
        );
        Ok(result)
    }
}

/// pdf-extract panics on some malformed documents. Recovering the panic here
/// needs the unwinding panic strategy, so release builds must not set
/// `panic = "abort"`.
fn join_failure(filename: &str, err: tokio::task::JoinError) -> AnalysisError {
    if err.is_panic() {
        warn!(filename = %filename, "PDF parser panicked");
        AnalysisError::UnsupportedInput(format!("{} could not be parsed", filename))
    } else {
        AnalysisError::Task(format!("Task join error: {err}"))
    }
}

fn is_pdf(data: &[u8]) -> bool {
    // The header may be preceded by a few bytes of junk; readers accept it within 1 KiB.
    data.windows(PDF_MAGIC.len())
        .take(1024)
        .any(|window| window == PDF_MAGIC)
}

/// Shape raw PDF text into lines, words, and `Label: value` pairs.
///
/// The text layer has no table or selection structure, so those stay `None`.
fn build_result(text: &str) -> ExtractionResult {
    let lines: Vec<String> = text
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect();

    let key_values = lines
        .iter()
        .filter_map(|line| split_key_value(line))
        .collect();

    ExtractionResult::from_lines(lines).with_key_values(key_values)
}

fn split_key_value(line: &str) -> Option<KeyValue> {
    let (key, value) = line.split_once(':')?;
    let key = key.trim();
    let value = value.trim();
    if key.is_empty() || value.is_empty() || key.chars().count() > MAX_KEY_LEN {
        return None;
    }
    // "https://..." is a URL, not a label.
    if value.starts_with("//") {
        return None;
    }
    Some(KeyValue::new(key, value))
}
