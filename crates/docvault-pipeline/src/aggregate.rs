//! Display shaping for extraction and interpretation results
//!
//! Pure functions; nothing here does I/O or touches pipeline state.

use docvault_core::{ExtractionResult, InterpretationResult};
use serde::Serialize;

use crate::job::{ErrorPanel, UploadJob};

const LINE_PREVIEW_LIMIT: usize = 5;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DisplayToken {
    pub label: String,
}

impl DisplayToken {
    fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SentimentSlice {
    pub title: &'static str,
    pub value: f64,
}

/// One row per entity type; `text` holds every surface form, comma-joined.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EntityRow {
    #[serde(rename = "type")]
    pub entity_type: String,
    pub text: String,
}

/// Counts shown next to the extraction. `selections` and `tables` are `None`
/// when the extractor does not report those structures.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExtractionSummary {
    pub key_values: usize,
    pub lines: usize,
    pub selections: Option<usize>,
    pub tables: Option<usize>,
    pub words: usize,
}

/// Everything a results view shows for one job.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct JobView {
    pub progress_label: String,
    pub progress: Option<f64>,
    pub status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<ExtractionSummary>,
    pub key_values: Vec<DisplayToken>,
    pub line_preview: Vec<DisplayToken>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sentiment: Option<Vec<SentimentSlice>>,
    pub entities: Vec<EntityRow>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_panel: Option<ErrorPanel>,
}

/// One token per key-value pair, labeled by the key, in extraction order.
pub fn key_value_tokens(extraction: &ExtractionResult) -> Vec<DisplayToken> {
    extraction
        .key_values
        .iter()
        .map(|kv| DisplayToken::new(kv.key.clone()))
        .collect()
}

/// First five lines (or fewer), labeled `Line {i}: {text}` with zero-based `i`.
pub fn line_preview_tokens(extraction: &ExtractionResult) -> Vec<DisplayToken> {
    extraction
        .lines
        .iter()
        .take(LINE_PREVIEW_LIMIT)
        .enumerate()
        .map(|(i, line)| DisplayToken::new(format!("Line {}: {}", i, line)))
        .collect()
}

/// Always four slices, in the order Mixed, Negative, Neutral, Positive.
pub fn sentiment_series(interpretation: &InterpretationResult) -> Vec<SentimentSlice> {
    let s = &interpretation.sentiment;
    [
        ("Mixed", s.mixed),
        ("Negative", s.negative),
        ("Neutral", s.neutral),
        ("Positive", s.positive),
    ]
    .into_iter()
    .map(|(title, probability)| SentimentSlice {
        title,
        value: probability * 100.0,
    })
    .collect()
}

/// Entities grouped by type in first-seen order. No interpretation yet means
/// an empty table.
pub fn entity_table(interpretation: Option<&InterpretationResult>) -> Vec<EntityRow> {
    let Some(interpretation) = interpretation else {
        return Vec::new();
    };

    let mut groups: Vec<(&str, Vec<&str>)> = Vec::new();
    for entity in &interpretation.text_entities {
        match groups
            .iter_mut()
            .find(|(kind, _)| *kind == entity.entity_type)
        {
            Some((_, texts)) => texts.push(entity.text.as_str()),
            None => groups.push((entity.entity_type.as_str(), vec![entity.text.as_str()])),
        }
    }

    groups
        .into_iter()
        .map(|(kind, texts)| EntityRow {
            entity_type: kind.to_string(),
            text: texts.join(", "),
        })
        .collect()
}

pub fn extraction_summary(extraction: &ExtractionResult) -> ExtractionSummary {
    ExtractionSummary {
        key_values: extraction.key_values.len(),
        lines: extraction.lines.len(),
        selections: extraction.selections.as_ref().map(Vec::len),
        tables: extraction.tables.as_ref().map(Vec::len),
        words: extraction.words.len(),
    }
}

pub fn progress_label(job: &UploadJob) -> String {
    match &job.filename {
        None => "Click in the button to upload a file".to_string(),
        Some(filename) => format!("Uploading file {}", filename),
    }
}

/// Percentage shown in sentiment popovers, e.g. `83.00 %`.
pub fn percentage_label(value: f64) -> String {
    format!("{:.2} %", value)
}

pub fn job_view(job: &UploadJob) -> JobView {
    let extraction = job.extraction();
    let interpretation = job.interpretation();

    JobView {
        progress_label: progress_label(job),
        progress: job.progress,
        status: job.status().as_str(),
        summary: extraction.map(extraction_summary),
        key_values: extraction.map(key_value_tokens).unwrap_or_default(),
        line_preview: extraction.map(line_preview_tokens).unwrap_or_default(),
        sentiment: interpretation.map(sentiment_series),
        entities: entity_table(interpretation),
        error_panel: job.error_panel.clone(),
    }
}
