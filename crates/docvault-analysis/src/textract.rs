//! AWS Textract extractor
//!
//! Calls `AnalyzeDocument` with FORMS and TABLES and folds the returned blocks
//! into an [`ExtractionResult`].

use async_trait::async_trait;
use aws_config::BehaviorVersion;
use aws_sdk_textract::primitives::Blob;
use aws_sdk_textract::types::{
    Block, BlockType, Document, EntityType, FeatureType, RelationshipType,
    SelectionStatus as TextractSelection,
};
use aws_sdk_textract::Client as TextractClient;
use docvault_core::{ExtractionResult, KeyValue, SelectionMark, SelectionStatus, SourceFile, Table};
use std::collections::{BTreeMap, HashMap};
use std::fmt::{Debug, Formatter, Result as FmtResult};

use crate::error::{AnalysisError, AnalysisResult};
use crate::traits::TextExtractor;

/// AWS Textract extractor implementation
pub struct TextractExtractor {
    client: TextractClient,
}

impl Debug for TextractExtractor {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("TextractExtractor").finish()
    }
}

impl TextractExtractor {
    /// Create an extractor; `region` of `None` uses the AWS default provider chain.
    pub async fn new(region: Option<String>) -> Self {
        let mut loader = aws_config::defaults(BehaviorVersion::latest());
        if let Some(region) = region {
            loader = loader.region(aws_config::Region::new(region));
        }
        let config = loader.load().await;

        Self::from_client(TextractClient::new(&config))
    }

    pub fn from_client(client: TextractClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl TextExtractor for TextractExtractor {
    fn name(&self) -> &str {
        "aws-textract"
    }

    async fn extract(&self, file: &SourceFile) -> AnalysisResult<ExtractionResult> {
        let start = std::time::Instant::now();
        let document = Document::builder()
            .bytes(Blob::new(file.content.to_vec()))
            .build();

        let response = self
            .client
            .analyze_document()
            .document(document)
            .feature_types(FeatureType::Forms)
            .feature_types(FeatureType::Tables)
            .send()
            .await
            .map_err(|e| {
                let service_error = e.into_service_error();
                tracing::warn!(
                    filename = %file.name,
                    error = %service_error,
                    duration_ms = start.elapsed().as_secs_f64() * 1000.0,
                    "Textract analyze_document failed"
                );
                if service_error.is_unsupported_document_exception()
                    || service_error.is_bad_document_exception()
                    || service_error.is_document_too_large_exception()
                {
                    AnalysisError::UnsupportedInput(service_error.to_string())
                } else {
                    AnalysisError::Service(service_error.to_string())
                }
            })?;

        let result = categorize_blocks(response.blocks());

        tracing::info!(
            filename = %file.name,
            blocks = response.blocks().len(),
            lines = result.lines.len(),
            key_values = result.key_values.len(),
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Textract extraction completed"
        );

        Ok(result)
    }
}

/// Fold Textract blocks into lines, words, key values, tables, and selections.
///
/// `full_text` is the words joined by single spaces, in block order.
pub fn categorize_blocks(blocks: &[Block]) -> ExtractionResult {
    let by_id: HashMap<&str, &Block> = blocks
        .iter()
        .filter_map(|b| b.id().map(|id| (id, b)))
        .collect();

    let mut lines = Vec::new();
    let mut words = Vec::new();
    let mut key_values = Vec::new();
    let mut tables = Vec::new();
    let mut selections = Vec::new();

    for block in blocks {
        match block.block_type() {
            Some(BlockType::Line) => lines.extend(block.text().map(str::to_string)),
            Some(BlockType::Word) => words.extend(block.text().map(str::to_string)),
            Some(BlockType::SelectionElement) => {
                if let Some(mark) = selection_mark(block) {
                    selections.push(mark);
                }
            }
            Some(BlockType::KeyValueSet) if block.entity_types().contains(&EntityType::Key) => {
                let key = child_text(block, &by_id);
                if key.is_empty() {
                    continue;
                }
                let value = related_ids(block, RelationshipType::Value)
                    .filter_map(|id| by_id.get(id))
                    .map(|value_block| child_text(value_block, &by_id))
                    .collect::<Vec<_>>()
                    .join(" ");
                key_values.push(KeyValue::new(key, value));
            }
            Some(BlockType::Table) => tables.push(build_table(block, &by_id)),
            _ => {}
        }
    }

    ExtractionResult {
        full_text: words.join(" "),
        lines,
        key_values,
        tables: Some(tables),
        selections: Some(selections),
        words,
    }
}

fn related_ids(block: &Block, kind: RelationshipType) -> impl Iterator<Item = &str> {
    block
        .relationships()
        .iter()
        .filter(move |r| r.r#type() == Some(&kind))
        .flat_map(|r| r.ids().iter().map(String::as_str))
}

/// Text of a block's WORD children; selected checkboxes render as `[X]`.
fn child_text(block: &Block, by_id: &HashMap<&str, &Block>) -> String {
    related_ids(block, RelationshipType::Child)
        .filter_map(|id| by_id.get(id))
        .filter_map(|child| match child.block_type() {
            Some(BlockType::Word) => child.text().map(str::to_string),
            Some(BlockType::SelectionElement) => match selection_mark(child)?.status {
                SelectionStatus::Selected => Some("[X]".to_string()),
                SelectionStatus::NotSelected => Some("[ ]".to_string()),
            },
            _ => None,
        })
        .collect::<Vec<_>>()
        .join(" ")
}

fn selection_mark(block: &Block) -> Option<SelectionMark> {
    let status = match block.selection_status()? {
        TextractSelection::Selected => SelectionStatus::Selected,
        TextractSelection::NotSelected => SelectionStatus::NotSelected,
        _ => return None,
    };
    Some(SelectionMark { status })
}

fn build_table(table: &Block, by_id: &HashMap<&str, &Block>) -> Table {
    let mut cells: BTreeMap<i32, BTreeMap<i32, String>> = BTreeMap::new();

    for cell in related_ids(table, RelationshipType::Child).filter_map(|id| by_id.get(id)) {
        if cell.block_type() != Some(&BlockType::Cell) {
            continue;
        }
        let (Some(row), Some(col)) = (cell.row_index(), cell.column_index()) else {
            continue;
        };
        cells
            .entry(row)
            .or_default()
            .insert(col, child_text(cell, by_id));
    }

    Table {
        rows: cells
            .into_values()
            .map(|row| row.into_values().collect())
            .collect(),
    }
}
