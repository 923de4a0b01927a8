//! Structured output of text extraction

use serde::{Deserialize, Serialize};

/// A key/value pair detected in a form-like document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyValue {
    pub key: String,
    pub value: String,
}

impl KeyValue {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

/// A detected table, row-major. Rows may be ragged when cells span columns.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Table {
    pub rows: Vec<Vec<String>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SelectionStatus {
    Selected,
    NotSelected,
}

/// A checkbox or radio mark found in the document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectionMark {
    pub status: SelectionStatus,
}

/// Result of extracting text from a document-like file.
///
/// `tables` and `selections` are `None` when the extractor does not detect
/// those structures at all, and `Some(vec![])` when it looked and found none.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ExtractionResult {
    pub full_text: String,
    pub lines: Vec<String>,
    pub key_values: Vec<KeyValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tables: Option<Vec<Table>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selections: Option<Vec<SelectionMark>>,
    pub words: Vec<String>,
}

impl ExtractionResult {
    /// Build a result from plain lines: words are split on whitespace and
    /// `full_text` is the words joined by single spaces.
    pub fn from_lines<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let lines: Vec<String> = lines.into_iter().map(Into::into).collect();
        let words: Vec<String> = lines
            .iter()
            .flat_map(|line| line.split_whitespace())
            .map(str::to_string)
            .collect();
        Self {
            full_text: words.join(" "),
            lines,
            words,
            ..Default::default()
        }
    }

    pub fn with_key_values(mut self, key_values: Vec<KeyValue>) -> Self {
        self.key_values = key_values;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_lines_derives_words_and_full_text() {
        let result = ExtractionResult::from_lines(["Invoice  #123", "Total: $50"]);
        assert_eq!(result.lines.len(), 2);
        assert_eq!(result.words, vec!["Invoice", "#123", "Total:", "$50"]);
        assert_eq!(result.full_text, "Invoice #123 Total: $50");
        assert!(result.tables.is_none());
        assert!(result.selections.is_none());
    }

    #[test]
    fn absent_structures_are_omitted_from_json() {
        let json = serde_json::to_value(ExtractionResult::from_lines(["x"])).unwrap();
        assert!(json.get("tables").is_none());
        assert!(json.get("selections").is_none());
    }
}
