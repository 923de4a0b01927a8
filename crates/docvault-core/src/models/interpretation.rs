//! Sentiment and entity analysis results

use serde::{Deserialize, Serialize};

/// Independent per-bucket probabilities in `[0, 1]`. They need not sum to 1.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Sentiment {
    pub mixed: f64,
    pub negative: f64,
    pub neutral: f64,
    pub positive: f64,
}

impl Sentiment {
    pub fn new(mixed: f64, negative: f64, neutral: f64, positive: f64) -> Self {
        Self {
            mixed: mixed.clamp(0.0, 1.0),
            negative: negative.clamp(0.0, 1.0),
            neutral: neutral.clamp(0.0, 1.0),
            positive: positive.clamp(0.0, 1.0),
        }
    }
}

/// Entity type tag as reported by the interpreter, e.g. `ORGANIZATION`.
pub type EntityType = String;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextEntity {
    #[serde(rename = "type")]
    pub entity_type: EntityType,
    pub text: String,
}

impl TextEntity {
    pub fn new(entity_type: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            entity_type: entity_type.into(),
            text: text.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct InterpretationResult {
    pub sentiment: Sentiment,
    pub text_entities: Vec<TextEntity>,
    /// Dominant language code when the interpreter detected one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
}
