//! AWS Comprehend interpreter
//!
//! Detects the dominant language (unless one is configured), then runs
//! sentiment and entity detection concurrently.

use async_trait::async_trait;
use aws_config::BehaviorVersion;
use aws_sdk_comprehend::types::{DominantLanguage, Entity, LanguageCode, SentimentScore};
use aws_sdk_comprehend::Client as ComprehendClient;
use docvault_core::{InterpretationResult, Sentiment, TextEntity};
use std::fmt::{Debug, Formatter, Result as FmtResult};

use crate::error::{AnalysisError, AnalysisResult};
use crate::traits::TextInterpreter;

/// DetectSentiment accepts at most 5000 bytes of UTF-8.
const SENTIMENT_MAX_BYTES: usize = 5_000;
/// DetectEntities and DetectDominantLanguage accept at most 100 KB.
const ENTITIES_MAX_BYTES: usize = 100_000;
const FALLBACK_LANGUAGE: &str = "en";

/// AWS Comprehend interpreter implementation
pub struct ComprehendInterpreter {
    client: ComprehendClient,
    language: Option<String>,
}

impl Debug for ComprehendInterpreter {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("ComprehendInterpreter")
            .field("language", &self.language)
            .finish()
    }
}

impl ComprehendInterpreter {
    /// Create an interpreter; `region` of `None` uses the AWS default provider chain.
    /// A fixed `language` skips dominant-language detection.
    pub async fn new(region: Option<String>, language: Option<String>) -> Self {
        let mut loader = aws_config::defaults(BehaviorVersion::latest());
        if let Some(region) = region {
            loader = loader.region(aws_config::Region::new(region));
        }
        let config = loader.load().await;

        Self::from_client(ComprehendClient::new(&config), language)
    }

    pub fn from_client(client: ComprehendClient, language: Option<String>) -> Self {
        Self { client, language }
    }

    async fn detect_language(&self, text: &str) -> AnalysisResult<String> {
        if let Some(language) = &self.language {
            return Ok(language.clone());
        }

        let response = self
            .client
            .detect_dominant_language()
            .text(truncate_utf8(text, ENTITIES_MAX_BYTES))
            .send()
            .await
            .map_err(|e| AnalysisError::Service(e.into_service_error().to_string()))?;

        Ok(pick_language(response.languages()).unwrap_or_else(|| FALLBACK_LANGUAGE.to_string()))
    }

    async fn detect_sentiment(&self, text: &str, language: &str) -> AnalysisResult<Sentiment> {
        let response = self
            .client
            .detect_sentiment()
            .text(truncate_utf8(text, SENTIMENT_MAX_BYTES))
            .language_code(LanguageCode::from(language))
            .send()
            .await
            .map_err(|e| AnalysisError::Service(e.into_service_error().to_string()))?;

        Ok(to_sentiment(response.sentiment_score()))
    }

    async fn detect_entities(&self, text: &str, language: &str) -> AnalysisResult<Vec<TextEntity>> {
        let response = self
            .client
            .detect_entities()
            .text(truncate_utf8(text, ENTITIES_MAX_BYTES))
            .language_code(LanguageCode::from(language))
            .send()
            .await
            .map_err(|e| AnalysisError::Service(e.into_service_error().to_string()))?;

        Ok(to_entities(response.entities()))
    }
}

#[async_trait]
impl TextInterpreter for ComprehendInterpreter {
    fn name(&self) -> &str {
        "aws-comprehend"
    }

    async fn interpret(&self, text: &str) -> AnalysisResult<InterpretationResult> {
        if text.trim().is_empty() {
            return Err(AnalysisError::UnsupportedInput(
                "No text to interpret".to_string(),
            ));
        }

        let start = std::time::Instant::now();
        let language = self.detect_language(text).await?;

        let (sentiment, text_entities) = tokio::try_join!(
            self.detect_sentiment(text, &language),
            self.detect_entities(text, &language),
        )?;

        tracing::info!(
            language = %language,
            entities = text_entities.len(),
            text_bytes = text.len(),
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Comprehend interpretation completed"
        );

        Ok(InterpretationResult {
            sentiment,
            text_entities,
            language: Some(language),
        })
    }
}

/// Longest prefix of `text` that fits in `max_bytes` without splitting a char.
fn truncate_utf8(text: &str, max_bytes: usize) -> &str {
    if text.len() <= max_bytes {
        return text;
    }
    let mut end = max_bytes;
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    &text[..end]
}

fn pick_language(languages: &[DominantLanguage]) -> Option<String> {
    languages
        .iter()
        .filter_map(|l| Some((l.language_code()?, l.score().unwrap_or(0.0))))
        .max_by(|a, b| a.1.total_cmp(&b.1))
        .map(|(code, _)| code.to_string())
}

fn to_sentiment(score: Option<&SentimentScore>) -> Sentiment {
    let Some(score) = score else {
        return Sentiment::default();
    };
    let bucket = |v: Option<f32>| f64::from(v.unwrap_or(0.0));
    Sentiment::new(
        bucket(score.mixed()),
        bucket(score.negative()),
        bucket(score.neutral()),
        bucket(score.positive()),
    )
}

fn to_entities(entities: &[Entity]) -> Vec<TextEntity> {
    entities
        .iter()
        .filter_map(|e| {
            let text = e.text()?;
            let kind = e.r#type().map(|t| t.as_str()).unwrap_or("OTHER");
            Some(TextEntity::new(kind, text))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use aws_sdk_comprehend::types::EntityType;

    #[test]
    fn truncate_respects_char_boundaries() {
        assert_eq!(truncate_utf8("hello", 10), "hello");
        assert_eq!(truncate_utf8("hello", 3), "hel");
        // "é" is two bytes; cutting at 2 would split it.
        assert_eq!(truncate_utf8("aé", 2), "a");
    }

    #[test]
    fn picks_highest_scoring_language() {
        let languages = vec![
            DominantLanguage::builder()
                .language_code("fr")
                .score(0.2)
                .build(),
            DominantLanguage::builder()
                .language_code("en")
                .score(0.7)
                .build(),
        ];
        assert_eq!(pick_language(&languages).as_deref(), Some("en"));
        assert_eq!(pick_language(&[]), None);
    }

    #[test]
    fn maps_sentiment_buckets() {
        let score = SentimentScore::builder()
            .mixed(0.05)
            .negative(0.02)
            .neutral(0.83)
            .positive(0.10)
            .build();
        let sentiment = to_sentiment(Some(&score));
        assert!((sentiment.neutral - 0.83).abs() < 1e-6);
        assert!((sentiment.mixed - 0.05).abs() < 1e-6);
        assert_eq!(to_sentiment(None), Sentiment::default());
    }

    #[test]
    fn maps_entities_in_order() {
        let entities = vec![
            Entity::builder()
                .r#type(EntityType::Organization)
                .text("Acme")
                .build(),
            Entity::builder()
                .r#type(EntityType::Quantity)
                .text("$50")
                .build(),
            Entity::builder().r#type(EntityType::Date).build(),
        ];
        assert_eq!(
            to_entities(&entities),
            vec![
                TextEntity::new("ORGANIZATION", "Acme"),
                TextEntity::new("QUANTITY", "$50"),
            ]
        );
    }
}
