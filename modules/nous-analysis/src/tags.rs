//! Tag extraction via named-entity recognition.
//!
//! Intentionally non-LLM: deterministic, fast, and stable for tagging.

use std::collections::BTreeSet;
use std::sync::{Arc, OnceLock};

use regex::Regex;
use serde_json::Map;
use tracing::warn;

use inference_client::{registry::NER_TAGGER, ModelProvider, TokenizerProvider};
use nous_common::{AiResponse, AnalysisError, ResponseStatus};

const MAX_INPUT_TOKENS: usize = 512;

fn control_chars_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[\x00-\x1F\x7F]").expect("valid control-char regex"))
}

fn whitespace_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\s+").expect("valid whitespace regex"))
}

pub struct TagExtractor {
    provider: Arc<dyn ModelProvider>,
    tokenizer: Arc<dyn TokenizerProvider>,
}

impl TagExtractor {
    pub fn new(provider: Arc<dyn ModelProvider>, tokenizer: Arc<dyn TokenizerProvider>) -> Self {
        Self {
            provider,
            tokenizer,
        }
    }

    /// Extract lowercase, deduplicated tags from the text.
    pub async fn extract(&self, content: &str) -> AiResponse<Vec<String>> {
        let mut errors: Vec<String> = Vec::new();
        let mut meta = Map::new();

        if content.trim().is_empty() {
            return AiResponse::ok(Vec::new());
        }

        let normalized = control_chars_re().replace_all(content, " ");
        let normalized = whitespace_re().replace_all(&normalized, " ");
        let normalized = normalized.trim();

        if normalized.is_empty() {
            return AiResponse::ok(Vec::new());
        }

        match self.run_ner(normalized, &mut meta, &mut errors).await {
            Ok(tags) => {
                let status = if errors.is_empty() {
                    ResponseStatus::Ok
                } else if !tags.is_empty() {
                    ResponseStatus::Partial
                } else {
                    ResponseStatus::Error
                };
                AiResponse {
                    status,
                    data: Some(tags),
                    errors: if errors.is_empty() { None } else { Some(errors) },
                    meta: Some(meta),
                }
            }
            Err(e) => {
                warn!(error = %e, "tag extraction failed");
                errors.push(e.to_string());
                AiResponse::error_with_data(Vec::new(), errors).with_meta(meta)
            }
        }
    }

    async fn run_ner(
        &self,
        text: &str,
        meta: &mut Map<String, serde_json::Value>,
        errors: &mut Vec<String>,
    ) -> Result<Vec<String>, AnalysisError> {
        let token_ids = self
            .tokenizer
            .encode(NER_TAGGER, text, MAX_INPUT_TOKENS)
            .await
            .map_err(|e| AnalysisError::Classifier(e.to_string()))?;

        meta.insert("input_tokens".into(), token_ids.len().into());

        if token_ids.is_empty() {
            errors.push("Tokenizer produced zero tokens".into());
            return Ok(Vec::new());
        }

        let truncated = self
            .tokenizer
            .decode(NER_TAGGER, &token_ids)
            .await
            .map_err(|e| AnalysisError::Classifier(e.to_string()))?;

        let entities = self
            .provider
            .entities(NER_TAGGER, &truncated)
            .await
            .map_err(|e| AnalysisError::Classifier(e.to_string()))?;

        let tags: BTreeSet<String> = entities
            .iter()
            .filter(|e| !e.entity_group.is_empty())
            .map(|e| e.word.to_lowercase())
            .collect();

        Ok(tags.into_iter().collect())
    }
}
