//! Summarization with an extractive fallback.
//!
//! Primary: instruction-tuned LLM through the structured-output runner.
//! Fallback: the first three sentences, a cheap deterministic
//! approximation that keeps the pipeline alive when the model fails.

use std::sync::{Arc, OnceLock};

use regex::Regex;
use serde::Serialize;
use serde_json::{Map, Value};
use tracing::warn;

use inference_client::{registry::INSTRUCT_LLM, GenerationParams};
use nous_common::{AiResponse, AnalysisError};

use crate::prompts;
use crate::runner::{JsonRequest, JsonRunner};

const MAX_NEW_TOKENS: u32 = 160;
/// Hard cap for input length in characters.
const MAX_INPUT_CHARS: usize = 4000;

fn sentence_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[^.!?]+[.!?]*").expect("valid sentence regex"))
}

fn control_chars_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[\x00-\x1F]+").expect("valid control-char regex"))
}

fn whitespace_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\s+").expect("valid whitespace regex"))
}

/// Extractive fallback: the first three sentences.
fn fallback_summary(text: &str) -> String {
    let sentences: Vec<&str> = sentence_re()
        .find_iter(text)
        .take(3)
        .map(|m| m.as_str().trim())
        .collect();
    sentences.join(" ").trim().to_string()
}

#[derive(Debug, Clone, Serialize)]
pub struct SummaryResult {
    pub summary: String,
}

pub struct Summarizer {
    runner: Arc<JsonRunner>,
}

impl Summarizer {
    pub fn new(runner: Arc<JsonRunner>) -> Self {
        Self { runner }
    }

    pub async fn summarize(&self, content: &str) -> AiResponse<SummaryResult> {
        let mut errors: Vec<String> = Vec::new();
        let mut meta = Map::new();

        let content = content.trim();
        if content.is_empty() {
            return AiResponse::error_with_data(
                SummaryResult {
                    summary: String::new(),
                },
                vec![AnalysisError::EmptyInput.to_string()],
            );
        }

        let normalized = control_chars_re().replace_all(content, " ");
        let normalized = whitespace_re().replace_all(&normalized, " ");
        let normalized = normalized.trim().to_string();

        if normalized.is_empty() {
            meta.insert("reason".into(), "empty_after_normalization".into());
            return AiResponse::ok(SummaryResult {
                summary: fallback_summary(content),
            })
            .with_meta(meta);
        }

        // Character-based input guard.
        let effective_text = if normalized.len() > MAX_INPUT_CHARS {
            meta.insert("truncated".into(), true.into());
            meta.insert("original_length".into(), normalized.len().into());
            let mut end = MAX_INPUT_CHARS;
            while !normalized.is_char_boundary(end) {
                end -= 1;
            }
            &normalized[..end]
        } else {
            &normalized[..]
        };

        let prompt = prompts::summarization_prompt(effective_text);

        match self
            .runner
            .run(
                JsonRequest {
                    model_key: INSTRUCT_LLM,
                    prompt: &prompt,
                    params: GenerationParams {
                        max_new_tokens: MAX_NEW_TOKENS,
                        temperature: 0.2,
                        do_sample: false,
                    },
                },
                Some(&validate_summary_schema),
            )
            .await
        {
            Ok(object) => {
                let summary = object
                    .get("summary")
                    .and_then(Value::as_str)
                    .expect("validated summary field")
                    .trim()
                    .to_string();
                AiResponse::ok(SummaryResult { summary }).with_meta(meta)
            }
            Err(e) => {
                warn!(error = %e, "LLM summarization failed, falling back to extractive");
                errors.push(format!("LLM failed: {e}"));
                meta.insert("reason".into(), "fallback_extractive".into());
                AiResponse::partial(
                    SummaryResult {
                        summary: fallback_summary(content),
                    },
                    errors,
                )
                .with_meta(meta)
            }
        }
    }
}

fn validate_summary_schema(obj: &Map<String, Value>) -> Result<(), AnalysisError> {
    match obj.get("summary").and_then(Value::as_str) {
        Some(summary) if !summary.trim().is_empty() => Ok(()),
        _ => Err(AnalysisError::Schema("Invalid or empty summary field".into())),
    }
}
