//! Language detection and translation for news articles.
//!
//! Primary: specialized sequence-to-sequence MT, sentence by sentence.
//! Fallback: instruction-tuned LLM through the structured-output runner.
//! Per-sentence MT failures degrade that sentence to its untranslated,
//! tokenizer-normalized form; only a full MT wipeout falls back to the
//! LLM.

use std::sync::{Arc, OnceLock};

use regex::Regex;
use serde::Serialize;
use serde_json::{Map, Value};
use tracing::warn;

use inference_client::{
    registry::{INSTRUCT_LLM, LANGUAGE_DETECTOR, MT_MODEL},
    GenerationParams, ModelProvider, TokenizerProvider,
};
use nous_common::{
    detector_label_to_iso, mt_lang_tag, AiResponse, AnalysisError, ResponseStatus,
};

use crate::prompts;
use crate::runner::{JsonRequest, JsonRunner};

/// Per-sentence MT input window (tokens).
const TRANSLATION_TOKEN_LIMIT: usize = 128;
/// Character bound on the language-detection sample.
const LANG_DETECTOR_BOUNDS: usize = 128;
const FALLBACK_MAX_NEW_TOKENS: u32 = 512;

fn sentence_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[^.!?]+[.!?]*").expect("valid sentence regex"))
}

fn punctuation_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[^\w\s]+").expect("valid punctuation regex"))
}

fn split_sentences(text: &str) -> Vec<&str> {
    let sentences: Vec<&str> = sentence_re().find_iter(text).map(|m| m.as_str()).collect();
    if sentences.is_empty() {
        vec![text]
    } else {
        sentences
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct LanguageResult {
    pub language: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct TranslationResult {
    pub translation: String,
    pub language: String,
}

pub struct TranslationService {
    provider: Arc<dyn ModelProvider>,
    tokenizer: Arc<dyn TokenizerProvider>,
    runner: Arc<JsonRunner>,
    default_lang: String,
}

impl TranslationService {
    pub fn new(
        provider: Arc<dyn ModelProvider>,
        tokenizer: Arc<dyn TokenizerProvider>,
        runner: Arc<JsonRunner>,
        default_lang: &str,
    ) -> Self {
        Self {
            provider,
            tokenizer,
            runner,
            default_lang: default_lang.to_string(),
        }
    }

    /// Detect the language of the content, defaulting on empty input,
    /// unknown detector labels, or detector failure.
    pub async fn detect_language(&self, content: &str) -> AiResponse<LanguageResult> {
        let mut meta = Map::new();

        if content.trim().is_empty() {
            return AiResponse::ok(LanguageResult {
                language: self.default_lang.clone(),
            });
        }

        let sample = punctuation_re().replace_all(content, " ");
        let sample = bounded(&sample, LANG_DETECTOR_BOUNDS);

        match self.provider.classify(LANGUAGE_DETECTOR, sample).await {
            Ok(result) => {
                let raw = result.label.to_lowercase().trim().to_string();
                let iso = detector_label_to_iso(&raw)
                    .map(str::to_string)
                    .unwrap_or_else(|| self.default_lang.clone());
                meta.insert("detected_raw".into(), raw.into());
                meta.insert("detector_score".into(), (result.score as f64).into());
                AiResponse::ok(LanguageResult { language: iso }).with_meta(meta)
            }
            Err(e) => {
                warn!(error = %e, "language detection failed");
                AiResponse::error_with_data(
                    LanguageResult {
                        language: self.default_lang.clone(),
                    },
                    vec![AnalysisError::Classifier(e.to_string()).to_string()],
                )
                .with_meta(meta)
            }
        }
    }

    /// Translate content into the target language.
    pub async fn translate(
        &self,
        content: &str,
        target_language: Option<&str>,
    ) -> AiResponse<TranslationResult> {
        let mut meta = Map::new();
        let mut errors: Vec<String> = Vec::new();

        let target_iso = target_language
            .unwrap_or(&self.default_lang)
            .trim()
            .to_lowercase();

        if content.trim().is_empty() {
            return AiResponse::fallback(TranslationResult {
                translation: content.to_string(),
                language: target_iso,
            });
        }

        let target_tag = mt_lang_tag(&target_iso);
        meta.insert("target_language".into(), target_iso.clone().into());
        meta.insert("target_mt_tag".into(), target_tag.into());

        // Detect source language.
        let src_resp = self.detect_language(content).await;
        let src_iso = src_resp
            .data
            .as_ref()
            .map(|d| d.language.clone())
            .unwrap_or_else(|| self.default_lang.clone());
        let src_tag = mt_lang_tag(&src_iso);

        meta.insert("source_language".into(), src_iso.clone().into());
        meta.insert("source_mt_tag".into(), src_tag.into());
        if let Some(detect_meta) = src_resp.meta {
            meta.insert("language_detection".into(), Value::Object(detect_meta));
        }

        // Same language: nothing to do.
        if src_iso == target_iso {
            meta.insert("method".into(), "noop".into());
            return AiResponse::ok(TranslationResult {
                translation: content.to_string(),
                language: target_iso,
            })
            .with_meta(meta);
        }

        // Primary: sentence-segmented MT.
        match self
            .machine_translate(content, src_tag, target_tag, &mut errors)
            .await
        {
            Ok(translation) => {
                meta.insert("method".into(), "mt".into());
                let status = if errors.is_empty() {
                    ResponseStatus::Ok
                } else {
                    // Some sentences degraded to their untranslated form.
                    ResponseStatus::Partial
                };
                return AiResponse {
                    status,
                    data: Some(TranslationResult {
                        translation,
                        language: target_iso,
                    }),
                    errors: if errors.is_empty() { None } else { Some(errors) },
                    meta: Some(meta),
                };
            }
            Err(e) => {
                warn!(error = %e, "MT failed, falling back to LLM");
                errors.push(format!("MT failed: {e}"));
            }
        }

        // Fallback: LLM translation.
        match self.llm_translate(content, &target_iso).await {
            Ok(translation) => {
                meta.insert("method".into(), "llm_fallback".into());
                AiResponse::partial(
                    TranslationResult {
                        translation,
                        language: target_iso,
                    },
                    errors,
                )
                .with_meta(meta)
            }
            Err(e) => {
                errors.push(format!("LLM failed: {e}"));
                AiResponse::error_with_data(
                    TranslationResult {
                        translation: content.to_string(),
                        language: target_iso,
                    },
                    errors,
                )
                .with_meta(meta)
            }
        }
    }

    /// Translate sentence by sentence. Individual sentence failures
    /// degrade to the tokenizer-normalized source sentence; the method
    /// errors only when no sentence translated at all.
    async fn machine_translate(
        &self,
        content: &str,
        src_tag: &str,
        target_tag: &str,
        errors: &mut Vec<String>,
    ) -> Result<String, AnalysisError> {
        let sentences = split_sentences(content);
        let mut translated: Vec<String> = Vec::with_capacity(sentences.len());
        let mut any_ok = false;

        for sentence in sentences {
            if sentence.trim().is_empty() {
                continue;
            }

            let tokens = self
                .tokenizer
                .encode(MT_MODEL, sentence, TRANSLATION_TOKEN_LIMIT)
                .await
                .map_err(|e| AnalysisError::Translation(e.to_string()))?;
            let safe_text = self
                .tokenizer
                .decode(MT_MODEL, &tokens)
                .await
                .map_err(|e| AnalysisError::Translation(e.to_string()))?;

            match self
                .provider
                .translate(MT_MODEL, &safe_text, src_tag, target_tag)
                .await
            {
                Ok(text) => {
                    any_ok = true;
                    translated.push(text);
                }
                Err(e) => {
                    warn!(error = %e, "sentence translation failed, keeping source text");
                    errors.push(format!("Sentence translation failed: {e}"));
                    translated.push(safe_text);
                }
            }
        }

        if !any_ok {
            return Err(AnalysisError::Translation(
                "no sentence could be translated".into(),
            ));
        }

        Ok(translated.join(" "))
    }

    async fn llm_translate(
        &self,
        content: &str,
        target_iso: &str,
    ) -> Result<String, AnalysisError> {
        let prompt = prompts::translation_prompt(content, target_iso);

        let object = self
            .runner
            .run(
                JsonRequest {
                    model_key: INSTRUCT_LLM,
                    prompt: &prompt,
                    params: GenerationParams {
                        max_new_tokens: FALLBACK_MAX_NEW_TOKENS,
                        temperature: 0.0,
                        do_sample: false,
                    },
                },
                Some(&validate_translation_schema),
            )
            .await?;

        Ok(object
            .get("translation")
            .and_then(Value::as_str)
            .expect("validated translation field")
            .to_string())
    }
}

fn validate_translation_schema(obj: &Map<String, Value>) -> Result<(), AnalysisError> {
    match obj.get("translation").and_then(Value::as_str) {
        Some(text) if !text.trim().is_empty() => Ok(()),
        _ => Err(AnalysisError::Schema(
            "Missing or empty 'translation' field".into(),
        )),
    }
}

/// Truncate to a byte bound without splitting a character.
fn bounded(text: &str, max_bytes: usize) -> &str {
    if text.len() <= max_bytes {
        return text;
    }
    let mut end = max_bytes;
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    &text[..end]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{MockProvider, WhitespaceTokenizer};

    fn service(provider: MockProvider) -> TranslationService {
        let provider = Arc::new(provider);
        let runner = Arc::new(JsonRunner::new(provider.clone()));
        TranslationService::new(provider, Arc::new(WhitespaceTokenizer::new()), runner, "en")
    }

    #[tokio::test]
    async fn same_language_short_circuits_unchanged() {
        let provider =
            MockProvider::new().with_classification(LANGUAGE_DETECTOR, "english", 0.99);

        let resp = service(provider).translate("Hello", Some("en")).await;

        assert_eq!(resp.status, ResponseStatus::Ok);
        let data = resp.data.unwrap();
        assert_eq!(data.translation, "Hello");
        assert_eq!(data.language, "en");
        assert_eq!(resp.meta.unwrap()["method"], "noop");
    }

    #[tokio::test]
    async fn empty_input_is_a_fallback_passthrough() {
        let resp = service(MockProvider::new()).translate("", Some("ko")).await;

        assert_eq!(resp.status, ResponseStatus::Fallback);
        assert_eq!(resp.data.unwrap().translation, "");
    }

    #[tokio::test]
    async fn mt_translates_sentence_by_sentence() {
        let provider =
            MockProvider::new().with_classification(LANGUAGE_DETECTOR, "english", 0.99);

        let resp = service(provider)
            .translate("Good morning. How are you?", Some("fr"))
            .await;

        assert_eq!(resp.status, ResponseStatus::Ok);
        let data = resp.data.unwrap();
        // The mock echoes each sentence with the target tag appended.
        assert_eq!(data.translation, "good morning. [fr_XX] how are you? [fr_XX]");
        assert_eq!(data.language, "fr");
        assert_eq!(resp.meta.unwrap()["method"], "mt");
    }

    #[tokio::test]
    async fn mt_wipeout_falls_back_to_llm() {
        let provider = MockProvider::new()
            .with_classification(LANGUAGE_DETECTOR, "english", 0.99)
            .failing_translate()
            .with_generation(r#"{"translation":"Bonjour le monde."}"#);

        let resp = service(provider).translate("Hello world.", Some("fr")).await;

        assert_eq!(resp.status, ResponseStatus::Partial);
        assert_eq!(resp.data.unwrap().translation, "Bonjour le monde.");
        let meta = resp.meta.unwrap();
        assert_eq!(meta["method"], "llm_fallback");
        assert!(resp.errors.unwrap()[0].starts_with("MT failed"));
    }

    #[tokio::test]
    async fn total_failure_returns_original_text() {
        let provider = MockProvider::new()
            .with_classification(LANGUAGE_DETECTOR, "english", 0.99)
            .failing_translate()
            .failing_generate();

        let resp = service(provider).translate("Hello world.", Some("fr")).await;

        assert_eq!(resp.status, ResponseStatus::Error);
        assert_eq!(resp.data.unwrap().translation, "Hello world.");
        assert_eq!(resp.errors.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn detection_failure_defaults_language() {
        let provider = MockProvider::new().failing_classify();

        let resp = service(provider).detect_language("Bonjour tout le monde").await;

        assert_eq!(resp.status, ResponseStatus::Error);
        assert_eq!(resp.data.unwrap().language, "en");
    }

    #[tokio::test]
    async fn unknown_detector_label_defaults_language() {
        let provider =
            MockProvider::new().with_classification(LANGUAGE_DETECTOR, "klingon", 0.8);

        let resp = service(provider).detect_language("nuqneH").await;

        assert_eq!(resp.status, ResponseStatus::Ok);
        assert_eq!(resp.data.unwrap().language, "en");
    }

    #[test]
    fn sentences_split_on_terminal_punctuation() {
        let sentences = split_sentences("One. Two! Three?");
        assert_eq!(sentences.len(), 3);
        let sentences = split_sentences("no punctuation at all");
        assert_eq!(sentences, vec!["no punctuation at all"]);
    }
}
