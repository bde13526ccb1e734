//! Article normalization pipelines.
//!
//! Clean raw HTML into plain text, then run summarization and tag
//! extraction (optionally preceded by translation). Orchestrates other
//! services; runs no models itself.

use std::sync::Arc;

use serde::Serialize;
use spider_transformations::transformation::content::{
    transform_content_input, ReturnFormat, TransformConfig, TransformInput,
};
use tracing::warn;

use nous_common::{AiResponse, ResponseStatus};

use crate::summarization::Summarizer;
use crate::tags::TagExtractor;
use crate::translate::TranslationService;

/// Strip raw HTML down to readable plain text via Readability extraction.
pub fn clean_html(html: &str) -> String {
    if html.trim().is_empty() {
        return String::new();
    }

    let text = transform(html, true);
    // Readability rejects very short documents; fall back to a plain
    // full-text extraction so small pages still normalize.
    let text = if text.trim().is_empty() {
        transform(html, false)
    } else {
        text
    };

    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn transform(html: &str, readability: bool) -> String {
    let config = TransformConfig {
        readability,
        main_content: readability,
        return_format: ReturnFormat::Text,
        filter_images: true,
        filter_svg: true,
        clean_html: true,
    };
    let input = TransformInput {
        url: None,
        content: html.as_bytes(),
        screenshot_bytes: None,
        encoding: None,
        selector_config: None,
        ignore_tags: None,
    };

    transform_content_input(input, &config)
}

#[derive(Debug, Clone, Serialize)]
pub struct NormalizedArticle {
    pub content: String,
    pub summary: String,
    pub tags: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct NormalizedTranslatedArticle {
    pub content: String,
    pub summary: String,
    pub tags: Vec<String>,
    pub language: String,
}

pub struct NormalizePipeline {
    summarizer: Arc<Summarizer>,
    tags: Arc<TagExtractor>,
    translator: Arc<TranslationService>,
}

impl NormalizePipeline {
    pub fn new(
        summarizer: Arc<Summarizer>,
        tags: Arc<TagExtractor>,
        translator: Arc<TranslationService>,
    ) -> Self {
        Self {
            summarizer,
            tags,
            translator,
        }
    }

    /// Clean HTML, then summarize and extract tags.
    pub async fn normalize_article(&self, raw_html: &str) -> AiResponse<NormalizedArticle> {
        let mut errors: Vec<String> = Vec::new();

        let content = clean_html(raw_html);

        let summary = self.summarize_step(&content, &mut errors).await;
        let tags = self.tags_step(&content, &mut errors).await;

        let status = normalize_status(&errors, !summary.is_empty() || !tags.is_empty());

        AiResponse {
            status,
            data: Some(NormalizedArticle {
                content,
                summary,
                tags,
            }),
            errors: if errors.is_empty() { None } else { Some(errors) },
            meta: None,
        }
    }

    /// Clean HTML, translate, then summarize and tag the translated text.
    pub async fn normalize_and_translate(
        &self,
        raw_html: &str,
        target_language: &str,
    ) -> AiResponse<NormalizedTranslatedArticle> {
        let mut errors: Vec<String> = Vec::new();

        let content = clean_html(raw_html);

        let (translation, language) = {
            let resp = self.translator.translate(&content, Some(target_language)).await;
            if let Some(child_errors) = resp.errors {
                errors.extend(child_errors);
            }
            match resp.data {
                Some(data) => (data.translation, data.language),
                None => (content.clone(), target_language.to_string()),
            }
        };

        let summary = self.summarize_step(&translation, &mut errors).await;
        let tags = self.tags_step(&translation, &mut errors).await;

        let produced = !translation.is_empty() || !summary.is_empty() || !tags.is_empty();
        let status = normalize_status(&errors, produced);

        AiResponse {
            status,
            data: Some(NormalizedTranslatedArticle {
                content: translation,
                summary,
                tags,
                language,
            }),
            errors: if errors.is_empty() { None } else { Some(errors) },
            meta: None,
        }
    }

    async fn summarize_step(&self, content: &str, errors: &mut Vec<String>) -> String {
        let resp = self.summarizer.summarize(content).await;
        if let Some(child_errors) = resp.errors {
            errors.extend(child_errors);
        }
        match resp.data {
            Some(data) => data.summary,
            None => {
                warn!("summarization produced no payload");
                String::new()
            }
        }
    }

    async fn tags_step(&self, content: &str, errors: &mut Vec<String>) -> Vec<String> {
        let resp = self.tags.extract(content).await;
        if let Some(child_errors) = resp.errors {
            errors.extend(child_errors);
        }
        resp.data.unwrap_or_default()
    }
}

fn normalize_status(errors: &[String], produced_output: bool) -> ResponseStatus {
    if errors.is_empty() {
        ResponseStatus::Ok
    } else if produced_output {
        ResponseStatus::Partial
    } else {
        ResponseStatus::Error
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use inference_client::registry::LANGUAGE_DETECTOR;
    use inference_client::EntitySpan;

    use crate::runner::JsonRunner;
    use crate::testing::{MockProvider, WhitespaceTokenizer};

    fn pipeline(provider: MockProvider) -> NormalizePipeline {
        let provider = Arc::new(provider);
        let tokenizer = Arc::new(WhitespaceTokenizer::new());
        let runner = Arc::new(JsonRunner::new(provider.clone()));

        NormalizePipeline::new(
            Arc::new(Summarizer::new(runner.clone())),
            Arc::new(TagExtractor::new(provider.clone(), tokenizer.clone())),
            Arc::new(TranslationService::new(provider, tokenizer, runner, "en")),
        )
    }

    const HTML: &str = "<html><body><article><p>Acme Corp launched a new widget in Berlin. \
                        Sales are expected to rise. Analysts are optimistic.</p></article></body></html>";

    #[tokio::test]
    async fn normalize_summarizes_and_tags() {
        let provider = MockProvider::new()
            .with_generation(r#"{"summary":"Acme launched a widget."}"#)
            .with_entities(vec![EntitySpan {
                word: "Acme".into(),
                entity_group: "ORG".into(),
                score: 0.99,
            }]);

        let resp = pipeline(provider).normalize_article(HTML).await;

        assert_eq!(resp.status, ResponseStatus::Ok);
        let data = resp.data.unwrap();
        assert!(data.content.contains("Acme Corp"));
        assert_eq!(data.summary, "Acme launched a widget.");
        assert_eq!(data.tags, vec!["acme"]);
    }

    #[tokio::test]
    async fn summarizer_fallback_degrades_to_partial() {
        let provider = MockProvider::new()
            .failing_generate()
            .with_entities(Vec::new());

        let resp = pipeline(provider).normalize_article(HTML).await;

        // Extractive fallback still yields a summary, but the error is
        // surfaced and the status degrades.
        assert_eq!(resp.status, ResponseStatus::Partial);
        let data = resp.data.unwrap();
        assert!(!data.summary.is_empty());
    }

    #[tokio::test]
    async fn translate_variant_carries_language() {
        let provider = MockProvider::new()
            .with_classification(LANGUAGE_DETECTOR, "english", 0.99)
            .with_generation(r#"{"summary":"Acme a lancé un widget."}"#)
            .with_entities(Vec::new());

        let resp = pipeline(provider).normalize_and_translate(HTML, "fr").await;

        let data = resp.data.unwrap();
        assert_eq!(data.language, "fr");
        // The mock MT echoes sentences with the target tag appended.
        assert!(data.content.contains("[fr_XX]"));
    }

    #[tokio::test]
    async fn empty_html_yields_empty_content() {
        let provider = MockProvider::new();
        let resp = pipeline(provider).normalize_article("").await;

        let data = resp.data.as_ref().unwrap();
        assert!(data.content.is_empty());
    }
}
