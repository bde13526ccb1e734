//! Antithesis generation: a concise synthesis of the strongest opposing
//! viewpoint to the article's main thrust.

use std::sync::Arc;

use serde::Serialize;
use serde_json::{Map, Value};
use tracing::warn;

use inference_client::{
    registry::INSTRUCT_LLM, GenerationParams, ModelProvider, TokenizerProvider,
};
use nous_common::{AiResponse, AnalysisError};

use crate::prompts;
use crate::runner::{JsonRequest, JsonRunner};

/// LLM prompt input window (tokens).
const MAX_PROMPT_TOKENS: usize = 384;
const MAX_NEW_TOKENS: u32 = 160;

/// Results shorter than this many words are degenerate.
const MIN_WORDS: usize = 5;

#[derive(Debug, Clone, Serialize)]
pub struct AntithesisResult {
    pub antithesis: String,
}

pub struct AntithesisGenerator {
    provider: Arc<dyn ModelProvider>,
    tokenizer: Arc<dyn TokenizerProvider>,
    runner: Arc<JsonRunner>,
}

impl AntithesisGenerator {
    pub fn new(
        provider: Arc<dyn ModelProvider>,
        tokenizer: Arc<dyn TokenizerProvider>,
        runner: Arc<JsonRunner>,
    ) -> Self {
        Self {
            provider,
            tokenizer,
            runner,
        }
    }

    pub async fn generate(&self, content: &str) -> AiResponse<AntithesisResult> {
        let mut meta = Map::new();

        let content = content.trim();
        if content.is_empty() {
            return AiResponse::error_with_data(
                AntithesisResult {
                    antithesis: String::new(),
                },
                vec![AnalysisError::EmptyInput.to_string()],
            );
        }

        match self.run(content, &mut meta).await {
            Ok(antithesis) => {
                AiResponse::ok(AntithesisResult { antithesis }).with_meta(meta)
            }
            Err(e) => {
                warn!(error = %e, "antithesis generation failed");
                AiResponse::error_with_data(
                    AntithesisResult {
                        antithesis: String::new(),
                    },
                    vec![e.to_string()],
                )
                .with_meta(meta)
            }
        }
    }

    async fn run(
        &self,
        content: &str,
        meta: &mut Map<String, Value>,
    ) -> Result<String, AnalysisError> {
        let tokens = self
            .tokenizer
            .encode(INSTRUCT_LLM, content, MAX_PROMPT_TOKENS)
            .await
            .map_err(|e| AnalysisError::Generation(e.to_string()))?;
        meta.insert("input_tokens".into(), tokens.len().into());

        let truncated = self
            .tokenizer
            .decode(INSTRUCT_LLM, &tokens)
            .await
            .map_err(|e| AnalysisError::Generation(e.to_string()))?;

        let prompt = prompts::antithesis_prompt(&truncated);

        let object = self
            .runner
            .run(
                JsonRequest {
                    model_key: INSTRUCT_LLM,
                    prompt: &prompt,
                    params: GenerationParams {
                        max_new_tokens: MAX_NEW_TOKENS,
                        temperature: 0.4,
                        do_sample: false,
                    },
                },
                Some(&validate_antithesis_schema),
            )
            .await?;

        Ok(object
            .get("antithesis")
            .and_then(Value::as_str)
            .expect("validated antithesis field")
            .trim()
            .to_string())
    }
}

fn validate_antithesis_schema(obj: &Map<String, Value>) -> Result<(), AnalysisError> {
    let text = match obj.get("antithesis").and_then(Value::as_str) {
        Some(text) => text.trim(),
        None => {
            return Err(AnalysisError::Schema(
                "Missing or non-string 'antithesis' field".into(),
            ))
        }
    };

    if text.split_whitespace().count() < MIN_WORDS {
        return Err(AnalysisError::Schema(format!(
            "Antithesis under {MIN_WORDS} words is degenerate"
        )));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use nous_common::ResponseStatus;

    use crate::testing::{MockProvider, WhitespaceTokenizer};

    fn generator(provider: MockProvider) -> AntithesisGenerator {
        let provider = Arc::new(provider);
        let runner = Arc::new(JsonRunner::new(provider.clone()));
        AntithesisGenerator::new(provider, Arc::new(WhitespaceTokenizer::new()), runner)
    }

    #[tokio::test]
    async fn generates_counter_narrative() {
        let provider = MockProvider::new().with_generation(
            r#"{"antithesis":"Critics argue the policy will raise costs for consumers."}"#,
        );

        let resp = generator(provider).generate("The policy lowers costs.").await;

        assert_eq!(resp.status, ResponseStatus::Ok);
        assert!(resp.data.unwrap().antithesis.starts_with("Critics argue"));
    }

    #[tokio::test]
    async fn short_output_is_rejected_as_degenerate() {
        let provider = MockProvider::new().with_generation(r#"{"antithesis":"No."}"#);

        let resp = generator(provider).generate("A long argument.").await;

        assert_eq!(resp.status, ResponseStatus::Error);
        assert!(resp.data.unwrap().antithesis.is_empty());
        assert!(resp.errors.unwrap()[0].contains("degenerate"));
    }

    #[tokio::test]
    async fn generation_failure_is_an_error() {
        let provider = MockProvider::new().failing_generate();

        let resp = generator(provider).generate("Some article.").await;

        assert_eq!(resp.status, ResponseStatus::Error);
    }

    #[tokio::test]
    async fn empty_input_is_an_error() {
        let resp = generator(MockProvider::new()).generate("  ").await;
        assert_eq!(resp.status, ResponseStatus::Error);
    }
}
