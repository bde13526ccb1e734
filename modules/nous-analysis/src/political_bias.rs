//! Political-bias detection with categorical ensemble voting.
//!
//! Primary vote: instruction-tuned LLM through the structured-output
//! runner. Secondary vote: fine-tuned political-leaning classifier.
//! Resolution is categorical: agreement or nothing, with a hard
//! classifier-confidence floor.

use std::sync::Arc;

use serde::Serialize;
use serde_json::{Map, Value};
use tracing::warn;

use inference_client::{
    registry::{INSTRUCT_LLM, POLITICAL_CLASSIFIER},
    GenerationParams, ModelProvider, TokenizerProvider,
};
use nous_common::{AiResponse, AnalysisError, PoliticalBias, ResponseStatus};

use crate::ensemble;
use crate::prompts;
use crate::runner::{JsonRequest, JsonRunner};

/// Classifier input window (tokens).
const MAX_INPUT_TOKENS: usize = 512;
const MAX_NEW_TOKENS: u32 = 128;

/// Below this classifier confidence the ensemble refuses to commit.
const CONFIDENCE_THRESHOLD: f32 = 0.65;

#[derive(Debug, Clone, Copy, Serialize)]
pub struct PoliticalBiasResult {
    pub political_bias: PoliticalBias,
}

pub struct PoliticalBiasDetector {
    provider: Arc<dyn ModelProvider>,
    tokenizer: Arc<dyn TokenizerProvider>,
    runner: Arc<JsonRunner>,
}

impl PoliticalBiasDetector {
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

    pub async fn detect(&self, content: &str) -> AiResponse<PoliticalBiasResult> {
        let mut errors: Vec<String> = Vec::new();
        let mut meta = Map::new();

        let content = content.trim();
        if content.is_empty() {
            return AiResponse::error_with_data(
                PoliticalBiasResult {
                    political_bias: PoliticalBias::Uncertain,
                },
                vec![AnalysisError::EmptyInput.to_string()],
            );
        }

        let llm_bias = match self.llm_vote(content).await {
            Ok(bias) => {
                meta.insert("llm_bias".into(), bias.as_str().into());
                Some(bias)
            }
            Err(e) => {
                warn!(error = %e, "LLM bias vote failed");
                errors.push(format!("LLM failed: {e}"));
                None
            }
        };

        let clf_vote = match self.classifier_vote(content).await {
            Ok((bias, confidence)) => {
                meta.insert("classifier_bias".into(), bias.as_str().into());
                meta.insert("classifier_confidence".into(), (confidence as f64).into());
                Some((bias, confidence))
            }
            Err(e) => {
                warn!(error = %e, "political classifier vote failed");
                errors.push(format!("Classifier failed: {e}"));
                None
            }
        };

        let outcome = ensemble::resolve_categorical(llm_bias, clf_vote, CONFIDENCE_THRESHOLD);
        meta.insert("reason".into(), outcome.reason.as_str().into());

        // `uncertain` is part of the answer vocabulary, so resolution
        // always lands in the allowed set.
        AiResponse {
            status: ResponseStatus::Ok,
            data: Some(PoliticalBiasResult {
                political_bias: outcome.label,
            }),
            errors: if errors.is_empty() { None } else { Some(errors) },
            meta: Some(meta),
        }
    }

    async fn llm_vote(&self, content: &str) -> Result<PoliticalBias, AnalysisError> {
        let prompt = prompts::political_bias_prompt(content);

        let object = self
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
                Some(&validate_bias_schema),
            )
            .await?;

        Ok(object
            .get("bias")
            .and_then(Value::as_str)
            .and_then(PoliticalBias::parse)
            .expect("validated bias label"))
    }

    async fn classifier_vote(&self, content: &str) -> Result<(PoliticalBias, f32), AnalysisError> {
        let tokens = self
            .tokenizer
            .encode(POLITICAL_CLASSIFIER, content, MAX_INPUT_TOKENS)
            .await
            .map_err(|e| AnalysisError::Classifier(e.to_string()))?;
        let safe_text = self
            .tokenizer
            .decode(POLITICAL_CLASSIFIER, &tokens)
            .await
            .map_err(|e| AnalysisError::Classifier(e.to_string()))?;

        let result = self
            .provider
            .classify(POLITICAL_CLASSIFIER, &safe_text)
            .await
            .map_err(|e| AnalysisError::Classifier(e.to_string()))?;

        let label = result.label.to_lowercase();
        let bias = PoliticalBias::parse(&label).ok_or_else(|| {
            AnalysisError::Classifier(format!("Unknown classifier label: {label}"))
        })?;

        Ok((bias, result.score))
    }
}

fn validate_bias_schema(obj: &Map<String, Value>) -> Result<(), AnalysisError> {
    match obj.get("bias").and_then(Value::as_str) {
        Some(label) if PoliticalBias::parse(label).is_some() => Ok(()),
        other => Err(AnalysisError::Schema(format!(
            "bias must be one of left|center|right, got {other:?}"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{MockProvider, WhitespaceTokenizer};

    fn detector(provider: MockProvider) -> PoliticalBiasDetector {
        let provider = Arc::new(provider);
        let runner = Arc::new(JsonRunner::new(provider.clone()));
        PoliticalBiasDetector::new(provider, Arc::new(WhitespaceTokenizer::new()), runner)
    }

    #[tokio::test]
    async fn low_classifier_confidence_forces_uncertain() {
        let provider = MockProvider::new()
            .with_generation(r#"{"bias":"left"}"#)
            .with_classification(POLITICAL_CLASSIFIER, "left", 0.5);

        let resp = detector(provider).detect("Budget debate coverage.").await;

        assert_eq!(resp.status, ResponseStatus::Ok);
        assert_eq!(resp.data.unwrap().political_bias, PoliticalBias::Uncertain);
        assert_eq!(resp.meta.unwrap()["reason"], "low_confidence");
    }

    #[tokio::test]
    async fn agreement_resolves_to_shared_label() {
        let provider = MockProvider::new()
            .with_generation(r#"{"bias":"right"}"#)
            .with_classification(POLITICAL_CLASSIFIER, "RIGHT", 0.9);

        let resp = detector(provider).detect("Tax cut editorial.").await;

        assert_eq!(resp.data.unwrap().political_bias, PoliticalBias::Right);
        assert_eq!(resp.meta.unwrap()["reason"], "ensemble_agreement");
    }

    #[tokio::test]
    async fn disagreement_resolves_uncertain() {
        let provider = MockProvider::new()
            .with_generation(r#"{"bias":"left"}"#)
            .with_classification(POLITICAL_CLASSIFIER, "right", 0.9);

        let resp = detector(provider).detect("Opinion piece.").await;

        assert_eq!(resp.data.unwrap().political_bias, PoliticalBias::Uncertain);
        assert_eq!(resp.meta.unwrap()["reason"], "ensemble_disagreement");
    }

    #[tokio::test]
    async fn classifier_failure_degrades_to_llm_only() {
        let provider = MockProvider::new()
            .with_generation(r#"{"bias":"center"}"#)
            .failing_classify();

        let resp = detector(provider).detect("Wire report.").await;

        assert_eq!(resp.data.unwrap().political_bias, PoliticalBias::Center);
        assert_eq!(resp.meta.unwrap()["reason"], "llm_only");
        assert!(resp.errors.unwrap()[0].starts_with("Classifier failed"));
    }

    #[tokio::test]
    async fn empty_input_is_an_error() {
        let resp = detector(MockProvider::new()).detect("").await;
        assert_eq!(resp.status, ResponseStatus::Error);
    }
}
