//! Cognitive-bias detection: a cheap classifier gate in front of
//! expensive generative extraction.
//!
//! Stage 1 runs a lightweight classifier and a pluggable gate policy
//! decides whether the text likely contains bias. Stage 2 extracts
//! structured bias entries through the runner. The gate only
//! short-circuits when the generative stage is disabled by the caller.

use std::sync::Arc;

use serde_json::{Map, Value};
use tracing::warn;

use inference_client::{
    registry::{INSTRUCT_LLM, SENTIMENT_CLASSIFIER},
    Classification, GenerationParams, ModelProvider, TokenizerProvider,
};
use nous_common::{AiResponse, AnalysisError, DetectedBias, ResponseStatus};

use crate::prompts;
use crate::runner::{JsonRequest, JsonRunner};

/// Gate input window (tokens).
const MAX_INPUT_TOKENS: usize = 512;
/// LLM prompt input window (tokens).
const MAX_PROMPT_TOKENS: usize = 384;
const MAX_NEW_TOKENS: u32 = 256;

/// Decides from the gate classifier's output whether the text is likely
/// biased enough to justify the generative stage.
pub type GatePolicy = dyn Fn(&Classification) -> bool + Send + Sync;

/// Default gate heuristic: emotionally charged (positive-labeled) content
/// is treated as a proxy for "likely contains bias".
pub fn sentiment_gate(result: &Classification) -> bool {
    result.label.eq_ignore_ascii_case("positive")
}

pub struct CognitiveBiasDetector {
    provider: Arc<dyn ModelProvider>,
    tokenizer: Arc<dyn TokenizerProvider>,
    runner: Arc<JsonRunner>,
    gate: Arc<GatePolicy>,
}

impl CognitiveBiasDetector {
    pub fn new(
        provider: Arc<dyn ModelProvider>,
        tokenizer: Arc<dyn TokenizerProvider>,
        runner: Arc<JsonRunner>,
    ) -> Self {
        Self {
            provider,
            tokenizer,
            runner,
            gate: Arc::new(sentiment_gate),
        }
    }

    /// Replace the gate decision function.
    pub fn with_gate_policy(mut self, gate: Arc<GatePolicy>) -> Self {
        self.gate = gate;
        self
    }

    pub async fn detect(
        &self,
        content: &str,
        use_generative_stage: bool,
    ) -> AiResponse<Vec<DetectedBias>> {
        let mut errors: Vec<String> = Vec::new();
        let mut results: Vec<DetectedBias> = Vec::new();
        let mut meta = Map::new();

        let content = content.trim();
        if content.is_empty() {
            return AiResponse::error_with_data(
                Vec::new(),
                vec![AnalysisError::EmptyInput.to_string()],
            );
        }

        // Stage 1: likelihood gate.
        match self.gate_stage(content, &mut meta).await {
            Ok(likely_biased) => {
                meta.insert("gate_likely_biased".into(), likely_biased.into());
                if !likely_biased && !use_generative_stage {
                    return AiResponse::ok(Vec::new()).with_meta(meta);
                }
            }
            Err(e) => {
                warn!(error = %e, "cognitive-bias gate failed");
                errors.push(format!("Stage 1 gating failed: {e}"));
                if !use_generative_stage {
                    return AiResponse::error_with_data(Vec::new(), errors).with_meta(meta);
                }
                // Generative stage is enabled: continue despite the gate.
            }
        }

        // Stage 2: structured extraction.
        if use_generative_stage {
            match self.extraction_stage(content, &mut meta).await {
                Ok(biases) => results = biases,
                Err(e) => {
                    warn!(error = %e, "cognitive-bias extraction failed");
                    errors.push(format!("Stage 2 extraction failed: {e}"));
                }
            }
        }

        let status = if errors.is_empty() {
            ResponseStatus::Ok
        } else if !results.is_empty() {
            ResponseStatus::Partial
        } else {
            ResponseStatus::Error
        };

        AiResponse {
            status,
            data: Some(results),
            errors: if errors.is_empty() { None } else { Some(errors) },
            meta: Some(meta),
        }
    }

    async fn gate_stage(
        &self,
        content: &str,
        meta: &mut Map<String, Value>,
    ) -> Result<bool, AnalysisError> {
        let tokens = self
            .tokenizer
            .encode(SENTIMENT_CLASSIFIER, content, MAX_INPUT_TOKENS)
            .await
            .map_err(|e| AnalysisError::Classifier(e.to_string()))?;
        meta.insert("input_tokens".into(), tokens.len().into());

        let truncated = self
            .tokenizer
            .decode(SENTIMENT_CLASSIFIER, &tokens)
            .await
            .map_err(|e| AnalysisError::Classifier(e.to_string()))?;

        let result = self
            .provider
            .classify(SENTIMENT_CLASSIFIER, &truncated)
            .await
            .map_err(|e| AnalysisError::Classifier(e.to_string()))?;

        meta.insert("gate_label".into(), result.label.to_uppercase().into());

        Ok((self.gate)(&result))
    }

    async fn extraction_stage(
        &self,
        content: &str,
        meta: &mut Map<String, Value>,
    ) -> Result<Vec<DetectedBias>, AnalysisError> {
        let tokens = self
            .tokenizer
            .encode(INSTRUCT_LLM, content, MAX_PROMPT_TOKENS)
            .await
            .map_err(|e| AnalysisError::Generation(e.to_string()))?;
        let prompt_text = self
            .tokenizer
            .decode(INSTRUCT_LLM, &tokens)
            .await
            .map_err(|e| AnalysisError::Generation(e.to_string()))?;

        let prompt = prompts::cognitive_bias_prompt(&prompt_text);

        let object = self
            .runner
            .run(
                JsonRequest {
                    model_key: INSTRUCT_LLM,
                    prompt: &prompt,
                    params: GenerationParams {
                        max_new_tokens: MAX_NEW_TOKENS,
                        temperature: 0.3,
                        do_sample: false,
                    },
                },
                Some(&validate_biases_schema),
            )
            .await?;

        meta.insert("analysis_model".into(), INSTRUCT_LLM.into());

        // Validated: "biases" is an array of objects with a "bias" field.
        let entries = object
            .get("biases")
            .and_then(Value::as_array)
            .expect("validated biases array");

        let biases = entries
            .iter()
            .cloned()
            .map(serde_json::from_value)
            .collect::<Result<Vec<DetectedBias>, _>>()
            .map_err(|e| AnalysisError::Schema(format!("Invalid bias entry: {e}")))?;

        Ok(biases)
    }
}

fn validate_biases_schema(obj: &Map<String, Value>) -> Result<(), AnalysisError> {
    let entries = match obj.get("biases").and_then(Value::as_array) {
        Some(entries) => entries,
        None => {
            return Err(AnalysisError::Schema(
                "Cognitive bias output must contain a 'biases' array".into(),
            ))
        }
    };

    for entry in entries {
        let object = entry
            .as_object()
            .ok_or_else(|| AnalysisError::Schema("Each bias entry must be an object".into()))?;
        if !object.contains_key("bias") {
            return Err(AnalysisError::Schema("Bias entry missing 'bias' field".into()));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{MockProvider, WhitespaceTokenizer};

    fn detector(provider: MockProvider) -> CognitiveBiasDetector {
        let provider = Arc::new(provider);
        let runner = Arc::new(JsonRunner::new(provider.clone()));
        CognitiveBiasDetector::new(provider, Arc::new(WhitespaceTokenizer::new()), runner)
    }

    #[tokio::test]
    async fn empty_input_returns_empty_data_without_panicking() {
        let resp = detector(MockProvider::new()).detect("", true).await;

        assert_eq!(resp.status, ResponseStatus::Error);
        assert!(resp.data.unwrap().is_empty());
    }

    #[tokio::test]
    async fn unlikely_gate_short_circuits_when_generative_disabled() {
        let provider = MockProvider::new().with_classification(
            SENTIMENT_CLASSIFIER,
            "NEGATIVE",
            0.9,
        );

        let resp = detector(provider).detect("Plain factual text.", false).await;

        assert_eq!(resp.status, ResponseStatus::Ok);
        assert!(resp.data.unwrap().is_empty());
        let meta = resp.meta.unwrap();
        assert_eq!(meta["gate_likely_biased"], false);
    }

    #[tokio::test]
    async fn gate_failure_with_generative_disabled_is_an_error() {
        let provider = MockProvider::new().failing_classify();

        let resp = detector(provider).detect("Some text.", false).await;

        assert_eq!(resp.status, ResponseStatus::Error);
        assert!(resp.data.unwrap().is_empty());
        assert!(resp.errors.unwrap()[0].starts_with("Stage 1"));
    }

    #[tokio::test]
    async fn gate_failure_with_generative_enabled_continues() {
        let provider = MockProvider::new()
            .failing_classify()
            .with_generation(r#"{"biases":[{"bias":"confirmation bias","severity":"high"}]}"#);

        let resp = detector(provider).detect("Charged opinion text.", true).await;

        // Gate error recorded, extraction still produced data.
        assert_eq!(resp.status, ResponseStatus::Partial);
        let data = resp.data.unwrap();
        assert_eq!(data.len(), 1);
        assert_eq!(data[0].bias, "confirmation bias");
    }

    #[tokio::test]
    async fn extraction_parses_bias_entries() {
        let provider = MockProvider::new()
            .with_classification(SENTIMENT_CLASSIFIER, "POSITIVE", 0.9)
            .with_generation(
                r#"{"biases":[{"bias":"anchoring","snippet":"first offer","severity":"low","category":"judgment"}]}"#,
            );

        let resp = detector(provider).detect("Persuasive sales pitch.", true).await;

        assert_eq!(resp.status, ResponseStatus::Ok);
        let data = resp.data.unwrap();
        assert_eq!(data[0].bias, "anchoring");
        assert_eq!(data[0].snippet.as_deref(), Some("first offer"));
    }

    #[tokio::test]
    async fn malformed_entries_are_a_schema_error() {
        let provider = MockProvider::new()
            .with_classification(SENTIMENT_CLASSIFIER, "POSITIVE", 0.9)
            .with_generation(r#"{"biases":["anchoring"]}"#);

        let resp = detector(provider).detect("Persuasive sales pitch.", true).await;

        assert_eq!(resp.status, ResponseStatus::Error);
        assert!(resp.data.unwrap().is_empty());
        assert!(resp.errors.unwrap()[0].contains("Stage 2"));
    }

    #[tokio::test]
    async fn custom_gate_policy_is_honored() {
        let provider = MockProvider::new().with_classification(
            SENTIMENT_CLASSIFIER,
            "NEGATIVE",
            0.9,
        );

        let detector = detector(provider)
            .with_gate_policy(Arc::new(|result: &Classification| result.score > 0.5));

        let resp = detector.detect("Anything at all.", false).await;

        // The custom policy fires on score, not label, so the gate does
        // not short-circuit; with the generative stage disabled the
        // result is still empty but gated as likely.
        assert_eq!(resp.meta.unwrap()["gate_likely_biased"], true);
    }
}
