//! Sentiment analysis with ensemble voting.
//!
//! Primary vote: instruction-tuned LLM through the structured-output
//! runner. Secondary vote: fine-tuned sentiment classifier on truncated
//! input. Disagreement and low confidence are resolved by the weighted
//! polarity ensemble.

use std::sync::Arc;

use serde::Serialize;
use serde_json::{Map, Value};
use tracing::warn;

use inference_client::{
    registry::{INSTRUCT_LLM, SENTIMENT_CLASSIFIER},
    GenerationParams, ModelProvider, TokenizerProvider,
};
use nous_common::{AiResponse, AnalysisError, ResponseStatus, Sentiment};

use crate::ensemble::{self, Vote, DEFAULT_POLARITY_WEIGHTS};
use crate::prompts;
use crate::runner::{JsonRequest, JsonRunner};

/// Classifier input window (tokens).
const MAX_INPUT_TOKENS: usize = 256;
const MAX_NEW_TOKENS: u32 = 128;

const CONFIDENCE_THRESHOLD: f32 = 0.55;
const NEUTRAL_MARGIN: f32 = 0.15;

#[derive(Debug, Clone, Copy, Serialize)]
pub struct SentimentResult {
    pub sentiment: Sentiment,
}

pub struct SentimentAnalyzer {
    provider: Arc<dyn ModelProvider>,
    tokenizer: Arc<dyn TokenizerProvider>,
    runner: Arc<JsonRunner>,
}

impl SentimentAnalyzer {
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

    pub async fn analyze(&self, content: &str) -> AiResponse<SentimentResult> {
        let mut errors: Vec<String> = Vec::new();
        let mut meta = Map::new();

        let content = content.trim();
        if content.is_empty() {
            return AiResponse::error_with_data(
                SentimentResult {
                    sentiment: Sentiment::Unknown,
                },
                vec![AnalysisError::EmptyInput.to_string()],
            );
        }

        // Primary: LLM vote through the runner.
        let llm_vote = match self.llm_vote(content, &mut meta).await {
            Ok(vote) => Some(vote),
            Err(e) => {
                warn!(error = %e, "LLM sentiment vote failed");
                errors.push(format!("LLM failed: {e}"));
                None
            }
        };

        // Secondary: classifier vote on truncated input.
        let clf_vote = match self.classifier_vote(content, &mut meta).await {
            Ok(vote) => Some(vote),
            Err(e) => {
                warn!(error = %e, "sentiment classifier vote failed");
                errors.push(format!("Classifier failed: {e}"));
                None
            }
        };

        let outcome = ensemble::resolve_polarity(
            llm_vote,
            clf_vote,
            DEFAULT_POLARITY_WEIGHTS,
            CONFIDENCE_THRESHOLD,
            NEUTRAL_MARGIN,
        );

        meta.insert("reason".into(), outcome.reason.as_str().into());
        if let Some(score) = outcome.score {
            meta.insert("ensemble_score".into(), (score as f64).into());
        }

        // An unresolved label is a degrade outcome, not a failure.
        let status = if outcome.label == Sentiment::Unknown {
            ResponseStatus::Partial
        } else {
            ResponseStatus::Ok
        };

        AiResponse {
            status,
            data: Some(SentimentResult {
                sentiment: outcome.label,
            }),
            errors: if errors.is_empty() { None } else { Some(errors) },
            meta: Some(meta),
        }
    }

    async fn llm_vote(
        &self,
        content: &str,
        meta: &mut Map<String, Value>,
    ) -> Result<Vote, AnalysisError> {
        let prompt = prompts::sentiment_prompt(content);

        let object = self
            .runner
            .run(
                JsonRequest {
                    model_key: INSTRUCT_LLM,
                    prompt: &prompt,
                    params: GenerationParams {
                        max_new_tokens: MAX_NEW_TOKENS,
                        temperature: 0.0,
                        do_sample: false,
                    },
                },
                Some(&validate_sentiment_schema),
            )
            .await?;

        // Validated above: label is known, confidence is in range.
        let label = object
            .get("sentiment")
            .and_then(Value::as_str)
            .and_then(Sentiment::parse)
            .expect("validated sentiment label");
        let confidence = object
            .get("confidence")
            .and_then(Value::as_f64)
            .expect("validated confidence") as f32;

        meta.insert("llm_sentiment".into(), label.as_str().into());
        meta.insert("llm_confidence".into(), (confidence as f64).into());

        Ok(Vote {
            value: label.polarity().unwrap_or(0.0),
            confidence,
        })
    }

    async fn classifier_vote(
        &self,
        content: &str,
        meta: &mut Map<String, Value>,
    ) -> Result<Vote, AnalysisError> {
        let tokens = self
            .tokenizer
            .encode(SENTIMENT_CLASSIFIER, content, MAX_INPUT_TOKENS)
            .await
            .map_err(|e| AnalysisError::Classifier(e.to_string()))?;
        let safe_text = self
            .tokenizer
            .decode(SENTIMENT_CLASSIFIER, &tokens)
            .await
            .map_err(|e| AnalysisError::Classifier(e.to_string()))?;

        let result = self
            .provider
            .classify(SENTIMENT_CLASSIFIER, &safe_text)
            .await
            .map_err(|e| AnalysisError::Classifier(e.to_string()))?;

        let label = result.label.to_lowercase();
        // Unrecognized classifier labels contribute a neutral value.
        let value = Sentiment::parse(&label)
            .and_then(|s| s.polarity())
            .unwrap_or(0.0);

        meta.insert("classifier_sentiment".into(), label.into());
        meta.insert("classifier_confidence".into(), (result.score as f64).into());

        Ok(Vote {
            value,
            confidence: result.score,
        })
    }
}

fn validate_sentiment_schema(obj: &Map<String, Value>) -> Result<(), AnalysisError> {
    let sentiment = obj.get("sentiment").and_then(Value::as_str);
    if sentiment.and_then(Sentiment::parse).is_none() {
        return Err(AnalysisError::Schema(format!(
            "Invalid sentiment: {:?}",
            obj.get("sentiment")
        )));
    }

    match obj.get("confidence").and_then(Value::as_f64) {
        Some(conf) if (0.0..=1.0).contains(&conf) => Ok(()),
        _ => Err(AnalysisError::Schema("Invalid confidence value".into())),
    }
}
