//! Structured-output runner.
//!
//! Executes an instruction-tuned LLM against a fully-rendered prompt and
//! guarantees the result is a single well-formed JSON object: prompt-hash
//! caching, strict extraction, parsing, and optional schema validation.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use serde_json::{Map, Value};
use sha2::{Digest, Sha256};
use tracing::{debug, warn};

use inference_client::{GenerationParams, ModelProvider};
use nous_common::AnalysisError;

/// Schema check applied to the parsed object before it is cached.
pub type SchemaValidator = dyn Fn(&Map<String, Value>) -> Result<(), AnalysisError> + Send + Sync;

/// One generation request. The prompt must already be fully rendered.
#[derive(Debug, Clone)]
pub struct JsonRequest<'a> {
    pub model_key: &'a str,
    pub prompt: &'a str,
    pub params: GenerationParams,
}

/// Runs generative capabilities and forces their output into validated
/// JSON objects.
///
/// The cache is content-addressed by a SHA-256 of the exact prompt text:
/// identical prompts return the cached object without touching the model,
/// whoever the caller is. Entries live for the process lifetime; with
/// temperature 0 / sampling off, re-querying an identical prompt is
/// redundant. The mutex guards only lookup and insert; the generation
/// call itself runs unlocked so distinct prompts generate in parallel.
pub struct JsonRunner {
    provider: Arc<dyn ModelProvider>,
    cache: Mutex<HashMap<String, Map<String, Value>>>,
}

impl JsonRunner {
    pub fn new(provider: Arc<dyn ModelProvider>) -> Self {
        Self {
            provider,
            cache: Mutex::new(HashMap::new()),
        }
    }

    /// Execute the request and return exactly one validated JSON object.
    ///
    /// Extraction policy is STRICT: the trimmed model output must be one
    /// JSON value bounded by `{...}` (or `[...]`, which then fails the
    /// object check). Leading or trailing junk around the value is
    /// rejected with an extraction error.
    pub async fn run(
        &self,
        request: JsonRequest<'_>,
        validator: Option<&SchemaValidator>,
    ) -> Result<Map<String, Value>, AnalysisError> {
        let prompt_hash = hex_sha256(request.prompt);

        {
            let cache = self.cache.lock().expect("runner cache poisoned");
            if let Some(cached) = cache.get(&prompt_hash) {
                debug!(model_key = request.model_key, "prompt cache hit");
                return Ok(cached.clone());
            }
        }

        let raw_output = self
            .provider
            .generate(request.model_key, request.prompt, request.params)
            .await
            .map_err(|e| AnalysisError::Generation(e.to_string()))?;

        let trimmed = raw_output.trim();
        if trimmed.is_empty() {
            warn!(model_key = request.model_key, "LLM returned empty output");
            return Err(AnalysisError::Generation("LLM returned empty output".into()));
        }

        let looks_like_object = trimmed.starts_with('{') && trimmed.ends_with('}');
        let looks_like_array = trimmed.starts_with('[') && trimmed.ends_with(']');
        if !looks_like_object && !looks_like_array {
            warn!(
                model_key = request.model_key,
                output_len = trimmed.len(),
                "unexpected LLM output format"
            );
            return Err(AnalysisError::Extraction(
                "LLM output does not contain a JSON object".into(),
            ));
        }

        let parsed: Value = serde_json::from_str(trimmed)
            .map_err(|e| AnalysisError::Parse(format!("Invalid JSON returned by LLM: {e}")))?;

        let object = match parsed {
            Value::Object(map) => map,
            _ => {
                return Err(AnalysisError::Schema(
                    "LLM JSON output is not an object".into(),
                ))
            }
        };

        if let Some(validator) = validator {
            validator(&object)?;
        }

        let mut cache = self.cache.lock().expect("runner cache poisoned");
        cache.insert(prompt_hash, object.clone());

        Ok(object)
    }
}

fn hex_sha256(text: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(text.as_bytes());
    let digest = hasher.finalize();
    let mut out = String::with_capacity(digest.len() * 2);
    for byte in digest {
        out.push_str(&format!("{byte:02x}"));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MockProvider;

    fn request(prompt: &str) -> JsonRequest<'_> {
        JsonRequest {
            model_key: "mistral-7b-instruct",
            prompt,
            params: GenerationParams::default(),
        }
    }

    #[tokio::test]
    async fn identical_prompts_invoke_provider_once() {
        let provider = Arc::new(MockProvider::new().with_generation(r#"{"sentiment":"positive"}"#));
        let runner = JsonRunner::new(provider.clone());

        let first = runner.run(request("X"), None).await.unwrap();
        let second = runner.run(request("X"), None).await.unwrap();

        assert_eq!(first, second);
        assert_eq!(provider.generate_calls(), 1);
    }

    #[tokio::test]
    async fn different_prompts_each_invoke_provider() {
        let provider = Arc::new(MockProvider::new().with_generation(r#"{"a":1}"#));
        let runner = JsonRunner::new(provider.clone());

        runner.run(request("X"), None).await.unwrap();
        runner.run(request("Y"), None).await.unwrap();

        assert_eq!(provider.generate_calls(), 2);
    }

    #[tokio::test]
    async fn empty_output_is_a_generation_error() {
        let provider = Arc::new(MockProvider::new().with_generation("   \n"));
        let runner = JsonRunner::new(provider);

        let err = runner.run(request("X"), None).await.unwrap_err();
        assert!(matches!(err, AnalysisError::Generation(_)));
    }

    #[tokio::test]
    async fn surrounding_junk_is_an_extraction_error() {
        let provider =
            Arc::new(MockProvider::new().with_generation("Sure! Here is the JSON: {\"a\":1}"));
        let runner = JsonRunner::new(provider);

        let err = runner.run(request("X"), None).await.unwrap_err();
        assert!(matches!(err, AnalysisError::Extraction(_)));
    }

    #[tokio::test]
    async fn malformed_json_is_a_parse_error() {
        let provider = Arc::new(MockProvider::new().with_generation(r#"{"a": }"#));
        let runner = JsonRunner::new(provider);

        let err = runner.run(request("X"), None).await.unwrap_err();
        assert!(matches!(err, AnalysisError::Parse(_)));
    }

    #[tokio::test]
    async fn array_output_is_a_schema_error() {
        let provider = Arc::new(MockProvider::new().with_generation(r#"["left"]"#));
        let runner = JsonRunner::new(provider);

        let err = runner.run(request("X"), None).await.unwrap_err();
        assert!(matches!(err, AnalysisError::Schema(_)));
    }

    #[tokio::test]
    async fn validator_rejection_is_a_schema_error_and_not_cached() {
        let provider = Arc::new(MockProvider::new().with_generation(r#"{"bias":"purple"}"#));
        let runner = JsonRunner::new(provider.clone());

        let validator = |obj: &Map<String, Value>| -> Result<(), AnalysisError> {
            match obj.get("bias").and_then(Value::as_str) {
                Some("left" | "center" | "right") => Ok(()),
                other => Err(AnalysisError::Schema(format!(
                    "bias must be one of left|center|right, got {other:?}"
                ))),
            }
        };

        let err = runner.run(request("X"), Some(&validator)).await.unwrap_err();
        assert!(matches!(err, AnalysisError::Schema(_)));

        // Rejected output must not be served from cache on retry.
        let _ = runner.run(request("X"), Some(&validator)).await.unwrap_err();
        assert_eq!(provider.generate_calls(), 2);
    }

    #[tokio::test]
    async fn provider_failure_is_a_generation_error() {
        let provider = Arc::new(MockProvider::new().failing());
        let runner = JsonRunner::new(provider);

        let err = runner.run(request("X"), None).await.unwrap_err();
        assert!(matches!(err, AnalysisError::Generation(_)));
    }
}
