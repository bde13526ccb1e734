//! Philosophical / thematic interpretation of an article.
//!
//! Open schema: the LLM returns whatever structured interpretation the
//! prompt elicits (summary, themes, worldview, ethical questions,
//! traditions, explanation). Only object-ness is enforced.

use std::sync::Arc;

use serde_json::{Map, Value};
use tracing::warn;

use inference_client::{registry::INSTRUCT_LLM, GenerationParams};
use nous_common::{AiResponse, AnalysisError};

use crate::prompts;
use crate::runner::{JsonRequest, JsonRunner};

const MAX_NEW_TOKENS: u32 = 256;

pub struct PhilosophicalAnalyzer {
    runner: Arc<JsonRunner>,
}

impl PhilosophicalAnalyzer {
    pub fn new(runner: Arc<JsonRunner>) -> Self {
        Self { runner }
    }

    pub async fn analyze(&self, content: &str) -> AiResponse<Map<String, Value>> {
        let content = content.trim();
        if content.is_empty() {
            return AiResponse::error_with_data(
                Map::new(),
                vec![AnalysisError::EmptyInput.to_string()],
            );
        }

        let prompt = prompts::philosophical_prompt(content);

        let mut meta = Map::new();
        meta.insert("analysis_model".into(), INSTRUCT_LLM.into());
        meta.insert("analysis_type".into(), "philosophical".into());

        match self
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
                None,
            )
            .await
        {
            Ok(object) => AiResponse::ok(object).with_meta(meta),
            Err(e) => {
                warn!(error = %e, "philosophical analysis failed");
                AiResponse::error_with_data(Map::new(), vec![e.to_string()]).with_meta(meta)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nous_common::ResponseStatus;

    use crate::testing::MockProvider;

    fn analyzer(provider: MockProvider) -> PhilosophicalAnalyzer {
        PhilosophicalAnalyzer::new(Arc::new(JsonRunner::new(Arc::new(provider))))
    }

    #[tokio::test]
    async fn open_schema_passes_through() {
        let provider = MockProvider::new().with_generation(
            r#"{"philosophical_summary":"Progress vs tradition.","themes":["progress"],"worldview":"pragmatist"}"#,
        );

        let resp = analyzer(provider).analyze("An article about innovation.").await;

        assert_eq!(resp.status, ResponseStatus::Ok);
        let data = resp.data.unwrap();
        assert_eq!(data["worldview"], "pragmatist");
        assert_eq!(data["themes"][0], "progress");
    }

    #[tokio::test]
    async fn non_object_output_is_an_error() {
        let provider = MockProvider::new().with_generation(r#"["themes"]"#);

        let resp = analyzer(provider).analyze("An article.").await;

        assert_eq!(resp.status, ResponseStatus::Error);
        assert!(resp.data.unwrap().is_empty());
    }

    #[tokio::test]
    async fn empty_input_is_an_error() {
        let resp = analyzer(MockProvider::new()).analyze("").await;
        assert_eq!(resp.status, ResponseStatus::Error);
    }
}
