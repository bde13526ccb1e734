use anyhow::{anyhow, bail, Result};
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::debug;

use crate::registry::supports_generation;
use crate::traits::{
    Classification, EntitySpan, GenerationParams, ModelProvider, TokenizerProvider,
};

use super::types::*;

/// HTTP client for the model-inference sidecar.
///
/// The sidecar owns model loading, device placement and on-disk caching;
/// this client only speaks its JSON wire contract.
#[derive(Clone)]
pub struct InferenceClient {
    base_url: String,
    api_key: Option<String>,
    http: reqwest::Client,
}

impl InferenceClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: None,
            http: reqwest::Client::new(),
        }
    }

    pub fn with_api_key(mut self, key: &str) -> Self {
        self.api_key = Some(key.to_string());
        self
    }

    fn headers(&self) -> Result<HeaderMap> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        if let Some(ref key) = self.api_key {
            headers.insert(AUTHORIZATION, HeaderValue::from_str(&format!("Bearer {key}"))?);
        }
        Ok(headers)
    }

    async fn post<B: Serialize, R: DeserializeOwned>(&self, path: &str, body: &B) -> Result<R> {
        let url = format!("{}{path}", self.base_url);

        let response = self
            .http
            .post(&url)
            .headers(self.headers()?)
            .json(body)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await?;
            return Err(anyhow!("inference API error ({}): {}", status, error_text));
        }

        Ok(response.json().await?)
    }

    /// Ask the sidecar to warm all registered models.
    pub async fn prefetch(&self) -> Result<()> {
        let url = format!("{}/prefetch", self.base_url);
        let response = self.http.post(&url).headers(self.headers()?).send().await?;
        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await?;
            return Err(anyhow!("inference API error ({}): {}", status, error_text));
        }
        Ok(())
    }
}

#[async_trait]
impl ModelProvider for InferenceClient {
    async fn classify(&self, model_key: &str, text: &str) -> Result<Classification> {
        debug!(model_key, "classify request");
        let resp: ClassifyResponse = self
            .post("/classify", &ClassifyRequest { model_key, text })
            .await?;
        Ok(Classification {
            label: resp.label,
            score: resp.score,
        })
    }

    async fn generate(
        &self,
        model_key: &str,
        prompt: &str,
        params: GenerationParams,
    ) -> Result<String> {
        if !supports_generation(model_key) {
            bail!("Model '{model_key}' does not support text generation");
        }
        debug!(model_key, max_new_tokens = params.max_new_tokens, "generate request");
        let resp: GenerateResponse = self
            .post(
                "/generate",
                &GenerateRequest {
                    model_key,
                    prompt,
                    max_new_tokens: params.max_new_tokens,
                    temperature: params.temperature,
                    do_sample: params.do_sample,
                },
            )
            .await?;
        Ok(resp.text)
    }

    async fn translate(
        &self,
        model_key: &str,
        text: &str,
        source_tag: &str,
        target_tag: &str,
    ) -> Result<String> {
        debug!(model_key, source_tag, target_tag, "translate request");
        let resp: TranslateResponse = self
            .post(
                "/translate",
                &TranslateRequest {
                    model_key,
                    text,
                    src_lang: source_tag,
                    tgt_lang: target_tag,
                },
            )
            .await?;
        Ok(resp.translation_text)
    }

    async fn entities(&self, model_key: &str, text: &str) -> Result<Vec<EntitySpan>> {
        debug!(model_key, "ner request");
        let entities: Vec<NerEntity> = self
            .post("/ner", &NerRequest { model_key, text })
            .await?;
        Ok(entities
            .into_iter()
            .map(|e| EntitySpan {
                word: e.word,
                entity_group: e.entity_group,
                score: e.score,
            })
            .collect())
    }
}

#[async_trait]
impl TokenizerProvider for InferenceClient {
    async fn encode(&self, model_key: &str, text: &str, max_length: usize) -> Result<Vec<u32>> {
        let resp: EncodeResponse = self
            .post(
                "/tokenize/encode",
                &EncodeRequest {
                    model_key,
                    text,
                    max_length,
                },
            )
            .await?;
        Ok(resp.token_ids)
    }

    async fn decode(&self, model_key: &str, ids: &[u32]) -> Result<String> {
        let resp: DecodeResponse = self
            .post("/tokenize/decode", &DecodeRequest { model_key, token_ids: ids })
            .await?;
        Ok(resp.text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_url_trailing_slash_is_trimmed() {
        let client = InferenceClient::new("http://localhost:9090/");
        assert_eq!(client.base_url, "http://localhost:9090");
    }

    #[tokio::test]
    async fn generate_refuses_classifier_key() {
        let client = InferenceClient::new("http://localhost:9090");
        let err = client
            .generate(
                crate::registry::SENTIMENT_CLASSIFIER,
                "prompt",
                GenerationParams::default(),
            )
            .await
            .unwrap_err();
        assert!(err.to_string().contains("does not support text generation"));
    }
}
