use std::sync::Arc;

use axum::{
    extract::State,
    response::Json,
};
use serde::Deserialize;
use serde_json::{Map, Value};
use tracing::warn;

use inference_client::InferenceClient;
use nous_analysis::{
    AntithesisGenerator, AntithesisResult, ArticleAnalysis, ArticleAnalyzer,
    CognitiveBiasDetector, NormalizePipeline, NormalizedArticle, NormalizedTranslatedArticle,
    PhilosophicalAnalyzer, PoliticalBiasDetector, PoliticalBiasResult, SentimentAnalyzer,
    SentimentResult, Summarizer, SummaryResult, TagExtractor, TranslationService,
    LanguageResult, TranslationResult,
};
use nous_common::{AiResponse, Article, DetectedBias};

pub struct AppState {
    pub article: ArticleAnalyzer,
    pub political: Arc<PoliticalBiasDetector>,
    pub sentiment: Arc<SentimentAnalyzer>,
    pub cognitive: Arc<CognitiveBiasDetector>,
    pub antithesis: Arc<AntithesisGenerator>,
    pub philosophical: Arc<PhilosophicalAnalyzer>,
    pub summarizer: Arc<Summarizer>,
    pub tags: Arc<TagExtractor>,
    pub translator: Arc<TranslationService>,
    pub normalize: NormalizePipeline,
    pub client: Arc<InferenceClient>,
}

// --- Request payloads ---

#[derive(Deserialize)]
pub struct TextInput {
    pub text: String,
}

#[derive(Deserialize)]
pub struct CognitiveBiasInput {
    pub text: String,
    #[serde(default = "default_true")]
    pub use_generative_stage: bool,
}

fn default_true() -> bool {
    true
}

#[derive(Deserialize)]
pub struct ArticleInput {
    #[serde(flatten)]
    pub article: Article,
    pub job_id: Option<String>,
}

#[derive(Deserialize)]
pub struct TranslateInput {
    pub text: String,
    pub target_language: Option<String>,
}

#[derive(Deserialize)]
pub struct NormalizeInput {
    pub html: String,
}

#[derive(Deserialize)]
pub struct NormalizeTranslateInput {
    pub html: String,
    #[serde(default = "default_language")]
    pub target_language: String,
}

fn default_language() -> String {
    "en".to_string()
}

// --- Handlers ---

pub async fn route_analyze(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<ArticleInput>,
) -> Json<AiResponse<ArticleAnalysis>> {
    Json(
        state
            .article
            .analyze(&payload.article, payload.job_id.as_deref())
            .await,
    )
}

pub async fn route_sentiment(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<TextInput>,
) -> Json<AiResponse<SentimentResult>> {
    Json(state.sentiment.analyze(&payload.text).await)
}

pub async fn route_political_bias(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<TextInput>,
) -> Json<AiResponse<PoliticalBiasResult>> {
    Json(state.political.detect(&payload.text).await)
}

pub async fn route_cognitive_bias(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<CognitiveBiasInput>,
) -> Json<AiResponse<Vec<DetectedBias>>> {
    Json(
        state
            .cognitive
            .detect(&payload.text, payload.use_generative_stage)
            .await,
    )
}

pub async fn route_antithesis(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<TextInput>,
) -> Json<AiResponse<AntithesisResult>> {
    Json(state.antithesis.generate(&payload.text).await)
}

pub async fn route_philosophical(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<TextInput>,
) -> Json<AiResponse<Map<String, Value>>> {
    Json(state.philosophical.analyze(&payload.text).await)
}

pub async fn route_summarize(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<TextInput>,
) -> Json<AiResponse<SummaryResult>> {
    Json(state.summarizer.summarize(&payload.text).await)
}

pub async fn route_tags(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<TextInput>,
) -> Json<AiResponse<Vec<String>>> {
    Json(state.tags.extract(&payload.text).await)
}

pub async fn route_detect_language(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<TextInput>,
) -> Json<AiResponse<LanguageResult>> {
    Json(state.translator.detect_language(&payload.text).await)
}

pub async fn route_translate(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<TranslateInput>,
) -> Json<AiResponse<TranslationResult>> {
    Json(
        state
            .translator
            .translate(&payload.text, payload.target_language.as_deref())
            .await,
    )
}

pub async fn route_normalize(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<NormalizeInput>,
) -> Json<AiResponse<NormalizedArticle>> {
    Json(state.normalize.normalize_article(&payload.html).await)
}

pub async fn route_normalize_translate(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<NormalizeTranslateInput>,
) -> Json<AiResponse<NormalizedTranslatedArticle>> {
    Json(
        state
            .normalize
            .normalize_and_translate(&payload.html, &payload.target_language)
            .await,
    )
}

pub async fn route_prefetch(State(state): State<Arc<AppState>>) -> Json<AiResponse<Value>> {
    match state.client.prefetch().await {
        Ok(()) => Json(AiResponse::ok(Value::String("prefetch complete".into()))),
        Err(e) => {
            warn!(error = %e, "prefetch failed");
            Json(AiResponse::error(vec![e.to_string()]))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cognitive_bias_input_defaults_generative_stage_on() {
        let input: CognitiveBiasInput =
            serde_json::from_str(r#"{"text":"some text"}"#).unwrap();
        assert!(input.use_generative_stage);

        let input: CognitiveBiasInput =
            serde_json::from_str(r#"{"text":"some text","use_generative_stage":false}"#).unwrap();
        assert!(!input.use_generative_stage);
    }

    #[test]
    fn article_input_flattens_article_fields() {
        let input: ArticleInput = serde_json::from_str(
            r#"{"id":"a-9","content":"Body text","author":"sam","job_id":"j-1"}"#,
        )
        .unwrap();
        assert_eq!(input.article.id.as_deref(), Some("a-9"));
        assert_eq!(input.article.content, "Body text");
        assert_eq!(input.article.extra["author"], "sam");
        assert_eq!(input.job_id.as_deref(), Some("j-1"));
    }

    #[test]
    fn normalize_translate_input_defaults_target_language() {
        let input: NormalizeTranslateInput =
            serde_json::from_str(r#"{"html":"<p>hi</p>"}"#).unwrap();
        assert_eq!(input.target_language, "en");
    }
}
