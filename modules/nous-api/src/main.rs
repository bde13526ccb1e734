use std::sync::Arc;

use anyhow::Result;
use axum::{
    routing::{get, post},
    Router,
};
use tower_http::trace::TraceLayer;
use tracing::info;
use tracing_subscriber::EnvFilter;

use inference_client::InferenceClient;
use nous_analysis::{
    AntithesisGenerator, ArticleAnalyzer, CognitiveBiasDetector, JsonRunner, NormalizePipeline,
    PhilosophicalAnalyzer, PoliticalBiasDetector, SentimentAnalyzer, Summarizer, TagExtractor,
    TranslationService,
};
use nous_common::Config;

mod rest;

use rest::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("nous=info".parse()?))
        .init();

    info!("nous analysis service starting...");

    let config = Config::from_env();

    let mut client = InferenceClient::new(&config.inference_url);
    if let Some(ref key) = config.inference_api_key {
        client = client.with_api_key(key);
    }
    let client = Arc::new(client);

    let provider: Arc<dyn inference_client::ModelProvider> = client.clone();
    let tokenizer: Arc<dyn inference_client::TokenizerProvider> = client.clone();
    let runner = Arc::new(JsonRunner::new(provider.clone()));

    let political = Arc::new(PoliticalBiasDetector::new(
        provider.clone(),
        tokenizer.clone(),
        runner.clone(),
    ));
    let sentiment = Arc::new(SentimentAnalyzer::new(
        provider.clone(),
        tokenizer.clone(),
        runner.clone(),
    ));
    let cognitive = Arc::new(CognitiveBiasDetector::new(
        provider.clone(),
        tokenizer.clone(),
        runner.clone(),
    ));
    let antithesis = Arc::new(AntithesisGenerator::new(
        provider.clone(),
        tokenizer.clone(),
        runner.clone(),
    ));
    let philosophical = Arc::new(PhilosophicalAnalyzer::new(runner.clone()));
    let summarizer = Arc::new(Summarizer::new(runner.clone()));
    let tags = Arc::new(TagExtractor::new(provider.clone(), tokenizer.clone()));
    let translator = Arc::new(TranslationService::new(
        provider.clone(),
        tokenizer.clone(),
        runner.clone(),
        &config.default_language,
    ));

    let state = Arc::new(AppState {
        article: ArticleAnalyzer::new(
            political.clone(),
            sentiment.clone(),
            cognitive.clone(),
            antithesis.clone(),
            philosophical.clone(),
        ),
        political,
        sentiment,
        cognitive,
        antithesis,
        philosophical,
        summarizer: summarizer.clone(),
        tags: tags.clone(),
        translator: translator.clone(),
        normalize: NormalizePipeline::new(summarizer, tags, translator),
        client,
    });

    let app = Router::new()
        // Health check
        .route("/", get(|| async { "ok" }))
        // Article analysis
        .route("/analyze", post(rest::route_analyze))
        // Single capabilities
        .route("/sentiment", post(rest::route_sentiment))
        .route("/political-bias", post(rest::route_political_bias))
        .route("/cognitive-bias", post(rest::route_cognitive_bias))
        .route("/antithesis", post(rest::route_antithesis))
        .route("/philosophical", post(rest::route_philosophical))
        .route("/summarize", post(rest::route_summarize))
        .route("/tags", post(rest::route_tags))
        // Language
        .route("/detect-language", post(rest::route_detect_language))
        .route("/translate", post(rest::route_translate))
        // Normalization pipelines
        .route("/normalize", post(rest::route_normalize))
        .route("/normalize-translate", post(rest::route_normalize_translate))
        // Model warmup
        .route("/prefetch", post(rest::route_prefetch))
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    let addr = format!("{}:{}", config.api_host, config.api_port);
    info!(addr = addr.as_str(), "listening");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
