//! End-to-end exercise of the analysis services against mock providers.

use std::sync::Arc;

use nous_analysis::testing::{MockProvider, WhitespaceTokenizer};
use nous_analysis::{
    AntithesisGenerator, ArticleAnalyzer, CognitiveBiasDetector, JsonRunner,
    PhilosophicalAnalyzer, PoliticalBiasDetector, SentimentAnalyzer, Summarizer,
    TranslationService,
};
use nous_common::{Article, PoliticalBias, ResponseStatus, Sentiment};

use inference_client::registry::{
    LANGUAGE_DETECTOR, POLITICAL_CLASSIFIER, SENTIMENT_CLASSIFIER,
};

fn full_provider() -> MockProvider {
    MockProvider::new()
        .with_classification(SENTIMENT_CLASSIFIER, "POSITIVE", 0.92)
        .with_classification(POLITICAL_CLASSIFIER, "center", 0.88)
        .with_classification(LANGUAGE_DETECTOR, "english", 0.99)
        .with_generation_rule(
            "sentiment analysis system",
            r#"{"sentiment":"positive","confidence":0.9}"#,
        )
        .with_generation_rule("political bias classification", r#"{"bias":"center"}"#)
        .with_generation_rule(
            "cognitive bias detection",
            r#"{"biases":[{"bias":"optimism bias","severity":"medium"}]}"#,
        )
        .with_generation_rule(
            "counter-narrative",
            r#"{"antithesis":"Others argue the launch mainly benefits shareholders."}"#,
        )
        .with_generation_rule(
            "philosophical analysis",
            r#"{"philosophical_summary":"Novelty as value.","themes":["innovation"],"worldview":"materialist"}"#,
        )
        .with_generation_rule("news summarization system", r#"{"summary":"Acme shipped a product."}"#)
}

struct Stack {
    provider: Arc<MockProvider>,
    tokenizer: Arc<WhitespaceTokenizer>,
    runner: Arc<JsonRunner>,
}

fn stack(provider: MockProvider) -> Stack {
    let provider = Arc::new(provider);
    let runner = Arc::new(JsonRunner::new(provider.clone()));
    Stack {
        provider,
        tokenizer: Arc::new(WhitespaceTokenizer::new()),
        runner,
    }
}

#[tokio::test]
async fn article_analysis_composes_all_five_analyzers() {
    let s = stack(full_provider());

    let analyzer = ArticleAnalyzer::new(
        Arc::new(PoliticalBiasDetector::new(
            s.provider.clone(),
            s.tokenizer.clone(),
            s.runner.clone(),
        )),
        Arc::new(SentimentAnalyzer::new(
            s.provider.clone(),
            s.tokenizer.clone(),
            s.runner.clone(),
        )),
        Arc::new(CognitiveBiasDetector::new(
            s.provider.clone(),
            s.tokenizer.clone(),
            s.runner.clone(),
        )),
        Arc::new(AntithesisGenerator::new(
            s.provider.clone(),
            s.tokenizer.clone(),
            s.runner.clone(),
        )),
        Arc::new(PhilosophicalAnalyzer::new(s.runner.clone())),
    );

    let article = Article {
        id: Some("wire-123".into()),
        content: "The company announced a new product.".into(),
        extra: serde_json::Map::new(),
    };

    let resp = analyzer.analyze(&article, Some("job-1")).await;

    assert_eq!(resp.status, ResponseStatus::Ok);
    assert!(resp.errors.is_none());

    let data = resp.data.unwrap();
    assert_eq!(data.original_id.as_deref(), Some("wire-123"));
    assert_eq!(
        data.political_bias.unwrap().political_bias,
        PoliticalBias::Center
    );
    assert_eq!(data.sentiment.unwrap().sentiment, Sentiment::Positive);
    assert_eq!(data.cognitive_biases.unwrap()[0].bias, "optimism bias");
    assert!(data.antithesis.unwrap().antithesis.contains("shareholders"));
    assert_eq!(data.philosophical.unwrap()["worldview"], "materialist");
}

#[tokio::test]
async fn prompt_cache_is_shared_across_services() {
    let s = stack(full_provider());

    let summarizer = Summarizer::new(s.runner.clone());

    let first = summarizer.summarize("Same text, same prompt.").await;
    let second = summarizer.summarize("Same text, same prompt.").await;

    assert_eq!(first.status, ResponseStatus::Ok);
    assert_eq!(second.status, ResponseStatus::Ok);
    // Identical prompt hashed to the same cache entry: one model call.
    assert_eq!(s.provider.generate_calls(), 1);
}

#[tokio::test]
async fn translation_round_trips_through_detection_and_mt() {
    let s = stack(full_provider());

    let translator = TranslationService::new(
        s.provider.clone(),
        s.tokenizer.clone(),
        s.runner.clone(),
        "en",
    );

    // Same language: untouched.
    let resp = translator.translate("Hello", Some("en")).await;
    assert_eq!(resp.data.unwrap().translation, "Hello");
    assert_eq!(resp.meta.unwrap()["method"], "noop");

    // Different language: sentence-wise MT through the mock.
    let resp = translator.translate("Hello there.", Some("de")).await;
    assert_eq!(resp.status, ResponseStatus::Ok);
    assert!(resp.data.unwrap().translation.contains("[de_DE]"));
    assert_eq!(s.provider.translate_calls(), 1);
}
