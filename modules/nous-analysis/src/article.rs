//! Article analysis orchestrator.
//!
//! Runs the five analyzers over one article body in a fixed order and
//! composes a single result. Each analyzer runs in its own task so a
//! panicking analyzer becomes a labeled error entry instead of aborting
//! the whole article. The fixed order exists only to keep error
//! attribution deterministic in logs.

use std::future::Future;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::{Map, Value};
use tracing::{info, warn};
use uuid::Uuid;

use nous_common::{AiResponse, Article, DetectedBias, ResponseStatus};

use crate::antithesis::{AntithesisGenerator, AntithesisResult};
use crate::cognitive_bias::CognitiveBiasDetector;
use crate::philosophical::PhilosophicalAnalyzer;
use crate::political_bias::{PoliticalBiasDetector, PoliticalBiasResult};
use crate::sentiment::{SentimentAnalyzer, SentimentResult};

/// Keys owned by the analysis result; colliding article fields are
/// dropped so analyzer keys win.
const RESERVED_KEYS: &[&str] = &[
    "id",
    "original_id",
    "content",
    "political_bias",
    "sentiment",
    "cognitive_biases",
    "antithesis",
    "philosophical",
    "analysis_timestamp",
];

/// Unified result of one article analysis. Each analyzer payload is
/// independently nullable; inspect them field by field for
/// partial-success semantics.
#[derive(Debug, Clone, Serialize)]
pub struct ArticleAnalysis {
    pub id: Uuid,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub original_id: Option<String>,
    pub content: String,
    #[serde(flatten)]
    pub article_fields: Map<String, Value>,
    pub political_bias: Option<PoliticalBiasResult>,
    pub sentiment: Option<SentimentResult>,
    pub cognitive_biases: Option<Vec<DetectedBias>>,
    pub antithesis: Option<AntithesisResult>,
    pub philosophical: Option<Map<String, Value>>,
    pub analysis_timestamp: DateTime<Utc>,
}

pub struct ArticleAnalyzer {
    political: Arc<PoliticalBiasDetector>,
    sentiment: Arc<SentimentAnalyzer>,
    cognitive: Arc<CognitiveBiasDetector>,
    antithesis: Arc<AntithesisGenerator>,
    philosophical: Arc<PhilosophicalAnalyzer>,
}

impl ArticleAnalyzer {
    pub fn new(
        political: Arc<PoliticalBiasDetector>,
        sentiment: Arc<SentimentAnalyzer>,
        cognitive: Arc<CognitiveBiasDetector>,
        antithesis: Arc<AntithesisGenerator>,
        philosophical: Arc<PhilosophicalAnalyzer>,
    ) -> Self {
        Self {
            political,
            sentiment,
            cognitive,
            antithesis,
            philosophical,
        }
    }

    /// Analyze one article. Any accumulated sub-analyzer error marks the
    /// whole article `error`, even when the other analyzers succeeded;
    /// callers needing partial results inspect `data` field by field.
    pub async fn analyze(
        &self,
        article: &Article,
        job_id: Option<&str>,
    ) -> AiResponse<ArticleAnalysis> {
        let mut meta = Map::new();
        if let Some(job_id) = job_id {
            meta.insert("job_id".into(), job_id.into());
        }

        let content = article.content.trim().to_string();
        if content.is_empty() {
            return AiResponse::<ArticleAnalysis>::error(vec!["No content provided".into()])
                .with_meta(meta);
        }

        let mut errors: Vec<String> = Vec::new();

        let political = {
            let service = self.political.clone();
            let text = content.clone();
            run_analyzer("political_bias", &mut errors, async move {
                service.detect(&text).await
            })
            .await
        };

        let sentiment = {
            let service = self.sentiment.clone();
            let text = content.clone();
            run_analyzer("sentiment", &mut errors, async move {
                service.analyze(&text).await
            })
            .await
        };

        let cognitive_biases = {
            let service = self.cognitive.clone();
            let text = content.clone();
            run_analyzer("cognitive_biases", &mut errors, async move {
                service.detect(&text, true).await
            })
            .await
        };

        let antithesis = {
            let service = self.antithesis.clone();
            let text = content.clone();
            run_analyzer("antithesis", &mut errors, async move {
                service.generate(&text).await
            })
            .await
        };

        let philosophical = {
            let service = self.philosophical.clone();
            let text = content.clone();
            run_analyzer("philosophical", &mut errors, async move {
                service.analyze(&text).await
            })
            .await
        };

        let mut article_fields = article.extra.clone();
        article_fields.retain(|key, _| !RESERVED_KEYS.contains(&key.as_str()));

        let analysis = ArticleAnalysis {
            id: Uuid::new_v4(),
            original_id: article.id.clone(),
            content,
            article_fields,
            political_bias: political,
            sentiment,
            cognitive_biases,
            antithesis,
            philosophical,
            analysis_timestamp: Utc::now(),
        };

        let status = if errors.is_empty() {
            ResponseStatus::Ok
        } else {
            ResponseStatus::Error
        };

        info!(
            analysis_id = %analysis.id,
            error_count = errors.len(),
            "article analysis complete"
        );

        AiResponse {
            status,
            data: Some(analysis),
            errors: if errors.is_empty() { None } else { Some(errors) },
            meta: Some(meta),
        }
    }
}

/// Run one analyzer in its own task. The analyzer's own errors are
/// merged into the parent list with a label prefix; a panic becomes a
/// labeled error entry instead of propagating.
async fn run_analyzer<T, F>(label: &str, errors: &mut Vec<String>, fut: F) -> Option<T>
where
    T: Send + 'static,
    F: Future<Output = AiResponse<T>> + Send + 'static,
{
    match tokio::spawn(fut).await {
        Ok(response) => {
            if let Some(child_errors) = response.errors {
                errors.extend(child_errors.iter().map(|e| format!("{label}: {e}")));
            }
            response.data
        }
        Err(e) => {
            warn!(label, error = %e, "analyzer task failed");
            errors.push(format!("{label}: internal failure - {e}"));
            None
        }
    }
}
