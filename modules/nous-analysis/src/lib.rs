pub mod antithesis;
pub mod article;
pub mod cognitive_bias;
pub mod ensemble;
pub mod normalize;
pub mod philosophical;
pub mod political_bias;
pub mod prompts;
pub mod runner;
pub mod sentiment;
pub mod summarization;
pub mod tags;
pub mod translate;

#[cfg(any(test, feature = "test-support"))]
pub mod testing;

pub use antithesis::{AntithesisGenerator, AntithesisResult};
pub use article::{ArticleAnalysis, ArticleAnalyzer};
pub use cognitive_bias::CognitiveBiasDetector;
pub use normalize::{NormalizePipeline, NormalizedArticle, NormalizedTranslatedArticle};
pub use philosophical::PhilosophicalAnalyzer;
pub use political_bias::{PoliticalBiasDetector, PoliticalBiasResult};
pub use runner::{JsonRequest, JsonRunner};
pub use sentiment::{SentimentAnalyzer, SentimentResult};
pub use summarization::{Summarizer, SummaryResult};
pub use tags::TagExtractor;
pub use translate::{LanguageResult, TranslationResult, TranslationService};
