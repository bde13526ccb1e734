pub mod config;
pub mod envelope;
pub mod error;
pub mod languages;
pub mod types;

pub use config::Config;
pub use envelope::{AiResponse, ResponseStatus};
pub use error::AnalysisError;
pub use languages::{detector_label_to_iso, mt_lang_tag, DEFAULT_LANG};
pub use types::{Article, DetectedBias, PoliticalBias, Sentiment};
