use thiserror::Error;

/// Failure taxonomy shared by every capability.
///
/// Provider and tokenizer calls return `Result`; services convert
/// failures into envelope error entries instead of propagating them,
/// except for top-level empty-input validation.
#[derive(Error, Debug)]
pub enum AnalysisError {
    #[error("Empty input provided")]
    EmptyInput,

    #[error("Generation error: {0}")]
    Generation(String),

    #[error("Extraction error: {0}")]
    Extraction(String),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Schema error: {0}")]
    Schema(String),

    #[error("Classifier error: {0}")]
    Classifier(String),

    #[error("Translation error: {0}")]
    Translation(String),
}
