use anyhow::Result;
use async_trait::async_trait;

// =============================================================================
// Provider Types
// =============================================================================

/// Single-label classification result.
#[derive(Debug, Clone)]
pub struct Classification {
    pub label: String,
    pub score: f32,
}

/// One entity found by a token-classification model.
#[derive(Debug, Clone)]
pub struct EntitySpan {
    pub word: String,
    pub entity_group: String,
    pub score: f32,
}

/// Decoding parameters for text generation.
#[derive(Debug, Clone, Copy)]
pub struct GenerationParams {
    pub max_new_tokens: u32,
    pub temperature: f32,
    pub do_sample: bool,
}

impl Default for GenerationParams {
    fn default() -> Self {
        Self {
            max_new_tokens: 256,
            temperature: 0.0,
            do_sample: false,
        }
    }
}

// =============================================================================
// ModelProvider Trait
// =============================================================================

/// Black-box access to model inference. Every call is synchronous from the
/// caller's point of view and may fail; callers decide whether a failure is
/// fatal or a degrade path.
#[async_trait]
pub trait ModelProvider: Send + Sync {
    /// Run a text-classification model, returning its top label and score.
    async fn classify(&self, model_key: &str, text: &str) -> Result<Classification>;

    /// Run an instruction-tuned generative model on a fully-rendered prompt.
    async fn generate(&self, model_key: &str, prompt: &str, params: GenerationParams)
        -> Result<String>;

    /// Run a sequence-to-sequence translation model with model-specific
    /// source/target language tags.
    async fn translate(
        &self,
        model_key: &str,
        text: &str,
        source_tag: &str,
        target_tag: &str,
    ) -> Result<String>;

    /// Run a token-classification (NER) model, returning grouped entities.
    async fn entities(&self, model_key: &str, text: &str) -> Result<Vec<EntitySpan>>;
}

// =============================================================================
// TokenizerProvider Trait
// =============================================================================

/// Tokenizer access, used purely to truncate text to model input windows.
#[async_trait]
pub trait TokenizerProvider: Send + Sync {
    /// Encode text into token ids, truncated to `max_length`.
    async fn encode(&self, model_key: &str, text: &str, max_length: usize) -> Result<Vec<u32>>;

    /// Decode token ids back into text, skipping special tokens.
    async fn decode(&self, model_key: &str, ids: &[u32]) -> Result<String>;
}
