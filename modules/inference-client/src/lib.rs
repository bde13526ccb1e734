pub mod http;
pub mod registry;
pub mod traits;

pub use http::InferenceClient;
pub use registry::{spec_for, ModelSpec, ModelTask};
pub use traits::{Classification, EntitySpan, GenerationParams, ModelProvider, TokenizerProvider};
