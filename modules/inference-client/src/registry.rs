//! Capability-key registry.
//!
//! Each capability key names a model plus the task it is served for.
//! Keeping the task tagged here lets callers refuse mismatched
//! invocations (e.g. generating text with a classifier) before any
//! request leaves the process.

/// The inference task a model is served for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelTask {
    TextClassification,
    TokenClassification,
    TextGeneration,
    Translation,
}

/// A registered capability: key, task, and the model id the sidecar loads.
#[derive(Debug, Clone, Copy)]
pub struct ModelSpec {
    pub key: &'static str,
    pub task: ModelTask,
    pub model_id: &'static str,
}

/// Instruction-tuned LLM behind the structured-output runner.
pub const INSTRUCT_LLM: &str = "mistral-7b-instruct";
/// Sentiment classifier (secondary vote + cognitive-bias gate).
pub const SENTIMENT_CLASSIFIER: &str = "distilbert-sst2";
/// Political-leaning classifier (secondary vote).
pub const POLITICAL_CLASSIFIER: &str = "political-leaning";
/// Language detector.
pub const LANGUAGE_DETECTOR: &str = "lang-detect";
/// NER tagger for tag extraction.
pub const NER_TAGGER: &str = "bert-ner";
/// Many-to-many MT model.
pub const MT_MODEL: &str = "mbart-translate";

const REGISTRY: &[ModelSpec] = &[
    ModelSpec {
        key: INSTRUCT_LLM,
        task: ModelTask::TextGeneration,
        model_id: "mistralai/Mistral-7B-Instruct-v0.2",
    },
    ModelSpec {
        key: SENTIMENT_CLASSIFIER,
        task: ModelTask::TextClassification,
        model_id: "distilbert-base-uncased-finetuned-sst-2-english",
    },
    ModelSpec {
        key: POLITICAL_CLASSIFIER,
        task: ModelTask::TextClassification,
        model_id: "premsa/political-bias-prediction-allsides-BERT",
    },
    ModelSpec {
        key: LANGUAGE_DETECTOR,
        task: ModelTask::TextClassification,
        model_id: "papluca/xlm-roberta-base-language-detection",
    },
    ModelSpec {
        key: NER_TAGGER,
        task: ModelTask::TokenClassification,
        model_id: "dslim/bert-base-NER",
    },
    ModelSpec {
        key: MT_MODEL,
        task: ModelTask::Translation,
        model_id: "facebook/mbart-large-50-many-to-many-mmt",
    },
];

/// Look up a capability key. Unknown keys are passed through to the
/// sidecar untyped, so `None` is not necessarily an error.
pub fn spec_for(key: &str) -> Option<&'static ModelSpec> {
    REGISTRY.iter().find(|spec| spec.key == key)
}

/// Whether a key is registered for text generation. Unknown keys are
/// assumed generative so custom sidecar models still work.
pub fn supports_generation(key: &str) -> bool {
    match spec_for(key) {
        Some(spec) => spec.task == ModelTask::TextGeneration,
        None => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registered_keys_resolve() {
        let spec = spec_for(INSTRUCT_LLM).unwrap();
        assert_eq!(spec.task, ModelTask::TextGeneration);
        let spec = spec_for(NER_TAGGER).unwrap();
        assert_eq!(spec.task, ModelTask::TokenClassification);
    }

    #[test]
    fn classifier_does_not_support_generation() {
        assert!(!supports_generation(SENTIMENT_CLASSIFIER));
        assert!(supports_generation(INSTRUCT_LLM));
        assert!(supports_generation("custom-model"));
    }
}
