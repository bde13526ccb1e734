//! Test doubles for the provider and tokenizer seams.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use anyhow::{anyhow, Result};
use async_trait::async_trait;

use inference_client::{
    Classification, EntitySpan, GenerationParams, ModelProvider, TokenizerProvider,
};

/// In-memory `ModelProvider` with canned outputs, per-method failure
/// injection, and invocation counters.
#[derive(Default)]
pub struct MockProvider {
    /// Fallback generation output when no rule matches.
    generation_output: Mutex<Option<String>>,
    /// (prompt substring, output) rules checked in order.
    generation_rules: Mutex<Vec<(String, String)>>,
    /// Classification results keyed by model key.
    classifications: Mutex<HashMap<String, Classification>>,
    entity_output: Mutex<Vec<EntitySpan>>,
    /// Echo translation: "text" -> "text [target_tag]".
    echo_translations: bool,
    fail_generate: bool,
    fail_classify: bool,
    fail_translate: bool,
    fail_entities: bool,
    panic_on_classify: bool,
    generate_count: AtomicUsize,
    classify_count: AtomicUsize,
    translate_count: AtomicUsize,
    entities_count: AtomicUsize,
}

impl MockProvider {
    pub fn new() -> Self {
        Self {
            echo_translations: true,
            ..Self::default()
        }
    }

    /// Fixed output for every `generate` call.
    pub fn with_generation(self, output: &str) -> Self {
        *self.generation_output.lock().unwrap() = Some(output.to_string());
        self
    }

    /// Route `generate` by prompt substring; first matching rule wins.
    pub fn with_generation_rule(self, prompt_contains: &str, output: &str) -> Self {
        self.generation_rules
            .lock()
            .unwrap()
            .push((prompt_contains.to_string(), output.to_string()));
        self
    }

    /// Canned classification for a model key.
    pub fn with_classification(self, model_key: &str, label: &str, score: f32) -> Self {
        self.classifications.lock().unwrap().insert(
            model_key.to_string(),
            Classification {
                label: label.to_string(),
                score,
            },
        );
        self
    }

    pub fn with_entities(self, entities: Vec<EntitySpan>) -> Self {
        *self.entity_output.lock().unwrap() = entities;
        self
    }

    /// All methods fail.
    pub fn failing(mut self) -> Self {
        self.fail_generate = true;
        self.fail_classify = true;
        self.fail_translate = true;
        self.fail_entities = true;
        self
    }

    pub fn failing_generate(mut self) -> Self {
        self.fail_generate = true;
        self
    }

    pub fn failing_classify(mut self) -> Self {
        self.fail_classify = true;
        self
    }

    pub fn failing_translate(mut self) -> Self {
        self.fail_translate = true;
        self
    }

    /// `classify` panics instead of returning. Exercises panic isolation.
    pub fn panicking_classify(mut self) -> Self {
        self.panic_on_classify = true;
        self
    }

    pub fn generate_calls(&self) -> usize {
        self.generate_count.load(Ordering::SeqCst)
    }

    pub fn classify_calls(&self) -> usize {
        self.classify_count.load(Ordering::SeqCst)
    }

    pub fn translate_calls(&self) -> usize {
        self.translate_count.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ModelProvider for MockProvider {
    async fn classify(&self, model_key: &str, _text: &str) -> Result<Classification> {
        self.classify_count.fetch_add(1, Ordering::SeqCst);
        if self.panic_on_classify {
            panic!("mock classifier panicked");
        }
        if self.fail_classify {
            return Err(anyhow!("mock classifier failure"));
        }
        self.classifications
            .lock()
            .unwrap()
            .get(model_key)
            .cloned()
            .ok_or_else(|| anyhow!("no canned classification for '{model_key}'"))
    }

    async fn generate(
        &self,
        _model_key: &str,
        prompt: &str,
        _params: GenerationParams,
    ) -> Result<String> {
        self.generate_count.fetch_add(1, Ordering::SeqCst);
        if self.fail_generate {
            return Err(anyhow!("mock generator failure"));
        }
        for (needle, output) in self.generation_rules.lock().unwrap().iter() {
            if prompt.contains(needle.as_str()) {
                return Ok(output.clone());
            }
        }
        self.generation_output
            .lock()
            .unwrap()
            .clone()
            .ok_or_else(|| anyhow!("no canned generation output"))
    }

    async fn translate(
        &self,
        _model_key: &str,
        text: &str,
        _source_tag: &str,
        target_tag: &str,
    ) -> Result<String> {
        self.translate_count.fetch_add(1, Ordering::SeqCst);
        if self.fail_translate {
            return Err(anyhow!("mock translator failure"));
        }
        if self.echo_translations {
            Ok(format!("{text} [{target_tag}]"))
        } else {
            Ok(text.to_string())
        }
    }

    async fn entities(&self, _model_key: &str, _text: &str) -> Result<Vec<EntitySpan>> {
        self.entities_count.fetch_add(1, Ordering::SeqCst);
        if self.fail_entities {
            return Err(anyhow!("mock ner failure"));
        }
        Ok(self.entity_output.lock().unwrap().clone())
    }
}

/// Whitespace tokenizer with an on-demand vocabulary. Encoding lowercases
/// and splits on whitespace; decoding joins with single spaces, so
/// round-trips preserve words modulo case and spacing.
#[derive(Default)]
pub struct WhitespaceTokenizer {
    vocab: Mutex<(HashMap<String, u32>, Vec<String>)>,
}

impl WhitespaceTokenizer {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl TokenizerProvider for WhitespaceTokenizer {
    async fn encode(&self, _model_key: &str, text: &str, max_length: usize) -> Result<Vec<u32>> {
        let mut vocab = self.vocab.lock().unwrap();
        let mut ids = Vec::new();
        for word in text.split_whitespace().take(max_length) {
            let word = word.to_lowercase();
            let next_id = vocab.1.len() as u32;
            let id = *vocab.0.entry(word.clone()).or_insert(next_id);
            if id == next_id {
                vocab.1.push(word);
            }
            ids.push(id);
        }
        Ok(ids)
    }

    async fn decode(&self, _model_key: &str, ids: &[u32]) -> Result<String> {
        let vocab = self.vocab.lock().unwrap();
        let words: Vec<&str> = ids
            .iter()
            .filter_map(|&id| vocab.1.get(id as usize).map(String::as_str))
            .collect();
        Ok(words.join(" "))
    }
}
