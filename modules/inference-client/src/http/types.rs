use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize)]
pub struct ClassifyRequest<'a> {
    pub model_key: &'a str,
    pub text: &'a str,
}

#[derive(Debug, Deserialize)]
pub struct ClassifyResponse {
    pub label: String,
    pub score: f32,
}

#[derive(Debug, Serialize)]
pub struct GenerateRequest<'a> {
    pub model_key: &'a str,
    pub prompt: &'a str,
    pub max_new_tokens: u32,
    pub temperature: f32,
    pub do_sample: bool,
}

#[derive(Debug, Deserialize)]
pub struct GenerateResponse {
    pub text: String,
}

#[derive(Debug, Serialize)]
pub struct TranslateRequest<'a> {
    pub model_key: &'a str,
    pub text: &'a str,
    pub src_lang: &'a str,
    pub tgt_lang: &'a str,
}

#[derive(Debug, Deserialize)]
pub struct TranslateResponse {
    pub translation_text: String,
}

#[derive(Debug, Serialize)]
pub struct NerRequest<'a> {
    pub model_key: &'a str,
    pub text: &'a str,
}

#[derive(Debug, Deserialize)]
pub struct NerEntity {
    pub word: String,
    pub entity_group: String,
    pub score: f32,
}

#[derive(Debug, Serialize)]
pub struct EncodeRequest<'a> {
    pub model_key: &'a str,
    pub text: &'a str,
    pub max_length: usize,
}

#[derive(Debug, Deserialize)]
pub struct EncodeResponse {
    pub token_ids: Vec<u32>,
}

#[derive(Debug, Serialize)]
pub struct DecodeRequest<'a> {
    pub model_key: &'a str,
    pub token_ids: &'a [u32],
}

#[derive(Debug, Deserialize)]
pub struct DecodeResponse {
    pub text: String,
}
