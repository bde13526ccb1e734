use std::fmt;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Resolved sentiment label. `Unknown` means the ensemble could not
/// commit to a polarity with enough confidence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sentiment {
    Positive,
    Neutral,
    Negative,
    Unknown,
}

impl Sentiment {
    pub fn as_str(&self) -> &'static str {
        match self {
            Sentiment::Positive => "positive",
            Sentiment::Neutral => "neutral",
            Sentiment::Negative => "negative",
            Sentiment::Unknown => "unknown",
        }
    }

    pub fn parse(label: &str) -> Option<Self> {
        match label {
            "positive" => Some(Sentiment::Positive),
            "neutral" => Some(Sentiment::Neutral),
            "negative" => Some(Sentiment::Negative),
            _ => None,
        }
    }

    /// Numeric polarity used by the weighted ensemble.
    pub fn polarity(&self) -> Option<f32> {
        match self {
            Sentiment::Negative => Some(-1.0),
            Sentiment::Neutral => Some(0.0),
            Sentiment::Positive => Some(1.0),
            Sentiment::Unknown => None,
        }
    }
}

impl fmt::Display for Sentiment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Resolved political-bias label. `Uncertain` is part of the answer
/// vocabulary, not a failure state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PoliticalBias {
    Left,
    Center,
    Right,
    Uncertain,
}

impl PoliticalBias {
    pub fn as_str(&self) -> &'static str {
        match self {
            PoliticalBias::Left => "left",
            PoliticalBias::Center => "center",
            PoliticalBias::Right => "right",
            PoliticalBias::Uncertain => "uncertain",
        }
    }

    pub fn parse(label: &str) -> Option<Self> {
        match label {
            "left" => Some(PoliticalBias::Left),
            "center" => Some(PoliticalBias::Center),
            "right" => Some(PoliticalBias::Right),
            _ => None,
        }
    }
}

impl fmt::Display for PoliticalBias {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One cognitive bias found in a text sample.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct DetectedBias {
    /// Bias name, e.g. "confirmation bias"
    pub bias: String,
    /// The passage the bias was detected in
    pub snippet: Option<String>,
    pub explanation: Option<String>,
    /// "low", "medium", or "high"
    pub severity: Option<String>,
    pub category: Option<String>,
}

/// Input to article analysis. Unrecognized fields ride along in `extra`
/// and are merged back into the analysis result.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Article {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default)]
    pub content: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}
