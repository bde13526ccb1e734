//! Ensemble vote resolution.
//!
//! Two independent methods vote on every ensemble capability: a
//! constrained-generation prompt and a classical classifier. Their
//! failure modes are uncorrelated (prompt brittleness vs. domain shift),
//! so a final label is only committed when the votes agree or carry
//! enough combined confidence.

use serde::Serialize;

use nous_common::{PoliticalBias, Sentiment};

/// One method's vote: a value on the shared scale plus its confidence.
/// Transient; exists only inside one resolution computation.
#[derive(Debug, Clone, Copy)]
pub struct Vote {
    pub value: f32,
    pub confidence: f32,
}

/// Why the final label was chosen. Surfaced in `meta.reason`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ResolutionReason {
    LowTotalConfidence,
    NearZeroScore,
    PositiveWeighted,
    NegativeWeighted,
    LowConfidence,
    EnsembleAgreement,
    EnsembleDisagreement,
    ClassifierOnly,
    LlmOnly,
    NoVotes,
}

impl ResolutionReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResolutionReason::LowTotalConfidence => "low_total_confidence",
            ResolutionReason::NearZeroScore => "near_zero_score",
            ResolutionReason::PositiveWeighted => "positive_weighted",
            ResolutionReason::NegativeWeighted => "negative_weighted",
            ResolutionReason::LowConfidence => "low_confidence",
            ResolutionReason::EnsembleAgreement => "ensemble_agreement",
            ResolutionReason::EnsembleDisagreement => "ensemble_disagreement",
            ResolutionReason::ClassifierOnly => "classifier_only",
            ResolutionReason::LlmOnly => "llm_only",
            ResolutionReason::NoVotes => "no_votes",
        }
    }
}

/// Fixed method weights for the polarity ensemble.
#[derive(Debug, Clone, Copy)]
pub struct PolarityWeights {
    pub primary: f32,
    pub secondary: f32,
}

pub const DEFAULT_POLARITY_WEIGHTS: PolarityWeights = PolarityWeights {
    primary: 0.6,
    secondary: 0.4,
};

/// Outcome of a polarity resolution.
#[derive(Debug, Clone, Copy)]
pub struct PolarityOutcome {
    pub label: Sentiment,
    pub reason: ResolutionReason,
    /// Confidence-normalized score, absent when total confidence was too low.
    pub score: Option<f32>,
}

/// Confidence-weighted combination of up to two polarity votes.
///
/// `weighted = Σ value·confidence·weight`, `total = Σ confidence·weight`.
/// A total below `confidence_threshold` yields `Unknown`; a normalized
/// score inside `neutral_margin` of zero yields `Neutral`; otherwise the
/// sign decides.
pub fn resolve_polarity(
    primary: Option<Vote>,
    secondary: Option<Vote>,
    weights: PolarityWeights,
    confidence_threshold: f32,
    neutral_margin: f32,
) -> PolarityOutcome {
    let mut weighted_score = 0.0_f32;
    let mut total_weight = 0.0_f32;

    if let Some(vote) = primary {
        weighted_score += vote.value * vote.confidence * weights.primary;
        total_weight += vote.confidence * weights.primary;
    }
    if let Some(vote) = secondary {
        weighted_score += vote.value * vote.confidence * weights.secondary;
        total_weight += vote.confidence * weights.secondary;
    }

    if total_weight < confidence_threshold {
        return PolarityOutcome {
            label: Sentiment::Unknown,
            reason: ResolutionReason::LowTotalConfidence,
            score: None,
        };
    }

    let normalized = weighted_score / total_weight;

    let (label, reason) = if normalized.abs() < neutral_margin {
        (Sentiment::Neutral, ResolutionReason::NearZeroScore)
    } else if normalized > 0.0 {
        (Sentiment::Positive, ResolutionReason::PositiveWeighted)
    } else {
        (Sentiment::Negative, ResolutionReason::NegativeWeighted)
    };

    PolarityOutcome {
        label,
        reason,
        score: Some(normalized),
    }
}

/// Outcome of a categorical resolution.
#[derive(Debug, Clone, Copy)]
pub struct CategoricalOutcome {
    pub label: PoliticalBias,
    pub reason: ResolutionReason,
}

/// Categorical resolution for the political-bias ensemble.
///
/// A present classifier vote below `confidence_threshold` forces
/// `Uncertain` regardless of the generative vote. Otherwise: agreement
/// wins, disagreement is `Uncertain`, a lone vote stands on its own.
pub fn resolve_categorical(
    llm: Option<PoliticalBias>,
    classifier: Option<(PoliticalBias, f32)>,
    confidence_threshold: f32,
) -> CategoricalOutcome {
    match (llm, classifier) {
        (_, Some((_, confidence))) if confidence < confidence_threshold => CategoricalOutcome {
            label: PoliticalBias::Uncertain,
            reason: ResolutionReason::LowConfidence,
        },
        (Some(llm_label), Some((clf_label, _))) if llm_label == clf_label => CategoricalOutcome {
            label: llm_label,
            reason: ResolutionReason::EnsembleAgreement,
        },
        (Some(_), Some(_)) => CategoricalOutcome {
            label: PoliticalBias::Uncertain,
            reason: ResolutionReason::EnsembleDisagreement,
        },
        (None, Some((clf_label, _))) => CategoricalOutcome {
            label: clf_label,
            reason: ResolutionReason::ClassifierOnly,
        },
        (Some(llm_label), None) => CategoricalOutcome {
            label: llm_label,
            reason: ResolutionReason::LlmOnly,
        },
        (None, None) => CategoricalOutcome {
            label: PoliticalBias::Uncertain,
            reason: ResolutionReason::NoVotes,
        },
    }
}
