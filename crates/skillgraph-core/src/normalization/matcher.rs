//! Matcher cascade: exact lookup, fuzzy similarity, threshold classification
//!
//! The cascade never touches storage. It only reads the registry and decides
//! what should happen to a raw term; the normalizer acts on the decision.

use crate::config::NormalizationConfig;

use super::registry::{SkillRegistry, fold};
use super::similarity::ratio;

/// Outcome of running one raw term through the cascade
#[derive(Debug, Clone, PartialEq)]
pub enum MatchDecision {
    /// Case-insensitive hit on a canonical key or synonym
    Exact(String),
    /// Fuzzy score above the high-confidence threshold
    FuzzyHighConfidence { canonical: String, score: f64 },
    /// Fuzzy score inside the ambiguous band; needs the oracle
    Uncertain { candidate: String, score: f64 },
    /// Nothing close enough; admit as a new canonical skill
    NewSkill { score: f64 },
}

/// Score bands for fuzzy classification
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MatchThresholds {
    /// Scores strictly above this are accepted outright
    pub high_confidence: f64,
    /// Scores at or below this are treated as new skills
    pub uncertain: f64,
}

impl Default for MatchThresholds {
    fn default() -> Self {
        Self {
            high_confidence: 0.85,
            uncertain: 0.6,
        }
    }
}

impl From<&NormalizationConfig> for MatchThresholds {
    fn from(config: &NormalizationConfig) -> Self {
        Self {
            high_confidence: config.high_confidence_threshold,
            uncertain: config.uncertain_threshold,
        }
    }
}

impl MatchThresholds {
    /// Classify the best fuzzy candidate and its score
    pub fn classify(&self, candidate: Option<&str>, score: f64) -> MatchDecision {
        match candidate {
            Some(canonical) if score > self.high_confidence => MatchDecision::FuzzyHighConfidence {
                canonical: canonical.to_string(),
                score,
            },
            Some(candidate) if score > self.uncertain => MatchDecision::Uncertain {
                candidate: candidate.to_string(),
                score,
            },
            _ => MatchDecision::NewSkill { score },
        }
    }
}

/// Exact, case-insensitive match against keys, then synonyms
///
/// Any key match beats any synonym match. Within each pass the
/// earliest-inserted entry wins.
pub fn exact_match<'r>(raw: &str, registry: &'r SkillRegistry) -> Option<&'r str> {
    let folded = fold(raw);

    registry
        .iter()
        .find(|(name, _)| fold(name) == folded)
        .or_else(|| {
            registry
                .iter()
                .find(|(_, entry)| entry.synonyms.iter().any(|s| fold(s) == folded))
        })
        .map(|(name, _)| name)
}

/// Best fuzzy candidate over every key and synonym
///
/// Each entry scores as the best of its key and synonyms; on equal scores the
/// earliest-inserted entry is kept. Returns `(None, 0.0)` for an empty registry.
pub fn fuzzy_match<'r>(raw: &str, registry: &'r SkillRegistry) -> (Option<&'r str>, f64) {
    let folded = fold(raw);
    let mut best: Option<&str> = None;
    let mut best_score = 0.0;

    for (name, entry) in registry.iter() {
        let entry_score = std::iter::once(name)
            .chain(entry.synonyms.iter().map(String::as_str))
            .map(|candidate| ratio(&folded, &fold(candidate)))
            .fold(0.0_f64, f64::max);

        if entry_score > best_score {
            best_score = entry_score;
            best = Some(name);
        }
    }

    (best, best_score)
}

/// The exact → fuzzy → classify decision policy
#[derive(Debug, Clone, Copy, Default)]
pub struct MatcherCascade {
    thresholds: MatchThresholds,
}

impl MatcherCascade {
    pub fn new(thresholds: MatchThresholds) -> Self {
        Self { thresholds }
    }

    pub fn thresholds(&self) -> MatchThresholds {
        self.thresholds
    }

    pub fn decide(&self, raw: &str, registry: &SkillRegistry) -> MatchDecision {
        if let Some(canonical) = exact_match(raw, registry) {
            return MatchDecision::Exact(canonical.to_string());
        }

        let (candidate, score) = fuzzy_match(raw, registry);
        self.thresholds.classify(candidate, score)
    }
}
