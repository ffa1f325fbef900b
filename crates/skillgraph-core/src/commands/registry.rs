//! Registry inspection and curation commands

use serde::Serialize;

use crate::error::{Error, Result};
use crate::normalization::{
    RegistryEntry, SkillCategory, SkillNormalizer, SkillRegistry, exact_match,
};

/// A canonical skill as shown to users
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkillSummary {
    pub name: String,
    pub category: SkillCategory,
    pub synonyms: Vec<String>,
}

impl SkillSummary {
    fn from_entry(name: &str, entry: &RegistryEntry) -> Self {
        Self {
            name: name.to_string(),
            category: entry.category,
            synonyms: entry.synonyms.clone(),
        }
    }
}

/// List canonical skills in registry order, optionally filtered by category
pub async fn list_skills(
    normalizer: &SkillNormalizer,
    category: Option<SkillCategory>,
) -> Result<Vec<SkillSummary>> {
    let registry = normalizer.registry().await?;
    Ok(summaries(&registry, category))
}

fn summaries(registry: &SkillRegistry, category: Option<SkillCategory>) -> Vec<SkillSummary> {
    registry
        .iter()
        .filter(|(_, entry)| category.is_none_or(|c| entry.category == c))
        .map(|(name, entry)| SkillSummary::from_entry(name, entry))
        .collect()
}

/// Look up a skill by canonical name or any synonym
pub async fn show_skill(normalizer: &SkillNormalizer, name: &str) -> Result<SkillSummary> {
    let registry = normalizer.registry().await?;
    exact_match(name, &registry)
        .and_then(|canonical| {
            registry
                .get(canonical)
                .map(|entry| SkillSummary::from_entry(canonical, entry))
        })
        .ok_or_else(|| Error::SkillNotFound(name.trim().to_string()))
}

/// Result of [`add_skill`]
#[derive(Debug, Clone, Serialize)]
pub struct AddSkillOutcome {
    pub skill: SkillSummary,
    /// False when the skill and every synonym were already present
    pub changed: bool,
}

/// Add a canonical skill, or extend an existing one with synonyms
pub async fn add_skill(
    normalizer: &SkillNormalizer,
    name: &str,
    category: SkillCategory,
    synonyms: &[String],
) -> Result<AddSkillOutcome> {
    if name.trim().is_empty() {
        return Err(Error::InvalidInput("Skill name cannot be empty".to_string()));
    }

    let (canonical, changed) = normalizer.add_canonical(name, category, synonyms).await?;
    let skill = show_skill(normalizer, &canonical).await?;
    Ok(AddSkillOutcome { skill, changed })
}
