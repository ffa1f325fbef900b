//! Batch resolution of uncertain terms
//!
//! All uncertain terms from one normalization call go to the oracle in a
//! single round trip. Replies are validated here: anything other than a known
//! canonical name counts as a new skill, and a reply that cannot be parsed at
//! all turns the whole batch into new skills. Vocabulary may grow by a
//! duplicate, but a term is never dropped.

use std::collections::HashMap;
use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, info, warn};

use crate::error::Result;
use crate::llm::extract_json_from_response;

use super::oracle::{NEW_SKILL, SkillOracle};
use super::registry::{SkillRegistry, fold};

/// The oracle's validated answer for one raw term
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OracleVerdict {
    /// Maps to this stored canonical key
    Canonical(String),
    /// Should be admitted as a new canonical skill
    NewSkill,
}

/// Resolves uncertain terms through a [`SkillOracle`]
#[derive(Clone)]
pub struct BatchResolver {
    oracle: Arc<dyn SkillOracle>,
}

impl std::fmt::Debug for BatchResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BatchResolver").finish_non_exhaustive()
    }
}

impl BatchResolver {
    pub fn new(oracle: Arc<dyn SkillOracle>) -> Self {
        Self { oracle }
    }

    /// Resolve `terms` in one oracle call
    ///
    /// Terms are sent positionally, duplicates included. An empty batch
    /// returns immediately without calling the oracle. Oracle transport errors
    /// propagate; unparseable replies do not.
    pub async fn resolve(
        &self,
        terms: &[String],
        registry: &SkillRegistry,
    ) -> Result<HashMap<String, OracleVerdict>> {
        if terms.is_empty() {
            return Ok(HashMap::new());
        }

        let canonical_names = registry.canonical_names();
        info!(
            terms = terms.len(),
            vocabulary = canonical_names.len(),
            "Resolving uncertain skills"
        );

        let reply = self.oracle.classify(terms, &canonical_names).await?;
        Ok(interpret_reply(&reply, terms, registry))
    }
}

/// Turn a raw oracle reply into one verdict per distinct term
fn interpret_reply(
    reply: &str,
    terms: &[String],
    registry: &SkillRegistry,
) -> HashMap<String, OracleVerdict> {
    let answers = match serde_json::from_str::<Value>(extract_json_from_response(reply)) {
        Ok(Value::Object(answers)) => answers,
        Ok(other) => {
            warn!(kind = json_kind(&other), "Oracle reply is not a JSON object, admitting all terms");
            return all_new(terms);
        }
        Err(e) => {
            warn!(error = %e, "Oracle reply is not valid JSON, admitting all terms");
            return all_new(terms);
        }
    };

    terms
        .iter()
        .map(|term| {
            let answer = answers.get(term).or_else(|| {
                let folded = fold(term);
                answers
                    .iter()
                    .find(|(key, _)| fold(key) == folded)
                    .map(|(_, value)| value)
            });
            (term.clone(), verdict_for(term, answer, registry))
        })
        .collect()
}

fn verdict_for(term: &str, answer: Option<&Value>, registry: &SkillRegistry) -> OracleVerdict {
    let Some(answer) = answer else {
        debug!(term, "Oracle omitted term");
        return OracleVerdict::NewSkill;
    };

    let Some(answer) = answer.as_str() else {
        warn!(term, "Oracle answer is not a string");
        return OracleVerdict::NewSkill;
    };

    if answer.trim().eq_ignore_ascii_case(NEW_SKILL) {
        return OracleVerdict::NewSkill;
    }

    match registry.find_key(answer) {
        Some(canonical) => OracleVerdict::Canonical(canonical.to_string()),
        None => {
            warn!(term, answer, "Oracle named a skill outside the registry");
            OracleVerdict::NewSkill
        }
    }
}

fn all_new(terms: &[String]) -> HashMap<String, OracleVerdict> {
    terms
        .iter()
        .map(|term| (term.clone(), OracleVerdict::NewSkill))
        .collect()
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
