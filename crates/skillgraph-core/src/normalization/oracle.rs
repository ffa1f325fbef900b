//! Classification oracle for uncertain skill terms
//!
//! The oracle receives every uncertain term of a normalization call plus the
//! current canonical vocabulary, and answers with raw text that should contain
//! a JSON object mapping each term to a canonical name or [`NEW_SKILL`].
//! Interpreting that text is the batch resolver's job.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;

use crate::error::{Error, Result};
use crate::llm::{LlmClient, Message};

/// Sentinel answer for "no existing canonical skill fits"
pub const NEW_SKILL: &str = "NEW_SKILL";

/// External service that maps uncertain terms onto the canonical vocabulary
#[async_trait]
pub trait SkillOracle: Send + Sync {
    /// Classify `terms` against `canonical_names`, returning the raw reply
    ///
    /// Transport failures are errors; a reply that is not valid JSON is not.
    async fn classify(&self, terms: &[String], canonical_names: &[String]) -> Result<String>;
}

/// Oracle backed by a chat-completions model
#[derive(Debug, Clone)]
pub struct LlmSkillOracle {
    llm_client: Arc<LlmClient>,
    model: Option<String>,
}

impl LlmSkillOracle {
    pub fn new(llm_client: Arc<LlmClient>) -> Self {
        Self {
            llm_client,
            model: None,
        }
    }

    /// Use a specific model instead of the client's default
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }
}

#[async_trait]
impl SkillOracle for LlmSkillOracle {
    async fn classify(&self, terms: &[String], canonical_names: &[String]) -> Result<String> {
        let messages = vec![
            Message::system(RESOLUTION_SYSTEM_PROMPT),
            Message::user(build_resolution_prompt(terms, canonical_names)?),
        ];

        let response = self
            .llm_client
            .complete(messages, self.model.as_deref())
            .await?;

        debug!(
            terms = terms.len(),
            truncated = response.is_truncated(),
            "Oracle replied"
        );
        Ok(response.content)
    }
}

/// Oracle used when no model is configured
///
/// Every call fails with an LLM error, so normalization still works for input
/// that never reaches the uncertain band.
#[derive(Debug, Clone, Copy, Default)]
pub struct UnavailableOracle;

#[async_trait]
impl SkillOracle for UnavailableOracle {
    async fn classify(&self, terms: &[String], _canonical_names: &[String]) -> Result<String> {
        Err(Error::LLMError(format!(
            "{} uncertain skill(s) need model resolution but no API key is configured",
            terms.len()
        )))
    }
}

const RESOLUTION_SYSTEM_PROMPT: &str = "You normalize skill and technology names against a fixed vocabulary. \
Answer with a single JSON object and nothing else.";

/// Build the user prompt for one resolution batch
fn build_resolution_prompt(terms: &[String], canonical_names: &[String]) -> Result<String> {
    let terms_json = serde_json::to_string_pretty(terms)?;
    let names_json = serde_json::to_string_pretty(canonical_names)?;

    Ok(format!(
        r#"Raw skills extracted from a document:
{terms_json}

Known canonical skills:
{names_json}

For each raw skill:
- if it is the same skill as a canonical one (spelling variant, abbreviation, synonym), answer with that canonical name exactly as listed
- otherwise answer "{NEW_SKILL}"

Return ONLY a JSON object mapping each raw skill to its answer, for example:
{{
  "raw skill 1": "Canonical Skill",
  "raw skill 2": "{NEW_SKILL}"
}}"#
    ))
}
