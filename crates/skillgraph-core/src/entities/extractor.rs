//! LLM-assisted entity extraction from document text

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, info, warn};

use crate::error::{Error, Result};
use crate::llm::{LlmClient, Message, extract_json_from_response};

use super::types::ExtractedEntities;

/// Documents longer than this many characters are truncated before prompting
pub const DEFAULT_MAX_DOCUMENT_CHARS: usize = 100_000;

const TRUNCATION_MARKER: &str = "\n...\n[Document truncated]";

/// Anything that can turn document text into entities
#[async_trait]
pub trait EntitySource: Send + Sync {
    async fn extract(&self, text: &str) -> Result<ExtractedEntities>;
}

/// Entity extractor backed by the configured extraction model
#[derive(Debug, Clone)]
pub struct EntityExtractor {
    llm_client: Arc<LlmClient>,
    max_document_chars: usize,
}

impl EntityExtractor {
    pub fn new(llm_client: Arc<LlmClient>) -> Self {
        Self {
            llm_client,
            max_document_chars: DEFAULT_MAX_DOCUMENT_CHARS,
        }
    }

    /// Set the truncation limit for document text
    pub fn with_max_document_chars(mut self, max: usize) -> Self {
        self.max_document_chars = max;
        self
    }
}

#[async_trait]
impl EntitySource for EntityExtractor {
    async fn extract(&self, text: &str) -> Result<ExtractedEntities> {
        let document = truncate_document(text, self.max_document_chars);
        if text.chars().nth(self.max_document_chars).is_some() {
            warn!(
                chars = text.chars().count(),
                limit = self.max_document_chars,
                "Document truncated for extraction"
            );
        }

        let messages = vec![
            Message::system(EXTRACTION_SYSTEM_PROMPT),
            Message::user(build_extraction_prompt(&document)),
        ];

        let response = self
            .llm_client
            .complete(messages, Some(self.llm_client.extraction_model()))
            .await?;
        if response.is_truncated() {
            warn!("Extraction reply hit the token limit and may be incomplete");
        }

        let entities = parse_extraction_response(&response.content)?;
        info!(
            people = entities.people.len(),
            projects = entities.projects.len(),
            relationships = entities.relationships.len(),
            "Entities extracted"
        );
        Ok(entities)
    }
}

/// Parse a model reply into entities; unlike skill resolution this does not fail open
pub fn parse_extraction_response(response: &str) -> Result<ExtractedEntities> {
    let json = extract_json_from_response(response);
    serde_json::from_str(json).map_err(|e| {
        debug!(reply = response, "Unparseable extraction reply");
        Error::ExtractionFailed(format!("Invalid extraction response: {}", e))
    })
}

/// Cut `text` to at most `max_chars` characters, appending a marker when cut
fn truncate_document(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((byte_idx, _)) => format!("{}{}", &text[..byte_idx], TRUNCATION_MARKER),
        None => text.to_string(),
    }
}

fn build_extraction_prompt(document: &str) -> String {
    format!(
        r#"Analyze the following document and extract:

1. People: full names, with their hard skills (technical skills, tools, languages) and soft skills (leadership, communication, mentoring and similar; never technical skills)
2. Projects: names and a one or two sentence description, with the technologies used
3. Relationships: who worked on which project, and their role (1-3 words, e.g. "lead developer")

Return JSON with this structure:
{{
  "people": [
    {{"name": "Full Name", "hard_skills": ["Python"], "soft_skills": ["mentoring"]}}
  ],
  "projects": [
    {{"name": "Project Name", "description": "Brief description", "technologies": ["PostgreSQL"]}}
  ],
  "relationships": [
    {{"person": "Full Name", "project": "Project Name", "role": "backend engineer"}}
  ]
}}

Rules:
- Every person must have a name and at least one hard skill
- Every project must have a name, a description and at least one technology
- Every relationship must name a person and a project from the lists above, and a role
- Write skills as they appear in the document; they are normalized afterwards
- Include everyone who worked on each project

Document:

{document}

Return ONLY the JSON object, no additional text or explanation."#
    )
}

const EXTRACTION_SYSTEM_PROMPT: &str = "You extract structured information about people, their skills \
and their projects from team status documents and reports. You answer with valid JSON only.";
