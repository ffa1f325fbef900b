//! Document ingestion: extract, validate, normalize
//!
//! Produces a normalized entity batch ready for the graph layer. Writing to
//! the graph itself happens elsewhere.

use std::path::Path;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{info, warn};
use uuid::Uuid;

use crate::entities::{EntitySource, ExtractedEntities, validate_entities};
use crate::error::{Error, Result};
use crate::normalization::SkillNormalizer;

/// Summary of one ingested document
#[derive(Debug, Clone, Serialize)]
pub struct IngestReport {
    pub id: String,
    /// File the text came from, when ingested from disk
    pub source: Option<String>,
    pub ingested_at: DateTime<Utc>,
    pub people: usize,
    pub projects: usize,
    pub relationships: usize,
    pub skill_mentions: usize,
    /// Canonical skills admitted to the registry by this document
    pub new_skills: usize,
    pub entities: ExtractedEntities,
}

/// Read a plain-text document from disk
///
/// Only `.txt` and `.md` files are accepted. Bytes that are not valid UTF-8
/// are decoded as Latin-1 so that legacy exports still ingest.
pub async fn read_document(path: &Path) -> Result<String> {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase);

    match extension.as_deref() {
        Some("txt") | Some("md") => {}
        Some(other) => {
            return Err(Error::InvalidInput(format!(
                "Unsupported document type '.{}'. Convert it to plain text (.txt or .md) first",
                other
            )));
        }
        None => {
            return Err(Error::InvalidInput(format!(
                "Cannot determine document type of {}. Expected a .txt or .md file",
                path.display()
            )));
        }
    }

    let bytes = tokio::fs::read(path).await?;
    match String::from_utf8(bytes) {
        Ok(text) => Ok(text),
        Err(e) => {
            warn!(path = %path.display(), "Document is not UTF-8, decoding as Latin-1");
            Ok(e.into_bytes().iter().map(|&b| b as char).collect())
        }
    }
}

/// Extract entities from `text`, validate them, and normalize every skill list
///
/// Validation failures abort before the registry is touched.
pub async fn ingest_text(
    text: &str,
    source: &dyn EntitySource,
    normalizer: &SkillNormalizer,
) -> Result<IngestReport> {
    if text.trim().is_empty() {
        return Err(Error::InvalidInput("Document is empty".to_string()));
    }

    let extracted = source.extract(text).await?;
    validate_entities(&extracted).into_result()?;

    let (entities, new_skills) = normalizer.normalize_entities_counted(extracted).await?;

    let report = IngestReport {
        id: Uuid::new_v4().to_string(),
        source: None,
        ingested_at: Utc::now(),
        people: entities.people.len(),
        projects: entities.projects.len(),
        relationships: entities.relationships.len(),
        skill_mentions: entities.skill_mentions(),
        new_skills,
        entities,
    };

    info!(
        id = %report.id,
        people = report.people,
        projects = report.projects,
        new_skills = report.new_skills,
        "Document ingested"
    );
    Ok(report)
}

/// Read a document from disk and ingest it
pub async fn ingest_file(
    path: &Path,
    source: &dyn EntitySource,
    normalizer: &SkillNormalizer,
) -> Result<IngestReport> {
    let text = read_document(path).await?;
    let mut report = ingest_text(&text, source, normalizer).await?;
    report.source = Some(path.display().to_string());
    Ok(report)
}
