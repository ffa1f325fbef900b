//! People, projects and relationships extracted from documents
//!
//! - [`EntityExtractor`] asks the extraction model for structured entities
//! - [`validate_entities`] rejects incomplete extractions
//! - the skill lists are then handed to the normalizer

mod extractor;
mod types;
mod validation;

pub use extractor::{
    DEFAULT_MAX_DOCUMENT_CHARS, EntityExtractor, EntitySource, parse_extraction_response,
};
pub use types::{ExtractedEntities, Person, Project, Relationship};
pub use validation::{ValidationReport, validate_entities};
