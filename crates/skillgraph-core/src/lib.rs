//! Skillgraph Core Library
//!
//! This crate provides the core functionality for Skillgraph, including:
//! - Skill normalization against a persistent canonical registry
//! - Entity extraction and validation for people, projects and relationships
//! - LLM integration (OpenRouter API)
//! - Commands (ingest, registry curation)

pub mod commands;
pub mod config;
pub mod entities;
pub mod error;
pub mod llm;
pub mod normalization;

pub use error::{Error, Result};

/// Re-export commonly used types
pub mod prelude {
    pub use crate::config::Config;
    pub use crate::entities::{ExtractedEntities, Person, Project, Relationship};
    pub use crate::error::{Error, Result};
    pub use crate::normalization::{
        JsonFileRegistryStore, RegistryStore, SkillCategory, SkillNormalizer, SkillOracle,
    };
}
