//! Completeness checks for extracted entities
//!
//! The graph layer requires every node and edge to carry its identifying
//! fields, so incomplete extractions are rejected before normalization. All
//! problems are collected rather than stopping at the first one.

use std::collections::HashSet;

use serde::Serialize;

use crate::error::{Error, Result};

use super::types::ExtractedEntities;

/// Outcome of [`validate_entities`]
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ValidationReport {
    pub errors: Vec<String>,
}

impl ValidationReport {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    /// Convert into a `ValidationFailed` error when anything was reported
    pub fn into_result(self) -> Result<()> {
        if self.is_valid() {
            Ok(())
        } else {
            Err(Error::ValidationFailed(self.errors))
        }
    }
}

fn has_content(values: &[String]) -> bool {
    values.iter().any(|v| !v.trim().is_empty())
}

/// Check every person, project and relationship for required fields
pub fn validate_entities(entities: &ExtractedEntities) -> ValidationReport {
    let mut errors = Vec::new();

    for (idx, person) in entities.people.iter().enumerate() {
        if person.name.trim().is_empty() {
            errors.push(format!("people[{idx}]: Person missing required 'name'"));
        }
        if !has_content(&person.hard_skills) {
            errors.push(format!(
                "people[{idx}] '{}': Missing required 'hard_skills'",
                person.name
            ));
        }
    }

    for (idx, project) in entities.projects.iter().enumerate() {
        if project.name.trim().is_empty() {
            errors.push(format!("projects[{idx}]: Project missing required 'name'"));
        }
        if project.description.trim().is_empty() {
            errors.push(format!(
                "projects[{idx}] '{}': Missing required 'description'",
                project.name
            ));
        }
        if !has_content(&project.technologies) {
            errors.push(format!(
                "projects[{idx}] '{}': Missing required 'technologies'",
                project.name
            ));
        }
    }

    let person_names: HashSet<&str> = entities
        .people
        .iter()
        .map(|p| p.name.trim())
        .filter(|n| !n.is_empty())
        .collect();
    let project_names: HashSet<&str> = entities
        .projects
        .iter()
        .map(|p| p.name.trim())
        .filter(|n| !n.is_empty())
        .collect();

    for (idx, rel) in entities.relationships.iter().enumerate() {
        let person = rel.person.trim();
        let project = rel.project.trim();

        if rel.role.trim().is_empty() {
            errors.push(format!("relationships[{idx}]: Relationship missing required 'role'"));
        }

        if person.is_empty() {
            errors.push(format!("relationships[{idx}]: Relationship missing 'person'"));
        } else if !person_names.contains(person) {
            errors.push(format!(
                "relationships[{idx}]: Person '{person}' not found in people list"
            ));
        }

        if project.is_empty() {
            errors.push(format!("relationships[{idx}]: Relationship missing 'project'"));
        } else if !project_names.contains(project) {
            errors.push(format!(
                "relationships[{idx}]: Project '{project}' not found in projects list"
            ));
        }
    }

    ValidationReport { errors }
}
