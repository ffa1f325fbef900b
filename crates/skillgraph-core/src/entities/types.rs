//! Extracted entity records
//!
//! The shape mirrors what the extraction model is asked to return. Every list
//! and optional text field defaults to empty so partially filled replies still
//! deserialize; completeness is checked by validation, not by serde.

use serde::{Deserialize, Serialize};

/// A person mentioned in a document
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Person {
    #[serde(default)]
    pub name: String,
    /// Technical skills, in the order they were extracted
    #[serde(default)]
    pub hard_skills: Vec<String>,
    /// Interpersonal skills, in the order they were extracted
    #[serde(default)]
    pub soft_skills: Vec<String>,
}

impl Person {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn with_hard_skills<S: Into<String>>(mut self, skills: impl IntoIterator<Item = S>) -> Self {
        self.hard_skills = skills.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_soft_skills<S: Into<String>>(mut self, skills: impl IntoIterator<Item = S>) -> Self {
        self.soft_skills = skills.into_iter().map(Into::into).collect();
        self
    }
}

/// A project mentioned in a document
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    /// Technologies used; normalized as hard skills
    #[serde(default)]
    pub technologies: Vec<String>,
}

impl Project {
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            technologies: Vec::new(),
        }
    }

    pub fn with_technologies<S: Into<String>>(mut self, tech: impl IntoIterator<Item = S>) -> Self {
        self.technologies = tech.into_iter().map(Into::into).collect();
        self
    }
}

/// Who worked on which project, and as what
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Relationship {
    #[serde(default)]
    pub person: String,
    #[serde(default)]
    pub project: String,
    #[serde(default)]
    pub role: String,
}

impl Relationship {
    pub fn new(
        person: impl Into<String>,
        project: impl Into<String>,
        role: impl Into<String>,
    ) -> Self {
        Self {
            person: person.into(),
            project: project.into(),
            role: role.into(),
        }
    }
}

/// One document's worth of extracted entities
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractedEntities {
    #[serde(default)]
    pub people: Vec<Person>,
    #[serde(default)]
    pub projects: Vec<Project>,
    #[serde(default)]
    pub relationships: Vec<Relationship>,
}

impl ExtractedEntities {
    pub fn is_empty(&self) -> bool {
        self.people.is_empty() && self.projects.is_empty() && self.relationships.is_empty()
    }

    /// Total number of skill and technology mentions across all lists
    pub fn skill_mentions(&self) -> usize {
        let personal: usize = self
            .people
            .iter()
            .map(|p| p.hard_skills.len() + p.soft_skills.len())
            .sum();
        let technical: usize = self.projects.iter().map(|p| p.technologies.len()).sum();
        personal + technical
    }
}
