//! Canonical skill registry
//!
//! An insertion-ordered mapping from canonical skill name to its category and
//! known synonyms. Keys are unique exactly as stored, but every lookup is
//! trimmed and case-insensitive. Insertion order is the tie-break order for the
//! matcher cascade, so it is preserved in memory and in the serialized form.

use std::fmt;
use std::str::FromStr;

use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::{Error, Result};

/// Category of a canonical skill
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SkillCategory {
    /// Technical skills and technologies
    Hard,
    /// Interpersonal skills
    Soft,
}

impl SkillCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Hard => "hard",
            Self::Soft => "soft",
        }
    }
}

impl fmt::Display for SkillCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SkillCategory {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "hard" => Ok(Self::Hard),
            "soft" => Ok(Self::Soft),
            other => Err(Error::InvalidInput(format!(
                "Unknown skill category '{}'. Valid options: hard, soft",
                other
            ))),
        }
    }
}

/// Registry value for one canonical skill
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistryEntry {
    pub category: SkillCategory,
    /// Alternate spellings; duplicates are allowed
    #[serde(default)]
    pub synonyms: Vec<String>,
}

impl RegistryEntry {
    pub fn new(category: SkillCategory) -> Self {
        Self {
            category,
            synonyms: Vec::new(),
        }
    }

    pub fn with_synonyms(mut self, synonyms: Vec<String>) -> Self {
        self.synonyms = synonyms;
        self
    }
}

/// Lookup key used for every case-insensitive comparison
pub(crate) fn fold(term: &str) -> String {
    term.trim().to_lowercase()
}

/// Insertion-ordered canonical skill registry
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SkillRegistry {
    entries: Vec<(String, RegistryEntry)>,
}

impl SkillRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate entries in insertion order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &RegistryEntry)> {
        self.entries.iter().map(|(name, entry)| (name.as_str(), entry))
    }

    /// Canonical names in insertion order
    pub fn canonical_names(&self) -> Vec<String> {
        self.entries.iter().map(|(name, _)| name.clone()).collect()
    }

    /// Case-sensitive lookup of a stored key
    pub fn get(&self, canonical: &str) -> Option<&RegistryEntry> {
        self.entries
            .iter()
            .find(|(name, _)| name == canonical)
            .map(|(_, entry)| entry)
    }

    /// Earliest-inserted key equal to `term` ignoring case and surrounding whitespace
    pub fn find_key(&self, term: &str) -> Option<&str> {
        let folded = fold(term);
        self.entries
            .iter()
            .find(|(name, _)| fold(name) == folded)
            .map(|(name, _)| name.as_str())
    }

    /// Return the canonical key for `term`, inserting it if no key matches
    ///
    /// The returned flag is `true` only when a new entry was created. A term
    /// that already exists under a different casing resolves to the stored key
    /// and leaves the registry untouched.
    pub fn get_or_insert(&mut self, term: &str, category: SkillCategory) -> (String, bool) {
        if let Some(existing) = self.find_key(term) {
            return (existing.to_string(), false);
        }
        let name = term.trim().to_string();
        self.entries.push((name.clone(), RegistryEntry::new(category)));
        (name, true)
    }

    /// Insert or replace an entry under an exact key
    pub fn insert(&mut self, canonical: impl Into<String>, entry: RegistryEntry) {
        let canonical = canonical.into();
        match self.entries.iter_mut().find(|(name, _)| *name == canonical) {
            Some((_, slot)) => *slot = entry,
            None => self.entries.push((canonical, entry)),
        }
    }

    /// Append a synonym to an existing canonical entry
    pub fn add_synonym(&mut self, canonical: &str, synonym: impl Into<String>) -> Result<()> {
        let entry = self
            .entries
            .iter_mut()
            .find(|(name, _)| name == canonical)
            .map(|(_, entry)| entry)
            .ok_or_else(|| Error::SkillNotFound(canonical.to_string()))?;
        entry.synonyms.push(synonym.into());
        Ok(())
    }
}

impl Serialize for SkillRegistry {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (name, entry) in &self.entries {
            map.serialize_entry(name, entry)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for SkillRegistry {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        struct RegistryVisitor;

        impl<'de> Visitor<'de> for RegistryVisitor {
            type Value = SkillRegistry;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a map of canonical skill names to registry entries")
            }

            fn visit_map<A: MapAccess<'de>>(
                self,
                mut access: A,
            ) -> std::result::Result<Self::Value, A::Error> {
                let mut registry = SkillRegistry::new();
                while let Some((name, entry)) = access.next_entry::<String, RegistryEntry>()? {
                    // Repeated keys: last one wins, first position is kept
                    registry.insert(name, entry);
                }
                Ok(registry)
            }
        }

        deserializer.deserialize_map(RegistryVisitor)
    }
}
