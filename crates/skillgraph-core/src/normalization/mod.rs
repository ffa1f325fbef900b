//! Skill normalization pipeline
//!
//! Raw skill strings are mapped onto a persistent, self-growing canonical
//! vocabulary through a three-tier cascade:
//!
//! 1. exact, case-insensitive lookup of keys and synonyms
//! 2. Ratcliff/Obershelp similarity, accepted above the high-confidence band
//! 3. one batched oracle round trip for scores in the uncertain band
//!
//! Terms that fall below the uncertain band, or that the oracle does not map,
//! are admitted as new canonical skills and persisted immediately.
//!
//! ```no_run
//! use std::sync::Arc;
//! use skillgraph_core::normalization::{
//!     JsonFileRegistryStore, SkillCategory, SkillNormalizer, UnavailableOracle,
//! };
//!
//! # async fn run() -> skillgraph_core::Result<()> {
//! let store = Arc::new(JsonFileRegistryStore::new("skill_registry.json"));
//! let normalizer = SkillNormalizer::new(store, Arc::new(UnavailableOracle));
//! let skills = normalizer
//!     .normalize(&["ReactJS".to_string()], SkillCategory::Hard)
//!     .await?;
//! # Ok(())
//! # }
//! ```

mod matcher;
mod normalizer;
mod oracle;
mod registry;
mod resolver;
mod similarity;
mod store;

pub use matcher::{MatchDecision, MatchThresholds, MatcherCascade, exact_match, fuzzy_match};
pub use normalizer::{NormalizedSkill, SkillNormalizer, SkillResolution};
pub use oracle::{LlmSkillOracle, NEW_SKILL, SkillOracle, UnavailableOracle};
pub use registry::{RegistryEntry, SkillCategory, SkillRegistry};
pub use resolver::{BatchResolver, OracleVerdict};
pub use similarity::ratio;
pub use store::{JsonFileRegistryStore, MemoryRegistryStore, RegistryStore};
