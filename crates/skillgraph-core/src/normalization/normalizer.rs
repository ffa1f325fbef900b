//! Normalization orchestrator
//!
//! Runs every raw term of a skill list through the matcher cascade, sends the
//! uncertain ones to the batch resolver in one round trip, and persists every
//! admitted term as it is admitted. Output positions always line up with
//! input positions.
//!
//! The normalizer is the only writer of the registry inside a process: each
//! call holds the writer lock across its whole load, mutate and save span.

use std::sync::Arc;

use serde::Serialize;
use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::config::NormalizationConfig;
use crate::entities::ExtractedEntities;
use crate::error::Result;

use super::matcher::{MatchDecision, MatchThresholds, MatcherCascade};
use super::oracle::SkillOracle;
use super::registry::{SkillCategory, SkillRegistry, fold};
use super::resolver::{BatchResolver, OracleVerdict};
use super::store::RegistryStore;

/// How a raw term reached its canonical form
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "method", rename_all = "snake_case")]
pub enum SkillResolution {
    /// Matched a key or synonym exactly
    Exact,
    /// Accepted on fuzzy score alone
    Fuzzy { score: f64 },
    /// Mapped to an existing skill by the oracle
    Oracle,
    /// Admitted (or already present) as its own canonical skill
    Admitted,
    /// Blank input, passed through empty
    Blank,
}

/// One normalized term
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NormalizedSkill {
    pub raw: String,
    pub canonical: String,
    pub resolution: SkillResolution,
}

impl NormalizedSkill {
    fn new(raw: &str, canonical: impl Into<String>, resolution: SkillResolution) -> Self {
        Self {
            raw: raw.to_string(),
            canonical: canonical.into(),
            resolution,
        }
    }
}

/// Single-writer skill normalizer over a registry store and an oracle
pub struct SkillNormalizer {
    store: Arc<dyn RegistryStore>,
    resolver: BatchResolver,
    cascade: MatcherCascade,
    learn_synonyms: bool,
    writer: Mutex<()>,
}

impl std::fmt::Debug for SkillNormalizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SkillNormalizer")
            .field("store", &self.store.location())
            .field("cascade", &self.cascade)
            .field("learn_synonyms", &self.learn_synonyms)
            .finish_non_exhaustive()
    }
}

impl SkillNormalizer {
    /// Create a normalizer with default thresholds
    pub fn new(store: Arc<dyn RegistryStore>, oracle: Arc<dyn SkillOracle>) -> Self {
        Self {
            store,
            resolver: BatchResolver::new(oracle),
            cascade: MatcherCascade::default(),
            learn_synonyms: false,
            writer: Mutex::new(()),
        }
    }

    /// Create a normalizer using the thresholds and flags from configuration
    pub fn from_config(
        config: &NormalizationConfig,
        store: Arc<dyn RegistryStore>,
        oracle: Arc<dyn SkillOracle>,
    ) -> Self {
        Self::new(store, oracle)
            .with_thresholds(MatchThresholds::from(config))
            .with_synonym_learning(config.learn_synonyms)
    }

    pub fn with_thresholds(mut self, thresholds: MatchThresholds) -> Self {
        self.cascade = MatcherCascade::new(thresholds);
        self
    }

    /// Record accepted fuzzy variants as synonyms of the matched skill
    pub fn with_synonym_learning(mut self, enabled: bool) -> Self {
        self.learn_synonyms = enabled;
        self
    }

    pub fn store(&self) -> &Arc<dyn RegistryStore> {
        &self.store
    }

    /// Current registry contents, read under the writer lock
    pub async fn registry(&self) -> Result<SkillRegistry> {
        let _guard = self.writer.lock().await;
        self.store.load().await
    }

    /// Normalize a skill list, returning canonical names position by position
    pub async fn normalize(&self, skills: &[String], category: SkillCategory) -> Result<Vec<String>> {
        Ok(self
            .normalize_detailed(skills, category)
            .await?
            .into_iter()
            .map(|skill| skill.canonical)
            .collect())
    }

    /// Like [`normalize`](Self::normalize), also reporting how each term resolved
    pub async fn normalize_detailed(
        &self,
        skills: &[String],
        category: SkillCategory,
    ) -> Result<Vec<NormalizedSkill>> {
        let _guard = self.writer.lock().await;
        let mut registry = self.store.load().await?;
        self.normalize_list(&mut registry, skills, category).await
    }

    /// Normalize every skill list of an entity batch
    ///
    /// Person hard skills, then soft skills, then project technologies (as
    /// hard skills). Terms admitted by earlier lists are visible to later ones.
    /// Names, descriptions and relationships are returned unchanged.
    pub async fn normalize_entities(&self, entities: ExtractedEntities) -> Result<ExtractedEntities> {
        Ok(self.normalize_entities_counted(entities).await?.0)
    }

    /// Like [`normalize_entities`](Self::normalize_entities), also returning
    /// how many canonical skills the batch admitted
    pub async fn normalize_entities_counted(
        &self,
        mut entities: ExtractedEntities,
    ) -> Result<(ExtractedEntities, usize)> {
        let _guard = self.writer.lock().await;
        let mut registry = self.store.load().await?;
        let before = registry.len();

        for person in &mut entities.people {
            person.hard_skills = canonical_names(
                self.normalize_list(&mut registry, &person.hard_skills, SkillCategory::Hard)
                    .await?,
            );
            person.soft_skills = canonical_names(
                self.normalize_list(&mut registry, &person.soft_skills, SkillCategory::Soft)
                    .await?,
            );
        }

        for project in &mut entities.projects {
            project.technologies = canonical_names(
                self.normalize_list(&mut registry, &project.technologies, SkillCategory::Hard)
                    .await?,
            );
        }

        let admitted = registry.len() - before;
        Ok((entities, admitted))
    }

    /// Add a canonical skill with optional synonyms, outside the cascade
    ///
    /// An existing key (any casing) is reused. Synonyms already present on
    /// the entry, ignoring case, are skipped. Returns the stored key and
    /// whether the registry changed.
    pub async fn add_canonical(
        &self,
        name: &str,
        category: SkillCategory,
        synonyms: &[String],
    ) -> Result<(String, bool)> {
        let _guard = self.writer.lock().await;
        let mut registry = self.store.load().await?;

        let (canonical, mut changed) = registry.get_or_insert(name, category);
        for synonym in synonyms {
            let synonym = synonym.trim();
            let known = registry
                .get(&canonical)
                .is_some_and(|entry| entry.synonyms.iter().any(|s| fold(s) == fold(synonym)));
            if synonym.is_empty() || known {
                continue;
            }
            registry.add_synonym(&canonical, synonym)?;
            changed = true;
        }

        if changed {
            self.store.save(&registry).await?;
            info!(skill = %canonical, category = %category, "Registry entry updated");
        }
        Ok((canonical, changed))
    }

    /// Cascade one list against an already loaded registry
    async fn normalize_list(
        &self,
        registry: &mut SkillRegistry,
        skills: &[String],
        category: SkillCategory,
    ) -> Result<Vec<NormalizedSkill>> {
        let mut slots: Vec<Option<NormalizedSkill>> = Vec::with_capacity(skills.len());
        let mut uncertain: Vec<(usize, String)> = Vec::new();

        for (idx, raw) in skills.iter().enumerate() {
            if raw.trim().is_empty() {
                slots.push(Some(NormalizedSkill::new(raw, "", SkillResolution::Blank)));
                continue;
            }

            let decision = self.cascade.decide(raw, registry);
            debug!(raw = %raw, decision = ?decision, "Cascade decision");

            let resolved = match decision {
                MatchDecision::Exact(canonical) => {
                    NormalizedSkill::new(raw, canonical, SkillResolution::Exact)
                }
                MatchDecision::FuzzyHighConfidence { canonical, score } => {
                    if self.learn_synonyms {
                        self.learn_synonym(registry, &canonical, raw).await?;
                    }
                    NormalizedSkill::new(raw, canonical, SkillResolution::Fuzzy { score })
                }
                MatchDecision::Uncertain { .. } => {
                    uncertain.push((idx, raw.clone()));
                    slots.push(None);
                    continue;
                }
                MatchDecision::NewSkill { .. } => {
                    let canonical = self.admit(registry, raw, category).await?;
                    NormalizedSkill::new(raw, canonical, SkillResolution::Admitted)
                }
            };
            slots.push(Some(resolved));
        }

        if !uncertain.is_empty() {
            let terms: Vec<String> = uncertain.iter().map(|(_, raw)| raw.clone()).collect();
            let verdicts = self.resolver.resolve(&terms, registry).await?;

            for (idx, raw) in uncertain {
                let resolved = match verdicts.get(&raw) {
                    Some(OracleVerdict::Canonical(canonical)) => {
                        NormalizedSkill::new(&raw, canonical.clone(), SkillResolution::Oracle)
                    }
                    _ => {
                        let canonical = self.admit(registry, &raw, category).await?;
                        NormalizedSkill::new(&raw, canonical, SkillResolution::Admitted)
                    }
                };
                slots[idx] = Some(resolved);
            }
        }

        Ok(slots.into_iter().flatten().collect())
    }

    /// Insert `raw` as a canonical skill unless a key already matches, saving on insert
    ///
    /// The stored key is `raw` with surrounding whitespace trimmed.
    async fn admit(
        &self,
        registry: &mut SkillRegistry,
        raw: &str,
        category: SkillCategory,
    ) -> Result<String> {
        let (canonical, inserted) = registry.get_or_insert(raw, category);
        if inserted {
            self.store.save(registry).await?;
            info!(skill = %canonical, category = %category, "Admitted new canonical skill");
        }
        Ok(canonical)
    }

    async fn learn_synonym(
        &self,
        registry: &mut SkillRegistry,
        canonical: &str,
        raw: &str,
    ) -> Result<()> {
        registry.add_synonym(canonical, raw.trim())?;
        self.store.save(registry).await?;
        info!(skill = %canonical, synonym = %raw.trim(), "Learned synonym");
        Ok(())
    }
}

fn canonical_names(skills: Vec<NormalizedSkill>) -> Vec<String> {
    skills.into_iter().map(|skill| skill.canonical).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::{Person, Project, Relationship};
    use crate::error::Error;
    use crate::normalization::oracle::UnavailableOracle;
    use crate::normalization::registry::RegistryEntry;
    use crate::normalization::store::MemoryRegistryStore;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Oracle double that returns a canned reply and counts invocations
    struct ScriptedOracle {
        reply: String,
        calls: AtomicUsize,
        last_batch: std::sync::Mutex<Vec<String>>,
    }

    impl ScriptedOracle {
        fn new(reply: &str) -> Arc<Self> {
            Arc::new(Self {
                reply: reply.to_string(),
                calls: AtomicUsize::new(0),
                last_batch: std::sync::Mutex::new(Vec::new()),
            })
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl SkillOracle for ScriptedOracle {
        async fn classify(&self, terms: &[String], _names: &[String]) -> Result<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            *self.last_batch.lock().unwrap() = terms.to_vec();
            Ok(self.reply.clone())
        }
    }

    /// Store double whose saves start failing after `allowed` successes
    struct FailingSaveStore {
        inner: MemoryRegistryStore,
        allowed: usize,
    }

    #[async_trait]
    impl RegistryStore for FailingSaveStore {
        async fn load(&self) -> Result<SkillRegistry> {
            self.inner.load().await
        }

        async fn save(&self, registry: &SkillRegistry) -> Result<()> {
            if self.inner.save_count() >= self.allowed {
                return Err(Error::registry_io(
                    std::path::Path::new("/readonly/skill_registry.json"),
                    std::io::Error::new(std::io::ErrorKind::PermissionDenied, "read-only"),
                ));
            }
            self.inner.save(registry).await
        }

        fn location(&self) -> String {
            "failing".to_string()
        }
    }

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    fn react_registry() -> SkillRegistry {
        let mut registry = SkillRegistry::new();
        registry.insert(
            "React",
            RegistryEntry::new(SkillCategory::Hard)
                .with_synonyms(strings(&["React.js", "ReactJS"])),
        );
        registry
    }

    fn seeded_store(registry: SkillRegistry) -> Arc<MemoryRegistryStore> {
        Arc::new(MemoryRegistryStore::with_registry(registry))
    }

    #[tokio::test]
    async fn test_end_to_end_react_example() {
        let store = seeded_store(react_registry());
        let oracle = ScriptedOracle::new("{}");
        let normalizer = SkillNormalizer::new(store.clone(), oracle.clone());

        let output = normalizer
            .normalize(&strings(&["react.js", "Reactjs", "Vue"]), SkillCategory::Hard)
            .await
            .unwrap();

        assert_eq!(output, vec!["React", "React", "Vue"]);
        let registry = store.snapshot();
        assert_eq!(registry.canonical_names(), vec!["React", "Vue"]);
        assert_eq!(registry.get("Vue").unwrap().category, SkillCategory::Hard);
        assert!(registry.get("Vue").unwrap().synonyms.is_empty());
        assert_eq!(oracle.calls(), 0);
    }

    #[tokio::test]
    async fn test_canonical_list_is_idempotent() {
        let mut registry = react_registry();
        registry.insert("leadership", RegistryEntry::new(SkillCategory::Soft));
        let store = seeded_store(registry.clone());
        let normalizer = SkillNormalizer::new(store.clone(), ScriptedOracle::new("{}"));

        let input = strings(&["React", "leadership", "React"]);
        let output = normalizer.normalize(&input, SkillCategory::Hard).await.unwrap();

        assert_eq!(output, input);
        assert_eq!(store.save_count(), 0);
        assert_eq!(store.snapshot(), registry);
    }

    #[tokio::test]
    async fn test_score_bands_route_correctly() {
        let mut registry = SkillRegistry::new();
        registry.insert("PostgreSQL", RegistryEntry::new(SkillCategory::Hard));
        registry.insert("Kubernetes", RegistryEntry::new(SkillCategory::Hard));
        let store = seeded_store(registry);
        let oracle = ScriptedOracle::new(r#"{"kubernetes cluster": "Kubernetes"}"#);
        let normalizer = SkillNormalizer::new(store.clone(), oracle.clone());

        let output = normalizer
            .normalize_detailed(
                &strings(&["postgres", "kubernetes cluster", "Rust"]),
                SkillCategory::Hard,
            )
            .await
            .unwrap();

        assert_eq!(output[0].canonical, "PostgreSQL");
        assert!(matches!(output[0].resolution, SkillResolution::Fuzzy { score } if score > 0.85));
        assert_eq!(output[1].canonical, "Kubernetes");
        assert_eq!(output[1].resolution, SkillResolution::Oracle);
        assert_eq!(output[2].canonical, "Rust");
        assert_eq!(output[2].resolution, SkillResolution::Admitted);

        // exactly one new key, saved once
        assert_eq!(store.snapshot().len(), 3);
        assert_eq!(store.save_count(), 1);
        assert_eq!(oracle.calls(), 1);
    }

    #[tokio::test]
    async fn test_oracle_called_once_per_call() {
        let mut registry = SkillRegistry::new();
        registry.insert("Kubernetes", RegistryEntry::new(SkillCategory::Hard));
        registry.insert("leadership", RegistryEntry::new(SkillCategory::Soft));
        registry.insert("GraphQL", RegistryEntry::new(SkillCategory::Hard));
        let oracle = ScriptedOracle::new(
            r#"{"kubernetes cluster": "Kubernetes", "team leadership": "leadership", "graphql api": "GraphQL"}"#,
        );
        let normalizer = SkillNormalizer::new(seeded_store(registry), oracle.clone());

        let output = normalizer
            .normalize(
                &strings(&["kubernetes cluster", "team leadership", "graphql api"]),
                SkillCategory::Hard,
            )
            .await
            .unwrap();

        assert_eq!(output, vec!["Kubernetes", "leadership", "GraphQL"]);
        assert_eq!(oracle.calls(), 1);
        assert_eq!(oracle.last_batch.lock().unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_unparseable_oracle_reply_admits_every_term() {
        let mut registry = SkillRegistry::new();
        registry.insert("Kubernetes", RegistryEntry::new(SkillCategory::Hard));
        registry.insert("GraphQL", RegistryEntry::new(SkillCategory::Hard));
        let store = seeded_store(registry);
        let normalizer =
            SkillNormalizer::new(store.clone(), ScriptedOracle::new("not json at all"));

        let output = normalizer
            .normalize(&strings(&["kubernetes cluster", "graphql api"]), SkillCategory::Hard)
            .await
            .unwrap();

        assert_eq!(output, vec!["kubernetes cluster", "graphql api"]);
        assert_eq!(
            store.snapshot().canonical_names(),
            vec!["Kubernetes", "GraphQL", "kubernetes cluster", "graphql api"]
        );
    }

    #[tokio::test]
    async fn test_positions_and_duplicates_preserved() {
        let mut registry = react_registry();
        registry.insert("Kubernetes", RegistryEntry::new(SkillCategory::Hard));
        let store = seeded_store(registry);
        let oracle = ScriptedOracle::new(r#"{"kubernetes cluster": "Kubernetes"}"#);
        let normalizer = SkillNormalizer::new(store.clone(), oracle.clone());

        let input = strings(&[
            "kubernetes cluster",
            "Svelte",
            "ReactJS",
            "",
            "kubernetes cluster",
            "svelte",
        ]);
        let output = normalizer.normalize(&input, SkillCategory::Hard).await.unwrap();

        assert_eq!(
            output,
            vec!["Kubernetes", "Svelte", "React", "", "Kubernetes", "Svelte"]
        );
        // duplicates go to the oracle positionally
        assert_eq!(oracle.last_batch.lock().unwrap().len(), 2);
        assert_eq!(oracle.calls(), 1);
        assert_eq!(store.save_count(), 1);
    }

    #[tokio::test]
    async fn test_in_batch_duplicate_new_terms_create_one_entry() {
        let mut registry = SkillRegistry::new();
        registry.insert("GraphQL", RegistryEntry::new(SkillCategory::Hard));
        let store = seeded_store(registry);
        let normalizer = SkillNormalizer::new(
            store.clone(),
            ScriptedOracle::new(r#"{"graphql api": "NEW_SKILL"}"#),
        );

        let output = normalizer
            .normalize(&strings(&["graphql api", "GraphQL API"]), SkillCategory::Hard)
            .await
            .unwrap();

        assert_eq!(output, vec!["graphql api", "graphql api"]);
        assert_eq!(store.snapshot().len(), 2);
        assert_eq!(store.save_count(), 1);
    }

    #[tokio::test]
    async fn test_sequential_calls_admit_once() {
        let store = seeded_store(SkillRegistry::new());
        let normalizer = SkillNormalizer::new(store.clone(), Arc::new(UnavailableOracle));

        let first = normalizer
            .normalize(&strings(&["Terraform"]), SkillCategory::Hard)
            .await
            .unwrap();
        let second = normalizer
            .normalize(&strings(&["terraform"]), SkillCategory::Hard)
            .await
            .unwrap();

        assert_eq!(first, vec!["Terraform"]);
        assert_eq!(second, vec!["Terraform"]);
        assert_eq!(store.snapshot().len(), 1);
        assert_eq!(store.save_count(), 1);
    }

    #[tokio::test]
    async fn test_transport_error_propagates() {
        let mut registry = SkillRegistry::new();
        registry.insert("Kubernetes", RegistryEntry::new(SkillCategory::Hard));
        let store = seeded_store(registry);
        let normalizer = SkillNormalizer::new(store.clone(), Arc::new(UnavailableOracle));

        let err = normalizer
            .normalize(&strings(&["Go", "kubernetes cluster"]), SkillCategory::Hard)
            .await
            .unwrap_err();

        assert!(matches!(err, Error::LLMError(_)));
        // admission before the oracle call stays persisted
        assert!(store.snapshot().get("Go").is_some());
    }

    #[tokio::test]
    async fn test_invented_oracle_answer_is_admitted() {
        let mut registry = SkillRegistry::new();
        registry.insert("Kubernetes", RegistryEntry::new(SkillCategory::Hard));
        let store = seeded_store(registry);
        let normalizer = SkillNormalizer::new(
            store.clone(),
            ScriptedOracle::new(r#"{"kubernetes cluster": "K8s Platform"}"#),
        );

        let output = normalizer
            .normalize(&strings(&["kubernetes cluster"]), SkillCategory::Hard)
            .await
            .unwrap();

        assert_eq!(output, vec!["kubernetes cluster"]);
        assert!(store.snapshot().get("K8s Platform").is_none());
    }

    #[tokio::test]
    async fn test_synonym_learning() {
        let mut registry = SkillRegistry::new();
        registry.insert("PostgreSQL", RegistryEntry::new(SkillCategory::Hard));
        let store = seeded_store(registry);
        let normalizer = SkillNormalizer::new(store.clone(), ScriptedOracle::new("{}"))
            .with_synonym_learning(true);

        normalizer
            .normalize(&strings(&["Postgres"]), SkillCategory::Hard)
            .await
            .unwrap();
        assert_eq!(
            store.snapshot().get("PostgreSQL").unwrap().synonyms,
            vec!["Postgres"]
        );

        // the learned synonym now matches exactly, nothing more is written
        let output = normalizer
            .normalize_detailed(&strings(&["postgres"]), SkillCategory::Hard)
            .await
            .unwrap();
        assert_eq!(output[0].resolution, SkillResolution::Exact);
        assert_eq!(store.save_count(), 1);
    }

    #[tokio::test]
    async fn test_normalize_entities_order_and_identity() {
        let store = seeded_store(react_registry());
        let oracle = ScriptedOracle::new("{}");
        let normalizer = SkillNormalizer::new(store.clone(), oracle.clone());

        let entities = ExtractedEntities {
            people: vec![
                Person::new("Ada")
                    .with_hard_skills(["ReactJS", "Elixir"])
                    .with_soft_skills(["mentoring"]),
                Person::new("Grace")
                    .with_hard_skills(["elixir"])
                    .with_soft_skills(["Mentoring"]),
            ],
            projects: vec![Project::new("Atlas", "Data platform").with_technologies(["React.js"])],
            relationships: vec![Relationship::new("Ada", "Atlas", "lead")],
        };

        let normalized = normalizer.normalize_entities(entities.clone()).await.unwrap();

        assert_eq!(normalized.people[0].hard_skills, vec!["React", "Elixir"]);
        assert_eq!(normalized.people[0].soft_skills, vec!["mentoring"]);
        assert_eq!(normalized.people[1].hard_skills, vec!["Elixir"]);
        assert_eq!(normalized.people[1].soft_skills, vec!["mentoring"]);
        assert_eq!(normalized.projects[0].technologies, vec!["React"]);
        assert_eq!(normalized.people[0].name, "Ada");
        assert_eq!(normalized.projects[0].description, "Data platform");
        assert_eq!(normalized.relationships, entities.relationships);

        let registry = store.snapshot();
        assert_eq!(registry.canonical_names(), vec!["React", "Elixir", "mentoring"]);
        assert_eq!(registry.get("mentoring").unwrap().category, SkillCategory::Soft);
        assert_eq!(oracle.calls(), 0);
    }

    #[tokio::test]
    async fn test_add_canonical() {
        let store = seeded_store(react_registry());
        let normalizer = SkillNormalizer::new(store.clone(), ScriptedOracle::new("{}"));

        let (name, changed) = normalizer
            .add_canonical("react", SkillCategory::Hard, &strings(&["reactjs", "React Native"]))
            .await
            .unwrap();
        assert_eq!(name, "React");
        assert!(changed);
        assert_eq!(
            store.snapshot().get("React").unwrap().synonyms,
            vec!["React.js", "ReactJS", "React Native"]
        );

        let (_, changed) = normalizer
            .add_canonical("React", SkillCategory::Hard, &[])
            .await
            .unwrap();
        assert!(!changed);
        assert_eq!(store.save_count(), 1);
    }

    #[tokio::test]
    async fn test_from_config_applies_thresholds() {
        let config = NormalizationConfig {
            high_confidence_threshold: 0.7,
            uncertain_threshold: 0.5,
            ..NormalizationConfig::default()
        };
        let mut registry = SkillRegistry::new();
        registry.insert("Kubernetes", RegistryEntry::new(SkillCategory::Hard));
        let oracle = ScriptedOracle::new("{}");
        let normalizer = SkillNormalizer::from_config(&config, seeded_store(registry), oracle.clone());

        let output = normalizer
            .normalize(&strings(&["kubernetes cluster"]), SkillCategory::Hard)
            .await
            .unwrap();
        assert_eq!(output, vec!["Kubernetes"]);
        assert_eq!(oracle.calls(), 0);
    }

    #[tokio::test]
    async fn test_unwritable_registry_aborts_normalization() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("f");
        std::fs::write(&blocker, "not a directory").unwrap();
        let store = Arc::new(crate::normalization::store::JsonFileRegistryStore::new(
            blocker.join("r.json"),
        ));
        let normalizer = SkillNormalizer::new(store, Arc::new(UnavailableOracle));

        let err = normalizer
            .normalize(&strings(&["Rust"]), SkillCategory::Hard)
            .await
            .unwrap_err();

        assert!(matches!(err, Error::RegistryIo { .. }));
        assert_eq!(err.code(), "E001");
    }

    #[tokio::test]
    async fn test_failed_save_keeps_earlier_admissions() {
        let store = Arc::new(FailingSaveStore {
            inner: MemoryRegistryStore::new(),
            allowed: 1,
        });
        let normalizer = SkillNormalizer::new(store.clone(), Arc::new(UnavailableOracle));

        let entities = ExtractedEntities {
            people: vec![
                Person::new("Ada")
                    .with_hard_skills(["Elixir"])
                    .with_soft_skills(["mentoring"]),
            ],
            ..ExtractedEntities::default()
        };

        let err = normalizer.normalize_entities(entities).await.unwrap_err();

        assert!(matches!(err, Error::RegistryIo { .. }));
        let persisted = store.inner.snapshot();
        assert_eq!(persisted.canonical_names(), vec!["Elixir"]);
        assert_eq!(store.inner.save_count(), 1);
    }

    #[tokio::test]
    async fn test_blank_only_list_leaves_registry_untouched() {
        let store = seeded_store(react_registry());
        let oracle = ScriptedOracle::new("{}");
        let normalizer = SkillNormalizer::new(store.clone(), oracle.clone());

        let output = normalizer
            .normalize_detailed(&strings(&["", "   ", "\t"]), SkillCategory::Hard)
            .await
            .unwrap();

        assert!(output.iter().all(|s| s.canonical.is_empty()));
        assert!(output.iter().all(|s| s.resolution == SkillResolution::Blank));
        assert_eq!(store.save_count(), 0);
        assert_eq!(store.snapshot(), react_registry());
        assert_eq!(oracle.calls(), 0);
    }

    #[tokio::test]
    async fn test_admitted_term_is_stored_trimmed() {
        let store = seeded_store(SkillRegistry::new());
        let normalizer = SkillNormalizer::new(store.clone(), Arc::new(UnavailableOracle));

        let output = normalizer
            .normalize(&strings(&["  Go  "]), SkillCategory::Hard)
            .await
            .unwrap();

        assert_eq!(output, vec!["Go"]);
        assert_eq!(store.snapshot().canonical_names(), vec!["Go"]);
    }

    #[tokio::test]
    async fn test_normalize_entities_counts_admissions() {
        let store = seeded_store(react_registry());
        let normalizer = SkillNormalizer::new(store.clone(), ScriptedOracle::new("{}"));
        let entities = ExtractedEntities {
            people: vec![
                Person::new("Ada")
                    .with_hard_skills(["ReactJS", "Elixir", "elixir"])
                    .with_soft_skills(["mentoring"]),
            ],
            ..ExtractedEntities::default()
        };

        let (_, admitted) = normalizer
            .normalize_entities_counted(entities.clone())
            .await
            .unwrap();
        assert_eq!(admitted, 2);

        let (_, admitted) = normalizer.normalize_entities_counted(entities).await.unwrap();
        assert_eq!(admitted, 0);
    }
}
