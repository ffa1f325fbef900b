//! Skillgraph Core Integration Tests

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use tempfile::tempdir;

use skillgraph_core::{
    Error, Result,
    commands::{ingest, registry},
    entities::{EntitySource, ExtractedEntities, Person, Project, Relationship},
    normalization::{
        JsonFileRegistryStore, RegistryEntry, RegistryStore, SkillCategory, SkillNormalizer,
        SkillOracle, SkillRegistry, UnavailableOracle,
    },
};

struct ScriptedOracle {
    reply: String,
    calls: AtomicUsize,
}

impl ScriptedOracle {
    fn new(reply: &str) -> Arc<Self> {
        Arc::new(Self {
            reply: reply.to_string(),
            calls: AtomicUsize::new(0),
        })
    }
}

#[async_trait]
impl SkillOracle for ScriptedOracle {
    async fn classify(&self, _terms: &[String], _names: &[String]) -> Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.reply.clone())
    }
}

struct ScriptedExtractor(ExtractedEntities);

#[async_trait]
impl EntitySource for ScriptedExtractor {
    async fn extract(&self, _text: &str) -> Result<ExtractedEntities> {
        Ok(self.0.clone())
    }
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

async fn seeded_file_store(dir: &std::path::Path) -> Arc<JsonFileRegistryStore> {
    let store = Arc::new(JsonFileRegistryStore::new(dir.join("skill_registry.json")));
    let mut seed = SkillRegistry::new();
    seed.insert(
        "React",
        RegistryEntry::new(SkillCategory::Hard).with_synonyms(strings(&["React.js", "ReactJS"])),
    );
    seed.insert("Kubernetes", RegistryEntry::new(SkillCategory::Hard));
    seed.insert("leadership", RegistryEntry::new(SkillCategory::Soft));
    store.save(&seed).await.unwrap();
    store
}

#[tokio::test]
async fn test_file_backed_normalization_persists() {
    let dir = tempdir().unwrap();
    let store = seeded_file_store(dir.path()).await;
    let normalizer = SkillNormalizer::new(store.clone(), ScriptedOracle::new("{}"));

    let output = normalizer
        .normalize(&strings(&["react.js", "Reactjs", "Vue"]), SkillCategory::Hard)
        .await
        .unwrap();
    assert_eq!(output, vec!["React", "React", "Vue"]);

    // A fresh store over the same file sees the admitted term
    let reloaded = JsonFileRegistryStore::new(store.path()).load().await.unwrap();
    assert_eq!(
        reloaded.canonical_names(),
        vec!["React", "Kubernetes", "leadership", "Vue"]
    );

    let raw: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(store.path()).unwrap()).unwrap();
    assert_eq!(raw["Vue"], serde_json::json!({"category": "hard", "synonyms": []}));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_calls_admit_one_entry() {
    let dir = tempdir().unwrap();
    let store = seeded_file_store(dir.path()).await;
    let normalizer = Arc::new(SkillNormalizer::new(store.clone(), Arc::new(UnavailableOracle)));

    let mut handles = Vec::new();
    for i in 0..16 {
        let normalizer = normalizer.clone();
        let term = if i % 2 == 0 { "Terraform" } else { "terraform" };
        handles.push(tokio::spawn(async move {
            normalizer
                .normalize(&strings(&[term, "Ansible"]), SkillCategory::Hard)
                .await
        }));
    }

    for handle in handles {
        let output = handle.await.unwrap().unwrap();
        assert_eq!(output.len(), 2);
        assert!(output[0].eq_ignore_ascii_case("terraform"));
        assert_eq!(output[1], "Ansible");
    }

    let registry = store.load().await.unwrap();
    assert_eq!(registry.len(), 5);
    let terraform: Vec<_> = registry
        .canonical_names()
        .into_iter()
        .filter(|n| n.eq_ignore_ascii_case("terraform"))
        .collect();
    assert_eq!(terraform.len(), 1);
}

#[tokio::test]
async fn test_corrupt_registry_aborts_without_overwrite() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("skill_registry.json");
    std::fs::write(&path, "{\"React\": ").unwrap();

    let normalizer = SkillNormalizer::new(
        Arc::new(JsonFileRegistryStore::new(&path)),
        Arc::new(UnavailableOracle),
    );
    let err = normalizer
        .normalize(&strings(&["Vue"]), SkillCategory::Hard)
        .await
        .unwrap_err();

    assert!(matches!(err, Error::RegistryCorrupt { .. }));
    assert_eq!(std::fs::read_to_string(&path).unwrap(), "{\"React\": ");
}

#[tokio::test]
async fn test_ingest_pipeline_end_to_end() {
    let dir = tempdir().unwrap();
    let store = seeded_file_store(dir.path()).await;
    let oracle = ScriptedOracle::new(
        "```json\n{\"kubernetes cluster\": \"Kubernetes\", \"team leadership\": \"leadership\"}\n```",
    );
    let normalizer = SkillNormalizer::new(store.clone(), oracle.clone());

    let extractor = ScriptedExtractor(ExtractedEntities {
        people: vec![
            Person::new("Maria Chen")
                .with_hard_skills(["ReactJS", "kubernetes cluster"])
                .with_soft_skills(["team leadership", "Mentoring"]),
        ],
        projects: vec![
            Project::new("Atlas", "Internal deployment platform")
                .with_technologies(["React.js", "Helm"]),
        ],
        relationships: vec![Relationship::new("Maria Chen", "Atlas", "tech lead")],
    });

    let doc = dir.path().join("status.txt");
    std::fs::write(&doc, "Maria Chen led the Atlas platform work.").unwrap();

    let report = ingest::ingest_file(&doc, &extractor, &normalizer).await.unwrap();

    let person = &report.entities.people[0];
    assert_eq!(person.hard_skills, vec!["React", "Kubernetes"]);
    assert_eq!(person.soft_skills, vec!["leadership", "Mentoring"]);
    assert_eq!(report.entities.projects[0].technologies, vec!["React", "Helm"]);
    assert_eq!(report.new_skills, 2);
    // one oracle round trip per skill list that had uncertain terms
    assert_eq!(oracle.calls.load(Ordering::SeqCst), 2);

    let skills = registry::list_skills(&normalizer, Some(SkillCategory::Soft))
        .await
        .unwrap();
    let names: Vec<_> = skills.iter().map(|s| s.name.as_str()).collect();
    assert_eq!(names, vec!["leadership", "Mentoring"]);
}
