//! Registry persistence
//!
//! The registry is always read and written whole. The JSON file store writes
//! to a sibling temp file and renames it over the target, so readers never see
//! a half-written registry.

use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use tracing::{debug, info};

use crate::error::{Error, Result};

use super::registry::SkillRegistry;

/// Durable storage for the canonical skill registry
#[async_trait]
pub trait RegistryStore: Send + Sync {
    /// Load the registry; a store that does not exist yet yields an empty registry
    async fn load(&self) -> Result<SkillRegistry>;

    /// Replace the stored registry with `registry`
    async fn save(&self, registry: &SkillRegistry) -> Result<()>;

    /// Human-readable location, used in logs and CLI output
    fn location(&self) -> String;
}

/// Registry stored as pretty-printed JSON in a single file
#[derive(Debug, Clone)]
pub struct JsonFileRegistryStore {
    path: PathBuf,
}

impl JsonFileRegistryStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_else(|| "skill_registry.json".into());
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

#[async_trait]
impl RegistryStore for JsonFileRegistryStore {
    async fn load(&self) -> Result<SkillRegistry> {
        let contents = match tokio::fs::read_to_string(&self.path).await {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "No registry file yet, starting empty");
                return Ok(SkillRegistry::new());
            }
            Err(e) => return Err(Error::registry_io(&self.path, e)),
        };

        if contents.trim().is_empty() {
            return Ok(SkillRegistry::new());
        }

        let registry: SkillRegistry =
            serde_json::from_str(&contents).map_err(|e| Error::RegistryCorrupt {
                path: self.path.display().to_string(),
                reason: e.to_string(),
            })?;

        debug!(path = %self.path.display(), skills = registry.len(), "Loaded skill registry");
        Ok(registry)
    }

    async fn save(&self, registry: &SkillRegistry) -> Result<()> {
        let contents = serde_json::to_string_pretty(registry)?;

        if let Some(dir) = self.path.parent()
            && !dir.as_os_str().is_empty()
        {
            tokio::fs::create_dir_all(dir)
                .await
                .map_err(|e| Error::registry_io(dir, e))?;
        }

        let temp = self.temp_path();
        tokio::fs::write(&temp, contents)
            .await
            .map_err(|e| Error::registry_io(&temp, e))?;
        tokio::fs::rename(&temp, &self.path)
            .await
            .map_err(|e| Error::registry_io(&self.path, e))?;

        info!(path = %self.path.display(), skills = registry.len(), "Saved skill registry");
        Ok(())
    }

    fn location(&self) -> String {
        self.path.display().to_string()
    }
}

/// In-process registry store, for tests and dry runs
///
/// Counts saves so callers can assert that a call did not write.
#[derive(Debug, Default)]
pub struct MemoryRegistryStore {
    registry: Mutex<SkillRegistry>,
    saves: AtomicUsize,
}

impl MemoryRegistryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_registry(registry: SkillRegistry) -> Self {
        Self {
            registry: Mutex::new(registry),
            saves: AtomicUsize::new(0),
        }
    }

    /// Number of completed `save` calls
    pub fn save_count(&self) -> usize {
        self.saves.load(Ordering::SeqCst)
    }

    /// Copy of the currently stored registry
    pub fn snapshot(&self) -> SkillRegistry {
        self.registry
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }
}

#[async_trait]
impl RegistryStore for MemoryRegistryStore {
    async fn load(&self) -> Result<SkillRegistry> {
        Ok(self.snapshot())
    }

    async fn save(&self, registry: &SkillRegistry) -> Result<()> {
        *self
            .registry
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = registry.clone();
        self.saves.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn location(&self) -> String {
        "memory".to_string()
    }
}
