//! Configuration management with file persistence

use anyhow::{Context, anyhow};
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::PathBuf;

/// File name of the canonical skill registry inside the data directory
pub const REGISTRY_FILE_NAME: &str = "skill_registry.json";

/// Skillgraph configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub llm: LlmConfig,
    pub normalization: NormalizationConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    #[serde(skip)]
    pub api_key: Option<String>,
    /// Model used for the uncertain-skill resolution round trip
    pub default_model: String,
    /// Model used for document entity extraction
    pub extraction_model: String,
    pub temperature: f32,
    pub max_tokens: usize,
    pub timeout_secs: u64,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            default_model: "anthropic/claude-3-5-haiku-latest".to_string(),
            extraction_model: "anthropic/claude-sonnet-4-20250514".to_string(),
            temperature: 0.0,
            max_tokens: 4000,
            timeout_secs: 120,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NormalizationConfig {
    /// Fuzzy scores strictly above this are accepted without the oracle
    pub high_confidence_threshold: f64,
    /// Fuzzy scores at or below this admit the term as a new canonical skill
    pub uncertain_threshold: f64,
    /// Append accepted fuzzy variants to the matched entry's synonyms
    pub learn_synonyms: bool,
    /// Registry file override; defaults to `<data_dir>/skill_registry.json`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub registry_path: Option<PathBuf>,
}

impl Default for NormalizationConfig {
    fn default() -> Self {
        Self {
            high_confidence_threshold: 0.85,
            uncertain_threshold: 0.6,
            learn_synonyms: false,
            registry_path: None,
        }
    }
}

impl NormalizationConfig {
    pub fn validate(&self) -> anyhow::Result<()> {
        let (low, high) = (self.uncertain_threshold, self.high_confidence_threshold);
        if !(0.0..=1.0).contains(&low) || !(0.0..=1.0).contains(&high) {
            return Err(anyhow!("Normalization thresholds must be between 0.0 and 1.0"));
        }
        if low >= high {
            return Err(anyhow!(
                "normalization.uncertain_threshold ({}) must be below normalization.high_confidence_threshold ({})",
                low,
                high
            ));
        }
        Ok(())
    }

    /// Resolve the registry file location
    pub fn resolved_registry_path(&self) -> anyhow::Result<PathBuf> {
        match &self.registry_path {
            Some(path) => Ok(path.clone()),
            None => Ok(Config::data_dir()?.join(REGISTRY_FILE_NAME)),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            llm: LlmConfig::default(),
            normalization: NormalizationConfig::default(),
        }
    }
}

impl LlmConfig {
    pub fn resolved_api_key(&self) -> anyhow::Result<Option<String>> {
        self.enforce_env_only()?;

        Ok(env::var("SKILLGRAPH_API_KEY")
            .or_else(|_| env::var("OPENROUTER_API_KEY"))
            .ok())
    }

    pub fn redacted_api_key(&self) -> anyhow::Result<Option<String>> {
        self.resolved_api_key().map(|opt| {
            opt.map(|key| {
                if key.len() <= 4 {
                    "***".to_string()
                } else {
                    let suffix = &key[key.len() - 4..];
                    format!("***{}", suffix)
                }
            })
        })
    }

    pub fn enforce_env_only(&self) -> anyhow::Result<()> {
        if self.api_key.is_some() {
            return Err(anyhow!(
                "LLM API keys must be provided via environment variables, not stored in configuration"
            ));
        }
        Ok(())
    }
}

impl Config {
    /// Get the config directory path
    pub fn config_dir() -> anyhow::Result<PathBuf> {
        let dir = if let Ok(custom_dir) = env::var("SKILLGRAPH_CONFIG_DIR") {
            PathBuf::from(custom_dir)
        } else {
            dirs::config_dir()
                .ok_or_else(|| anyhow!("Could not determine config directory"))?
                .join("skillgraph")
        };
        Ok(dir)
    }

    /// Get the data directory path (holds the skill registry)
    pub fn data_dir() -> anyhow::Result<PathBuf> {
        let dir = if let Ok(custom_dir) = env::var("SKILLGRAPH_DATA_DIR") {
            PathBuf::from(custom_dir)
        } else {
            dirs::data_dir()
                .ok_or_else(|| anyhow!("Could not determine data directory"))?
                .join("skillgraph")
        };
        Ok(dir)
    }

    /// Get the config file path
    pub fn config_path() -> anyhow::Result<PathBuf> {
        Ok(Self::config_dir()?.join("config.toml"))
    }

    /// Load configuration from file, or create default if it doesn't exist
    pub fn load() -> anyhow::Result<Self> {
        let path = Self::config_path()?;

        if path.exists() {
            let contents = fs::read_to_string(&path)
                .with_context(|| format!("Failed to read config file: {}", path.display()))?;
            let config = Self::from_toml(&contents)
                .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
            Ok(config)
        } else {
            Ok(Config::default())
        }
    }

    /// Parse and validate configuration from TOML text
    ///
    /// Missing sections and keys take their defaults. An `api_key` under
    /// `[llm]` is rejected rather than ignored.
    pub fn from_toml(contents: &str) -> anyhow::Result<Self> {
        let raw: toml::Table = toml::from_str(contents)?;
        if raw
            .get("llm")
            .and_then(|llm| llm.as_table())
            .is_some_and(|llm| llm.contains_key("api_key"))
        {
            return Err(anyhow!(
                "llm.api_key must not be stored in the config file. \
                 Set SKILLGRAPH_API_KEY or OPENROUTER_API_KEY instead."
            ));
        }

        let config: Config = toml::Value::Table(raw).try_into()?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to file
    pub fn save(&self) -> anyhow::Result<()> {
        self.validate()?;

        let dir = Self::config_dir()?;
        fs::create_dir_all(&dir)
            .with_context(|| format!("Failed to create config directory: {}", dir.display()))?;

        let path = Self::config_path()?;
        let contents = toml::to_string_pretty(self).context("Failed to serialize config")?;

        fs::write(&path, contents)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    /// Validate configuration
    pub fn validate(&self) -> anyhow::Result<()> {
        self.llm.enforce_env_only()?;
        self.normalization.validate()
    }

    /// Get a configuration value by key
    pub fn get(&self, key: &str) -> anyhow::Result<String> {
        match key {
            "llm.default_model" => Ok(self.llm.default_model.clone()),
            "llm.extraction_model" => Ok(self.llm.extraction_model.clone()),
            "llm.temperature" => Ok(self.llm.temperature.to_string()),
            "llm.max_tokens" => Ok(self.llm.max_tokens.to_string()),
            "llm.timeout_secs" => Ok(self.llm.timeout_secs.to_string()),

            "normalization.high_confidence_threshold" => {
                Ok(self.normalization.high_confidence_threshold.to_string())
            }
            "normalization.uncertain_threshold" => {
                Ok(self.normalization.uncertain_threshold.to_string())
            }
            "normalization.learn_synonyms" => Ok(self.normalization.learn_synonyms.to_string()),
            "normalization.registry_path" => Ok(self
                .normalization
                .resolved_registry_path()?
                .display()
                .to_string()),

            // Shown redacted
            "llm.api_key" | "api_key" => match self.llm.redacted_api_key()? {
                Some(redacted) => Ok(redacted),
                None => Ok(
                    "(not set - use SKILLGRAPH_API_KEY or OPENROUTER_API_KEY env var)".to_string(),
                ),
            },

            _ => Err(anyhow!(
                "Unknown configuration key: {}. Use `skillgraph config list` to see available keys.",
                key
            )),
        }
    }

    /// Set a configuration value by key
    pub fn set(&mut self, key: &str, value: &str) -> anyhow::Result<()> {
        match key {
            "llm.default_model" => {
                self.llm.default_model = value.to_string();
            }
            "llm.extraction_model" => {
                self.llm.extraction_model = value.to_string();
            }
            "llm.temperature" => {
                let temp: f32 = value
                    .parse()
                    .with_context(|| format!("Invalid temperature value: {}", value))?;
                if !(0.0..=2.0).contains(&temp) {
                    return Err(anyhow!("Temperature must be between 0.0 and 2.0"));
                }
                self.llm.temperature = temp;
            }
            "llm.max_tokens" => {
                self.llm.max_tokens = value
                    .parse()
                    .with_context(|| format!("Invalid max_tokens value: {}", value))?;
            }
            "llm.timeout_secs" => {
                self.llm.timeout_secs = value
                    .parse()
                    .with_context(|| format!("Invalid timeout_secs value: {}", value))?;
            }

            "normalization.high_confidence_threshold" => {
                let mut candidate = self.normalization.clone();
                candidate.high_confidence_threshold = value
                    .parse()
                    .with_context(|| format!("Invalid threshold value: {}", value))?;
                candidate.validate()?;
                self.normalization = candidate;
            }
            "normalization.uncertain_threshold" => {
                let mut candidate = self.normalization.clone();
                candidate.uncertain_threshold = value
                    .parse()
                    .with_context(|| format!("Invalid threshold value: {}", value))?;
                candidate.validate()?;
                self.normalization = candidate;
            }
            "normalization.learn_synonyms" => {
                self.normalization.learn_synonyms = value
                    .parse()
                    .with_context(|| format!("Invalid boolean value: {}", value))?;
            }
            "normalization.registry_path" => {
                self.normalization.registry_path = if value.trim().is_empty() {
                    None
                } else {
                    Some(PathBuf::from(value))
                };
            }

            "llm.api_key" | "api_key" => {
                return Err(anyhow!(
                    "API keys cannot be stored in configuration for security. \
                     Set the SKILLGRAPH_API_KEY or OPENROUTER_API_KEY environment variable instead."
                ));
            }

            _ => {
                return Err(anyhow!(
                    "Unknown configuration key: {}. Use `skillgraph config list` to see available keys.",
                    key
                ));
            }
        }
        Ok(())
    }

    /// List all configuration keys and their values
    pub fn list(&self) -> anyhow::Result<Vec<(String, String)>> {
        let keys = vec![
            "llm.default_model",
            "llm.extraction_model",
            "llm.temperature",
            "llm.max_tokens",
            "llm.timeout_secs",
            "llm.api_key",
            "normalization.high_confidence_threshold",
            "normalization.uncertain_threshold",
            "normalization.learn_synonyms",
            "normalization.registry_path",
        ];

        keys.into_iter()
            .map(|key| {
                let value = self.get(key)?;
                Ok((key.to_string(), value))
            })
            .collect()
    }

    /// Reset configuration to defaults
    pub fn reset() -> anyhow::Result<()> {
        let path = Self::config_path()?;
        if path.exists() {
            fs::remove_file(&path)
                .with_context(|| format!("Failed to remove config file: {}", path.display()))?;
        }
        Ok(())
    }
}
