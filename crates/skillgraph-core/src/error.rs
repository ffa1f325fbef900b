//! Error types for Skillgraph

use thiserror::Error;

/// Result type alias using Skillgraph's Error
pub type Result<T> = std::result::Result<T, Error>;

/// Skillgraph error types with helpful messages and suggestions
#[derive(Error, Debug)]
pub enum Error {
    // Registry errors (E001-E099)
    #[error("Skill registry I/O failed at {path}: {source}")]
    RegistryIo {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Skill registry at {path} is not valid JSON: {reason}")]
    RegistryCorrupt { path: String, reason: String },

    #[error("Skill '{0}' not found. Run `skillgraph registry list` to see all canonical skills.")]
    SkillNotFound(String),

    // Network errors (E100-E199)
    #[error("Network error: {0}. Check your internet connection.")]
    NetworkError(#[from] reqwest::Error),

    #[error("LLM API error: {0}. Check your API key with `skillgraph config get llm.api_key`.")]
    LLMError(String),

    #[error("Rate limited. Waiting {0} seconds before retry.")]
    RateLimited(u64),

    // Extraction errors (E200-E299)
    #[error("Entity extraction failed: {0}")]
    ExtractionFailed(String),

    #[error("Extracted entities failed validation: {}", .0.join("; "))]
    ValidationFailed(Vec<String>),

    // Config errors (E600-E699)
    #[error("Configuration error: {0}")]
    ConfigError(String),

    // Input errors (E800-E899)
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    // Generic errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Wrap an I/O failure on the registry file
    pub fn registry_io(path: &std::path::Path, source: std::io::Error) -> Self {
        Self::RegistryIo {
            path: path.display().to_string(),
            source,
        }
    }

    /// Get error code for this error type
    pub fn code(&self) -> &'static str {
        match self {
            Self::RegistryIo { .. } => "E001",
            Self::RegistryCorrupt { .. } => "E002",
            Self::SkillNotFound(_) => "E003",
            Self::NetworkError(_) => "E100",
            Self::LLMError(_) => "E101",
            Self::RateLimited(_) => "E102",
            Self::ExtractionFailed(_) => "E200",
            Self::ValidationFailed(_) => "E201",
            Self::ConfigError(_) => "E600",
            Self::InvalidInput(_) => "E800",
            Self::Serialization(_) | Self::Io(_) => "E9999",
        }
    }

    /// Get suggestion for how to fix this error
    pub fn suggestion(&self) -> Option<String> {
        match self {
            Self::RegistryIo { path, .. } => {
                Some(format!("Check that {} is writable", path))
            }
            Self::RegistryCorrupt { path, .. } => {
                Some(format!("Fix or remove {} to start from an empty registry", path))
            }
            Self::SkillNotFound(_) => Some("skillgraph registry list".to_string()),
            Self::NetworkError(_) => Some("Check internet connection".to_string()),
            Self::LLMError(_) => Some("skillgraph config get llm.api_key".to_string()),
            Self::ConfigError(_) => Some("skillgraph config list".to_string()),
            _ => None,
        }
    }

    /// Whether this error came from the oracle/LLM transport
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            Self::NetworkError(_) | Self::LLMError(_) | Self::RateLimited(_)
        )
    }
}
