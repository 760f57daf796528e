use serde::Deserialize;
use std::env;
use thiserror::Error;

/// Errors encountered while loading configuration from environment variables.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Required environment variable was not provided.
    #[error("Missing environment variable: {0}")]
    MissingVariable(String),
    /// Environment variable contained a value that could not be parsed.
    #[error("Invalid value for environment variable: {0}")]
    InvalidValue(String),
    /// Chunking parameters would produce overlapping or duplicate windows.
    #[error("stride ({stride}) must be smaller than chunk size ({chunk_size})")]
    InvalidChunking {
        /// Configured lines per chunk.
        chunk_size: usize,
        /// Configured line overlap between consecutive chunks.
        stride: usize,
    },
}

/// Runtime configuration for the loreforge pipeline.
///
/// Constructed once (usually via [`Config::from_env`]) and passed explicitly
/// into each service constructor, so tests can run several differently
/// configured pipelines in the same process.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Whether retrieval augmentation is enabled for prompt assembly.
    pub rag_enabled: bool,
    /// Pinecone API key used for both control-plane and data-plane calls.
    pub pinecone_api_key: String,
    /// Base URL of the Pinecone control plane.
    pub pinecone_api_base: String,
    /// Default Pinecone index name.
    pub pinecone_index_name: String,
    /// Serverless cloud provider for newly created indexes.
    pub pinecone_cloud: String,
    /// Serverless region for newly created indexes.
    pub pinecone_region: String,
    /// OpenAI API key used for embeddings.
    pub openai_api_key: String,
    /// Base URL of the OpenAI-compatible embeddings API.
    pub openai_api_base: String,
    /// Embedding model identifier passed to the provider.
    pub embedding_model: String,
    /// Dimensionality of the produced vectors; must match the index.
    pub embedding_dimension: usize,
    /// Number of nearest matches fetched per retrieval query.
    pub retrieval_top_k: usize,
    /// Maximum length of an assembled context string, in bytes.
    pub retrieval_max_context_chars: usize,
    /// Lines per chunk during document ingestion.
    pub chunk_size: usize,
    /// Line overlap between consecutive chunks.
    pub stride: usize,
    /// Namespace holding game-rule knowledge.
    pub rules_namespace: String,
    /// Namespace holding campaign-setting knowledge.
    pub setting_namespace: String,
    /// Namespace holding character and NPC knowledge.
    pub character_namespace: String,
}

impl Config {
    /// Load configuration from environment variables, performing validation along the way.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        let config = Self {
            rag_enabled: load_env_optional("RAG_ENABLED")
                .map(|value| parse_bool("RAG_ENABLED", &value))
                .transpose()?
                .unwrap_or(false),
            pinecone_api_key: load_env("PINECONE_API_KEY")?,
            pinecone_api_base: load_env_or("PINECONE_API_BASE", "https://api.pinecone.io"),
            pinecone_index_name: load_env_or("PINECONE_INDEX_NAME", "agentic-tabletop"),
            pinecone_cloud: load_env_or("PINECONE_CLOUD", "aws"),
            pinecone_region: load_env_or("PINECONE_REGION", "us-east-1"),
            openai_api_key: load_env("OPENAI_API_KEY")?,
            openai_api_base: load_env_or("OPENAI_API_BASE", "https://api.openai.com/v1"),
            embedding_model: load_env_or("EMBEDDING_MODEL", "text-embedding-3-small"),
            embedding_dimension: parse_env_or("EMBEDDING_DIMENSION", 1536)?,
            retrieval_top_k: parse_env_or("RETRIEVAL_TOP_K", 3)?,
            retrieval_max_context_chars: parse_env_or("RETRIEVAL_MAX_CONTEXT_CHARS", 8000)?,
            chunk_size: parse_env_or("PDF_CHUNK_SIZE", 5)?,
            stride: parse_env_or("PDF_STRIDE", 2)?,
            rules_namespace: load_env_or("RULES_NAMESPACE", "campaign-rules"),
            setting_namespace: load_env_or("SETTING_NAMESPACE", "campaign-setting"),
            character_namespace: load_env_or("CHARACTER_NAMESPACE", "campaign-characters"),
        };
        config.validate()?;
        Ok(config)
    }

    /// Validate cross-field invariants that cannot be checked per variable.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.stride >= self.chunk_size {
            return Err(ConfigError::InvalidChunking {
                chunk_size: self.chunk_size,
                stride: self.stride,
            });
        }
        if self.embedding_dimension == 0 {
            return Err(ConfigError::InvalidValue("EMBEDDING_DIMENSION".into()));
        }
        if self.retrieval_top_k == 0 {
            return Err(ConfigError::InvalidValue("RETRIEVAL_TOP_K".into()));
        }
        if self.retrieval_max_context_chars == 0 {
            return Err(ConfigError::InvalidValue(
                "RETRIEVAL_MAX_CONTEXT_CHARS".into(),
            ));
        }
        Ok(())
    }
}

fn load_env(key: &str) -> Result<String, ConfigError> {
    env::var(key)
        .ok()
        .filter(|value| !value.trim().is_empty())
        .ok_or_else(|| ConfigError::MissingVariable(key.to_string()))
}

fn load_env_optional(key: &str) -> Option<String> {
    env::var(key).ok().filter(|value| !value.trim().is_empty())
}

fn load_env_or(key: &str, default: &str) -> String {
    load_env_optional(key).unwrap_or_else(|| default.to_string())
}

fn parse_env_or(key: &str, default: usize) -> Result<usize, ConfigError> {
    load_env_optional(key)
        .map(|value| {
            value
                .parse()
                .map_err(|_| ConfigError::InvalidValue(key.to_string()))
        })
        .transpose()
        .map(|parsed| parsed.unwrap_or(default))
}

fn parse_bool(key: &str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::InvalidValue(key.to_string())),
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// Baseline config used across unit tests; individual tests override fields.
    pub(crate) fn test_config() -> Config {
        Config {
            rag_enabled: true,
            pinecone_api_key: "test-pinecone-key".into(),
            pinecone_api_base: "http://127.0.0.1:0".into(),
            pinecone_index_name: "agentic-tabletop".into(),
            pinecone_cloud: "aws".into(),
            pinecone_region: "us-east-1".into(),
            openai_api_key: "test-openai-key".into(),
            openai_api_base: "http://127.0.0.1:0".into(),
            embedding_model: "text-embedding-3-small".into(),
            embedding_dimension: 4,
            retrieval_top_k: 3,
            retrieval_max_context_chars: 8000,
            chunk_size: 5,
            stride: 2,
            rules_namespace: "campaign-rules".into(),
            setting_namespace: "campaign-setting".into(),
            character_namespace: "campaign-characters".into(),
        }
    }

    #[test]
    fn validate_rejects_stride_not_smaller_than_chunk_size() {
        let mut config = test_config();
        config.chunk_size = 4;
        config.stride = 4;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidChunking {
                chunk_size: 4,
                stride: 4
            })
        ));
    }

    #[test]
    fn validate_rejects_zero_dimension() {
        let mut config = test_config();
        config.embedding_dimension = 0;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidValue(_))
        ));
    }

    #[test]
    fn validate_accepts_defaults() {
        assert!(test_config().validate().is_ok());
    }

    #[test]
    fn parse_bool_accepts_common_spellings() {
        assert!(parse_bool("RAG_ENABLED", "true").unwrap());
        assert!(parse_bool("RAG_ENABLED", "YES").unwrap());
        assert!(!parse_bool("RAG_ENABLED", "0").unwrap());
        assert!(parse_bool("RAG_ENABLED", "maybe").is_err());
    }
}
