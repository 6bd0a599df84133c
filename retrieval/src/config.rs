//! Configuration for the question-answering service.

use std::path::PathBuf;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{Result, RetrievalError};

/// Configuration for the question-answering service.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RetrievalConfig {
    /// Document store configuration.
    pub store: StoreConfig,

    /// Embedding provider configuration.
    pub embedding: EmbeddingConfig,

    /// Answer provider configuration.
    pub answer: AnswerConfig,

    /// Query processing configuration.
    pub query: QueryConfig,
}

impl RetrievalConfig {
    /// Load configuration from the process environment, reading a `.env`
    /// file first if one exists.
    pub fn from_env() -> Result<Self> {
        match dotenvy::dotenv() {
            Ok(path) => debug!("Loaded environment from {}", path.display()),
            Err(e) if e.not_found() => {}
            Err(e) => warn!("Ignoring unreadable .env file: {e}"),
        }
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary variable lookup. Unset and
    /// empty variables keep their defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());
        let mut config = Self::default();

        if let Some(key) = var("OPENAI_API_KEY") {
            config.embedding.api_key = Some(key.clone());
            config.answer.api_key = Some(key);
        }
        if let Some(url) = var("OPENAI_BASE_URL") {
            config.embedding.base_url = url.clone();
            config.answer.base_url = url;
        }
        if let Some(model) = var("EMBEDDING_MODEL") {
            config.embedding.model = model;
        }
        if let Some(model) = var("QA_MODEL").or_else(|| var("LLM")) {
            config.answer.model = model;
        }
        if let Some(path) = var("DOCQA_STORE_PATH") {
            config.store.path = Some(PathBuf::from(path));
        }
        config.store.dimension = parse_var(&var, "DOCQA_DIMENSION")?;

        Ok(config)
    }

    /// Set the store configuration.
    pub fn with_store(mut self, config: StoreConfig) -> Self {
        self.store = config;
        self
    }

    /// Set the embedding configuration.
    pub fn with_embedding(mut self, config: EmbeddingConfig) -> Self {
        self.embedding = config;
        self
    }

    /// Set the answer configuration.
    pub fn with_answer(mut self, config: AnswerConfig) -> Self {
        self.answer = config;
        self
    }

    /// Set the query configuration.
    pub fn with_query(mut self, config: QueryConfig) -> Self {
        self.query = config;
        self
    }
}

fn parse_var<T, F>(var: &F, key: &str) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: std::fmt::Display,
    F: Fn(&str) -> Option<String>,
{
    var(key)
        .map(|raw| {
            raw.trim()
                .parse()
                .map_err(|e| RetrievalError::Config(format!("{key}={raw}: {e}")))
        })
        .transpose()
}

/// Where and how documents are stored.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Snapshot file for a durable store; `None` keeps documents in memory.
    pub path: Option<PathBuf>,

    /// Required embedding dimension; `None` adopts the first document's.
    pub dimension: Option<usize>,
}

/// Configuration for the embedding provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbeddingConfig {
    /// API key. Never serialized.
    #[serde(skip_serializing, default)]
    pub api_key: Option<String>,

    /// API base URL.
    pub base_url: String,

    /// Model to use for embeddings.
    pub model: String,

    /// Per-request timeout.
    pub timeout_secs: u64,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: docqa_embeddings::DEFAULT_BASE_URL.to_string(),
            model: docqa_embeddings::DEFAULT_MODEL.to_string(),
            timeout_secs: 30,
        }
    }
}

/// Configuration for the answer provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnswerConfig {
    /// API key. Never serialized.
    #[serde(skip_serializing, default)]
    pub api_key: Option<String>,

    /// API base URL.
    pub base_url: String,

    /// Chat model.
    pub model: String,

    /// Sampling temperature.
    pub temperature: f32,

    /// Response length limit in tokens.
    pub max_tokens: u32,

    /// Per-request timeout.
    pub timeout_secs: u64,
}

impl Default for AnswerConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: docqa_answer::DEFAULT_BASE_URL.to_string(),
            model: docqa_answer::DEFAULT_MODEL.to_string(),
            temperature: 0.2,
            max_tokens: 500,
            timeout_secs: 60,
        }
    }
}

/// Configuration for query processing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryConfig {
    /// Results returned by search when the caller gives no `k`.
    pub default_top_k: usize,

    /// Documents retrieved as context for a question.
    pub ask_top_k: usize,

    /// Maximum snippet length in characters.
    pub snippet_max_chars: usize,
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self {
            default_top_k: 5,
            ask_top_k: 3,
            snippet_max_chars: 200,
        }
    }
}
