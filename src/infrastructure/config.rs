use serde::Deserialize;
use std::path::Path;

use crate::application::RetrievalLimits;

pub const DEFAULT_CONFIG_PATH: &str = "config.yaml";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },
    #[error("Failed to parse config file: {0}")]
    Parse(#[from] serde_yaml::Error),
    #[error("Invalid value for {key}: {value}")]
    InvalidOverride { key: &'static str, value: String },
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub embedding: EmbeddingConfig,
    pub vector_store: VectorStoreConfig,
    pub retrieval: RetrievalConfig,
    pub cors: CorsConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct EmbeddingConfig {
    pub model: String,
    pub dimension: usize,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct VectorStoreConfig {
    pub url: String,
    pub api_key: Option<String>,
    pub products_collection: String,
    pub reviews_collection: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RetrievalConfig {
    /// Candidates fetched per product query before deduplication.
    pub product_candidate_pool: usize,
    /// Floor for the second, widened review fallback round.
    pub review_fallback_pool: usize,
    pub max_product_k: usize,
    pub max_review_k: usize,
    pub default_product_k: i64,
    pub default_review_k: i64,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct CorsConfig {
    pub allowed_origins: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
        }
    }
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            model: "text-embedding-3-small".to_string(),
            dimension: 1536,
        }
    }
}

impl Default for VectorStoreConfig {
    fn default() -> Self {
        Self {
            url: "http://localhost:6334".to_string(),
            api_key: None,
            products_collection: "products".to_string(),
            reviews_collection: "reviews".to_string(),
        }
    }
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            product_candidate_pool: 20,
            review_fallback_pool: 50,
            max_product_k: 50,
            max_review_k: 100,
            default_product_k: 3,
            default_review_k: 3,
        }
    }
}

impl RetrievalConfig {
    pub fn limits(&self) -> RetrievalLimits {
        RetrievalLimits {
            max_product_k: self.max_product_k,
            max_review_k: self.max_review_k,
        }
    }
}

impl Config {
    /// Reads `CONFIG_PATH` (or `config.yaml`) when present, then applies
    /// environment overrides. A missing file means defaults.
    pub fn load() -> Result<Self, ConfigError> {
        let path = std::env::var("CONFIG_PATH").unwrap_or_else(|_| DEFAULT_CONFIG_PATH.into());
        let mut config = if Path::new(&path).exists() {
            Self::from_file(&path)?
        } else {
            Self::default()
        };
        config.apply_overrides(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    pub fn from_file(path: &str) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_string(),
            source,
        })?;
        Self::from_yaml(&raw)
    }

    pub fn from_yaml(raw: &str) -> Result<Self, ConfigError> {
        if raw.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(raw)?)
    }

    pub fn apply_overrides(
        &mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<(), ConfigError> {
        if let Some(host) = lookup("SERVER_HOST") {
            self.server.host = host;
        }
        if let Some(port) = lookup("SERVER_PORT") {
            self.server.port = parse_override("SERVER_PORT", port)?;
        }
        if let Some(url) = lookup("QDRANT_URL") {
            self.vector_store.url = url;
        }
        if let Some(key) = lookup("QDRANT_API_KEY") {
            self.vector_store.api_key = Some(key);
        }
        if let Some(name) = lookup("PRODUCTS_COLLECTION") {
            self.vector_store.products_collection = name;
        }
        if let Some(name) = lookup("REVIEWS_COLLECTION") {
            self.vector_store.reviews_collection = name;
        }
        if let Some(model) = lookup("EMBEDDING_MODEL") {
            self.embedding.model = model;
        }
        if let Some(dimension) = lookup("EMBEDDING_DIMENSION") {
            self.embedding.dimension = parse_override("EMBEDDING_DIMENSION", dimension)?;
        }
        Ok(())
    }
}

fn parse_override<T: std::str::FromStr>(
    key: &'static str,
    value: String,
) -> Result<T, ConfigError> {
    value
        .parse()
        .map_err(|_| ConfigError::InvalidOverride { key, value })
}
