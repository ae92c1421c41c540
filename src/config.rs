use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;

/// Environment variable holding the API key for the courses/sections source.
pub const CATALOG_API_KEY_ENV: &str = "AIRTABLE_API_KEY";
/// Environment variable holding the API key for the separately-credentialed
/// descriptions source.
pub const DESCRIPTIONS_API_KEY_ENV: &str = "AIRTABLE_DESCRIPTIONS_API_KEY";
/// Environment variable holding the embedding provider's API key.
pub const EMBEDDING_API_KEY_ENV: &str = "OPENAI_API_KEY";
/// Environment variable holding the vector index's API key.
pub const INDEX_API_KEY_ENV: &str = "PINECONE_API_KEY";

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub catalog: CatalogConfig,
    #[serde(default)]
    pub embedding: EmbeddingConfig,
    pub index: IndexConfig,
    #[serde(default)]
    pub retrieval: RetrievalConfig,
    #[serde(default)]
    pub sync: SyncConfig,
}

/// Base and table identifiers for the three catalog tables.
///
/// The descriptions table lives in a separately-credentialed base; its key
/// is read from [`DESCRIPTIONS_API_KEY_ENV`] at client construction.
#[derive(Debug, Deserialize, Clone)]
pub struct CatalogConfig {
    pub courses_base: String,
    pub courses_table: String,
    pub sections_base: String,
    pub sections_table: String,
    pub descriptions_base: String,
    pub descriptions_table: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct EmbeddingConfig {
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            model: default_model(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

fn default_model() -> String {
    "text-embedding-3-small".to_string()
}
fn default_timeout_secs() -> u64 {
    30
}

/// Target vector index.
#[derive(Debug, Deserialize, Clone)]
pub struct IndexConfig {
    /// Index data-plane host, e.g. `https://courses-abc123.svc.us-east-1.pinecone.io`.
    pub host: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct RetrievalConfig {
    #[serde(default = "default_top_k")]
    pub top_k: usize,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            top_k: default_top_k(),
        }
    }
}

fn default_top_k() -> usize {
    5
}

#[derive(Debug, Deserialize, Clone)]
pub struct SyncConfig {
    /// Records per index upsert call; embeddings within a batch are
    /// requested concurrently.
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            batch_size: default_batch_size(),
        }
    }
}

fn default_batch_size() -> usize {
    100
}

pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    let config: Config = toml::from_str(&content).with_context(|| "Failed to parse config file")?;

    for (name, value) in [
        ("catalog.courses_base", &config.catalog.courses_base),
        ("catalog.courses_table", &config.catalog.courses_table),
        ("catalog.sections_base", &config.catalog.sections_base),
        ("catalog.sections_table", &config.catalog.sections_table),
        (
            "catalog.descriptions_base",
            &config.catalog.descriptions_base,
        ),
        (
            "catalog.descriptions_table",
            &config.catalog.descriptions_table,
        ),
        ("index.host", &config.index.host),
    ] {
        if value.trim().is_empty() {
            anyhow::bail!("{} must not be empty", name);
        }
    }

    if config.sync.batch_size == 0 {
        anyhow::bail!("sync.batch_size must be > 0");
    }

    if config.retrieval.top_k < 1 {
        anyhow::bail!("retrieval.top_k must be >= 1");
    }

    Ok(config)
}
