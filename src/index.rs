//! Vector index abstraction and the Pinecone implementation.
//!
//! [`VectorIndex`] is the seam for the remote index: batched upsert,
//! filtered top-K query, and full wipe. [`Filter`] builds the metadata
//! filter expression; an empty filter must never be sent — the index
//! provider rejects `{}` where it accepts an absent filter, so callers pass
//! `None` instead.

use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use serde_json::Value;
use std::time::Duration;

use crate::config::{IndexConfig, INDEX_API_KEY_ENV};

/// One record to upsert: id, embedding vector, and metadata bag.
#[derive(Debug, Clone)]
pub struct VectorRecord {
    pub id: String,
    pub values: Vec<f32>,
    pub metadata: Value,
}

/// One scored query result.
#[derive(Debug, Clone)]
pub struct IndexMatch {
    pub id: String,
    pub score: f32,
    pub metadata: Value,
}

/// A metadata filter constraint: exact match or set membership.
#[derive(Debug, Clone)]
enum Constraint {
    Eq(Value),
    In(Vec<Value>),
}

/// Metadata filter expression, built one field at a time.
///
/// Serializes to the index provider's `$eq`/`$in` operator syntax. For a
/// list-valued metadata field, `$in` matches when any stored element is in
/// the given set.
#[derive(Debug, Clone, Default)]
pub struct Filter {
    clauses: Vec<(String, Constraint)>,
}

impl Filter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an exact-match constraint on a field.
    pub fn eq(mut self, field: &str, value: impl Into<Value>) -> Self {
        self.clauses.push((field.to_string(), Constraint::Eq(value.into())));
        self
    }

    /// Add a set-membership constraint on a field.
    pub fn any_of(mut self, field: &str, values: Vec<Value>) -> Self {
        self.clauses.push((field.to_string(), Constraint::In(values)));
        self
    }

    pub fn is_empty(&self) -> bool {
        self.clauses.is_empty()
    }

    /// Render to the provider's filter JSON.
    pub fn to_json(&self) -> Value {
        let mut map = serde_json::Map::new();
        for (field, constraint) in &self.clauses {
            let clause = match constraint {
                Constraint::Eq(v) => serde_json::json!({ "$eq": v }),
                Constraint::In(vs) => serde_json::json!({ "$in": vs }),
            };
            map.insert(field.clone(), clause);
        }
        Value::Object(map)
    }
}

/// Remote vector index: upsert by id, query by vector, bulk delete.
#[async_trait]
pub trait VectorIndex: Send + Sync {
    /// Upsert a batch of records. The caller is responsible for batching
    /// within the provider's per-call limits.
    async fn upsert(&self, records: &[VectorRecord]) -> Result<()>;

    /// Top-K similarity query. `filter` must be `None` when no constraints
    /// apply; an empty [`Filter`] is a caller bug and is rejected.
    async fn query(
        &self,
        vector: &[f32],
        top_k: usize,
        filter: Option<&Filter>,
    ) -> Result<Vec<IndexMatch>>;

    /// Delete every record in the index.
    async fn delete_all(&self) -> Result<()>;
}

/// Pinecone data-plane client.
///
/// Requires the `PINECONE_API_KEY` environment variable; the index host
/// comes from config.
pub struct PineconeIndex {
    client: reqwest::Client,
    host: String,
    api_key: String,
}

impl PineconeIndex {
    pub fn new(config: &IndexConfig) -> Result<Self> {
        let api_key = std::env::var(INDEX_API_KEY_ENV)
            .map_err(|_| anyhow::anyhow!("{} environment variable not set", INDEX_API_KEY_ENV))?;

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(60))
            .build()?;

        Ok(Self {
            client,
            host: config.host.trim_end_matches('/').to_string(),
            api_key,
        })
    }

    async fn post(&self, path: &str, body: &Value) -> Result<Value> {
        let response = self
            .client
            .post(format!("{}{}", self.host, path))
            .header("Api-Key", &self.api_key)
            .json(body)
            .send()
            .await
            .with_context(|| format!("index request {} failed", path))?;

        let status = response.status();
        if !status.is_success() {
            let body_text = response.text().await.unwrap_or_default();
            bail!("index error {} on {}: {}", status, path, body_text);
        }

        response.json().await.context("invalid index response")
    }
}

#[async_trait]
impl VectorIndex for PineconeIndex {
    async fn upsert(&self, records: &[VectorRecord]) -> Result<()> {
        let vectors: Vec<Value> = records
            .iter()
            .map(|r| {
                serde_json::json!({
                    "id": r.id,
                    "values": r.values,
                    "metadata": r.metadata,
                })
            })
            .collect();

        self.post("/vectors/upsert", &serde_json::json!({ "vectors": vectors }))
            .await?;
        Ok(())
    }

    async fn query(
        &self,
        vector: &[f32],
        top_k: usize,
        filter: Option<&Filter>,
    ) -> Result<Vec<IndexMatch>> {
        let mut body = serde_json::json!({
            "vector": vector,
            "topK": top_k,
            "includeMetadata": true,
        });
        if let Some(filter) = filter {
            if filter.is_empty() {
                bail!("refusing to query with an empty filter; pass None instead");
            }
            if let Some(map) = body.as_object_mut() {
                map.insert("filter".to_string(), filter.to_json());
            }
        }

        let json = self.post("/query", &body).await?;
        let matches = json
            .get("matches")
            .and_then(|m| m.as_array())
            .map(|items| {
                items
                    .iter()
                    .map(|item| IndexMatch {
                        id: item
                            .get("id")
                            .and_then(Value::as_str)
                            .unwrap_or_default()
                            .to_string(),
                        score: item.get("score").and_then(Value::as_f64).unwrap_or(0.0) as f32,
                        metadata: item.get("metadata").cloned().unwrap_or(Value::Null),
                    })
                    .collect()
            })
            .unwrap_or_default();

        Ok(matches)
    }

    async fn delete_all(&self) -> Result<()> {
        self.post("/vectors/delete", &serde_json::json!({ "deleteAll": true }))
            .await?;
        Ok(())
    }
}
