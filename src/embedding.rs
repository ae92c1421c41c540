//! Embedding provider abstraction and the OpenAI implementation.
//!
//! [`EmbeddingProvider`] is the seam the pipeline and query engine depend
//! on: one text in, one fixed-length vector out. [`OpenAiProvider`] calls
//! the OpenAI embeddings API. A failed call propagates immediately — the
//! sync run treats any embedding failure as fatal, so there is no retry
//! layer here.

use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use std::time::Duration;

use crate::config::{EmbeddingConfig, EMBEDDING_API_KEY_ENV};

const EMBEDDINGS_URL: &str = "https://api.openai.com/v1/embeddings";

/// Text-to-vector provider.
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// Embed one text into a fixed-length vector.
    async fn embed(&self, text: &str) -> Result<Vec<f32>>;
}

/// Embedding provider backed by `POST /v1/embeddings`.
///
/// Requires the `OPENAI_API_KEY` environment variable.
pub struct OpenAiProvider {
    client: reqwest::Client,
    api_key: String,
    model: String,
}

impl OpenAiProvider {
    pub fn new(config: &EmbeddingConfig) -> Result<Self> {
        let api_key = std::env::var(EMBEDDING_API_KEY_ENV).map_err(|_| {
            anyhow::anyhow!("{} environment variable not set", EMBEDDING_API_KEY_ENV)
        })?;

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            client,
            api_key,
            model: config.model.clone(),
        })
    }
}

#[async_trait]
impl EmbeddingProvider for OpenAiProvider {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let body = serde_json::json!({
            "model": self.model,
            "input": text,
        });

        let response = self
            .client
            .post(EMBEDDINGS_URL)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&body)
            .send()
            .await
            .context("embedding request failed")?;

        let status = response.status();
        if !status.is_success() {
            let body_text = response.text().await.unwrap_or_default();
            bail!("embedding API error {}: {}", status, body_text);
        }

        let json: serde_json::Value = response.json().await?;
        first_embedding(&json)
    }
}

/// Pull the first `data[].embedding` array out of an embeddings response.
fn first_embedding(json: &serde_json::Value) -> Result<Vec<f32>> {
    let embedding = json
        .get("data")
        .and_then(|d| d.as_array())
        .and_then(|d| d.first())
        .and_then(|item| item.get("embedding"))
        .and_then(|e| e.as_array())
        .ok_or_else(|| anyhow::anyhow!("invalid embedding response: missing data[0].embedding"))?;

    Ok(embedding
        .iter()
        .map(|v| v.as_f64().unwrap_or(0.0) as f32)
        .collect())
}
