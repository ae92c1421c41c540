//! Tabular catalog source.
//!
//! The pipeline reads three tables (courses, sections, descriptions) from an
//! Airtable-style REST source. [`CatalogSource`] is the seam the pipeline
//! depends on; [`AirtableSource`] is the real client. Readers flatten the
//! source's record representation into id + field map and never interpret
//! field semantics — that happens in [`crate::models`].

use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;

use crate::config::{CatalogConfig, CATALOG_API_KEY_ENV, DESCRIPTIONS_API_KEY_ENV};
use crate::models::SourceRecord;

const API_ROOT: &str = "https://api.airtable.com/v0";

/// The three catalog tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Table {
    Courses,
    Sections,
    Descriptions,
}

/// Read-only view of the tabular catalog source.
///
/// A fetch failure is fatal to the sync run; implementations should not
/// retry internally.
#[async_trait]
pub trait CatalogSource: Send + Sync {
    /// Fetch every record of a table, in the source's own order.
    async fn fetch_all(&self, table: Table) -> Result<Vec<SourceRecord>>;
}

struct TableRef {
    api_key: String,
    base_id: String,
    table_name: String,
}

/// Airtable REST client covering the three catalog tables.
///
/// The descriptions table lives in a separately-credentialed base, so each
/// table carries its own key. Listing paginates via the `offset` cursor
/// until the source stops returning one.
pub struct AirtableSource {
    client: reqwest::Client,
    courses: TableRef,
    sections: TableRef,
    descriptions: TableRef,
}

impl AirtableSource {
    /// Build the client from config, reading both API keys from the
    /// environment.
    pub fn new(config: &CatalogConfig) -> Result<Self> {
        let main_key = std::env::var(CATALOG_API_KEY_ENV)
            .map_err(|_| anyhow::anyhow!("{} environment variable not set", CATALOG_API_KEY_ENV))?;
        let descriptions_key = std::env::var(DESCRIPTIONS_API_KEY_ENV).map_err(|_| {
            anyhow::anyhow!("{} environment variable not set", DESCRIPTIONS_API_KEY_ENV)
        })?;

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()?;

        Ok(Self {
            client,
            courses: TableRef {
                api_key: main_key.clone(),
                base_id: config.courses_base.clone(),
                table_name: config.courses_table.clone(),
            },
            sections: TableRef {
                api_key: main_key,
                base_id: config.sections_base.clone(),
                table_name: config.sections_table.clone(),
            },
            descriptions: TableRef {
                api_key: descriptions_key,
                base_id: config.descriptions_base.clone(),
                table_name: config.descriptions_table.clone(),
            },
        })
    }

    fn table_ref(&self, table: Table) -> &TableRef {
        match table {
            Table::Courses => &self.courses,
            Table::Sections => &self.sections,
            Table::Descriptions => &self.descriptions,
        }
    }

    async fn list_page(&self, table: &TableRef, offset: Option<&str>) -> Result<ListResponse> {
        // Table names may contain spaces; let the URL type encode the segment.
        let mut url = reqwest::Url::parse(API_ROOT)?;
        url.path_segments_mut()
            .map_err(|_| anyhow::anyhow!("invalid API root"))?
            .push(&table.base_id)
            .push(&table.table_name);
        if let Some(cursor) = offset {
            url.query_pairs_mut().append_pair("offset", cursor);
        }

        let response = self
            .client
            .get(url)
            .header("Authorization", format!("Bearer {}", table.api_key))
            .send()
            .await
            .with_context(|| format!("catalog request for '{}' failed", table.table_name))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            bail!(
                "catalog source error {} for table '{}': {}",
                status,
                table.table_name,
                body
            );
        }

        response
            .json::<ListResponse>()
            .await
            .with_context(|| format!("invalid catalog response for '{}'", table.table_name))
    }
}

#[async_trait]
impl CatalogSource for AirtableSource {
    async fn fetch_all(&self, table: Table) -> Result<Vec<SourceRecord>> {
        let table_ref = self.table_ref(table);
        let mut records = Vec::new();
        let mut offset: Option<String> = None;

        loop {
            let page = self.list_page(table_ref, offset.as_deref()).await?;
            records.extend(page.records.into_iter().map(WireRecord::flatten));
            match page.offset {
                Some(cursor) => offset = Some(cursor),
                None => break,
            }
        }

        Ok(records)
    }
}

#[derive(Debug, Deserialize)]
struct ListResponse {
    records: Vec<WireRecord>,
    offset: Option<String>,
}

#[derive(Debug, Deserialize)]
struct WireRecord {
    id: String,
    #[serde(default)]
    fields: serde_json::Map<String, serde_json::Value>,
}

impl WireRecord {
    fn flatten(self) -> SourceRecord {
        SourceRecord {
            id: self.id,
            fields: self.fields,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flattens_wire_records_without_interpreting_fields() {
        let page: ListResponse = serde_json::from_str(
            r#"{
                "records": [
                    { "id": "rec1", "fields": { "Course Name": "Algorithms", "Units": "4" } },
                    { "id": "rec2" }
                ],
                "offset": "next"
            }"#,
        )
        .unwrap();

        let records: Vec<SourceRecord> =
            page.records.into_iter().map(WireRecord::flatten).collect();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].id, "rec1");
        assert_eq!(records[0].fields["Course Name"], "Algorithms");
        assert!(records[1].fields.is_empty());
        assert_eq!(page.offset.as_deref(), Some("next"));
    }

    #[test]
    fn last_page_has_no_offset() {
        let page: ListResponse = serde_json::from_str(r#"{ "records": [] }"#).unwrap();
        assert!(page.offset.is_none());
        assert!(page.records.is_empty());
    }
}
