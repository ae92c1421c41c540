//! # coursevec CLI
//!
//! ```bash
//! coursevec --config ./coursevec.toml <command>
//! ```
//!
//! | Command | Description |
//! |---------|-------------|
//! | `coursevec sync` | Wipe the vector index and repopulate it from the catalog tables |
//! | `coursevec search "<query>"` | Filtered top-K similarity search |
//!
//! Credentials come from the environment: `AIRTABLE_API_KEY`,
//! `AIRTABLE_DESCRIPTIONS_API_KEY`, `OPENAI_API_KEY`, `PINECONE_API_KEY`.

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use coursevec::catalog::AirtableSource;
use coursevec::config::load_config;
use coursevec::embedding::OpenAiProvider;
use coursevec::index::PineconeIndex;
use coursevec::search::{self, SearchFilters};
use coursevec::sync;

#[derive(Parser)]
#[command(
    name = "coursevec",
    about = "Semantic course-catalog search backed by a vector index",
    version
)]
struct Cli {
    /// Path to configuration file (TOML).
    #[arg(long, global = true, default_value = "./coursevec.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Re-sync the vector index from the catalog tables.
    ///
    /// Fetches courses, sections, and descriptions, joins them into
    /// normalized course-section records, wipes the index, and upserts the
    /// embedded records in batches. Each run replaces the index contents
    /// from scratch.
    Sync {
        /// Stop after joining and enrichment; print counts without touching
        /// the index or the embedding provider.
        #[arg(long)]
        dry_run: bool,

        /// Maximum number of records to index.
        #[arg(long)]
        limit: Option<usize>,
    },

    /// Search indexed course sections.
    ///
    /// Day and time-of-day hints are also picked up from the query text
    /// itself ("databases on monday mornings"); explicit flags win over
    /// extracted hints.
    Search {
        /// The search query string.
        query: String,

        /// Only sections in this building.
        #[arg(long)]
        building: Option<String>,

        /// Only sections meeting on this weekday (Monday through Friday).
        #[arg(long)]
        day: Option<String>,

        /// Only sections starting in this bucket: morning, afternoon, or
        /// evening.
        #[arg(long)]
        time_of_day: Option<String>,

        /// Number of results to return.
        #[arg(long)]
        top_k: Option<usize>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = load_config(&cli.config)?;

    match cli.command {
        Commands::Sync { dry_run, limit } => {
            let source = AirtableSource::new(&config.catalog)?;
            let provider = OpenAiProvider::new(&config.embedding)?;
            let index = PineconeIndex::new(&config.index)?;
            sync::run_sync(&config, &source, &provider, &index, dry_run, limit).await?;
        }
        Commands::Search {
            query,
            building,
            day,
            time_of_day,
            top_k,
        } => {
            let provider = OpenAiProvider::new(&config.embedding)?;
            let index = PineconeIndex::new(&config.index)?;
            let filters = SearchFilters {
                building,
                day: day.as_deref().map(search::normalize_day).transpose()?,
                time_of_day: time_of_day.as_deref().map(str::parse).transpose()?,
            };
            search::run_search(&config, &provider, &index, &query, filters, top_k).await?;
        }
    }

    Ok(())
}
