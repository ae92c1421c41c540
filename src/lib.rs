//! # coursevec
//!
//! Semantic search over a course catalog. One sync run joins three catalog
//! tables (courses, lecture sections, free-text descriptions) into
//! normalized course-section records, enriches each with derived schedule
//! fields, embeds a text rendering of the record, and repopulates a remote
//! vector index. The query path extracts soft day/time-of-day filters from
//! free text and runs a filtered top-K similarity search.
//!
//! ## Architecture
//!
//! ```text
//! ┌────────────┐   ┌──────────────┐   ┌───────────┐   ┌─────────────┐
//! │  Catalog   │──▶│ Join/Filter  │──▶│  Schedule │──▶│ Embed +     │
//! │  tables    │   │  (lectures)  │   │  enricher │   │ batch upsert│
//! └────────────┘   └──────────────┘   └───────────┘   └──────┬──────┘
//!                                                            ▼
//!                       search "<query>" ──────────▶  vector index
//! ```
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML configuration and credential env vars |
//! | [`models`] | Raw and normalized record types |
//! | [`catalog`] | Tabular source reader |
//! | [`join`] | Join and filter engine |
//! | [`schedule`] | Day-code and time-range parsing |
//! | [`embedding`] | Embedding provider |
//! | [`index`] | Vector index client and filter expressions |
//! | [`sync`] | Wipe-and-repopulate pipeline |
//! | [`search`] | Query engine |

pub mod catalog;
pub mod config;
pub mod embedding;
pub mod index;
pub mod join;
pub mod models;
pub mod schedule;
pub mod search;
pub mod sync;
