//! Query engine: keyword hint extraction, filtered similarity search, and
//! result rendering.
//!
//! The day/time-of-day extraction is an ordered keyword lookup, not a
//! parser: the first matching keyword of each kind wins, in keyword-list
//! order. It is deliberately approximate — "no morning classes" still
//! filters to mornings.

use anyhow::{bail, Result};
use serde_json::Value;

use crate::config::Config;
use crate::embedding::EmbeddingProvider;
use crate::index::{Filter, IndexMatch, VectorIndex};
use crate::schedule::TimeOfDay;

const TIME_KEYWORDS: [(&str, TimeOfDay); 3] = [
    ("morning", TimeOfDay::Morning),
    ("afternoon", TimeOfDay::Afternoon),
    ("evening", TimeOfDay::Evening),
];

const DAY_KEYWORDS: [(&str, &str); 5] = [
    ("monday", "Monday"),
    ("tuesday", "Tuesday"),
    ("wednesday", "Wednesday"),
    ("thursday", "Thursday"),
    ("friday", "Friday"),
];

/// Structured filters supplied alongside the query text. Explicit values
/// take precedence over hints extracted from the query.
#[derive(Debug, Default, Clone)]
pub struct SearchFilters {
    pub building: Option<String>,
    pub day: Option<String>,
    pub time_of_day: Option<TimeOfDay>,
}

/// Best-effort extraction of (day, time-of-day) hints from free text.
pub fn extract_query_hints(query: &str) -> (Option<&'static str>, Option<TimeOfDay>) {
    let lowered = query.to_lowercase();

    let day = DAY_KEYWORDS
        .iter()
        .find(|(keyword, _)| lowered.contains(keyword))
        .map(|(_, name)| *name);

    let time_of_day = TIME_KEYWORDS
        .iter()
        .find(|(keyword, _)| lowered.contains(keyword))
        .map(|(_, bucket)| *bucket);

    (day, time_of_day)
}

/// Normalize a user-supplied weekday to its canonical capitalized name.
pub fn normalize_day(day: &str) -> Result<String> {
    let lowered = day.to_lowercase();
    DAY_KEYWORDS
        .iter()
        .find(|(keyword, _)| *keyword == lowered)
        .map(|(_, name)| name.to_string())
        .ok_or_else(|| anyhow::anyhow!("unknown day: '{}'. Use Monday through Friday.", day))
}

/// Merge query hints with explicit filters and build the index filter.
///
/// Returns `None` when no conditions apply: the index treats "no filter"
/// differently from an empty filter and rejects the latter.
pub fn build_filter(query: &str, filters: &SearchFilters) -> Option<Filter> {
    let (hinted_day, hinted_time) = extract_query_hints(query);

    let day = filters
        .day
        .clone()
        .or_else(|| hinted_day.map(str::to_string));
    let time_of_day = filters.time_of_day.or(hinted_time);
    let building = filters.building.clone();

    let mut filter = Filter::new();
    if let Some(day) = day {
        filter = filter.any_of("expanded_days", vec![Value::String(day)]);
    }
    if let Some(bucket) = time_of_day {
        filter = filter.eq("time_of_day", bucket.as_str());
    }
    if let Some(building) = building {
        filter = filter.eq("building", building);
    }

    (!filter.is_empty()).then_some(filter)
}

/// Run one similarity search and print the ranked results.
///
/// The raw query text is embedded untouched; lower-casing happens only
/// inside hint extraction.
pub async fn run_search(
    config: &Config,
    provider: &dyn EmbeddingProvider,
    index: &dyn VectorIndex,
    query: &str,
    filters: SearchFilters,
    top_k: Option<usize>,
) -> Result<Vec<IndexMatch>> {
    if query.trim().is_empty() {
        bail!("query must not be empty");
    }

    println!("Searching for: \"{}\"", query);
    let filter = build_filter(query, &filters);
    if let Some(filter) = &filter {
        println!("  filter: {}", filter.to_json());
    }

    let vector = provider.embed(query).await?;
    let top_k = top_k.unwrap_or(config.retrieval.top_k);
    let matches = index.query(&vector, top_k, filter.as_ref()).await?;

    if matches.is_empty() {
        println!("No results.");
        return Ok(matches);
    }

    for (rank, m) in matches.iter().enumerate() {
        print_match(rank + 1, m);
    }

    Ok(matches)
}

fn meta_str<'a>(metadata: &'a Value, field: &str) -> &'a str {
    metadata.get(field).and_then(Value::as_str).unwrap_or("")
}

fn print_match(rank: usize, m: &IndexMatch) {
    let meta = &m.metadata;
    let title = match meta_str(meta, "title") {
        "" => "No title",
        t => t,
    };
    println!(
        "\n{}. {}: {} (score {:.3})",
        rank,
        meta_str(meta, "code"),
        title,
        m.score
    );
    println!(
        "   Time: {} {} in {} {}",
        meta_str(meta, "days"),
        meta_str(meta, "time"),
        meta_str(meta, "building"),
        meta_str(meta, "room"),
    );
    println!("   Instructor: {}", meta_str(meta, "instructor"));
    println!(
        "   Available seats: {}/{}",
        meta.get("available_seats").and_then(Value::as_i64).unwrap_or(0),
        meta.get("seat_limit").and_then(Value::as_i64).unwrap_or(0),
    );
    let description = meta_str(meta, "description");
    if !description.is_empty() {
        let preview: String = description.chars().take(200).collect();
        println!("   Description: {}...", preview);
    }
    let prerequisites = meta_str(meta, "prerequisites");
    if !prerequisites.is_empty() {
        println!("   Prerequisites: {}", prerequisites);
    }
}
