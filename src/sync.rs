//! Sync pipeline: one full wipe-and-repopulate cycle of the vector index.
//!
//! Flow: fetch the three tables → parse → join/filter → enrich schedules →
//! wipe the index → render text, embed, and upsert in batches. Any fetch,
//! parse, embedding, or upsert failure aborts the run; batches already
//! upserted stay in the index.

use anyhow::{Context, Result};
use futures::future::try_join_all;

use crate::catalog::{CatalogSource, Table};
use crate::config::Config;
use crate::embedding::EmbeddingProvider;
use crate::index::{VectorIndex, VectorRecord};
use crate::join::{self, JoinOutput};
use crate::models::{CourseSection, RawCourse, RawDescription, RawSection};
use crate::schedule::Schedule;

/// How many per-record processing notes to print before going quiet.
const SAMPLE_NOTES: usize = 5;

/// Counters for one sync run.
#[derive(Debug, Default, Clone)]
pub struct SyncReport {
    pub courses_fetched: usize,
    pub sections_fetched: usize,
    pub descriptions_fetched: usize,
    pub records_normalized: usize,
    pub records_upserted: usize,
    pub batches: usize,
}

pub async fn run_sync(
    config: &Config,
    source: &dyn CatalogSource,
    provider: &dyn EmbeddingProvider,
    index: &dyn VectorIndex,
    dry_run: bool,
    limit: Option<usize>,
) -> Result<SyncReport> {
    println!("Fetching courses...");
    let course_records = source.fetch_all(Table::Courses).await?;
    let courses: Vec<RawCourse> = course_records.iter().map(RawCourse::from_record).collect();
    println!("  found {} courses", courses.len());

    println!("Fetching sections...");
    let section_records = source.fetch_all(Table::Sections).await?;
    let sections: Vec<RawSection> = section_records
        .iter()
        .map(RawSection::from_record)
        .collect();
    println!("  found {} sections", sections.len());

    for section in &sections {
        if section.extra_course_links > 0 {
            println!(
                "  warning: section {} links {} courses; using the first",
                section.id,
                section.extra_course_links + 1
            );
        }
    }

    println!("Fetching course descriptions...");
    let description_records = source.fetch_all(Table::Descriptions).await?;
    let descriptions: Vec<RawDescription> = description_records
        .iter()
        .map(RawDescription::from_record)
        .collect();
    println!("  found {} descriptions", descriptions.len());

    let JoinOutput {
        mut records,
        missing_descriptions,
    } = join::join_catalog(&courses, &sections, &descriptions);

    for code in &missing_descriptions {
        println!("  no description found for course: {}", code);
    }
    println!("Normalized {} course sections", records.len());

    // Enrichment. A malformed schedule string aborts the run: these fields
    // feed the search filters, and a wrong bucket is worse than a missing
    // record.
    for record in &mut records {
        let schedule = Schedule::derive(&record.days, &record.time).with_context(|| {
            format!(
                "bad schedule for {} ({}): days='{}' time='{}'",
                record.id, record.code, record.days, record.time
            )
        })?;
        record.schedule = Some(schedule);
    }

    if let Some(limit) = limit {
        records.truncate(limit);
    }

    for record in records.iter().take(SAMPLE_NOTES) {
        let sched = record.schedule.as_ref();
        println!(
            "  {} {} — {} [{} {}]",
            record.code,
            record.title,
            record.time,
            record.days,
            sched.map(|s| s.time_of_day.as_str()).unwrap_or("?"),
        );
    }

    let mut report = SyncReport {
        courses_fetched: courses.len(),
        sections_fetched: sections.len(),
        descriptions_fetched: descriptions.len(),
        records_normalized: records.len(),
        ..Default::default()
    };

    if dry_run {
        println!("sync (dry-run)");
        println!("  records ready to index: {}", records.len());
        return Ok(report);
    }

    // Stale entries must not survive a schedule change upstream, so the
    // index is wiped before repopulating.
    println!("Wiping index...");
    index.delete_all().await?;

    println!("Generating embeddings and upserting...");
    for batch in records.chunks(config.sync.batch_size) {
        let vectors: Vec<VectorRecord> =
            try_join_all(batch.iter().map(|record| embed_record(provider, record))).await?;

        index.upsert(&vectors).await?;
        report.records_upserted += vectors.len();
        report.batches += 1;
        println!(
            "  upserted {} / {} records",
            report.records_upserted,
            records.len()
        );
    }

    println!("sync ok");
    Ok(report)
}

async fn embed_record(
    provider: &dyn EmbeddingProvider,
    record: &CourseSection,
) -> Result<VectorRecord> {
    let text = embedding_text(record);
    let values = provider
        .embed(&text)
        .await
        .with_context(|| format!("embedding failed for {}", record.id))?;
    Ok(VectorRecord {
        id: record.id.clone(),
        values,
        metadata: record.metadata(),
    })
}

/// Render the text a record is embedded under: every searchable attribute
/// on its own line, then collapsed to single-spaced text.
pub fn embedding_text(record: &CourseSection) -> String {
    let (days_line, bucket) = match &record.schedule {
        Some(s) => (s.expanded_days.join(", "), s.time_of_day.as_str()),
        None => (record.days.clone(), "unknown"),
    };
    let text = format!(
        "{code}: {title}.\n\
         Seats: {avail} of {cap} available.\n\
         Meets {days} in the {bucket}, {time}.\n\
         Location: {building} {room}.\n\
         Instructor: {instructor}.\n\
         {description}\n\
         Prerequisites: {prereqs}.\n\
         Department: {department}. Units: {units}.",
        code = record.code,
        title = record.title,
        avail = record.available_seats,
        cap = record.seat_limit,
        days = days_line,
        bucket = bucket,
        time = record.time,
        building = record.building,
        room = record.room,
        instructor = record.instructor,
        description = record.description,
        prereqs = record.prerequisites.as_deref().unwrap_or("None"),
        department = record.department,
        units = record.units,
    );
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{RawCourse, RawDescription, RawSection, SourceRecord};

    fn sample_record() -> CourseSection {
        let course = RawCourse {
            id: "c1".to_string(),
            subject_code: "CSE".to_string(),
            course_number: "101".to_string(),
            course_name: "Intro to Computer Science".to_string(),
            units: "4".to_string(),
            section_ids: vec![],
        };
        let desc = RawDescription {
            id: "d1".to_string(),
            code: "CSE 101".to_string(),
            title: "Introduction to Computer Science".to_string(),
            units: "4".to_string(),
            description: "Fundamentals of   computing.".to_string(),
            prerequisites: None,
        };
        let fields = serde_json::json!({
            "Course Link": "c1",
            "Meeting Type": "Lecture",
            "Building": "ENG",
            "Room": "101",
            "Instructor": "Dijkstra",
            "Days": "MWF",
            "Time": "9:00a-9:50a",
            "Available Seats": 30,
            "Seat Limit": 40,
        });
        let section = RawSection::from_record(&SourceRecord {
            id: "s1".to_string(),
            fields: fields.as_object().unwrap().clone(),
        });
        let mut record = CourseSection::new(&course, &desc, &section);
        record.schedule = Some(Schedule::derive(&record.days, &record.time).unwrap());
        record
    }

    #[test]
    fn embedding_text_is_single_spaced_and_complete() {
        let text = embedding_text(&sample_record());
        assert!(!text.contains('\n'));
        assert!(!text.contains("  "));
        for needle in [
            "CSE 101",
            "Introduction to Computer Science",
            "30 of 40",
            "Monday, Wednesday, Friday",
            "morning",
            "9:00a-9:50a",
            "ENG 101",
            "Dijkstra",
            "Fundamentals of computing.",
            "Prerequisites: None",
            "Department: CSE",
            "Units: 4",
        ] {
            assert!(text.contains(needle), "missing '{}' in '{}'", needle, text);
        }
    }

    #[test]
    fn embedding_text_is_deterministic() {
        let record = sample_record();
        assert_eq!(embedding_text(&record), embedding_text(&record));
    }

    #[test]
    fn embedding_text_mentions_prerequisites_when_present() {
        let mut record = sample_record();
        record.prerequisites = Some("CSE 100".to_string());
        assert!(embedding_text(&record).contains("Prerequisites: CSE 100"));
    }
}
