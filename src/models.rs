//! Core data types that flow through the catalog pipeline.
//!
//! Raw records come off the tabular source as opaque field maps
//! ([`SourceRecord`]); the typed `Raw*` views interpret the source's
//! human-readable column names; [`CourseSection`] is the normalized
//! (course × lecture-section) record that gets embedded and indexed.

use serde_json::{Map, Value};

use crate::schedule::Schedule;

/// One record fetched from a tabular source: a source-assigned id plus an
/// uninterpreted field map keyed by column name.
#[derive(Debug, Clone)]
pub struct SourceRecord {
    pub id: String,
    pub fields: Map<String, Value>,
}

impl SourceRecord {
    /// String value of a field; missing or non-string fields read as empty.
    pub fn text(&self, name: &str) -> String {
        match self.fields.get(name) {
            Some(Value::String(s)) => s.clone(),
            Some(Value::Number(n)) => n.to_string(),
            _ => String::new(),
        }
    }

    /// Integer value of a field; missing or non-numeric fields read as 0.
    pub fn int(&self, name: &str) -> i64 {
        self.fields.get(name).and_then(Value::as_i64).unwrap_or(0)
    }

    /// String list value of a field; a bare string reads as a one-element list.
    pub fn list(&self, name: &str) -> Vec<String> {
        match self.fields.get(name) {
            Some(Value::Array(items)) => items
                .iter()
                .filter_map(|v| v.as_str().map(str::to_string))
                .collect(),
            Some(Value::String(s)) => vec![s.clone()],
            _ => Vec::new(),
        }
    }
}

/// A course-table record.
#[derive(Debug, Clone)]
pub struct RawCourse {
    pub id: String,
    pub subject_code: String,
    pub course_number: String,
    pub course_name: String,
    pub units: String,
    pub section_ids: Vec<String>,
}

impl RawCourse {
    pub fn from_record(rec: &SourceRecord) -> Self {
        RawCourse {
            id: rec.id.clone(),
            subject_code: rec.text("Subject Code"),
            course_number: rec.text("Course Number"),
            course_name: rec.text("Course Name"),
            units: rec.text("Units"),
            section_ids: rec.list("Sections"),
        }
    }

    /// Catalog code, e.g. `"CSE 101"`. Descriptions are matched on this.
    pub fn code(&self) -> String {
        format!("{} {}", self.subject_code, self.course_number)
    }
}

/// A section-table record.
///
/// The source sometimes stores the course link as a one-element list instead
/// of a single id; [`from_record`](RawSection::from_record) normalizes to
/// the first id and counts the extras so callers can flag the record.
#[derive(Debug, Clone)]
pub struct RawSection {
    pub id: String,
    pub course_id: Option<String>,
    /// Linked course ids beyond the first — a data-quality signal, since a
    /// section belongs to exactly one course.
    pub extra_course_links: usize,
    pub meeting_type: String,
    pub time: String,
    pub building: String,
    pub room: String,
    pub instructor: String,
    pub available_seats: i64,
    pub seat_limit: i64,
    pub days: String,
    pub section_label: String,
}

impl RawSection {
    pub fn from_record(rec: &SourceRecord) -> Self {
        let links = rec.list("Course Link");
        RawSection {
            id: rec.id.clone(),
            course_id: links.first().cloned(),
            extra_course_links: links.len().saturating_sub(1),
            meeting_type: rec.text("Meeting Type"),
            time: rec.text("Time"),
            building: rec.text("Building"),
            room: rec.text("Room"),
            instructor: rec.text("Instructor"),
            available_seats: rec.int("Available Seats"),
            seat_limit: rec.int("Seat Limit"),
            days: rec.text("Days"),
            section_label: rec.text("Section ID"),
        }
    }
}

/// A description-table record, matched to a course by catalog code rather
/// than by foreign key.
#[derive(Debug, Clone)]
pub struct RawDescription {
    pub id: String,
    pub code: String,
    pub title: String,
    pub units: String,
    pub description: String,
    pub prerequisites: Option<String>,
}

impl RawDescription {
    pub fn from_record(rec: &SourceRecord) -> Self {
        let prerequisites = rec.text("prerequisites");
        RawDescription {
            id: rec.id.clone(),
            code: rec.text("code"),
            title: rec.text("title"),
            units: rec.text("units"),
            description: rec.text("description"),
            prerequisites: (!prerequisites.is_empty()).then_some(prerequisites),
        }
    }
}

/// The normalized record the index actually stores: one qualifying course
/// paired with one qualifying lecture section.
///
/// Built once per sync run; the only later mutation is the enrichment step
/// filling in [`schedule`](CourseSection::schedule).
#[derive(Debug, Clone)]
pub struct CourseSection {
    /// Composite id: `"{description_id}-{section_id}"`.
    pub id: String,
    pub code: String,
    pub title: String,
    pub description: String,
    pub prerequisites: Option<String>,
    pub units: String,
    pub department: String,
    pub course_number: String,
    pub instructor: String,
    pub time: String,
    pub building: String,
    pub room: String,
    pub days: String,
    pub available_seats: i64,
    pub seat_limit: i64,
    /// Derived schedule fields; `None` until enrichment runs.
    pub schedule: Option<Schedule>,
}

impl CourseSection {
    pub fn new(course: &RawCourse, description: &RawDescription, section: &RawSection) -> Self {
        let title = if description.title.is_empty() {
            course.course_name.clone()
        } else {
            description.title.clone()
        };
        CourseSection {
            id: format!("{}-{}", description.id, section.id),
            code: description.code.clone(),
            title,
            description: description.description.clone(),
            prerequisites: description.prerequisites.clone(),
            units: description.units.clone(),
            department: course.subject_code.clone(),
            course_number: course.course_number.clone(),
            instructor: section.instructor.clone(),
            time: section.time.clone(),
            building: section.building.clone(),
            room: section.room.clone(),
            days: section.days.clone(),
            available_seats: section.available_seats,
            seat_limit: section.seat_limit,
            schedule: None,
        }
    }

    /// Metadata bag stored alongside the vector in the index.
    ///
    /// Derived schedule fields appear once enrichment has run; the query
    /// filters target `expanded_days`, `time_of_day`, and `building`.
    pub fn metadata(&self) -> Value {
        let mut meta = serde_json::json!({
            "code": self.code,
            "title": self.title,
            "description": self.description,
            "prerequisites": self.prerequisites.clone().unwrap_or_default(),
            "units": self.units,
            "department": self.department,
            "course_number": self.course_number,
            "instructor": self.instructor,
            "time": self.time,
            "building": self.building,
            "room": self.room,
            "days": self.days,
            "available_seats": self.available_seats,
            "seat_limit": self.seat_limit,
        });
        if let Some(schedule) = &self.schedule {
            if let Some(map) = meta.as_object_mut() {
                map.insert(
                    "expanded_days".to_string(),
                    serde_json::json!(schedule.expanded_days),
                );
                map.insert(
                    "time_of_day".to_string(),
                    Value::String(schedule.time_of_day.as_str().to_string()),
                );
                map.insert("time_start".to_string(), schedule.time_start.into());
                map.insert("time_end".to_string(), schedule.time_end.into());
            }
        }
        meta
    }
}
