//! Join and filter engine.
//!
//! Cross-references sections to courses to descriptions and emits one
//! [`CourseSection`] per qualifying (course, lecture-section) pair. Lab
//! catalog entries are out of scope for the search index, which drives both
//! exclusion rules below. The whole module is pure: it takes one run's raw
//! records and returns the normalized output plus skip notes.

use std::collections::HashMap;

use crate::models::{CourseSection, RawCourse, RawDescription, RawSection};

/// Join output for one sync run.
#[derive(Debug, Default)]
pub struct JoinOutput {
    /// Normalized records in source course order, then each course's
    /// sections in source order.
    pub records: Vec<CourseSection>,
    /// Codes of retained courses that had no matching description. These
    /// courses are skipped, not errors.
    pub missing_descriptions: Vec<String>,
}

/// A section qualifies if it is a lecture held outside remote-classroom
/// ("RCLAS") space. An empty building is allowed: sections without an
/// assigned room are still real lectures.
pub fn section_qualifies(section: &RawSection) -> bool {
    section.meeting_type == "Lecture"
        && (section.building.is_empty() || !section.building.contains("RCLAS"))
}

/// A course qualifies if some retained section links to it and its name does
/// not mark it as a lab course.
fn course_qualifies(course: &RawCourse, retained: &[&RawSection]) -> bool {
    let has_section = retained
        .iter()
        .any(|s| s.course_id.as_deref() == Some(course.id.as_str()));
    // "lab" also covers "laboratory".
    let not_lab = !course.course_name.to_lowercase().contains("lab");
    has_section && not_lab
}

/// Join one run's raw records into normalized course sections.
pub fn join_catalog(
    courses: &[RawCourse],
    sections: &[RawSection],
    descriptions: &[RawDescription],
) -> JoinOutput {
    let retained: Vec<&RawSection> = sections.iter().filter(|s| section_qualifies(s)).collect();

    // At most one description matches a code; keep the first if the source
    // ever has duplicates.
    let mut by_code: HashMap<&str, &RawDescription> = HashMap::new();
    for desc in descriptions {
        by_code.entry(desc.code.as_str()).or_insert(desc);
    }

    let mut output = JoinOutput::default();

    for course in courses {
        if !course_qualifies(course, &retained) {
            continue;
        }

        let code = course.code();
        let Some(description) = by_code.get(code.as_str()) else {
            output.missing_descriptions.push(code);
            continue;
        };

        for section in retained
            .iter()
            .filter(|s| s.course_id.as_deref() == Some(course.id.as_str()))
        {
            output
                .records
                .push(CourseSection::new(course, description, section));
        }
    }

    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::SourceRecord;

    fn course(id: &str, subject: &str, number: &str, name: &str) -> RawCourse {
        RawCourse {
            id: id.to_string(),
            subject_code: subject.to_string(),
            course_number: number.to_string(),
            course_name: name.to_string(),
            units: "4".to_string(),
            section_ids: vec![],
        }
    }

    fn section(id: &str, course_id: &str, meeting_type: &str, building: &str) -> RawSection {
        let fields = serde_json::json!({
            "Course Link": course_id,
            "Meeting Type": meeting_type,
            "Building": building,
            "Days": "MWF",
            "Time": "9:00a-9:50a",
        });
        RawSection::from_record(&SourceRecord {
            id: id.to_string(),
            fields: fields.as_object().unwrap().clone(),
        })
    }

    fn description(id: &str, code: &str, title: &str) -> RawDescription {
        RawDescription {
            id: id.to_string(),
            code: code.to_string(),
            title: title.to_string(),
            units: "4".to_string(),
            description: "A course.".to_string(),
            prerequisites: None,
        }
    }

    #[test]
    fn keeps_lectures_outside_rclas() {
        assert!(section_qualifies(&section("s", "c", "Lecture", "ENG")));
        assert!(section_qualifies(&section("s", "c", "Lecture", "")));
        assert!(!section_qualifies(&section("s", "c", "Lecture", "RCLAS")));
        assert!(!section_qualifies(&section("s", "c", "Lecture", "RCLAS B")));
        assert!(!section_qualifies(&section("s", "c", "Laboratory", "ENG")));
        assert!(!section_qualifies(&section("s", "c", "Discussion", "ENG")));
    }

    #[test]
    fn course_with_only_non_lecture_sections_is_dropped() {
        let courses = vec![course("c1", "BIO", "10", "Intro to Biology")];
        let sections = vec![section("s1", "c1", "Laboratory", "ENG")];
        let descriptions = vec![description("d1", "BIO 10", "Intro to Biology")];

        let out = join_catalog(&courses, &sections, &descriptions);
        assert!(out.records.is_empty());
        assert!(out.missing_descriptions.is_empty());
    }

    #[test]
    fn lab_courses_are_dropped_by_name() {
        let courses = vec![
            course("c1", "BIO", "10L", "Intro to Biology Lab"),
            course("c2", "BIO", "11L", "Biology Laboratory"),
        ];
        let sections = vec![
            section("s1", "c1", "Lecture", "ENG"),
            section("s2", "c2", "Lecture", "ENG"),
        ];
        let descriptions = vec![
            description("d1", "BIO 10L", "Intro to Biology Lab"),
            description("d2", "BIO 11L", "Biology Laboratory"),
        ];

        let out = join_catalog(&courses, &sections, &descriptions);
        assert!(out.records.is_empty());
    }

    #[test]
    fn course_without_description_is_skipped_and_noted() {
        let courses = vec![course("c1", "CSE", "101", "Intro to Computer Science")];
        let sections = vec![section("s1", "c1", "Lecture", "ENG")];

        let out = join_catalog(&courses, &sections, &[]);
        assert!(out.records.is_empty());
        assert_eq!(out.missing_descriptions, vec!["CSE 101"]);
    }

    #[test]
    fn emits_one_record_per_qualifying_section() {
        let courses = vec![course("c1", "CSE", "101", "Intro to Computer Science")];
        let sections = vec![
            section("s1", "c1", "Lecture", "ENG"),
            section("s2", "c1", "Lecture", "SCI"),
            section("s3", "c1", "Discussion", "ENG"),
        ];
        let descriptions = vec![description("d1", "CSE 101", "Introduction to Computer Science")];

        let out = join_catalog(&courses, &sections, &descriptions);
        assert_eq!(out.records.len(), 2);
        assert_eq!(out.records[0].id, "d1-s1");
        assert_eq!(out.records[1].id, "d1-s2");
        // Shared course-level fields, distinct schedule metadata.
        assert_eq!(out.records[0].code, out.records[1].code);
        assert_eq!(out.records[0].title, out.records[1].title);
        assert_ne!(out.records[0].building, out.records[1].building);
    }

    #[test]
    fn unused_description_is_silently_ignored() {
        let courses = vec![course("c1", "CSE", "101", "Intro to Computer Science")];
        let sections = vec![section("s1", "c1", "Lecture", "ENG")];
        let descriptions = vec![
            description("d1", "CSE 101", "Introduction to Computer Science"),
            description("d2", "MAT 20", "Calculus"),
        ];

        let out = join_catalog(&courses, &sections, &descriptions);
        assert_eq!(out.records.len(), 1);
        assert!(out.missing_descriptions.is_empty());
    }

    #[test]
    fn output_follows_source_course_order() {
        let courses = vec![
            course("c2", "MAT", "20", "Calculus"),
            course("c1", "CSE", "101", "Intro to Computer Science"),
        ];
        let sections = vec![
            section("s1", "c1", "Lecture", "ENG"),
            section("s2", "c2", "Lecture", "SCI"),
        ];
        let descriptions = vec![
            description("d1", "CSE 101", "Introduction to Computer Science"),
            description("d2", "MAT 20", "Calculus"),
        ];

        let out = join_catalog(&courses, &sections, &descriptions);
        let codes: Vec<&str> = out.records.iter().map(|r| r.code.as_str()).collect();
        assert_eq!(codes, vec!["MAT 20", "CSE 101"]);
    }
}
