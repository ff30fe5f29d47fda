//! Normalisation of backend payloads into flat view-model types.
//!
//! Every function here is pure and total: malformed or missing parts of a
//! payload are defaulted, never reported.

use std::collections::HashSet;

use serde_json::{Map, Value};

use crate::model::{
    CourseDetail, CourseId, CourseSnapshot, CourseSummary, CourseTemplate, ProgressTotals, Role,
    SkillDefinition, SkillRecord, StudentProgress, StudentRecord, TemplateId, UNNAMED_COURSE,
    UserProfile,
};
use crate::payload::{
    CoursePayload, SkillValue, TEMPLATE_ID_PREFIX, TemplatePayload, UserPayload, as_mapping,
    string_field, string_list, year_value,
};
use crate::roster::RosterBuilder;

//
// ─── USER DATA ─────────────────────────────────────────────────────────────────
//

/// Flatten a user's enrolled courses into summaries.
///
/// Reads the current `Courses` mapping, or the legacy `Years -> Courses`
/// mapping when `Courses` is absent. Order follows the payload. A course id
/// seen twice keeps its first occurrence.
#[must_use]
pub fn aggregate_courses(payload: &UserPayload) -> Vec<CourseSummary> {
    let mut seen = HashSet::new();
    let mut out = Vec::new();

    let mut push = |course_id: &str, raw: &Value, year: Option<u32>| {
        if seen.insert(course_id.to_owned()) {
            out.push(summarize_course(CourseId::new(course_id), raw, year));
        }
    };

    if let Some(courses) = as_mapping(&payload.courses) {
        for (course_id, raw) in courses {
            push(course_id, raw, None);
        }
    } else if let Some(years) = as_mapping(&payload.years) {
        for (year_key, year_data) in years {
            let Ok(year) = year_key.trim().parse::<u32>() else {
                continue;
            };
            let Some(courses) = year_data.get("Courses").and_then(Value::as_object) else {
                continue;
            };
            for (course_id, raw) in courses {
                push(course_id, raw, Some(year));
            }
        }
    }

    out
}

/// Build the signed-in user's profile.
#[must_use]
pub fn user_profile(payload: &UserPayload) -> UserProfile {
    UserProfile {
        email: payload.resolved_email().unwrap_or_default(),
        first_name: non_blank(payload.first_name()),
        last_name: non_blank(payload.last_name()),
        roles: string_list(&payload.roles)
            .iter()
            .map(|raw| Role::parse(raw))
            .collect(),
        teaching: string_list(&payload.teaching_these_courses)
            .into_iter()
            .filter(|id| !id.trim().is_empty())
            .map(CourseId::new)
            .collect(),
        courses: aggregate_courses(payload),
    }
}

/// Sum skill counts across courses.
#[must_use]
pub fn progress_totals(courses: &[CourseSummary]) -> ProgressTotals {
    courses
        .iter()
        .fold(ProgressTotals::default(), |acc, course| ProgressTotals {
            total: acc.total + course.total_skills(),
            completed: acc.completed + course.completed_skills(),
        })
}

fn summarize_course(course_id: CourseId, raw: &Value, year: Option<u32>) -> CourseSummary {
    let Some(course) = raw.as_object() else {
        return CourseSummary::new(course_id, None, year, Vec::new());
    };
    let name = string_field(course, "CourseName").map(str::to_owned);
    let skills = course
        .get("Skills")
        .and_then(Value::as_object)
        .map(|skills| {
            skills
                .iter()
                .map(|(name, value)| normalize_skill(name, &SkillValue::read(value)))
                .collect()
        })
        .unwrap_or_default();
    CourseSummary::new(course_id, name, year, skills)
}

fn normalize_skill(name: &str, value: &SkillValue) -> SkillRecord {
    match value {
        SkillValue::Flag(true) => SkillRecord::completed(name),
        SkillValue::Flag(false) => SkillRecord::pending(name),
        SkillValue::Status(status) => SkillRecord::from_parts(
            name,
            status.description.clone(),
            status.checked_off,
            status.checked_off_by.clone(),
            status.date_checked_off.clone(),
        ),
    }
}

//
// ─── COURSE INFORMATION ────────────────────────────────────────────────────────
//

/// The course's skill catalog in payload order.
#[must_use]
pub fn skill_catalog(course: &CoursePayload) -> Vec<SkillDefinition> {
    let Some(skills) = as_mapping(&course.skills) else {
        return Vec::new();
    };
    skills
        .iter()
        .map(|(name, info)| SkillDefinition {
            name: name.clone(),
            description: info
                .as_object()
                .and_then(|info| string_field(info, "Description"))
                .unwrap_or_default()
                .to_owned(),
        })
        .collect()
}

/// The course roster. Accepts plain emails or `{Email, FirstName, LastName}` objects.
#[must_use]
pub fn course_students(course_id: &CourseId, course: &CoursePayload) -> Vec<StudentRecord> {
    let mut roster = RosterBuilder::new();
    if let Value::Array(entries) = &course.students {
        for entry in entries {
            match entry {
                Value::String(email) => roster.add_email(course_id, email),
                Value::Object(fields) => {
                    if let Some(email) = string_field(fields, "Email") {
                        roster.add_student(
                            course_id,
                            StudentRecord::with_names(
                                email,
                                string_field(fields, "FirstName"),
                                string_field(fields, "LastName"),
                            ),
                        );
                    }
                }
                _ => {}
            }
        }
    }
    roster.finish()
}

/// Skills of one student in one course: the catalog joined with the
/// student's status from `StudentsExtended`. Catalog order; unknown status
/// counts as not checked off.
#[must_use]
pub fn student_course_skills(
    course: &CoursePayload,
    course_id: &CourseId,
    email: &str,
) -> Vec<SkillRecord> {
    let statuses = extended_skill_statuses(course, course_id, email);
    skill_catalog(course)
        .into_iter()
        .map(|definition| {
            let value = statuses
                .and_then(|s| s.get(&definition.name))
                .map_or(SkillValue::Flag(false), SkillValue::read);
            normalize_skill(&definition.name, &value)
                .with_description(Some(definition.description))
        })
        .collect()
}

/// Instructor view of a course.
#[must_use]
pub fn course_detail(course_id: &CourseId, course: &CoursePayload) -> CourseDetail {
    CourseDetail {
        course_id: course_id.clone(),
        course_name: non_blank(course.course_name())
            .unwrap_or_else(|| UNNAMED_COURSE.to_owned()),
        skills: skill_catalog(course),
        students: course_students(course_id, course),
        teachers: string_list(&course.teachers),
    }
}

/// Course detail plus per-student progress for every student present in
/// `StudentsExtended`. Roster order first, then extended-only students.
#[must_use]
pub fn course_snapshot(course_id: &CourseId, course: &CoursePayload) -> CourseSnapshot {
    let detail = course_detail(course_id, course);
    let extended = as_mapping(&course.students_extended);

    let mut progress: Vec<StudentProgress> = Vec::new();
    if let Some(extended) = extended {
        for student in &detail.students {
            let Some(row) = extended.get(student.email()) else {
                continue;
            };
            let named = extended_student(student.email(), row);
            let mut student = student.clone();
            student.adopt_names(&named);
            progress.push(StudentProgress {
                skills: student_course_skills(course, course_id, student.email()),
                student,
            });
        }

        for (email, row) in extended {
            if progress.iter().any(|p| p.student.email() == email) {
                continue;
            }
            let mut student = extended_student(email, row);
            student.enroll(course_id.clone());
            progress.push(StudentProgress {
                student,
                skills: student_course_skills(course, course_id, email),
            });
        }
    }

    CourseSnapshot { detail, progress }
}

fn extended_student(email: &str, row: &Value) -> StudentRecord {
    match row.as_object() {
        Some(fields) => StudentRecord::with_names(
            email,
            string_field(fields, "FirstName"),
            string_field(fields, "LastName"),
        ),
        None => StudentRecord::from_email(email),
    }
}

fn extended_skill_statuses<'a>(
    course: &'a CoursePayload,
    course_id: &CourseId,
    email: &str,
) -> Option<&'a Map<String, Value>> {
    as_mapping(&course.students_extended)?
        .get(email)?
        .get("Courses")?
        .get(course_id.as_str())?
        .get("Skills")?
        .as_object()
}

//
// ─── TEMPLATES ─────────────────────────────────────────────────────────────────
//

/// Normalise template rows. Rows without an id are skipped.
#[must_use]
pub fn course_templates(rows: &[TemplatePayload]) -> Vec<CourseTemplate> {
    rows.iter().filter_map(course_template).collect()
}

fn course_template(row: &TemplatePayload) -> Option<CourseTemplate> {
    let raw_id = row.id()?;
    let id = raw_id
        .strip_prefix(TEMPLATE_ID_PREFIX)
        .filter(|rest| !rest.is_empty())
        .unwrap_or(raw_id);
    let name = non_blank(row.display_name()).unwrap_or_else(|| id.to_owned());
    let skill_count = match &row.skills {
        Value::Object(map) => map.len(),
        Value::Array(items) => items.len(),
        _ => 0,
    };
    Some(CourseTemplate {
        id: TemplateId::new(id),
        name,
        skill_count,
        year: year_value(&row.year),
    })
}

fn non_blank(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_owned)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn user(value: Value) -> UserPayload {
        serde_json::from_value(value).unwrap()
    }

    fn course(value: Value) -> CoursePayload {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn aggregates_current_shape() {
        let payload = user(json!({
            "Courses": {"c1": {"CourseName": "A", "Skills": {"s1": true, "s2": false}}}
        }));
        let courses = aggregate_courses(&payload);

        assert_eq!(courses.len(), 1);
        let c = &courses[0];
        assert_eq!(c.course_id(), &CourseId::new("c1"));
        assert_eq!(c.course_name(), "A");
        assert_eq!(c.total_skills(), 2);
        assert_eq!(c.completed_skills(), 1);
        assert_eq!(c.year(), None);
    }

    #[test]
    fn preserves_payload_order() {
        let payload = user(json!({
            "Courses": {
                "zeta": {"CourseName": "Z"},
                "alpha": {"CourseName": "A"},
                "mid": {"CourseName": "M"}
            }
        }));
        let ids: Vec<_> = aggregate_courses(&payload)
            .iter()
            .map(|c| c.course_id().to_string())
            .collect();
        assert_eq!(ids, ["zeta", "alpha", "mid"]);
    }

    #[test]
    fn defaults_missing_name_and_skills() {
        let payload = user(json!({"Courses": {"c1": {}, "c2": "garbage"}}));
        let courses = aggregate_courses(&payload);

        assert_eq!(courses.len(), 2);
        assert_eq!(courses[0].course_name(), UNNAMED_COURSE);
        assert_eq!(courses[0].total_skills(), 0);
        assert_eq!(courses[1].course_name(), UNNAMED_COURSE);
    }

    #[test]
    fn missing_or_non_mapping_container_is_empty() {
        assert!(aggregate_courses(&user(json!({"Email": "a@x.com"}))).is_empty());
        assert!(aggregate_courses(&user(json!({"Courses": ["c1"]}))).is_empty());
        assert!(aggregate_courses(&UserPayload::default()).is_empty());
    }

    #[test]
    fn reads_legacy_years_shape() {
        let payload = user(json!({
            "Years": {
                "1": {"Courses": {"NRS-210": {"CourseName": "NRS 210", "Skills": {"Handwashing": true}}}},
                "x": {"Courses": {"ignored": {}}},
                "2": {"Courses": {
                    "NRS-230": {"CourseName": "NRS 230", "Skills": {"IM": false, "IV": true}},
                    "NRS-210": {"CourseName": "duplicate"}
                }}
            }
        }));
        let courses = aggregate_courses(&payload);

        assert_eq!(courses.len(), 2);
        assert_eq!(courses[0].course_name(), "NRS 210");
        assert_eq!(courses[0].year(), Some(1));
        assert_eq!(courses[1].course_id(), &CourseId::new("NRS-230"));
        assert_eq!(courses[1].year(), Some(2));
        assert_eq!(courses[1].completed_skills(), 1);
    }

    #[test]
    fn current_shape_wins_over_legacy() {
        let payload = user(json!({
            "Courses": {"c1": {"CourseName": "Current"}},
            "Years": {"1": {"Courses": {"c9": {"CourseName": "Legacy"}}}}
        }));
        let courses = aggregate_courses(&payload);
        assert_eq!(courses.len(), 1);
        assert_eq!(courses[0].course_name(), "Current");
    }

    #[test]
    fn status_objects_keep_attribution() {
        let payload = user(json!({
            "Courses": {"c1": {"Skills": {
                "IV": {"CheckedOff": true, "CheckedOffBy": "prof@x.com", "DateCheckedOff": "2026-02-01"},
                "IM": {"CheckedOff": false, "CheckedOffBy": "prof@x.com"}
            }}}
        }));
        let courses = aggregate_courses(&payload);
        let skills = courses[0].skills();

        assert_eq!(skills[0].checked_off_by(), Some("prof@x.com"));
        assert_eq!(skills[0].date_checked_off(), Some("2026-02-01"));
        assert!(!skills[1].checked_off());
        assert_eq!(skills[1].checked_off_by(), None);
    }

    #[test]
    fn completed_never_exceeds_total() {
        let payloads = [
            json!({"Courses": {"c1": {"Skills": {"a": true, "b": true}}}}),
            json!({"Courses": {"c1": {"Skills": {"a": 1, "b": null, "c": {"CheckedOff": true}}}}}),
            json!({"Courses": {"c1": {"Skills": []}}}),
            json!({"Years": {"1": {"Courses": {"c1": {"Skills": {"a": false}}}}}}),
        ];
        for raw in payloads {
            for course in aggregate_courses(&user(raw)) {
                assert!(course.completed_skills() <= course.total_skills());
            }
        }
    }

    #[test]
    fn profile_reads_roles_and_teaching() {
        let payload = user(json!({
            "ID": "USER#prof@x.com",
            "FirstName": "Pat",
            "Roles": ["Teacher", "Student"],
            "TeachingTheseCourses": ["c1", "c2"],
            "Courses": {"c3": {"Skills": {"a": true, "b": false}}}
        }));
        let profile = user_profile(&payload);

        assert_eq!(profile.email, "prof@x.com");
        assert!(profile.is_instructor());
        assert_eq!(profile.teaching, vec![CourseId::new("c1"), CourseId::new("c2")]);
        assert_eq!(profile.progress(), ProgressTotals { total: 2, completed: 1 });
        assert_eq!(profile.progress().percent(), 50);
    }

    #[test]
    fn course_students_accept_both_shapes() {
        let payload = course(json!({
            "Students": [
                "a@x.com",
                {"Email": "b@x.com", "FirstName": "Bea", "LastName": "Lee"},
                {"FirstName": "No Email"},
                42
            ]
        }));
        let students = course_students(&CourseId::new("c1"), &payload);

        assert_eq!(students.len(), 2);
        assert_eq!(students[0].first_name(), "a");
        assert_eq!(students[1].display_name(), "Bea Lee");
        assert!(students[1].courses().contains(&CourseId::new("c1")));
    }

    #[test]
    fn student_skills_join_catalog_with_status() {
        let payload = course(json!({
            "CourseName": "NRS 210",
            "Skills": {
                "Handwashing": {"Description": "Wash hands"},
                "PPE": {"Description": "Gown and glove"}
            },
            "StudentsExtended": {
                "a@x.com": {"Courses": {"c1": {"Skills": {
                    "Handwashing": {"CheckedOff": true, "CheckedOffBy": "prof@x.com", "DateCheckedOff": "2026-01-05"}
                }}}}
            }
        }));
        let skills = student_course_skills(&payload, &CourseId::new("c1"), "a@x.com");

        assert_eq!(skills.len(), 2);
        assert!(skills[0].checked_off());
        assert_eq!(skills[0].description(), Some("Wash hands"));
        assert_eq!(skills[0].checked_off_by(), Some("prof@x.com"));
        assert!(!skills[1].checked_off());

        let unknown = student_course_skills(&payload, &CourseId::new("c1"), "z@x.com");
        assert!(unknown.iter().all(|s| !s.checked_off()));
    }

    #[test]
    fn snapshot_tracks_extended_students() {
        let payload = course(json!({
            "Skills": {"IV": {"Description": ""}},
            "Students": ["a@x.com", "b@x.com"],
            "StudentsExtended": {
                "b@x.com": {"Courses": {"c1": {"Skills": {"IV": true}}}},
                "c@x.com": {"FirstName": "Cy", "Courses": {"c1": {"Skills": {"IV": false}}}}
            }
        }));
        let snapshot = course_snapshot(&CourseId::new("c1"), &payload);

        assert_eq!(snapshot.detail.course_name, UNNAMED_COURSE);
        assert_eq!(snapshot.detail.students.len(), 2);
        assert_eq!(snapshot.tracked_emails(), ["b@x.com", "c@x.com"]);
        assert_eq!(snapshot.progress_for("b@x.com").unwrap().completed_skills(), 1);
        assert_eq!(snapshot.progress_for("c@x.com").unwrap().student.first_name(), "Cy");
    }

    #[test]
    fn templates_strip_prefix_and_pick_names() {
        let rows: Vec<TemplatePayload> = serde_json::from_value(json!([
            {"ID": "COURSE_TEMPLATE#NRS-210", "CourseName": "NRS 210", "Skills": {"a": {}, "b": {}}, "Year": 1},
            {"ID": "PLAIN", "Name": "Named"},
            {"CourseName": "no id"}
        ]))
        .unwrap();
        let templates = course_templates(&rows);

        assert_eq!(templates.len(), 2);
        assert_eq!(templates[0].id, TemplateId::new("NRS-210"));
        assert_eq!(templates[0].name, "NRS 210");
        assert_eq!(templates[0].skill_count, 2);
        assert_eq!(templates[0].year, Some(1));
        assert_eq!(templates[1].name, "Named");
    }

    #[test]
    fn mistyped_fields_fall_back_to_defaults() {
        let payload = user(json!({
            "Email": "a@x.com",
            "FirstName": 42,
            "Courses": {"c1": {"CourseName": 5, "Skills": {
                "IV": {"CheckedOff": true, "CheckedOffBy": 7}
            }}}
        }));
        let profile = user_profile(&payload);
        assert_eq!(profile.first_name, None);
        assert_eq!(profile.courses[0].course_name(), UNNAMED_COURSE);
        assert_eq!(profile.courses[0].completed_skills(), 1);
        assert_eq!(profile.courses[0].skills()[0].checked_off_by(), None);

        let detail = course_detail(
            &CourseId::new("c1"),
            &course(json!({"CourseName": ["A"], "Skills": {}})),
        );
        assert_eq!(detail.course_name, UNNAMED_COURSE);
    }
}
