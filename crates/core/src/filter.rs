//! Status filters and text search over skills, courses and students.
//!
//! All filters return a new vector and keep the input's relative order.
//! Queries are trimmed and compared case-insensitively; a blank query
//! matches everything.

use serde::{Deserialize, Serialize};

use crate::model::{CourseSummary, SkillRecord, StudentRecord};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StatusFilter {
    #[default]
    All,
    Complete,
    Incomplete,
}

impl StatusFilter {
    #[must_use]
    pub fn accepts(self, skill: &SkillRecord) -> bool {
        match self {
            Self::All => true,
            Self::Complete => skill.checked_off(),
            Self::Incomplete => !skill.checked_off(),
        }
    }

    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::All => "All",
            Self::Complete => "Complete",
            Self::Incomplete => "Incomplete",
        }
    }
}

/// A normalised search query.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Query(String);

impl Query {
    #[must_use]
    pub fn new(raw: &str) -> Self {
        Self(raw.trim().to_lowercase())
    }

    #[must_use]
    pub fn is_blank(&self) -> bool {
        self.0.is_empty()
    }

    #[must_use]
    pub fn matches(&self, haystack: &str) -> bool {
        self.is_blank() || haystack.to_lowercase().contains(&self.0)
    }

    /// True when any of `fields` contains the query.
    #[must_use]
    pub fn matches_any<'a>(&self, fields: impl IntoIterator<Item = &'a str>) -> bool {
        self.is_blank() || fields.into_iter().any(|field| self.matches(field))
    }
}

/// Skills passing `status`, then whose name contains `search`.
#[must_use]
pub fn filter_skills(skills: &[SkillRecord], status: StatusFilter, search: &str) -> Vec<SkillRecord> {
    let query = Query::new(search);
    skills
        .iter()
        .filter(|skill| status.accepts(skill))
        .filter(|skill| query.matches(skill.skill_name()))
        .cloned()
        .collect()
}

/// Courses whose name contains `search`, optionally restricted to one year.
#[must_use]
pub fn filter_courses(
    courses: &[CourseSummary],
    search: &str,
    year: Option<u32>,
) -> Vec<CourseSummary> {
    let query = Query::new(search);
    courses
        .iter()
        .filter(|course| year.is_none_or(|y| course.year() == Some(y)))
        .filter(|course| query.matches(course.course_name()))
        .cloned()
        .collect()
}

/// Students whose first name, last name or email contains `search`.
#[must_use]
pub fn filter_students(students: &[StudentRecord], search: &str) -> Vec<StudentRecord> {
    let query = Query::new(search);
    students
        .iter()
        .filter(|s| query.matches_any([s.first_name(), s.last_name(), s.email()]))
        .cloned()
        .collect()
}
