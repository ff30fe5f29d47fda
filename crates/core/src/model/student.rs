use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::model::ids::CourseId;

/// A student as known to an instructor, keyed by email.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StudentRecord {
    email: String,
    first_name: String,
    last_name: String,
    courses: BTreeSet<CourseId>,
    derived_name: bool,
}

impl StudentRecord {
    /// Student known only by email; the first name is the email's local part.
    #[must_use]
    pub fn from_email(email: &str) -> Self {
        let email = email.trim();
        Self {
            email: email.to_owned(),
            first_name: local_part(email).to_owned(),
            last_name: String::new(),
            courses: BTreeSet::new(),
            derived_name: true,
        }
    }

    /// Student with names taken from the payload. Blank names fall back to the email.
    #[must_use]
    pub fn with_names(email: &str, first_name: Option<&str>, last_name: Option<&str>) -> Self {
        let first = first_name.map(str::trim).filter(|v| !v.is_empty());
        let last = last_name.map(str::trim).filter(|v| !v.is_empty());
        if first.is_none() && last.is_none() {
            return Self::from_email(email);
        }
        Self {
            first_name: first.unwrap_or_default().to_owned(),
            last_name: last.unwrap_or_default().to_owned(),
            derived_name: false,
            ..Self::from_email(email)
        }
    }

    #[must_use]
    pub fn email(&self) -> &str {
        &self.email
    }

    #[must_use]
    pub fn first_name(&self) -> &str {
        &self.first_name
    }

    #[must_use]
    pub fn last_name(&self) -> &str {
        &self.last_name
    }

    /// `first last`, trimmed when the last name is empty.
    #[must_use]
    pub fn display_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
            .trim()
            .to_owned()
    }

    #[must_use]
    pub fn courses(&self) -> &BTreeSet<CourseId> {
        &self.courses
    }

    /// True when the names were derived from the email rather than supplied.
    #[must_use]
    pub fn has_derived_name(&self) -> bool {
        self.derived_name
    }

    /// Add a course membership. Adding an existing id is a no-op.
    pub fn enroll(&mut self, course_id: CourseId) {
        self.courses.insert(course_id);
    }

    /// Replace derived names with names from a later, richer sighting.
    pub(crate) fn adopt_names(&mut self, other: &StudentRecord) {
        if self.derived_name && !other.derived_name {
            self.first_name.clone_from(&other.first_name);
            self.last_name.clone_from(&other.last_name);
            self.derived_name = false;
        }
    }
}

fn local_part(email: &str) -> &str {
    email.split('@').next().unwrap_or(email)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_name_defaults_to_local_part() {
        let student = StudentRecord::from_email("jane.doe@school.edu");
        assert_eq!(student.first_name(), "jane.doe");
        assert_eq!(student.last_name(), "");
        assert_eq!(student.display_name(), "jane.doe");
        assert!(student.has_derived_name());
    }

    #[test]
    fn email_without_at_uses_whole_string() {
        let student = StudentRecord::from_email("teacher-account");
        assert_eq!(student.first_name(), "teacher-account");
    }

    #[test]
    fn blank_payload_names_fall_back_to_email() {
        let student = StudentRecord::with_names("a@x.com", Some(" "), None);
        assert_eq!(student.first_name(), "a");
        assert!(student.has_derived_name());
    }

    #[test]
    fn enroll_is_idempotent() {
        let mut student = StudentRecord::from_email("a@x.com");
        student.enroll(CourseId::new("c1"));
        student.enroll(CourseId::new("c1"));
        assert_eq!(student.courses().len(), 1);
    }
}
