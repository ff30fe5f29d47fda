//! Student roster merging across the courses an instructor teaches.

use std::collections::HashMap;

use crate::model::{CourseId, StudentRecord};

/// Accumulates students across course rosters, keyed by email.
///
/// Output order is the order in which each email was first seen.
#[derive(Debug, Default)]
pub struct RosterBuilder {
    students: Vec<StudentRecord>,
    index: HashMap<String, usize>,
}

impl RosterBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record that `email` is enrolled in `course_id`. Blank emails are ignored.
    pub fn add_email(&mut self, course_id: &CourseId, email: &str) {
        if email.trim().is_empty() {
            return;
        }
        self.add_student(course_id, StudentRecord::from_email(email));
    }

    /// Record a student sighting that may carry names from the payload.
    pub fn add_student(&mut self, course_id: &CourseId, student: StudentRecord) {
        if student.email().is_empty() {
            return;
        }
        if let Some(&pos) = self.index.get(student.email()) {
            let existing = &mut self.students[pos];
            existing.adopt_names(&student);
            existing.enroll(course_id.clone());
            return;
        }

        let mut student = student;
        student.enroll(course_id.clone());
        self.index
            .insert(student.email().to_owned(), self.students.len());
        self.students.push(student);
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.students.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.students.is_empty()
    }

    #[must_use]
    pub fn finish(self) -> Vec<StudentRecord> {
        self.students
    }
}

/// Merge per-course email lists into one deduplicated roster.
///
/// Traversal order of `rosters` fixes the output order; course membership per
/// student does not depend on it.
pub fn merge_student_roster<I, E>(rosters: I) -> Vec<StudentRecord>
where
    I: IntoIterator<Item = (CourseId, Vec<E>)>,
    E: AsRef<str>,
{
    let mut builder = RosterBuilder::new();
    for (course_id, emails) in rosters {
        for email in &emails {
            builder.add_email(&course_id, email.as_ref());
        }
    }
    builder.finish()
}
