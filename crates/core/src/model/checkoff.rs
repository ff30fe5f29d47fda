use thiserror::Error;

use crate::model::ids::CourseId;

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum CheckoffRequestError {
    #[error("select at least one student")]
    NoStudents,

    #[error("select a skill")]
    MissingSkill,

    #[error("course id cannot be empty")]
    MissingCourse,

    #[error("checkoff for {request} cannot update course {snapshot}")]
    CourseMismatch { request: CourseId, snapshot: CourseId },
}

//
// ─── REQUEST ───────────────────────────────────────────────────────────────────
//

/// An instructor's request to check one skill off for a set of students.
///
/// Only constructible through [`CheckoffRequest::new`], so a value of this
/// type is always well-formed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckoffRequest {
    course_id: CourseId,
    skill_name: String,
    student_emails: Vec<String>,
}

impl CheckoffRequest {
    /// Validate and build a request.
    ///
    /// Student emails are trimmed; blanks are ignored and duplicates collapse
    /// onto their first occurrence.
    ///
    /// # Errors
    ///
    /// Returns `CheckoffRequestError` if the course or skill is blank, or no
    /// student remains after trimming.
    pub fn new<I, S>(
        course_id: CourseId,
        skill_name: impl Into<String>,
        student_emails: I,
    ) -> Result<Self, CheckoffRequestError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        if course_id.is_blank() {
            return Err(CheckoffRequestError::MissingCourse);
        }
        let skill_name = skill_name.into();
        if skill_name.trim().is_empty() {
            return Err(CheckoffRequestError::MissingSkill);
        }

        let mut emails: Vec<String> = Vec::new();
        for email in student_emails {
            let email = email.as_ref().trim();
            if email.is_empty() || emails.iter().any(|seen| seen == email) {
                continue;
            }
            emails.push(email.to_owned());
        }
        if emails.is_empty() {
            return Err(CheckoffRequestError::NoStudents);
        }

        Ok(Self {
            course_id,
            skill_name,
            student_emails: emails,
        })
    }

    #[must_use]
    pub fn course_id(&self) -> &CourseId {
        &self.course_id
    }

    #[must_use]
    pub fn skill_name(&self) -> &str {
        &self.skill_name
    }

    #[must_use]
    pub fn student_emails(&self) -> &[String] {
        &self.student_emails
    }

    #[must_use]
    pub fn targets(&self, email: &str) -> bool {
        self.student_emails.iter().any(|e| e == email)
    }
}
