use thiserror::Error;

use crate::model::ids::{CourseId, TemplateId};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum EnrollmentError {
    #[error("enter a student email")]
    MissingEmail,

    #[error("'{0}' is not an email address")]
    InvalidEmail(String),

    #[error("course id cannot be empty")]
    MissingCourse,

    #[error("select a template")]
    MissingTemplate,
}

/// Request to enroll one student in a course the caller teaches.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddStudentRequest {
    course_id: CourseId,
    student_email: String,
}

impl AddStudentRequest {
    /// # Errors
    ///
    /// Returns `EnrollmentError` if the course is blank or the email is blank
    /// or has no `@`.
    pub fn new(course_id: CourseId, student_email: &str) -> Result<Self, EnrollmentError> {
        if course_id.is_blank() {
            return Err(EnrollmentError::MissingCourse);
        }
        let email = student_email.trim();
        if email.is_empty() {
            return Err(EnrollmentError::MissingEmail);
        }
        if !email.contains('@') {
            return Err(EnrollmentError::InvalidEmail(email.to_owned()));
        }
        Ok(Self {
            course_id,
            student_email: email.to_owned(),
        })
    }

    #[must_use]
    pub fn course_id(&self) -> &CourseId {
        &self.course_id
    }

    #[must_use]
    pub fn student_email(&self) -> &str {
        &self.student_email
    }
}

/// Validate a template selection before asking the backend to instantiate it.
///
/// # Errors
///
/// Returns `EnrollmentError::MissingTemplate` when nothing is selected.
pub fn require_template(template_id: Option<&TemplateId>) -> Result<TemplateId, EnrollmentError> {
    match template_id {
        Some(id) if !id.is_blank() => Ok(id.clone()),
        _ => Err(EnrollmentError::MissingTemplate),
    }
}
