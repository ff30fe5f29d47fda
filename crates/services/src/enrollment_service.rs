use std::sync::Arc;

use gateway::SkillTrackGateway;
use skilltrack_core::aggregate::course_detail;
use skilltrack_core::model::{AddStudentRequest, CourseDetail, CourseId};

use crate::error::ServiceError;

/// Result of adding a student. `detail` is the refetched course, or `None`
/// if the enrollment succeeded but the refetch did not.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnrollmentOutcome {
    pub course_id: CourseId,
    pub student_email: String,
    pub detail: Option<CourseDetail>,
}

#[derive(Clone)]
pub struct EnrollmentService {
    gateway: Arc<dyn SkillTrackGateway>,
}

impl EnrollmentService {
    #[must_use]
    pub fn new(gateway: Arc<dyn SkillTrackGateway>) -> Self {
        Self { gateway }
    }

    /// Enroll `email` in `course_id`, then refetch the course.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::Validation` for a blank or malformed email
    /// (nothing is sent) and `ServiceError::Gateway` if the backend rejects
    /// the enrollment.
    pub async fn add_student(
        &self,
        course_id: &CourseId,
        email: &str,
    ) -> Result<EnrollmentOutcome, ServiceError> {
        let request = AddStudentRequest::new(course_id.clone(), email)?;
        self.gateway.add_student_to_course(&request).await?;
        tracing::info!(%course_id, student = request.student_email(), "student enrolled");

        let detail = match self.gateway.get_course_information(course_id, &[]).await {
            Ok(payload) => Some(course_detail(course_id, &payload)),
            Err(err) => {
                tracing::warn!(%course_id, error = %err, "enrolled but course refresh failed");
                None
            }
        };
        Ok(EnrollmentOutcome {
            course_id: course_id.clone(),
            student_email: request.student_email().to_owned(),
            detail,
        })
    }
}
