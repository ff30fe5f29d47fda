use std::sync::Arc;

use gateway::SkillTrackGateway;
use skilltrack_core::aggregate::{
    aggregate_courses, course_detail, course_snapshot, student_course_skills, user_profile,
};
use skilltrack_core::model::{
    CourseDetail, CourseId, CourseSnapshot, CourseSummary, SkillRecord, UserProfile,
};

use crate::error::ServiceError;

/// Read-side access to the signed-in user's data and course information.
#[derive(Clone)]
pub struct CourseService {
    gateway: Arc<dyn SkillTrackGateway>,
}

impl CourseService {
    #[must_use]
    pub fn new(gateway: Arc<dyn SkillTrackGateway>) -> Self {
        Self { gateway }
    }

    /// # Errors
    ///
    /// Returns `ServiceError::Gateway` if the user data cannot be fetched.
    pub async fn profile(&self) -> Result<UserProfile, ServiceError> {
        let payload = self.gateway.fetch_user_data().await?;
        Ok(user_profile(&payload))
    }

    /// The signed-in student's courses, in payload order.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::Gateway` if the user data cannot be fetched.
    pub async fn my_courses(&self) -> Result<Vec<CourseSummary>, ServiceError> {
        let payload = self.gateway.fetch_user_data().await?;
        let courses = aggregate_courses(&payload);
        tracing::debug!(count = courses.len(), "courses aggregated");
        Ok(courses)
    }

    /// One of the signed-in student's courses. `Ok(None)` if not enrolled.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::Gateway` if the user data cannot be fetched.
    pub async fn my_course(
        &self,
        course_id: &CourseId,
    ) -> Result<Option<CourseSummary>, ServiceError> {
        let courses = self.my_courses().await?;
        Ok(courses.into_iter().find(|c| c.course_id() == course_id))
    }

    /// Catalog and roster of a course, without per-student progress.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::Gateway` if the course cannot be fetched.
    pub async fn course_detail(&self, course_id: &CourseId) -> Result<CourseDetail, ServiceError> {
        let payload = self.gateway.get_course_information(course_id, &[]).await?;
        Ok(course_detail(course_id, &payload))
    }

    /// Course state including progress for `student_emails`.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::Gateway` if the course cannot be fetched.
    pub async fn snapshot(
        &self,
        course_id: &CourseId,
        student_emails: &[String],
    ) -> Result<CourseSnapshot, ServiceError> {
        let payload = self
            .gateway
            .get_course_information(course_id, student_emails)
            .await?;
        Ok(course_snapshot(course_id, &payload))
    }

    /// Course state with progress for every rostered student, in one request.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::Gateway` if the course cannot be fetched.
    pub async fn roster_snapshot(&self, course_id: &CourseId) -> Result<CourseSnapshot, ServiceError> {
        let payload = self
            .gateway
            .get_course_information_for_roster(course_id)
            .await?;
        Ok(course_snapshot(course_id, &payload))
    }

    /// One student's skills in one course, for the instructor's student view.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::Gateway` if the course cannot be fetched.
    pub async fn student_skills(
        &self,
        course_id: &CourseId,
        email: &str,
    ) -> Result<Vec<SkillRecord>, ServiceError> {
        let payload = self
            .gateway
            .get_course_information(course_id, &[email.to_owned()])
            .await?;
        Ok(student_course_skills(&payload, course_id, email))
    }
}
