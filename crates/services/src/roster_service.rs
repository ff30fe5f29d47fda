use std::sync::Arc;

use futures::future::join_all;
use gateway::SkillTrackGateway;
use skilltrack_core::aggregate::{course_students, user_profile};
use skilltrack_core::model::{CourseId, StudentRecord};
use skilltrack_core::roster::RosterBuilder;

use crate::error::ServiceError;

/// Builds the deduplicated roster of every student an instructor teaches.
#[derive(Clone)]
pub struct RosterService {
    gateway: Arc<dyn SkillTrackGateway>,
}

impl RosterService {
    #[must_use]
    pub fn new(gateway: Arc<dyn SkillTrackGateway>) -> Self {
        Self { gateway }
    }

    /// Roster across the signed-in user's taught courses.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::Gateway` only if the user data cannot be
    /// fetched; individual course failures are skipped.
    pub async fn my_students(&self) -> Result<Vec<StudentRecord>, ServiceError> {
        let profile = user_profile(&self.gateway.fetch_user_data().await?);
        Ok(self.students_for(&profile.teaching).await)
    }

    /// Fetch every course concurrently and merge the rosters in `course_ids` order.
    ///
    /// A course that fails to load is logged and contributes nothing.
    pub async fn students_for(&self, course_ids: &[CourseId]) -> Vec<StudentRecord> {
        let fetches = course_ids.iter().map(|course_id| async move {
            let result = self.gateway.get_course_information(course_id, &[]).await;
            (course_id, result)
        });

        let mut roster = RosterBuilder::new();
        for (course_id, result) in join_all(fetches).await {
            match result {
                Ok(payload) => {
                    for student in course_students(course_id, &payload) {
                        roster.add_student(course_id, student);
                    }
                }
                Err(err) => {
                    tracing::warn!(%course_id, error = %err, "skipping course roster");
                }
            }
        }
        tracing::debug!(
            courses = course_ids.len(),
            students = roster.len(),
            "roster merged"
        );
        roster.finish()
    }
}
