use std::sync::Arc;

use gateway::SkillTrackGateway;
use skilltrack_core::aggregate::{course_templates, user_profile};
use skilltrack_core::model::{CourseTemplate, TemplateId, UserProfile, require_template};

use crate::error::ServiceError;

#[derive(Clone)]
pub struct TemplateService {
    gateway: Arc<dyn SkillTrackGateway>,
}

impl TemplateService {
    #[must_use]
    pub fn new(gateway: Arc<dyn SkillTrackGateway>) -> Self {
        Self { gateway }
    }

    /// # Errors
    ///
    /// Returns `ServiceError::Gateway` if the templates cannot be fetched.
    pub async fn list(&self) -> Result<Vec<CourseTemplate>, ServiceError> {
        let rows = self.gateway.list_templates().await?;
        Ok(course_templates(&rows))
    }

    /// Instantiate the selected template, then refetch the caller's profile
    /// so the new course shows up under taught courses.
    ///
    /// Returns `None` for the profile if the course was created but the
    /// refetch failed.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::Validation` when nothing is selected and
    /// `ServiceError::Gateway` if the backend rejects the creation.
    pub async fn create_course(
        &self,
        template_id: Option<&TemplateId>,
    ) -> Result<Option<UserProfile>, ServiceError> {
        let template_id = require_template(template_id)?;
        self.gateway.create_course_from_template(&template_id).await?;
        tracing::info!(template = %template_id, "course created from template");

        match self.gateway.fetch_user_data().await {
            Ok(payload) => Ok(Some(user_profile(&payload))),
            Err(err) => {
                tracing::warn!(error = %err, "course created but profile refresh failed");
                Ok(None)
            }
        }
    }
}
