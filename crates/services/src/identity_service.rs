use std::sync::Arc;

use gateway::SkillTrackGateway;
use skilltrack_core::model::IdentityToken;

use crate::error::ServiceError;

/// Issues the short-lived token a student shows as a QR code.
#[derive(Clone)]
pub struct IdentityService {
    gateway: Arc<dyn SkillTrackGateway>,
}

impl IdentityService {
    #[must_use]
    pub fn new(gateway: Arc<dyn SkillTrackGateway>) -> Self {
        Self { gateway }
    }

    /// # Errors
    ///
    /// Returns `ServiceError::Gateway` if no token could be issued.
    pub async fn identity_token(&self) -> Result<IdentityToken, ServiceError> {
        let payload = self.gateway.fetch_user_token().await?;
        Ok(IdentityToken::new(payload.token))
    }
}
