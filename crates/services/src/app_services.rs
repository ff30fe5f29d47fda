use std::sync::Arc;

use gateway::{GatewayConfig, HttpGateway, InMemoryGateway, SkillTrackGateway, TokenSource};

use crate::Clock;
use crate::checkoff::CheckoffReconciler;
use crate::course_service::CourseService;
use crate::enrollment_service::EnrollmentService;
use crate::error::ServiceError;
use crate::identity_service::IdentityService;
use crate::roster_service::RosterService;
use crate::template_service::TemplateService;

/// Assembles app-facing services over one gateway.
#[derive(Clone)]
pub struct AppServices {
    clock: Clock,
    gateway: Arc<dyn SkillTrackGateway>,
    courses: Arc<CourseService>,
    rosters: Arc<RosterService>,
    enrollment: Arc<EnrollmentService>,
    templates: Arc<TemplateService>,
    identity: Arc<IdentityService>,
}

impl AppServices {
    #[must_use]
    pub fn new(gateway: Arc<dyn SkillTrackGateway>, clock: Clock) -> Self {
        Self {
            clock,
            courses: Arc::new(CourseService::new(Arc::clone(&gateway))),
            rosters: Arc::new(RosterService::new(Arc::clone(&gateway))),
            enrollment: Arc::new(EnrollmentService::new(Arc::clone(&gateway))),
            templates: Arc::new(TemplateService::new(Arc::clone(&gateway))),
            identity: Arc::new(IdentityService::new(Arc::clone(&gateway))),
            gateway,
        }
    }

    /// Build services over the REST API.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::Gateway` if the HTTP client cannot be built.
    pub fn http(
        config: GatewayConfig,
        tokens: Arc<dyn TokenSource>,
        clock: Clock,
    ) -> Result<Self, ServiceError> {
        let gateway: Arc<dyn SkillTrackGateway> = Arc::new(HttpGateway::new(config, tokens)?);
        Ok(Self::new(gateway, clock))
    }

    /// Build services over an in-memory backend.
    #[must_use]
    pub fn in_memory(backend: InMemoryGateway, clock: Clock) -> Self {
        Self::new(Arc::new(backend), clock)
    }

    #[must_use]
    pub fn clock(&self) -> Clock {
        self.clock
    }

    #[must_use]
    pub fn courses(&self) -> Arc<CourseService> {
        Arc::clone(&self.courses)
    }

    #[must_use]
    pub fn rosters(&self) -> Arc<RosterService> {
        Arc::clone(&self.rosters)
    }

    #[must_use]
    pub fn enrollment(&self) -> Arc<EnrollmentService> {
        Arc::clone(&self.enrollment)
    }

    #[must_use]
    pub fn templates(&self) -> Arc<TemplateService> {
        Arc::clone(&self.templates)
    }

    #[must_use]
    pub fn identity(&self) -> Arc<IdentityService> {
        Arc::clone(&self.identity)
    }

    /// A fresh reconciler for one checkoff screen acting as `actor`.
    #[must_use]
    pub fn reconciler(&self, actor: impl Into<String>) -> CheckoffReconciler {
        CheckoffReconciler::new(Arc::clone(&self.gateway), self.clock, actor)
    }
}
