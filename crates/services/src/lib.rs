#![forbid(unsafe_code)]

pub mod app_services;
pub mod checkoff;
pub mod course_service;
pub mod enrollment_service;
pub mod error;
pub mod identity_service;
pub mod roster_service;
pub mod template_service;

pub use skilltrack_core::Clock;

pub use app_services::AppServices;
pub use checkoff::{CheckoffOutcome, CheckoffPhase, CheckoffReconciler};
pub use course_service::CourseService;
pub use enrollment_service::{EnrollmentOutcome, EnrollmentService};
pub use error::{ErrorKind, ServiceError};
pub use identity_service::IdentityService;
pub use roster_service::RosterService;
pub use template_service::TemplateService;
