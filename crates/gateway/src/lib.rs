//! Access to the SkillTrack REST backend.
//!
//! [`SkillTrackGateway`] is the seam services depend on. [`HttpGateway`] talks
//! to the real API; [`InMemoryGateway`] keeps backend rows in memory and
//! applies the same rules, for tests and offline use.

#![forbid(unsafe_code)]

use async_trait::async_trait;
use skilltrack_core::model::{AddStudentRequest, CheckoffRequest, CourseId, TemplateId};
use skilltrack_core::payload::{CoursePayload, TemplatePayload, TokenPayload, UserPayload};

pub mod config;
pub mod error;
pub mod http;
pub mod memory;
pub mod token;

pub use config::GatewayConfig;
pub use error::{ConfigError, GatewayError};
pub use http::HttpGateway;
pub use memory::InMemoryGateway;
pub use token::{StaticToken, TokenSource};

/// The backend operations the client uses, one per endpoint.
#[async_trait]
pub trait SkillTrackGateway: Send + Sync {
    /// `GET /FetchUserData` for the signed-in user.
    ///
    /// # Errors
    ///
    /// Returns `GatewayError` on missing token, transport failure or non-2xx.
    async fn fetch_user_data(&self) -> Result<UserPayload, GatewayError>;

    /// `GET /GetCourseInformation`. `student_emails` selects which students'
    /// progress is included in `StudentsExtended`.
    ///
    /// # Errors
    ///
    /// Returns `GatewayError` on missing token, transport failure or non-2xx.
    async fn get_course_information(
        &self,
        course_id: &CourseId,
        student_emails: &[String],
    ) -> Result<CoursePayload, GatewayError>;

    /// `GET /GetCourseInformation` with `GetAllStudentsExtendedSkillInformation=true`:
    /// `StudentsExtended` covers the whole roster in one request.
    ///
    /// # Errors
    ///
    /// Returns `GatewayError` on missing token, transport failure or non-2xx.
    async fn get_course_information_for_roster(
        &self,
        course_id: &CourseId,
    ) -> Result<CoursePayload, GatewayError>;

    /// `POST /CheckStudentOff`.
    ///
    /// # Errors
    ///
    /// Returns `GatewayError` on missing token, transport failure or non-2xx.
    async fn check_student_off(&self, request: &CheckoffRequest) -> Result<(), GatewayError>;

    /// `POST /AddStudentToCourse`.
    ///
    /// # Errors
    ///
    /// Returns `GatewayError` on missing token, transport failure or non-2xx.
    async fn add_student_to_course(&self, request: &AddStudentRequest)
    -> Result<(), GatewayError>;

    /// `GET /GetListOfTemplates`.
    ///
    /// # Errors
    ///
    /// Returns `GatewayError` on missing token, transport failure or non-2xx.
    async fn list_templates(&self) -> Result<Vec<TemplatePayload>, GatewayError>;

    /// `POST /CreateCourseFromTemplate`.
    ///
    /// # Errors
    ///
    /// Returns `GatewayError` on missing token, transport failure or non-2xx.
    async fn create_course_from_template(
        &self,
        template_id: &TemplateId,
    ) -> Result<(), GatewayError>;

    /// `POST /FetchUserToken`.
    ///
    /// # Errors
    ///
    /// Returns `GatewayError` on missing token, transport failure or non-2xx.
    async fn fetch_user_token(&self) -> Result<TokenPayload, GatewayError>;
}
