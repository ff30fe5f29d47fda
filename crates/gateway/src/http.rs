use std::sync::Arc;

use async_trait::async_trait;
use reqwest::header::AUTHORIZATION;
use reqwest::{Client, Method, RequestBuilder, Response, StatusCode};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use skilltrack_core::model::{AddStudentRequest, CheckoffRequest, CourseId, TemplateId};
use skilltrack_core::payload::{CoursePayload, TemplatePayload, TokenPayload, UserPayload};
use url::Url;

use crate::SkillTrackGateway;
use crate::config::GatewayConfig;
use crate::error::GatewayError;
use crate::token::TokenSource;

/// Gateway over the SkillTrack REST API.
#[derive(Clone)]
pub struct HttpGateway {
    client: Client,
    base_url: Url,
    tokens: Arc<dyn TokenSource>,
}

impl HttpGateway {
    /// # Errors
    ///
    /// Returns `GatewayError::Http` if the HTTP client cannot be built.
    pub fn new(config: GatewayConfig, tokens: Arc<dyn TokenSource>) -> Result<Self, GatewayError> {
        let mut builder = Client::builder();
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        Ok(Self {
            client: builder.build()?,
            base_url: config.base_url,
            tokens,
        })
    }

    /// Absolute URL for an endpoint, appended to the base URL's path.
    #[must_use]
    pub fn endpoint(&self, name: &str) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.pop_if_empty().push(name);
        }
        url
    }

    async fn request(&self, method: Method, url: Url) -> Result<RequestBuilder, GatewayError> {
        let token = self
            .tokens
            .id_token()
            .await
            .ok_or(GatewayError::MissingToken)?;
        tracing::debug!(%method, path = url.path(), "skilltrack request");
        Ok(self
            .client
            .request(method, url)
            .header(AUTHORIZATION, token))
    }

    async fn get_json<T: DeserializeOwned>(&self, url: Url) -> Result<T, GatewayError> {
        let response = self.request(Method::GET, url).await?.send().await?;
        let body = success_body(response).await?;
        serde_json::from_str(&body).map_err(|e| GatewayError::Decode(e.to_string()))
    }

    async fn post<B: Serialize + Sync>(&self, url: Url, body: &B) -> Result<String, GatewayError> {
        let response = self
            .request(Method::POST, url)
            .await?
            .json(body)
            .send()
            .await?;
        success_body(response).await
    }
}

#[async_trait]
impl SkillTrackGateway for HttpGateway {
    async fn fetch_user_data(&self) -> Result<UserPayload, GatewayError> {
        self.get_json(self.endpoint("FetchUserData")).await
    }

    async fn get_course_information(
        &self,
        course_id: &CourseId,
        student_emails: &[String],
    ) -> Result<CoursePayload, GatewayError> {
        self.get_json(course_information_url(
            self.endpoint("GetCourseInformation"),
            course_id,
            student_emails,
        ))
        .await
    }

    async fn get_course_information_for_roster(
        &self,
        course_id: &CourseId,
    ) -> Result<CoursePayload, GatewayError> {
        self.get_json(roster_information_url(
            self.endpoint("GetCourseInformation"),
            course_id,
        ))
        .await
    }

    async fn check_student_off(&self, request: &CheckoffRequest) -> Result<(), GatewayError> {
        let body = CheckStudentOffBody {
            course_id: request.course_id().as_str(),
            skill_name: request.skill_name(),
            student_list: request.student_emails(),
        };
        self.post(self.endpoint("CheckStudentOff"), &body).await?;
        Ok(())
    }

    async fn add_student_to_course(
        &self,
        request: &AddStudentRequest,
    ) -> Result<(), GatewayError> {
        let body = AddStudentBody {
            course_id: request.course_id().as_str(),
            student_id: request.student_email(),
        };
        self.post(self.endpoint("AddStudentToCourse"), &body).await?;
        Ok(())
    }

    async fn list_templates(&self) -> Result<Vec<TemplatePayload>, GatewayError> {
        self.get_json(self.endpoint("GetListOfTemplates")).await
    }

    async fn create_course_from_template(
        &self,
        template_id: &TemplateId,
    ) -> Result<(), GatewayError> {
        let body = CreateCourseBody {
            template_id: template_id.as_str(),
        };
        self.post(self.endpoint("CreateCourseFromTemplate"), &body)
            .await?;
        Ok(())
    }

    async fn fetch_user_token(&self) -> Result<TokenPayload, GatewayError> {
        let body = self
            .post(self.endpoint("FetchUserToken"), &serde_json::json!({}))
            .await?;
        serde_json::from_str(&body).map_err(|e| GatewayError::Decode(e.to_string()))
    }
}

/// `GetCourseInformation` URL with `Course_ID` and one `Student_Emails` per email.
#[must_use]
pub fn course_information_url(mut url: Url, course_id: &CourseId, student_emails: &[String]) -> Url {
    {
        let mut query = url.query_pairs_mut();
        query.append_pair("Course_ID", course_id.as_str());
        for email in student_emails {
            query.append_pair("Student_Emails", email);
        }
    }
    url
}

/// `GetCourseInformation` URL asking for every rostered student's progress.
#[must_use]
pub fn roster_information_url(mut url: Url, course_id: &CourseId) -> Url {
    url.query_pairs_mut()
        .append_pair("Course_ID", course_id.as_str())
        .append_pair("GetAllStudentsExtendedSkillInformation", "true");
    url
}

async fn success_body(response: Response) -> Result<String, GatewayError> {
    let status = response.status();
    let body = response.text().await?;
    if status == StatusCode::UNAUTHORIZED {
        return Err(GatewayError::Unauthorized);
    }
    if !status.is_success() {
        tracing::warn!(status = status.as_u16(), "skilltrack request rejected");
        return Err(GatewayError::status(
            status.as_u16(),
            error_message(&body, status),
        ));
    }
    Ok(body)
}

/// The backend replies to failures with a JSON string body; fall back to the
/// raw text, then the status reason.
fn error_message(body: &str, status: StatusCode) -> String {
    match serde_json::from_str::<Value>(body) {
        Ok(Value::String(message)) => message,
        Ok(Value::Object(fields)) => fields
            .get("message")
            .or_else(|| fields.get("error"))
            .and_then(Value::as_str)
            .map_or_else(|| body.trim().to_owned(), str::to_owned),
        _ if !body.trim().is_empty() => body.trim().to_owned(),
        _ => status
            .canonical_reason()
            .unwrap_or("request failed")
            .to_owned(),
    }
}

#[derive(Debug, Serialize)]
struct CheckStudentOffBody<'a> {
    #[serde(rename = "Course_ID")]
    course_id: &'a str,
    #[serde(rename = "Skill_Name")]
    skill_name: &'a str,
    #[serde(rename = "Student_List")]
    student_list: &'a [String],
}

#[derive(Debug, Serialize)]
struct AddStudentBody<'a> {
    #[serde(rename = "Course_ID")]
    course_id: &'a str,
    #[serde(rename = "Student_ID")]
    student_id: &'a str,
}

#[derive(Debug, Serialize)]
struct CreateCourseBody<'a> {
    #[serde(rename = "Template_ID")]
    template_id: &'a str,
}
