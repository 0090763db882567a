use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::Serialize;
use serde::de::DeserializeOwned;
use url::Url;

use lwh_core::model::{
    Account, Course, CourseId, Enrollment, Lesson, LessonId, LessonProgress, Resource,
};

use super::CourseApi;
use crate::config::ClientConfig;
use crate::error::ApiError;

/// `CourseApi` over the gateway's REST endpoints.
#[derive(Clone)]
pub struct HttpCourseApi {
    client: Client,
    gateway: Url,
    service: Url,
    token: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct EnrollRequest {
    course_id: CourseId,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct MarkProgressRequest {
    lesson_id: LessonId,
    course_id: CourseId,
}

impl HttpCourseApi {
    /// # Errors
    ///
    /// Returns `ApiError::Endpoint` if the service root cannot be derived from
    /// the gateway URL.
    pub fn new(client: Client, config: &ClientConfig) -> Result<Self, ApiError> {
        let gateway = config.api_base_url.clone();
        let service = gateway.join(&format!("services/{}/", config.service_name))?;
        Ok(Self {
            client,
            gateway,
            service,
            token: config.api_token.clone(),
        })
    }

    fn service_url(&self, path: &str) -> Result<Url, ApiError> {
        Ok(self.service.join(path)?)
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    async fn get_optional<T: DeserializeOwned>(&self, url: Url) -> Result<Option<T>, ApiError> {
        let response = self.authorize(self.client.get(url)).send().await?;
        decode_optional(response, NotFound::Absent).await
    }

    async fn get_list<T: DeserializeOwned>(&self, url: Url) -> Result<Vec<T>, ApiError> {
        Ok(self.get_optional::<Vec<T>>(url).await?.unwrap_or_default())
    }

    async fn post_optional<B: Serialize + Sync, T: DeserializeOwned>(
        &self,
        url: Url,
        body: &B,
    ) -> Result<Option<T>, ApiError> {
        let response = self
            .authorize(self.client.post(url))
            .json(body)
            .send()
            .await?;
        decode_optional(response, NotFound::Failure).await
    }
}

/// How a 404 is read: an absent record for lookups, a failure for commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum NotFound {
    Absent,
    Failure,
}

/// `Ok(true)` when the response carries a body worth decoding.
fn expects_body(status: StatusCode, not_found: NotFound) -> Result<bool, ApiError> {
    match status {
        StatusCode::NOT_FOUND if not_found == NotFound::Absent => Ok(false),
        StatusCode::NO_CONTENT => Ok(false),
        status if status.is_success() => Ok(true),
        status => Err(ApiError::HttpStatus(status)),
    }
}

async fn decode_optional<T: DeserializeOwned>(
    response: Response,
    not_found: NotFound,
) -> Result<Option<T>, ApiError> {
    if !expects_body(response.status(), not_found)? {
        return Ok(None);
    }
    let bytes = response.bytes().await?;
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Ok(None);
    }
    Ok(Some(serde_json::from_slice(&bytes)?))
}

#[async_trait]
impl CourseApi for HttpCourseApi {
    async fn current_account(&self) -> Result<Option<Account>, ApiError> {
        let url = self.gateway.join("api/account")?;
        let response = self.authorize(self.client.get(url)).send().await?;
        if response.status() == StatusCode::UNAUTHORIZED {
            return Ok(None);
        }
        decode_optional(response, NotFound::Absent).await
    }

    async fn list_enrollments(&self) -> Result<Vec<Enrollment>, ApiError> {
        self.get_list(self.service_url("api/user-course-enrollment")?)
            .await
    }

    async fn find_course(&self, id: CourseId) -> Result<Option<Course>, ApiError> {
        self.get_optional(self.service_url(&format!("api/courses/{id}"))?)
            .await
    }

    async fn find_lesson(&self, id: LessonId) -> Result<Option<Lesson>, ApiError> {
        self.get_optional(self.service_url(&format!("api/lessons/{id}"))?)
            .await
    }

    async fn query_lessons(&self, page_size: u32) -> Result<Vec<Lesson>, ApiError> {
        self.get_list(self.service_url(&format!("api/lessons?size={page_size}"))?)
            .await
    }

    async fn query_resources(&self, page_size: u32) -> Result<Vec<Resource>, ApiError> {
        self.get_list(self.service_url(&format!("api/resources?size={page_size}"))?)
            .await
    }

    async fn course_progress(&self, course_id: CourseId) -> Result<Vec<LessonProgress>, ApiError> {
        self.get_list(self.service_url(&format!("api/user-lesson-progress/course/{course_id}"))?)
            .await
    }

    async fn mark_progress(
        &self,
        lesson_id: LessonId,
        course_id: CourseId,
    ) -> Result<Option<LessonProgress>, ApiError> {
        let body = MarkProgressRequest {
            lesson_id,
            course_id,
        };
        self.post_optional(self.service_url("api/user-lesson-progress/mark")?, &body)
            .await
    }

    async fn enroll(&self, course_id: CourseId) -> Result<Option<Enrollment>, ApiError> {
        let body = EnrollRequest { course_id };
        self.post_optional(self.service_url("api/user-course-enrollment/enroll")?, &body)
            .await
    }

    async fn unenroll(&self, course_id: CourseId) -> Result<(), ApiError> {
        let url = self.service_url(&format!("api/user-course-enrollment/{course_id}"))?;
        let response = self.authorize(self.client.delete(url)).send().await?;
        expects_body(response.status(), NotFound::Failure)?;
        Ok(())
    }

    async fn is_enrolled(&self, course_id: CourseId) -> Result<bool, ApiError> {
        let url = self.service_url(&format!("api/user-course-enrollment/check/{course_id}"))?;
        Ok(self.get_optional::<bool>(url).await? == Some(true))
    }
}
