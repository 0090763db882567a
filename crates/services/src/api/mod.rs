//! Remote collaborator contracts consumed by the client.

mod http;

pub use http::HttpCourseApi;

use async_trait::async_trait;
use lwh_core::model::{
    Account, Course, CourseId, Enrollment, Lesson, LessonId, LessonProgress, Resource,
};

use crate::error::ApiError;

/// Page size used when the client lists lessons or resources and filters locally.
pub const BULK_PAGE_SIZE: u32 = 1000;

/// Backend course API.
///
/// Every call is a network round trip; `Ok(None)` means the backend answered
/// without a body (anonymous account, unknown course, ...).
#[async_trait]
pub trait CourseApi: Send + Sync {
    /// Currently signed-in account, `None` when anonymous.
    async fn current_account(&self) -> Result<Option<Account>, ApiError>;

    /// Enrollments of the current user.
    async fn list_enrollments(&self) -> Result<Vec<Enrollment>, ApiError>;

    async fn find_course(&self, id: CourseId) -> Result<Option<Course>, ApiError>;

    async fn find_lesson(&self, id: LessonId) -> Result<Option<Lesson>, ApiError>;

    async fn query_lessons(&self, page_size: u32) -> Result<Vec<Lesson>, ApiError>;

    async fn query_resources(&self, page_size: u32) -> Result<Vec<Resource>, ApiError>;

    /// Progress records of the current user within one course.
    async fn course_progress(&self, course_id: CourseId) -> Result<Vec<LessonProgress>, ApiError>;

    /// Record that the current user opened a lesson within a course.
    async fn mark_progress(
        &self,
        lesson_id: LessonId,
        course_id: CourseId,
    ) -> Result<Option<LessonProgress>, ApiError>;

    async fn enroll(&self, course_id: CourseId) -> Result<Option<Enrollment>, ApiError>;

    async fn unenroll(&self, course_id: CourseId) -> Result<(), ApiError>;

    async fn is_enrolled(&self, course_id: CourseId) -> Result<bool, ApiError>;
}
