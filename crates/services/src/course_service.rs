use std::collections::HashSet;
use std::sync::Arc;

use lwh_core::model::{Course, CourseId, Lesson, LessonId, Resource};

use crate::api::{BULK_PAGE_SIZE, CourseApi};
use crate::error::ApiError;

/// Course detail page: the course, its lessons and course-level resources.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CoursePage {
    pub course: Option<Course>,
    pub lessons: Vec<Lesson>,
    pub resources: Vec<Resource>,
    pub enrolled: bool,
}

/// Course page loading and single-course enrollment.
#[derive(Clone)]
pub struct CourseEnrollmentService {
    api: Arc<dyn CourseApi>,
}

impl CourseEnrollmentService {
    #[must_use]
    pub fn new(api: Arc<dyn CourseApi>) -> Self {
        Self { api }
    }

    /// Load everything the course page shows. Lesson, resource and enrollment
    /// lookups degrade to empty or `false` on failure.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` if the course itself cannot be fetched.
    pub async fn load_course_page(&self, course_id: CourseId) -> Result<CoursePage, ApiError> {
        let (course, lessons, resources, enrolled) = futures::join!(
            self.api.find_course(course_id),
            self.api.query_lessons(BULK_PAGE_SIZE),
            self.api.query_resources(BULK_PAGE_SIZE),
            self.is_enrolled(course_id),
        );
        let course = course?;

        let lesson_ids: HashSet<LessonId> = course
            .as_ref()
            .map(|c| c.lessons.iter().map(|l| l.id).collect())
            .unwrap_or_default();
        let lessons = match lessons {
            Ok(all) => all.into_iter().filter(|l| lesson_ids.contains(&l.id)).collect(),
            Err(err) => {
                tracing::warn!(course = %course_id, error = %err, "lesson listing failed");
                Vec::new()
            }
        };
        let resources = match resources {
            Ok(all) => all
                .into_iter()
                .filter(|r| r.course.is_some_and(|c| c.id == course_id))
                .collect(),
            Err(err) => {
                tracing::warn!(course = %course_id, error = %err, "resource listing failed");
                Vec::new()
            }
        };

        Ok(CoursePage {
            course,
            lessons,
            resources,
            enrolled,
        })
    }

    /// # Errors
    ///
    /// Returns `ApiError` if the backend rejects the enrollment.
    pub async fn enroll(&self, course_id: CourseId) -> Result<(), ApiError> {
        self.api.enroll(course_id).await?;
        tracing::info!(course = %course_id, "enrolled");
        Ok(())
    }

    /// # Errors
    ///
    /// Returns `ApiError` if the backend rejects the request.
    pub async fn unenroll(&self, course_id: CourseId) -> Result<(), ApiError> {
        self.api.unenroll(course_id).await?;
        tracing::info!(course = %course_id, "unenrolled");
        Ok(())
    }

    /// Whether the current user is enrolled; `false` if the check fails.
    pub async fn is_enrolled(&self, course_id: CourseId) -> bool {
        match self.api.is_enrolled(course_id).await {
            Ok(enrolled) => enrolled,
            Err(err) => {
                tracing::warn!(course = %course_id, error = %err, "enrollment check failed");
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{FakeCourseApi, course};
    use lwh_core::model::{CourseRef, ResourceId};

    fn lesson(id: u64) -> Lesson {
        Lesson {
            id: LessonId::new(id),
            lesson_title: None,
            lesson_description: None,
            language: None,
            courses: Vec::new(),
        }
    }

    fn course_resource(id: u64, course_id: u64) -> Resource {
        Resource {
            id: ResourceId::new(id),
            resource_name: None,
            resource_description: None,
            resource_url: None,
            resource_preview_image: None,
            resource_type: None,
            weight: None,
            discipline: None,
            program: None,
            course: Some(CourseRef {
                id: CourseId::new(course_id),
            }),
            lesson: None,
        }
    }

    #[tokio::test]
    async fn course_page_filters_lessons_and_resources() {
        let mut fake = FakeCourseApi::new().with_course(course(1, &[2, 3]));
        fake.lessons = vec![lesson(1), lesson(2), lesson(3)];
        fake.resources = vec![course_resource(10, 1), course_resource(11, 2)];
        let service = CourseEnrollmentService::new(Arc::new(fake));

        let page = service.load_course_page(CourseId::new(1)).await.unwrap();

        let lessons: Vec<u64> = page.lessons.iter().map(|l| l.id.value()).collect();
        assert_eq!(lessons, vec![2, 3]);
        assert_eq!(page.resources.len(), 1);
        assert!(!page.enrolled);
    }

    #[tokio::test]
    async fn enroll_then_check() {
        let api = Arc::new(FakeCourseApi::new());
        let service = CourseEnrollmentService::new(api.clone());

        assert!(!service.is_enrolled(CourseId::new(4)).await);
        service.enroll(CourseId::new(4)).await.unwrap();
        assert!(service.is_enrolled(CourseId::new(4)).await);

        service.unenroll(CourseId::new(4)).await.unwrap();
        assert!(!service.is_enrolled(CourseId::new(4)).await);
    }

    #[tokio::test]
    async fn failed_enroll_is_surfaced() {
        let mut fake = FakeCourseApi::new();
        fake.failing_enroll.insert(CourseId::new(4));
        let service = CourseEnrollmentService::new(Arc::new(fake));

        assert!(service.enroll(CourseId::new(4)).await.is_err());
        assert!(!service.is_enrolled(CourseId::new(4)).await);
    }
}
