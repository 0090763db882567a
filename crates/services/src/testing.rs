//! In-process `CourseApi` double shared by the unit tests.

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use async_trait::async_trait;
use tokio::sync::Notify;
use lwh_core::model::{
    Account, Course, CourseId, Enrollment, EnrollmentId, Lesson, LessonId, LessonProgress,
    LessonRef, ProgressId, Resource,
};

use crate::api::CourseApi;
use crate::error::ApiError;

#[derive(Default)]
pub(crate) struct FakeCourseApi {
    pub account: Option<Account>,
    /// `None` makes the enrollment listing fail.
    pub enrollments: Option<Vec<Enrollment>>,
    pub courses: HashMap<CourseId, Course>,
    pub progress: HashMap<CourseId, Vec<LessonProgress>>,
    pub lessons: Vec<Lesson>,
    pub resources: Vec<Resource>,
    pub failing_courses: HashSet<CourseId>,
    pub failing_progress: HashSet<CourseId>,
    pub failing_enroll: HashSet<CourseId>,
    pub fail_lessons: bool,
    pub enrolled: Mutex<HashSet<CourseId>>,
    /// `find_lesson` for this id waits on `gate` before answering.
    pub gated_lesson: Option<LessonId>,
    pub gate: Notify,
    calls: Mutex<Vec<String>>,
}

impl FakeCourseApi {
    pub fn new() -> Self {
        Self {
            enrollments: Some(Vec::new()),
            ..Self::default()
        }
    }

    pub fn with_course(mut self, course: Course) -> Self {
        self.courses.insert(course.id, course);
        self
    }

    pub fn with_enrollment(mut self, course_id: u64) -> Self {
        let list = self.enrollments.get_or_insert_with(Vec::new);
        let id = EnrollmentId::new(list.len() as u64 + 1);
        list.push(Enrollment {
            id,
            user_login: Some("learner".into()),
            course_id: CourseId::new(course_id),
            enrolled_at: None,
        });
        self
    }

    pub fn with_progress(mut self, course_id: u64, records: Vec<LessonProgress>) -> Self {
        self.progress.insert(CourseId::new(course_id), records);
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn calls_to(&self, prefix: &str) -> usize {
        self.calls().iter().filter(|c| c.starts_with(prefix)).count()
    }

    fn record(&self, call: String) {
        self.calls.lock().unwrap().push(call);
    }
}

pub(crate) fn course(id: u64, lesson_ids: &[u64]) -> Course {
    Course {
        id: CourseId::new(id),
        course_title: Some(format!("Course {id}")),
        course_description: None,
        course_price: Some(id * 10),
        course_level: None,
        lessons: lesson_ids
            .iter()
            .map(|&l| LessonRef {
                id: LessonId::new(l),
                lesson_title: Some(format!("Lesson {l}")),
            })
            .collect(),
        programs: Vec::new(),
    }
}

pub(crate) fn progress(id: u64, lesson_id: u64, completed: bool) -> LessonProgress {
    LessonProgress {
        id: ProgressId::new(id),
        user_login: Some("learner".into()),
        lesson_id: Some(LessonId::new(lesson_id)),
        course_id: None,
        started_at: None,
        completed: Some(completed),
    }
}

fn unavailable(what: &str) -> ApiError {
    ApiError::Unavailable(what.to_string())
}

#[async_trait]
impl CourseApi for FakeCourseApi {
    async fn current_account(&self) -> Result<Option<Account>, ApiError> {
        self.record("account".into());
        Ok(self.account.clone())
    }

    async fn list_enrollments(&self) -> Result<Vec<Enrollment>, ApiError> {
        self.record("enrollments".into());
        self.enrollments.clone().ok_or_else(|| unavailable("enrollments"))
    }

    async fn find_course(&self, id: CourseId) -> Result<Option<Course>, ApiError> {
        self.record(format!("course:{id}"));
        if self.failing_courses.contains(&id) {
            return Err(unavailable("course"));
        }
        Ok(self.courses.get(&id).cloned())
    }

    async fn find_lesson(&self, id: LessonId) -> Result<Option<Lesson>, ApiError> {
        self.record(format!("lesson:{id}"));
        if self.gated_lesson == Some(id) {
            self.gate.notified().await;
        }
        Ok(self.lessons.iter().find(|l| l.id == id).cloned())
    }

    async fn query_lessons(&self, page_size: u32) -> Result<Vec<Lesson>, ApiError> {
        self.record(format!("lessons?size={page_size}"));
        if self.fail_lessons {
            return Err(unavailable("lessons"));
        }
        Ok(self.lessons.clone())
    }

    async fn query_resources(&self, page_size: u32) -> Result<Vec<Resource>, ApiError> {
        self.record(format!("resources?size={page_size}"));
        Ok(self.resources.clone())
    }

    async fn course_progress(&self, course_id: CourseId) -> Result<Vec<LessonProgress>, ApiError> {
        self.record(format!("progress:{course_id}"));
        if self.failing_progress.contains(&course_id) {
            return Err(unavailable("progress"));
        }
        Ok(self.progress.get(&course_id).cloned().unwrap_or_default())
    }

    async fn mark_progress(
        &self,
        lesson_id: LessonId,
        course_id: CourseId,
    ) -> Result<Option<LessonProgress>, ApiError> {
        self.record(format!("mark:{lesson_id}@{course_id}"));
        Ok(Some(LessonProgress {
            course_id: Some(course_id),
            ..progress(900 + lesson_id.value(), lesson_id.value(), false)
        }))
    }

    async fn enroll(&self, course_id: CourseId) -> Result<Option<Enrollment>, ApiError> {
        self.record(format!("enroll:{course_id}"));
        if self.failing_enroll.contains(&course_id) {
            return Err(unavailable("enroll"));
        }
        self.enrolled.lock().unwrap().insert(course_id);
        Ok(Some(Enrollment {
            id: EnrollmentId::new(course_id.value()),
            user_login: Some("learner".into()),
            course_id,
            enrolled_at: None,
        }))
    }

    async fn unenroll(&self, course_id: CourseId) -> Result<(), ApiError> {
        self.record(format!("unenroll:{course_id}"));
        self.enrolled.lock().unwrap().remove(&course_id);
        Ok(())
    }

    async fn is_enrolled(&self, course_id: CourseId) -> Result<bool, ApiError> {
        self.record(format!("check:{course_id}"));
        Ok(self.enrolled.lock().unwrap().contains(&course_id))
    }
}
