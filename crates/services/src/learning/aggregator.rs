use std::sync::{Arc, Mutex, PoisonError};

use futures::future::join_all;
use lwh_core::model::{CourseId, Enrollment};
use lwh_core::progress::{DashboardStats, EnrolledCourseProgress};

use super::generation::{RefreshOutcome, RequestGeneration};
use crate::api::CourseApi;

/// Published state of the "my learning" and dashboard views.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AggregatorSnapshot {
    /// Sorted by course id.
    pub courses: Vec<EnrolledCourseProgress>,
    /// Number of enrollments listed, including courses whose lookup failed.
    pub enrolled: usize,
    pub loading: bool,
}

impl AggregatorSnapshot {
    #[must_use]
    pub fn stats(&self) -> DashboardStats {
        DashboardStats::compute(self.enrolled, &self.courses)
    }

    pub fn in_progress(&self) -> impl Iterator<Item = &EnrolledCourseProgress> {
        self.courses.iter().filter(|c| c.is_in_progress())
    }

    pub fn completed(&self) -> impl Iterator<Item = &EnrolledCourseProgress> {
        self.courses.iter().filter(|c| c.is_complete())
    }
}

/// Joins enrollments, course detail and lesson progress into per-course
/// completion.
pub struct ProgressAggregator {
    api: Arc<dyn CourseApi>,
    generation: RequestGeneration,
    state: Mutex<AggregatorSnapshot>,
}

impl ProgressAggregator {
    #[must_use]
    pub fn new(api: Arc<dyn CourseApi>) -> Self {
        Self {
            api,
            generation: RequestGeneration::new(),
            state: Mutex::new(AggregatorSnapshot {
                loading: true,
                ..AggregatorSnapshot::default()
            }),
        }
    }

    /// Reload every enrolled course and publish once all lookups settled.
    ///
    /// Lookups that fail drop their course from the list. A refresh that is
    /// overtaken by a newer one publishes nothing and returns `Stale`.
    pub async fn refresh(&self) -> RefreshOutcome {
        let token = self.generation.begin();
        self.lock().loading = true;

        let enrollments = match self.api.list_enrollments().await {
            Ok(enrollments) => enrollments,
            Err(err) => {
                tracing::warn!(error = %err, "enrollment list failed, showing no courses");
                Vec::new()
            }
        };

        let mut courses: Vec<EnrolledCourseProgress> =
            join_all(enrollments.iter().map(|e| self.load_course(e)))
                .await
                .into_iter()
                .flatten()
                .collect();
        courses.sort_by_key(|c| c.course.id);

        let mut state = self.lock();
        if !self.generation.is_current(token) {
            tracing::debug!("discarding superseded progress refresh");
            return RefreshOutcome::Stale;
        }
        tracing::debug!(
            enrolled = enrollments.len(),
            published = courses.len(),
            "progress refresh committed"
        );
        *state = AggregatorSnapshot {
            courses,
            enrolled: enrollments.len(),
            loading: false,
        };
        RefreshOutcome::Committed
    }

    async fn load_course(&self, enrollment: &Enrollment) -> Option<EnrolledCourseProgress> {
        let course_id: CourseId = enrollment.course_id;
        let (course, progress) = futures::join!(
            self.api.find_course(course_id),
            self.api.course_progress(course_id)
        );

        let course = match course {
            Ok(Some(course)) => course,
            Ok(None) => {
                tracing::warn!(course = %course_id, "enrolled course not found, omitting");
                return None;
            }
            Err(err) => {
                tracing::warn!(course = %course_id, error = %err, "course lookup failed, omitting");
                return None;
            }
        };
        let progress = match progress {
            Ok(records) => records,
            Err(err) => {
                tracing::warn!(course = %course_id, error = %err, "progress lookup failed, omitting");
                return None;
            }
        };
        Some(EnrolledCourseProgress::from_records(course, &progress))
    }

    #[must_use]
    pub fn snapshot(&self) -> AggregatorSnapshot {
        self.lock().clone()
    }

    #[must_use]
    pub fn enrolled_courses(&self) -> Vec<EnrolledCourseProgress> {
        self.lock().courses.clone()
    }

    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.lock().loading
    }

    #[must_use]
    pub fn stats(&self) -> DashboardStats {
        self.lock().stats()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, AggregatorSnapshot> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
