use std::sync::Arc;

use chrono::NaiveDate;
use lwh_core::certificate::Certificate;
use lwh_core::model::{Account, CourseId};
use lwh_core::progress::EnrolledCourseProgress;
use storage::keys::celebration_key;
use storage::kv::KeyValueStore;

/// Session-scoped "already celebrated" markers for completed courses.
#[derive(Clone)]
pub struct CelebrationStore {
    session: Arc<dyn KeyValueStore>,
}

impl CelebrationStore {
    #[must_use]
    pub fn new(session: Arc<dyn KeyValueStore>) -> Self {
        Self { session }
    }

    /// True the first time a course is seen at 100% in this session.
    ///
    /// Storage failures suppress the celebration rather than repeat it.
    pub async fn should_celebrate(&self, course_id: CourseId, percent: u32) -> bool {
        if percent < 100 {
            return false;
        }
        let key = celebration_key(course_id);
        match self.session.get(&key).await {
            Ok(Some(_)) => false,
            Ok(None) => match self.session.set(&key, "1").await {
                Ok(()) => true,
                Err(err) => {
                    tracing::warn!(%key, error = %err, "celebration marker not stored");
                    false
                }
            },
            Err(err) => {
                tracing::warn!(%key, error = %err, "celebration marker unreadable");
                false
            }
        }
    }
}

/// Certificate for a finished course, `None` until every lesson is done.
#[must_use]
pub fn certificate_for(
    progress: &EnrolledCourseProgress,
    account: &Account,
    completed_on: NaiveDate,
) -> Option<Certificate> {
    progress.is_complete().then(|| {
        Certificate::issue(progress.course.title(), &account.display_name(), completed_on)
    })
}
