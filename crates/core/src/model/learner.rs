use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::model::ids::{CourseId, EnrollmentId, LessonId, ProgressId};

/// The signed-in user, as returned by the account endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Account {
    pub login: String,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
}

impl Account {
    /// Name printed on certificates: "First Last", falling back to the login.
    #[must_use]
    pub fn display_name(&self) -> String {
        let parts: Vec<&str> = [self.first_name.as_deref(), self.last_name.as_deref()]
            .into_iter()
            .flatten()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .collect();
        if parts.is_empty() {
            self.login.clone()
        } else {
            parts.join(" ")
        }
    }
}

/// A user's registration in a course.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Enrollment {
    pub id: EnrollmentId,
    #[serde(default)]
    pub user_login: Option<String>,
    pub course_id: CourseId,
    #[serde(default)]
    pub enrolled_at: Option<DateTime<Utc>>,
}

/// Marker that a lesson was visited (and possibly completed) within a course.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LessonProgress {
    pub id: ProgressId,
    #[serde(default)]
    pub user_login: Option<String>,
    #[serde(default)]
    pub lesson_id: Option<LessonId>,
    #[serde(default)]
    pub course_id: Option<CourseId>,
    #[serde(default)]
    pub started_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub completed: Option<bool>,
}

impl LessonProgress {
    #[must_use]
    pub fn is_completed(&self) -> bool {
        self.completed == Some(true)
    }
}
