//! Course completion arithmetic shared by the dashboard and "my learning" views.

use serde::Serialize;

use crate::model::{Course, LessonProgress};

/// Rounded completion percentage, `0` when there is nothing to complete.
///
/// Rounds half up, so 1 of 8 lessons is 13 and 3 of 5 is exactly 60.
#[must_use]
pub fn progress_percent(completed: usize, total: usize) -> u32 {
    if total == 0 {
        return 0;
    }
    let completed = completed as u64;
    let total = total as u64;
    let rounded = (200 * completed + total) / (2 * total);
    u32::try_from(rounded).unwrap_or(u32::MAX)
}

/// Per-course completion derived from course detail and progress records.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EnrolledCourseProgress {
    pub course: Course,
    pub lessons_completed: usize,
    pub lessons_total: usize,
    pub progress_percent: u32,
}

impl EnrolledCourseProgress {
    #[must_use]
    pub fn from_records(course: Course, progress: &[LessonProgress]) -> Self {
        let lessons_total = course.lesson_count();
        let lessons_completed = progress.iter().filter(|p| p.is_completed()).count();
        Self {
            course,
            lessons_completed,
            lessons_total,
            progress_percent: progress_percent(lessons_completed, lessons_total),
        }
    }

    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.progress_percent >= 100
    }

    #[must_use]
    pub fn is_in_progress(&self) -> bool {
        self.progress_percent > 0 && self.progress_percent < 100
    }
}

/// Headline numbers for the home dashboard.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub enrolled: usize,
    pub completed_courses: usize,
    pub lessons_done: usize,
    pub overall_percent: u32,
}

impl DashboardStats {
    /// `enrolled` counts enrollments, not published entries, so a dropped
    /// course lookup still shows up in the enrolled total.
    #[must_use]
    pub fn compute(enrolled: usize, courses: &[EnrolledCourseProgress]) -> Self {
        let total_lessons: usize = courses.iter().map(|c| c.lessons_total).sum();
        let lessons_done: usize = courses.iter().map(|c| c.lessons_completed).sum();
        Self {
            enrolled,
            completed_courses: courses.iter().filter(|c| c.is_complete()).count(),
            lessons_done,
            overall_percent: progress_percent(lessons_done, total_lessons),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{CourseId, LessonId, LessonRef, ProgressId};

    fn course(id: u64, lessons: u64) -> Course {
        Course {
            id: CourseId::new(id),
            course_title: Some(format!("Course {id}")),
            course_description: None,
            course_price: None,
            course_level: None,
            lessons: (1..=lessons)
                .map(|l| LessonRef {
                    id: LessonId::new(l),
                    lesson_title: None,
                })
                .collect(),
            programs: Vec::new(),
        }
    }

    fn record(id: u64, completed: Option<bool>) -> LessonProgress {
        LessonProgress {
            id: ProgressId::new(id),
            user_login: None,
            lesson_id: Some(LessonId::new(id)),
            course_id: None,
            started_at: None,
            completed,
        }
    }

    #[test]
    fn percent_is_zero_without_lessons() {
        assert_eq!(progress_percent(0, 0), 0);
        assert_eq!(progress_percent(3, 0), 0);
    }

    #[test]
    fn percent_rounds_to_nearest() {
        assert_eq!(progress_percent(3, 5), 60);
        assert_eq!(progress_percent(1, 3), 33);
        assert_eq!(progress_percent(2, 3), 67);
        assert_eq!(progress_percent(1, 8), 13);
        assert_eq!(progress_percent(5, 5), 100);
    }

    #[test]
    fn from_records_counts_only_completed() {
        let progress = vec![
            record(1, Some(true)),
            record(2, Some(false)),
            record(3, None),
            record(4, Some(true)),
            record(5, Some(true)),
        ];
        let entry = EnrolledCourseProgress::from_records(course(1, 5), &progress);
        assert_eq!(entry.lessons_completed, 3);
        assert_eq!(entry.lessons_total, 5);
        assert_eq!(entry.progress_percent, 60);
        assert!(entry.is_in_progress());
    }

    #[test]
    fn dashboard_stats_sum_across_courses() {
        let done = EnrolledCourseProgress::from_records(
            course(1, 2),
            &[record(1, Some(true)), record(2, Some(true))],
        );
        let half = EnrolledCourseProgress::from_records(course(2, 2), &[record(1, Some(true))]);
        let stats = DashboardStats::compute(3, &[done, half]);
        assert_eq!(stats.enrolled, 3);
        assert_eq!(stats.completed_courses, 1);
        assert_eq!(stats.lessons_done, 3);
        assert_eq!(stats.overall_percent, 75);
    }

    #[test]
    fn dashboard_stats_empty() {
        assert_eq!(DashboardStats::compute(0, &[]), DashboardStats::default());
    }
}
