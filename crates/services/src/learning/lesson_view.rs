use std::collections::{BTreeSet, HashSet};
use std::sync::{Arc, LazyLock, Mutex, MutexGuard, PoisonError};

use regex::Regex;

use lwh_core::model::{Course, CourseId, Lesson, LessonId, Resource, ResourceType};

use super::generation::{GenerationToken, RefreshOutcome, RequestGeneration};
use crate::api::{BULK_PAGE_SIZE, CourseApi};
use crate::bookmark_service::BookmarkStore;
use crate::note_service::NoteStore;

const WORDS_PER_MINUTE: usize = 200;
const MINUTES_PER_VIDEO: usize = 5;

static WATCH_PARAM: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[?&]v=([^&]+)").expect("valid watch-url pattern"));
static SHORT_LINK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"youtu\.be/([^?&]+)").expect("valid short-link pattern"));

/// Video id from a YouTube watch URL or `youtu.be` short link.
#[must_use]
pub fn youtube_video_id(url: &str) -> Option<&str> {
    WATCH_PARAM
        .captures(url)
        .or_else(|| SHORT_LINK.captures(url))
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}

/// First video, else first tutorial, else the first resource.
fn select_primary(resources: &[Resource]) -> Option<&Resource> {
    resources
        .iter()
        .find(|r| r.is_type(ResourceType::Video))
        .or_else(|| resources.iter().find(|r| r.is_type(ResourceType::Tutorial)))
        .or_else(|| resources.first())
}

/// Everything the lesson page shows, filled in as sub-loads complete.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LessonView {
    pub lesson: Option<Lesson>,
    pub note: String,
    /// Resources attached to the lesson, ordered by weight.
    pub resources: Vec<Resource>,
    pub primary_resource: Option<Resource>,
    pub video_embed_url: Option<String>,
    pub course: Option<Course>,
    /// The course's lessons in catalog order, for the sidebar.
    pub course_lessons: Vec<Lesson>,
    pub completed_lesson_ids: BTreeSet<LessonId>,
    pub loading: bool,
}

impl LessonView {
    /// `max(1, ceil(words / 200) + 5 per video)` minutes.
    #[must_use]
    pub fn reading_time_minutes(&self) -> usize {
        let words = self
            .lesson
            .as_ref()
            .and_then(|l| l.lesson_description.as_deref())
            .map_or(0, |d| d.split_whitespace().count());
        let videos = self
            .resources
            .iter()
            .filter(|r| r.is_type(ResourceType::Video))
            .count();
        (words.div_ceil(WORDS_PER_MINUTE) + videos * MINUTES_PER_VIDEO).max(1)
    }

    /// Share of the course's lessons marked as visited, unrounded.
    #[must_use]
    pub fn progress_percent(&self) -> f64 {
        let total = self.course_lessons.len();
        if total == 0 {
            return 0.0;
        }
        self.completed_lesson_ids.len() as f64 / total as f64 * 100.0
    }

    #[must_use]
    pub fn current_index(&self) -> Option<usize> {
        let current = self.lesson.as_ref()?.id;
        self.course_lessons.iter().position(|l| l.id == current)
    }

    #[must_use]
    pub fn previous_lesson(&self) -> Option<LessonId> {
        let idx = self.current_index()?;
        idx.checked_sub(1)
            .and_then(|prev| self.course_lessons.get(prev))
            .map(|l| l.id)
    }

    #[must_use]
    pub fn next_lesson(&self) -> Option<LessonId> {
        let idx = self.current_index()?;
        self.course_lessons.get(idx + 1).map(|l| l.id)
    }

    #[must_use]
    pub fn is_lesson_completed(&self, lesson_id: LessonId) -> bool {
        self.completed_lesson_ids.contains(&lesson_id)
    }

    #[must_use]
    pub fn is_bookmarked(&self, bookmarks: &BookmarkStore) -> bool {
        self.lesson
            .as_ref()
            .is_some_and(|l| bookmarks.is_bookmarked(l.id))
    }

    /// Resources other than the primary one.
    pub fn additional_resources(&self) -> impl Iterator<Item = &Resource> {
        let primary = self.primary_resource.as_ref().map(|p| p.id);
        self.resources.iter().filter(move |r| Some(r.id) != primary)
    }

    fn apply_resources(&mut self, lesson_id: LessonId, all: Vec<Resource>) {
        let mut resources: Vec<Resource> = all
            .into_iter()
            .filter(|r| r.belongs_to_lesson(lesson_id))
            .collect();
        resources.sort_by_key(|r| r.weight.unwrap_or(0));

        let primary = select_primary(&resources).cloned();
        self.video_embed_url = primary
            .as_ref()
            .filter(|p| p.is_type(ResourceType::Video))
            .and_then(|p| p.resource_url.as_deref())
            .and_then(youtube_video_id)
            .map(|id| format!("https://www.youtube.com/embed/{id}"));
        self.primary_resource = primary;
        self.resources = resources;
    }
}

/// Loads the lesson page; a newer `open_lesson` discards everything still in
/// flight for the previous one.
pub struct LessonViewer {
    api: Arc<dyn CourseApi>,
    notes: NoteStore,
    generation: RequestGeneration,
    state: Mutex<LessonView>,
}

impl LessonViewer {
    #[must_use]
    pub fn new(api: Arc<dyn CourseApi>, notes: NoteStore) -> Self {
        Self {
            api,
            notes,
            generation: RequestGeneration::new(),
            state: Mutex::new(LessonView::default()),
        }
    }

    #[must_use]
    pub fn view(&self) -> LessonView {
        self.lock().clone()
    }

    /// Open a lesson, optionally within an explicit course.
    ///
    /// Progress is recorded only when `course_hint` is given; otherwise the
    /// lesson's first course supplies sidebar context. Failed sub-loads leave
    /// their part of the view empty.
    pub async fn open_lesson(
        &self,
        lesson_id: LessonId,
        course_hint: Option<CourseId>,
    ) -> RefreshOutcome {
        let token = self.generation.begin();
        self.commit(token, |view| {
            *view = LessonView {
                loading: true,
                ..LessonView::default()
            }
        });

        let lesson = match self.api.find_lesson(lesson_id).await {
            Ok(Some(lesson)) => lesson,
            Ok(None) => {
                tracing::warn!(lesson = %lesson_id, "lesson not found");
                return self.finish(token, |view| view.loading = false);
            }
            Err(err) => {
                tracing::warn!(lesson = %lesson_id, error = %err, "lesson lookup failed");
                return self.finish(token, |view| view.loading = false);
            }
        };
        let course_id = course_hint.or_else(|| lesson.first_course());
        if !self.commit(token, |view| view.lesson = Some(lesson)) {
            return RefreshOutcome::Stale;
        }

        futures::join!(
            self.load_note(token, lesson_id),
            self.load_resources(token, lesson_id),
            self.load_course_context(token, course_id),
            self.record_progress(token, lesson_id, course_hint),
        );

        self.finish(token, |_| {})
    }

    /// Persist the note for the open lesson and mirror it into the view.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Storage` if the note cannot be written.
    pub async fn save_note(&self, text: &str) -> Result<(), crate::error::StoreError> {
        let Some(lesson_id) = self.lock().lesson.as_ref().map(|l| l.id) else {
            return Ok(());
        };
        self.notes.save_note(lesson_id, text).await?;
        let mut view = self.lock();
        if view.lesson.as_ref().is_some_and(|l| l.id == lesson_id) {
            view.note = text.to_string();
        }
        Ok(())
    }

    async fn load_note(&self, token: GenerationToken, lesson_id: LessonId) {
        let note = self.notes.load_note(lesson_id).await;
        self.commit(token, |view| view.note = note);
    }

    async fn load_resources(&self, token: GenerationToken, lesson_id: LessonId) {
        match self.api.query_resources(BULK_PAGE_SIZE).await {
            Ok(all) => {
                self.commit(token, |view| {
                    view.apply_resources(lesson_id, all);
                    view.loading = false;
                });
            }
            Err(err) => {
                tracing::warn!(lesson = %lesson_id, error = %err, "resource listing failed");
                self.commit(token, |view| view.loading = false);
            }
        }
    }

    async fn load_course_context(&self, token: GenerationToken, course_id: Option<CourseId>) {
        let Some(course_id) = course_id else {
            return;
        };
        futures::join!(
            self.load_completed(token, course_id),
            self.load_course(token, course_id),
        );
    }

    async fn load_completed(&self, token: GenerationToken, course_id: CourseId) {
        match self.api.course_progress(course_id).await {
            Ok(records) => {
                self.commit(token, |view| {
                    view.completed_lesson_ids
                        .extend(records.iter().filter_map(|p| p.lesson_id));
                });
            }
            Err(err) => {
                tracing::warn!(course = %course_id, error = %err, "course progress unavailable");
            }
        }
    }

    async fn load_course(&self, token: GenerationToken, course_id: CourseId) {
        let course = match self.api.find_course(course_id).await {
            Ok(course) => course,
            Err(err) => {
                tracing::warn!(course = %course_id, error = %err, "course context unavailable");
                return;
            }
        };
        let lesson_ids: HashSet<LessonId> = course
            .as_ref()
            .map(|c| c.lessons.iter().map(|l| l.id).collect())
            .unwrap_or_default();
        if !self.commit(token, |view| view.course = course) || lesson_ids.is_empty() {
            return;
        }

        match self.api.query_lessons(BULK_PAGE_SIZE).await {
            Ok(all) => {
                let lessons: Vec<Lesson> = all
                    .into_iter()
                    .filter(|l| lesson_ids.contains(&l.id))
                    .collect();
                self.commit(token, |view| view.course_lessons = lessons);
            }
            Err(err) => {
                tracing::warn!(course = %course_id, error = %err, "course lessons unavailable");
            }
        }
    }

    async fn record_progress(
        &self,
        token: GenerationToken,
        lesson_id: LessonId,
        course_hint: Option<CourseId>,
    ) {
        let Some(course_id) = course_hint else {
            return;
        };
        match self.api.mark_progress(lesson_id, course_id).await {
            Ok(Some(record)) => {
                if let Some(marked) = record.lesson_id {
                    self.commit(token, |view| {
                        view.completed_lesson_ids.insert(marked);
                    });
                }
            }
            Ok(None) => {}
            Err(err) => {
                tracing::warn!(lesson = %lesson_id, course = %course_id, error = %err, "progress not recorded");
            }
        }
    }

    /// Apply `update` only if `token` is still the newest load.
    fn commit(&self, token: GenerationToken, update: impl FnOnce(&mut LessonView)) -> bool {
        let mut view = self.lock();
        if !self.generation.is_current(token) {
            return false;
        }
        update(&mut view);
        true
    }

    fn finish(&self, token: GenerationToken, update: impl FnOnce(&mut LessonView)) -> RefreshOutcome {
        if self.commit(token, update) {
            RefreshOutcome::Committed
        } else {
            RefreshOutcome::Stale
        }
    }

    fn lock(&self) -> MutexGuard<'_, LessonView> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
