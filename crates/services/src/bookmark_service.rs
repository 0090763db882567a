use std::collections::BTreeSet;
use std::sync::Arc;

use lwh_core::model::LessonId;
use storage::keys;
use storage::kv::{KeyValueStore, read_json, write_json};

use crate::error::StoreError;

/// Lessons the learner has bookmarked, mirrored to local storage.
pub struct BookmarkStore {
    kv: Arc<dyn KeyValueStore>,
    ids: BTreeSet<LessonId>,
}

impl BookmarkStore {
    /// Read the persisted set once. A missing or unreadable value yields an
    /// empty set.
    pub async fn load(kv: Arc<dyn KeyValueStore>) -> Self {
        let ids = match read_json::<Vec<LessonId>>(kv.as_ref(), keys::BOOKMARKS).await {
            Ok(stored) => stored.unwrap_or_default().into_iter().collect(),
            Err(err) => {
                tracing::warn!(key = keys::BOOKMARKS, error = %err, "discarding unreadable bookmarks");
                BTreeSet::new()
            }
        };
        Self { kv, ids }
    }

    /// Flip membership of `lesson_id` and persist the whole set.
    ///
    /// Returns whether the lesson is bookmarked afterwards. The in-memory set
    /// only changes once the write has succeeded.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Storage` if the set cannot be written.
    pub async fn toggle(&mut self, lesson_id: LessonId) -> Result<bool, StoreError> {
        let mut next = self.ids.clone();
        let bookmarked = if next.remove(&lesson_id) {
            false
        } else {
            next.insert(lesson_id);
            true
        };
        let ordered: Vec<LessonId> = next.iter().copied().collect();
        write_json(self.kv.as_ref(), keys::BOOKMARKS, &ordered).await?;
        self.ids = next;
        Ok(bookmarked)
    }

    #[must_use]
    pub fn is_bookmarked(&self, lesson_id: LessonId) -> bool {
        self.ids.contains(&lesson_id)
    }

    /// Bookmarked lesson ids in ascending order.
    #[must_use]
    pub fn bookmarked_ids(&self) -> Vec<LessonId> {
        self.ids.iter().copied().collect()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Forget every bookmark and remove the stored key.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Storage` if the key cannot be removed.
    pub async fn clear(&mut self) -> Result<(), StoreError> {
        self.kv.remove(keys::BOOKMARKS).await?;
        self.ids.clear();
        Ok(())
    }
}
