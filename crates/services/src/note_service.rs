use std::sync::Arc;

use lwh_core::model::LessonId;
use storage::keys::note_key;
use storage::kv::KeyValueStore;

use crate::error::StoreError;

/// Free-text notes, one per lesson, stored as raw text.
#[derive(Clone)]
pub struct NoteStore {
    kv: Arc<dyn KeyValueStore>,
}

impl NoteStore {
    #[must_use]
    pub fn new(kv: Arc<dyn KeyValueStore>) -> Self {
        Self { kv }
    }

    /// Stored note for `lesson_id`, or an empty string.
    pub async fn load_note(&self, lesson_id: LessonId) -> String {
        let key = note_key(lesson_id);
        match self.kv.get(&key).await {
            Ok(note) => note.unwrap_or_default(),
            Err(err) => {
                tracing::warn!(%key, error = %err, "note unreadable, showing empty");
                String::new()
            }
        }
    }

    /// # Errors
    ///
    /// Returns `StoreError::Storage` if the note cannot be written.
    pub async fn save_note(&self, lesson_id: LessonId, text: &str) -> Result<(), StoreError> {
        self.kv.set(&note_key(lesson_id), text).await?;
        Ok(())
    }
}
