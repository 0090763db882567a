//! Storage key namespace.
//!
//! Every store owns one key or one `<prefix>-<id>` family; keys never overlap.

use lwh_core::model::{CourseId, LessonId};

pub const BOOKMARKS: &str = "lesson-bookmarks";
pub const CART: &str = "lwh_cart";
pub const EXCHANGE_RATES: &str = "lw-exchange-rates";

pub const NOTE_PREFIX: &str = "lesson-notes";
pub const CELEBRATION_PREFIX: &str = "lwh-confetti";

#[must_use]
pub fn note_key(lesson_id: LessonId) -> String {
    format!("{NOTE_PREFIX}-{lesson_id}")
}

#[must_use]
pub fn celebration_key(course_id: CourseId) -> String {
    format!("{CELEBRATION_PREFIX}-{course_id}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prefixed_keys_embed_the_id() {
        assert_eq!(note_key(LessonId::new(12)), "lesson-notes-12");
        assert_eq!(celebration_key(CourseId::new(3)), "lwh-confetti-3");
    }

    #[test]
    fn fixed_keys_do_not_collide_with_prefixes() {
        for fixed in [BOOKMARKS, CART, EXCHANGE_RATES] {
            assert!(!fixed.starts_with(&format!("{NOTE_PREFIX}-")));
            assert!(!fixed.starts_with(&format!("{CELEBRATION_PREFIX}-")));
        }
    }
}
