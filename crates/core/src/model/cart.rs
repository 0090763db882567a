use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::model::ids::CourseId;

/// Pending purchase held in the cart.
///
/// Serialized in camelCase so persisted carts stay readable by the web client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartItem {
    pub course_id: CourseId,
    pub course_title: String,
    pub course_price: u64,
    pub added_at: DateTime<Utc>,
}

impl CartItem {
    #[must_use]
    pub fn new(
        course_id: CourseId,
        course_title: impl Into<String>,
        course_price: u64,
        added_at: DateTime<Utc>,
    ) -> Self {
        Self {
            course_id,
            course_title: course_title.into(),
            course_price,
            added_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::fixed_now;

    #[test]
    fn cart_item_uses_web_field_names() {
        let item = CartItem::new(CourseId::new(1), "Test Course", 29, fixed_now());
        let json = serde_json::to_value(&item).unwrap();
        assert_eq!(json["courseId"], 1);
        assert_eq!(json["courseTitle"], "Test Course");
        assert_eq!(json["coursePrice"], 29);
        assert_eq!(json["addedAt"], "2023-11-14T22:13:20Z");
    }
}
