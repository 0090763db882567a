use serde::{Deserialize, Serialize};

use crate::model::ids::{CourseId, DisciplineId, LessonId, ProgramId, ResourceId};

//
// ─── ENUMERATIONS ──────────────────────────────────────────────────────────────
//

/// Difficulty level advertised for a course.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Level {
    Novice,
    Beginner,
    Intermediate,
    Advanced,
    Professional,
}

/// Kind of material a resource points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ResourceType {
    Video,
    Image,
    Tutorial,
    Page,
    Partial,
    Tool,
}

//
// ─── REFERENCES ────────────────────────────────────────────────────────────────
//

/// Lightweight reference to a lesson embedded in a course payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LessonRef {
    pub id: LessonId,
    #[serde(default)]
    pub lesson_title: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CourseRef {
    pub id: CourseId,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgramRef {
    pub id: ProgramId,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisciplineRef {
    pub id: DisciplineId,
}

//
// ─── ENTITIES ──────────────────────────────────────────────────────────────────
//

/// Course record as returned by the catalog API.
///
/// `course_price` is expressed in whole units of the base currency (USD).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Course {
    pub id: CourseId,
    #[serde(default)]
    pub course_title: Option<String>,
    #[serde(default)]
    pub course_description: Option<String>,
    #[serde(default)]
    pub course_price: Option<u64>,
    #[serde(default)]
    pub course_level: Option<Level>,
    #[serde(default)]
    pub lessons: Vec<LessonRef>,
    #[serde(default)]
    pub programs: Vec<ProgramRef>,
}

impl Course {
    /// Number of lessons associated with the course.
    #[must_use]
    pub fn lesson_count(&self) -> usize {
        self.lessons.len()
    }

    #[must_use]
    pub fn title(&self) -> &str {
        self.course_title.as_deref().unwrap_or_default()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Lesson {
    pub id: LessonId,
    #[serde(default)]
    pub lesson_title: Option<String>,
    #[serde(default)]
    pub lesson_description: Option<String>,
    #[serde(default)]
    pub language: Option<String>,
    #[serde(default)]
    pub courses: Vec<CourseRef>,
}

impl Lesson {
    /// Course the lesson is shown under when no explicit course context is given.
    #[must_use]
    pub fn first_course(&self) -> Option<CourseId> {
        self.courses.first().map(|c| c.id)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Resource {
    pub id: ResourceId,
    #[serde(default)]
    pub resource_name: Option<String>,
    #[serde(default)]
    pub resource_description: Option<String>,
    #[serde(default, rename = "resourceURL")]
    pub resource_url: Option<String>,
    #[serde(default)]
    pub resource_preview_image: Option<String>,
    #[serde(default)]
    pub resource_type: Option<ResourceType>,
    #[serde(default)]
    pub weight: Option<i32>,
    #[serde(default)]
    pub discipline: Option<DisciplineRef>,
    #[serde(default)]
    pub program: Option<ProgramRef>,
    #[serde(default)]
    pub course: Option<CourseRef>,
    #[serde(default)]
    pub lesson: Option<LessonRef>,
}

impl Resource {
    #[must_use]
    pub fn belongs_to_lesson(&self, lesson_id: LessonId) -> bool {
        self.lesson.as_ref().is_some_and(|l| l.id == lesson_id)
    }

    #[must_use]
    pub fn is_type(&self, kind: ResourceType) -> bool {
        self.resource_type == Some(kind)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn course_decodes_with_missing_optional_fields() {
        let course: Course =
            serde_json::from_str(r#"{"id":7,"courseTitle":"Rust","lessons":[{"id":1},{"id":2}]}"#)
                .unwrap();
        assert_eq!(course.id, CourseId::new(7));
        assert_eq!(course.title(), "Rust");
        assert_eq!(course.lesson_count(), 2);
        assert!(course.programs.is_empty());
        assert!(course.course_price.is_none());
    }

    #[test]
    fn resource_decodes_url_and_type() {
        let resource: Resource = serde_json::from_str(
            r#"{"id":3,"resourceURL":"https://youtu.be/abc","resourceType":"VIDEO","lesson":{"id":9}}"#,
        )
        .unwrap();
        assert_eq!(resource.resource_url.as_deref(), Some("https://youtu.be/abc"));
        assert!(resource.is_type(ResourceType::Video));
        assert!(resource.belongs_to_lesson(LessonId::new(9)));
    }
}
