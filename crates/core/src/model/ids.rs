use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Error type for parsing an ID from a string
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("failed to parse {kind} from string")]
pub struct ParseIdError {
    kind: &'static str,
}

macro_rules! entity_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(u64);

        impl $name {
            #[must_use]
            pub fn new(id: u64) -> Self {
                Self(id)
            }

            /// Returns the underlying u64 value
            #[must_use]
            pub fn value(&self) -> u64 {
                self.0
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, concat!(stringify!($name), "({})"), self.0)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl FromStr for $name {
            type Err = ParseIdError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                s.trim()
                    .parse::<u64>()
                    .map($name::new)
                    .map_err(|_| ParseIdError {
                        kind: stringify!($name),
                    })
            }
        }
    };
}

entity_id!(
    /// Identifier of a course in the catalog
    CourseId
);
entity_id!(
    /// Identifier of a lesson; lessons can belong to several courses
    LessonId
);
entity_id!(
    /// Identifier of a lesson resource (video, tutorial, tool, ...)
    ResourceId
);
entity_id!(
    /// Identifier of a program grouping courses
    ProgramId
);
entity_id!(
    /// Identifier of a discipline grouping programs
    DisciplineId
);
entity_id!(
    /// Identifier of an enrollment record
    EnrollmentId
);
entity_id!(
    /// Identifier of a lesson-progress record
    ProgressId
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn course_id_display_and_parse() {
        let id: CourseId = "123".parse().unwrap();
        assert_eq!(id, CourseId::new(123));
        assert_eq!(id.to_string(), "123");
        assert_eq!(format!("{id:?}"), "CourseId(123)");
    }

    #[test]
    fn lesson_id_rejects_garbage() {
        let err = "abc".parse::<LessonId>().unwrap_err();
        assert_eq!(err.to_string(), "failed to parse LessonId from string");
    }

    #[test]
    fn ids_serialize_as_plain_numbers() {
        let json = serde_json::to_string(&vec![LessonId::new(10), LessonId::new(20)]).unwrap();
        assert_eq!(json, "[10,20]");
        let back: Vec<LessonId> = serde_json::from_str(&json).unwrap();
        assert_eq!(back, vec![LessonId::new(10), LessonId::new(20)]);
    }
}
