mod cart;
mod course;
mod ids;
mod learner;

pub use ids::{
    CourseId, DisciplineId, EnrollmentId, LessonId, ParseIdError, ProgramId, ProgressId,
    ResourceId,
};

pub use cart::CartItem;
pub use course::{
    Course, CourseRef, DisciplineRef, Lesson, LessonRef, Level, ProgramRef, Resource,
    ResourceType,
};
pub use learner::{Account, Enrollment, LessonProgress};
