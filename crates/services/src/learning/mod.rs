//! Learner-facing views that join remote course data.

mod aggregator;
mod generation;
mod lesson_view;

pub use aggregator::{AggregatorSnapshot, ProgressAggregator};
pub use generation::{GenerationToken, RefreshOutcome, RequestGeneration};
pub use lesson_view::{LessonView, LessonViewer, youtube_video_id};
