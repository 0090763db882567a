#![forbid(unsafe_code)]

pub mod api;
pub mod app_services;
pub mod bookmark_service;
pub mod cart_service;
pub mod celebration_service;
pub mod checkout_service;
pub mod config;
pub mod course_service;
pub mod currency_service;
pub mod error;
pub mod learning;
pub mod note_service;

#[cfg(test)]
mod testing;

pub use lwh_core::Clock;

pub use api::{CourseApi, HttpCourseApi};
pub use app_services::AppServices;
pub use bookmark_service::BookmarkStore;
pub use cart_service::CartStore;
pub use celebration_service::{CelebrationStore, certificate_for};
pub use checkout_service::{CheckoutService, ContactDetails, OrderConfirmation};
pub use config::ClientConfig;
pub use course_service::{CourseEnrollmentService, CoursePage};
pub use currency_service::{CurrencyResolver, ExchangeRateCache, HttpRateSource, RateOrigin, RateSource};
pub use error::{ApiError, AppServicesError, CheckoutError, ConfigError, RateError, StoreError};
pub use learning::{AggregatorSnapshot, LessonView, LessonViewer, ProgressAggregator, RefreshOutcome};
pub use note_service::NoteStore;
