use std::sync::Arc;

use reqwest::Client;
use storage::Storage;

use crate::Clock;
use crate::api::{CourseApi, HttpCourseApi};
use crate::bookmark_service::BookmarkStore;
use crate::cart_service::CartStore;
use crate::celebration_service::CelebrationStore;
use crate::checkout_service::CheckoutService;
use crate::config::ClientConfig;
use crate::course_service::CourseEnrollmentService;
use crate::currency_service::{CurrencyResolver, HttpRateSource, RateSource};
use crate::error::AppServicesError;
use crate::learning::{LessonViewer, ProgressAggregator};
use crate::note_service::NoteStore;

/// Assembles client-facing stores and services over shared storage and API.
#[derive(Clone)]
pub struct AppServices {
    clock: Clock,
    locale: String,
    storage: Storage,
    api: Arc<dyn CourseApi>,
    rates: Arc<dyn RateSource>,
    checkout: Arc<CheckoutService>,
    aggregator: Arc<ProgressAggregator>,
    lesson_viewer: Arc<LessonViewer>,
    courses: Arc<CourseEnrollmentService>,
}

impl AppServices {
    /// Build services backed by `SQLite` local storage and the HTTP backend.
    ///
    /// # Errors
    ///
    /// Returns `AppServicesError` if storage initialization, the HTTP client
    /// or endpoint derivation fails.
    pub async fn new_sqlite(config: &ClientConfig, clock: Clock) -> Result<Self, AppServicesError> {
        let storage = Storage::sqlite(&config.db_url).await?;
        let client = Client::builder().build()?;
        let api: Arc<dyn CourseApi> = Arc::new(HttpCourseApi::new(client.clone(), config)?);
        let rates: Arc<dyn RateSource> =
            Arc::new(HttpRateSource::new(client, config.rates_url.clone()));
        Ok(Self::from_parts(clock, config.locale.clone(), storage, api, rates))
    }

    /// Wire services from already-built collaborators.
    #[must_use]
    pub fn from_parts(
        clock: Clock,
        locale: String,
        storage: Storage,
        api: Arc<dyn CourseApi>,
        rates: Arc<dyn RateSource>,
    ) -> Self {
        let notes = NoteStore::new(Arc::clone(&storage.local));
        Self {
            clock,
            locale,
            checkout: Arc::new(CheckoutService::new(Arc::clone(&api))),
            aggregator: Arc::new(ProgressAggregator::new(Arc::clone(&api))),
            lesson_viewer: Arc::new(LessonViewer::new(Arc::clone(&api), notes)),
            courses: Arc::new(CourseEnrollmentService::new(Arc::clone(&api))),
            storage,
            api,
            rates,
        }
    }

    #[must_use]
    pub fn clock(&self) -> Clock {
        self.clock
    }

    #[must_use]
    pub fn api(&self) -> Arc<dyn CourseApi> {
        Arc::clone(&self.api)
    }

    pub async fn bookmarks(&self) -> BookmarkStore {
        BookmarkStore::load(Arc::clone(&self.storage.local)).await
    }

    pub async fn cart(&self) -> CartStore {
        CartStore::load(Arc::clone(&self.storage.local), self.clock).await
    }

    #[must_use]
    pub fn notes(&self) -> NoteStore {
        NoteStore::new(Arc::clone(&self.storage.local))
    }

    #[must_use]
    pub fn celebrations(&self) -> CelebrationStore {
        CelebrationStore::new(Arc::clone(&self.storage.session))
    }

    /// Resolver for the configured locale with rates already settled.
    pub async fn currency(&self) -> CurrencyResolver {
        let mut resolver = CurrencyResolver::new(self.locale.clone());
        resolver
            .load_rates(self.clock, self.storage.local.as_ref(), self.rates.as_ref())
            .await;
        resolver
    }

    #[must_use]
    pub fn checkout(&self) -> Arc<CheckoutService> {
        Arc::clone(&self.checkout)
    }

    #[must_use]
    pub fn aggregator(&self) -> Arc<ProgressAggregator> {
        Arc::clone(&self.aggregator)
    }

    #[must_use]
    pub fn lesson_viewer(&self) -> Arc<LessonViewer> {
        Arc::clone(&self.lesson_viewer)
    }

    #[must_use]
    pub fn courses(&self) -> Arc<CourseEnrollmentService> {
        Arc::clone(&self.courses)
    }
}
