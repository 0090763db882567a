use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use futures::future::join_all;
use lwh_core::model::CourseId;

use crate::api::CourseApi;
use crate::cart_service::CartStore;
use crate::error::CheckoutError;

/// Result of a checkout where every line enrolled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderConfirmation {
    pub courses: Vec<CourseId>,
    pub total: u64,
}

/// Contact fields pre-filled on the checkout form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContactDetails {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
}

/// Turns the cart into enrollments as one batch.
pub struct CheckoutService {
    api: Arc<dyn CourseApi>,
    processing: AtomicBool,
}

// Clears the processing flag on every exit path.
struct ProcessingGuard<'a>(&'a AtomicBool);

impl Drop for ProcessingGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

impl CheckoutService {
    #[must_use]
    pub fn new(api: Arc<dyn CourseApi>) -> Self {
        Self {
            api,
            processing: AtomicBool::new(false),
        }
    }

    /// True while an order is in flight.
    #[must_use]
    pub fn is_processing(&self) -> bool {
        self.processing.load(Ordering::Acquire)
    }

    /// Enroll in every cart line concurrently and wait for all of them.
    ///
    /// The cart is cleared only when every enrollment succeeded. Successful
    /// enrollments are not rolled back when another line fails.
    ///
    /// # Errors
    ///
    /// Returns `CheckoutError::EmptyCart` when there is nothing to order.
    /// Returns `CheckoutError::AlreadyProcessing` if an order is in flight.
    /// Returns `CheckoutError::ProcessingFailed` naming the lines that failed;
    /// the cart is left untouched.
    /// Returns `CheckoutError::Store` if the cart cannot be cleared afterwards.
    pub async fn place_order(
        &self,
        cart: &mut CartStore,
    ) -> Result<OrderConfirmation, CheckoutError> {
        if cart.is_empty() {
            return Err(CheckoutError::EmptyCart);
        }
        if self
            .processing
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return Err(CheckoutError::AlreadyProcessing);
        }
        let _guard = ProcessingGuard(&self.processing);

        let courses: Vec<CourseId> = cart.cart_items().iter().map(|i| i.course_id).collect();
        let total = cart.cart_total();

        let results = join_all(courses.iter().map(|&id| self.api.enroll(id))).await;

        let failed: Vec<CourseId> = courses
            .iter()
            .zip(results)
            .filter_map(|(&id, result)| match result {
                Ok(_) => None,
                Err(err) => {
                    tracing::warn!(course = %id, error = %err, "enrollment failed during checkout");
                    Some(id)
                }
            })
            .collect();

        if !failed.is_empty() {
            return Err(CheckoutError::ProcessingFailed { failed });
        }

        cart.clear_cart().await?;
        tracing::info!(courses = courses.len(), total, "order placed");
        Ok(OrderConfirmation { courses, total })
    }

    /// Name and email of the signed-in account; empty when anonymous or
    /// when the account cannot be fetched.
    pub async fn prefill_contact(&self) -> ContactDetails {
        match self.api.current_account().await {
            Ok(Some(account)) => ContactDetails {
                first_name: account.first_name.unwrap_or_default(),
                last_name: account.last_name.unwrap_or_default(),
                email: account.email.unwrap_or_default(),
            },
            Ok(None) => ContactDetails::default(),
            Err(err) => {
                tracing::warn!(error = %err, "account lookup failed, checkout form left blank");
                ContactDetails::default()
            }
        }
    }
}
