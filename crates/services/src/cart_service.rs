use std::sync::Arc;

use lwh_core::Clock;
use lwh_core::model::{CartItem, CourseId};
use storage::keys;
use storage::kv::{KeyValueStore, read_json, write_json};

use crate::error::StoreError;

/// Courses pending purchase, keyed by course id.
///
/// Every mutation persists the full list; state changes only after the write
/// succeeds.
pub struct CartStore {
    clock: Clock,
    kv: Arc<dyn KeyValueStore>,
    items: Vec<CartItem>,
}

impl CartStore {
    /// Read the persisted cart once. Missing or corrupt data loads as empty.
    pub async fn load(kv: Arc<dyn KeyValueStore>, clock: Clock) -> Self {
        let items = match read_json::<Vec<CartItem>>(kv.as_ref(), keys::CART).await {
            Ok(stored) => dedup_by_course(stored.unwrap_or_default()),
            Err(err) => {
                tracing::warn!(key = keys::CART, error = %err, "discarding unreadable cart");
                Vec::new()
            }
        };
        Self { clock, kv, items }
    }

    /// Add a course unless it is already in the cart.
    ///
    /// Returns `false` when the course was already present.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Storage` if the cart cannot be written.
    pub async fn add_to_cart(
        &mut self,
        course_id: CourseId,
        course_title: impl Into<String>,
        course_price: u64,
    ) -> Result<bool, StoreError> {
        if self.is_in_cart(course_id) {
            return Ok(false);
        }
        let mut next = self.items.clone();
        next.push(CartItem::new(
            course_id,
            course_title,
            course_price,
            self.clock.now(),
        ));
        self.commit(next).await?;
        Ok(true)
    }

    /// Remove a course; the list is persisted even when it ends up empty.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Storage` if the cart cannot be written.
    pub async fn remove_from_cart(&mut self, course_id: CourseId) -> Result<(), StoreError> {
        let next: Vec<CartItem> = self
            .items
            .iter()
            .filter(|item| item.course_id != course_id)
            .cloned()
            .collect();
        self.commit(next).await
    }

    /// Empty the cart and delete the stored key.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Storage` if the key cannot be removed.
    pub async fn clear_cart(&mut self) -> Result<(), StoreError> {
        self.kv.remove(keys::CART).await?;
        self.items.clear();
        Ok(())
    }

    #[must_use]
    pub fn is_in_cart(&self, course_id: CourseId) -> bool {
        self.items.iter().any(|item| item.course_id == course_id)
    }

    #[must_use]
    pub fn cart_items(&self) -> &[CartItem] {
        &self.items
    }

    #[must_use]
    pub fn cart_count(&self) -> usize {
        self.items.len()
    }

    /// Sum of line prices in base currency units, saturating at `u64::MAX`.
    #[must_use]
    pub fn cart_total(&self) -> u64 {
        self.items
            .iter()
            .fold(0u64, |total, item| total.saturating_add(item.course_price))
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    async fn commit(&mut self, next: Vec<CartItem>) -> Result<(), StoreError> {
        write_json(self.kv.as_ref(), keys::CART, &next).await?;
        self.items = next;
        Ok(())
    }
}

// First occurrence wins if a hand-edited cart repeats a course.
fn dedup_by_course(items: Vec<CartItem>) -> Vec<CartItem> {
    let mut seen = std::collections::HashSet::new();
    items
        .into_iter()
        .filter(|item| seen.insert(item.course_id))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use lwh_core::time::{fixed_clock, fixed_now};
    use storage::InMemoryKeyValueStore;

    async fn empty_cart() -> (InMemoryKeyValueStore, CartStore) {
        let kv = InMemoryKeyValueStore::new();
        let cart = CartStore::load(Arc::new(kv.clone()), fixed_clock()).await;
        (kv, cart)
    }

    #[tokio::test]
    async fn add_is_idempotent_per_course() {
        let (_kv, mut cart) = empty_cart().await;

        assert!(cart.add_to_cart(CourseId::new(1), "Rust", 50).await.unwrap());
        assert!(!cart.add_to_cart(CourseId::new(1), "Rust again", 75).await.unwrap());

        assert_eq!(cart.cart_count(), 1);
        assert_eq!(cart.cart_items()[0].course_title, "Rust");
        assert_eq!(cart.cart_items()[0].added_at, fixed_now());
    }

    #[tokio::test]
    async fn total_is_recomputed_from_items() {
        let (_kv, mut cart) = empty_cart().await;
        cart.add_to_cart(CourseId::new(1), "A", 30).await.unwrap();
        cart.add_to_cart(CourseId::new(2), "B", 45).await.unwrap();
        assert_eq!(cart.cart_total(), 75);

        cart.remove_from_cart(CourseId::new(1)).await.unwrap();
        assert_eq!(cart.cart_total(), 45);
        assert!(!cart.is_in_cart(CourseId::new(1)));
    }

    #[tokio::test]
    async fn removing_last_item_persists_an_empty_list() {
        let (kv, mut cart) = empty_cart().await;
        cart.add_to_cart(CourseId::new(3), "C", 10).await.unwrap();

        cart.remove_from_cart(CourseId::new(3)).await.unwrap();

        assert_eq!(kv.get(keys::CART).await.unwrap().as_deref(), Some("[]"));
    }

    #[tokio::test]
    async fn clear_removes_the_key_instead_of_writing_empty() {
        let (kv, mut cart) = empty_cart().await;
        cart.add_to_cart(CourseId::new(3), "C", 10).await.unwrap();

        cart.clear_cart().await.unwrap();

        assert!(cart.is_empty());
        assert_eq!(kv.get(keys::CART).await.unwrap(), None);
    }

    #[tokio::test]
    async fn reload_restores_items_in_order() {
        let kv: Arc<dyn KeyValueStore> = Arc::new(InMemoryKeyValueStore::new());
        let mut cart = CartStore::load(Arc::clone(&kv), fixed_clock()).await;
        cart.add_to_cart(CourseId::new(8), "Eight", 80).await.unwrap();
        cart.add_to_cart(CourseId::new(2), "Two", 20).await.unwrap();

        let reloaded = CartStore::load(kv, fixed_clock()).await;
        let ids: Vec<CourseId> = reloaded.cart_items().iter().map(|i| i.course_id).collect();
        assert_eq!(ids, vec![CourseId::new(8), CourseId::new(2)]);
        assert_eq!(reloaded.cart_total(), 100);
    }

    #[tokio::test]
    async fn oversized_stored_prices_saturate_the_total() {
        let kv = InMemoryKeyValueStore::new();
        let items = vec![
            CartItem::new(CourseId::new(1), "A", u64::MAX, fixed_now()),
            CartItem::new(CourseId::new(2), "B", 5, fixed_now()),
        ];
        write_json(&kv, keys::CART, &items).await.unwrap();

        let cart = CartStore::load(Arc::new(kv), fixed_clock()).await;

        assert_eq!(cart.cart_count(), 2);
        assert_eq!(cart.cart_total(), u64::MAX);
    }

    #[tokio::test]
    async fn corrupt_cart_loads_empty() {
        let kv = InMemoryKeyValueStore::new();
        kv.set(keys::CART, r#"[{"courseId":"x"}]"#).await.unwrap();

        let cart = CartStore::load(Arc::new(kv), fixed_clock()).await;
        assert!(cart.is_empty());
    }
}
