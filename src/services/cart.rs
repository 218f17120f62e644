use rust_decimal::Decimal;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};
use tracing::{info, instrument};
use uuid::Uuid;

use crate::{
    errors::ServiceError,
    events::{Event, EventSender},
    models::CartItem,
    services::pricing::{self, PriceBreakdown},
};

/// What happens when a product already in the cart is added again.
///
/// The storefront this replaces appended unconditionally, so the same
/// listing could appear as two rows; that behavior is kept available for
/// parity but the default rejects the duplicate, since every listing is a
/// unique second-hand unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DuplicatePolicy {
    /// Reject a second add of the same `product_id` with a conflict.
    #[default]
    RejectDuplicate,
    /// Append unconditionally; duplicate rows permitted.
    AllowDuplicateLines,
}

/// Session-scoped shopping cart.
///
/// The cart is the only mutable state shared between views (product pages
/// add, the cart page removes, checkout reads), so all access goes through
/// one lock: a reader can never observe a half-applied mutation. The lock
/// is never held across an await point. Contents are volatile and die with
/// the session; nothing here touches the network.
#[derive(Clone)]
pub struct CartService {
    session_id: Uuid,
    items: Arc<RwLock<Vec<CartItem>>>,
    event_sender: Arc<EventSender>,
    policy: DuplicatePolicy,
}

impl CartService {
    pub fn new(event_sender: Arc<EventSender>, policy: DuplicatePolicy) -> Self {
        let session_id = Uuid::new_v4();
        info!("Created cart session: {}", session_id);
        Self {
            session_id,
            items: Arc::new(RwLock::new(Vec::new())),
            event_sender,
            policy,
        }
    }

    pub fn session_id(&self) -> Uuid {
        self.session_id
    }

    /// Adds a listing to the cart.
    ///
    /// Rejects a negative `unit_price` outright. Under the default
    /// `RejectDuplicate` policy a repeated `product_id` fails with
    /// `ServiceError::Conflict` and leaves the cart unchanged; under
    /// `AllowDuplicateLines` it appends a second row.
    #[instrument(skip(self, item), fields(session = %self.session_id, product = %item.product_id))]
    pub async fn add_item(&self, item: CartItem) -> Result<(), ServiceError> {
        if item.unit_price < Decimal::ZERO {
            return Err(ServiceError::ValidationError(format!(
                "negative price for product {}",
                item.product_id
            )));
        }

        let product_id = item.product_id.clone();
        {
            let mut items = self.write_items();
            if self.policy == DuplicatePolicy::RejectDuplicate
                && items.iter().any(|existing| existing.product_id == product_id)
            {
                return Err(ServiceError::Conflict(format!(
                    "product {} is already in the cart",
                    product_id
                )));
            }
            items.push(item);
        }

        self.event_sender
            .send_or_log(Event::CartItemAdded {
                product_id: product_id.clone(),
            })
            .await;

        info!("Added product {} to cart {}", product_id, self.session_id);
        Ok(())
    }

    /// Removes every row matching `product_id`. Idempotent: removing an
    /// absent product is not an error and publishes no event.
    #[instrument(skip(self), fields(session = %self.session_id))]
    pub async fn remove_item(&self, product_id: &str) {
        let removed = {
            let mut items = self.write_items();
            let before = items.len();
            items.retain(|item| item.product_id != product_id);
            before - items.len()
        };

        if removed > 0 {
            self.event_sender
                .send_or_log(Event::CartItemRemoved {
                    product_id: product_id.to_string(),
                })
                .await;
            info!(
                "Removed {} row(s) of product {} from cart {}",
                removed, product_id, self.session_id
            );
        }
    }

    /// Read-only snapshot in insertion order.
    pub fn items(&self) -> Vec<CartItem> {
        self.read_items().clone()
    }

    /// Product ids in insertion order, as submitted at checkout.
    pub fn product_ids(&self) -> Vec<String> {
        self.read_items()
            .iter()
            .map(|item| item.product_id.clone())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.read_items().len()
    }

    pub fn is_empty(&self) -> bool {
        self.read_items().is_empty()
    }

    /// Pricing breakdown for the current contents, recomputed on every call.
    pub fn quote(&self) -> PriceBreakdown {
        pricing::quote(&self.read_items())
    }

    /// Empties the cart.
    #[instrument(skip(self), fields(session = %self.session_id))]
    pub async fn clear(&self) {
        let had_items = {
            let mut items = self.write_items();
            let had_items = !items.is_empty();
            items.clear();
            had_items
        };

        if had_items {
            self.event_sender.send_or_log(Event::CartCleared).await;
            info!("Cleared cart {}", self.session_id);
        }
    }

    // A poisoned lock only means a panic mid-mutation elsewhere; the cart
    // data itself is still coherent (Vec ops don't tear), so recover it.
    fn read_items(&self) -> RwLockReadGuard<'_, Vec<CartItem>> {
        self.items.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write_items(&self) -> RwLockWriteGuard<'_, Vec<CartItem>> {
        self.items.write().unwrap_or_else(|e| e.into_inner())
    }
}
