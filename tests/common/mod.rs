//! Shared helpers for integration tests: a wired session pointed at a
//! wiremock backend, with short polling intervals so tests run fast.

use std::sync::Arc;
use std::time::Duration;

use rust_decimal::Decimal;
use tokio::sync::mpsc;
use wiremock::MockServer;

use rephone_storefront::client::BackendClient;
use rephone_storefront::events::{self, Event, EventSender};
use rephone_storefront::models::{CartItem, ShippingDetails};
use rephone_storefront::services::cart::{CartService, DuplicatePolicy};
use rephone_storefront::services::checkout::CheckoutService;
use rephone_storefront::services::payments::PaymentWatcher;

/// Poll cadence used by tests instead of the production 5 seconds.
pub const TEST_POLL_INTERVAL: Duration = Duration::from_millis(40);

/// A storefront session wired against a mock backend.
pub struct TestSession {
    cart: Arc<CartService>,
    checkout: Arc<CheckoutService>,
    payments: Arc<PaymentWatcher>,
    #[allow(dead_code)]
    pub event_sender: Arc<EventSender>,
    #[allow(dead_code)]
    pub events: mpsc::Receiver<Event>,
}

impl TestSession {
    pub async fn new(server: &MockServer) -> Self {
        Self::with_poll_timeout(server, None).await
    }

    pub async fn with_poll_timeout(server: &MockServer, timeout: Option<Duration>) -> Self {
        let (sender, events) = events::channel(256);
        let event_sender = Arc::new(sender);

        let backend = Arc::new(
            BackendClient::with_timeout(
                &format!("{}/api", server.uri()),
                Duration::from_secs(5),
            )
            .expect("mock server URL is valid"),
        );

        let cart = Arc::new(CartService::new(
            Arc::clone(&event_sender),
            DuplicatePolicy::RejectDuplicate,
        ));
        let checkout = Arc::new(CheckoutService::new(
            Arc::clone(&backend),
            Arc::clone(&cart),
            Arc::clone(&event_sender),
        ));
        let payments = Arc::new(PaymentWatcher::new(
            backend,
            Arc::clone(&cart),
            Arc::clone(&event_sender),
            TEST_POLL_INTERVAL,
            timeout,
        ));

        Self {
            cart,
            checkout,
            payments,
            event_sender,
            events,
        }
    }

    pub fn cart(&self) -> Arc<CartService> {
        Arc::clone(&self.cart)
    }

    pub fn checkout(&self) -> Arc<CheckoutService> {
        Arc::clone(&self.checkout)
    }

    #[allow(dead_code)]
    pub fn payments(&self) -> Arc<PaymentWatcher> {
        Arc::clone(&self.payments)
    }

    /// Puts the given (product id, price) pairs into the cart.
    pub async fn seed_cart(&self, listings: &[(&str, Decimal)]) {
        for (id, price) in listings {
            self.cart
                .add_item(CartItem::new(
                    *id,
                    format!("Phone {}", id),
                    *price,
                    "img-ref",
                ))
                .await
                .expect("seeding add succeeds");
        }
    }
}

/// A complete, valid shipping form.
pub fn shipping() -> ShippingDetails {
    ShippingDetails {
        name: "Ayesha Khan".to_string(),
        email: "ayesha@example.com".to_string(),
        phone_number: "03001234567".to_string(),
        city: "Lahore".to_string(),
        area: "Gulberg".to_string(),
        street: "Main Boulevard".to_string(),
        house_number: "12-B".to_string(),
        nearest_landmark: "Liberty Market".to_string(),
    }
}
