//! RePhone Storefront Core
//!
//! Client-side core of a second-hand phone marketplace storefront: the
//! session-scoped shopping cart, derived pricing, order submission, and the
//! payment-status polling protocol. All real state (inventory, orders,
//! payments) lives in the remote backend this crate talks to over HTTP; the
//! surrounding UI shell handles routing and rendering.
#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]
#![allow(elided_lifetimes_in_paths)]
#![warn(clippy::all, clippy::perf, clippy::dbg_macro)]

// Core modules
pub mod client;
pub mod config;
pub mod errors;
pub mod events;
pub mod models;
pub mod services;

use std::sync::Arc;
use tokio::sync::mpsc;

use crate::{
    client::BackendClient,
    config::AppConfig,
    errors::ServiceError,
    events::{Event, EventSender},
    services::{
        cart::{CartService, DuplicatePolicy},
        checkout::CheckoutService,
        payments::PaymentWatcher,
    },
};

/// Wired session state handed to the UI layer.
///
/// One `AppState` is created when a browsing session starts and dropped
/// when it ends; views receive cloned handles to the services they need
/// instead of reaching for ambient globals.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub event_sender: Arc<EventSender>,
    backend: Arc<BackendClient>,
    cart: Arc<CartService>,
    checkout: Arc<CheckoutService>,
    payments: Arc<PaymentWatcher>,
}

impl AppState {
    /// Wires all services from configuration. Returns the state plus the
    /// receiving end of the session event channel, which the UI shell owns.
    pub fn new(config: AppConfig) -> Result<(Self, mpsc::Receiver<Event>), ServiceError> {
        let (event_sender, event_rx) = events::channel(config.event_buffer);
        let event_sender = Arc::new(event_sender);

        let backend = Arc::new(BackendClient::new(&config)?);

        let policy = if config.allow_duplicate_cart_lines {
            DuplicatePolicy::AllowDuplicateLines
        } else {
            DuplicatePolicy::RejectDuplicate
        };
        let cart = Arc::new(CartService::new(Arc::clone(&event_sender), policy));

        let checkout = Arc::new(CheckoutService::new(
            Arc::clone(&backend),
            Arc::clone(&cart),
            Arc::clone(&event_sender),
        ));

        let payments = Arc::new(PaymentWatcher::new(
            Arc::clone(&backend),
            Arc::clone(&cart),
            Arc::clone(&event_sender),
            config.poll_interval(),
            config.poll_timeout(),
        ));

        let state = Self {
            config: Arc::new(config),
            event_sender,
            backend,
            cart,
            checkout,
            payments,
        };
        Ok((state, event_rx))
    }

    pub fn cart_service(&self) -> Arc<CartService> {
        Arc::clone(&self.cart)
    }

    pub fn checkout_service(&self) -> Arc<CheckoutService> {
        Arc::clone(&self.checkout)
    }

    pub fn payment_watcher(&self) -> Arc<PaymentWatcher> {
        Arc::clone(&self.payments)
    }

    pub fn backend_client(&self) -> Arc<BackendClient> {
        Arc::clone(&self.backend)
    }
}
