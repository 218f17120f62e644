use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tracing::warn;

use crate::models::PaymentMethod;

/// Domain events published by the storefront core.
///
/// The UI shell owns the receiving end and reacts to these for rendering
/// (badge counts, confirmation navigation, toasts). Event delivery is
/// best-effort: a closed receiver never fails a service operation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Event {
    // Cart events
    CartItemAdded { product_id: String },
    CartItemRemoved { product_id: String },
    CartCleared,

    // Checkout events
    OrderCreated {
        order_id: String,
        payment_method: PaymentMethod,
    },
    OrderConfirmed { order_id: String },

    // Payment events
    PaymentInitiated { order_id: String },
    PaymentConfirmed { order_id: String },
    PaymentAbandoned { order_id: String },
}

#[derive(Debug, Clone)]
pub struct EventSender {
    sender: mpsc::Sender<Event>,
}

impl EventSender {
    /// Creates a new EventSender
    pub fn new(sender: mpsc::Sender<Event>) -> Self {
        Self { sender }
    }

    /// Sends an event asynchronously
    pub async fn send(&self, event: Event) -> Result<(), String> {
        self.sender
            .send(event)
            .await
            .map_err(|e| format!("Failed to send event: {}", e))
    }

    /// Sends an event, logging instead of failing when the receiver is gone.
    pub async fn send_or_log(&self, event: Event) {
        if let Err(e) = self.send(event).await {
            warn!("Event not delivered: {}", e);
        }
    }
}

/// Convenience constructor wiring a bounded channel for a session.
pub fn channel(buffer: usize) -> (EventSender, mpsc::Receiver<Event>) {
    let (tx, rx) = mpsc::channel(buffer);
    (EventSender::new(tx), rx)
}
