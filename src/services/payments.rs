//! Payment-status polling for redirect-based (SafePay) payments.
//!
//! Once checkout has a `PaymentSession` (order id + redirect URL), a
//! background task queries the status endpoint on a fixed cadence until it
//! observes `Paid`, the handle is cancelled or dropped, or the optional
//! deadline passes. The phase is published through a watch channel the UI
//! subscribes to for render updates.

use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{interval, Instant, MissedTickBehavior};
use tracing::{debug, info, instrument, warn};

use crate::{
    client::BackendClient,
    events::{Event, EventSender},
    models::{PaymentSession, PaymentStatus},
    services::cart::CartService,
};

/// Lifecycle of one payment attempt.
///
/// `Confirmed` and `Cancelled` are terminal; exactly one of them is ever
/// reached, and no transition happens after it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaymentPhase {
    /// Redirect URL shown, polling active.
    AwaitingPayment,
    /// Status observed as `Paid`; the order-confirmation view can load.
    Confirmed,
    /// Abandoned: explicit cancel, handle dropped, or deadline passed.
    Cancelled,
}

impl PaymentPhase {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, PaymentPhase::AwaitingPayment)
    }
}

/// Factory for payment polling tasks, wired once per session.
#[derive(Clone)]
pub struct PaymentWatcher {
    client: Arc<BackendClient>,
    cart: Arc<CartService>,
    event_sender: Arc<EventSender>,
    poll_interval: Duration,
    poll_timeout: Option<Duration>,
}

impl PaymentWatcher {
    pub fn new(
        client: Arc<BackendClient>,
        cart: Arc<CartService>,
        event_sender: Arc<EventSender>,
        poll_interval: Duration,
        poll_timeout: Option<Duration>,
    ) -> Self {
        Self {
            client,
            cart,
            event_sender,
            poll_interval,
            poll_timeout,
        }
    }

    /// Starts polling for the given session and returns the controlling
    /// handle. The first status query fires one full interval after start,
    /// and queries are strictly serial: a slow response delays the next
    /// tick rather than overlapping it.
    #[instrument(skip(self, session), fields(order_id = %session.order_id))]
    pub fn start(&self, session: PaymentSession) -> PollHandle {
        let (phase_tx, phase_rx) = watch::channel(PaymentPhase::AwaitingPayment);
        let phase_tx = Arc::new(phase_tx);

        let client = Arc::clone(&self.client);
        let cart = Arc::clone(&self.cart);
        let event_sender = Arc::clone(&self.event_sender);
        let tx = Arc::clone(&phase_tx);
        let order_id = session.order_id.clone();
        let poll_interval = self.poll_interval;
        let deadline = self.poll_timeout.map(|timeout| Instant::now() + timeout);

        let task = tokio::spawn(async move {
            let mut ticker = interval(poll_interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            // The zeroth tick resolves immediately; consume it so polling
            // starts one interval after the redirect URL is shown.
            ticker.tick().await;

            loop {
                ticker.tick().await;

                if let Some(deadline) = deadline {
                    if Instant::now() >= deadline {
                        let abandoned = tx.send_if_modified(|phase| {
                            if *phase == PaymentPhase::AwaitingPayment {
                                *phase = PaymentPhase::Cancelled;
                                true
                            } else {
                                false
                            }
                        });
                        if abandoned {
                            warn!("Payment polling for {} timed out", order_id);
                            event_sender
                                .send_or_log(Event::PaymentAbandoned {
                                    order_id: order_id.clone(),
                                })
                                .await;
                        }
                        return;
                    }
                }

                match client.payment_status(&order_id).await {
                    Ok(PaymentStatus::Paid) => {
                        // Clear the cart before flipping the phase so an
                        // observer of `Confirmed` never sees stale contents.
                        info!("Payment confirmed for order {}", order_id);
                        cart.clear().await;
                        event_sender
                            .send_or_log(Event::PaymentConfirmed {
                                order_id: order_id.clone(),
                            })
                            .await;
                        tx.send_if_modified(|phase| {
                            if *phase == PaymentPhase::AwaitingPayment {
                                *phase = PaymentPhase::Confirmed;
                                true
                            } else {
                                false
                            }
                        });
                        return;
                    }
                    Ok(status) => {
                        debug!("Order {} still unpaid: {:?}", order_id, status);
                    }
                    // Transient poll failures never end the loop; only an
                    // explicit Paid does.
                    Err(e) => {
                        warn!("Payment status check for {} failed: {}", order_id, e);
                    }
                }
            }
        });

        PollHandle {
            session,
            task,
            phase_tx,
            phase_rx,
        }
    }
}

/// Controlling handle for an active polling task.
///
/// Dropping the handle aborts the task, so an unmounted checkout view can
/// never leave an orphaned timer or navigate late.
#[derive(Debug)]
pub struct PollHandle {
    session: PaymentSession,
    task: JoinHandle<()>,
    phase_tx: Arc<watch::Sender<PaymentPhase>>,
    phase_rx: watch::Receiver<PaymentPhase>,
}

impl PollHandle {
    pub fn session(&self) -> &PaymentSession {
        &self.session
    }

    pub fn order_id(&self) -> &str {
        &self.session.order_id
    }

    /// Current phase.
    pub fn phase(&self) -> PaymentPhase {
        *self.phase_rx.borrow()
    }

    /// A subscription for the UI to re-render on phase changes.
    pub fn subscribe(&self) -> watch::Receiver<PaymentPhase> {
        self.phase_rx.clone()
    }

    /// Waits until the attempt reaches `Confirmed` or `Cancelled`.
    pub async fn wait_until_terminal(&mut self) -> PaymentPhase {
        loop {
            let phase = *self.phase_rx.borrow_and_update();
            if phase.is_terminal() {
                return phase;
            }
            if self.phase_rx.changed().await.is_err() {
                // Sender gone with the task; whatever was last set stands.
                return *self.phase_rx.borrow();
            }
        }
    }

    /// Stops polling immediately. No further status queries are issued and
    /// no transition other than the one recorded here can occur.
    #[instrument(skip(self), fields(order_id = %self.session.order_id))]
    pub fn cancel(&self) {
        self.task.abort();
        let cancelled = self.phase_tx.send_if_modified(|phase| {
            if *phase == PaymentPhase::AwaitingPayment {
                *phase = PaymentPhase::Cancelled;
                true
            } else {
                false
            }
        });
        if cancelled {
            info!("Payment polling cancelled for order {}", self.session.order_id);
        }
    }
}

impl Drop for PollHandle {
    fn drop(&mut self) {
        self.task.abort();
        self.phase_tx.send_if_modified(|phase| {
            if *phase == PaymentPhase::AwaitingPayment {
                *phase = PaymentPhase::Cancelled;
                true
            } else {
                false
            }
        });
    }
}
