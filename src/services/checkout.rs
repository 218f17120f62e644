use std::sync::Arc;
use tracing::{info, instrument, warn};
use validator::Validate;

use crate::{
    client::BackendClient,
    errors::ServiceError,
    events::{Event, EventSender},
    models::{OrderDraft, PaymentMethod, PaymentSession, ShippingDetails},
    services::cart::CartService,
};

/// Result of submitting an order.
#[derive(Debug, Clone)]
pub enum CheckoutOutcome {
    /// Terminal success: the order exists and needs no online payment.
    /// The UI navigates straight to the confirmation view.
    Confirmed { order_id: String },
    /// A SafePay attempt is open: show `session.redirect_url` and start
    /// polling (see `PaymentWatcher::start`).
    AwaitingPayment { session: PaymentSession },
}

/// Checkout service: turns the cart plus buyer details into a server-side
/// order and routes the payment branch.
#[derive(Clone)]
pub struct CheckoutService {
    client: Arc<BackendClient>,
    cart: Arc<CartService>,
    event_sender: Arc<EventSender>,
}

impl CheckoutService {
    pub fn new(
        client: Arc<BackendClient>,
        cart: Arc<CartService>,
        event_sender: Arc<EventSender>,
    ) -> Self {
        Self {
            client,
            cart,
            event_sender,
        }
    }

    /// Submits the current cart as an order.
    ///
    /// Shipping details are validated locally first; a blank field fails
    /// fast with `ValidationError` and no request is issued. Order-creation
    /// failures are recoverable and leave the cart untouched so the buyer
    /// can resubmit.
    ///
    /// * `COD`: confirms immediately with the returned order id; the cart
    ///   is cleared and no polling ever starts.
    /// * `SafePay`: initiates payment for the created order. A missing
    ///   redirect URL is `PaymentInitiationFailed` — distinct from
    ///   `OrderCreationFailed`, because at that point the order already
    ///   exists server-side. On success the cart is left intact until the
    ///   payment is confirmed.
    #[instrument(skip(self, shipping), fields(method = %payment_method, items = self.cart.len()))]
    pub async fn submit_order(
        &self,
        shipping: ShippingDetails,
        payment_method: PaymentMethod,
    ) -> Result<CheckoutOutcome, ServiceError> {
        shipping.validate()?;

        let draft = OrderDraft {
            shipping,
            items: self.cart.product_ids(),
            payment_method,
        };

        let created = self.client.create_order(&draft).await.map_err(|e| {
            warn!("Order creation failed: {}", e);
            ServiceError::OrderCreationFailed(e.to_string())
        })?;

        let order_id = created.order_id;
        info!("Created order {} ({})", order_id, payment_method);
        self.event_sender
            .send_or_log(Event::OrderCreated {
                order_id: order_id.clone(),
                payment_method,
            })
            .await;

        match payment_method {
            PaymentMethod::Cod => {
                self.cart.clear().await;
                self.event_sender
                    .send_or_log(Event::OrderConfirmed {
                        order_id: order_id.clone(),
                    })
                    .await;
                Ok(CheckoutOutcome::Confirmed { order_id })
            }
            PaymentMethod::SafePay => {
                let initiated = self.client.initiate_payment(&order_id).await.map_err(|e| {
                    warn!("Payment initiation for {} failed: {}", order_id, e);
                    ServiceError::PaymentInitiationFailed(e.to_string())
                })?;

                let redirect_url = match initiated.redirect_url {
                    Some(url) if !url.is_empty() => url,
                    _ => {
                        warn!("No redirect URL returned for order {}", order_id);
                        return Err(ServiceError::PaymentInitiationFailed(format!(
                            "no payment URL returned for order {}",
                            order_id
                        )));
                    }
                };

                self.event_sender
                    .send_or_log(Event::PaymentInitiated {
                        order_id: order_id.clone(),
                    })
                    .await;

                Ok(CheckoutOutcome::AwaitingPayment {
                    session: PaymentSession::new(order_id, redirect_url),
                })
            }
        }
    }
}
