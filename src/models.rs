//! Value types shared across the storefront core: cart contents, shipping
//! details, the order-creation payload, and payment-flow state.
//!
//! Wire-facing types serialize camelCase to match the backend JSON contract.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use validator::Validate;

/// One unit of a product selected for purchase.
///
/// `unit_price` is snapshotted when the buyer adds the listing and is never
/// re-fetched; the backend remains the binding source of truth at checkout
/// (only product ids are submitted).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartItem {
    /// Opaque identifier of the underlying listing, owned by the backend.
    pub product_id: String,
    /// Human-readable model name, presentation only.
    pub display_name: String,
    /// Non-negative amount in the storefront currency.
    pub unit_price: Decimal,
    /// Opaque reference to a representative image, presentation only.
    pub image_ref: String,
}

impl CartItem {
    pub fn new(
        product_id: impl Into<String>,
        display_name: impl Into<String>,
        unit_price: Decimal,
        image_ref: impl Into<String>,
    ) -> Self {
        Self {
            product_id: product_id.into(),
            display_name: display_name.into(),
            unit_price,
            image_ref: image_ref.into(),
        }
    }
}

/// Buyer-supplied destination and contact information.
///
/// All fields are required; validation happens locally before any network
/// call. Serializes to the exact camelCase field names the order-creation
/// endpoint expects.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ShippingDetails {
    #[validate(length(min = 1, message = "name is required"))]
    pub name: String,
    #[validate(length(min = 1, message = "email is required"))]
    pub email: String,
    #[validate(length(min = 1, message = "phone number is required"))]
    pub phone_number: String,
    #[validate(length(min = 1, message = "city is required"))]
    pub city: String,
    #[validate(length(min = 1, message = "area is required"))]
    pub area: String,
    #[validate(length(min = 1, message = "street is required"))]
    pub street: String,
    #[validate(length(min = 1, message = "house number is required"))]
    pub house_number: String,
    #[validate(length(min = 1, message = "nearest landmark is required"))]
    pub nearest_landmark: String,
}

/// Supported payment methods.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PaymentMethod {
    /// Cash on delivery: the order confirms immediately, no online payment.
    #[serde(rename = "COD")]
    Cod,
    /// Redirect-based online payment confirmed asynchronously by polling.
    SafePay,
}

impl std::fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PaymentMethod::Cod => write!(f, "COD"),
            PaymentMethod::SafePay => write!(f, "SafePay"),
        }
    }
}

/// Payload for `POST /order/create`: shipping fields flattened alongside the
/// selected product ids and the chosen payment method.
///
/// Prices are deliberately absent; client-side totals are presentational
/// only and the backend computes the binding price.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderDraft {
    #[serde(flatten)]
    pub shipping: ShippingDetails,
    pub items: Vec<String>,
    pub payment_method: PaymentMethod,
}

/// Status values reported by `GET /payment/status/{orderId}`.
///
/// Unknown values are preserved, not rejected: only an explicit `Paid` ends
/// the polling loop, everything else keeps it running.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PaymentStatus {
    Pending,
    Paid,
    Other(String),
}

impl From<String> for PaymentStatus {
    fn from(raw: String) -> Self {
        match raw.as_str() {
            "Pending" => PaymentStatus::Pending,
            "Paid" => PaymentStatus::Paid,
            _ => PaymentStatus::Other(raw),
        }
    }
}

impl<'de> Deserialize<'de> for PaymentStatus {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        Ok(PaymentStatus::from(String::deserialize(deserializer)?))
    }
}

impl Serialize for PaymentStatus {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        let raw = match self {
            PaymentStatus::Pending => "Pending",
            PaymentStatus::Paid => "Paid",
            PaymentStatus::Other(other) => other.as_str(),
        };
        serializer.serialize_str(raw)
    }
}

/// Transient client-side state for an in-progress SafePay payment.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentSession {
    /// Order awaiting payment, as returned by order creation.
    pub order_id: String,
    /// URL the buyer must complete payment at (embedded payment page).
    pub redirect_url: String,
    pub started_at: DateTime<Utc>,
}

impl PaymentSession {
    pub fn new(order_id: impl Into<String>, redirect_url: impl Into<String>) -> Self {
        Self {
            order_id: order_id.into(),
            redirect_url: redirect_url.into(),
            started_at: Utc::now(),
        }
    }
}

/// A listing as served by `GET /product/{productId}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Product {
    #[serde(rename = "productid")]
    pub product_id: String,
    pub phone_model: String,
    pub price: Decimal,
    #[serde(default)]
    pub image: Option<String>,
}

impl Product {
    /// Snapshot this listing into a cart line.
    pub fn to_cart_item(&self) -> CartItem {
        CartItem {
            product_id: self.product_id.clone(),
            display_name: self.phone_model.clone(),
            unit_price: self.price,
            image_ref: self.image.clone().unwrap_or_default(),
        }
    }
}

/// One line of a placed order, as served by `GET /order/{orderId}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderLine {
    pub product_id: String,
}

/// A per-seller slice of a placed order.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubOrder {
    pub items: Vec<OrderLine>,
    /// Seller-specific fields the receipt view renders; opaque to the core.
    #[serde(flatten)]
    pub extra: serde_json::Value,
}

/// Receipt payload consumed by the order-confirmation view.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderDetail {
    /// Order header including buyer details; opaque to the core.
    pub order: serde_json::Value,
    pub sub_orders: Vec<SubOrder>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn shipping() -> ShippingDetails {
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

    #[test]
    fn test_shipping_details_valid() {
        assert!(shipping().validate().is_ok());
    }

    #[test]
    fn test_shipping_details_blank_field_rejected() {
        let mut details = shipping();
        details.city = String::new();
        assert!(details.validate().is_err());
    }

    #[test]
    fn test_order_draft_wire_shape() {
        let draft = OrderDraft {
            shipping: shipping(),
            items: vec!["p-1".to_string(), "p-2".to_string()],
            payment_method: PaymentMethod::SafePay,
        };

        let json = serde_json::to_value(&draft).expect("serializable");
        // Shipping fields are flattened camelCase alongside items and method.
        assert_eq!(json["phoneNumber"], "03001234567");
        assert_eq!(json["houseNumber"], "12-B");
        assert_eq!(json["nearestLandmark"], "Liberty Market");
        assert_eq!(json["paymentMethod"], "SafePay");
        assert_eq!(json["items"], serde_json::json!(["p-1", "p-2"]));
    }

    #[test]
    fn test_payment_method_wire_names() {
        assert_eq!(
            serde_json::to_string(&PaymentMethod::Cod).expect("serializable"),
            "\"COD\""
        );
        assert_eq!(
            serde_json::to_string(&PaymentMethod::SafePay).expect("serializable"),
            "\"SafePay\""
        );
    }

    #[test]
    fn test_payment_status_unknown_value_preserved() {
        let status: PaymentStatus =
            serde_json::from_str("\"Declined\"").expect("deserializable");
        assert_eq!(status, PaymentStatus::Other("Declined".to_string()));

        let paid: PaymentStatus = serde_json::from_str("\"Paid\"").expect("deserializable");
        assert_eq!(paid, PaymentStatus::Paid);
    }

    #[test]
    fn test_product_to_cart_item_snapshot() {
        let product = Product {
            product_id: "p-9".to_string(),
            phone_model: "Pixel 6".to_string(),
            price: dec!(85000),
            image: None,
        };
        let item = product.to_cart_item();
        assert_eq!(item.product_id, "p-9");
        assert_eq!(item.unit_price, dec!(85000));
        assert_eq!(item.image_ref, "");
    }
}
