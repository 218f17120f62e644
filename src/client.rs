//! Typed HTTP client for the marketplace backend.
//!
//! Thin wrapper over a shared `reqwest::Client`; one instance serves the
//! whole session. Response shapes mirror the backend JSON contract
//! (camelCase fields, opaque string ids).

use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, instrument};
use url::Url;

use crate::{
    config::AppConfig,
    errors::ServiceError,
    models::{OrderDetail, OrderDraft, PaymentMethod, PaymentStatus, Product},
};

/// Response of `POST /order/create`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrderResponse {
    pub order_id: String,
    /// Echoed for COD confirmations; absent on the SafePay path.
    #[serde(default)]
    pub payment_method: Option<PaymentMethod>,
}

/// Response of `POST /payment/initiate/{orderId}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InitiatePaymentResponse {
    #[serde(default)]
    pub redirect_url: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct PaymentStatusResponse {
    status: PaymentStatus,
}

/// HTTP client for the storefront backend.
#[derive(Debug, Clone)]
pub struct BackendClient {
    client: reqwest::Client,
    base_url: Url,
}

impl BackendClient {
    /// Builds a client from configuration (base URL and request timeout).
    pub fn new(config: &AppConfig) -> Result<Self, ServiceError> {
        Self::with_timeout(&config.backend_url, config.request_timeout())
    }

    pub fn with_timeout(base_url: &str, timeout: Duration) -> Result<Self, ServiceError> {
        let base_url = Url::parse(base_url)
            .map_err(|e| ServiceError::ConfigError(format!("invalid backend URL: {}", e)))?;
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self { client, base_url })
    }

    fn endpoint(&self, segments: &[&str]) -> Result<Url, ServiceError> {
        let mut url = self.base_url.clone();
        {
            let mut path = url.path_segments_mut().map_err(|_| {
                ServiceError::ConfigError("backend URL cannot be a base".to_string())
            })?;
            path.pop_if_empty();
            for segment in segments {
                path.push(segment);
            }
        }
        Ok(url)
    }

    /// Creates an order from the draft. The backend computes the binding
    /// price from the submitted product ids.
    #[instrument(skip(self, draft), fields(items = draft.items.len(), method = %draft.payment_method))]
    pub async fn create_order(
        &self,
        draft: &OrderDraft,
    ) -> Result<CreateOrderResponse, ServiceError> {
        let url = self.endpoint(&["order", "create"])?;
        let response = self.client.post(url).json(draft).send().await?;
        Self::decode(response).await
    }

    /// Asks the payment provider for a redirect URL for the given order.
    #[instrument(skip(self))]
    pub async fn initiate_payment(
        &self,
        order_id: &str,
    ) -> Result<InitiatePaymentResponse, ServiceError> {
        let url = self.endpoint(&["payment", "initiate", order_id])?;
        let response = self.client.post(url).send().await?;
        Self::decode(response).await
    }

    /// Queries the current payment status for an order.
    #[instrument(skip(self))]
    pub async fn payment_status(&self, order_id: &str) -> Result<PaymentStatus, ServiceError> {
        let url = self.endpoint(&["payment", "status", order_id])?;
        let response = self.client.get(url).send().await?;
        let body: PaymentStatusResponse = Self::decode(response).await?;
        debug!("Payment status for {}: {:?}", order_id, body.status);
        Ok(body.status)
    }

    /// Fetches the receipt payload for the order-confirmation view.
    #[instrument(skip(self))]
    pub async fn fetch_order(&self, order_id: &str) -> Result<OrderDetail, ServiceError> {
        let url = self.endpoint(&["order", order_id])?;
        let response = self.client.get(url).send().await?;
        Self::decode(response).await
    }

    /// Fetches a single listing.
    #[instrument(skip(self))]
    pub async fn fetch_product(&self, product_id: &str) -> Result<Product, ServiceError> {
        let url = self.endpoint(&["product", product_id])?;
        let response = self.client.get(url).send().await?;
        Self::decode(response).await
    }

    async fn decode<T: serde::de::DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T, ServiceError> {
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ServiceError::ExternalApiError(format!(
                "backend returned {}: {}",
                status,
                body.chars().take(200).collect::<String>()
            )));
        }
        response
            .json::<T>()
            .await
            .map_err(ServiceError::Transport)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_joins_segments() {
        let client =
            BackendClient::with_timeout("http://localhost:5000/api", Duration::from_secs(5))
                .expect("valid base url");
        let url = client
            .endpoint(&["payment", "status", "o-42"])
            .expect("joinable");
        assert_eq!(url.as_str(), "http://localhost:5000/api/payment/status/o-42");
    }

    #[test]
    fn test_endpoint_tolerates_trailing_slash() {
        let client =
            BackendClient::with_timeout("http://localhost:5000/api/", Duration::from_secs(5))
                .expect("valid base url");
        let url = client.endpoint(&["order", "create"]).expect("joinable");
        assert_eq!(url.as_str(), "http://localhost:5000/api/order/create");
    }

    #[test]
    fn test_invalid_base_url_rejected() {
        let result = BackendClient::with_timeout("not a url", Duration::from_secs(5));
        assert!(matches!(result, Err(ServiceError::ConfigError(_))));
    }

    #[test]
    fn test_create_order_response_without_method() {
        let body = r#"{"orderId": "abc123"}"#;
        let parsed: CreateOrderResponse = serde_json::from_str(body).expect("deserializable");
        assert_eq!(parsed.order_id, "abc123");
        assert!(parsed.payment_method.is_none());
    }
}
