//! Payments API seam.

use async_trait::async_trait;
use mockall::automock;
use serde::Deserialize;

use crate::api::{
    client::{StorefrontClient, decode},
    errors::ApiError,
    models::{OrderId, PaymentSession, PaymentSessionId, PaymentStatusReport},
};

#[derive(Debug, Deserialize)]
struct CheckoutSessionResponse {
    checkout_url: String,
    session_id: PaymentSessionId,
}

#[async_trait]
impl PaymentsApi for StorefrontClient {
    async fn create_payment_session(
        &self,
        order_id: OrderId,
        origin: String,
    ) -> Result<PaymentSession, ApiError> {
        let body = serde_json::json!({ "order_id": order_id });

        let response = self
            .authorized(self.http().post(self.url("/payments/checkout")))
            .header("Origin", origin.as_str())
            .json(&body)
            .send()
            .await?;

        let session: CheckoutSessionResponse = decode(response).await?;

        Ok(PaymentSession {
            order_id,
            session_id: session.session_id,
            checkout_url: session.checkout_url,
        })
    }

    async fn payment_status(
        &self,
        session_id: PaymentSessionId,
    ) -> Result<PaymentStatusReport, ApiError> {
        self.get_json(&format!("/payments/status/{session_id}"))
            .await
    }
}

/// Payment operations the checkout flow depends on.
#[automock]
#[async_trait]
pub trait PaymentsApi: Send + Sync {
    /// Open a hosted checkout session for an order.
    ///
    /// `origin` is sent as the `Origin` header; the backend derives the
    /// success and cancel return URLs from it.
    async fn create_payment_session(
        &self,
        order_id: OrderId,
        origin: String,
    ) -> Result<PaymentSession, ApiError>;

    /// One status snapshot for a checkout session. A single request with
    /// no retry; polling cadence belongs to the caller.
    async fn payment_status(
        &self,
        session_id: PaymentSessionId,
    ) -> Result<PaymentStatusReport, ApiError>;
}
