//! Orders API seam.

use async_trait::async_trait;
use mockall::automock;

use crate::api::{
    client::StorefrontClient,
    errors::ApiError,
    models::{Order, OrderItemInput},
};

#[async_trait]
impl OrdersApi for StorefrontClient {
    async fn create_order(&self, items: Vec<OrderItemInput>) -> Result<Order, ApiError> {
        let body = serde_json::json!({ "items": items });

        self.post_json("/orders", &body).await
    }

    async fn list_orders(&self) -> Result<Vec<Order>, ApiError> {
        self.get_json("/orders").await
    }
}

/// Order operations the checkout flow depends on.
///
/// A seam rather than a concrete client so the orchestrator can be
/// exercised without a network.
#[automock]
#[async_trait]
pub trait OrdersApi: Send + Sync {
    /// Submit an order for the authenticated customer. Lines carry book
    /// ids and quantities only; the backend resolves current prices.
    async fn create_order(&self, items: Vec<OrderItemInput>) -> Result<Order, ApiError>;

    /// The authenticated customer's own orders, newest first.
    async fn list_orders(&self) -> Result<Vec<Order>, ApiError>;
}
