//! Storefront wire models.

use std::fmt;

use jiff::Timestamp;
use serde::{Deserialize, Serialize};

use crate::{
    api::errors::InvalidBookData,
    session::{AccessToken, Role, Session, UserId},
    ids::TypedUuid,
};

/// Book UUID
pub type BookId = TypedUuid<Book>;

/// Order UUID
pub type OrderId = TypedUuid<Order>;

/// A catalog entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Book {
    pub id: BookId,
    pub title: String,
    pub author: String,
    pub price: f64,
    pub description: String,
    pub cover_image_url: String,
    pub stock_quantity: i64,
    pub category: String,
    pub created_at: Timestamp,
}

/// Payload for adding a book to the catalog.
#[derive(Debug, Clone, Serialize)]
pub struct NewBook {
    pub title: String,
    pub author: String,
    pub price: f64,
    pub description: String,
    pub cover_image_url: String,
    pub stock_quantity: i64,
    pub category: String,
}

impl NewBook {
    /// Bounds-check the numeric fields before submission.
    ///
    /// The backend stores whatever it is sent, so the client refuses
    /// obviously broken values itself.
    ///
    /// # Errors
    ///
    /// Returns an error for a non-finite or negative price, or a negative
    /// stock quantity.
    pub fn validate(&self) -> Result<(), InvalidBookData> {
        validate_book_numbers(Some(self.price), Some(self.stock_quantity))
    }
}

/// Partial update for an existing book. Unset fields are left untouched.
#[derive(Debug, Clone, Default, Serialize)]
pub struct BookUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub cover_image_url: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub stock_quantity: Option<i64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
}

impl BookUpdate {
    /// Bounds-check whichever numeric fields are present.
    ///
    /// # Errors
    ///
    /// Returns an error for a non-finite or negative price, or a negative
    /// stock quantity.
    pub fn validate(&self) -> Result<(), InvalidBookData> {
        validate_book_numbers(self.price, self.stock_quantity)
    }
}

fn validate_book_numbers(price: Option<f64>, stock: Option<i64>) -> Result<(), InvalidBookData> {
    if let Some(price) = price {
        if !price.is_finite() || price < 0.0 {
            return Err(InvalidBookData::Price);
        }
    }

    if let Some(stock) = stock {
        if stock < 0 {
            return Err(InvalidBookData::NegativeStock);
        }
    }

    Ok(())
}

/// Response from the customer register and login endpoints.
#[derive(Debug, Clone, Deserialize)]
pub struct CustomerAuth {
    pub access_token: AccessToken,
    pub token_type: String,
    pub user_id: UserId,
}

impl CustomerAuth {
    /// The session this login establishes.
    #[must_use]
    pub fn into_session(self) -> Session {
        Session {
            token: self.access_token,
            user_id: self.user_id,
            role: Role::Customer,
        }
    }
}

/// Response from the admin login endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct AdminAuth {
    pub access_token: AccessToken,
    pub token_type: String,
    pub is_admin: bool,
}

impl AdminAuth {
    /// The session this login establishes.
    ///
    /// The backend has a single administrator account and issues the
    /// literal subject `admin` for it instead of a user record.
    #[must_use]
    pub fn into_session(self) -> Session {
        Session {
            token: self.access_token,
            user_id: UserId::new("admin"),
            role: Role::Admin,
        }
    }
}

/// Order lifecycle as reported by the backend.
///
/// Transitions are observed, never assumed: the client re-reads the order
/// rather than advancing the status optimistically.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    Pending,
    Paid,
    Completed,
    Shipped,
    Delivered,
}

/// A priced line inside a placed order.
///
/// Prices here come from the backend's own catalog lookup at submission
/// time, not from the client's cart.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderLine {
    pub book_id: BookId,
    pub title: String,
    pub author: String,
    pub price: f64,
    pub quantity: u32,
    pub total: f64,
}

/// A placed order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    pub user_id: UserId,
    pub items: Vec<OrderLine>,
    pub total_amount: f64,
    pub status: OrderStatus,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stripe_session_id: Option<PaymentSessionId>,

    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// One line of an order submission: id and quantity only, so the backend
/// resolves prices from its own catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderItemInput {
    pub book_id: BookId,
    pub quantity: u32,
}

/// Provider-issued checkout session identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PaymentSessionId(String);

impl PaymentSessionId {
    #[must_use]
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PaymentSessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for PaymentSessionId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// Hosted checkout session for the shopper to be redirected to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentSession {
    pub order_id: OrderId,
    pub session_id: PaymentSessionId,
    pub checkout_url: String,
}

/// Snapshot returned by the payment status endpoint.
///
/// `status` describes the checkout session, `payment_status` the payment
/// itself. Both are passed through as the provider reports them.
#[derive(Debug, Clone, Deserialize)]
pub struct PaymentStatusReport {
    pub status: String,
    pub payment_status: String,
    pub amount_total: f64,
    pub currency: String,
}

/// What a status snapshot means for reconciliation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaymentVerdict {
    Paid,
    Expired,
    Pending,
}

impl PaymentStatusReport {
    /// Classify the snapshot. A settled payment wins over an expired
    /// session; anything unrecognized counts as still pending.
    #[must_use]
    pub fn verdict(&self) -> PaymentVerdict {
        if self.payment_status == "paid" {
            PaymentVerdict::Paid
        } else if self.status == "expired" {
            PaymentVerdict::Expired
        } else {
            PaymentVerdict::Pending
        }
    }
}
