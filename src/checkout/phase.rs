//! Checkout lifecycle states.

use thiserror::Error;

use crate::api::{OrderId, PaymentSessionId};

/// Discrete states of a checkout attempt.
///
/// One attempt moves strictly forward through these; `Settled` is terminal.
/// A new attempt starts over from `Submitting`, and anything left over from
/// a superseded attempt is cancelled rather than merged.
#[derive(Debug, Clone, PartialEq)]
pub enum CheckoutPhase {
    /// No attempt in flight.
    Idle,

    /// Submitting the order and opening the payment session.
    Submitting,

    /// Order placed and hosted checkout opened; waiting for the shopper
    /// to come back from the payment provider.
    AwaitingPayment {
        order_id: OrderId,
        session_id: PaymentSessionId,
    },

    /// Confirmation polling in progress. `attempt` starts at 1.
    Polling {
        session_id: PaymentSessionId,
        attempt: u32,
    },

    /// Terminal for this attempt.
    Settled(SettleOutcome),
}

impl CheckoutPhase {
    #[must_use]
    pub const fn is_settled(&self) -> bool {
        matches!(self, Self::Settled(_))
    }
}

/// Terminal result of a checkout attempt.
#[derive(Debug, Clone, PartialEq)]
pub enum SettleOutcome {
    /// Payment confirmed and the order marked paid.
    Success,

    /// The attempt ended without a confirmed payment.
    Failure(CheckoutFailure),
}

/// Why a checkout attempt failed.
///
/// The `Submit` and `PaymentSession` variants carry the backend's own
/// message verbatim so the view can show exactly what the server said.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CheckoutFailure {
    #[error("order submission failed: {0}")]
    Submit(String),

    #[error("could not open a payment session: {0}")]
    PaymentSession(String),

    #[error("payment session expired")]
    Expired,

    #[error("payment verification timed out")]
    TimedOut,

    #[error("failed to verify payment")]
    Verification,
}
