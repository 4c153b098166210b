//! Checkout errors.

use thiserror::Error;

use crate::api::ApiError;

/// Errors surfaced directly by checkout entry points.
#[derive(Debug, Error)]
pub enum CheckoutError {
    /// Checkout was started with nothing in the cart. Rejected locally;
    /// no request is made and no state changes.
    #[error("cart is empty")]
    EmptyCart,

    /// A backend call failed. The attempt is settled as a failure with
    /// the same message.
    #[error(transparent)]
    Api(#[from] ApiError),
}
