//! Typed client for the storefront backend.

mod client;
mod errors;
mod models;
mod orders;
mod payments;

pub(crate) use client::decode;
pub use client::{StorefrontClient, StorefrontConfig};
pub use errors::*;
pub use models::*;
pub use orders::*;
pub use payments::*;
