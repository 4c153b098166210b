//! Typed client for the paper portal backend.

mod client;
mod models;

pub use client::{PortalClient, PortalConfig};
pub use models::*;
