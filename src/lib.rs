//! Headless client engine for a bookstore storefront and a paper portal.
//!
//! Everything a view layer needs short of rendering: session state with
//! role-gated authorization, a shopping cart, typed REST clients for
//! both backends, and a checkout orchestrator that walks an order
//! through submission, hosted payment, and confirmation polling.
//! Rendering, routing, and styling stay with the embedding application.

pub mod api;
pub mod cart;
pub mod checkout;
pub mod context;
pub mod portal;
pub mod session;

mod ids;
