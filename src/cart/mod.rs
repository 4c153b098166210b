//! Cart state.

mod models;
mod store;

pub use models::*;
pub use store::*;
