//! Session state, roles, and route authorization.

mod models;
mod roles;
mod store;
mod token;

pub use models::*;
pub use roles::*;
pub use store::*;
pub use token::*;
