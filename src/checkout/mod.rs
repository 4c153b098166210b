//! Checkout orchestration.

mod errors;
mod orchestrator;
mod phase;

pub use errors::*;
pub use orchestrator::*;
pub use phase::*;
