//! Error types for the cronsync protocol layer.

mod engine;
mod job;
mod store;

pub use engine::*;
pub use job::*;
pub use store::*;
