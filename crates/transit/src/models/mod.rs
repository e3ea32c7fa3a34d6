//! Feed data models and types.

pub mod stop_map;
pub mod types;

// Re-exports for convenience
pub use stop_map::StopMap;
pub use types::{Result, Stop, TransitError, Visit};
