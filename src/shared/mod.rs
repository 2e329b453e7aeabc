/// Shared utilities and common types used across all layers.
pub mod result;

pub use result::Result;
