//! Common utility functions
//!
//! This module provides reusable utilities including:
//! - **[`serde`]**: Serialization helpers for timestamps

pub mod serde;

// Re-export commonly used items for convenience
pub use self::serde::iso8601_millis;
