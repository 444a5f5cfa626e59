//! Testing utilities and helpers
//!
//! - **[`mocks`]**: scripted [`Transport`](crate::http::Transport) and
//!   in-memory [`TokenStore`](crate::auth::TokenStore)
//!
//! Enabled for this crate's own tests and, through the `test-utils`
//! feature, for downstream crates.

pub mod mocks;

pub use mocks::{MemoryTokenStore, MockTransport};
