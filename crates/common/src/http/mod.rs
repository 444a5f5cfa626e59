//! HTTP transport capability
//!
//! Everything the client sends over the network goes through the
//! [`Transport`] trait so the network layer can be swapped out: the default
//! [`ReqwestTransport`], a caller-supplied async function via
//! [`FnTransport`], or a scripted mock in tests.
//!
//! Transports do not apply timeouts or retries. Callers wrap each send in
//! their own deadline.

pub mod client;
pub mod transport;

pub use client::{ReqwestTransport, ReqwestTransportBuilder};
pub use transport::{FnTransport, HttpRequest, HttpResponse, Transport, TransportError};
