//! Mock implementations of the transport and token store traits
//!
//! Provides mock objects for testing purposes.

// Allow missing error/panic docs for test mocks - they are designed to be simple
// and errors are clearly indicated by their return types
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use reqwest::StatusCode;
use serde_json::{json, Value};

use crate::auth::{StoreError, TokenRecord, TokenStore};
use crate::http::{HttpRequest, HttpResponse, Transport, TransportError};

type Scripted = Result<HttpResponse, TransportError>;

/// Scripted transport
///
/// Responses are returned in the order they were pushed. Every request is
/// recorded before the optional delay, so a request abandoned by a timeout
/// still counts.
#[derive(Debug, Default)]
pub struct MockTransport {
    responses: Mutex<VecDeque<Scripted>>,
    requests: Mutex<Vec<HttpRequest>>,
    delay: Mutex<Option<Duration>>,
}

impl MockTransport {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_response(&self, response: HttpResponse) {
        self.responses.lock().push_back(Ok(response));
    }

    pub fn push_json(&self, status: StatusCode, body: Value) {
        self.push_response(HttpResponse::json(status, &body));
    }

    pub fn push_text(&self, status: StatusCode, body: &str) {
        self.push_response(HttpResponse::text(status, body));
    }

    /// 2xx token endpoint response.
    pub fn push_token(&self, access_token: &str, refresh_token: &str, expires_in: i64) {
        self.push_json(
            StatusCode::OK,
            json!({
                "access_token": access_token,
                "refresh_token": refresh_token,
                "expires_in": expires_in,
                "token_type": "Bearer",
            }),
        );
    }

    pub fn push_error(&self, error: TransportError) {
        self.responses.lock().push_back(Err(error));
    }

    /// Delay every subsequent response.
    pub fn set_delay(&self, delay: Duration) {
        *self.delay.lock() = Some(delay);
    }

    #[must_use]
    pub fn requests(&self) -> Vec<HttpRequest> {
        self.requests.lock().clone()
    }

    #[must_use]
    pub fn last_request(&self) -> Option<HttpRequest> {
        self.requests.lock().last().cloned()
    }

    #[must_use]
    pub fn call_count(&self) -> usize {
        self.requests.lock().len()
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        self.requests.lock().push(request);

        let delay = *self.delay.lock();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        let next = self.responses.lock().pop_front();
        next.unwrap_or_else(|| Err(TransportError::Network("no scripted response left".into())))
    }
}

/// In-memory token store with failure switches
#[derive(Debug, Default)]
pub struct MemoryTokenStore {
    record: Mutex<Option<TokenRecord>>,
    saves: Mutex<Vec<TokenRecord>>,
    fail_loads: AtomicBool,
    fail_saves: AtomicBool,
    loads: AtomicUsize,
}

impl MemoryTokenStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_record(record: TokenRecord) -> Self {
        let store = Self::default();
        *store.record.lock() = Some(record);
        store
    }

    pub fn set_fail_loads(&self, fail: bool) {
        self.fail_loads.store(fail, Ordering::SeqCst);
    }

    pub fn set_fail_saves(&self, fail: bool) {
        self.fail_saves.store(fail, Ordering::SeqCst);
    }

    /// Every record passed to a successful `save`, oldest first.
    #[must_use]
    pub fn saved(&self) -> Vec<TokenRecord> {
        self.saves.lock().clone()
    }

    #[must_use]
    pub fn last_saved(&self) -> Option<TokenRecord> {
        self.saves.lock().last().cloned()
    }

    #[must_use]
    pub fn current(&self) -> Option<TokenRecord> {
        self.record.lock().clone()
    }

    #[must_use]
    pub fn load_count(&self) -> usize {
        self.loads.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TokenStore for MemoryTokenStore {
    async fn load(&self) -> Result<Option<TokenRecord>, StoreError> {
        self.loads.fetch_add(1, Ordering::SeqCst);
        if self.fail_loads.load(Ordering::SeqCst) {
            return Err(StoreError::Backend("simulated load failure".into()));
        }
        Ok(self.record.lock().clone())
    }

    async fn save(&self, record: &TokenRecord) -> Result<(), StoreError> {
        if self.fail_saves.load(Ordering::SeqCst) {
            return Err(StoreError::Backend("simulated save failure".into()));
        }
        self.saves.lock().push(record.clone());
        *self.record.lock() = Some(record.clone());
        Ok(())
    }
}
