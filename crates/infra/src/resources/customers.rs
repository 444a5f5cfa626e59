//! Customers resource

use std::sync::Arc;

use serde::Serialize;
use serde_json::Value;

use crate::api::{ApiClient, ApiError};

const PATH: &str = "/api/customers";

/// `/api/customers`
#[derive(Debug, Clone)]
pub struct Customers {
    client: Arc<ApiClient>,
}

impl Customers {
    /// Facade over the customers endpoints
    pub fn new(client: Arc<ApiClient>) -> Self {
        Self { client }
    }

    /// `POST /api/customers`
    ///
    /// # Errors
    /// Returns error if the request fails
    pub async fn create<B: Serialize + ?Sized>(&self, body: &B) -> Result<Option<Value>, ApiError> {
        self.client.post(PATH, body).await
    }

    /// `PUT /api/customers`
    ///
    /// # Errors
    /// Returns error if the request fails
    pub async fn update<B: Serialize + ?Sized>(&self, body: &B) -> Result<Option<Value>, ApiError> {
        self.client.put(PATH, body).await
    }

    /// `GET /api/customers`
    ///
    /// # Errors
    /// Returns error if the request fails
    pub async fn list(&self, query: &[(&str, &str)]) -> Result<Option<Value>, ApiError> {
        self.client.get(PATH, query).await
    }

    /// `GET /api/customers`, narrowed by `query` (e.g. `[("id", "cus_123")]`)
    ///
    /// # Errors
    /// Returns error if the request fails
    pub async fn retrieve(&self, query: &[(&str, &str)]) -> Result<Option<Value>, ApiError> {
        self.client.get(PATH, query).await
    }

    /// Customers including their financial details
    ///
    /// # Errors
    /// Returns error if the request fails
    pub async fn list_with_financial_details(&self) -> Result<Option<Value>, ApiError> {
        self.list(&[("includeCustomerFinancialDetails", "true")]).await
    }
}
