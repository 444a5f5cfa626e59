//! Direct debit mandates resource

use std::sync::Arc;

use serde::Serialize;
use serde_json::Value;

use super::segment;
use crate::api::{ApiClient, ApiError};

/// Direct debit mandates of a customer
#[derive(Debug, Clone)]
pub struct DirectDebitMandates {
    client: Arc<ApiClient>,
}

impl DirectDebitMandates {
    /// Facade over the direct debit mandates endpoints
    pub fn new(client: Arc<ApiClient>) -> Self {
        Self { client }
    }

    /// `PUT /api/customers/{customer_id}/directdebitmandates`
    ///
    /// # Errors
    /// Returns error if the request fails
    pub async fn create<B: Serialize + ?Sized>(
        &self,
        customer_id: &str,
        body: &B,
    ) -> Result<Option<Value>, ApiError> {
        let path = format!("/api/customers/{}/directdebitmandates", segment(customer_id));
        self.client.put(&path, body).await
    }

    /// `GET /api/customers/directdebitmandates/{mandate_id}`
    ///
    /// # Errors
    /// Returns error if the request fails
    pub async fn retrieve(&self, mandate_id: &str) -> Result<Option<Value>, ApiError> {
        let path = format!("/api/customers/directdebitmandates/{}", segment(mandate_id));
        self.client.get(&path, &[]).await
    }
}

#[cfg(test)]
mod tests {
    use adfin_common::testing::MockTransport;
    use reqwest::{Method, StatusCode};
    use serde_json::json;

    use super::*;
    use crate::resources::test_support::api_client;

    #[tokio::test]
    async fn create_puts_under_customer() {
        let transport = Arc::new(MockTransport::new());
        transport.push_json(StatusCode::OK, json!({ "id": "ddm_1" }));
        let mandates = DirectDebitMandates::new(api_client(&transport));

        let created = mandates.create("cus_1", &json!({})).await.unwrap();
        assert_eq!(created, Some(json!({ "id": "ddm_1" })));

        let request = transport.last_request().unwrap();
        assert_eq!(request.method, Method::PUT);
        assert_eq!(request.url, "https://example.com/api/customers/cus_1/directdebitmandates");
        assert_eq!(request.body_text().as_deref(), Some("{}"));
    }

    #[tokio::test]
    async fn retrieve_gets_by_mandate_id() {
        let transport = Arc::new(MockTransport::new());
        transport.push_json(StatusCode::OK, json!({ "id": "ddm_1" }));
        let mandates = DirectDebitMandates::new(api_client(&transport));

        mandates.retrieve("ddm_1").await.unwrap();

        let request = transport.last_request().unwrap();
        assert_eq!(request.method, Method::GET);
        assert_eq!(request.url, "https://example.com/api/customers/directdebitmandates/ddm_1");
        assert!(request.body.is_none());
    }
}
