//! Invoices resource

use std::sync::Arc;

use adfin_domain::{CollectionMethod, InvoiceActivation};
use serde::Serialize;
use serde_json::Value;
use tracing::info;

use super::segment;
use crate::api::{ApiClient, ApiError};

const PATH: &str = "/api/invoices";

/// `/api/invoices`
#[derive(Debug, Clone)]
pub struct Invoices {
    client: Arc<ApiClient>,
}

impl Invoices {
    /// Facade over the invoices endpoints
    pub fn new(client: Arc<ApiClient>) -> Self {
        Self { client }
    }

    /// `POST /api/invoices`
    ///
    /// # Errors
    /// Returns error if the request fails
    pub async fn create<B: Serialize + ?Sized>(&self, body: &B) -> Result<Option<Value>, ApiError> {
        self.client.post(PATH, body).await
    }

    /// `GET /api/invoices/{id}`
    ///
    /// # Errors
    /// Returns error if the request fails
    pub async fn retrieve(&self, invoice_id: &str) -> Result<Option<Value>, ApiError> {
        self.client.get(&format!("{PATH}/{}", segment(invoice_id)), &[]).await
    }

    /// `GET /api/invoices` with filter parameters
    ///
    /// # Errors
    /// Returns error if the request fails
    pub async fn get_invoices_by_filter(
        &self,
        query: &[(&str, &str)],
    ) -> Result<Option<Value>, ApiError> {
        self.client.get(PATH, query).await
    }

    /// Activate an invoice for direct debit collection
    ///
    /// # Errors
    /// Returns error if the request fails
    pub async fn activate_direct_debit_payment(
        &self,
        invoice_id: &str,
        custom_message: Option<&str>,
    ) -> Result<Option<Value>, ApiError> {
        self.activate(invoice_id, CollectionMethod::DirectDebitPayment, custom_message).await
    }

    /// Activate an invoice for a one-time payment
    ///
    /// # Errors
    /// Returns error if the request fails
    pub async fn activate_one_time_payment(
        &self,
        invoice_id: &str,
        custom_message: Option<&str>,
    ) -> Result<Option<Value>, ApiError> {
        self.activate(invoice_id, CollectionMethod::OneTimePayment, custom_message).await
    }

    async fn activate(
        &self,
        invoice_id: &str,
        method: CollectionMethod,
        custom_message: Option<&str>,
    ) -> Result<Option<Value>, ApiError> {
        let body = InvoiceActivation::new(method, custom_message);
        let result =
            self.client.put(&format!("{PATH}/{}:activate", segment(invoice_id)), &body).await?;
        info!(invoice_id, collection_method = ?method, "invoice activated");
        Ok(result)
    }
}
