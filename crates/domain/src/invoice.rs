//! Invoice activation payloads

use serde::{Deserialize, Serialize};

/// How an activated invoice is collected
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CollectionMethod {
    DirectDebitPayment,
    OneTimePayment,
}

/// Body of `PUT /api/invoices/{id}:activate`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvoiceActivation {
    pub collection_method: CollectionMethod,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_message: Option<String>,
}

impl InvoiceActivation {
    /// Build an activation request; empty messages are dropped.
    #[must_use]
    pub fn new(collection_method: CollectionMethod, custom_message: Option<&str>) -> Self {
        Self {
            collection_method,
            custom_message: custom_message.filter(|m| !m.is_empty()).map(str::to_owned),
        }
    }
}
