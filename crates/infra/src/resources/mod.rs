//! Typed resource facades
//!
//! Each facade maps its methods onto fixed paths and verbs of the
//! [`ApiClient`](crate::api::ApiClient) it shares with the others.

pub mod customers;
pub mod direct_debit_mandates;
pub mod invoices;

pub use customers::Customers;
pub use direct_debit_mandates::DirectDebitMandates;
pub use invoices::Invoices;

/// Percent-encode one path segment.
pub(crate) fn segment(id: &str) -> std::borrow::Cow<'_, str> {
    urlencoding::encode(id)
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn segments_are_percent_encoded() {
        assert_eq!(segment("inv_123"), "inv_123");
        assert_eq!(segment("a/b c"), "a%2Fb%20c");
    }
}
