//! Integration tests for error classification
//!
//! Exercises the public classification surface the way the dispatcher uses
//! it: raw HTTP status + body in, classified error out.

use adfin_domain::{classify, ClassifiedError, ErrorKind};
use serde_json::json;

/// Newer endpoints report missing fields through `code`, not `type`.
#[test]
fn test_invalid_fields_response() {
    let body = json!({
        "type": "validation",
        "code": "invalid_fields",
        "message": "name is required",
        "param": "name",
    })
    .to_string();

    let classified = ClassifiedError::from_response(400, &body);

    assert_eq!(classified.kind, ErrorKind::InvalidRequest);
    assert_eq!(classified.payload.param.as_deref(), Some("name"));
    assert_eq!(classified.payload.status_code, Some(400));
    assert_eq!(classified.to_string(), "AdfinInvalidRequestError: name is required");
}

/// An expired OAuth grant surfaces as its own kind.
#[test]
fn test_invalid_grant_response() {
    let classified = classify(&json!({ "type": "invalid_grant", "message": "expired" }));
    assert_eq!(classified.kind, ErrorKind::InvalidGrant);
    assert_eq!(classified.kind.name(), "AdfinInvalidGrantError");
}

/// Plain-text bodies (proxies, load balancers) still classify.
#[test]
fn test_plain_text_gateway_error() {
    let classified = ClassifiedError::from_response(502, "Bad Gateway");
    assert_eq!(classified.kind, ErrorKind::Unknown);
    assert_eq!(classified.message(), "Bad Gateway");
    assert_eq!(classified.payload.raw, json!("Bad Gateway"));
}

/// JSON that is not an object is not a payload.
#[test]
fn test_json_array_body_is_unknown() {
    let classified = ClassifiedError::from_response(500, "[1,2,3]");
    assert_eq!(classified.kind, ErrorKind::Unknown);
    assert_eq!(classified.message(), "[1,2,3]");
}
