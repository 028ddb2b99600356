//! Integration tests for the shared error taxonomy
//!
//! Exercises the status-code classification contract and the
//! `ErrorClassification` trait from the perspective of a downstream crate.

#![cfg(feature = "foundation")]

use lutem_common::error::{
    ClassifiedError, ErrorClass, ErrorClassification, ErrorSeverity, STATUS_NETWORK_ERROR,
};
use thiserror::Error;

/// Application-level error as a downstream crate would define it.
#[derive(Debug, Error)]
enum PipelineError {
    #[error(transparent)]
    Api(#[from] ClassifiedError),
    #[error("not connected")]
    NotConnected,
}

impl ErrorClassification for PipelineError {
    fn class(&self) -> ErrorClass {
        match self {
            Self::Api(err) => err.class(),
            Self::NotConnected => ErrorClass::Application,
        }
    }
}

/// Every status code maps to exactly one class and retryability follows the
/// class: 0, 429 and 5xx retry, everything else fails fast.
#[test]
fn classification_matrix_matches_expected_contract() {
    let cases: &[(u16, ErrorClass, bool)] = &[
        (STATUS_NETWORK_ERROR, ErrorClass::Network, true),
        (400, ErrorClass::Client, false),
        (401, ErrorClass::Client, false),
        (403, ErrorClass::Client, false),
        (404, ErrorClass::Client, false),
        (409, ErrorClass::Client, false),
        (429, ErrorClass::RateLimited, true),
        (500, ErrorClass::Server, true),
        (503, ErrorClass::Server, true),
        (599, ErrorClass::Server, true),
    ];

    for &(code, class, retryable) in cases {
        let err = ClassifiedError::new(code, "status", None);
        assert_eq!(err.class(), class, "class for {code}");
        assert_eq!(err.is_retryable(), retryable, "retryable for {code}");
        assert_eq!(ErrorClassification::is_retryable(&err), retryable, "trait for {code}");
    }
}

#[test]
fn application_errors_wrap_classified_errors() {
    let wrapped: PipelineError = ClassifiedError::new(503, "Service Unavailable", None).into();
    assert!(wrapped.is_retryable());
    assert_eq!(wrapped.severity(), ErrorSeverity::Error);
    assert_eq!(wrapped.to_string(), "API Error: 503 Service Unavailable");

    let local = PipelineError::NotConnected;
    assert!(!local.is_retryable());
    assert_eq!(local.class(), ErrorClass::Application);
    assert_eq!(local.severity().to_string(), "INFO");
}

#[test]
fn classified_error_serializes_with_camel_case_fields() {
    let err = ClassifiedError::new(422, "Unprocessable Entity", Some("{\"message\":\"bad\"}".into()));
    let json = serde_json::to_value(&err).unwrap();

    assert_eq!(json["statusCode"], 422);
    assert_eq!(json["statusText"], "Unprocessable Entity");
    assert_eq!(json["body"], "{\"message\":\"bad\"}");

    let back: ClassifiedError = serde_json::from_value(json).unwrap();
    assert_eq!(back, err);
}
