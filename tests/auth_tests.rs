//! Unit tests for the shared-secret check

use axum::http::{HeaderMap, HeaderValue, StatusCode};
use kouri_gateway::api::{X_API_KEY, check_api_key};

fn headers_with_key(key: &str) -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(X_API_KEY, HeaderValue::from_str(key).unwrap());
    headers
}

#[test]
fn test_no_token_configured_allows_everything() {
    assert!(check_api_key(None, &HeaderMap::new()).is_ok());
    assert!(check_api_key(None, &headers_with_key("anything")).is_ok());
}

#[test]
fn test_matching_key_is_accepted() {
    assert!(check_api_key(Some("s3cret"), &headers_with_key("s3cret")).is_ok());
}

#[test]
fn test_missing_header_is_unauthorized() {
    let (status, body) = check_api_key(Some("s3cret"), &HeaderMap::new()).unwrap_err();

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body.0.error, "Unauthorized");
}

#[test]
fn test_wrong_key_is_unauthorized() {
    let (status, _) = check_api_key(Some("s3cret"), &headers_with_key("guess")).unwrap_err();
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[test]
fn test_key_match_is_exact() {
    for candidate in ["S3CRET", "s3cret ", " s3cret", "s3cre", "s3crett"] {
        let result = check_api_key(Some("s3cret"), &headers_with_key(candidate));
        assert!(result.is_err(), "{candidate:?} should be rejected");
    }
}

#[test]
fn test_header_name_is_case_insensitive() {
    let mut headers = HeaderMap::new();
    headers.insert("x-api-key", HeaderValue::from_static("s3cret"));

    assert!(check_api_key(Some("s3cret"), &headers).is_ok());
}

#[test]
fn test_non_utf8_header_is_rejected() {
    let mut headers = HeaderMap::new();
    headers.insert(X_API_KEY, HeaderValue::from_bytes(&[0xFF, 0xFE]).unwrap());

    assert!(check_api_key(Some("s3cret"), &headers).is_err());
}
