//! Unit tests for client module.

use super::*;
use crate::query::QueryFilter;
use std::collections::HashMap;

fn lookup_from(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let vars: HashMap<String, String> = vars
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    move |name| vars.get(name).cloned()
}

fn no_env(_: &str) -> Option<String> {
    None
}

fn test_client() -> ClinikoClient {
    ClinikoClient::new(ClientConfig::new("key", "https://api.au1.cliniko.com/v1/")).unwrap()
}

// ============================================================================
// ClientConfig Tests
// ============================================================================

#[test]
fn test_client_config_new_defaults() {
    let config = ClientConfig::new("key", "https://api.au1.cliniko.com/v1");

    assert_eq!(config.api_key, "key");
    assert_eq!(config.base_url, "https://api.au1.cliniko.com/v1");
    assert!(config.user_email.is_none());
    assert_eq!(config.timeout, Duration::from_secs(DEFAULT_TIMEOUT_SECS));
}

#[test]
fn test_client_config_builder() {
    let config = ClientConfig::new("key", "https://api.au1.cliniko.com/v1")
        .with_user_email("ops@example.com")
        .with_timeout(Duration::from_secs(5));

    assert_eq!(config.user_email.as_deref(), Some("ops@example.com"));
    assert_eq!(config.timeout, Duration::from_secs(5));
}

#[test]
fn test_client_config_debug_redacts_key() {
    let config = ClientConfig::new("super-secret", "https://api.au1.cliniko.com/v1");

    let debug = format!("{:?}", config);
    assert!(!debug.contains("super-secret"));
    assert!(debug.contains("redacted"));
}

#[test]
fn test_user_agent_with_and_without_email() {
    let config = ClientConfig::new("key", "https://x.test");
    assert_eq!(config.user_agent(), "Cliniko Rust Client (no-email-provided)");

    let config = config.with_user_email("ops@example.com");
    assert_eq!(config.user_agent(), "Cliniko Rust Client (ops@example.com)");
}

// ============================================================================
// Resolution Tests
// ============================================================================

#[test]
fn test_resolve_explicit_only() {
    let config = ClientConfig::resolve_with(
        Some("key".to_string()),
        Some("https://x.test".to_string()),
        Some("ops@example.com".to_string()),
        no_env,
    )
    .unwrap();

    assert_eq!(config.api_key, "key");
    assert_eq!(config.base_url, "https://x.test");
    assert_eq!(config.user_email.as_deref(), Some("ops@example.com"));
}

#[test]
fn test_resolve_falls_back_to_environment() {
    let lookup = lookup_from(&[
        (API_KEY_ENV, "env-key"),
        (BASE_URL_ENV, "https://env.test"),
        (EMAIL_ENV, "env@example.com"),
    ]);

    let config = ClientConfig::resolve_with(None, None, None, lookup).unwrap();

    assert_eq!(config.api_key, "env-key");
    assert_eq!(config.base_url, "https://env.test");
    assert_eq!(config.user_email.as_deref(), Some("env@example.com"));
}

#[test]
fn test_resolve_explicit_takes_precedence() {
    let lookup = lookup_from(&[(API_KEY_ENV, "env-key"), (BASE_URL_ENV, "https://env.test")]);

    let config =
        ClientConfig::resolve_with(Some("explicit-key".to_string()), None, None, lookup).unwrap();

    assert_eq!(config.api_key, "explicit-key");
    assert_eq!(config.base_url, "https://env.test");
    assert!(config.user_email.is_none());
}

#[test]
fn test_resolve_missing_key() {
    let lookup = lookup_from(&[(BASE_URL_ENV, "https://env.test")]);

    let result = ClientConfig::resolve_with(None, None, None, lookup);

    assert!(matches!(result, Err(Error::MissingApiKey)));
}

#[test]
fn test_resolve_missing_base_url() {
    let result = ClientConfig::resolve_with(Some("key".to_string()), None, None, no_env);

    assert!(matches!(result, Err(Error::MissingBaseUrl)));
}

#[test]
fn test_resolve_nothing_available_fails() {
    let result = ClientConfig::resolve_with(None, None, None, no_env);

    assert!(matches!(result, Err(Error::MissingApiKey)));
}

#[test]
fn test_resolve_empty_explicit_value_falls_back() {
    let lookup = lookup_from(&[(API_KEY_ENV, "env-key"), (BASE_URL_ENV, "https://env.test")]);

    let config = ClientConfig::resolve_with(Some(String::new()), None, None, lookup).unwrap();

    assert_eq!(config.api_key, "env-key");
}

// ============================================================================
// Validation Tests
// ============================================================================

#[test]
fn test_validate_rejects_empty_values() {
    assert!(matches!(
        ClientConfig::new("", "https://x.test").validate(),
        Err(Error::MissingApiKey)
    ));
    assert!(matches!(
        ClientConfig::new("key", "").validate(),
        Err(Error::MissingBaseUrl)
    ));
}

#[test]
fn test_validate_rejects_bad_urls() {
    assert!(matches!(
        ClientConfig::new("key", "not a url").validate(),
        Err(Error::InvalidUrl(_))
    ));
    assert!(matches!(
        ClientConfig::new("key", "ftp://x.test").validate(),
        Err(Error::InvalidConfig(_))
    ));
}

// ============================================================================
// ClinikoClient Creation Tests
// ============================================================================

#[test]
fn test_cliniko_client_new() {
    let client = ClinikoClient::new(ClientConfig::new("key", "https://x.test"));

    assert!(client.is_ok());
}

#[test]
fn test_cliniko_client_new_rejects_missing_key() {
    let client = ClinikoClient::new(ClientConfig::new("", "https://x.test"));

    assert!(matches!(client, Err(Error::MissingApiKey)));
}

#[test]
fn test_cliniko_client_rejects_unprintable_email() {
    let config = ClientConfig::new("key", "https://x.test").with_user_email("ops\n@example.com");

    let client = ClinikoClient::new(config);

    assert!(matches!(client, Err(Error::InvalidConfig(_))));
}

#[test]
fn test_cliniko_client_base_url_trimmed() {
    let client = test_client();

    assert_eq!(client.base_url(), "https://api.au1.cliniko.com/v1");
}

#[test]
fn test_cliniko_client_debug_hides_key() {
    let client = ClinikoClient::new(ClientConfig::new("super-secret", "https://x.test")).unwrap();

    assert!(!format!("{:?}", client).contains("super-secret"));
}

// ============================================================================
// URL Building Tests
// ============================================================================

#[test]
fn test_list_url_without_params() {
    let url = test_client().list_url("patients", &[], None).unwrap();

    assert_eq!(url, "https://api.au1.cliniko.com/v1/patients");
}

#[test]
fn test_list_url_with_filters_and_page() {
    let filters = [QueryFilter::equals("patient_id", 42u64)];

    let url = test_client()
        .list_url("treatment_notes", &filters, Some(2))
        .unwrap();

    assert_eq!(
        url,
        "https://api.au1.cliniko.com/v1/treatment_notes?q%5B%5D=patient_id%3A%3D42&page=2"
    );
}

// ============================================================================
// Transport Failure Tests
// ============================================================================

#[tokio::test]
async fn test_connection_reports_unreachable_server() {
    let client = ClinikoClient::new(
        ClientConfig::new("key", "http://127.0.0.1:9").with_timeout(Duration::from_secs(2)),
    )
    .unwrap();

    assert!(!client.test_connection().await);
}

#[tokio::test]
async fn test_transport_error_is_returned_unchanged() {
    let client = ClinikoClient::new(
        ClientConfig::new("key", "http://127.0.0.1:9").with_timeout(Duration::from_secs(2)),
    )
    .unwrap();

    let err = client.get_patient(1).await.unwrap_err();

    assert!(matches!(err, Error::Http(_)));
    assert!(err.status().is_none());
}
