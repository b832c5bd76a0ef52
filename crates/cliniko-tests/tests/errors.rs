//! Error propagation and interceptor logging tests.

use cliniko_client::{CreatePatientRequest, Error};
use cliniko_tests::{ErrorCounter, MockCliniko, create_test_client};

#[tokio::test]
async fn test_unknown_patient_is_not_found() {
    let mock = MockCliniko::start().await;
    let client = create_test_client(&mock).expect("Failed to create client");
    let (logged, _guard) = ErrorCounter::install();

    let err = client.get_patient(999).await.unwrap_err();

    assert!(err.is_not_found());
    assert_eq!(err.status(), Some(404));
    assert_eq!(err.api_errors(), ["Not found"]);
    assert_eq!(logged.count(), 1);
}

#[tokio::test]
async fn test_validation_failure_carries_server_messages() {
    let mock = MockCliniko::start().await;
    let client = create_test_client(&mock).expect("Failed to create client");
    let (logged, _guard) = ErrorCounter::install();

    let err = client
        .create_patient(&CreatePatientRequest::new("", "Blank"))
        .await
        .unwrap_err();

    match &err {
        Error::Api { status, errors, .. } => {
            assert_eq!(*status, 422);
            assert_eq!(errors, &["First name can't be blank"]);
        }
        other => panic!("Expected Api error, got {:?}", other),
    }
    assert_eq!(err.to_string(), "API error (422): First name can't be blank");
    assert_eq!(logged.count(), 1);
}

#[tokio::test]
async fn test_server_error_is_returned_unchanged() {
    let mock = MockCliniko::start().await;
    let client = create_test_client(&mock).expect("Failed to create client");
    let (logged, _guard) = ErrorCounter::install();

    mock.fail_next(503, &["Down for maintenance"]);
    let err = client.list_businesses().await.unwrap_err();

    assert_eq!(err.status(), Some(503));
    assert!(!err.is_not_found());
    assert_eq!(err.api_errors(), ["Down for maintenance"]);
    assert_eq!(logged.count(), 1);
}

#[tokio::test]
async fn test_each_failed_call_logs_once() {
    let mock = MockCliniko::start().await;
    let client = create_test_client(&mock).expect("Failed to create client");
    let (logged, _guard) = ErrorCounter::install();

    assert!(client.get_practitioner(1).await.is_err());
    assert!(client.get_business(2).await.is_err());
    assert!(client.get_treatment_note(3).await.is_err());
    client
        .list_patients(&[], None)
        .await
        .expect("Failed to list patients");

    assert_eq!(logged.count(), 3);
}

#[tokio::test]
async fn test_successful_calls_do_not_log_errors() {
    let mock = MockCliniko::start().await;
    let client = create_test_client(&mock).expect("Failed to create client");
    let (logged, _guard) = ErrorCounter::install();

    client
        .create_patient(&CreatePatientRequest::new("Ok", "Fine"))
        .await
        .expect("Failed to create patient");
    assert!(client.test_connection().await);

    assert_eq!(logged.count(), 0);
}

#[tokio::test]
async fn test_missing_credentials_rejected_by_server() {
    let mock = MockCliniko::start().await;
    let client = create_test_client(&mock).expect("Failed to create client");

    mock.fail_next(401, &["You must be authenticated"]);
    let err = client.list_appointments(&[], None).await.unwrap_err();

    assert_eq!(err.status(), Some(401));
}

#[tokio::test]
async fn test_undecodable_success_body_logs_once() {
    let mock = MockCliniko::start().await;
    let client = create_test_client(&mock).expect("Failed to create client");
    let (logged, _guard) = ErrorCounter::install();

    mock.respond_next(200, serde_json::json!("not a patient"));
    let err = client.get_patient(1).await.unwrap_err();

    assert!(matches!(err, Error::Json(_)));
    assert!(err.status().is_none());
    assert_eq!(logged.count(), 1);
}

#[tokio::test]
async fn test_undecodable_page_logs_once() {
    let mock = MockCliniko::start().await;
    let client = create_test_client(&mock).expect("Failed to create client");
    let (logged, _guard) = ErrorCounter::install();

    mock.respond_next(200, serde_json::json!({"total_entries": "many"}));
    let err = client.list_practitioners(&[], None).await.unwrap_err();

    assert!(matches!(err, Error::Json(_)));
    assert_eq!(logged.count(), 1);
}
