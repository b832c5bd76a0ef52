//! Treatment note tests.

use cliniko_client::{
    CreatePatientRequest, CreateTreatmentNoteRequest, QueryFilter, UpdateTreatmentNoteRequest,
};
use cliniko_tests::{MockCliniko, create_test_client};
use serde_json::json;

#[tokio::test]
async fn test_create_get_update_treatment_note() {
    let mock = MockCliniko::start().await;
    let client = create_test_client(&mock).expect("Failed to create client");

    let practitioner_id = mock.seed("practitioners", json!({"first_name": "Jo", "last_name": "Lee"}));
    let patient = client
        .create_patient(&CreatePatientRequest::new("Sam", "Park"))
        .await
        .expect("Failed to create patient");
    let patient_id = patient.id.expect("Patient has no id");

    let created = client
        .create_treatment_note(&CreateTreatmentNoteRequest {
            patient_id,
            practitioner_id,
            body: "Lower back pain, improving.".to_string(),
            individual_appointment_id: None,
        })
        .await
        .expect("Failed to create treatment note");
    let id = created.id.expect("Treatment note has no id");

    let links = created.links.expect("Treatment note has no links");
    assert!(links.patient.ends_with(&format!("/patients/{}", patient_id)));
    assert!(links.individual_appointment.is_none());

    let update = UpdateTreatmentNoteRequest {
        draft: Some(false),
        ..Default::default()
    };
    client
        .update_treatment_note(id, &update)
        .await
        .expect("Failed to update treatment note");

    let fetched = client
        .get_treatment_note(id)
        .await
        .expect("Failed to get treatment note");
    assert_eq!(fetched.draft, Some(false));
    assert_eq!(fetched.body, "Lower back pain, improving.");
    assert_eq!(fetched.patient_id, patient_id);
}

#[tokio::test]
async fn test_treatment_notes_for_patient() {
    let mock = MockCliniko::start().await;
    let client = create_test_client(&mock).expect("Failed to create client");

    for (patient_id, body) in [(10u64, "first"), (10, "second"), (11, "other")] {
        mock.seed(
            "treatment_notes",
            json!({"patient_id": patient_id, "practitioner_id": 3, "body": body}),
        );
    }

    let page = client
        .treatment_notes_for_patient(10)
        .await
        .expect("Failed to list treatment notes");

    assert_eq!(page.total_entries, 2);
    assert!(page.treatment_notes.iter().all(|n| n.patient_id == 10));
    assert_eq!(mock.last_request().filters(), vec!["patient_id:=10"]);
}

#[tokio::test]
async fn test_list_treatment_notes_without_params() {
    let mock = MockCliniko::start().await;
    let client = create_test_client(&mock).expect("Failed to create client");

    client
        .list_treatment_notes(&[], None)
        .await
        .expect("Failed to list treatment notes");

    let req = mock.last_request();
    assert_eq!(req.path, "/treatment_notes");
    assert!(req.query.is_empty());
}

#[tokio::test]
async fn test_list_treatment_notes_with_page() {
    let mock = MockCliniko::start().await;
    let client = create_test_client(&mock).expect("Failed to create client");

    let filters = [QueryFilter::fuzzy("body", "pain")];
    client
        .list_treatment_notes(&filters, Some(3))
        .await
        .expect("Failed to list treatment notes");

    let req = mock.last_request();
    assert_eq!(req.filters(), vec!["body:~pain"]);
    assert_eq!(req.page().as_deref(), Some("3"));
}
