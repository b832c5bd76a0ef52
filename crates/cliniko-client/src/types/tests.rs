//! Unit tests for types module.

use super::*;
use chrono::TimeZone;

// ============================================================================
// Paginated Envelopes
// ============================================================================

#[test]
fn test_patients_page_deserialization() {
    let json = r#"{
        "total_entries": 2,
        "links": {
            "self": "https://api.au1.cliniko.com/v1/patients?page=1",
            "next": "https://api.au1.cliniko.com/v1/patients?page=2"
        },
        "patients": [
            {"id": 1, "first_name": "Jane", "last_name": "Doe", "email": "jane@example.com"},
            {"id": 2, "first_name": "John", "last_name": "Smith", "date_of_birth": "1990-05-17"}
        ]
    }"#;

    let page: PatientsPage = serde_json::from_str(json).unwrap();

    assert_eq!(page.total_entries(), 2);
    assert_eq!(page.items().len(), 2);
    assert!(page.has_next_page());
    assert!(page.links().previous.is_none());
    assert_eq!(page.patients[0].email.as_deref(), Some("jane@example.com"));
    assert_eq!(
        page.patients[1].date_of_birth,
        NaiveDate::from_ymd_opt(1990, 5, 17)
    );
}

#[test]
fn test_page_without_records_defaults_to_empty() {
    let json = r#"{"total_entries": 0, "links": {"self": "https://x/businesses"}}"#;

    let page: BusinessesPage = serde_json::from_str(json).unwrap();

    assert_eq!(page.total_entries, 0);
    assert!(page.businesses.is_empty());
    assert!(!page.has_next_page());
}

#[test]
fn test_appointments_page_uses_resource_key() {
    let json = r#"{
        "total_entries": 1,
        "links": {"self": "https://x/individual_appointments"},
        "individual_appointments": [{
            "id": 10,
            "appointment_type_id": 3,
            "business_id": 4,
            "patient_id": 5,
            "practitioner_id": 6,
            "starts_at": "2025-03-01T09:00:00Z",
            "ends_at": "2025-03-01T09:30:00Z",
            "links": {
                "self": "https://x/individual_appointments/10",
                "patient": "https://x/patients/5",
                "practitioner": "https://x/practitioners/6",
                "appointment_type": "https://x/appointment_types/3",
                "business": "https://x/businesses/4",
                "attendees": "https://x/individual_appointments/10/attendees"
            }
        }]
    }"#;

    let page: IndividualAppointmentsPage = serde_json::from_str(json).unwrap();
    let appointment = &page.individual_appointments[0];

    assert_eq!(appointment.id, Some(10));
    assert_eq!(
        appointment.starts_at,
        Utc.with_ymd_and_hms(2025, 3, 1, 9, 0, 0).unwrap()
    );
    let links = appointment.links.as_ref().unwrap();
    assert_eq!(links.patient, "https://x/patients/5");
    assert!(links.treatment_note.is_none());
}

#[test]
fn test_page_links_self_rename() {
    let links = PageLinks {
        self_url: "https://x/patients".to_string(),
        next: None,
        previous: None,
    };

    let json = serde_json::to_string(&links).unwrap();
    assert_eq!(json, r#"{"self":"https://x/patients"}"#);
}

// ============================================================================
// Requests
// ============================================================================

#[test]
fn test_create_patient_request_omits_unset_fields() {
    let request = CreatePatientRequest::new("Test", "Patient");

    let json = serde_json::to_value(&request).unwrap();
    assert_eq!(json, serde_json::json!({"first_name": "Test", "last_name": "Patient"}));
}

#[test]
fn test_create_patient_request_date_of_birth_format() {
    let request = CreatePatientRequest {
        date_of_birth: NaiveDate::from_ymd_opt(1990, 1, 1),
        ..CreatePatientRequest::new("Test", "Patient")
    };

    let json = serde_json::to_value(&request).unwrap();
    assert_eq!(json["date_of_birth"], "1990-01-01");
}

#[test]
fn test_update_patient_request_is_partial() {
    let request = UpdatePatientRequest {
        phone_number: Some("+61 400 987 654".to_string()),
        ..Default::default()
    };

    let json = serde_json::to_value(&request).unwrap();
    assert_eq!(json, serde_json::json!({"phone_number": "+61 400 987 654"}));
}

#[test]
fn test_create_appointment_request_serialization() {
    let request = CreateAppointmentRequest {
        patient_id: 1,
        practitioner_id: 2,
        appointment_type_id: 3,
        business_id: 4,
        starts_at: Utc.with_ymd_and_hms(2025, 6, 2, 10, 0, 0).unwrap(),
        ends_at: Utc.with_ymd_and_hms(2025, 6, 2, 11, 0, 0).unwrap(),
        notes: None,
    };

    let json = serde_json::to_value(&request).unwrap();
    assert_eq!(json["patient_id"], 1);
    assert_eq!(json["starts_at"], "2025-06-02T10:00:00Z");
    assert!(json.get("notes").is_none());
}

#[test]
fn test_cancel_appointment_request_body() {
    let without_reason = CancelAppointmentRequest::default();
    assert_eq!(serde_json::to_string(&without_reason).unwrap(), "{}");

    let with_reason = CancelAppointmentRequest {
        cancellation_reason: Some("Feeling unwell".to_string()),
    };
    assert_eq!(
        serde_json::to_string(&with_reason).unwrap(),
        r#"{"cancellation_reason":"Feeling unwell"}"#
    );
}

#[test]
fn test_create_treatment_note_request_serialization() {
    let request = CreateTreatmentNoteRequest {
        patient_id: 7,
        practitioner_id: 8,
        body: "Reviewed progress".to_string(),
        individual_appointment_id: None,
    };

    let json = serde_json::to_value(&request).unwrap();
    assert_eq!(
        json,
        serde_json::json!({"patient_id": 7, "practitioner_id": 8, "body": "Reviewed progress"})
    );
}

// ============================================================================
// Records
// ============================================================================

#[test]
fn test_patient_full_name() {
    let patient = Patient {
        first_name: "Jane".to_string(),
        last_name: "Doe".to_string(),
        ..Default::default()
    };

    assert_eq!(patient.full_name(), "Jane Doe");
}

#[test]
fn test_practitioner_display_name() {
    let mut practitioner = Practitioner {
        first_name: "Alex".to_string(),
        last_name: "Nguyen".to_string(),
        ..Default::default()
    };
    assert_eq!(practitioner.display_name(), "Alex Nguyen");

    practitioner.title = Some("Dr".to_string());
    assert_eq!(practitioner.display_name(), "Dr Alex Nguyen");
}

#[test]
fn test_partial_patient_decodes_with_defaults() {
    let patient: Patient = serde_json::from_str(r#"{"id": 1, "last_name": "Doe"}"#).unwrap();

    assert_eq!(patient.id, Some(1));
    assert_eq!(patient.first_name, "");
    assert_eq!(patient.last_name, "Doe");
}

#[test]
fn test_partial_appointment_decodes_with_defaults() {
    let json = r#"{"id": 7, "starts_at": "2025-03-10T09:00:00Z", "notes": "Walk-in"}"#;

    let appointment: IndividualAppointment = serde_json::from_str(json).unwrap();

    assert_eq!(appointment.id, Some(7));
    assert_eq!(appointment.patient_id, 0);
    assert_eq!(appointment.appointment_type_id, 0);
    assert_eq!(appointment.notes.as_deref(), Some("Walk-in"));
    assert!(appointment.links.is_none());
}

#[test]
fn test_page_with_partial_record_decodes() {
    let json = r#"{
        "total_entries": 2,
        "links": {"self": "https://x/businesses?page=1"},
        "businesses": [{"id": 1, "name": "Main"}, {"id": 2}]
    }"#;

    let page: BusinessesPage = serde_json::from_str(json).unwrap();

    assert_eq!(page.businesses.len(), 2);
    assert_eq!(page.businesses[1].id, Some(2));
    assert!(page.businesses[1].name.is_empty());
}

#[test]
fn test_treatment_note_links() {
    let json = r#"{
        "id": 3,
        "body": "Notes",
        "patient_id": 1,
        "practitioner_id": 2,
        "draft": true,
        "links": {
            "self": "https://x/treatment_notes/3",
            "patient": "https://x/patients/1",
            "practitioner": "https://x/practitioners/2",
            "individual_appointment": "https://x/individual_appointments/9"
        }
    }"#;

    let note: TreatmentNote = serde_json::from_str(json).unwrap();

    assert_eq!(note.draft, Some(true));
    assert_eq!(
        note.links.unwrap().individual_appointment.as_deref(),
        Some("https://x/individual_appointments/9")
    );
}

#[test]
fn test_api_error_body_deserialization() {
    let body: ApiErrorBody =
        serde_json::from_str(r#"{"errors": ["Last name can't be blank"]}"#).unwrap();
    assert_eq!(body.errors, vec!["Last name can't be blank".to_string()]);

    let empty: ApiErrorBody = serde_json::from_str("{}").unwrap();
    assert!(empty.errors.is_empty());
}
