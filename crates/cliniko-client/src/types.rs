//! Request and response types for the Cliniko API.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

#[cfg(test)]
mod tests;

// ============================================================================
// Links & Pagination
// ============================================================================

/// Link block of a single record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceLinks {
    /// URL of the record itself.
    #[serde(rename = "self")]
    pub self_url: String,
}

/// Link block of an individual appointment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppointmentLinks {
    /// URL of the appointment itself.
    #[serde(rename = "self")]
    pub self_url: String,
    /// URL of the patient.
    pub patient: String,
    /// URL of the practitioner.
    pub practitioner: String,
    /// URL of the appointment type.
    pub appointment_type: String,
    /// URL of the business.
    pub business: String,
    /// URL of the attendee list.
    pub attendees: String,
    /// URL of the treatment note, once written.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub treatment_note: Option<String>,
}

/// Link block of a treatment note.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TreatmentNoteLinks {
    /// URL of the note itself.
    #[serde(rename = "self")]
    pub self_url: String,
    /// URL of the patient.
    pub patient: String,
    /// URL of the practitioner.
    pub practitioner: String,
    /// URL of the appointment the note belongs to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub individual_appointment: Option<String>,
}

/// Navigation links of a paginated list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageLinks {
    /// URL of this page.
    #[serde(rename = "self")]
    pub self_url: String,
    /// URL of the next page.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next: Option<String>,
    /// URL of the previous page.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub previous: Option<String>,
}

/// Common view over the per-resource list envelopes.
pub trait Paginated {
    /// Record type held by the page.
    type Item;

    /// Total number of matching records across all pages.
    fn total_entries(&self) -> u64;

    /// Navigation links.
    fn links(&self) -> &PageLinks;

    /// Records on this page.
    fn items(&self) -> &[Self::Item];

    /// Returns true when the server advertises another page.
    fn has_next_page(&self) -> bool {
        self.links().next.is_some()
    }
}

/// Declares a list envelope whose record array is named after the resource.
macro_rules! paginated_response {
    ($(#[$meta:meta])* $name:ident, $field:ident, $item:ty) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Serialize, Deserialize)]
        pub struct $name {
            /// Total number of matching records across all pages.
            pub total_entries: u64,
            /// Navigation links.
            pub links: PageLinks,
            /// Records on this page.
            #[serde(default)]
            pub $field: Vec<$item>,
        }

        impl Paginated for $name {
            type Item = $item;

            fn total_entries(&self) -> u64 {
                self.total_entries
            }

            fn links(&self) -> &PageLinks {
                &self.links
            }

            fn items(&self) -> &[$item] {
                &self.$field
            }
        }
    };
}

paginated_response!(
    /// Page of patients.
    PatientsPage,
    patients,
    Patient
);
paginated_response!(
    /// Page of practitioners.
    PractitionersPage,
    practitioners,
    Practitioner
);
paginated_response!(
    /// Page of appointment types.
    AppointmentTypesPage,
    appointment_types,
    AppointmentType
);
paginated_response!(
    /// Page of individual appointments.
    IndividualAppointmentsPage,
    individual_appointments,
    IndividualAppointment
);
paginated_response!(
    /// Page of businesses.
    BusinessesPage,
    businesses,
    Business
);
paginated_response!(
    /// Page of treatment notes.
    TreatmentNotesPage,
    treatment_notes,
    TreatmentNote
);

/// Error payload returned by the API on non-2xx responses.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiErrorBody {
    /// Human-readable error messages.
    #[serde(default)]
    pub errors: Vec<String>,
}

// ============================================================================
// Patients
// ============================================================================

/// Patient record.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Patient {
    /// Server-assigned identifier.
    pub id: Option<u64>,
    /// Opted in to email marketing.
    pub accepted_email_marketing: Option<bool>,
    /// Accepted the privacy policy.
    pub accepted_privacy_policy: Option<bool>,
    /// Opted in to SMS marketing.
    pub accepted_sms_marketing: Option<bool>,
    /// Address line 1.
    pub address_1: Option<String>,
    /// Address line 2.
    pub address_2: Option<String>,
    /// Address line 3.
    pub address_3: Option<String>,
    /// When the patient was archived.
    pub archived_at: Option<DateTime<Utc>>,
    /// City.
    pub city: Option<String>,
    /// Country.
    pub country: Option<String>,
    /// Creation time.
    pub created_at: Option<DateTime<Utc>>,
    /// Date of birth.
    pub date_of_birth: Option<NaiveDate>,
    /// Deletion time.
    pub deleted_at: Option<DateTime<Utc>>,
    /// Email address.
    pub email: Option<String>,
    /// Emergency contact details.
    pub emergency_contact: Option<String>,
    /// First name.
    pub first_name: String,
    /// Gender.
    pub gender: Option<String>,
    /// Who invoices are addressed to by default.
    pub invoice_default_to: Option<String>,
    /// Email address for invoices.
    pub invoice_email: Option<String>,
    /// Extra information printed on invoices.
    pub invoice_extra_information: Option<String>,
    /// Last name.
    pub last_name: String,
    /// Medicare reference number.
    pub medicare_reference_number: Option<String>,
    /// Free-form notes.
    pub notes: Option<String>,
    /// Occupation.
    pub occupation: Option<String>,
    /// Identifier from a previous system.
    pub old_reference_id: Option<String>,
    /// Phone number.
    pub phone_number: Option<String>,
    /// Post code.
    pub post_code: Option<String>,
    /// Preferred first name.
    pub preferred_first_name: Option<String>,
    /// Referral source.
    pub referral_source: Option<String>,
    /// Reminder channel.
    pub reminder_type: Option<String>,
    /// State.
    pub state: Option<String>,
    /// Time zone.
    pub time_zone: Option<String>,
    /// Title.
    pub title: Option<String>,
    /// Last update time.
    pub updated_at: Option<DateTime<Utc>>,
    /// Resource links.
    pub links: Option<ResourceLinks>,
}

impl Patient {
    /// First and last name separated by a space.
    #[must_use]
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

/// Request to create a patient.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CreatePatientRequest {
    /// First name.
    pub first_name: String,
    /// Last name.
    pub last_name: String,
    /// Date of birth.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date_of_birth: Option<NaiveDate>,
    /// Gender.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gender: Option<String>,
    /// Email address.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    /// Phone number.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone_number: Option<String>,
    /// Address line 1.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address_1: Option<String>,
    /// City.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    /// State.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    /// Post code.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub post_code: Option<String>,
    /// Country.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    /// Free-form notes.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    /// Emergency contact details.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub emergency_contact: Option<String>,
}

impl CreatePatientRequest {
    /// Creates a request with only the required names set.
    pub fn new(first_name: impl Into<String>, last_name: impl Into<String>) -> Self {
        Self {
            first_name: first_name.into(),
            last_name: last_name.into(),
            ..Default::default()
        }
    }
}

/// Partial update of a patient. Unset fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UpdatePatientRequest {
    /// First name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    /// Last name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    /// Preferred first name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub preferred_first_name: Option<String>,
    /// Title.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Date of birth.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date_of_birth: Option<NaiveDate>,
    /// Gender.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gender: Option<String>,
    /// Email address.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    /// Phone number.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone_number: Option<String>,
    /// Address line 1.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address_1: Option<String>,
    /// Address line 2.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address_2: Option<String>,
    /// Address line 3.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address_3: Option<String>,
    /// City.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    /// State.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    /// Post code.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub post_code: Option<String>,
    /// Country.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    /// Occupation.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub occupation: Option<String>,
    /// Free-form notes.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    /// Emergency contact details.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub emergency_contact: Option<String>,
    /// Reminder channel.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reminder_type: Option<String>,
    /// Time zone.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_zone: Option<String>,
}

// ============================================================================
// Practitioners
// ============================================================================

/// Practitioner record.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Practitioner {
    /// Server-assigned identifier.
    pub id: Option<u64>,
    /// Whether the practitioner is active.
    pub active: Option<bool>,
    /// Creation time.
    pub created_at: Option<DateTime<Utc>>,
    /// Professional designation.
    pub designation: Option<String>,
    /// Email address.
    pub email: Option<String>,
    /// First name.
    pub first_name: String,
    /// Last name.
    pub last_name: String,
    /// Phone number.
    pub phone_number: Option<String>,
    /// Provider number.
    pub provider_number: Option<String>,
    /// Shown in online bookings.
    pub show_in_online_bookings: Option<bool>,
    /// Title.
    pub title: Option<String>,
    /// Last update time.
    pub updated_at: Option<DateTime<Utc>>,
    /// Linked user account.
    pub user_id: Option<u64>,
    /// Resource links.
    pub links: Option<ResourceLinks>,
}

impl Practitioner {
    /// Title (when set), first and last name.
    #[must_use]
    pub fn display_name(&self) -> String {
        match self.title.as_deref().filter(|t| !t.is_empty()) {
            Some(title) => format!("{} {} {}", title, self.first_name, self.last_name),
            None => format!("{} {}", self.first_name, self.last_name),
        }
    }
}

/// Request to create a practitioner.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CreatePractitionerRequest {
    /// First name.
    pub first_name: String,
    /// Last name.
    pub last_name: String,
    /// Title.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Email address.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    /// Phone number.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone_number: Option<String>,
    /// Shown in online bookings.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub show_in_online_bookings: Option<bool>,
    /// Professional designation.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub designation: Option<String>,
}

impl CreatePractitionerRequest {
    /// Creates a request with only the required names set.
    pub fn new(first_name: impl Into<String>, last_name: impl Into<String>) -> Self {
        Self {
            first_name: first_name.into(),
            last_name: last_name.into(),
            ..Default::default()
        }
    }
}

/// Partial update of a practitioner.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UpdatePractitionerRequest {
    /// First name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    /// Last name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    /// Title.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Email address.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    /// Phone number.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone_number: Option<String>,
    /// Provider number.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub provider_number: Option<String>,
    /// Shown in online bookings.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub show_in_online_bookings: Option<bool>,
    /// Professional designation.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub designation: Option<String>,
    /// Whether the practitioner is active.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub active: Option<bool>,
}

// ============================================================================
// Appointment Types
// ============================================================================

/// Appointment type record.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppointmentType {
    /// Server-assigned identifier.
    pub id: Option<u64>,
    /// Whether the type is active.
    pub active: Option<bool>,
    /// Bookable online.
    pub bookable_online: Option<bool>,
    /// Calendar colour.
    pub color: Option<String>,
    /// Creation time.
    pub created_at: Option<DateTime<Utc>>,
    /// Default duration.
    pub duration_in_minutes: u32,
    /// Maximum attendees for group bookings.
    pub max_attendees: Option<u32>,
    /// Name.
    pub name: String,
    /// Shown in online bookings.
    pub show_in_online_bookings: Option<bool>,
    /// Last update time.
    pub updated_at: Option<DateTime<Utc>>,
    /// Resource links.
    pub links: Option<ResourceLinks>,
}

/// Request to create an appointment type.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CreateAppointmentTypeRequest {
    /// Name.
    pub name: String,
    /// Default duration.
    pub duration_in_minutes: u32,
    /// Calendar colour.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    /// Bookable online.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bookable_online: Option<bool>,
    /// Maximum attendees for group bookings.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_attendees: Option<u32>,
    /// Shown in online bookings.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub show_in_online_bookings: Option<bool>,
}

// ============================================================================
// Individual Appointments
// ============================================================================

/// Individual (one patient) appointment record.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IndividualAppointment {
    /// Server-assigned identifier.
    pub id: Option<u64>,
    /// Legacy end time.
    pub appointment_end: Option<DateTime<Utc>>,
    /// Legacy start time.
    pub appointment_start: Option<DateTime<Utc>>,
    /// Appointment type.
    pub appointment_type_id: u64,
    /// When the patient arrived.
    pub arrived_at: Option<DateTime<Utc>>,
    /// Business the appointment is at.
    pub business_id: u64,
    /// Free-form cancellation note.
    pub cancellation_note: Option<String>,
    /// Cancellation reason.
    pub cancellation_reason: Option<String>,
    /// When the appointment was cancelled.
    pub cancelled_at: Option<DateTime<Utc>>,
    /// Creation time.
    pub created_at: Option<DateTime<Utc>>,
    /// Marked as did-not-arrive.
    pub did_not_arrive: Option<bool>,
    /// End time.
    pub ends_at: DateTime<Utc>,
    /// Free-form notes.
    pub notes: Option<String>,
    /// When the online booking policy was accepted.
    pub online_booking_policy_accepted: Option<String>,
    /// Patient has arrived.
    pub patient_arrived: Option<bool>,
    /// Patient.
    pub patient_id: u64,
    /// Practitioner.
    pub practitioner_id: u64,
    /// Series this appointment belongs to.
    pub recurring_appointment_id: Option<u64>,
    /// Start time.
    pub starts_at: DateTime<Utc>,
    /// Treatment note written for the appointment.
    pub treatment_note_id: Option<u64>,
    /// Last update time.
    pub updated_at: Option<DateTime<Utc>>,
    /// Resource links.
    pub links: Option<AppointmentLinks>,
}

/// Request to create an individual appointment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateAppointmentRequest {
    /// Patient.
    pub patient_id: u64,
    /// Practitioner.
    pub practitioner_id: u64,
    /// Appointment type.
    pub appointment_type_id: u64,
    /// Business.
    pub business_id: u64,
    /// Start time.
    pub starts_at: DateTime<Utc>,
    /// End time.
    pub ends_at: DateTime<Utc>,
    /// Free-form notes.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

/// Partial update of an individual appointment.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UpdateAppointmentRequest {
    /// Patient.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub patient_id: Option<u64>,
    /// Practitioner.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub practitioner_id: Option<u64>,
    /// Appointment type.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub appointment_type_id: Option<u64>,
    /// Business.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub business_id: Option<u64>,
    /// Start time.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub starts_at: Option<DateTime<Utc>>,
    /// End time.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ends_at: Option<DateTime<Utc>>,
    /// Free-form notes.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    /// Patient has arrived.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub patient_arrived: Option<bool>,
    /// Marked as did-not-arrive.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub did_not_arrive: Option<bool>,
}

/// Body of the appointment cancellation DELETE.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CancelAppointmentRequest {
    /// Reason recorded against the cancellation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cancellation_reason: Option<String>,
}

// ============================================================================
// Businesses
// ============================================================================

/// Business (clinic location) record.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Business {
    /// Server-assigned identifier.
    pub id: Option<u64>,
    /// Address line 1.
    pub address_1: Option<String>,
    /// Address line 2.
    pub address_2: Option<String>,
    /// Address line 3.
    pub address_3: Option<String>,
    /// City.
    pub city: Option<String>,
    /// Contact information.
    pub contact_information: Option<String>,
    /// Country.
    pub country: Option<String>,
    /// Creation time.
    pub created_at: Option<DateTime<Utc>>,
    /// Business name.
    pub name: String,
    /// Phone number.
    pub phone_number: Option<String>,
    /// Post code.
    pub post_code: Option<String>,
    /// State.
    pub state: Option<String>,
    /// Time zone.
    pub time_zone: Option<String>,
    /// Last update time.
    pub updated_at: Option<DateTime<Utc>>,
    /// Website.
    pub website_address: Option<String>,
    /// Resource links.
    pub links: Option<ResourceLinks>,
}

// ============================================================================
// Treatment Notes
// ============================================================================

/// Treatment note record.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TreatmentNote {
    /// Server-assigned identifier.
    pub id: Option<u64>,
    /// Note content.
    pub body: String,
    /// Creation time.
    pub created_at: Option<DateTime<Utc>>,
    /// Deletion time.
    pub deleted_at: Option<DateTime<Utc>>,
    /// Still a draft.
    pub draft: Option<bool>,
    /// Appointment the note was written for.
    pub individual_appointment_id: Option<u64>,
    /// Patient.
    pub patient_id: u64,
    /// Practitioner.
    pub practitioner_id: u64,
    /// Template the note was created from.
    pub treatment_note_template_id: Option<u64>,
    /// Last update time.
    pub updated_at: Option<DateTime<Utc>>,
    /// Resource links.
    pub links: Option<TreatmentNoteLinks>,
}

/// Request to create a treatment note.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateTreatmentNoteRequest {
    /// Patient.
    pub patient_id: u64,
    /// Practitioner.
    pub practitioner_id: u64,
    /// Note content.
    pub body: String,
    /// Appointment the note is written for.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub individual_appointment_id: Option<u64>,
}

/// Partial update of a treatment note.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateTreatmentNoteRequest {
    /// Note content.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
    /// Still a draft.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub draft: Option<bool>,
    /// Appointment the note is written for.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub individual_appointment_id: Option<u64>,
}

// ============================================================================
// Account
// ============================================================================

/// Summary of the account the API key belongs to.
#[derive(Debug, Clone)]
pub struct AccountInfo {
    /// Businesses on the account.
    pub businesses: BusinessesPage,
    /// Practitioners on the account.
    pub practitioners: PractitionersPage,
}
