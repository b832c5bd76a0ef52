//! Demo scenarios run by the `cliniko-demo` binary.
//!
//! Every step reports its own failure and the scenario moves on, so a demo
//! against a sparsely populated account still completes.

use crate::config::DemoSettings;
use anyhow::{Context, bail};
use chrono::{Duration, Local, NaiveDate, Utc};
use cliniko_client::{
    ClinikoClient, CreateAppointmentRequest, CreatePatientRequest, IndividualAppointment,
    Paginated, Patient, QueryFilter, UpdatePatientRequest,
};
use tracing::{error, info};

/// Usage text printed for unknown commands.
pub const USAGE: &str = "\
Cliniko API Rust Client

Usage:
  cliniko-demo test           Test connection and basic operations
  cliniko-demo patients       List patients
  cliniko-demo appointments   List appointments
  cliniko-demo examples       Run the full walkthrough

Credentials come from cliniko.toml (or the file named by CLINIKO_CONFIG),
falling back to CLINIKO_API_KEY, CLINIKO_BASE_URL and CLINIKO_EMAIL.";

/// Demo command selected by the first CLI argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Connection test plus a short tour.
    QuickStart,
    /// Patient listing with contact details.
    Patients,
    /// Appointment listing.
    Appointments,
    /// Full walkthrough.
    Examples,
    /// Print usage.
    Usage,
}

impl Command {
    /// Maps the first CLI argument to a command.
    #[must_use]
    pub fn parse(arg: Option<&str>) -> Self {
        match arg {
            Some("test") => Self::QuickStart,
            Some("patients") => Self::Patients,
            Some("appointments") => Self::Appointments,
            Some("examples") => Self::Examples,
            _ => Self::Usage,
        }
    }
}

/// Runs demo scenarios against a client.
pub struct Demo<'a> {
    client: &'a ClinikoClient,
    preview: usize,
}

impl<'a> Demo<'a> {
    /// Creates a demo runner.
    #[must_use]
    pub fn new(client: &'a ClinikoClient, settings: &DemoSettings) -> Self {
        Self {
            client,
            preview: settings.page_size_preview,
        }
    }

    /// Runs `command` and returns the number of steps that failed.
    pub async fn run(&self, command: Command) -> usize {
        match command {
            Command::QuickStart => self.quick_start().await,
            Command::Patients => step("list patients", self.list_patients()).await,
            Command::Appointments => step("list appointments", self.list_appointments()).await,
            Command::Examples => self.examples().await,
            Command::Usage => {
                println!("{}", USAGE);
                0
            }
        }
    }

    // ========================================================================
    // Scenarios
    // ========================================================================

    async fn quick_start(&self) -> usize {
        println!("Cliniko API Quick Start\n");

        println!("1. Testing connection...");
        if !self.client.test_connection().await {
            println!("Connection failed. Check your credentials.");
            return 1;
        }

        let mut failures = 0;
        println!("\n2. Account summary:");
        failures += step("account summary", self.account_summary()).await;
        println!("\n3. Recent patients:");
        failures += step("recent patients", self.recent_patients()).await;
        println!("\n4. Today's appointments:");
        failures += step("today's appointments", self.todays_appointments()).await;
        println!("\n5. Creating a demo patient:");
        failures += step("create demo patient", self.create_demo_patient()).await;
        println!("\n6. Searching for demo patients:");
        failures += step("search demo patients", self.search("Demo")).await;

        println!("\nQuick start finished with {} failed step(s).", failures);
        failures
    }

    async fn examples(&self) -> usize {
        println!("Cliniko API Rust Examples\n");

        println!("1. Testing connection...");
        if !self.client.test_connection().await {
            println!("Connection failed. Check your credentials.");
            return 1;
        }

        let mut failures = 0;
        println!("\n2. Account summary:");
        failures += step("account summary", self.account_summary()).await;
        println!("\n3. Patients:");
        failures += step("recent patients", self.recent_patients()).await;
        println!("\n4. Searching for patients named John:");
        failures += step("search patients", self.search("John")).await;
        println!("\n5. Creating and updating a patient:");
        failures += step("create and update patient", self.create_and_update_patient()).await;
        println!("\n6. Practitioners:");
        failures += step("list practitioners", self.practitioners()).await;
        println!("\n7. Appointment types:");
        failures += step("list appointment types", self.appointment_types()).await;
        println!("\n8. Today's appointments:");
        failures += step("today's appointments", self.todays_appointments()).await;
        println!("\n9. Appointments in the next 7 days:");
        failures += step("next 7 days", self.next_week()).await;
        println!("\n10. Patients born in the 1990s:");
        failures += step("date of birth filter", self.born_in_nineties()).await;
        println!("\n11. Booking an appointment:");
        failures += step("create appointment", self.book_appointment()).await;

        println!("\nExamples finished with {} failed step(s).", failures);
        failures
    }

    // ========================================================================
    // Steps
    // ========================================================================

    async fn account_summary(&self) -> anyhow::Result<()> {
        let info = self.client.account_info().await?;
        println!("Businesses: {}", info.businesses.total_entries());
        for business in info.businesses.items().iter().take(self.preview) {
            println!("  - {}", business.name);
        }
        println!("Practitioners: {}", info.practitioners.total_entries());
        for practitioner in info.practitioners.items().iter().take(self.preview) {
            println!("  - {}", practitioner.display_name());
        }
        Ok(())
    }

    async fn recent_patients(&self) -> anyhow::Result<()> {
        let page = self.client.list_patients(&[], Some(1)).await?;
        println!("Total: {} patients", page.total_entries());
        for (i, patient) in page.items().iter().take(self.preview).enumerate() {
            println!(
                "  {}. {} ({})",
                i + 1,
                patient.full_name(),
                patient.email.as_deref().unwrap_or("no email")
            );
        }
        Ok(())
    }

    async fn list_patients(&self) -> anyhow::Result<()> {
        let page = self.client.list_patients(&[], None).await?;
        println!("{} patients:", page.total_entries());
        for (i, patient) in page.patients.iter().enumerate() {
            println!("{}", describe_patient(i + 1, patient));
        }
        Ok(())
    }

    async fn list_appointments(&self) -> anyhow::Result<()> {
        let page = self.client.list_appointments(&[], None).await?;
        println!("{} appointments:", page.total_entries());
        for (i, appointment) in page.individual_appointments.iter().enumerate() {
            println!("{}", describe_appointment(i + 1, appointment));
        }
        Ok(())
    }

    async fn todays_appointments(&self) -> anyhow::Result<()> {
        let page = self.client.todays_appointments().await?;
        println!("Found {} appointments today", page.total_entries());
        for (i, appointment) in page.items().iter().take(self.preview).enumerate() {
            println!("{}", describe_appointment(i + 1, appointment));
        }
        Ok(())
    }

    async fn create_demo_patient(&self) -> anyhow::Result<()> {
        let stamp = Utc::now().timestamp_millis();
        let request = CreatePatientRequest {
            email: Some(format!("demo{}@example.com", stamp)),
            phone_number: Some("+61 400 000 000".to_string()),
            notes: Some("Created by the cliniko-demo quick start".to_string()),
            ..CreatePatientRequest::new("Demo", format!("User-{}", stamp))
        };
        let patient = self.client.create_patient(&request).await?;
        println!(
            "Created: {} (ID: {})",
            patient.full_name(),
            display_id(patient.id)
        );
        Ok(())
    }

    async fn search(&self, first_name: &str) -> anyhow::Result<()> {
        let page = self
            .client
            .search_patients(Some(first_name), None, None)
            .await?;
        println!(
            "Found {} patients matching \"{}\"",
            page.total_entries(),
            first_name
        );
        Ok(())
    }

    async fn create_and_update_patient(&self) -> anyhow::Result<()> {
        let request = CreatePatientRequest {
            date_of_birth: NaiveDate::from_ymd_opt(1990, 1, 1),
            gender: Some("Other".to_string()),
            email: Some("test.patient@example.com".to_string()),
            phone_number: Some("+61 400 123 456".to_string()),
            address_1: Some("123 Test Street".to_string()),
            city: Some("Sydney".to_string()),
            state: Some("NSW".to_string()),
            post_code: Some("2000".to_string()),
            country: Some("Australia".to_string()),
            notes: Some("Created by cliniko-demo".to_string()),
            ..CreatePatientRequest::new("Test", "Patient")
        };
        let patient = self.client.create_patient(&request).await?;
        let id = patient.id.context("created patient has no id")?;
        println!("Created patient: {} (ID: {})", patient.full_name(), id);

        let update = UpdatePatientRequest {
            phone_number: Some("+61 400 987 654".to_string()),
            notes: Some("Updated by cliniko-demo".to_string()),
            ..Default::default()
        };
        let updated = self.client.update_patient(id, &update).await?;
        println!(
            "Updated patient phone: {}",
            updated.phone_number.as_deref().unwrap_or("N/A")
        );
        Ok(())
    }

    async fn practitioners(&self) -> anyhow::Result<()> {
        let page = self.client.list_practitioners(&[], None).await?;
        println!("Found {} practitioners", page.total_entries());
        for (i, practitioner) in page.items().iter().take(self.preview).enumerate() {
            println!(
                "  {}. {} (ID: {})",
                i + 1,
                practitioner.display_name(),
                display_id(practitioner.id)
            );
        }
        Ok(())
    }

    async fn appointment_types(&self) -> anyhow::Result<()> {
        let page = self.client.list_appointment_types(&[]).await?;
        println!("Found {} appointment types", page.total_entries());
        for (i, kind) in page.items().iter().take(self.preview).enumerate() {
            println!(
                "  {}. {} ({} mins) - ID: {}",
                i + 1,
                kind.name,
                kind.duration_in_minutes,
                display_id(kind.id)
            );
        }
        Ok(())
    }

    async fn next_week(&self) -> anyhow::Result<()> {
        let start = Utc::now();
        let end = start + Duration::days(7);
        let page = self.client.appointments_by_date_range(&start, &end).await?;
        println!(
            "Found {} appointments in the next 7 days",
            page.total_entries()
        );
        Ok(())
    }

    async fn born_in_nineties(&self) -> anyhow::Result<()> {
        let filters = [
            QueryFilter::greater_or_equal("date_of_birth", "1990-01-01"),
            QueryFilter::less_than("date_of_birth", "2000-01-01"),
        ];
        let page = self.client.list_patients(&filters, None).await?;
        println!(
            "Found {} patients born in the 1990s",
            page.total_entries()
        );
        Ok(())
    }

    async fn book_appointment(&self) -> anyhow::Result<()> {
        let patients = self.client.list_patients(&[], None).await?;
        let practitioners = self.client.list_practitioners(&[], None).await?;
        let kinds = self.client.list_appointment_types(&[]).await?;
        let businesses = self.client.list_businesses().await?;

        let (Some(patient), Some(practitioner), Some(kind), Some(business)) = (
            patients.patients.first(),
            practitioners.practitioners.first(),
            kinds.appointment_types.first(),
            businesses.businesses.first(),
        ) else {
            println!(
                "Skipping: booking needs at least one patient, practitioner, appointment type and business."
            );
            return Ok(());
        };

        let starts_at = Utc::now() + Duration::days(1);
        let request = CreateAppointmentRequest {
            patient_id: patient.id.context("patient has no id")?,
            practitioner_id: practitioner.id.context("practitioner has no id")?,
            appointment_type_id: kind.id.context("appointment type has no id")?,
            business_id: business.id.context("business has no id")?,
            starts_at,
            ends_at: starts_at + Duration::hours(1),
            notes: Some("Booked by cliniko-demo".to_string()),
        };
        println!(
            "Booking {} with {} for {} at {}",
            patient.full_name(),
            practitioner.display_name(),
            kind.name,
            business.name
        );

        let created = self.client.create_appointment(&request).await?;
        let Some(id) = created.id else {
            bail!("created appointment has no id");
        };
        let details = self.client.get_appointment(id).await?;
        println!("{}", describe_appointment(1, &details));
        info!(appointment_id = id, "Demo appointment booked");
        Ok(())
    }
}

/// Awaits one demo step, logging its failure. Returns 1 if it failed.
async fn step<F>(name: &str, fut: F) -> usize
where
    F: Future<Output = anyhow::Result<()>>,
{
    match fut.await {
        Ok(()) => 0,
        Err(e) => {
            let message = format!("{:#}", e);
            error!(step = name, error = %message, "Demo step failed");
            1
        }
    }
}

fn display_id(id: Option<u64>) -> String {
    id.map_or_else(|| "?".to_string(), |id| id.to_string())
}

fn describe_patient(index: usize, patient: &Patient) -> String {
    let dob = patient
        .date_of_birth
        .map_or_else(|| "N/A".to_string(), |d| d.to_string());
    format!(
        "{}. {}\n   Email: {}\n   Phone: {}\n   DOB: {}\n",
        index,
        patient.full_name(),
        patient.email.as_deref().unwrap_or("N/A"),
        patient.phone_number.as_deref().unwrap_or("N/A"),
        dob
    )
}

fn describe_appointment(index: usize, appointment: &IndividualAppointment) -> String {
    let start = appointment.starts_at.with_timezone(&Local);
    let end = appointment.ends_at.with_timezone(&Local);
    format!(
        "{}. {} - {}\n   Patient ID: {}\n   Practitioner ID: {}\n   Notes: {}\n",
        index,
        start.format("%Y-%m-%d %H:%M"),
        end.format("%H:%M"),
        appointment.patient_id,
        appointment.practitioner_id,
        appointment.notes.as_deref().unwrap_or("None")
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use cliniko_tests::{MockCliniko, create_test_client};
    use serde_json::json;

    #[test]
    fn test_command_parse() {
        assert_eq!(Command::parse(Some("test")), Command::QuickStart);
        assert_eq!(Command::parse(Some("patients")), Command::Patients);
        assert_eq!(Command::parse(Some("appointments")), Command::Appointments);
        assert_eq!(Command::parse(Some("examples")), Command::Examples);
        assert_eq!(Command::parse(Some("help")), Command::Usage);
        assert_eq!(Command::parse(None), Command::Usage);
    }

    #[test]
    fn test_describe_patient_placeholders() {
        let patient = Patient {
            first_name: "Ada".to_string(),
            last_name: "Byron".to_string(),
            ..Default::default()
        };

        let text = describe_patient(2, &patient);
        assert!(text.starts_with("2. Ada Byron\n"));
        assert!(text.contains("Email: N/A"));
        assert!(text.contains("DOB: N/A"));
    }

    #[tokio::test]
    async fn test_quick_start_against_mock() {
        let mock = MockCliniko::start().await;
        let client = create_test_client(&mock).expect("Failed to create client");
        mock.seed("businesses", json!({"name": "Harbour Physio"}));

        let failures = Demo::new(&client, &DemoSettings::default())
            .run(Command::QuickStart)
            .await;

        assert_eq!(failures, 0);
        let search = mock.last_request();
        assert_eq!(search.filters(), vec!["first_name:~Demo"]);
    }

    #[tokio::test]
    async fn test_examples_books_appointment() {
        let mock = MockCliniko::start().await;
        let client = create_test_client(&mock).expect("Failed to create client");
        mock.seed("businesses", json!({"name": "Harbour Physio"}));
        mock.seed("practitioners", json!({"first_name": "Jo", "last_name": "Lee"}));
        mock.seed(
            "appointment_types",
            json!({"name": "Standard", "duration_in_minutes": 30}),
        );

        let failures = Demo::new(&client, &DemoSettings::default())
            .run(Command::Examples)
            .await;

        assert_eq!(failures, 0);
        assert!(
            mock.requests()
                .iter()
                .any(|r| r.method == "POST" && r.path == "/individual_appointments")
        );
    }

    #[tokio::test]
    async fn test_failed_step_is_counted() {
        let mock = MockCliniko::start().await;
        let client = create_test_client(&mock).expect("Failed to create client");

        mock.fail_next(500, &["Internal error"]);
        let failures = Demo::new(&client, &DemoSettings::default())
            .run(Command::Patients)
            .await;

        assert_eq!(failures, 1);
    }
}
