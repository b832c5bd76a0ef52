//! HTTP client for the Cliniko API.

use crate::error::Error;
use crate::query::{
    QueryFilter, build_query_params, date_range_filters, day_range_filters,
    patient_search_filters,
};
use crate::types::*;
use chrono::{DateTime, Local, Utc};
use reqwest::header::{ACCEPT, CONTENT_TYPE, HeaderMap, HeaderValue, USER_AGENT};
use reqwest::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use std::fmt;
use std::time::Duration;
use tracing::{debug, error, info, warn};

#[cfg(test)]
mod tests;

/// Environment variable holding the API key.
pub const API_KEY_ENV: &str = "CLINIKO_API_KEY";

/// Environment variable holding the base URL, e.g. `https://api.au1.cliniko.com/v1`.
pub const BASE_URL_ENV: &str = "CLINIKO_BASE_URL";

/// Environment variable holding the operator email used in the user agent.
pub const EMAIL_ENV: &str = "CLINIKO_EMAIL";

/// Default request timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Client configuration.
#[derive(Clone)]
pub struct ClientConfig {
    /// API key, sent as the basic auth username.
    pub api_key: String,
    /// Base URL of the API, including the version segment.
    pub base_url: String,
    /// Operator email advertised in the user agent.
    pub user_email: Option<String>,
    /// Request timeout.
    pub timeout: Duration,
}

impl fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientConfig")
            .field("api_key", &"<redacted>")
            .field("base_url", &self.base_url)
            .field("user_email", &self.user_email)
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl ClientConfig {
    /// Creates a configuration from an API key and base URL.
    pub fn new(api_key: impl Into<String>, base_url: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: base_url.into(),
            user_email: None,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }

    /// Sets the operator email.
    #[must_use]
    pub fn with_user_email(mut self, email: impl Into<String>) -> Self {
        self.user_email = Some(email.into());
        self
    }

    /// Sets the request timeout.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Resolves each value from the explicit argument, falling back to the
    /// process environment (`CLINIKO_API_KEY`, `CLINIKO_BASE_URL`, `CLINIKO_EMAIL`).
    ///
    /// # Errors
    /// Returns error if the API key or base URL is missing from both sources.
    pub fn resolve(
        api_key: Option<String>,
        base_url: Option<String>,
        user_email: Option<String>,
    ) -> Result<Self, Error> {
        Self::resolve_with(api_key, base_url, user_email, |name| {
            std::env::var(name).ok()
        })
    }

    /// Same as [`ClientConfig::resolve`] with a custom variable lookup.
    ///
    /// # Errors
    /// Returns error if the API key or base URL is missing from both sources.
    pub fn resolve_with<F>(
        api_key: Option<String>,
        base_url: Option<String>,
        user_email: Option<String>,
        lookup: F,
    ) -> Result<Self, Error>
    where
        F: Fn(&str) -> Option<String>,
    {
        let pick = |explicit: Option<String>, name: &str| {
            explicit
                .filter(|v| !v.is_empty())
                .or_else(|| lookup(name).filter(|v| !v.is_empty()))
        };

        let api_key = pick(api_key, API_KEY_ENV).ok_or(Error::MissingApiKey)?;
        let base_url = pick(base_url, BASE_URL_ENV).ok_or(Error::MissingBaseUrl)?;
        let user_email = pick(user_email, EMAIL_ENV);

        Ok(Self {
            api_key,
            base_url,
            user_email,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        })
    }

    /// Validates the configuration.
    ///
    /// # Errors
    /// Returns error if the key or URL is empty or the URL does not parse.
    pub fn validate(&self) -> Result<(), Error> {
        if self.api_key.is_empty() {
            return Err(Error::MissingApiKey);
        }
        if self.base_url.is_empty() {
            return Err(Error::MissingBaseUrl);
        }
        let url = url::Url::parse(&self.base_url)?;
        if url.scheme() != "http" && url.scheme() != "https" {
            return Err(Error::InvalidConfig(format!(
                "base URL must use http or https, got {}",
                url.scheme()
            )));
        }
        Ok(())
    }

    /// User agent sent with every request.
    #[must_use]
    pub fn user_agent(&self) -> String {
        format!(
            "Cliniko Rust Client ({})",
            self.user_email.as_deref().unwrap_or("no-email-provided")
        )
    }
}

/// HTTP client for the Cliniko API.
#[derive(Clone)]
pub struct ClinikoClient {
    client: Client,
    base_url: String,
    api_key: String,
}

impl fmt::Debug for ClinikoClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClinikoClient")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

impl ClinikoClient {
    /// Creates a new client with the given configuration.
    ///
    /// # Errors
    /// Returns error if the configuration is invalid or the HTTP client
    /// cannot be built. No request is sent.
    pub fn new(config: ClientConfig) -> Result<Self, Error> {
        config.validate()?;

        let user_agent = HeaderValue::from_str(&config.user_agent())
            .map_err(|e| Error::InvalidConfig(format!("user agent: {}", e)))?;

        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(USER_AGENT, user_agent);

        let client = Client::builder()
            .timeout(config.timeout)
            .default_headers(headers)
            .build()?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key,
        })
    }

    /// Creates a client configured entirely from the process environment.
    ///
    /// # Errors
    /// Returns error if `CLINIKO_API_KEY` or `CLINIKO_BASE_URL` is unset.
    pub fn from_env() -> Result<Self, Error> {
        Self::new(ClientConfig::resolve(None, None, None)?)
    }

    /// Base URL requests are sent to, without trailing slash.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    // ========================================================================
    // Patients
    // ========================================================================

    /// Lists patients matching all `filters`.
    ///
    /// # Errors
    /// Returns error if the request fails.
    pub async fn list_patients(
        &self,
        filters: &[QueryFilter],
        page: Option<u32>,
    ) -> Result<PatientsPage, Error> {
        let url = self.list_url("patients", filters, page)?;
        let resp = self.send(self.client.get(&url)).await?;
        self.handle_response(resp).await
    }

    /// Gets a patient by ID.
    ///
    /// # Errors
    /// Returns [`Error::NotFound`] for an unknown ID.
    pub async fn get_patient(&self, id: u64) -> Result<Patient, Error> {
        let url = format!("{}/patients/{}", self.base_url, id);
        let resp = self.send(self.client.get(&url)).await?;
        self.handle_response(resp).await
    }

    /// Creates a patient.
    ///
    /// # Errors
    /// Returns error if the request fails.
    pub async fn create_patient(&self, request: &CreatePatientRequest) -> Result<Patient, Error> {
        let url = format!("{}/patients", self.base_url);
        let resp = self.send(self.client.post(&url).json(request)).await?;
        self.handle_response(resp).await
    }

    /// Updates the fields set in `request`.
    ///
    /// # Errors
    /// Returns error if the request fails.
    pub async fn update_patient(
        &self,
        id: u64,
        request: &UpdatePatientRequest,
    ) -> Result<Patient, Error> {
        let url = format!("{}/patients/{}", self.base_url, id);
        let resp = self.send(self.client.put(&url).json(request)).await?;
        self.handle_response(resp).await
    }

    /// Deletes a patient.
    ///
    /// # Errors
    /// Returns error if the request fails.
    pub async fn delete_patient(&self, id: u64) -> Result<(), Error> {
        let url = format!("{}/patients/{}", self.base_url, id);
        let resp = self.send(self.client.delete(&url)).await?;
        self.handle_empty_response(resp).await
    }

    /// Fuzzy search on first name, last name and email.
    ///
    /// Every supplied field must match; this is not an "any field" search.
    ///
    /// # Errors
    /// Returns error if the request fails.
    pub async fn search_patients(
        &self,
        first_name: Option<&str>,
        last_name: Option<&str>,
        email: Option<&str>,
    ) -> Result<PatientsPage, Error> {
        let filters = patient_search_filters(first_name, last_name, email);
        self.list_patients(&filters, None).await
    }

    // ========================================================================
    // Practitioners
    // ========================================================================

    /// Lists practitioners matching all `filters`.
    ///
    /// # Errors
    /// Returns error if the request fails.
    pub async fn list_practitioners(
        &self,
        filters: &[QueryFilter],
        page: Option<u32>,
    ) -> Result<PractitionersPage, Error> {
        let url = self.list_url("practitioners", filters, page)?;
        let resp = self.send(self.client.get(&url)).await?;
        self.handle_response(resp).await
    }

    /// Gets a practitioner by ID.
    ///
    /// # Errors
    /// Returns [`Error::NotFound`] for an unknown ID.
    pub async fn get_practitioner(&self, id: u64) -> Result<Practitioner, Error> {
        let url = format!("{}/practitioners/{}", self.base_url, id);
        let resp = self.send(self.client.get(&url)).await?;
        self.handle_response(resp).await
    }

    /// Creates a practitioner.
    ///
    /// # Errors
    /// Returns error if the request fails.
    pub async fn create_practitioner(
        &self,
        request: &CreatePractitionerRequest,
    ) -> Result<Practitioner, Error> {
        let url = format!("{}/practitioners", self.base_url);
        let resp = self.send(self.client.post(&url).json(request)).await?;
        self.handle_response(resp).await
    }

    /// Updates the fields set in `request`.
    ///
    /// # Errors
    /// Returns error if the request fails.
    pub async fn update_practitioner(
        &self,
        id: u64,
        request: &UpdatePractitionerRequest,
    ) -> Result<Practitioner, Error> {
        let url = format!("{}/practitioners/{}", self.base_url, id);
        let resp = self.send(self.client.put(&url).json(request)).await?;
        self.handle_response(resp).await
    }

    // ========================================================================
    // Individual Appointments
    // ========================================================================

    /// Lists appointments matching all `filters`.
    ///
    /// # Errors
    /// Returns error if the request fails.
    pub async fn list_appointments(
        &self,
        filters: &[QueryFilter],
        page: Option<u32>,
    ) -> Result<IndividualAppointmentsPage, Error> {
        let url = self.list_url("individual_appointments", filters, page)?;
        let resp = self.send(self.client.get(&url)).await?;
        self.handle_response(resp).await
    }

    /// Gets an appointment by ID.
    ///
    /// # Errors
    /// Returns [`Error::NotFound`] for an unknown ID.
    pub async fn get_appointment(&self, id: u64) -> Result<IndividualAppointment, Error> {
        let url = format!("{}/individual_appointments/{}", self.base_url, id);
        let resp = self.send(self.client.get(&url)).await?;
        self.handle_response(resp).await
    }

    /// Books an appointment.
    ///
    /// # Errors
    /// Returns error if the request fails.
    pub async fn create_appointment(
        &self,
        request: &CreateAppointmentRequest,
    ) -> Result<IndividualAppointment, Error> {
        let url = format!("{}/individual_appointments", self.base_url);
        let resp = self.send(self.client.post(&url).json(request)).await?;
        self.handle_response(resp).await
    }

    /// Updates the fields set in `request`.
    ///
    /// # Errors
    /// Returns error if the request fails.
    pub async fn update_appointment(
        &self,
        id: u64,
        request: &UpdateAppointmentRequest,
    ) -> Result<IndividualAppointment, Error> {
        let url = format!("{}/individual_appointments/{}", self.base_url, id);
        let resp = self.send(self.client.put(&url).json(request)).await?;
        self.handle_response(resp).await
    }

    /// Cancels an appointment.
    ///
    /// The reason travels in the body of a DELETE request. Some proxies strip
    /// DELETE bodies, in which case the cancellation goes through without it.
    ///
    /// # Errors
    /// Returns error if the request fails.
    pub async fn cancel_appointment(&self, id: u64, reason: Option<&str>) -> Result<(), Error> {
        let url = format!("{}/individual_appointments/{}", self.base_url, id);
        let body = CancelAppointmentRequest {
            cancellation_reason: reason.map(str::to_string),
        };
        let resp = self.send(self.client.delete(&url).json(&body)).await?;
        self.handle_empty_response(resp).await
    }

    /// Appointments starting today, in the local time zone.
    ///
    /// # Errors
    /// Returns error if the request fails.
    pub async fn todays_appointments(&self) -> Result<IndividualAppointmentsPage, Error> {
        let filters = day_range_filters(Local::now().date_naive(), &Local)?;
        self.list_appointments(&filters, None).await
    }

    /// Appointments starting between `start` and `end`, both inclusive.
    ///
    /// # Errors
    /// Returns error if the request fails.
    pub async fn appointments_by_date_range(
        &self,
        start: &DateTime<Utc>,
        end: &DateTime<Utc>,
    ) -> Result<IndividualAppointmentsPage, Error> {
        let filters = date_range_filters(start, end);
        self.list_appointments(&filters, None).await
    }

    // ========================================================================
    // Appointment Types
    // ========================================================================

    /// Lists appointment types matching all `filters`.
    ///
    /// # Errors
    /// Returns error if the request fails.
    pub async fn list_appointment_types(
        &self,
        filters: &[QueryFilter],
    ) -> Result<AppointmentTypesPage, Error> {
        let url = self.list_url("appointment_types", filters, None)?;
        let resp = self.send(self.client.get(&url)).await?;
        self.handle_response(resp).await
    }

    /// Gets an appointment type by ID.
    ///
    /// # Errors
    /// Returns [`Error::NotFound`] for an unknown ID.
    pub async fn get_appointment_type(&self, id: u64) -> Result<AppointmentType, Error> {
        let url = format!("{}/appointment_types/{}", self.base_url, id);
        let resp = self.send(self.client.get(&url)).await?;
        self.handle_response(resp).await
    }

    /// Creates an appointment type.
    ///
    /// # Errors
    /// Returns error if the request fails.
    pub async fn create_appointment_type(
        &self,
        request: &CreateAppointmentTypeRequest,
    ) -> Result<AppointmentType, Error> {
        let url = format!("{}/appointment_types", self.base_url);
        let resp = self.send(self.client.post(&url).json(request)).await?;
        self.handle_response(resp).await
    }

    // ========================================================================
    // Businesses
    // ========================================================================

    /// Lists businesses.
    ///
    /// # Errors
    /// Returns error if the request fails.
    pub async fn list_businesses(&self) -> Result<BusinessesPage, Error> {
        let url = format!("{}/businesses", self.base_url);
        let resp = self.send(self.client.get(&url)).await?;
        self.handle_response(resp).await
    }

    /// Gets a business by ID.
    ///
    /// # Errors
    /// Returns [`Error::NotFound`] for an unknown ID.
    pub async fn get_business(&self, id: u64) -> Result<Business, Error> {
        let url = format!("{}/businesses/{}", self.base_url, id);
        let resp = self.send(self.client.get(&url)).await?;
        self.handle_response(resp).await
    }

    // ========================================================================
    // Treatment Notes
    // ========================================================================

    /// Lists treatment notes matching all `filters`.
    ///
    /// # Errors
    /// Returns error if the request fails.
    pub async fn list_treatment_notes(
        &self,
        filters: &[QueryFilter],
        page: Option<u32>,
    ) -> Result<TreatmentNotesPage, Error> {
        let url = self.list_url("treatment_notes", filters, page)?;
        let resp = self.send(self.client.get(&url)).await?;
        self.handle_response(resp).await
    }

    /// Gets a treatment note by ID.
    ///
    /// # Errors
    /// Returns [`Error::NotFound`] for an unknown ID.
    pub async fn get_treatment_note(&self, id: u64) -> Result<TreatmentNote, Error> {
        let url = format!("{}/treatment_notes/{}", self.base_url, id);
        let resp = self.send(self.client.get(&url)).await?;
        self.handle_response(resp).await
    }

    /// Creates a treatment note.
    ///
    /// # Errors
    /// Returns error if the request fails.
    pub async fn create_treatment_note(
        &self,
        request: &CreateTreatmentNoteRequest,
    ) -> Result<TreatmentNote, Error> {
        let url = format!("{}/treatment_notes", self.base_url);
        let resp = self.send(self.client.post(&url).json(request)).await?;
        self.handle_response(resp).await
    }

    /// Updates the fields set in `request`.
    ///
    /// # Errors
    /// Returns error if the request fails.
    pub async fn update_treatment_note(
        &self,
        id: u64,
        request: &UpdateTreatmentNoteRequest,
    ) -> Result<TreatmentNote, Error> {
        let url = format!("{}/treatment_notes/{}", self.base_url, id);
        let resp = self.send(self.client.put(&url).json(request)).await?;
        self.handle_response(resp).await
    }

    /// Treatment notes written for a patient.
    ///
    /// # Errors
    /// Returns error if the request fails.
    pub async fn treatment_notes_for_patient(
        &self,
        patient_id: u64,
    ) -> Result<TreatmentNotesPage, Error> {
        let filters = [QueryFilter::equals("patient_id", patient_id)];
        self.list_treatment_notes(&filters, None).await
    }

    // ========================================================================
    // Account
    // ========================================================================

    /// Checks that the API is reachable with the configured credentials.
    pub async fn test_connection(&self) -> bool {
        match self.list_businesses().await {
            Ok(_) => {
                info!(base_url = %self.base_url, "Connected to Cliniko API");
                true
            }
            Err(e) => {
                warn!(error = %e, "Failed to connect to Cliniko API");
                false
            }
        }
    }

    /// Fetches businesses, then practitioners.
    ///
    /// # Errors
    /// Returns error if either request fails.
    pub async fn account_info(&self) -> Result<AccountInfo, Error> {
        let businesses = self.list_businesses().await?;
        let practitioners = self.list_practitioners(&[], None).await?;
        Ok(AccountInfo {
            businesses,
            practitioners,
        })
    }

    // ========================================================================
    // Internal Helpers
    // ========================================================================

    fn list_url(
        &self,
        resource: &str,
        filters: &[QueryFilter],
        page: Option<u32>,
    ) -> Result<String, Error> {
        let mut url = format!("{}/{}", self.base_url, resource);
        let params = build_query_params(filters, page).to_query_string()?;
        if !params.is_empty() {
            url.push('?');
            url.push_str(&params);
        }
        Ok(url)
    }

    /// Sends the request with credentials attached. Transport failures are
    /// logged here, status failures by [`Self::check_status`] and body
    /// failures by [`Self::handle_response`].
    async fn send(&self, request: RequestBuilder) -> Result<Response, Error> {
        let request = request.basic_auth(&self.api_key, Some(""));
        match request.send().await {
            Ok(resp) => {
                debug!(status = resp.status().as_u16(), url = %resp.url(), "Cliniko response");
                Ok(resp)
            }
            Err(e) => {
                error!(error = %e, "API Error: request failed");
                Err(Error::Http(e))
            }
        }
    }

    /// Decodes a successful response. Body read and decode failures are
    /// logged here, once.
    async fn handle_response<T: DeserializeOwned>(&self, resp: Response) -> Result<T, Error> {
        let resp = self.check_status(resp).await?;
        let status = resp.status().as_u16();
        let bytes = match resp.bytes().await {
            Ok(bytes) => bytes,
            Err(e) => {
                error!(status, error = %e, "API Error: failed to read response body");
                return Err(Error::Http(e));
            }
        };
        serde_json::from_slice(&bytes).map_err(|e| {
            error!(status, error = %e, "API Error: unexpected response body");
            Error::Json(e)
        })
    }

    async fn handle_empty_response(&self, resp: Response) -> Result<(), Error> {
        self.check_status(resp).await.map(|_| ())
    }

    async fn check_status(&self, resp: Response) -> Result<Response, Error> {
        let status = resp.status();
        if status.is_success() {
            return Ok(resp);
        }

        let body = resp.text().await.unwrap_or_default();
        let errors = serde_json::from_str::<ApiErrorBody>(&body)
            .map(|payload| payload.errors)
            .unwrap_or_default();

        if errors.is_empty() {
            error!(status = status.as_u16(), body = %body, "API Error");
        } else {
            error!(status = status.as_u16(), errors = ?errors, "API Error");
        }

        if status.as_u16() == 404 {
            Err(Error::NotFound { errors, body })
        } else {
            Err(Error::Api {
                status: status.as_u16(),
                errors,
                body,
            })
        }
    }
}
