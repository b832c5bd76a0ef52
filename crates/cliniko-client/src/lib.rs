//! HTTP client library for the Cliniko practice-management API.
//!
//! This crate provides a typed client for the Cliniko REST API: patients,
//! practitioners, individual appointments, appointment types, businesses and
//! treatment notes. List endpoints accept `q[]` filters built with
//! [`QueryFilter`] and return one page type per resource.
//!
//! # Example
//!
//! ```no_run
//! use cliniko_client::{ClientConfig, ClinikoClient, QueryFilter};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), cliniko_client::Error> {
//!     let config = ClientConfig::resolve(None, None, None)?;
//!     let client = ClinikoClient::new(config)?;
//!
//!     let filters = [QueryFilter::fuzzy("last_name", "Smith")];
//!     let page = client.list_patients(&filters, Some(1)).await?;
//!     for patient in &page.patients {
//!         println!("{}", patient.full_name());
//!     }
//!
//!     Ok(())
//! }
//! ```

mod client;
mod error;
mod query;
mod types;

pub use client::{
    API_KEY_ENV, BASE_URL_ENV, ClientConfig, ClinikoClient, DEFAULT_TIMEOUT_SECS, EMAIL_ENV,
};
pub use error::Error;
pub use query::{
    FILTER_PARAM, FilterOperator, FilterValue, PAGE_PARAM, QueryFilter, QueryParams, STARTS_AT,
    build_query_params, date_range_filters, day_range_filters, format_timestamp,
    patient_search_filters,
};
pub use types::*;
