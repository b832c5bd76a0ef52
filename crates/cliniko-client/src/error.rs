//! Error types for the Cliniko client.

use thiserror::Error;


/// Client error types.
#[derive(Debug, Error)]
pub enum Error {
    /// No API key was given and `CLINIKO_API_KEY` is unset.
    #[error("API key is required")]
    MissingApiKey,

    /// No base URL was given and `CLINIKO_BASE_URL` is unset.
    #[error("Base URL is required")]
    MissingBaseUrl,

    /// Configuration value could not be used.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Invalid URL.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// HTTP request failed before a response was received.
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Query parameters could not be encoded.
    #[error("Query encoding error: {0}")]
    Query(#[from] serde_urlencoded::ser::Error),

    /// JSON serialization/deserialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The API answered 404.
    #[error("Not found: {}", display_errors(errors, body))]
    NotFound {
        /// Messages from the API error payload.
        errors: Vec<String>,
        /// Raw response body.
        body: String,
    },

    /// The API answered with any other non-2xx status.
    #[error("API error ({status}): {}", display_errors(errors, body))]
    Api {
        /// HTTP status code.
        status: u16,
        /// Messages from the API error payload.
        errors: Vec<String>,
        /// Raw response body.
        body: String,
    },

    /// Invalid request parameters.
    #[error("Invalid request: {0}")]
    InvalidRequest(String),
}

impl Error {
    /// HTTP status of the failed response, if the API answered at all.
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::NotFound { .. } => Some(404),
            Self::Api { status, .. } => Some(*status),
            Self::Http(err) => err.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    /// Messages from the API error payload, empty when there were none.
    #[must_use]
    pub fn api_errors(&self) -> &[String] {
        match self {
            Self::NotFound { errors, .. } | Self::Api { errors, .. } => errors,
            _ => &[],
        }
    }

    /// Returns true for a 404 from the API.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

fn display_errors(errors: &[String], body: &str) -> String {
    if errors.is_empty() {
        body.to_string()
    } else {
        errors.join("; ")
    }
}
