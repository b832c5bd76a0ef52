//! Filter-query building for list endpoints.
//!
//! Cliniko list endpoints take filters as a repeated `q[]` parameter where each
//! entry reads `<field>:<operator><value>`, e.g. `q[]=first_name:~john`. All
//! filters must match (AND). Range queries are expressed by repeating the
//! field with two operators, so the order of filters is preserved exactly.

use crate::error::Error;
use chrono::{DateTime, NaiveDate, NaiveTime, SecondsFormat, TimeDelta, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;


/// Name of the repeated filter parameter.
pub const FILTER_PARAM: &str = "q[]";

/// Name of the page parameter.
pub const PAGE_PARAM: &str = "page";

/// Appointment start field used by the date range helpers.
pub const STARTS_AT: &str = "starts_at";

/// Comparison operator of a filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FilterOperator {
    /// `=`
    #[serde(rename = "=")]
    Eq,
    /// `!=`
    #[serde(rename = "!=")]
    NotEq,
    /// `>`
    #[serde(rename = ">")]
    Gt,
    /// `<`
    #[serde(rename = "<")]
    Lt,
    /// `>=`
    #[serde(rename = ">=")]
    Gte,
    /// `<=`
    #[serde(rename = "<=")]
    Lte,
    /// `~`, fuzzy/contains match.
    #[serde(rename = "~")]
    Like,
}

impl FilterOperator {
    /// Wire form of the operator.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Eq => "=",
            Self::NotEq => "!=",
            Self::Gt => ">",
            Self::Lt => "<",
            Self::Gte => ">=",
            Self::Lte => "<=",
            Self::Like => "~",
        }
    }
}

impl fmt::Display for FilterOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Scalar value of a filter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FilterValue {
    /// Boolean.
    Bool(bool),
    /// Signed integer.
    Integer(i64),
    /// Unsigned integer, used for record identifiers.
    Unsigned(u64),
    /// Floating point number.
    Float(f64),
    /// Free text, dates and timestamps.
    Text(String),
}

impl fmt::Display for FilterValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(v) => write!(f, "{}", v),
            Self::Integer(v) => write!(f, "{}", v),
            Self::Unsigned(v) => write!(f, "{}", v),
            Self::Float(v) => write!(f, "{}", v),
            Self::Text(v) => f.write_str(v),
        }
    }
}

impl From<bool> for FilterValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<i32> for FilterValue {
    fn from(value: i32) -> Self {
        Self::Integer(i64::from(value))
    }
}

impl From<i64> for FilterValue {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

impl From<u32> for FilterValue {
    fn from(value: u32) -> Self {
        Self::Unsigned(u64::from(value))
    }
}

impl From<u64> for FilterValue {
    fn from(value: u64) -> Self {
        Self::Unsigned(value)
    }
}

impl From<f64> for FilterValue {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<&str> for FilterValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for FilterValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

/// A single `field`/`operator`/`value` filter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryFilter {
    /// Field name, e.g. `starts_at`.
    pub field: String,
    /// Comparison operator.
    pub operator: FilterOperator,
    /// Value compared against.
    pub value: FilterValue,
}

impl QueryFilter {
    /// Creates a filter.
    pub fn new(
        field: impl Into<String>,
        operator: FilterOperator,
        value: impl Into<FilterValue>,
    ) -> Self {
        Self {
            field: field.into(),
            operator,
            value: value.into(),
        }
    }

    /// `field = value`
    pub fn equals(field: impl Into<String>, value: impl Into<FilterValue>) -> Self {
        Self::new(field, FilterOperator::Eq, value)
    }

    /// `field != value`
    pub fn not_equals(field: impl Into<String>, value: impl Into<FilterValue>) -> Self {
        Self::new(field, FilterOperator::NotEq, value)
    }

    /// `field > value`
    pub fn greater_than(field: impl Into<String>, value: impl Into<FilterValue>) -> Self {
        Self::new(field, FilterOperator::Gt, value)
    }

    /// `field < value`
    pub fn less_than(field: impl Into<String>, value: impl Into<FilterValue>) -> Self {
        Self::new(field, FilterOperator::Lt, value)
    }

    /// `field >= value`
    pub fn greater_or_equal(field: impl Into<String>, value: impl Into<FilterValue>) -> Self {
        Self::new(field, FilterOperator::Gte, value)
    }

    /// `field <= value`
    pub fn less_or_equal(field: impl Into<String>, value: impl Into<FilterValue>) -> Self {
        Self::new(field, FilterOperator::Lte, value)
    }

    /// `field ~ value`
    pub fn fuzzy(field: impl Into<String>, value: impl Into<FilterValue>) -> Self {
        Self::new(field, FilterOperator::Like, value)
    }
}

impl fmt::Display for QueryFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}{}", self.field, self.operator, self.value)
    }
}

/// Query parameters of a list request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryParams {
    /// Formatted `q[]` entries, in filter order.
    pub filters: Vec<String>,
    /// Requested page, when any.
    pub page: Option<u32>,
}

impl QueryParams {
    /// Returns true when nothing would be sent.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.filters.is_empty() && self.page.is_none()
    }

    /// Key/value pairs in wire order: every `q[]` entry, then `page`.
    #[must_use]
    pub fn to_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs: Vec<(&'static str, String)> = self
            .filters
            .iter()
            .map(|filter| (FILTER_PARAM, filter.clone()))
            .collect();
        if let Some(page) = self.page {
            pairs.push((PAGE_PARAM, page.to_string()));
        }
        pairs
    }

    /// URL-encoded query string without the leading `?`.
    ///
    /// # Errors
    /// Returns error if the pairs cannot be encoded.
    pub fn to_query_string(&self) -> Result<String, serde_urlencoded::ser::Error> {
        if self.is_empty() {
            return Ok(String::new());
        }
        serde_urlencoded::to_string(self.to_pairs())
    }
}

/// Builds list query parameters from filters and an optional page.
///
/// Page `0` is treated as absent since Cliniko pages start at 1.
#[must_use]
pub fn build_query_params(filters: &[QueryFilter], page: Option<u32>) -> QueryParams {
    QueryParams {
        filters: filters.iter().map(ToString::to_string).collect(),
        page: page.filter(|p| *p > 0),
    }
}

// ============================================================================
// Derived Filters
// ============================================================================

/// Fuzzy filters for a patient search, in first name, last name, email order.
///
/// Empty strings are skipped. The server ANDs the filters, so a search on
/// several fields only matches patients that match every one of them.
#[must_use]
pub fn patient_search_filters(
    first_name: Option<&str>,
    last_name: Option<&str>,
    email: Option<&str>,
) -> Vec<QueryFilter> {
    [
        ("first_name", first_name),
        ("last_name", last_name),
        ("email", email),
    ]
    .into_iter()
    .filter_map(|(field, value)| {
        value
            .filter(|v| !v.is_empty())
            .map(|v| QueryFilter::fuzzy(field, v))
    })
    .collect()
}

/// Half-open `[midnight, next midnight)` range on `starts_at` for `date` in `tz`.
///
/// # Errors
/// Returns error if no local midnight can be resolved for the day.
pub fn day_range_filters<Tz: TimeZone>(
    date: NaiveDate,
    tz: &Tz,
) -> Result<Vec<QueryFilter>, Error> {
    let next_day = date
        .succ_opt()
        .ok_or_else(|| Error::InvalidRequest(format!("no day follows {}", date)))?;
    let start = local_midnight(date, tz)?;
    let end = local_midnight(next_day, tz)?;

    Ok(vec![
        QueryFilter::greater_or_equal(STARTS_AT, format_timestamp(&start)),
        QueryFilter::less_than(STARTS_AT, format_timestamp(&end)),
    ])
}

/// Closed `[start, end]` range on `starts_at`.
#[must_use]
pub fn date_range_filters(start: &DateTime<Utc>, end: &DateTime<Utc>) -> Vec<QueryFilter> {
    vec![
        QueryFilter::greater_or_equal(STARTS_AT, format_timestamp(start)),
        QueryFilter::less_or_equal(STARTS_AT, format_timestamp(end)),
    ]
}

/// ISO-8601 UTC timestamp with millisecond precision, e.g. `2025-01-01T00:00:00.000Z`.
#[must_use]
pub fn format_timestamp(timestamp: &DateTime<Utc>) -> String {
    timestamp.to_rfc3339_opts(SecondsFormat::Millis, true)
}

// Midnight can fall in a DST gap; the first valid instant that day is then 01:00.
fn local_midnight<Tz: TimeZone>(date: NaiveDate, tz: &Tz) -> Result<DateTime<Utc>, Error> {
    let midnight = date.and_time(NaiveTime::MIN);
    tz.from_local_datetime(&midnight)
        .earliest()
        .or_else(|| {
            tz.from_local_datetime(&(midnight + TimeDelta::hours(1)))
                .earliest()
        })
        .map(|local| local.with_timezone(&Utc))
        .ok_or_else(|| Error::InvalidRequest(format!("no local midnight on {}", date)))
}
