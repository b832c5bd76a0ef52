//! In-memory mock of the Cliniko REST API.
//!
//! Records are stored as JSON objects per resource. Every request is recorded
//! (method, path, decoded query pairs, authorization, user agent, body) so
//! tests can assert on exactly what the client put on the wire.

use axum::Router;
use axum::body::Bytes;
use axum::extract::{Path, RawQuery, State};
use axum::http::{HeaderMap, Method, StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::routing::any;
use chrono::{DateTime, FixedOffset, SecondsFormat, Utc};
use parking_lot::Mutex;
use serde_json::{Map, Value, json};
use std::collections::{BTreeMap, HashMap, VecDeque};
use std::sync::Arc;
use tokio::net::TcpListener;

/// Resources served by the mock, with the fields required on create.
const RESOURCES: &[(&str, &[&str])] = &[
    ("patients", &["first_name", "last_name"]),
    ("practitioners", &["first_name", "last_name"]),
    (
        "individual_appointments",
        &[
            "patient_id",
            "practitioner_id",
            "appointment_type_id",
            "business_id",
            "starts_at",
            "ends_at",
        ],
    ),
    ("appointment_types", &["name", "duration_in_minutes"]),
    ("businesses", &["name"]),
    ("treatment_notes", &["patient_id", "practitioner_id", "body"]),
];

/// Default number of records per page.
pub const DEFAULT_PAGE_SIZE: usize = 50;

/// A request as received by the mock.
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    /// HTTP method.
    pub method: Method,
    /// Request path, e.g. `/patients/1`.
    pub path: String,
    /// Decoded query pairs in wire order.
    pub query: Vec<(String, String)>,
    /// `Authorization` header value.
    pub authorization: Option<String>,
    /// `User-Agent` header value.
    pub user_agent: Option<String>,
    /// `Accept` header value.
    pub accept: Option<String>,
    /// Parsed JSON body, when one was sent.
    pub body: Option<Value>,
}

impl RecordedRequest {
    /// Values of every `q[]` parameter, in order.
    #[must_use]
    pub fn filters(&self) -> Vec<String> {
        self.query
            .iter()
            .filter(|(k, _)| k == "q[]")
            .map(|(_, v)| v.clone())
            .collect()
    }

    /// Value of the `page` parameter.
    #[must_use]
    pub fn page(&self) -> Option<String> {
        self.query
            .iter()
            .find(|(k, _)| k == "page")
            .map(|(_, v)| v.clone())
    }

    /// Returns true if any `q[]` parameter was sent.
    #[must_use]
    pub fn has_filter_param(&self) -> bool {
        self.query.iter().any(|(k, _)| k == "q[]")
    }
}

#[derive(Default)]
struct Store {
    next_id: u64,
    records: HashMap<String, BTreeMap<u64, Value>>,
    requests: Vec<RecordedRequest>,
    injected: VecDeque<(StatusCode, Value)>,
}

struct MockState {
    base_url: String,
    page_size: usize,
    store: Mutex<Store>,
}

/// Running mock server bound to an ephemeral local port.
#[derive(Clone)]
pub struct MockCliniko {
    state: Arc<MockState>,
}

impl MockCliniko {
    /// Starts a mock with the default page size.
    ///
    /// # Panics
    /// Panics if no local port can be bound.
    pub async fn start() -> Self {
        Self::start_with_page_size(DEFAULT_PAGE_SIZE).await
    }

    /// Starts a mock that returns at most `page_size` records per page.
    ///
    /// # Panics
    /// Panics if no local port can be bound.
    pub async fn start_with_page_size(page_size: usize) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind mock listener");
        let addr = listener.local_addr().expect("mock listener address");

        let state = Arc::new(MockState {
            base_url: format!("http://{}/v1", addr),
            page_size: page_size.max(1),
            store: Mutex::new(Store {
                next_id: 1,
                ..Default::default()
            }),
        });

        let app = Router::new()
            .route("/v1/{resource}", any(collection))
            .route("/v1/{resource}/{id}", any(member))
            .with_state(Arc::clone(&state));

        tokio::spawn(async move {
            if let Err(e) = axum::serve(listener, app).await {
                tracing::error!(error = %e, "Mock Cliniko server stopped");
            }
        });

        Self { state }
    }

    /// Base URL to hand to the client.
    #[must_use]
    pub fn base_url(&self) -> String {
        self.state.base_url.clone()
    }

    /// Inserts a record directly, bypassing validation. Returns its ID.
    pub fn seed(&self, resource: &str, record: Value) -> u64 {
        let mut store = self.state.store.lock();
        let id = store.next_id;
        store.next_id += 1;
        let record = finalize_record(&self.state.base_url, resource, id, record);
        store
            .records
            .entry(resource.to_string())
            .or_default()
            .insert(id, record);
        id
    }

    /// Current stored version of a record.
    #[must_use]
    pub fn record(&self, resource: &str, id: u64) -> Option<Value> {
        self.state
            .store
            .lock()
            .records
            .get(resource)
            .and_then(|records| records.get(&id))
            .cloned()
    }

    /// Makes the next request fail with `status` and the given error messages.
    pub fn fail_next(&self, status: u16, errors: &[&str]) {
        self.respond_next(status, json!({ "errors": errors }));
    }

    /// Answers the next request with `status` and `body`, whatever it asks for.
    pub fn respond_next(&self, status: u16, body: Value) {
        let status = StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        self.state.store.lock().injected.push_back((status, body));
    }

    /// Every request received so far.
    #[must_use]
    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.state.store.lock().requests.clone()
    }

    /// The most recent request.
    ///
    /// # Panics
    /// Panics if no request was received.
    #[must_use]
    pub fn last_request(&self) -> RecordedRequest {
        self.state
            .store
            .lock()
            .requests
            .last()
            .cloned()
            .expect("mock received no request")
    }
}

// ============================================================================
// Handlers
// ============================================================================

async fn collection(
    State(state): State<Arc<MockState>>,
    Path(resource): Path<String>,
    method: Method,
    RawQuery(raw_query): RawQuery,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let path = format!("/{}", resource);
    let query = decode_query(raw_query.as_deref());
    if let Some(resp) = admit(&state, &method, &path, &query, &headers, &body) {
        return resp;
    }
    let Some(required) = required_fields(&resource) else {
        return error_response(StatusCode::NOT_FOUND, &["Unknown resource"]);
    };

    match method {
        Method::GET => list(&state, &resource, &query),
        Method::POST if resource != "businesses" => {
            create(&state, &resource, required, &body)
        }
        _ => error_response(StatusCode::METHOD_NOT_ALLOWED, &["Method not allowed"]),
    }
}

async fn member(
    State(state): State<Arc<MockState>>,
    Path((resource, id)): Path<(String, String)>,
    method: Method,
    RawQuery(raw_query): RawQuery,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let path = format!("/{}/{}", resource, id);
    let query = decode_query(raw_query.as_deref());
    if let Some(resp) = admit(&state, &method, &path, &query, &headers, &body) {
        return resp;
    }
    if required_fields(&resource).is_none() {
        return error_response(StatusCode::NOT_FOUND, &["Unknown resource"]);
    }
    let Ok(id) = id.parse::<u64>() else {
        return error_response(StatusCode::NOT_FOUND, &["Not found"]);
    };

    match method {
        Method::GET => fetch(&state, &resource, id),
        Method::PUT => update(&state, &resource, id, &body),
        Method::DELETE if resource == "patients" => remove(&state, &resource, id),
        Method::DELETE if resource == "individual_appointments" => cancel(&state, id, &body),
        _ => error_response(StatusCode::METHOD_NOT_ALLOWED, &["Method not allowed"]),
    }
}

/// Records the request and applies auth and injected failures.
fn admit(
    state: &MockState,
    method: &Method,
    path: &str,
    query: &[(String, String)],
    headers: &HeaderMap,
    body: &Bytes,
) -> Option<Response> {
    let header_value = |name: header::HeaderName| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
    };
    let authorization = header_value(header::AUTHORIZATION);

    let mut store = state.store.lock();
    store.requests.push(RecordedRequest {
        method: method.clone(),
        path: path.to_string(),
        query: query.to_vec(),
        authorization: authorization.clone(),
        user_agent: header_value(header::USER_AGENT),
        accept: header_value(header::ACCEPT),
        body: serde_json::from_slice(body).ok(),
    });

    if !authorization.is_some_and(|v| v.starts_with("Basic ")) {
        return Some(error_response(
            StatusCode::UNAUTHORIZED,
            &["You must be authenticated"],
        ));
    }

    store
        .injected
        .pop_front()
        .map(|(status, payload)| (status, axum::Json(payload)).into_response())
}

fn list(state: &MockState, resource: &str, query: &[(String, String)]) -> Response {
    let filters: Vec<&str> = query
        .iter()
        .filter(|(k, _)| k == "q[]")
        .map(|(_, v)| v.as_str())
        .collect();
    let mut parsed = Vec::with_capacity(filters.len());
    for filter in filters {
        match parse_filter(filter) {
            Some(f) => parsed.push(f),
            None => {
                return error_response(
                    StatusCode::BAD_REQUEST,
                    &[format!("Invalid filter: {}", filter).as_str()],
                );
            }
        }
    }
    let page: usize = query
        .iter()
        .find(|(k, _)| k == "page")
        .and_then(|(_, v)| v.parse().ok())
        .filter(|p| *p > 0)
        .unwrap_or(1);

    let store = state.store.lock();
    let matching: Vec<Value> = store
        .records
        .get(resource)
        .map(|records| {
            records
                .values()
                .filter(|record| parsed.iter().all(|f| f.matches(record)))
                .cloned()
                .collect()
        })
        .unwrap_or_default();
    drop(store);

    let total = matching.len();
    let start = (page - 1) * state.page_size;
    let items: Vec<Value> = matching
        .into_iter()
        .skip(start)
        .take(state.page_size)
        .collect();

    let page_url = |p: usize| format!("{}/{}?page={}", state.base_url, resource, p);
    let mut links = Map::new();
    links.insert("self".to_string(), json!(page_url(page)));
    if start + state.page_size < total {
        links.insert("next".to_string(), json!(page_url(page + 1)));
    }
    if page > 1 {
        links.insert("previous".to_string(), json!(page_url(page - 1)));
    }

    let mut envelope = Map::new();
    envelope.insert("total_entries".to_string(), json!(total));
    envelope.insert("links".to_string(), Value::Object(links));
    envelope.insert(resource.to_string(), Value::Array(items));
    (StatusCode::OK, axum::Json(Value::Object(envelope))).into_response()
}

fn create(state: &MockState, resource: &str, required: &[&str], body: &Bytes) -> Response {
    let Ok(Value::Object(input)) = serde_json::from_slice::<Value>(body) else {
        return error_response(StatusCode::BAD_REQUEST, &["Body must be a JSON object"]);
    };

    let missing: Vec<String> = required
        .iter()
        .filter(|field| match input.get(**field) {
            None | Some(Value::Null) => true,
            Some(Value::String(s)) => s.is_empty(),
            Some(_) => false,
        })
        .map(|field| format!("{} can't be blank", humanize(field)))
        .collect();
    if !missing.is_empty() {
        let messages: Vec<&str> = missing.iter().map(String::as_str).collect();
        return error_response(StatusCode::UNPROCESSABLE_ENTITY, &messages);
    }

    let mut store = state.store.lock();
    let id = store.next_id;
    store.next_id += 1;
    let record = finalize_record(&state.base_url, resource, id, Value::Object(input));
    store
        .records
        .entry(resource.to_string())
        .or_default()
        .insert(id, record.clone());
    (StatusCode::CREATED, axum::Json(record)).into_response()
}

fn fetch(state: &MockState, resource: &str, id: u64) -> Response {
    let store = state.store.lock();
    match store.records.get(resource).and_then(|r| r.get(&id)) {
        Some(record) => (StatusCode::OK, axum::Json(record.clone())).into_response(),
        None => error_response(StatusCode::NOT_FOUND, &["Not found"]),
    }
}

fn update(state: &MockState, resource: &str, id: u64, body: &Bytes) -> Response {
    let Ok(Value::Object(changes)) = serde_json::from_slice::<Value>(body) else {
        return error_response(StatusCode::BAD_REQUEST, &["Body must be a JSON object"]);
    };

    let mut store = state.store.lock();
    let Some(Value::Object(record)) = store
        .records
        .get_mut(resource)
        .and_then(|r| r.get_mut(&id))
    else {
        return error_response(StatusCode::NOT_FOUND, &["Not found"]);
    };

    for (key, value) in changes {
        if key != "id" && key != "links" {
            record.insert(key, value);
        }
    }
    record.insert("updated_at".to_string(), json!(timestamp_now()));
    (StatusCode::OK, axum::Json(Value::Object(record.clone()))).into_response()
}

fn remove(state: &MockState, resource: &str, id: u64) -> Response {
    let mut store = state.store.lock();
    match store.records.get_mut(resource).and_then(|r| r.remove(&id)) {
        Some(_) => StatusCode::NO_CONTENT.into_response(),
        None => error_response(StatusCode::NOT_FOUND, &["Not found"]),
    }
}

fn cancel(state: &MockState, id: u64, body: &Bytes) -> Response {
    let reason = serde_json::from_slice::<Value>(body)
        .ok()
        .and_then(|v| v.get("cancellation_reason").cloned());

    let mut store = state.store.lock();
    let Some(Value::Object(record)) = store
        .records
        .get_mut("individual_appointments")
        .and_then(|r| r.get_mut(&id))
    else {
        return error_response(StatusCode::NOT_FOUND, &["Not found"]);
    };

    record.insert("cancelled_at".to_string(), json!(timestamp_now()));
    if let Some(reason) = reason {
        record.insert("cancellation_reason".to_string(), reason);
    }
    StatusCode::NO_CONTENT.into_response()
}

// ============================================================================
// Filters
// ============================================================================

struct MockFilter {
    field: String,
    operator: &'static str,
    value: String,
}

impl MockFilter {
    fn matches(&self, record: &Value) -> bool {
        let actual = match record.get(&self.field) {
            Some(Value::String(s)) => s.clone(),
            Some(Value::Null) | None => return self.operator == "!=",
            Some(other) => other.to_string(),
        };

        match self.operator {
            "~" => actual.to_lowercase().contains(&self.value.to_lowercase()),
            "=" => compare(&actual, &self.value).is_eq(),
            "!=" => compare(&actual, &self.value).is_ne(),
            ">" => compare(&actual, &self.value).is_gt(),
            "<" => compare(&actual, &self.value).is_lt(),
            ">=" => compare(&actual, &self.value).is_ge(),
            "<=" => compare(&actual, &self.value).is_le(),
            _ => false,
        }
    }
}

fn parse_filter(raw: &str) -> Option<MockFilter> {
    const OPERATORS: [&str; 7] = [">=", "<=", "!=", "=", ">", "<", "~"];

    let (field, rest) = raw.split_once(':')?;
    if field.is_empty() {
        return None;
    }
    let operator = OPERATORS.into_iter().find(|op| rest.starts_with(op))?;
    Some(MockFilter {
        field: field.to_string(),
        operator,
        value: rest[operator.len()..].to_string(),
    })
}

fn compare(actual: &str, expected: &str) -> std::cmp::Ordering {
    if let (Ok(a), Ok(b)) = (actual.parse::<f64>(), expected.parse::<f64>()) {
        return a.total_cmp(&b);
    }
    if let (Ok(a), Ok(b)) = (
        DateTime::<FixedOffset>::parse_from_rfc3339(actual),
        DateTime::<FixedOffset>::parse_from_rfc3339(expected),
    ) {
        return a.cmp(&b);
    }
    actual.cmp(expected)
}

// ============================================================================
// Helpers
// ============================================================================

fn required_fields(resource: &str) -> Option<&'static [&'static str]> {
    RESOURCES
        .iter()
        .find(|(name, _)| *name == resource)
        .map(|(_, fields)| *fields)
}

fn decode_query(raw: Option<&str>) -> Vec<(String, String)> {
    raw.and_then(|q| serde_urlencoded::from_str(q).ok())
        .unwrap_or_default()
}

fn error_response(status: StatusCode, errors: &[&str]) -> Response {
    (status, axum::Json(json!({ "errors": errors }))).into_response()
}

fn humanize(field: &str) -> String {
    let spaced = field.replace('_', " ");
    let mut chars = spaced.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn timestamp_now() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true)
}

fn finalize_record(base_url: &str, resource: &str, id: u64, record: Value) -> Value {
    let mut record = match record {
        Value::Object(map) => map,
        _ => Map::new(),
    };
    let now = timestamp_now();
    record.insert("id".to_string(), json!(id));
    record
        .entry("created_at".to_string())
        .or_insert_with(|| json!(now));
    record.insert("updated_at".to_string(), json!(now));

    let link = |path: &str, key: &str| {
        let target = record.get(key).map(|v| v.to_string()).unwrap_or_default();
        format!("{}/{}/{}", base_url, path, target)
    };
    let self_url = format!("{}/{}/{}", base_url, resource, id);
    let links = match resource {
        "individual_appointments" => json!({
            "self": self_url,
            "patient": link("patients", "patient_id"),
            "practitioner": link("practitioners", "practitioner_id"),
            "appointment_type": link("appointment_types", "appointment_type_id"),
            "business": link("businesses", "business_id"),
            "attendees": format!("{}/attendees", self_url),
        }),
        "treatment_notes" => {
            let mut links = json!({
                "self": self_url,
                "patient": link("patients", "patient_id"),
                "practitioner": link("practitioners", "practitioner_id"),
            });
            if record.contains_key("individual_appointment_id") {
                links["individual_appointment"] =
                    json!(link("individual_appointments", "individual_appointment_id"));
            }
            links
        }
        _ => json!({ "self": self_url }),
    };
    record.insert("links".to_string(), links);
    Value::Object(record)
}
