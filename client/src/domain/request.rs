//! Request descriptors handed to the transport port.
//!
//! A descriptor names the endpoint as path segments relative to the API base
//! URL, so segments taken from user input (usernames, ids) are escaped by the
//! transport rather than spliced into a path string here.

use std::fmt;

use serde_json::{Map, Value};

/// HTTP verbs used by the backend API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HttpMethod {
    /// Payload is sent as query parameters.
    Get,
    /// Payload is sent as a JSON body.
    Post,
    /// Payload is sent as a JSON body.
    Patch,
    /// Payload is sent as a JSON body.
    Delete,
}

impl HttpMethod {
    /// Upper-case verb as sent on the wire.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Patch => "PATCH",
            Self::Delete => "DELETE",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One API call: endpoint, verb and structured payload.
///
/// # Examples
/// ```
/// use serde_json::json;
/// use travel_client::domain::{ApiRequest, HttpMethod};
///
/// let request = ApiRequest::new("amadeus/airports", HttpMethod::Get)
///     .with_param("keyword", json!("New"));
/// assert_eq!(request.endpoint(), "amadeus/airports");
/// assert_eq!(request.query_pairs(), vec![("keyword".to_owned(), "New".to_owned())]);
/// assert!(request.json_body().is_none());
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
    segments: Vec<String>,
    method: HttpMethod,
    payload: Map<String, Value>,
}

impl ApiRequest {
    /// Build a request for a fixed endpoint path such as `"trips/user"`.
    ///
    /// Leading, trailing and repeated slashes are ignored.
    pub fn new(endpoint: &str, method: HttpMethod) -> Self {
        Self {
            segments: endpoint
                .split('/')
                .filter(|segment| !segment.is_empty())
                .map(str::to_owned)
                .collect(),
            method,
            payload: Map::new(),
        }
    }

    /// Append one dynamic path segment, kept verbatim for the transport to
    /// escape.
    #[must_use]
    pub fn segment(mut self, segment: impl fmt::Display) -> Self {
        self.segments.push(segment.to_string());
        self
    }

    /// Replace the payload.
    #[must_use]
    pub fn with_payload(mut self, payload: Map<String, Value>) -> Self {
        self.payload = payload;
        self
    }

    /// Insert a single payload entry.
    #[must_use]
    pub fn with_param(mut self, key: impl Into<String>, value: Value) -> Self {
        self.payload.insert(key.into(), value);
        self
    }

    /// Path segments relative to the base URL.
    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// Endpoint joined with `/`, for logging.
    pub fn endpoint(&self) -> String {
        self.segments.join("/")
    }

    /// HTTP verb.
    pub fn method(&self) -> HttpMethod {
        self.method
    }

    /// Raw payload regardless of method.
    pub fn payload(&self) -> &Map<String, Value> {
        &self.payload
    }

    /// Query parameters for GET requests; empty for other methods.
    ///
    /// Strings are sent verbatim, numbers and booleans in display form, and
    /// each array element as a repeated key. `null` entries are skipped and
    /// nested objects are sent as JSON text.
    pub fn query_pairs(&self) -> Vec<(String, String)> {
        if self.method != HttpMethod::Get {
            return Vec::new();
        }
        let mut pairs = Vec::with_capacity(self.payload.len());
        for (key, value) in &self.payload {
            push_query_value(&mut pairs, key, value);
        }
        pairs
    }

    /// JSON body for non-GET requests.
    pub fn json_body(&self) -> Option<&Map<String, Value>> {
        (self.method != HttpMethod::Get).then_some(&self.payload)
    }
}

fn push_query_value(pairs: &mut Vec<(String, String)>, key: &str, value: &Value) {
    match value {
        Value::Null => {}
        Value::String(text) => pairs.push((key.to_owned(), text.clone())),
        Value::Bool(flag) => pairs.push((key.to_owned(), flag.to_string())),
        Value::Number(number) => pairs.push((key.to_owned(), number.to_string())),
        Value::Array(items) => {
            for item in items {
                push_query_value(pairs, key, item);
            }
        }
        Value::Object(_) => pairs.push((key.to_owned(), value.to_string())),
    }
}
