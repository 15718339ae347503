//! Reqwest-backed API transport.
//!
//! This adapter owns transport details only: URL construction, query and body
//! serialisation, the request timeout and JSON decoding of response bodies.
//! Status codes are passed through untouched for the domain to interpret.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Method, StatusCode};
use serde_json::Value;
use thiserror::Error;
use tracing::trace;
use url::Url;

use crate::domain::ports::{ApiTransport, TransportError, TransportResponse};
use crate::domain::{ApiRequest, HttpMethod};

const USER_AGENT: &str = concat!("travel-client/", env!("CARGO_PKG_VERSION"));

/// Reasons a [`ReqwestTransport`] cannot be built.
#[derive(Debug, Error)]
pub enum TransportBuildError {
    /// The base URL cannot have path segments appended (e.g. `mailto:`).
    #[error("base URL {url} cannot be used as an API root")]
    InvalidBaseUrl { url: String },
    /// The underlying reqwest client failed to initialise.
    #[error("failed to build HTTP client: {0}")]
    Client(#[from] reqwest::Error),
}

/// API transport that performs HTTP requests relative to one base URL.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: Client,
    base_url: Url,
}

impl ReqwestTransport {
    /// Build a transport with an explicit request timeout.
    ///
    /// # Errors
    ///
    /// Returns an error when `base_url` cannot carry a path or the reqwest
    /// client cannot be constructed.
    pub fn new(base_url: Url, timeout: Duration) -> Result<Self, TransportBuildError> {
        if base_url.cannot_be_a_base() {
            return Err(TransportBuildError::InvalidBaseUrl {
                url: base_url.to_string(),
            });
        }
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()?;
        Ok(Self { client, base_url })
    }

    /// Base URL requests are resolved against.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn endpoint_url(&self, request: &ApiRequest) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.pop_if_empty().extend(request.segments());
        }
        url
    }
}

fn reqwest_method(method: HttpMethod) -> Method {
    match method {
        HttpMethod::Get => Method::GET,
        HttpMethod::Post => Method::POST,
        HttpMethod::Patch => Method::PATCH,
        HttpMethod::Delete => Method::DELETE,
    }
}

#[async_trait]
impl ApiTransport for ReqwestTransport {
    async fn send(
        &self,
        request: &ApiRequest,
        bearer: &str,
    ) -> Result<TransportResponse, TransportError> {
        let url = self.endpoint_url(request);
        let mut builder = self
            .client
            .request(reqwest_method(request.method()), url)
            .bearer_auth(bearer)
            .header(reqwest::header::ACCEPT, "application/json");

        let query = request.query_pairs();
        if !query.is_empty() {
            builder = builder.query(&query);
        }
        if let Some(body) = request.json_body() {
            builder = builder.json(body);
        }

        let response = builder.send().await.map_err(map_transport_error)?;
        let status = response.status();
        let bytes = response.bytes().await.map_err(map_transport_error)?;
        trace!(status = status.as_u16(), bytes = bytes.len(), "received api response");

        let body = decode_body(status, bytes.as_ref())?;
        Ok(TransportResponse::new(status.as_u16(), body))
    }
}

/// Decode a response body.
///
/// Empty bodies become `Value::Null`. A failure body that is not JSON is
/// kept as text so the domain can still show it; a success body that is not
/// JSON is a decode error.
fn decode_body(status: StatusCode, body: &[u8]) -> Result<Value, TransportError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(Value::Null);
    }
    match serde_json::from_slice(body) {
        Ok(value) => Ok(value),
        Err(_) if !status.is_success() => Ok(Value::String(body_preview(body))),
        Err(error) => Err(TransportError::decode(format!(
            "invalid JSON in {} response: {error}",
            status.as_u16()
        ))),
    }
}

fn map_transport_error(error: reqwest::Error) -> TransportError {
    if error.is_timeout() {
        TransportError::timeout(error.to_string())
    } else if error.is_builder() {
        TransportError::invalid_request(error.to_string())
    } else {
        TransportError::unreachable(error.to_string())
    }
}

fn body_preview(body: &[u8]) -> String {
    const PREVIEW_CHAR_LIMIT: usize = 160;

    let compact = String::from_utf8_lossy(body)
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ");
    let preview = compact.chars().take(PREVIEW_CHAR_LIMIT).collect::<String>();
    if compact.chars().count() > PREVIEW_CHAR_LIMIT {
        format!("{preview}...")
    } else {
        preview
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for non-network transport helpers.

    use super::*;
    use rstest::rstest;
    use serde_json::json;

    fn transport(base: &str) -> ReqwestTransport {
        ReqwestTransport::new(Url::parse(base).expect("valid url"), Duration::from_secs(1))
            .expect("transport should build")
    }

    #[rstest]
    #[case::bare_host("http://localhost:3001", "http://localhost:3001/trips/user/a%20b%2Fc")]
    #[case::trailing_slash("http://localhost:3001/", "http://localhost:3001/trips/user/a%20b%2Fc")]
    #[case::path_prefix("https://api.example.com/v1/", "https://api.example.com/v1/trips/user/a%20b%2Fc")]
    fn endpoint_urls_escape_segments(#[case] base: &str, #[case] expected: &str) {
        let request = ApiRequest::new("trips/user", HttpMethod::Get).segment("a b/c");
        assert_eq!(transport(base).endpoint_url(&request).as_str(), expected);
    }

    #[rstest]
    fn rejects_bases_without_paths() {
        let err = ReqwestTransport::new(
            Url::parse("mailto:ops@example.com").expect("valid url"),
            Duration::from_secs(1),
        )
        .expect_err("must reject");
        assert!(matches!(err, TransportBuildError::InvalidBaseUrl { .. }));
    }

    #[rstest]
    #[case::empty(StatusCode::OK, b"", Value::Null)]
    #[case::whitespace(StatusCode::NO_CONTENT, b" \n", Value::Null)]
    #[case::json(StatusCode::OK, br#"{"trip":{"id":1}}"#, json!({ "trip": { "id": 1 } }))]
    #[case::html_error(StatusCode::BAD_GATEWAY, b"<h1>Bad   gateway</h1>", json!("<h1>Bad gateway</h1>"))]
    fn decodes_bodies(#[case] status: StatusCode, #[case] body: &[u8], #[case] expected: Value) {
        assert_eq!(decode_body(status, body).expect("decodes"), expected);
    }

    #[rstest]
    fn non_json_success_is_a_decode_error() {
        let err = decode_body(StatusCode::OK, b"<html>").expect_err("must fail");
        assert!(matches!(err, TransportError::Decode { .. }));
    }

    #[rstest]
    fn long_failure_bodies_are_truncated() {
        let body = "x".repeat(500);
        let preview = body_preview(body.as_bytes());
        assert_eq!(preview.chars().count(), 163);
        assert!(preview.ends_with("..."));
    }

    #[rstest]
    #[case(HttpMethod::Get, Method::GET)]
    #[case(HttpMethod::Post, Method::POST)]
    #[case(HttpMethod::Patch, Method::PATCH)]
    #[case(HttpMethod::Delete, Method::DELETE)]
    fn maps_methods(#[case] method: HttpMethod, #[case] expected: Method) {
        assert_eq!(reqwest_method(method), expected);
    }
}
