//! Driven port for sending API requests.
//!
//! The domain hands the transport a fully described request plus the bearer
//! token current at send time; the transport returns the raw status and the
//! decoded JSON body without interpreting either.

use std::collections::VecDeque;
use std::sync::{Mutex, PoisonError};

use async_trait::async_trait;
use serde_json::Value;

use super::define_port_error;
use crate::domain::ApiRequest;

/// Status and decoded body of a completed HTTP exchange.
#[derive(Debug, Clone, PartialEq)]
pub struct TransportResponse {
    /// HTTP status code.
    pub status: u16,
    /// Decoded JSON body; `Value::Null` when the body was empty, and the raw
    /// text as a string when a failure body was not JSON.
    pub body: Value,
}

impl TransportResponse {
    /// Build a response from its parts.
    pub fn new(status: u16, body: Value) -> Self {
        Self { status, body }
    }

    /// Whether the status is in the 2xx range.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

define_port_error! {
    /// Errors raised when no usable response was obtained.
    pub enum TransportError {
        /// Connection could not be established or was dropped.
        Unreachable => "api unreachable",
        /// The request did not complete before the configured timeout.
        Timeout => "api request timed out",
        /// A success response body could not be decoded as JSON.
        Decode => "api response decode failed",
        /// The request was rejected locally before anything was sent.
        InvalidRequest => "api request invalid",
    }
}

/// Port for issuing one HTTP request against the backend API.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ApiTransport: Send + Sync {
    /// Send `request` with `Authorization: Bearer {bearer}`.
    ///
    /// `bearer` is empty when no session is active; the header is still
    /// attached.
    async fn send(
        &self,
        request: &ApiRequest,
        bearer: &str,
    ) -> Result<TransportResponse, TransportError>;
}

/// A request captured by [`ScriptedApiTransport`].
#[derive(Debug, Clone, PartialEq)]
pub struct SentRequest {
    /// Request descriptor as handed to the transport.
    pub request: ApiRequest,
    /// Bearer token attached to the request.
    pub bearer: String,
}

/// In-process transport that replays queued outcomes in order and records
/// every request it receives.
///
/// Running out of queued outcomes yields [`TransportError::Unreachable`].
#[derive(Debug, Default)]
pub struct ScriptedApiTransport {
    outcomes: Mutex<VecDeque<Result<TransportResponse, TransportError>>>,
    sent: Mutex<Vec<SentRequest>>,
}

impl ScriptedApiTransport {
    /// Create a transport with nothing queued.
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a response with the given status and body.
    pub fn respond(&self, status: u16, body: Value) -> &Self {
        self.push(Ok(TransportResponse::new(status, body)))
    }

    /// Queue a transport failure.
    pub fn fail(&self, error: TransportError) -> &Self {
        self.push(Err(error))
    }

    /// Requests received so far, oldest first.
    pub fn sent(&self) -> Vec<SentRequest> {
        self.sent
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn push(&self, outcome: Result<TransportResponse, TransportError>) -> &Self {
        self.outcomes
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push_back(outcome);
        self
    }
}

#[async_trait]
impl ApiTransport for ScriptedApiTransport {
    async fn send(
        &self,
        request: &ApiRequest,
        bearer: &str,
    ) -> Result<TransportResponse, TransportError> {
        self.sent
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(SentRequest {
                request: request.clone(),
                bearer: bearer.to_owned(),
            });
        self.outcomes
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .pop_front()
            .unwrap_or_else(|| Err(TransportError::unreachable("no scripted response queued")))
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use crate::domain::HttpMethod;
    use rstest::rstest;
    use serde_json::json;

    #[rstest]
    #[case(200, true)]
    #[case(204, true)]
    #[case(299, true)]
    #[case(301, false)]
    #[case(404, false)]
    fn success_range(#[case] status: u16, #[case] expected: bool) {
        assert_eq!(TransportResponse::new(status, Value::Null).is_success(), expected);
    }

    #[tokio::test]
    async fn scripted_transport_replays_in_order_and_records() {
        let transport = ScriptedApiTransport::new();
        transport
            .respond(200, json!({ "trips": [] }))
            .fail(TransportError::timeout("slow"));

        let request = ApiRequest::new("trips", HttpMethod::Get);
        let first = transport.send(&request, "tok").await;
        let second = transport.send(&request, "").await;
        let third = transport.send(&request, "").await;

        assert_eq!(first, Ok(TransportResponse::new(200, json!({ "trips": [] }))));
        assert_eq!(second, Err(TransportError::timeout("slow")));
        assert!(matches!(third, Err(TransportError::Unreachable { .. })));
        let sent = transport.sent();
        assert_eq!(sent.len(), 3);
        assert_eq!(sent[0].bearer, "tok");
    }
}
