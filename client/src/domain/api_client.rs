//! The API client facade.
//!
//! Every backend call goes through [`ApiClient::send`], which attaches the
//! current bearer token, hands the request to the transport port and turns
//! anything other than a clean 2xx JSON body into an [`ApiError`]. The
//! per-resource wrappers live in [`crate::domain::api`].

use serde_json::{Map, Value};
use tracing::{debug, warn};

use super::error::ApiError;
use super::normalize::{embedded_conflict, normalize_status, normalize_transport};
use super::ports::ApiTransport;
use super::request::{ApiRequest, HttpMethod};
use super::session::SessionHandle;

/// Authenticated facade over an [`ApiTransport`].
#[derive(Debug)]
pub struct ApiClient<T> {
    transport: T,
    session: SessionHandle,
}

impl<T> ApiClient<T> {
    /// Create a client that reads its bearer token from `session`.
    pub fn new(transport: T, session: SessionHandle) -> Self {
        Self { transport, session }
    }

    /// Session the bearer token is read from.
    pub fn session(&self) -> &SessionHandle {
        &self.session
    }

    /// Underlying transport.
    pub fn transport(&self) -> &T {
        &self.transport
    }
}

impl<T: ApiTransport> ApiClient<T> {
    /// Issue `method` against `endpoint` with `payload` and return the raw
    /// response envelope.
    ///
    /// # Examples
    /// ```
    /// # #[tokio::main(flavor = "current_thread")]
    /// # async fn main() {
    /// use serde_json::{Map, json};
    /// use travel_client::domain::ports::ScriptedApiTransport;
    /// use travel_client::domain::{ApiClient, HttpMethod, SessionHandle};
    ///
    /// let transport = ScriptedApiTransport::new();
    /// transport.respond(200, json!({ "trips": [] }));
    /// let client = ApiClient::new(transport, SessionHandle::new());
    /// let body = client.request("trips", Map::new(), HttpMethod::Get).await.unwrap();
    /// assert_eq!(body, json!({ "trips": [] }));
    /// # }
    /// ```
    pub async fn request(
        &self,
        endpoint: &str,
        payload: Map<String, Value>,
        method: HttpMethod,
    ) -> Result<Value, ApiError> {
        self.send(ApiRequest::new(endpoint, method).with_payload(payload))
            .await
    }

    /// `GET endpoint` with no parameters.
    pub async fn get(&self, endpoint: &str) -> Result<Value, ApiError> {
        self.send(ApiRequest::new(endpoint, HttpMethod::Get)).await
    }

    /// Send a prepared request.
    ///
    /// A response that arrives after the session changed is discarded and
    /// reported as [`ErrorKind::SessionChanged`](super::ErrorKind).
    pub async fn send(&self, request: ApiRequest) -> Result<Value, ApiError> {
        let (bearer, epoch) = self.session.bearer();
        let method = request.method();
        let endpoint = request.endpoint();
        debug!(
            %method,
            endpoint = %endpoint,
            authenticated = !bearer.is_empty(),
            "sending api request"
        );

        let outcome = self.transport.send(&request, &bearer).await;
        if self.session.epoch() != epoch {
            debug!(
                %method,
                endpoint = %endpoint,
                "discarding response from a previous session"
            );
            return Err(ApiError::session_changed());
        }

        let response = outcome.map_err(|error| {
            warn!(
                %method,
                endpoint = %endpoint,
                %error,
                "api request failed without a response"
            );
            normalize_transport(&error)
        })?;

        if !response.is_success() {
            let error = normalize_status(response.status, &response.body);
            debug!(
                %method,
                endpoint = %endpoint,
                status = response.status,
                kind = %error.kind(),
                "api request rejected"
            );
            return Err(error);
        }
        if let Some(conflict) = embedded_conflict(&response.body) {
            return Err(conflict.with_status(response.status));
        }
        Ok(response.body)
    }

    /// Send `request` and unwrap one envelope field.
    pub(crate) async fn send_for(
        &self,
        request: ApiRequest,
        field: &str,
    ) -> Result<Option<Value>, ApiError> {
        self.send(request).await.map(|body| take_field(body, field))
    }
}

/// Remove `field` from a response envelope.
///
/// A body that is not an object, a missing field and an explicit `null` all
/// yield `None`.
pub(crate) fn take_field(body: Value, field: &str) -> Option<Value> {
    match body {
        Value::Object(mut map) => map.remove(field).filter(|value| !value.is_null()),
        _ => None,
    }
}

#[cfg(test)]
#[path = "api_client_tests.rs"]
mod tests;
