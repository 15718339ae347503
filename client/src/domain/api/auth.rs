//! Account registration and token issuance.

use serde_json::Value;

use crate::domain::api_client::ApiClient;
use crate::domain::auth::{LoginCredentials, SignupProfile};
use crate::domain::ports::ApiTransport;
use crate::domain::{ApiError, ApiRequest, HttpMethod};

fn token_of(value: Option<Value>) -> Option<String> {
    match value {
        Some(Value::String(token)) if !token.trim().is_empty() => Some(token),
        _ => None,
    }
}

impl<T: ApiTransport> ApiClient<T> {
    /// Register an account; returns the session token for it.
    pub async fn signup(&self, profile: &SignupProfile) -> Result<Option<String>, ApiError> {
        let request =
            ApiRequest::new("auth/register", HttpMethod::Post).with_payload(profile.to_payload());
        self.send_for(request, "token").await.map(token_of)
    }

    /// Exchange credentials for a session token.
    ///
    /// This only performs the call; [`SessionManager::login`] is what makes
    /// the token current.
    ///
    /// [`SessionManager::login`]: crate::domain::SessionManager::login
    pub async fn login(&self, credentials: &LoginCredentials) -> Result<Option<String>, ApiError> {
        let request =
            ApiRequest::new("auth/token", HttpMethod::Post).with_payload(credentials.to_payload());
        self.send_for(request, "token").await.map(token_of)
    }
}
