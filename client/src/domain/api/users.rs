//! User records, addressed by username.

use serde_json::{Map, Value};

use crate::domain::api_client::ApiClient;
use crate::domain::ports::ApiTransport;
use crate::domain::{ApiError, ApiRequest, HttpMethod};

impl<T: ApiTransport> ApiClient<T> {
    /// Every user; admin only on the backend.
    pub async fn list_users(&self) -> Result<Option<Value>, ApiError> {
        self.send_for(ApiRequest::new("users", HttpMethod::Get), "users")
            .await
    }

    /// One user by username.
    pub async fn get_user(&self, username: &str) -> Result<Option<Value>, ApiError> {
        let request = ApiRequest::new("users", HttpMethod::Get).segment(username);
        self.send_for(request, "user").await
    }

    /// Create a user record.
    pub async fn create_user(&self, data: Map<String, Value>) -> Result<Option<Value>, ApiError> {
        let request = ApiRequest::new("users", HttpMethod::Post).with_payload(data);
        self.send_for(request, "user").await
    }

    /// Apply a partial update to a user.
    pub async fn update_user(
        &self,
        username: &str,
        data: Map<String, Value>,
    ) -> Result<Option<Value>, ApiError> {
        let request = ApiRequest::new("users", HttpMethod::Patch)
            .segment(username)
            .with_payload(data);
        self.send_for(request, "user").await
    }

    /// Delete a user; returns the backend's `deleted` marker.
    pub async fn delete_user(&self, username: &str) -> Result<Option<Value>, ApiError> {
        let request = ApiRequest::new("users", HttpMethod::Delete).segment(username);
        self.send_for(request, "deleted").await
    }
}
