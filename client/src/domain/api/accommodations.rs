//! Accommodations.

use serde_json::{Map, Value};

use crate::domain::api_client::ApiClient;
use crate::domain::ports::ApiTransport;
use crate::domain::{ApiError, ApiRequest, HttpMethod};

impl<T: ApiTransport> ApiClient<T> {
    /// Accommodations matching `filters`.
    pub async fn list_accommodations(
        &self,
        filters: Map<String, Value>,
    ) -> Result<Option<Value>, ApiError> {
        let request = ApiRequest::new("accommodations", HttpMethod::Get).with_payload(filters);
        self.send_for(request, "accommodations").await
    }

    /// One accommodation by id.
    pub async fn get_accommodation(&self, id: i64) -> Result<Option<Value>, ApiError> {
        let request = ApiRequest::new("accommodations", HttpMethod::Get).segment(id);
        self.send_for(request, "accommodation").await
    }

    /// Create an accommodation.
    pub async fn create_accommodation(
        &self,
        data: Map<String, Value>,
    ) -> Result<Option<Value>, ApiError> {
        let request = ApiRequest::new("accommodations", HttpMethod::Post).with_payload(data);
        self.send_for(request, "accommodation").await
    }

    /// Apply a partial update to an accommodation.
    pub async fn update_accommodation(
        &self,
        id: i64,
        data: Map<String, Value>,
    ) -> Result<Option<Value>, ApiError> {
        let request = ApiRequest::new("accommodations", HttpMethod::Patch)
            .segment(id)
            .with_payload(data);
        self.send_for(request, "accommodation").await
    }

    /// Delete an accommodation.
    pub async fn delete_accommodation(&self, id: i64) -> Result<Option<Value>, ApiError> {
        let request = ApiRequest::new("accommodations", HttpMethod::Delete).segment(id);
        self.send_for(request, "deleted").await
    }
}
