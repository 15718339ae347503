//! Trips.

use serde_json::{Map, Value};

use crate::domain::api_client::ApiClient;
use crate::domain::ports::ApiTransport;
use crate::domain::{ApiError, ApiRequest, HttpMethod};

impl<T: ApiTransport> ApiClient<T> {
    /// Create a trip.
    pub async fn create_trip(&self, data: Map<String, Value>) -> Result<Option<Value>, ApiError> {
        let request = ApiRequest::new("trips", HttpMethod::Post).with_payload(data);
        self.send_for(request, "trip").await
    }

    /// Apply a partial update to a trip.
    pub async fn update_trip(
        &self,
        id: i64,
        data: Map<String, Value>,
    ) -> Result<Option<Value>, ApiError> {
        let request = ApiRequest::new("trips", HttpMethod::Patch)
            .segment(id)
            .with_payload(data);
        self.send_for(request, "trip").await
    }

    /// Trips matching `filters`, sent as query parameters.
    pub async fn list_trips(&self, filters: Map<String, Value>) -> Result<Option<Value>, ApiError> {
        let request = ApiRequest::new("trips", HttpMethod::Get).with_payload(filters);
        self.send_for(request, "trips").await
    }

    /// One trip by id.
    pub async fn get_trip(&self, id: i64) -> Result<Option<Value>, ApiError> {
        let request = ApiRequest::new("trips", HttpMethod::Get).segment(id);
        self.send_for(request, "trip").await
    }

    /// Trips owned by `username`.
    pub async fn get_trips_by_username(&self, username: &str) -> Result<Option<Value>, ApiError> {
        let request = ApiRequest::new("trips/user", HttpMethod::Get).segment(username);
        self.send_for(request, "trips").await
    }

    /// Delete a trip.
    pub async fn delete_trip(&self, id: i64) -> Result<Option<Value>, ApiError> {
        let request = ApiRequest::new("trips", HttpMethod::Delete).segment(id);
        self.send_for(request, "deleted").await
    }
}
