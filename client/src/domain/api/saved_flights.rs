//! Flights saved against trips.

use serde_json::{Map, Value};

use crate::domain::api_client::ApiClient;
use crate::domain::ports::ApiTransport;
use crate::domain::{ApiError, ApiRequest, HttpMethod, SavedFlightLookup};

impl<T: ApiTransport> ApiClient<T> {
    /// Save a flight.
    pub async fn save_flight(&self, data: Map<String, Value>) -> Result<Option<Value>, ApiError> {
        let request = ApiRequest::new("flights", HttpMethod::Post).with_payload(data);
        self.send_for(request, "flight").await
    }

    /// Saved flights selected by id or by filter.
    ///
    /// Callers holding untyped input convert it with
    /// `SavedFlightLookup::try_from`, which rejects unusable shapes before
    /// anything is sent.
    pub async fn get_saved_flights(
        &self,
        lookup: &SavedFlightLookup,
    ) -> Result<Option<Value>, ApiError> {
        let request = ApiRequest::new("flights", HttpMethod::Get).with_payload(lookup.to_query());
        self.send_for(request, "flights").await
    }

    /// Saved flights belonging to one trip.
    pub async fn get_saved_flights_by_trip(
        &self,
        trip_id: i64,
    ) -> Result<Option<Value>, ApiError> {
        let request = ApiRequest::new("flights/trip", HttpMethod::Get).segment(trip_id);
        self.send_for(request, "flights").await
    }

    /// Apply a partial update to a saved flight.
    pub async fn update_saved_flight(
        &self,
        id: i64,
        data: Map<String, Value>,
    ) -> Result<Option<Value>, ApiError> {
        let request = ApiRequest::new("flights", HttpMethod::Patch)
            .segment(id)
            .with_payload(data);
        self.send_for(request, "flight").await
    }

    /// Delete a saved flight.
    pub async fn delete_saved_flight(&self, id: i64) -> Result<Option<Value>, ApiError> {
        let request = ApiRequest::new("flights", HttpMethod::Delete).segment(id);
        self.send_for(request, "deleted").await
    }
}
