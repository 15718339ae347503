//! Flight-data provider passthroughs under `amadeus/`.
//!
//! The backend proxies these calls to the provider and wraps results in the
//! provider's `{ "data": ..., "meta": ... }` envelope.

use serde_json::{Map, Value, json};

use crate::domain::api_client::ApiClient;
use crate::domain::ports::ApiTransport;
use crate::domain::{
    ApiError, ApiRequest, ErrorKind, FlightOfferQuery, FlightSearch, HttpMethod,
};

fn offers_payload(offers: Vec<Value>) -> Map<String, Value> {
    let mut payload = Map::new();
    payload.insert("flightOffers".to_owned(), json!(offers));
    payload
}

impl<T: ApiTransport> ApiClient<T> {
    /// Airports whose name or code starts with `keyword`.
    ///
    /// A blank keyword short-circuits to an empty list, as does a 404 from
    /// the provider.
    pub async fn airport_suggestions(&self, keyword: &str) -> Result<Vec<Value>, ApiError> {
        let keyword = keyword.trim();
        if keyword.is_empty() {
            return Ok(Vec::new());
        }
        let request = ApiRequest::new("amadeus/airports", HttpMethod::Get)
            .with_param("keyword", json!(keyword));
        match self.send_for(request, "data").await {
            Ok(Some(Value::Array(airports))) => Ok(airports),
            Ok(_) => Ok(Vec::new()),
            Err(error) if error.kind() == ErrorKind::NotFound => Ok(Vec::new()),
            Err(error) => Err(error),
        }
    }

    /// Search flight offers; an empty result is [`FlightSearch::NoMatches`].
    pub async fn search_flight_offers(
        &self,
        query: &FlightOfferQuery,
    ) -> Result<FlightSearch, ApiError> {
        let request = ApiRequest::new("amadeus/flight-offers", HttpMethod::Get)
            .with_payload(query.to_payload());
        match self.send(request).await {
            Ok(envelope) => Ok(FlightSearch::Found(envelope)),
            Err(error) if error.kind() == ErrorKind::NotFound => Ok(FlightSearch::NoMatches),
            Err(error) => Err(error),
        }
    }

    /// Confirm the current price of the given offers; returns the envelope.
    pub async fn price_flight_offers(&self, offers: Vec<Value>) -> Result<Value, ApiError> {
        let request = ApiRequest::new("amadeus/flight-offers/pricing", HttpMethod::Post)
            .with_payload(offers_payload(offers));
        self.send(request).await
    }

    /// Book priced offers for the listed travelers.
    pub async fn create_flight_order(
        &self,
        order: Map<String, Value>,
    ) -> Result<Option<Value>, ApiError> {
        let request =
            ApiRequest::new("amadeus/flight-orders", HttpMethod::Post).with_payload(order);
        self.send_for(request, "data").await
    }

    /// Seat maps for the given offers.
    pub async fn seat_maps(&self, offers: Vec<Value>) -> Result<Option<Value>, ApiError> {
        let request = ApiRequest::new("amadeus/seatmaps", HttpMethod::Post)
            .with_payload(offers_payload(offers));
        self.send_for(request, "data").await
    }

    /// Schedule status of one flight.
    pub async fn flight_status(
        &self,
        query: Map<String, Value>,
    ) -> Result<Option<Value>, ApiError> {
        self.provider_get("amadeus/flight-status", query).await
    }

    /// Delay likelihood for one flight.
    pub async fn predict_flight_delay(
        &self,
        query: Map<String, Value>,
    ) -> Result<Option<Value>, ApiError> {
        self.provider_get("amadeus/flight-delay-prediction", query).await
    }

    /// Online check-in links for an airline.
    pub async fn checkin_links(&self, airline_code: &str) -> Result<Option<Value>, ApiError> {
        let mut query = Map::new();
        query.insert("airlineCode".to_owned(), json!(airline_code.trim()));
        self.provider_get("amadeus/checkin-links", query).await
    }

    /// Busiest travel periods for a city.
    pub async fn busiest_period(
        &self,
        query: Map<String, Value>,
    ) -> Result<Option<Value>, ApiError> {
        self.provider_get("amadeus/busiest-period", query).await
    }

    async fn provider_get(
        &self,
        endpoint: &str,
        query: Map<String, Value>,
    ) -> Result<Option<Value>, ApiError> {
        let request = ApiRequest::new(endpoint, HttpMethod::Get).with_payload(query);
        self.send_for(request, "data").await
    }
}
