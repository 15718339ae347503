//! Flight offer search inputs and outcomes.
//!
//! A search that matches nothing is an ordinary answer, not a failure, so it
//! is returned as [`FlightSearch::NoMatches`] rather than as an error.

use chrono::NaiveDate;
use serde_json::{Map, Value, json};
use thiserror::Error;

use super::error::ApiError;

/// Largest party a single offer search accepts.
pub const MAX_ADULTS: u8 = 9;

/// Reasons a [`FlightOfferQuery`] cannot be built.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FlightQueryError {
    /// An airport code was not three ASCII letters.
    #[error("{field} must be a three-letter IATA code, got {value:?}")]
    InvalidAirport { field: &'static str, value: String },
    /// Origin and destination are the same airport.
    #[error("origin and destination must differ")]
    SameAirport,
    /// The return date precedes the departure date.
    #[error("return date {returning} is before departure date {departing}")]
    ReturnBeforeDeparture {
        departing: NaiveDate,
        returning: NaiveDate,
    },
    /// Passenger count outside `1..=MAX_ADULTS`.
    #[error("adults must be between 1 and 9, got {0}")]
    Adults(u8),
}

impl FlightQueryError {
    fn field(&self) -> &'static str {
        match self {
            Self::InvalidAirport { field, .. } => field,
            Self::SameAirport => "destinationLocationCode",
            Self::ReturnBeforeDeparture { .. } => "returnDate",
            Self::Adults(_) => "adults",
        }
    }
}

impl From<FlightQueryError> for ApiError {
    fn from(error: FlightQueryError) -> Self {
        let message = error.to_string();
        ApiError::invalid_argument(message.clone()).with_field(error.field(), message)
    }
}

fn airport_code(field: &'static str, value: &str) -> Result<String, FlightQueryError> {
    let code = value.trim();
    if code.len() == 3 && code.chars().all(|c| c.is_ascii_alphabetic()) {
        Ok(code.to_ascii_uppercase())
    } else {
        Err(FlightQueryError::InvalidAirport {
            field,
            value: value.to_owned(),
        })
    }
}

/// Validated parameters for a flight offer search.
///
/// # Examples
/// ```
/// use chrono::NaiveDate;
/// use travel_client::domain::FlightOfferQuery;
///
/// let date = NaiveDate::from_ymd_opt(2025, 6, 1).unwrap();
/// let query = FlightOfferQuery::new("lis", "JFK", date).unwrap().with_adults(2).unwrap();
/// let payload = query.to_payload();
/// assert_eq!(payload["originLocationCode"], "LIS");
/// assert_eq!(payload["departureDate"], "2025-06-01");
/// assert_eq!(payload["adults"], 2);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlightOfferQuery {
    origin: String,
    destination: String,
    departure_date: NaiveDate,
    return_date: Option<NaiveDate>,
    adults: u8,
    non_stop: Option<bool>,
    max_results: Option<u32>,
}

impl FlightOfferQuery {
    /// One-way search for a single adult.
    pub fn new(
        origin: &str,
        destination: &str,
        departure_date: NaiveDate,
    ) -> Result<Self, FlightQueryError> {
        let origin = airport_code("originLocationCode", origin)?;
        let destination = airport_code("destinationLocationCode", destination)?;
        if origin == destination {
            return Err(FlightQueryError::SameAirport);
        }
        Ok(Self {
            origin,
            destination,
            departure_date,
            return_date: None,
            adults: 1,
            non_stop: None,
            max_results: None,
        })
    }

    /// Make the search a round trip.
    pub fn with_return_date(mut self, return_date: NaiveDate) -> Result<Self, FlightQueryError> {
        if return_date < self.departure_date {
            return Err(FlightQueryError::ReturnBeforeDeparture {
                departing: self.departure_date,
                returning: return_date,
            });
        }
        self.return_date = Some(return_date);
        Ok(self)
    }

    /// Set the number of adult passengers.
    pub fn with_adults(mut self, adults: u8) -> Result<Self, FlightQueryError> {
        if !(1..=MAX_ADULTS).contains(&adults) {
            return Err(FlightQueryError::Adults(adults));
        }
        self.adults = adults;
        Ok(self)
    }

    /// Restrict results to direct flights.
    #[must_use]
    pub fn non_stop(mut self, non_stop: bool) -> Self {
        self.non_stop = Some(non_stop);
        self
    }

    /// Cap the number of offers returned.
    #[must_use]
    pub fn with_max_results(mut self, max: u32) -> Self {
        self.max_results = Some(max);
        self
    }

    /// Query parameters in the provider's naming.
    pub fn to_payload(&self) -> Map<String, Value> {
        let mut payload = Map::new();
        payload.insert("originLocationCode".to_owned(), json!(self.origin));
        payload.insert("destinationLocationCode".to_owned(), json!(self.destination));
        payload.insert(
            "departureDate".to_owned(),
            json!(self.departure_date.format("%Y-%m-%d").to_string()),
        );
        if let Some(return_date) = self.return_date {
            payload.insert(
                "returnDate".to_owned(),
                json!(return_date.format("%Y-%m-%d").to_string()),
            );
        }
        payload.insert("adults".to_owned(), json!(self.adults));
        if let Some(non_stop) = self.non_stop {
            payload.insert("nonStop".to_owned(), json!(non_stop));
        }
        if let Some(max) = self.max_results {
            payload.insert("max".to_owned(), json!(max));
        }
        payload
    }
}

/// Outcome of a flight offer search.
#[derive(Debug, Clone, PartialEq)]
pub enum FlightSearch {
    /// The full response envelope, including provider metadata.
    Found(Value),
    /// The provider had no offers for the query.
    NoMatches,
}

impl FlightSearch {
    /// Offers in the envelope's `data` array; empty for [`Self::NoMatches`].
    pub fn offers(&self) -> &[Value] {
        match self {
            Self::Found(envelope) => envelope
                .get("data")
                .and_then(Value::as_array)
                .map_or(&[][..], Vec::as_slice),
            Self::NoMatches => &[],
        }
    }

    /// Whether there is nothing to show.
    pub fn is_empty(&self) -> bool {
        self.offers().is_empty()
    }
}
