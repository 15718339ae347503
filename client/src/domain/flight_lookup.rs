//! Selector for saved-flight lookups.

use serde_json::{Map, Value, json};

use super::error::ApiError;

/// How to select saved flights.
///
/// # Examples
/// ```
/// use serde_json::json;
/// use travel_client::domain::SavedFlightLookup;
///
/// let lookup = SavedFlightLookup::try_from(json!(42)).unwrap();
/// assert_eq!(lookup, SavedFlightLookup::ById(42));
/// assert!(SavedFlightLookup::try_from(json!(null)).is_err());
/// ```
#[derive(Debug, Clone, PartialEq)]
pub enum SavedFlightLookup {
    /// A single saved flight by its identifier.
    ById(i64),
    /// Every saved flight matching the given fields, such as `tripId`.
    ByFilter(Map<String, Value>),
}

impl SavedFlightLookup {
    /// Query parameters for the lookup.
    pub fn to_query(&self) -> Map<String, Value> {
        match self {
            Self::ById(id) => {
                let mut query = Map::new();
                query.insert("id".to_owned(), json!(id));
                query
            }
            Self::ByFilter(filter) => filter.clone(),
        }
    }
}

impl From<i64> for SavedFlightLookup {
    fn from(id: i64) -> Self {
        Self::ById(id)
    }
}

impl From<Map<String, Value>> for SavedFlightLookup {
    fn from(filter: Map<String, Value>) -> Self {
        Self::ByFilter(filter)
    }
}

impl TryFrom<Value> for SavedFlightLookup {
    type Error = ApiError;

    /// Accept an integer id or a filter object; reject every other shape.
    fn try_from(value: Value) -> Result<Self, Self::Error> {
        match value {
            Value::Number(number) => number.as_i64().map(Self::ById).ok_or_else(|| {
                ApiError::invalid_argument(format!(
                    "saved flight id must be an integer, got {number}"
                ))
            }),
            Value::Object(filter) => Ok(Self::ByFilter(filter)),
            other => Err(ApiError::invalid_argument(format!(
                "saved flight lookup must be an id or a filter object, got {}",
                shape_name(&other)
            ))),
        }
    }
}

fn shape_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for lookup normalization.
    use super::*;
    use crate::domain::ErrorKind;
    use rstest::rstest;

    #[rstest]
    fn numeric_id_becomes_id_query() {
        let lookup = SavedFlightLookup::try_from(json!(42)).expect("integer id");
        assert_eq!(lookup.to_query(), json!({ "id": 42 }).as_object().cloned().expect("object"));
    }

    #[rstest]
    fn filter_object_is_passed_through() {
        let lookup = SavedFlightLookup::try_from(json!({ "tripId": 7 })).expect("filter");
        assert_eq!(
            Value::Object(lookup.to_query()),
            json!({ "tripId": 7 })
        );
    }

    #[rstest]
    #[case::null(json!(null), "null")]
    #[case::string(json!("42"), "a string")]
    #[case::array(json!([42]), "an array")]
    #[case::boolean(json!(true), "a boolean")]
    fn other_shapes_are_rejected(#[case] input: Value, #[case] shape: &str) {
        let err = SavedFlightLookup::try_from(input).expect_err("must be rejected");
        assert_eq!(err.kind(), ErrorKind::InvalidArgument);
        assert!(err.message().ends_with(shape), "{}", err.message());
    }

    #[rstest]
    #[case::float(json!(4.2))]
    #[case::too_large(json!(u64::MAX))]
    fn non_integer_numbers_are_rejected(#[case] input: Value) {
        let err = SavedFlightLookup::try_from(input).expect_err("must be rejected");
        assert_eq!(err.kind(), ErrorKind::InvalidArgument);
        assert!(err.message().contains("integer"));
    }
}
