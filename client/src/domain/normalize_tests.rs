//! Regression coverage for error normalization.

use super::*;
use crate::domain::ErrorKind;
use rstest::rstest;
use serde_json::json;

fn error_body(message: &str) -> Value {
    json!({ "error": { "message": message, "status": 0 } })
}

#[rstest]
fn unprocessable_entity_carries_field_errors() {
    let body = json!({
        "error": {
            "message": "Validation failed",
            "fields": { "email": "Invalid format" }
        }
    });

    let err = normalize_status(422, &body);

    assert_eq!(err.kind(), ErrorKind::Validation);
    assert_eq!(err.field("email"), Some("Invalid format"));
    assert_eq!(err.message(), "Validation failed");
    assert_eq!(err.status(), Some(422));
}

#[rstest]
fn unprocessable_entity_without_message_uses_default() {
    let err = normalize_status(422, &json!({ "error": { "fields": { "email": ["a", "b"] } } }));
    assert_eq!(err.message(), VALIDATION_MESSAGE);
    assert_eq!(err.field("email"), Some("a; b"));
}

#[rstest]
#[case::password_hint(error_body("Invalid password"), INCORRECT_PASSWORD_MESSAGE)]
#[case::password_hint_case(error_body("PASSWORD does not match"), INCORRECT_PASSWORD_MESSAGE)]
#[case::structured_code(
    json!({ "error": { "message": "nope", "code": "invalid_password" } }),
    INCORRECT_PASSWORD_MESSAGE
)]
#[case::no_hint(error_body("Unauthorized"), LOGIN_REQUIRED_MESSAGE)]
#[case::empty_body(Value::Null, LOGIN_REQUIRED_MESSAGE)]
fn unauthorised_messages(#[case] body: Value, #[case] expected: &str) {
    let err = normalize_status(401, &body);
    assert_eq!(err.kind(), ErrorKind::Unauthorized);
    assert_eq!(err.message(), expected);
}

#[rstest]
fn forbidden_maps_to_fixed_message() {
    let err = normalize_status(403, &error_body("Admin only"));
    assert_eq!(err.kind(), ErrorKind::Forbidden);
    assert_eq!(err.message(), FORBIDDEN_MESSAGE);
}

#[rstest]
#[case::flight_text(error_body("No flights found for query"), NO_FLIGHTS_MESSAGE)]
#[case::flight_code(
    json!({ "error": { "code": "no_flights_found" } }),
    NO_FLIGHTS_MESSAGE
)]
#[case::generic(error_body("No trip: 12"), NOT_FOUND_MESSAGE)]
#[case::missing_saved_flight(error_body("No flight: 99"), NOT_FOUND_MESSAGE)]
fn not_found_messages(#[case] body: Value, #[case] expected: &str) {
    let err = normalize_status(404, &body);
    assert_eq!(err.kind(), ErrorKind::NotFound);
    assert_eq!(err.message(), expected);
}

#[rstest]
#[case::email_text(
    error_body("duplicate key value violates unique constraint \"users_email_key\""),
    "email",
    DUPLICATE_EMAIL_MESSAGE
)]
#[case::username_text(
    error_body("Duplicate username: alice"),
    "username",
    DUPLICATE_USERNAME_MESSAGE
)]
#[case::email_code(
    json!({ "error": { "message": "conflict", "code": "duplicate_email" } }),
    "email",
    DUPLICATE_EMAIL_MESSAGE
)]
#[case::username_code(
    json!({ "error": { "code": "duplicate_username" } }),
    "username",
    DUPLICATE_USERNAME_MESSAGE
)]
fn duplicates_become_field_errors(
    #[case] body: Value,
    #[case] field: &str,
    #[case] expected: &str,
) {
    for status in [400, 409, 500] {
        let err = normalize_status(status, &body);
        assert_eq!(err.kind(), ErrorKind::Validation, "status {status}");
        assert_eq!(err.field(field), Some(expected), "status {status}");
        assert_eq!(err.status(), Some(status));
    }
}

#[rstest]
fn other_statuses_pass_message_through_with_status() {
    let body = json!({ "error": { "message": ["a is required", "b is required"] } });
    let err = normalize_status(400, &body);
    assert_eq!(err.kind(), ErrorKind::Api);
    assert_eq!(err.message(), "a is required; b is required");
    assert_eq!(err.status(), Some(400));
}

#[rstest]
fn other_statuses_without_message_describe_status() {
    let err = normalize_status(502, &Value::String("<html>bad gateway</html>".to_owned()));
    assert_eq!(err.kind(), ErrorKind::Api);
    assert_eq!(err.message(), "Request failed with status 502");
}

#[rstest]
#[case(TransportError::unreachable("connection refused"))]
#[case(TransportError::timeout("deadline elapsed"))]
fn missing_responses_are_network_errors(#[case] error: TransportError) {
    let err = normalize_transport(&error);
    assert_eq!(err.kind(), ErrorKind::Network);
    assert_eq!(err.message(), NETWORK_MESSAGE);
}

#[rstest]
fn unsendable_requests_are_not_network_errors() {
    let err = normalize_transport(&TransportError::invalid_request("invalid header value"));
    assert_eq!(err.kind(), ErrorKind::InvalidArgument);
    assert!(err.message().contains("invalid header value"), "{err}");
}

#[rstest]
fn undecodable_success_body_is_decode_error() {
    let err = normalize_transport(&TransportError::decode("expected value"));
    assert_eq!(err.kind(), ErrorKind::Decode);
}

#[rstest]
fn embedded_duplicate_in_success_body_is_detected() {
    let body = json!({ "error": { "message": "duplicate key: email" } });
    let err = embedded_conflict(&body).expect("conflict detected");
    assert_eq!(err.field("email"), Some(DUPLICATE_EMAIL_MESSAGE));
}

#[rstest]
#[case(json!({ "trip": { "id": 1 } }))]
#[case(json!({ "error": { "message": "something else" } }))]
#[case(Value::Null)]
fn ordinary_success_bodies_have_no_conflict(#[case] body: Value) {
    assert!(embedded_conflict(&body).is_none());
}
