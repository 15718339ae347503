//! Maps transport failures and backend error bodies onto [`ApiError`].
//!
//! The backend reports failures as
//! `{ "error": { "message": ..., "code"?: ..., "fields"?: {...} } }`. The
//! structured `code` is preferred; older deployments only send prose, so the
//! message text is matched as a fallback for the password, empty flight search
//! and duplicate-key cases.

use std::collections::BTreeMap;

use serde::Deserialize;
use serde_json::Value;

use super::ApiError;
use super::ports::TransportError;

/// Shown when no response was received.
pub const NETWORK_MESSAGE: &str =
    "Unable to reach the server. Please check your connection and try again.";
/// Shown for a 401 without a password hint.
pub const LOGIN_REQUIRED_MESSAGE: &str = "Please log in to continue";
/// Shown for a 401 caused by a wrong password.
pub const INCORRECT_PASSWORD_MESSAGE: &str = "Current password incorrect";
/// Shown for a 403.
pub const FORBIDDEN_MESSAGE: &str = "You are not authorized to perform this action";
/// Shown for a generic 404.
pub const NOT_FOUND_MESSAGE: &str = "The requested resource was not found";
/// Shown for a 404 from a flight search.
pub const NO_FLIGHTS_MESSAGE: &str = "No flights found matching your search";
/// Shown for a 422 that carries no message of its own.
pub const VALIDATION_MESSAGE: &str = "Please correct the highlighted fields";
/// Field message for a duplicate email address.
pub const DUPLICATE_EMAIL_MESSAGE: &str = "An account with this email already exists";
/// Field message for a duplicate username.
pub const DUPLICATE_USERNAME_MESSAGE: &str = "Username already taken";

const CODE_INVALID_PASSWORD: &str = "invalid_password";
const CODE_NO_FLIGHTS: &str = "no_flights_found";
const CODE_DUPLICATE_EMAIL: &str = "duplicate_email";
const CODE_DUPLICATE_USERNAME: &str = "duplicate_username";
const NO_FLIGHTS_PHRASE: &str = "flights found";

#[derive(Debug, Default, Deserialize)]
struct ErrorEnvelopeDto {
    #[serde(default)]
    error: Option<ErrorBodyDto>,
}

#[derive(Debug, Default, Deserialize)]
struct ErrorBodyDto {
    #[serde(default)]
    message: Option<MessageDto>,
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    fields: BTreeMap<String, Value>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum MessageDto {
    Text(String),
    Lines(Vec<String>),
}

impl MessageDto {
    fn into_text(self) -> String {
        match self {
            Self::Text(text) => text,
            Self::Lines(lines) => lines.join("; "),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DuplicateField {
    Email,
    Username,
}

/// Backend failure details extracted from a response body.
#[derive(Debug, Default)]
struct BackendFailure {
    message: Option<String>,
    code: Option<String>,
    fields: BTreeMap<String, String>,
}

impl BackendFailure {
    fn from_body(body: &Value) -> Option<Self> {
        let envelope = ErrorEnvelopeDto::deserialize(body).ok()?;
        let error = envelope.error?;
        Some(Self {
            message: error
                .message
                .map(MessageDto::into_text)
                .filter(|text| !text.trim().is_empty()),
            code: error.code,
            fields: error
                .fields
                .into_iter()
                .map(|(name, value)| (name, field_message(value)))
                .collect(),
        })
    }

    fn has_code(&self, expected: &str) -> bool {
        self.code.as_deref() == Some(expected)
    }

    fn message_mentions(&self, needle: &str) -> bool {
        self.message
            .as_deref()
            .is_some_and(|message| message.to_ascii_lowercase().contains(needle))
    }

    fn duplicate(&self) -> Option<DuplicateField> {
        if self.has_code(CODE_DUPLICATE_EMAIL) {
            return Some(DuplicateField::Email);
        }
        if self.has_code(CODE_DUPLICATE_USERNAME) {
            return Some(DuplicateField::Username);
        }
        if !self.message_mentions("duplicate") {
            return None;
        }
        if self.message_mentions("email") {
            Some(DuplicateField::Email)
        } else if self.message_mentions("username") {
            Some(DuplicateField::Username)
        } else {
            None
        }
    }
}

fn field_message(value: Value) -> String {
    match value {
        Value::String(text) => text,
        Value::Array(items) => items
            .into_iter()
            .map(field_message)
            .collect::<Vec<_>>()
            .join("; "),
        other => other.to_string(),
    }
}

fn duplicate_error(field: DuplicateField) -> ApiError {
    let (name, message) = match field {
        DuplicateField::Email => ("email", DUPLICATE_EMAIL_MESSAGE),
        DuplicateField::Username => ("username", DUPLICATE_USERNAME_MESSAGE),
    };
    ApiError::validation(message).with_field(name, message)
}

/// Map a failure that happened before any response arrived.
pub fn normalize_transport(error: &TransportError) -> ApiError {
    match error {
        TransportError::Unreachable { .. } | TransportError::Timeout { .. } => {
            ApiError::network(NETWORK_MESSAGE)
        }
        TransportError::Decode { .. } => {
            ApiError::decode("The server returned an unreadable response")
        }
        TransportError::InvalidRequest { message } => {
            ApiError::invalid_argument(format!("The request could not be sent: {message}"))
        }
    }
}

/// Map a non-success HTTP response onto the error taxonomy.
///
/// # Examples
/// ```
/// use serde_json::json;
/// use travel_client::domain::ErrorKind;
/// use travel_client::domain::normalize::normalize_status;
///
/// let body = json!({ "error": { "message": "Invalid password" } });
/// let err = normalize_status(401, &body);
/// assert_eq!(err.kind(), ErrorKind::Unauthorized);
/// assert_eq!(err.message(), "Current password incorrect");
/// ```
pub fn normalize_status(status: u16, body: &Value) -> ApiError {
    let failure = BackendFailure::from_body(body).unwrap_or_default();
    if let Some(field) = failure.duplicate() {
        return duplicate_error(field).with_status(status);
    }

    let error = match status {
        401 => {
            if failure.has_code(CODE_INVALID_PASSWORD) || failure.message_mentions("password") {
                ApiError::unauthorized(INCORRECT_PASSWORD_MESSAGE)
            } else {
                ApiError::unauthorized(LOGIN_REQUIRED_MESSAGE)
            }
        }
        403 => ApiError::forbidden(FORBIDDEN_MESSAGE),
        404 => {
            if failure.has_code(CODE_NO_FLIGHTS) || failure.message_mentions(NO_FLIGHTS_PHRASE) {
                ApiError::not_found(NO_FLIGHTS_MESSAGE)
            } else {
                ApiError::not_found(NOT_FOUND_MESSAGE)
            }
        }
        422 => ApiError::validation(
            failure
                .message
                .unwrap_or_else(|| VALIDATION_MESSAGE.to_owned()),
        )
        .with_fields(failure.fields),
        _ => ApiError::api(
            status,
            failure
                .message
                .unwrap_or_else(|| format!("Request failed with status {status}")),
        ),
    };
    error.with_status(status)
}

/// Detect a duplicate-key conflict reported inside a success response.
///
/// Some backend versions answer signup conflicts with a 2xx status and an
/// `error` member in the body; those must still surface as validation
/// failures.
pub fn embedded_conflict(body: &Value) -> Option<ApiError> {
    BackendFailure::from_body(body)?
        .duplicate()
        .map(duplicate_error)
}

#[cfg(test)]
#[path = "normalize_tests.rs"]
mod tests;
