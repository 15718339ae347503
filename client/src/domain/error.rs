//! Normalized client errors.
//!
//! Every failure surfaced by the API client is an [`ApiError`]. Adapters and
//! front ends branch on the stable [`ErrorKind`]; the message is safe to show
//! to a user as-is and the optional field map carries per-input validation
//! messages for forms.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Stable machine-readable category of a client failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[non_exhaustive]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// No response was received (offline, unreachable, or timed out).
    Network,
    /// The backend answered `401 Unauthorized`.
    Unauthorized,
    /// The backend answered `403 Forbidden`.
    Forbidden,
    /// The backend answered `404 Not Found`.
    NotFound,
    /// Input was rejected; see [`ApiError::fields`].
    Validation,
    /// Any other non-success status.
    Api,
    /// A success response carried a body that is not JSON.
    Decode,
    /// A session token could not be decoded into a user identity.
    SessionDecode,
    /// The caller broke an operation contract before anything was sent.
    InvalidArgument,
    /// A login or logout happened while the request was in flight; the
    /// response was discarded.
    SessionChanged,
}

impl ErrorKind {
    /// Snake-case identifier matching the serde representation.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Network => "network",
            Self::Unauthorized => "unauthorized",
            Self::Forbidden => "forbidden",
            Self::NotFound => "not_found",
            Self::Validation => "validation",
            Self::Api => "api",
            Self::Decode => "decode",
            Self::SessionDecode => "session_decode",
            Self::InvalidArgument => "invalid_argument",
            Self::SessionChanged => "session_changed",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Normalized failure returned by every client operation.
///
/// # Examples
/// ```
/// use travel_client::domain::{ApiError, ErrorKind};
///
/// let err = ApiError::validation("Please correct the highlighted fields")
///     .with_field("email", "Invalid format");
/// assert_eq!(err.kind(), ErrorKind::Validation);
/// assert_eq!(err.field("email"), Some("Invalid format"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiError {
    kind: ErrorKind,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    status: Option<u16>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    fields: BTreeMap<String, String>,
}

impl ApiError {
    /// Create an error of the given kind.
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            status: None,
            fields: BTreeMap::new(),
        }
    }

    /// Error category.
    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// Human-readable message suitable for display.
    pub fn message(&self) -> &str {
        self.message.as_str()
    }

    /// HTTP status, when a response was received.
    pub fn status(&self) -> Option<u16> {
        self.status
    }

    /// Per-field validation messages keyed by input name.
    pub fn fields(&self) -> &BTreeMap<String, String> {
        &self.fields
    }

    /// Message for a single field, if present.
    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields.get(name).map(String::as_str)
    }

    /// Whether front ends should drop this error without showing it.
    pub fn is_silent(&self) -> bool {
        self.kind == ErrorKind::SessionChanged
    }

    /// Attach the HTTP status that produced this error.
    #[must_use]
    pub fn with_status(mut self, status: u16) -> Self {
        self.status = Some(status);
        self
    }

    /// Attach one field-level message.
    #[must_use]
    pub fn with_field(mut self, name: impl Into<String>, message: impl Into<String>) -> Self {
        self.fields.insert(name.into(), message.into());
        self
    }

    /// Merge a map of field-level messages.
    #[must_use]
    pub fn with_fields(mut self, fields: BTreeMap<String, String>) -> Self {
        self.fields.extend(fields);
        self
    }

    /// Convenience constructor for [`ErrorKind::Network`].
    pub fn network(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Network, message)
    }

    /// Convenience constructor for [`ErrorKind::Unauthorized`].
    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Unauthorized, message)
    }

    /// Convenience constructor for [`ErrorKind::Forbidden`].
    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Forbidden, message)
    }

    /// Convenience constructor for [`ErrorKind::NotFound`].
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::NotFound, message)
    }

    /// Convenience constructor for [`ErrorKind::Validation`].
    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Validation, message)
    }

    /// Convenience constructor for [`ErrorKind::Api`] carrying `status`.
    pub fn api(status: u16, message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Api, message).with_status(status)
    }

    /// Convenience constructor for [`ErrorKind::Decode`].
    pub fn decode(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Decode, message)
    }

    /// Convenience constructor for [`ErrorKind::SessionDecode`].
    pub fn session_decode(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::SessionDecode, message)
    }

    /// Convenience constructor for [`ErrorKind::InvalidArgument`].
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::InvalidArgument, message)
    }

    /// The fixed [`ErrorKind::SessionChanged`] error.
    pub fn session_changed() -> Self {
        Self::new(
            ErrorKind::SessionChanged,
            "The session changed while the request was in flight",
        )
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for ApiError {}
