//! Authentication inputs: login credentials and signup profiles.
//!
//! Constructors validate raw strings before anything reaches the network so a
//! blank field fails locally instead of round-tripping to the backend.

use std::fmt;

use serde_json::{Map, Value, json};
use zeroize::Zeroizing;

use super::error::ApiError;

/// Validation errors for authentication inputs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CredentialsValidationError {
    /// Username was missing or blank once trimmed.
    EmptyUsername,
    /// Password was blank.
    EmptyPassword,
    /// Email was missing or lacks an `@`.
    InvalidEmail,
    /// A required name field was blank.
    EmptyName { field: &'static str },
}

impl fmt::Display for CredentialsValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyUsername => write!(f, "username must not be empty"),
            Self::EmptyPassword => write!(f, "password must not be empty"),
            Self::InvalidEmail => write!(f, "email must be a valid address"),
            Self::EmptyName { field } => write!(f, "{field} must not be empty"),
        }
    }
}

impl std::error::Error for CredentialsValidationError {}

impl From<CredentialsValidationError> for ApiError {
    fn from(error: CredentialsValidationError) -> Self {
        let message = error.to_string();
        ApiError::invalid_argument(message.clone()).with_field(error.field(), message)
    }
}

impl CredentialsValidationError {
    /// Name of the offending form field.
    pub fn field(&self) -> &'static str {
        match self {
            Self::EmptyUsername => "username",
            Self::EmptyPassword => "password",
            Self::InvalidEmail => "email",
            Self::EmptyName { field } => field,
        }
    }
}

fn normalized_username(username: &str) -> Result<String, CredentialsValidationError> {
    let normalized = username.trim();
    if normalized.is_empty() {
        return Err(CredentialsValidationError::EmptyUsername);
    }
    Ok(normalized.to_owned())
}

fn checked_password(password: &str) -> Result<Zeroizing<String>, CredentialsValidationError> {
    if password.is_empty() {
        return Err(CredentialsValidationError::EmptyPassword);
    }
    Ok(Zeroizing::new(password.to_owned()))
}

/// Validated login credentials.
///
/// ## Invariants
/// - `username` is trimmed and must not be empty after trimming.
/// - `password` must be non-empty but keeps caller-provided whitespace.
///
/// # Examples
/// ```
/// use travel_client::domain::LoginCredentials;
///
/// let creds = LoginCredentials::try_from_parts(" alice ", "hunter2").unwrap();
/// assert_eq!(creds.username(), "alice");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginCredentials {
    username: String,
    password: Zeroizing<String>,
}

impl LoginCredentials {
    /// Construct credentials from raw username/password inputs.
    pub fn try_from_parts(
        username: &str,
        password: &str,
    ) -> Result<Self, CredentialsValidationError> {
        Ok(Self {
            username: normalized_username(username)?,
            password: checked_password(password)?,
        })
    }

    /// Trimmed username.
    pub fn username(&self) -> &str {
        self.username.as_str()
    }

    /// Password as provided.
    pub fn password(&self) -> &str {
        self.password.as_str()
    }

    /// Request body for the token endpoint.
    pub(crate) fn to_payload(&self) -> Map<String, Value> {
        let mut payload = Map::new();
        payload.insert("username".to_owned(), json!(self.username));
        payload.insert("password".to_owned(), json!(self.password.as_str()));
        payload
    }
}

/// Validated registration details for a new account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignupProfile {
    credentials: LoginCredentials,
    first_name: String,
    last_name: String,
    email: String,
}

impl SignupProfile {
    /// Validate every signup field.
    pub fn try_new(
        credentials: LoginCredentials,
        first_name: &str,
        last_name: &str,
        email: &str,
    ) -> Result<Self, CredentialsValidationError> {
        let first_name = first_name.trim();
        if first_name.is_empty() {
            return Err(CredentialsValidationError::EmptyName {
                field: "firstName",
            });
        }
        let last_name = last_name.trim();
        if last_name.is_empty() {
            return Err(CredentialsValidationError::EmptyName { field: "lastName" });
        }
        let email = email.trim();
        if !email.contains('@') || email.starts_with('@') || email.ends_with('@') {
            return Err(CredentialsValidationError::InvalidEmail);
        }
        Ok(Self {
            credentials,
            first_name: first_name.to_owned(),
            last_name: last_name.to_owned(),
            email: email.to_owned(),
        })
    }

    /// Credentials for the new account.
    pub fn credentials(&self) -> &LoginCredentials {
        &self.credentials
    }

    /// Contact email.
    pub fn email(&self) -> &str {
        self.email.as_str()
    }

    /// Request body for the register endpoint.
    pub(crate) fn to_payload(&self) -> Map<String, Value> {
        let mut payload = self.credentials.to_payload();
        payload.insert("firstName".to_owned(), json!(self.first_name));
        payload.insert("lastName".to_owned(), json!(self.last_name));
        payload.insert("email".to_owned(), json!(self.email));
        payload
    }
}
