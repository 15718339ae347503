//! Session token decoding.
//!
//! Tokens are JWTs signed by the backend. The client never holds the signing
//! key, so it only reads the payload to learn who is logged in; the backend
//! re-verifies the signature on every request.

use std::collections::HashSet;
use std::fmt;

use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Identity derived from a session token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionUser {
    username: String,
    is_admin: bool,
}

impl SessionUser {
    /// Login name carried in the token.
    pub fn username(&self) -> &str {
        self.username.as_str()
    }

    /// Whether the token grants administrator rights.
    pub fn is_admin(&self) -> bool {
        self.is_admin
    }
}

impl fmt::Display for SessionUser {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_admin {
            write!(f, "{} (admin)", self.username)
        } else {
            f.write_str(&self.username)
        }
    }
}

/// Reasons a token cannot be turned into a [`SessionUser`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TokenDecodeError {
    /// The token is not a structurally valid JWT or its payload does not
    /// match the expected claims.
    #[error("session token is malformed: {message}")]
    Malformed { message: String },
    /// The payload decoded but the username claim is blank.
    #[error("session token has an empty username")]
    EmptyUsername,
}

#[derive(Debug, Deserialize)]
struct SessionClaims {
    username: String,
    #[serde(default, rename = "isAdmin")]
    is_admin: bool,
}

fn payload_only_validation() -> Validation {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.insecure_disable_signature_validation();
    validation.validate_exp = false;
    validation.validate_aud = false;
    validation.required_spec_claims = HashSet::new();
    validation
}

/// Decode the identity claims from `token` without verifying its signature.
///
/// Never panics; every structural problem is reported as
/// [`TokenDecodeError`].
///
/// # Examples
/// ```
/// use travel_client::domain::token::decode_session_token;
///
/// assert!(decode_session_token("not-a-jwt").is_err());
/// ```
pub fn decode_session_token(token: &str) -> Result<SessionUser, TokenDecodeError> {
    let data = decode::<SessionClaims>(
        token.trim(),
        &DecodingKey::from_secret(&[]),
        &payload_only_validation(),
    )
    .map_err(|error| TokenDecodeError::Malformed {
        message: error.to_string(),
    })?;

    let SessionClaims { username, is_admin } = data.claims;
    if username.trim().is_empty() {
        return Err(TokenDecodeError::EmptyUsername);
    }
    Ok(SessionUser { username, is_admin })
}
