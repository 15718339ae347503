//! Client domain: the API facade, session management and error taxonomy.
//!
//! Purpose: own every rule about talking to the trip-planning backend while
//! staying free of concrete transports and storage. Adapters plug in through
//! [`ports`].
//!
//! Public surface:
//! - ApiClient: authenticated facade; resource operations live in `api`.
//! - SessionManager / SessionHandle: who is logged in, kept in step with
//!   the persisted token.
//! - ApiError / ErrorKind: normalized failures.
//! - ApiRequest / HttpMethod: request descriptors handed to transports.

mod api;
pub mod api_client;
pub mod auth;
pub mod error;
pub mod flight_lookup;
pub mod normalize;
pub mod ports;
pub mod request;
pub mod search;
pub mod session;
pub mod token;

pub use self::api_client::ApiClient;
pub use self::auth::{CredentialsValidationError, LoginCredentials, SignupProfile};
pub use self::error::{ApiError, ErrorKind};
pub use self::flight_lookup::SavedFlightLookup;
pub use self::request::{ApiRequest, HttpMethod};
pub use self::search::{FlightOfferQuery, FlightQueryError, FlightSearch};
pub use self::session::{
    RestoreOutcome, SessionHandle, SessionManager, SessionSnapshot, SessionState,
};
pub use self::token::{SessionUser, TokenDecodeError};

/// Result alias for client operations.
pub type ApiResult<T> = Result<T, ApiError>;
