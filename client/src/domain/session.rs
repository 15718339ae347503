//! Session state shared by the API client and the session manager.
//!
//! [`SessionHandle`] is the only place the current token lives. The client
//! reads the bearer token from it at send time and the manager is the only
//! writer, so the two can never disagree about which token is current.
//! Every change to the token bumps an epoch counter that the client uses to
//! discard responses which outlived the session they were sent under.

use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use tracing::{debug, info, warn};

use super::api_client::ApiClient;
use super::auth::{LoginCredentials, SignupProfile};
use super::error::ApiError;
use super::ports::{ApiTransport, TokenStore};
use super::token::{SessionUser, TokenDecodeError, decode_session_token};

/// Message returned when a login response lacks a usable token.
pub const MISSING_TOKEN_MESSAGE: &str = "The server did not return a session token";
/// Message returned when the backend issues a token that cannot be decoded.
pub const UNREADABLE_TOKEN_MESSAGE: &str = "The server returned an unreadable session token";

/// Observable authentication state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SessionState {
    /// No token is held.
    Anonymous,
    /// A login or signup call is in flight.
    Authenticating,
    /// A decodable token is held.
    Authenticated,
}

/// Result of reading the persisted token at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RestoreOutcome {
    /// Nothing was stored.
    NoToken,
    /// The stored token decoded and the session is authenticated.
    Restored(SessionUser),
    /// The stored token could not be decoded and was purged.
    Invalidated,
}

/// Point-in-time copy of the session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionSnapshot {
    /// Authentication state.
    pub state: SessionState,
    /// Current token, if any.
    pub token: Option<String>,
    /// Identity decoded from `token`.
    pub user: Option<SessionUser>,
    /// Number of token changes so far.
    pub epoch: u64,
}

#[derive(Debug, Default)]
struct SessionSlot {
    credentials: Option<(String, SessionUser)>,
    authenticating: bool,
    epoch: u64,
}

impl SessionSlot {
    fn state(&self) -> SessionState {
        if self.credentials.is_some() {
            SessionState::Authenticated
        } else if self.authenticating {
            SessionState::Authenticating
        } else {
            SessionState::Anonymous
        }
    }
}

/// Shared, cloneable handle to the current session.
///
/// The token and the user decoded from it are stored as one pair, so a user
/// cannot exist without the token it came from.
///
/// Only [`SessionManager`] changes the token, so the persisted copy and the
/// in-memory copy stay in step.
///
/// # Examples
/// ```
/// use travel_client::domain::{SessionHandle, SessionState};
///
/// let handle = SessionHandle::new();
/// assert_eq!(handle.state(), SessionState::Anonymous);
/// assert!(handle.token().is_none());
/// ```
///
/// Callers outside the crate cannot set a token directly:
/// ```compile_fail
/// use travel_client::domain::SessionHandle;
///
/// SessionHandle::new().establish("header.payload.signature");
/// ```
#[derive(Debug, Clone, Default)]
pub struct SessionHandle {
    slot: Arc<RwLock<SessionSlot>>,
}

impl SessionHandle {
    /// Create an anonymous session.
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> RwLockReadGuard<'_, SessionSlot> {
        self.slot.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, SessionSlot> {
        self.slot.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Current token.
    pub fn token(&self) -> Option<String> {
        self.read()
            .credentials
            .as_ref()
            .map(|(token, _)| token.clone())
    }

    /// Identity decoded from the current token.
    pub fn user(&self) -> Option<SessionUser> {
        self.read().credentials.as_ref().map(|(_, user)| user.clone())
    }

    /// Authentication state.
    pub fn state(&self) -> SessionState {
        self.read().state()
    }

    /// Counter bumped on every token change.
    pub fn epoch(&self) -> u64 {
        self.read().epoch
    }

    /// Copy of the whole session taken under one lock.
    pub fn snapshot(&self) -> SessionSnapshot {
        let slot = self.read();
        SessionSnapshot {
            state: slot.state(),
            token: slot.credentials.as_ref().map(|(token, _)| token.clone()),
            user: slot.credentials.as_ref().map(|(_, user)| user.clone()),
            epoch: slot.epoch,
        }
    }

    /// Bearer value and epoch read together for one outgoing request.
    pub(crate) fn bearer(&self) -> (String, u64) {
        let slot = self.read();
        let bearer = slot
            .credentials
            .as_ref()
            .map(|(token, _)| token.clone())
            .unwrap_or_default();
        (bearer, slot.epoch)
    }

    /// Decode `token` and make it current.
    ///
    /// Surrounding whitespace is dropped, since it is not valid in a bearer
    /// header. On failure the session is left untouched.
    pub(crate) fn establish(&self, token: &str) -> Result<SessionUser, TokenDecodeError> {
        let token = token.trim();
        let user = decode_session_token(token)?;
        let mut slot = self.write();
        slot.credentials = Some((token.to_owned(), user.clone()));
        slot.authenticating = false;
        slot.epoch += 1;
        Ok(user)
    }

    /// Drop any current token and mark a login as in flight.
    pub(crate) fn begin_authentication(&self) {
        let mut slot = self.write();
        if slot.credentials.take().is_some() {
            slot.epoch += 1;
        }
        slot.authenticating = true;
    }

    /// Return to [`SessionState::Anonymous`].
    ///
    /// Returns `false` when the session was already anonymous, in which case
    /// the epoch is unchanged.
    pub(crate) fn clear(&self) -> bool {
        let mut slot = self.write();
        let changed = slot.credentials.take().is_some() || slot.authenticating;
        slot.authenticating = false;
        if changed {
            slot.epoch += 1;
        }
        changed
    }
}

/// Keeps the in-memory session and the persisted token in step.
pub struct SessionManager<T, S> {
    client: Arc<ApiClient<T>>,
    store: Arc<S>,
}

impl<T, S> SessionManager<T, S> {
    /// Create a manager over the client's session handle.
    pub fn new(client: Arc<ApiClient<T>>, store: Arc<S>) -> Self {
        Self { client, store }
    }

    /// Client whose bearer token this manager controls.
    pub fn client(&self) -> &Arc<ApiClient<T>> {
        &self.client
    }

    /// Shared session handle.
    pub fn handle(&self) -> &SessionHandle {
        self.client.session()
    }

    /// Current session state.
    pub fn snapshot(&self) -> SessionSnapshot {
        self.handle().snapshot()
    }
}

impl<T, S> SessionManager<T, S>
where
    T: ApiTransport,
    S: TokenStore,
{
    /// Load the persisted token and adopt it if it decodes.
    ///
    /// An undecodable token is purged from the store. A store that cannot
    /// be read is treated as empty.
    pub fn restore(&self) -> RestoreOutcome {
        let stored = match self.store.load() {
            Ok(stored) => stored,
            Err(error) => {
                warn!(%error, "could not read stored session token");
                None
            }
        };
        let Some(token) = stored else {
            self.handle().clear();
            return RestoreOutcome::NoToken;
        };

        match self.handle().establish(&token) {
            Ok(user) => {
                debug!(username = user.username(), "restored session");
                RestoreOutcome::Restored(user)
            }
            Err(error) => {
                warn!(%error, "discarding undecodable stored session token");
                self.handle().clear();
                self.clear_store();
                RestoreOutcome::Invalidated
            }
        }
    }

    /// Exchange credentials for a session token.
    ///
    /// Any failure leaves the session anonymous with nothing persisted.
    pub async fn login(&self, credentials: &LoginCredentials) -> Result<SessionUser, ApiError> {
        self.handle().begin_authentication();
        let outcome = self.client.login(credentials).await;
        self.complete(outcome)
    }

    /// Register a new account and log it in.
    pub async fn signup(&self, profile: &SignupProfile) -> Result<SessionUser, ApiError> {
        self.handle().begin_authentication();
        let outcome = self.client.signup(profile).await;
        self.complete(outcome)
    }

    /// End the session. Never fails; calling it twice is a no-op.
    pub fn logout(&self) {
        if self.handle().clear() {
            info!("logged out");
        }
        self.clear_store();
    }

    fn complete(&self, outcome: Result<Option<String>, ApiError>) -> Result<SessionUser, ApiError> {
        let issued = match outcome {
            Ok(Some(token)) => token,
            Ok(None) => {
                self.abandon();
                return Err(ApiError::session_decode(MISSING_TOKEN_MESSAGE));
            }
            Err(error) => {
                self.abandon();
                return Err(error);
            }
        };

        let token = issued.trim();
        let user = match self.handle().establish(token) {
            Ok(user) => user,
            Err(error) => {
                warn!(%error, "backend issued an undecodable session token");
                self.abandon();
                return Err(ApiError::session_decode(UNREADABLE_TOKEN_MESSAGE));
            }
        };
        if let Err(error) = self.store.save(token) {
            warn!(%error, "session token was not persisted");
        }
        info!(username = user.username(), admin = user.is_admin(), "session established");
        Ok(user)
    }

    fn abandon(&self) {
        self.handle().clear();
        self.clear_store();
    }

    fn clear_store(&self) {
        if let Err(error) = self.store.clear() {
            warn!(%error, "could not clear stored session token");
        }
    }
}

#[cfg(test)]
#[path = "session_tests.rs"]
mod tests;
