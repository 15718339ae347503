//! Driven port for persisting the session token between runs.
//!
//! Exactly one token is stored under a fixed key. The store never interprets
//! the token; decoding belongs to the session manager.

use std::sync::{Mutex, PoisonError};

use super::define_port_error;

define_port_error! {
    /// Errors surfaced by token persistence adapters.
    pub enum TokenStoreError {
        /// Reading the stored token failed.
        Read => "token store read failed",
        /// Writing or removing the stored token failed.
        Write => "token store write failed",
    }
}

/// Port for loading, saving and clearing the persisted session token.
#[cfg_attr(test, mockall::automock)]
pub trait TokenStore: Send + Sync {
    /// Return the stored token, or `None` when nothing is stored.
    fn load(&self) -> Result<Option<String>, TokenStoreError>;

    /// Replace the stored token.
    fn save(&self, token: &str) -> Result<(), TokenStoreError>;

    /// Remove the stored token. Clearing an empty store succeeds.
    fn clear(&self) -> Result<(), TokenStoreError>;
}

/// Process-local token store.
///
/// # Examples
/// ```
/// use travel_client::domain::ports::{InMemoryTokenStore, TokenStore};
///
/// let store = InMemoryTokenStore::default();
/// store.save("abc").unwrap();
/// assert_eq!(store.load().unwrap().as_deref(), Some("abc"));
/// store.clear().unwrap();
/// assert!(store.load().unwrap().is_none());
/// ```
#[derive(Debug, Default)]
pub struct InMemoryTokenStore {
    token: Mutex<Option<String>>,
}

impl InMemoryTokenStore {
    /// Create a store that already holds `token`.
    pub fn with_token(token: impl Into<String>) -> Self {
        Self {
            token: Mutex::new(Some(token.into())),
        }
    }

    /// Current contents, bypassing the port's `Result`.
    pub fn peek(&self) -> Option<String> {
        self.token
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl TokenStore for InMemoryTokenStore {
    fn load(&self) -> Result<Option<String>, TokenStoreError> {
        Ok(self.peek())
    }

    fn save(&self, token: &str) -> Result<(), TokenStoreError> {
        *self.token.lock().unwrap_or_else(PoisonError::into_inner) = Some(token.to_owned());
        Ok(())
    }

    fn clear(&self) -> Result<(), TokenStoreError> {
        *self.token.lock().unwrap_or_else(PoisonError::into_inner) = None;
        Ok(())
    }
}
