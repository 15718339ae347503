//! Client configuration loaded via OrthoConfig.
//!
//! Values come from `TRAVEL_CLIENT_*` environment variables and configuration
//! files; command-line flags override them in the binary.

use std::path::PathBuf;
use std::time::Duration;

use ortho_config::OrthoConfig;
use serde::Deserialize;

const DEFAULT_API_BASE_URL: &str = "http://localhost:3001";
const DEFAULT_TOKEN_DIR_NAME: &str = ".travel-client";
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 15;

fn default_token_dir() -> PathBuf {
    std::env::var_os("HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("."))
        .join(DEFAULT_TOKEN_DIR_NAME)
}

/// Settings for reaching the backend and persisting the session token.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "TRAVEL_CLIENT")]
pub struct ClientSettings {
    /// Base URL of the backend API.
    pub api_base_url: Option<String>,
    /// Directory holding the persisted session token.
    pub token_dir: Option<PathBuf>,
    /// Per-request timeout in seconds.
    pub request_timeout_secs: Option<u64>,
}

impl ClientSettings {
    /// Return the configured base URL, falling back to the local backend.
    pub fn api_base_url(&self) -> &str {
        self.api_base_url.as_deref().unwrap_or(DEFAULT_API_BASE_URL)
    }

    /// Return the configured token directory, falling back to
    /// `$HOME/.travel-client`.
    pub fn token_dir(&self) -> PathBuf {
        self.token_dir.clone().unwrap_or_else(default_token_dir)
    }

    /// Return the configured request timeout.
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(
            self.request_timeout_secs
                .unwrap_or(DEFAULT_REQUEST_TIMEOUT_SECS),
        )
    }
}
