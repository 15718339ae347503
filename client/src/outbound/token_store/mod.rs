//! Token persistence adapters.
//!
//! This module provides the filesystem implementation of the `TokenStore`
//! port.

mod file;

pub use file::FileTokenStore;
