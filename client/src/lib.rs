//! Client library for the trip-planning REST API.
//!
//! The `domain` module holds the API client facade, error normalization and
//! the session manager, all written against the ports in `domain::ports`.
//! `outbound` provides the reqwest transport and the file-backed token store;
//! `inbound` is the `trip` command-line front end.

pub mod config;
pub mod domain;
pub mod inbound;
pub mod outbound;
