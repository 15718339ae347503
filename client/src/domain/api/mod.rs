//! Resource operations layered over [`ApiClient`](super::ApiClient).
//!
//! Each operation fixes an endpoint and method and unwraps one envelope
//! field. A missing or `null` field comes back as `None` rather than as an
//! error. Flight search and pricing return the whole envelope because the
//! provider metadata travels alongside the offers.

mod accommodations;
mod auth;
mod provider;
mod saved_flights;
mod trips;
mod users;
