//! Domain ports and supporting types for the hexagonal boundary.
//!
//! Ports describe how the domain expects to talk to driven adapters (the HTTP
//! transport and token persistence). Each trait exposes strongly typed errors
//! so adapters map their failures into predictable variants.

mod macros;
pub(crate) use macros::define_port_error;

mod api_transport;
mod token_store;

#[cfg(test)]
pub use api_transport::MockApiTransport;
pub use api_transport::{
    ApiTransport, ScriptedApiTransport, SentRequest, TransportError, TransportResponse,
};
#[cfg(test)]
pub use token_store::MockTokenStore;
pub use token_store::{InMemoryTokenStore, TokenStore, TokenStoreError};
