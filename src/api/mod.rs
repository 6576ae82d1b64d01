//! Typed access to the hub's REST endpoints.
//!
//! ## Layout
//!
//! - `transport`: the request wrapper every call goes through
//! - `auth`, `clusters`, `nodes`, `jobs`, `trigger`: one file per resource,
//!   each building the wire request and mapping the response through
//!   [`crate::models`]

mod auth;
mod clusters;
mod jobs;
mod nodes;
pub mod transport;
mod trigger;

pub use transport::{RequestOptions, Transport};

/// Client for the hub API.
///
/// Authenticated calls take the [`Credential`](crate::models::Credential) to
/// use explicitly; the client itself holds no session state.
#[derive(Clone)]
pub struct HubClient {
    transport: Transport,
}

impl HubClient {
    pub fn new(transport: Transport) -> Self {
        Self { transport }
    }

    pub fn transport(&self) -> &Transport {
        &self.transport
    }
}
