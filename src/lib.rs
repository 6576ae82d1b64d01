//! Client-side data access and session handling for the jobboard hub.
//!
//! ## Architecture
//!
//! - `api`: request transport and typed calls per resource
//! - `models`: domain types and wire mappings, validated fail-closed
//! - `session`: persisted credential, forced-logout message, session context
//! - `events`: the invalidation bus connecting the transport to the session
//! - `storage`: key/value backends (files, memory)
//! - `cli`: command handlers for the `jobboard` binary

pub mod api;
pub mod cli;
pub mod config;
pub mod context;
pub mod error;
pub mod events;
pub mod logging;
pub mod models;
pub mod presentation;
pub mod session;
pub mod storage;

pub use api::HubClient;
pub use error::{ApiError, Result};
