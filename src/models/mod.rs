//! Domain types and their mappings to and from the hub's JSON wire format.
//!
//! Every inbound mapping deserializes into a private wire struct first, so a
//! payload with a missing field or a wrong primitive type is rejected with
//! [`ApiError::MalformedResponse`] before any domain value is built.

pub mod auth;
pub mod cluster;
pub mod job;
pub mod node;
mod timestamp;
pub mod trigger;

pub use auth::{AuthCredentials, Credential, RegistrationCredentials};
pub use cluster::ClusterInfo;
pub use job::{Job, RawDuration, normalize_duration};
pub use node::{CreateNodeRequest, Node, NodeCreated, NodeToken};
pub use trigger::{FinishJobRequest, FinishStatus, StartJobRequest};

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::{ApiError, Result};

/// Deserialize a raw response body into a wire type, failing closed.
pub(crate) fn parse_wire<T: DeserializeOwned>(resource: &'static str, raw: Value) -> Result<T> {
    serde_json::from_value(raw).map_err(|source| ApiError::MalformedResponse { resource, source })
}

/// Check that `value` is between 1 and `max` characters.
pub(crate) fn validate_length(field: &'static str, value: &str, max: usize) -> Result<()> {
    let len = value.chars().count();
    if len == 0 {
        return Err(ApiError::invalid_input(field, "must not be empty"));
    }
    if len > max {
        return Err(ApiError::invalid_input(
            field,
            format!("must be at most {} characters", max),
        ));
    }
    Ok(())
}
