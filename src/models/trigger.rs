//! Wire types for the node-side job trigger API.
//!
//! These calls authenticate with a node token in the body instead of the
//! cluster bearer credential.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::parse_wire;
use crate::error::Result;

#[derive(Serialize)]
pub struct StartJobRequest {
    pub node_token: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tag: Option<String>,
    pub started_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FinishStatus {
    Completed,
    Failed,
}

#[derive(Serialize)]
pub struct FinishJobRequest {
    pub node_token: String,
    pub status: FinishStatus,
    pub finished_at: DateTime<Utc>,
    pub duration_hours: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_text: Option<String>,
}

#[derive(Deserialize)]
struct TriggerAck {
    success: bool,
}

/// Returns the hub's `success` flag.
pub fn ack_from_wire_response(raw: Value) -> Result<bool> {
    let ack: TriggerAck = parse_wire("job trigger", raw)?;
    Ok(ack.success)
}
