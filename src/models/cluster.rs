use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::Value;

use super::{parse_wire, timestamp};
use crate::error::Result;

/// The authenticated cluster, as returned by `GET /api/clusters/me`.
#[derive(Debug, Clone, PartialEq)]
pub struct ClusterInfo {
    pub cluster_id: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Deserialize)]
struct ClusterDto {
    cluster_id: String,
    #[serde(deserialize_with = "timestamp::deserialize")]
    created_at: DateTime<Utc>,
}

pub fn from_wire_response(raw: Value) -> Result<ClusterInfo> {
    let dto: ClusterDto = parse_wire("cluster", raw)?;
    Ok(ClusterInfo {
        cluster_id: dto.cluster_id,
        created_at: dto.created_at,
    })
}
