use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{parse_wire, timestamp, validate_length};
use crate::error::Result;

pub const MAX_NODE_NAME_LEN: usize = 255;

/// A registered worker node.
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub id: i64,
    pub node_name: String,
    pub current_job_id: Option<i64>,
    pub created_at: DateTime<Utc>,
}

/// One-time node secret returned when a node is created.
///
/// Deliberately not `Clone` or `Serialize`: show it once, then drop it.
pub struct NodeToken(String);

impl NodeToken {
    pub fn expose(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Debug for NodeToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("NodeToken(<redacted>)")
    }
}

/// Result of `POST /api/nodes`: the node plus its token, kept apart so the
/// node can be stored or displayed without carrying the secret.
#[derive(Debug)]
pub struct NodeCreated {
    pub node: Node,
    pub token: Option<NodeToken>,
}

#[derive(Debug, Clone)]
pub struct CreateNodeRequest {
    pub node_name: String,
}

impl CreateNodeRequest {
    pub fn new(node_name: impl Into<String>) -> Self {
        Self {
            node_name: node_name.into(),
        }
    }

    pub fn validate(&self) -> Result<()> {
        validate_length("node_name", &self.node_name, MAX_NODE_NAME_LEN)
    }
}

#[derive(Debug, Serialize)]
pub struct CreateNodeBody<'a> {
    pub node_name: &'a str,
}

#[derive(Deserialize)]
struct NodeDto {
    id: i64,
    node_name: String,
    #[serde(default)]
    current_job_id: Option<i64>,
    #[serde(deserialize_with = "timestamp::deserialize")]
    created_at: DateTime<Utc>,
    #[serde(default)]
    node_token: Option<String>,
}

impl NodeDto {
    fn into_parts(self) -> (Node, Option<String>) {
        let node = Node {
            id: self.id,
            node_name: self.node_name,
            current_job_id: self.current_job_id,
            created_at: self.created_at,
        };
        (node, self.node_token)
    }
}

pub fn to_wire_request(request: &CreateNodeRequest) -> CreateNodeBody<'_> {
    CreateNodeBody {
        node_name: &request.node_name,
    }
}

pub fn from_wire_response(raw: Value) -> Result<Node> {
    let dto: NodeDto = parse_wire("node", raw)?;
    Ok(dto.into_parts().0)
}

pub fn list_from_wire_response(raw: Value) -> Result<Vec<Node>> {
    let dtos: Vec<NodeDto> = parse_wire("node list", raw)?;
    Ok(dtos.into_iter().map(|dto| dto.into_parts().0).collect())
}

pub fn created_from_wire_response(raw: Value) -> Result<NodeCreated> {
    let dto: NodeDto = parse_wire("node", raw)?;
    let (node, token) = dto.into_parts();
    Ok(NodeCreated {
        node,
        token: token.map(NodeToken),
    })
}
