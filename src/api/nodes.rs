use tracing::info;

use super::{HubClient, RequestOptions};
use crate::error::Result;
use crate::models::node::{self, CreateNodeRequest, Node, NodeCreated};
use crate::models::Credential;

const NODES_PATH: &str = "/api/nodes";

impl HubClient {
    pub async fn fetch_nodes(&self, auth: &Credential) -> Result<Vec<Node>> {
        let raw = self
            .transport
            .request(NODES_PATH, RequestOptions::get().token(&auth.token))
            .await?;
        node::list_from_wire_response(raw)
    }

    /// Register a node. The returned token is only ever available here.
    pub async fn create_node(
        &self,
        auth: &Credential,
        request: &CreateNodeRequest,
    ) -> Result<NodeCreated> {
        request.validate()?;

        let options = RequestOptions::post()
            .token(&auth.token)
            .json(&node::to_wire_request(request))?;
        let raw = self.transport.request(NODES_PATH, options).await?;
        let created = node::created_from_wire_response(raw)?;

        info!(node_id = created.node.id, node_name = %created.node.node_name, "Node created");
        Ok(created)
    }

    pub async fn delete_node(&self, auth: &Credential, node_id: i64) -> Result<()> {
        self.transport
            .request(
                &format!("{}/{}", NODES_PATH, node_id),
                RequestOptions::delete().token(&auth.token),
            )
            .await?;

        info!(node_id, "Node deleted");
        Ok(())
    }
}
