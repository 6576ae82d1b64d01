use super::{HubClient, RequestOptions};
use crate::error::Result;
use crate::models::trigger::{self, FinishJobRequest, StartJobRequest};

impl HubClient {
    /// Report that a job started on the node owning `request.node_token`.
    pub async fn start_job(&self, request: &StartJobRequest) -> Result<bool> {
        let raw = self
            .transport
            .request("/api/job-trigger/start", RequestOptions::post().json(request)?)
            .await?;
        trigger::ack_from_wire_response(raw)
    }

    /// Report that the node's running job finished.
    pub async fn finish_job(&self, request: &FinishJobRequest) -> Result<bool> {
        let raw = self
            .transport
            .request("/api/job-trigger/finish", RequestOptions::post().json(request)?)
            .await?;
        trigger::ack_from_wire_response(raw)
    }
}
