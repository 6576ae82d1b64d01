use super::{HubClient, RequestOptions};
use crate::error::Result;
use crate::models::job::{self, Job};
use crate::models::Credential;

impl HubClient {
    /// All jobs of the authenticated cluster.
    pub async fn fetch_jobs(&self, auth: &Credential) -> Result<Vec<Job>> {
        let raw = self
            .transport
            .request("/api/jobs", RequestOptions::get().token(&auth.token))
            .await?;
        let jobs = job::list_from_wire_response(raw)?;
        tracing::debug!(count = jobs.len(), "Fetched jobs");
        Ok(jobs)
    }

    pub async fn fetch_job(&self, auth: &Credential, job_id: i64) -> Result<Job> {
        let raw = self
            .transport
            .request(
                &format!("/api/jobs/{}", job_id),
                RequestOptions::get().token(&auth.token),
            )
            .await?;
        job::from_wire_response(raw)
    }

    /// Jobs that ran on one node.
    pub async fn fetch_node_jobs(&self, auth: &Credential, node_id: i64) -> Result<Vec<Job>> {
        let raw = self
            .transport
            .request(
                &format!("/api/nodes/{}/jobs", node_id),
                RequestOptions::get().token(&auth.token),
            )
            .await?;
        job::list_from_wire_response(raw)
    }
}
