use super::{HubClient, RequestOptions};
use crate::error::Result;
use crate::models::{ClusterInfo, Credential, cluster};

impl HubClient {
    /// `GET /api/clusters/me`
    pub async fn current_cluster(&self, auth: &Credential) -> Result<ClusterInfo> {
        let raw = self
            .transport
            .request("/api/clusters/me", RequestOptions::get().token(&auth.token))
            .await?;
        cluster::from_wire_response(raw)
    }
}
