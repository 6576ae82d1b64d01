use tracing::info;

use super::{HubClient, RequestOptions};
use crate::error::Result;
use crate::models::auth::{self, AuthCredentials, Credential};

const LOGIN_PATH: &str = "/api/auth/login";
const REGISTER_PATH: &str = "/api/auth/register";

impl HubClient {
    /// Exchange a cluster ID and password for a credential.
    pub async fn login(&self, credentials: &AuthCredentials) -> Result<Credential> {
        self.authenticate(LOGIN_PATH, credentials).await
    }

    /// Create a cluster and return its first credential.
    pub async fn register(&self, credentials: &AuthCredentials) -> Result<Credential> {
        self.authenticate(REGISTER_PATH, credentials).await
    }

    async fn authenticate(&self, path: &str, credentials: &AuthCredentials) -> Result<Credential> {
        credentials.validate()?;

        let options = RequestOptions::post().json(&auth::to_wire_request(credentials))?;
        let raw = self.transport.request(path, options).await?;
        let credential = auth::from_wire_response(raw)?;

        info!(cluster_id = %credential.cluster_id, path, "Authenticated");
        Ok(credential)
    }
}
