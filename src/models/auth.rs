use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{parse_wire, validate_length};
use crate::error::{ApiError, Result};

pub const MAX_CLUSTER_ID_LEN: usize = 64;
pub const MAX_PASSWORD_LEN: usize = 128;

/// An authenticated session: the cluster identity and its bearer token.
///
/// The token is opaque; it is forwarded as-is and never decoded. The
/// persisted form is `{"clusterId": ..., "token": ...}`.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Credential {
    pub cluster_id: String,
    pub token: String,
}

impl Credential {
    pub fn new(cluster_id: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            cluster_id: cluster_id.into(),
            token: token.into(),
        }
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credential")
            .field("cluster_id", &self.cluster_id)
            .field("token", &"<redacted>")
            .finish()
    }
}

/// Login form input.
#[derive(Clone)]
pub struct AuthCredentials {
    pub cluster_id: String,
    pub password: String,
}

impl AuthCredentials {
    pub fn new(cluster_id: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            cluster_id: cluster_id.into(),
            password: password.into(),
        }
    }

    pub fn validate(&self) -> Result<()> {
        validate_length("cluster_id", &self.cluster_id, MAX_CLUSTER_ID_LEN)?;
        validate_length("password", &self.password, MAX_PASSWORD_LEN)
    }
}

impl fmt::Debug for AuthCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthCredentials")
            .field("cluster_id", &self.cluster_id)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Registration form input; the password is typed twice.
#[derive(Clone)]
pub struct RegistrationCredentials {
    pub cluster_id: String,
    pub password: String,
    pub confirm_password: String,
}

impl RegistrationCredentials {
    /// Validates the form and yields the credentials to send.
    pub fn validate(self) -> Result<AuthCredentials> {
        let credentials = AuthCredentials {
            cluster_id: self.cluster_id,
            password: self.password,
        };
        credentials.validate()?;
        validate_length("confirm_password", &self.confirm_password, MAX_PASSWORD_LEN)?;
        if credentials.password != self.confirm_password {
            return Err(ApiError::invalid_input(
                "confirm_password",
                "passwords do not match",
            ));
        }
        Ok(credentials)
    }
}

#[derive(Debug, Serialize)]
pub struct AuthRequest<'a> {
    pub cluster_id: &'a str,
    pub password: &'a str,
}

#[derive(Debug, Deserialize)]
struct AuthResponse {
    cluster_id: String,
    token: String,
    #[serde(default)]
    #[allow(dead_code)]
    expires_at: Option<i64>,
}

pub fn to_wire_request(credentials: &AuthCredentials) -> AuthRequest<'_> {
    AuthRequest {
        cluster_id: &credentials.cluster_id,
        password: &credentials.password,
    }
}

pub fn from_wire_response(raw: Value) -> Result<Credential> {
    let dto: AuthResponse = parse_wire("auth", raw)?;
    Ok(Credential {
        cluster_id: dto.cluster_id,
        token: dto.token,
    })
}
