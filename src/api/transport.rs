//! HTTP request wrapper for the hub's JSON API.
//!
//! Sends one request per call with no retries, attaches the bearer token,
//! and turns non-2xx answers into [`ApiError`]. A 401 additionally records a
//! forced-logout message and publishes on [`AuthEvents`] before the error is
//! returned.

use std::time::Instant;

use reqwest::{Method, StatusCode, header};
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, warn};

use crate::error::{ApiError, GENERIC_REQUEST_FAILURE, Result, SESSION_EXPIRED_MESSAGE, looks_like_error_code};
use crate::events::{AuthEvents, AuthInvalidated};
use crate::session::ForcedLogoutSlot;

/// Options for a single request.
#[derive(Debug, Clone)]
pub struct RequestOptions<'a> {
    pub method: Method,
    pub body: Option<Value>,
    pub token: Option<&'a str>,
    pub headers: Vec<(&'a str, String)>,
}

impl Default for RequestOptions<'_> {
    fn default() -> Self {
        Self {
            method: Method::GET,
            body: None,
            token: None,
            headers: Vec::new(),
        }
    }
}

impl<'a> RequestOptions<'a> {
    pub fn new(method: Method) -> Self {
        Self {
            method,
            ..Default::default()
        }
    }

    pub fn get() -> Self {
        Self::new(Method::GET)
    }

    pub fn post() -> Self {
        Self::new(Method::POST)
    }

    pub fn delete() -> Self {
        Self::new(Method::DELETE)
    }

    /// Serialize `body` as the JSON request body.
    pub fn json<T: Serialize>(mut self, body: &T) -> Result<Self> {
        self.body = Some(serde_json::to_value(body).map_err(ApiError::Encode)?);
        Ok(self)
    }

    pub fn token(mut self, token: &'a str) -> Self {
        self.token = Some(token);
        self
    }

    pub fn header(mut self, name: &'a str, value: impl Into<String>) -> Self {
        self.headers.push((name, value.into()));
        self
    }
}

/// Issues requests against one hub base URL.
#[derive(Clone)]
pub struct Transport {
    base_url: String,
    http: reqwest::Client,
    events: AuthEvents,
    forced_logout: ForcedLogoutSlot,
}

impl Transport {
    pub fn new(
        base_url: impl Into<String>,
        http: reqwest::Client,
        events: AuthEvents,
        forced_logout: ForcedLogoutSlot,
    ) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            base_url,
            http,
            events,
            forced_logout,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Send a request and return the parsed body.
    ///
    /// An empty body, or a 2xx body that is not JSON, comes back as
    /// `Value::Null`. Shape validation is left to the caller.
    pub async fn request(&self, path: &str, options: RequestOptions<'_>) -> Result<Value> {
        let url = format!("{}{}", self.base_url, path);
        let method = options.method.clone();
        let authenticated = options.token.is_some_and(|t| !t.is_empty());
        let started = Instant::now();

        let mut builder = self
            .http
            .request(options.method, &url)
            .header(header::CONTENT_TYPE, "application/json");
        for (name, value) in options.headers {
            builder = builder.header(name, value);
        }
        if let Some(token) = options.token.filter(|t| !t.is_empty()) {
            builder = builder.bearer_auth(token);
        }
        if let Some(body) = &options.body {
            builder = builder.body(serde_json::to_vec(body).map_err(ApiError::Encode)?);
        }

        let response = builder.send().await?;
        let status = response.status();
        let text = response.text().await?;

        debug!(
            method = %method,
            path,
            status = status.as_u16(),
            duration_ms = started.elapsed().as_millis() as u64,
            "Hub request finished"
        );

        let data = parse_body(&text);

        if status.is_success() {
            return Ok(data.unwrap_or(Value::Null));
        }

        let (code, server_message) = extract_error(data.as_ref());
        let message = server_message
            .or_else(|| {
                status
                    .canonical_reason()
                    .filter(|reason| !reason.trim().is_empty())
                    .map(str::to_string)
            })
            .unwrap_or_else(|| GENERIC_REQUEST_FAILURE.to_string());

        if status == StatusCode::UNAUTHORIZED {
            // Only a rejected bearer token ends the session; a 401 from the
            // login form is just a wrong password.
            if authenticated {
                self.invalidate_session(&message);
            }
            return Err(ApiError::SessionInvalid { code, message });
        }

        Err(ApiError::Http {
            status: status.as_u16(),
            code,
            message,
        })
    }

    fn invalidate_session(&self, message: &str) {
        let detail = if message.is_empty() {
            SESSION_EXPIRED_MESSAGE
        } else {
            message
        };
        warn!(reason = detail, "Hub rejected credentials");

        let recorded = match self.forced_logout.store(detail) {
            Ok(()) => true,
            Err(e) => {
                warn!(error = %e, "Failed to record forced logout message");
                false
            }
        };
        self.events.publish(&AuthInvalidated {
            detail: Some(detail.to_string()),
            recorded,
        });
    }
}

fn parse_body(text: &str) -> Option<Value> {
    if text.is_empty() {
        return None;
    }
    match serde_json::from_str(text) {
        Ok(value) => Some(value),
        Err(e) => {
            debug!(error = %e, "Response body is not JSON");
            None
        }
    }
}

/// Pull `(code, message)` out of an error body.
///
/// Understands `{"error": "text"}` and `{"error": {"code": ..., "message": ...}}`.
fn extract_error(data: Option<&Value>) -> (Option<String>, Option<String>) {
    let non_empty = |s: &str| {
        let trimmed = s.trim();
        (!trimmed.is_empty()).then(|| s.to_string())
    };

    match data.and_then(|d| d.get("error")) {
        Some(Value::String(text)) => {
            let code = looks_like_error_code(text).then(|| text.clone());
            (code, non_empty(text))
        }
        Some(Value::Object(body)) => {
            let code = body.get("code").and_then(Value::as_str).and_then(non_empty);
            let message = body
                .get("message")
                .and_then(Value::as_str)
                .and_then(non_empty)
                .or_else(|| code.clone());
            (code, message)
        }
        _ => (None, None),
    }
}
