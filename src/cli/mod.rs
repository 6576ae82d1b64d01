//! Command handlers for the `jobboard` console.
//!
//! Each handler takes the [`AppContext`] and a writer for its output, so the
//! same code drives the binary and the integration tests.

pub mod render;
mod run;

pub use run::{RunOutcome, run_command};

use std::io::Write;

use anyhow::{Context, Result, anyhow};
use chrono::{DateTime, Utc};

use crate::context::AppContext;
use crate::error::{ApiError, UNEXPECTED_ERROR_MESSAGE, resolve_message};
use crate::models::{
    AuthCredentials, CreateNodeRequest, Credential, FinishJobRequest, FinishStatus,
    RegistrationCredentials, StartJobRequest,
};

/// Turn a client error into what the user should read.
pub fn user_facing(error: ApiError) -> anyhow::Error {
    let message = resolve_message(&error, UNEXPECTED_ERROR_MESSAGE);
    match error {
        ApiError::SessionInvalid { .. } => anyhow!(
            "{}\nYour session is no longer valid. Run `jobboard login` to sign in again.",
            message
        ),
        ApiError::MalformedResponse { .. } => {
            anyhow!("The hub returned an unexpected response: {}", message)
        }
        ApiError::Network(_) => anyhow!("Could not reach the hub: {}", message),
        ApiError::NotAuthenticated => anyhow!("Not logged in. Run `jobboard login` first."),
        _ => anyhow!(message),
    }
}

/// The active credential, or an error telling the user to log in.
///
/// A pending forced-logout reason is printed here, once.
fn require_session(ctx: &AppContext, out: &mut dyn Write) -> Result<Credential> {
    if ctx.session.is_authenticated() {
        if let Some(credential) = ctx.session.credential() {
            return Ok(credential);
        }
    }

    if let Some(reason) = ctx.session.take_forced_logout_message() {
        writeln!(out, "You were logged out: {}", reason)?;
    }
    Err(user_facing(ApiError::NotAuthenticated))
}

fn show_pending_logout_reason(ctx: &AppContext, out: &mut dyn Write) -> Result<()> {
    if let Some(reason) = ctx.session.take_forced_logout_message() {
        writeln!(out, "Previous session ended: {}", reason)?;
    }
    Ok(())
}

fn establish_session(
    ctx: &AppContext,
    out: &mut dyn Write,
    result: crate::error::Result<Credential>,
) -> Result<()> {
    let credential = match result {
        Ok(credential) => credential,
        Err(e) => {
            // A rejected password comes back as 401 too; it is not an expired session.
            if e.is_session_invalid() {
                return Err(anyhow!(resolve_message(&e, UNEXPECTED_ERROR_MESSAGE)));
            }
            return Err(user_facing(e));
        }
    };

    ctx.session
        .set_auth(credential.clone())
        .context("Failed to save credentials")?;
    writeln!(out, "Logged in to cluster {}", credential.cluster_id)?;
    Ok(())
}

pub async fn login(ctx: &AppContext, out: &mut dyn Write, credentials: AuthCredentials) -> Result<()> {
    show_pending_logout_reason(ctx, out)?;
    let result = ctx.client.login(&credentials).await;
    establish_session(ctx, out, result)
}

pub async fn register(
    ctx: &AppContext,
    out: &mut dyn Write,
    form: RegistrationCredentials,
) -> Result<()> {
    show_pending_logout_reason(ctx, out)?;
    let credentials = form.validate().map_err(user_facing)?;
    let result = ctx.client.register(&credentials).await;
    establish_session(ctx, out, result)
}

pub fn logout(ctx: &AppContext, out: &mut dyn Write) -> Result<()> {
    ctx.session.logout().context("Failed to remove stored credentials")?;
    writeln!(out, "Logged out.")?;
    Ok(())
}

pub async fn status(ctx: &AppContext, out: &mut dyn Write) -> Result<()> {
    writeln!(out, "Hub:       {}", ctx.client.transport().base_url())?;
    let credential = require_session(ctx, out)?;
    let info = ctx
        .client
        .current_cluster(&credential)
        .await
        .map_err(user_facing)?;
    write!(out, "{}", render::cluster_summary(&info))?;
    Ok(())
}

pub async fn list_nodes(ctx: &AppContext, out: &mut dyn Write) -> Result<()> {
    let credential = require_session(ctx, out)?;
    let nodes = ctx.client.fetch_nodes(&credential).await.map_err(user_facing)?;
    write!(out, "{}", render::nodes_table(&nodes))?;
    Ok(())
}

pub async fn create_node(ctx: &AppContext, out: &mut dyn Write, node_name: String) -> Result<()> {
    let credential = require_session(ctx, out)?;
    let created = ctx
        .client
        .create_node(&credential, &CreateNodeRequest::new(node_name))
        .await
        .map_err(user_facing)?;

    write!(out, "{}", render::nodes_table(std::slice::from_ref(&created.node)))?;
    match created.token {
        Some(token) => {
            writeln!(out)?;
            writeln!(out, "Node token (shown only once, store it now):")?;
            writeln!(out, "  {}", token.expose())?;
        }
        None => writeln!(out, "The hub did not return a node token.")?,
    }
    Ok(())
}

pub async fn delete_node(ctx: &AppContext, out: &mut dyn Write, node_id: i64) -> Result<()> {
    let credential = require_session(ctx, out)?;
    ctx.client
        .delete_node(&credential, node_id)
        .await
        .map_err(user_facing)?;
    writeln!(out, "Deleted node {}", node_id)?;
    Ok(())
}

pub async fn list_jobs(ctx: &AppContext, out: &mut dyn Write, node_id: Option<i64>) -> Result<()> {
    let credential = require_session(ctx, out)?;
    let jobs = match node_id {
        Some(node_id) => ctx.client.fetch_node_jobs(&credential, node_id).await,
        None => ctx.client.fetch_jobs(&credential).await,
    }
    .map_err(user_facing)?;
    write!(out, "{}", render::jobs_table(&jobs))?;
    Ok(())
}

pub async fn show_job(ctx: &AppContext, out: &mut dyn Write, job_id: i64) -> Result<()> {
    let credential = require_session(ctx, out)?;
    let job = ctx
        .client
        .fetch_job(&credential, job_id)
        .await
        .map_err(user_facing)?;
    write!(out, "{}", render::job_detail(&job))?;
    Ok(())
}

pub async fn trigger_start(
    ctx: &AppContext,
    out: &mut dyn Write,
    node_token: String,
    tag: Option<String>,
    started_at: Option<DateTime<Utc>>,
) -> Result<()> {
    if node_token.is_empty() {
        return Err(user_facing(ApiError::invalid_input("node_token", "must not be empty")));
    }
    let request = StartJobRequest {
        node_token,
        tag: tag.filter(|t| !t.is_empty()),
        started_at: started_at.unwrap_or_else(Utc::now),
    };
    let accepted = ctx.client.start_job(&request).await.map_err(user_facing)?;
    writeln!(out, "Job start {}", if accepted { "recorded" } else { "not accepted" })?;
    Ok(())
}

pub struct FinishArgs {
    pub node_token: String,
    pub status: FinishStatus,
    pub duration_hours: f64,
    pub finished_at: Option<DateTime<Utc>>,
    pub error_text: Option<String>,
}

pub async fn trigger_finish(ctx: &AppContext, out: &mut dyn Write, args: FinishArgs) -> Result<()> {
    if args.node_token.is_empty() {
        return Err(user_facing(ApiError::invalid_input("node_token", "must not be empty")));
    }
    if !args.duration_hours.is_finite() || args.duration_hours < 0.0 {
        return Err(user_facing(ApiError::invalid_input(
            "duration_hours",
            "must be a non-negative number",
        )));
    }

    let request = FinishJobRequest {
        node_token: args.node_token,
        status: args.status,
        finished_at: args.finished_at.unwrap_or_else(Utc::now),
        duration_hours: args.duration_hours,
        error_text: args
            .error_text
            .map(|e| e.trim().to_string())
            .filter(|e| !e.is_empty()),
    };
    let accepted = ctx.client.finish_job(&request).await.map_err(user_facing)?;
    writeln!(out, "Job finish {}", if accepted { "recorded" } else { "not accepted" })?;
    Ok(())
}

pub fn show_config(ctx: &AppContext, out: &mut dyn Write) -> Result<()> {
    let rendered = toml::to_string_pretty(ctx.config.as_ref()).context("Failed to serialize config")?;
    write!(out, "{}", rendered)?;
    Ok(())
}
