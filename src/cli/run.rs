//! `jobboard run`: execute a command and report it to the hub as a job.

use std::io::Write;
use std::process::Stdio;
use std::time::Instant;

use anyhow::{Result, anyhow};
use chrono::Utc;
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::process::Command;
use tracing::{info, warn};

use crate::context::AppContext;
use crate::models::{FinishJobRequest, FinishStatus, StartJobRequest};

/// Keep only the tail of the command's output as the job's error text.
const MAX_CAPTURED_OUTPUT: usize = 8 * 1024;

#[derive(Debug, Clone, PartialEq)]
pub struct RunOutcome {
    pub exit_code: i32,
    pub status: FinishStatus,
    pub error_text: Option<String>,
}

/// Copy `reader` to stderr as it arrives and return the last
/// [`MAX_CAPTURED_OUTPUT`] bytes.
async fn tee_to_stderr<R: AsyncRead + Unpin>(mut reader: R) -> Vec<u8> {
    let mut captured = Vec::new();
    let mut buffer = [0u8; 4096];
    loop {
        match reader.read(&mut buffer).await {
            Ok(0) => break,
            Ok(n) => {
                let chunk = &buffer[..n];
                let _ = std::io::stderr().write_all(chunk);
                captured.extend_from_slice(chunk);
                if captured.len() > MAX_CAPTURED_OUTPUT {
                    captured.drain(..captured.len() - MAX_CAPTURED_OUTPUT);
                }
            }
            Err(e) => {
                warn!(error = %e, "Failed to read command output");
                break;
            }
        }
    }
    captured
}

/// Run `command` to completion, or until Ctrl-C.
async fn execute(command: &[String]) -> RunOutcome {
    let Some((program, args)) = command.split_first() else {
        return failed(1, "no command provided to run".to_string());
    };

    let mut child = match Command::new(program)
        .args(args)
        .stdin(Stdio::inherit())
        .stdout(Stdio::piped())
        .kill_on_drop(true)
        .spawn()
    {
        Ok(child) => child,
        Err(e) => return failed(1, format!("failed to execute {}: {}", program, e)),
    };

    let reader = child.stdout.take().map(|stdout| tokio::spawn(tee_to_stderr(stdout)));

    let waited = tokio::select! {
        status = child.wait() => Some(status),
        _ = tokio::signal::ctrl_c() => None,
    };
    if waited.is_none() {
        let _ = child.kill().await;
    }

    let output = match reader {
        Some(handle) => handle.await.unwrap_or_default(),
        None => Vec::new(),
    };
    let output = String::from_utf8_lossy(&output).trim().to_string();

    match waited {
        None => failed(130, "terminated by signal: interrupt".to_string()),
        Some(Err(e)) => failed(1, format!("failed to wait for {}: {}", program, e)),
        Some(Ok(status)) if status.success() => RunOutcome {
            exit_code: 0,
            status: FinishStatus::Completed,
            error_text: None,
        },
        Some(Ok(status)) => {
            let exit_code = status.code().unwrap_or(1);
            let error_text = if output.is_empty() {
                format!("Exit code: {}", exit_code)
            } else {
                output
            };
            failed(exit_code, error_text)
        }
    }
}

fn failed(exit_code: i32, error_text: String) -> RunOutcome {
    RunOutcome {
        exit_code,
        status: FinishStatus::Failed,
        error_text: Some(error_text),
    }
}

/// Run `command`, reporting start and finish with `node_token` when one is set.
///
/// Hub failures are printed as warnings and never change the outcome.
pub async fn run_command(
    ctx: &AppContext,
    out: &mut dyn Write,
    node_token: String,
    tag: Option<String>,
    command: Vec<String>,
) -> Result<RunOutcome> {
    if command.is_empty() {
        return Err(anyhow!("No command given. Usage: jobboard run -- <command> [args...]"));
    }

    let reporting = !node_token.is_empty();
    let started = Instant::now();
    let mut hub_started = false;

    if reporting {
        let request = StartJobRequest {
            node_token: node_token.clone(),
            tag: tag.filter(|t| !t.is_empty()),
            started_at: Utc::now(),
        };
        match ctx.client.start_job(&request).await {
            Ok(true) => hub_started = true,
            Ok(false) => writeln!(out, "warning: hub did not accept job start")?,
            Err(e) => writeln!(out, "warning: failed to notify hub start: {}", e)?,
        }
    }

    let outcome = execute(&command).await;
    let elapsed = started.elapsed();
    info!(
        command = %command.join(" "),
        exit_code = outcome.exit_code,
        duration_ms = elapsed.as_millis() as u64,
        "Command finished"
    );

    if hub_started {
        let request = FinishJobRequest {
            node_token,
            status: outcome.status,
            finished_at: Utc::now(),
            duration_hours: elapsed.as_secs_f64() / 3600.0,
            error_text: outcome.error_text.clone(),
        };
        match ctx.client.finish_job(&request).await {
            Ok(true) => {}
            Ok(false) => writeln!(out, "warning: hub did not accept job finish")?,
            Err(e) => writeln!(out, "warning: failed to notify hub finish: {}", e)?,
        }
    }

    Ok(outcome)
}
