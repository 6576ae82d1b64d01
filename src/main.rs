use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use clap::{Args, Parser, Subcommand, ValueEnum};
use jobboard::cli::{self, FinishArgs};
use jobboard::models::{AuthCredentials, FinishStatus, RegistrationCredentials};
use jobboard::{config, context, logging};
use serde::Serialize;

#[derive(Parser)]
#[command(name = "jobboard")]
#[command(about = "Console for the jobboard cluster hub", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    #[command(flatten)]
    global: GlobalArgs,
}

#[derive(Args, Serialize)]
struct GlobalArgs {
    /// Hub base URL, e.g. http://localhost:8080
    #[serde(skip_serializing_if = "Option::is_none")]
    #[arg(long, global = true)]
    api_base_url: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    #[arg(long, global = true)]
    request_timeout_secs: Option<u64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    #[arg(long, global = true)]
    state_dir: Option<PathBuf>,

    #[serde(skip_serializing_if = "Option::is_none")]
    #[arg(long, global = true)]
    verbose: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    #[arg(long, global = true)]
    json_logs: Option<bool>,
}

#[derive(Subcommand)]
enum Commands {
    /// Log in to a cluster
    Login(LoginArgs),
    /// Create a cluster and log in to it
    Register(RegisterArgs),
    /// Forget the stored credential
    Logout,
    /// Show the current session
    Status,
    /// Manage worker nodes
    #[command(subcommand)]
    Nodes(NodeCommands),
    /// Inspect job history
    #[command(subcommand)]
    Jobs(JobCommands),
    /// Report job progress as a worker node
    #[command(subcommand)]
    Trigger(TriggerCommands),
    /// Run a command and report it to the hub as a job of this node
    Run(RunArgs),
    /// Print the effective configuration
    Config,
}

#[derive(Args)]
struct RunArgs {
    /// Falls back to $JOBBOARD_NODE_TOKEN; without one the command runs unreported
    #[arg(long)]
    node_token: Option<String>,
    #[arg(long)]
    tag: Option<String>,
    #[arg(trailing_var_arg = true, allow_hyphen_values = true, required = true)]
    command: Vec<String>,
}

#[derive(Args)]
struct LoginArgs {
    #[arg(long)]
    cluster_id: String,
    /// Falls back to $JOBBOARD_PASSWORD, then a prompt
    #[arg(long)]
    password: Option<String>,
}

#[derive(Args)]
struct RegisterArgs {
    #[arg(long)]
    cluster_id: String,
    #[arg(long)]
    password: Option<String>,
    #[arg(long)]
    confirm_password: Option<String>,
}

#[derive(Subcommand)]
enum NodeCommands {
    List,
    Create { name: String },
    Delete { id: i64 },
}

#[derive(Subcommand)]
enum JobCommands {
    List {
        /// Only jobs of this node
        #[arg(long)]
        node: Option<i64>,
    },
    Show {
        id: i64,
    },
}

#[derive(Subcommand)]
enum TriggerCommands {
    Start {
        /// Falls back to $JOBBOARD_NODE_TOKEN
        #[arg(long)]
        node_token: Option<String>,
        #[arg(long)]
        tag: Option<String>,
        /// RFC 3339; defaults to now
        #[arg(long)]
        started_at: Option<DateTime<Utc>>,
    },
    Finish {
        #[arg(long)]
        node_token: Option<String>,
        #[arg(long, value_enum, default_value = "completed")]
        status: StatusArg,
        #[arg(long)]
        duration_hours: f64,
        #[arg(long)]
        finished_at: Option<DateTime<Utc>>,
        #[arg(long)]
        error_text: Option<String>,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum StatusArg {
    Completed,
    Failed,
}

impl From<StatusArg> for FinishStatus {
    fn from(status: StatusArg) -> Self {
        match status {
            StatusArg::Completed => FinishStatus::Completed,
            StatusArg::Failed => FinishStatus::Failed,
        }
    }
}

fn prompt(label: &str) -> Result<String> {
    eprint!("{}: ", label);
    io::stderr().flush()?;
    let mut line = String::new();
    io::stdin()
        .lock()
        .read_line(&mut line)
        .context("Failed to read from stdin")?;
    Ok(line.trim_end_matches(['\r', '\n']).to_string())
}

fn password_or_prompt(value: Option<String>, label: &str) -> Result<String> {
    match value.or_else(|| std::env::var("JOBBOARD_PASSWORD").ok()) {
        Some(password) => Ok(password),
        None => prompt(label),
    }
}

fn node_token(value: Option<String>) -> String {
    value
        .or_else(|| std::env::var("JOBBOARD_NODE_TOKEN").ok())
        .unwrap_or_default()
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = config::AppConfig::new(Some(&cli.global))?;
    logging::init(logging::LogConfig {
        json: config.json_logs,
        verbose: config.verbose,
    });

    let ctx = context::AppContext::new(config)?;
    let mut stdout = io::stdout().lock();
    let out: &mut dyn Write = &mut stdout;

    match cli.command {
        Commands::Login(args) => {
            let password = password_or_prompt(args.password, "Password")?;
            cli::login(&ctx, out, AuthCredentials::new(args.cluster_id, password)).await
        }
        Commands::Register(args) => {
            let interactive =
                args.password.is_none() && std::env::var_os("JOBBOARD_PASSWORD").is_none();
            let password = password_or_prompt(args.password, "Password")?;
            let confirm_password = match args.confirm_password {
                Some(confirm) => confirm,
                None if interactive => prompt("Confirm password")?,
                None => password.clone(),
            };
            let form = RegistrationCredentials {
                cluster_id: args.cluster_id,
                password,
                confirm_password,
            };
            cli::register(&ctx, out, form).await
        }
        Commands::Logout => cli::logout(&ctx, out),
        Commands::Status => cli::status(&ctx, out).await,
        Commands::Nodes(command) => match command {
            NodeCommands::List => cli::list_nodes(&ctx, out).await,
            NodeCommands::Create { name } => cli::create_node(&ctx, out, name).await,
            NodeCommands::Delete { id } => cli::delete_node(&ctx, out, id).await,
        },
        Commands::Jobs(command) => match command {
            JobCommands::List { node } => cli::list_jobs(&ctx, out, node).await,
            JobCommands::Show { id } => cli::show_job(&ctx, out, id).await,
        },
        Commands::Trigger(command) => match command {
            TriggerCommands::Start {
                node_token: token,
                tag,
                started_at,
            } => cli::trigger_start(&ctx, out, node_token(token), tag, started_at).await,
            TriggerCommands::Finish {
                node_token: token,
                status,
                duration_hours,
                finished_at,
                error_text,
            } => {
                let args = FinishArgs {
                    node_token: node_token(token),
                    status: status.into(),
                    duration_hours,
                    finished_at,
                    error_text,
                };
                cli::trigger_finish(&ctx, out, args).await
            }
        },
        Commands::Run(args) => {
            let outcome =
                cli::run_command(&ctx, out, node_token(args.node_token), args.tag, args.command)
                    .await?;
            if outcome.exit_code != 0 {
                out.flush()?;
                std::process::exit(outcome.exit_code);
            }
            Ok(())
        }
        Commands::Config => cli::show_config(&ctx, out),
    }
}
