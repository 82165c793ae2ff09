// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! `cronplus` — the control surface client (spec §6): a thin, scriptable
//! front end to `cronplusd`'s Unix domain socket (`ping`, `config get`,
//! `config apply`, `reload`, `tasks`).

mod client;
mod exit_error;
mod output;

use anyhow::{anyhow, Result};
use clap::{Parser, Subcommand};
use client::DaemonClient;
use exit_error::ExitError;
use output::OutputFormat;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "cronplus", version, about = "Control surface client for cronplusd")]
struct Cli {
    /// Path to the daemon's control socket.
    #[arg(long, global = true)]
    socket: Option<PathBuf>,

    /// Output format.
    #[arg(long, value_enum, global = true, default_value_t = OutputFormat::Text)]
    output: OutputFormat,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Health check against the running daemon.
    Ping,
    /// Inspect or replace the daemon's applied configuration.
    #[command(subcommand)]
    Config(ConfigCommand),
    /// Re-read the configuration file from disk and apply it.
    Reload,
    /// List every configured task and its reconciled state.
    Tasks,
}

#[derive(Subcommand)]
enum ConfigCommand {
    /// Print the currently-applied configuration.
    Get,
    /// Apply a new configuration document from a local file.
    Apply {
        /// Path to a cronplus configuration JSON document.
        path: PathBuf,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    let socket_path = client::resolve_socket_path(cli.socket.as_deref());
    let client = DaemonClient::new(socket_path);

    if let Err(error) = run(client, cli.command, cli.output).await {
        if let Some(exit_error) = error.downcast_ref::<ExitError>() {
            eprintln!("{exit_error}");
            std::process::exit(exit_error.code);
        }
        eprintln!("cronplus: {error}");
        std::process::exit(1);
    }
}

async fn run(client: DaemonClient, command: Command, format: OutputFormat) -> Result<()> {
    match command {
        Command::Ping => ping(&client, format).await,
        Command::Config(ConfigCommand::Get) => config_get(&client, format).await,
        Command::Config(ConfigCommand::Apply { path }) => config_apply(&client, &path, format).await,
        Command::Reload => reload(&client, format).await,
        Command::Tasks => tasks(&client, format).await,
    }
}

async fn ping(client: &DaemonClient, format: OutputFormat) -> Result<()> {
    client.ping().await.map_err(not_running_err)?;
    output::format_or_json(format, &serde_json::json!({ "status": "ok" }), || println!("pong"))
}

async fn config_get(client: &DaemonClient, format: OutputFormat) -> Result<()> {
    let config = client.get_config().await.map_err(not_running_err)?;
    output::format_or_json(format, &config, || {
        println!("version: {}", config.version);
        println!("tasks: {}", config.tasks.len());
        for task in &config.tasks {
            println!("  - {} (enabled={}, directory={})", task.id, task.enabled, task.watch.directory);
        }
    })
}

async fn config_apply(client: &DaemonClient, path: &std::path::Path, format: OutputFormat) -> Result<()> {
    let config = cronplus_config::load_from_path(path)
        .map_err(|error| ExitError::new(1, format!("invalid configuration at {}: {error}", path.display())))?;
    let outcome = client.apply_config(config).await.map_err(not_running_err)?;
    output::print_applied(format, outcome.added, outcome.removed, outcome.updated, outcome.unchanged, &outcome.disabled)
}

async fn reload(client: &DaemonClient, format: OutputFormat) -> Result<()> {
    let outcome = client.reload().await.map_err(not_running_err)?;
    output::print_applied(format, outcome.added, outcome.removed, outcome.updated, outcome.unchanged, &outcome.disabled)
}

async fn tasks(client: &DaemonClient, format: OutputFormat) -> Result<()> {
    let tasks = client.tasks_snapshot().await.map_err(not_running_err)?;
    output::print_tasks_snapshot(format, &tasks)
}

/// Maps a [`client::ClientError`] to the exit-code-carrying [`ExitError`],
/// giving "daemon not running" its own exit code rather than a generic 1
/// (spec §6 exit codes cover the daemon process; the CLI's own codes are
/// its own contract with scripts).
fn not_running_err(error: client::ClientError) -> anyhow::Error {
    if error.is_not_running() {
        anyhow!(ExitError::new(2, "cronplusd is not running (or its control socket is unreachable)"))
    } else {
        anyhow!(ExitError::new(1, error.to_string()))
    }
}
