// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `cronplusd` — the Cronplus automation daemon (spec §6). Parses a
//! handful of flags, loads and applies the configured tasks, and serves
//! the control socket until asked to stop.

use cronplus_daemon::lifecycle::{self, Paths};
use std::path::PathBuf;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

const DEFAULT_CONFIG_PATH: &str = "/etc/cronplus/config.json";
const DEFAULT_SOCKET_PATH: &str = "/run/cronplus/cronplusd.sock";
const DEFAULT_STATE_DIR: &str = "/var/lib/cronplus/state";

struct Args {
    config_path: PathBuf,
    socket_path: PathBuf,
    state_dir: PathBuf,
}

fn parse_args() -> Args {
    let mut config_path = PathBuf::from(DEFAULT_CONFIG_PATH);
    let mut socket_path = PathBuf::from(DEFAULT_SOCKET_PATH);
    let mut state_dir = PathBuf::from(DEFAULT_STATE_DIR);

    let mut iter = std::env::args().skip(1);
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--config" => {
                if let Some(value) = iter.next() {
                    config_path = PathBuf::from(value);
                }
            }
            "--socket" => {
                if let Some(value) = iter.next() {
                    socket_path = PathBuf::from(value);
                }
            }
            "--state-dir" => {
                if let Some(value) = iter.next() {
                    state_dir = PathBuf::from(value);
                }
            }
            other => {
                eprintln!("cronplusd: unrecognized argument {other:?}");
                std::process::exit(1);
            }
        }
    }

    Args { config_path, socket_path, state_dir }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).json().init();
}

#[tokio::main]
async fn main() {
    init_tracing();
    let args = parse_args();

    let shutdown = CancellationToken::new();
    let signal_token = shutdown.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            signal_token.cancel();
        }
    });

    let paths = Paths { config_path: args.config_path, socket_path: args.socket_path, state_dir: args.state_dir };

    let exit_code = match lifecycle::run(paths, shutdown).await {
        Ok(()) => 0,
        Err(error @ cronplus_daemon::DaemonError::Config(_)) => {
            tracing::error!(%error, "fatal: configuration failed to load");
            1
        }
        Err(error @ cronplus_daemon::DaemonError::StateStore(_)) => {
            tracing::error!(%error, "fatal: state store failed to open");
            2
        }
        Err(error) => {
            tracing::error!(%error, "fatal: unrecoverable runtime error");
            3
        }
    };

    std::process::exit(exit_code);
}
