// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Control-surface listener (spec §6): accepts connections on a Unix
//! domain socket, reads one length-prefixed [`cronplus_wire::Request`] per
//! connection, and writes back exactly one [`cronplus_wire::Response`].

use crate::manager::Manager;
use cronplus_config::Config;
use cronplus_core::Clock;
use cronplus_wire::{read_message, write_message, DisabledTask, Request, Response};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::net::{UnixListener, UnixStream};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

/// Everything a connection handler needs to answer a [`Request`].
pub struct ListenerCtx<C: Clock> {
    pub manager: Arc<Manager<C>>,
    pub config_path: PathBuf,
    pub current_config: parking_lot::RwLock<Config>,
}

/// Binds the control socket, removing a stale socket file left behind by an
/// unclean shutdown (spec §6: a leftover socket file must not block
/// startup).
pub fn bind(socket_path: &Path) -> Result<UnixListener, crate::DaemonError> {
    if socket_path.exists() {
        let _ = std::fs::remove_file(socket_path);
    }
    UnixListener::bind(socket_path)
        .map_err(|source| crate::DaemonError::Listen { path: socket_path.to_path_buf(), source })
}

/// Accepts connections until `cancel` fires, spawning one short-lived task
/// per connection.
pub async fn run<C: Clock + 'static>(listener: UnixListener, ctx: Arc<ListenerCtx<C>>, cancel: CancellationToken) {
    loop {
        tokio::select! {
            _ = cancel.cancelled() => return,
            accepted = listener.accept() => match accepted {
                Ok((stream, _addr)) => {
                    let ctx = Arc::clone(&ctx);
                    tokio::spawn(async move {
                        if let Err(error) = handle_connection(stream, &ctx).await {
                            debug!(%error, "control connection ended with an error");
                        }
                    });
                }
                Err(error) => warn!(%error, "control socket accept error"),
            },
        }
    }
}

async fn handle_connection<C: Clock + 'static>(mut stream: UnixStream, ctx: &ListenerCtx<C>) -> Result<(), crate::DaemonError> {
    let request: Request = read_message(&mut stream).await?;
    let response = dispatch(request, ctx).await;
    write_message(&mut stream, &response).await?;
    Ok(())
}

async fn dispatch<C: Clock + 'static>(request: Request, ctx: &ListenerCtx<C>) -> Response {
    match request {
        Request::Ping => Response::Pong,
        Request::GetConfig => {
            let config = ctx.current_config.read().clone();
            Response::Config { config: Box::new(config) }
        }
        Request::ApplyConfig { config } => apply(ctx, *config).await,
        Request::Reload => match cronplus_config::load_from_path(&ctx.config_path) {
            Ok(config) => apply(ctx, config).await,
            Err(error) => Response::Error { message: error.to_string() },
        },
        Request::TasksSnapshot => Response::TasksSnapshot { tasks: ctx.manager.snapshot() },
    }
}

async fn apply<C: Clock + 'static>(ctx: &ListenerCtx<C>, config: Config) -> Response {
    let outcome = ctx.manager.apply(&config).await;
    *ctx.current_config.write() = config;
    Response::Applied {
        added: outcome.added,
        removed: outcome.removed,
        updated: outcome.updated,
        unchanged: outcome.unchanged,
        disabled: outcome.disabled.into_iter().map(|d| DisabledTask { id: d.id, reason: d.reason }).collect(),
    }
}

#[cfg(test)]
#[path = "listener_tests.rs"]
mod tests;
