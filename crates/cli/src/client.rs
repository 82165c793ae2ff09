// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! A thin client for the control surface (spec §6): one Unix domain socket
//! connection per request/response round trip, matching
//! `cronplus-daemon::listener`'s one-request-per-connection protocol.

use cronplus_config::Config;
use cronplus_wire::{read_message, write_message, DisabledTask, ProtocolError, Request, Response, TaskSnapshot};
use std::io;
use std::path::{Path, PathBuf};
use tokio::net::UnixStream;

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("could not connect to the daemon control socket at {path}: {source}")]
    Connect { path: PathBuf, source: io::Error },
    #[error(transparent)]
    Protocol(#[from] ProtocolError),
    #[error("the daemon rejected the request: {0}")]
    Daemon(String),
    #[error("unexpected response from the daemon")]
    UnexpectedResponse,
}

impl ClientError {
    /// Whether this error looks like "nothing is listening", i.e. the
    /// daemon is not running (as opposed to a protocol-level failure).
    pub fn is_not_running(&self) -> bool {
        matches!(
            self,
            ClientError::Connect { source, .. }
                if matches!(source.kind(), io::ErrorKind::NotFound | io::ErrorKind::ConnectionRefused)
        )
    }
}

/// Connects to `cronplusd`'s control socket for exactly one request.
pub struct DaemonClient {
    socket_path: PathBuf,
}

impl DaemonClient {
    pub fn new(socket_path: impl Into<PathBuf>) -> Self {
        Self { socket_path: socket_path.into() }
    }

    async fn send(&self, request: &Request) -> Result<Response, ClientError> {
        let mut stream = UnixStream::connect(&self.socket_path)
            .await
            .map_err(|source| ClientError::Connect { path: self.socket_path.clone(), source })?;
        write_message(&mut stream, request).await?;
        let response: Response = read_message(&mut stream).await?;
        Ok(response)
    }

    fn reject<T>(response: Response) -> Result<T, ClientError> {
        match response {
            Response::Error { message } => Err(ClientError::Daemon(message)),
            _ => Err(ClientError::UnexpectedResponse),
        }
    }

    pub async fn ping(&self) -> Result<(), ClientError> {
        match self.send(&Request::Ping).await? {
            Response::Pong => Ok(()),
            other => Self::reject(other),
        }
    }

    pub async fn get_config(&self) -> Result<Config, ClientError> {
        match self.send(&Request::GetConfig).await? {
            Response::Config { config } => Ok(*config),
            other => Self::reject(other),
        }
    }

    pub async fn apply_config(&self, config: Config) -> Result<AppliedOutcome, ClientError> {
        let request = Request::ApplyConfig { config: Box::new(config) };
        match self.send(&request).await? {
            Response::Applied { added, removed, updated, unchanged, disabled } => {
                Ok(AppliedOutcome { added, removed, updated, unchanged, disabled })
            }
            other => Self::reject(other),
        }
    }

    pub async fn reload(&self) -> Result<AppliedOutcome, ClientError> {
        match self.send(&Request::Reload).await? {
            Response::Applied { added, removed, updated, unchanged, disabled } => {
                Ok(AppliedOutcome { added, removed, updated, unchanged, disabled })
            }
            other => Self::reject(other),
        }
    }

    pub async fn tasks_snapshot(&self) -> Result<Vec<TaskSnapshot>, ClientError> {
        match self.send(&Request::TasksSnapshot).await? {
            Response::TasksSnapshot { tasks } => Ok(tasks),
            other => Self::reject(other),
        }
    }
}

/// Result of an `applyConfig`/`reload` round trip (spec §4.8).
pub struct AppliedOutcome {
    pub added: usize,
    pub removed: usize,
    pub updated: usize,
    pub unchanged: usize,
    pub disabled: Vec<DisabledTask>,
}

pub fn default_socket_path() -> PathBuf {
    PathBuf::from("/run/cronplus/cronplusd.sock")
}

pub fn resolve_socket_path(override_path: Option<&Path>) -> PathBuf {
    override_path.map(Path::to_path_buf).unwrap_or_else(default_socket_path)
}

#[cfg(test)]
#[path = "client_tests.rs"]
mod tests;
