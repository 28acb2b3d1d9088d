// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Daemon client: one request per connection over the IPC socket.

use std::path::PathBuf;
use std::time::Duration;

use logi_core::{HistoryFilter, Job, Role};
use logi_daemon::{LifecycleError, Paths};
use logi_wire::{AgentEntry, ProtocolError, Query, Request, Response, StatusSummary};
use thiserror::Error;
use tokio::net::UnixStream;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("logi daemon is not running")]
    DaemonNotRunning,

    #[error(transparent)]
    Lifecycle(#[from] LifecycleError),

    #[error("connection failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("protocol error: {0}")]
    Protocol(#[from] ProtocolError),

    #[error("daemon error: {0}")]
    Rejected(String),

    #[error("unexpected response from daemon")]
    UnexpectedResponse,
}

pub struct DaemonClient {
    socket_path: PathBuf,
    timeout: Duration,
}

impl DaemonClient {
    /// Client for the daemon owning the configured state directory.
    pub fn connect() -> Result<Self, ClientError> {
        Self::at(Paths::load()?.socket_path)
    }

    pub fn at(socket_path: PathBuf) -> Result<Self, ClientError> {
        if !socket_path.exists() {
            return Err(ClientError::DaemonNotRunning);
        }
        Ok(Self { socket_path, timeout: logi_daemon::env::ipc_timeout() })
    }

    pub async fn send(&self, request: &Request) -> Result<Response, ClientError> {
        let stream = match UnixStream::connect(&self.socket_path).await {
            Ok(stream) => stream,
            // Socket left behind by a daemon that died without cleanup
            Err(e) if e.kind() == std::io::ErrorKind::ConnectionRefused => {
                return Err(ClientError::DaemonNotRunning)
            }
            Err(e) => return Err(e.into()),
        };
        let (mut reader, mut writer) = stream.into_split();
        logi_wire::write_request(&mut writer, request, self.timeout).await?;
        Ok(logi_wire::read_response(&mut reader, self.timeout).await?)
    }

    fn reject<T>(response: Response) -> Result<T, ClientError> {
        match response {
            Response::Error { message } => Err(ClientError::Rejected(message)),
            _ => Err(ClientError::UnexpectedResponse),
        }
    }

    async fn query(&self, query: Query) -> Result<Response, ClientError> {
        self.send(&Request::Query { query }).await
    }

    pub async fn status(&self) -> Result<StatusSummary, ClientError> {
        match self.query(Query::Status).await? {
            Response::Status { status } => Ok(*status),
            other => Self::reject(other),
        }
    }

    pub async fn jobs(&self) -> Result<Vec<Job>, ClientError> {
        match self.query(Query::ListJobs).await? {
            Response::Jobs { jobs } => Ok(jobs),
            other => Self::reject(other),
        }
    }

    pub async fn history(&self, filter: HistoryFilter) -> Result<Vec<Job>, ClientError> {
        let query =
            Query::History { status: filter.status, item: filter.item, limit: filter.limit };
        match self.query(query).await? {
            Response::History { jobs } => Ok(jobs),
            other => Self::reject(other),
        }
    }

    pub async fn agents(&self, role: Option<Role>) -> Result<Vec<AgentEntry>, ClientError> {
        match self.query(Query::ListAgents { role }).await? {
            Response::Agents { agents } => Ok(agents),
            other => Self::reject(other),
        }
    }

    /// Returns how many pending jobs were dropped.
    pub async fn clear_queue(&self) -> Result<usize, ClientError> {
        match self.send(&Request::ClearQueue).await? {
            Response::Cleared { removed } => Ok(removed),
            other => Self::reject(other),
        }
    }

    pub async fn shutdown(&self) -> Result<(), ClientError> {
        match self.send(&Request::Shutdown).await? {
            Response::ShuttingDown | Response::Ok => Ok(()),
            other => Self::reject(other),
        }
    }
}

#[cfg(test)]
#[path = "client_tests.rs"]
mod tests;
