// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Listener task for handling socket I/O.
//!
//! The Listener accepts CLI connections on the Unix socket and answers one
//! request per connection from the server's read accessors.

use std::sync::Arc;

use logi_adapters::{StockOracle, Transport};
use logi_core::{Clock, HistoryFilter, Job, Role};
use logi_engine::Server;
use logi_wire::{self as wire, AgentEntry, ProtocolError, Query, Request, Response, StatusSummary};
use logi_wire::PROTOCOL_VERSION;
use thiserror::Error;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite};
use tokio::net::UnixListener;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::env::ipc_timeout;

/// What the listener needs from the running server.
pub trait ServerView: Send + Sync {
    fn status(&self) -> StatusSummary;
    fn jobs(&self) -> Vec<Job>;
    fn history(&self, filter: &HistoryFilter) -> Vec<Job>;
    fn agents(&self, role: Option<Role>) -> Vec<AgentEntry>;
    fn clear_queue(&self) -> usize;
}

impl<T, S, C> ServerView for Server<T, S, C>
where
    T: Transport,
    S: StockOracle,
    C: Clock,
{
    fn status(&self) -> StatusSummary {
        Server::status(self)
    }

    fn jobs(&self) -> Vec<Job> {
        Server::jobs(self)
    }

    fn history(&self, filter: &HistoryFilter) -> Vec<Job> {
        Server::history(self, filter)
    }

    fn agents(&self, role: Option<Role>) -> Vec<AgentEntry> {
        Server::agents(self, role)
    }

    fn clear_queue(&self) -> usize {
        Server::clear_queue(self)
    }
}

/// Shared daemon context for all request handlers.
pub struct ListenCtx {
    pub server: Arc<dyn ServerView>,
    /// Cancelled by a `Shutdown` request
    pub shutdown: CancellationToken,
}

/// Listener task for accepting socket connections.
pub struct Listener {
    unix: UnixListener,
    ctx: Arc<ListenCtx>,
}

/// Errors from connection handling.
#[derive(Debug, Error)]
pub enum ConnectionError {
    #[error("Protocol error: {0}")]
    Protocol(#[from] ProtocolError),
}

impl Listener {
    pub fn new(unix: UnixListener, ctx: Arc<ListenCtx>) -> Self {
        Self { unix, ctx }
    }

    /// Accept connections until `cancel` fires, one task per connection.
    pub async fn run(self, cancel: CancellationToken) {
        loop {
            tokio::select! {
                _ = cancel.cancelled() => break,
                accepted = self.unix.accept() => match accepted {
                    Ok((stream, _)) => {
                        let ctx = Arc::clone(&self.ctx);
                        tokio::spawn(async move {
                            let (reader, writer) = stream.into_split();
                            if let Err(e) = handle_connection(reader, writer, &ctx).await {
                                log_connection_error(e);
                            }
                        });
                    }
                    Err(e) => error!("Unix accept error: {}", e),
                },
            }
        }
    }
}

fn log_connection_error(e: ConnectionError) {
    match e {
        ConnectionError::Protocol(ProtocolError::ConnectionClosed) => debug!("Client disconnected"),
        ConnectionError::Protocol(ProtocolError::Timeout) => warn!("Connection timeout"),
        _ => error!("Connection error: {}", e),
    }
}

/// Handle a single client connection: one request, one response.
pub(crate) async fn handle_connection<R, W>(
    mut reader: R,
    mut writer: W,
    ctx: &ListenCtx,
) -> Result<(), ConnectionError>
where
    R: AsyncRead + AsyncReadExt + Unpin + Send,
    W: AsyncWrite + Unpin + Send,
{
    let request = wire::read_request(&mut reader, ipc_timeout()).await?;

    // Queries are frequent polling; everything else is worth an info line
    if matches!(request, Request::Query { .. }) {
        debug!(request = ?request, "received query");
    } else {
        info!(request = ?request, "received request");
    }

    let response = handle_request(request, ctx);
    debug!("Sending response: {:?}", response);
    wire::write_response(&mut writer, &response, ipc_timeout()).await?;
    Ok(())
}

/// Handle a single request and return a response.
pub(crate) fn handle_request(request: Request, ctx: &ListenCtx) -> Response {
    match request {
        Request::Ping => Response::Pong,

        Request::Hello { version } => {
            if version != PROTOCOL_VERSION {
                warn!(client = %version, daemon = PROTOCOL_VERSION, "protocol version mismatch");
            }
            Response::Hello { version: PROTOCOL_VERSION.to_string() }
        }

        Request::Query { query } => handle_query(ctx.server.as_ref(), query),

        Request::ClearQueue => {
            let removed = ctx.server.clear_queue();
            info!(removed, "cleared pending jobs");
            Response::Cleared { removed }
        }

        Request::Shutdown => {
            ctx.shutdown.cancel();
            Response::ShuttingDown
        }
    }
}

fn handle_query(server: &dyn ServerView, query: Query) -> Response {
    match query {
        Query::Status => Response::Status { status: Box::new(server.status()) },
        Query::ListJobs => Response::Jobs { jobs: server.jobs() },
        Query::History { .. } => Response::History { jobs: server.history(&query.history_filter()) },
        Query::ListAgents { role } => Response::Agents { agents: server.agents(role) },
    }
}

#[cfg(test)]
#[path = "../listener_tests.rs"]
mod tests;
