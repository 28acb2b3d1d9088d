// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::sync::Arc;
use std::time::Duration;

use logi_adapters::{MemoryNetwork, MemoryStock, MemoryTransport};
use logi_core::{FakeClock, StaticRecipeBook, StockSnapshot};
use logi_engine::{Server, ServerConfig};
use logi_wire::{Query, Request, Response, PROTOCOL_VERSION};
use tokio::net::UnixStream;
use tokio_util::sync::CancellationToken;

use super::*;

const TIMEOUT: Duration = Duration::from_secs(5);

fn server() -> Server<MemoryTransport, MemoryStock, FakeClock> {
    let net = MemoryNetwork::new();
    let config = ServerConfig { label: "base".to_string(), ..ServerConfig::default() };
    Server::new(
        config,
        net.join(42),
        MemoryStock::new(StockSnapshot::new()),
        Arc::new(StaticRecipeBook::new()),
        FakeClock::new(),
    )
}

fn ctx() -> ListenCtx {
    ListenCtx { server: Arc::new(server()), shutdown: CancellationToken::new() }
}

#[test]
fn ping_pongs() {
    assert_eq!(handle_request(Request::Ping, &ctx()), Response::Pong);
}

#[yare::parameterized(
    same_version = { PROTOCOL_VERSION },
    other_version = { "0.0.1" },
)]
fn hello_answers_with_daemon_version(client: &str) {
    let response = handle_request(Request::Hello { version: client.to_string() }, &ctx());
    assert_eq!(response, Response::Hello { version: PROTOCOL_VERSION.to_string() });
}

#[test]
fn status_query_reports_label() {
    let response = handle_request(Request::Query { query: Query::Status }, &ctx());
    let Response::Status { status } = response else {
        panic!("expected status, got {response:?}");
    };
    assert_eq!(status.server_label, "base");
    assert_eq!(status.crafters_total, 0);
}

#[test]
fn empty_server_lists_nothing() {
    let ctx = ctx();
    assert_eq!(
        handle_request(Request::Query { query: Query::ListJobs }, &ctx),
        Response::Jobs { jobs: vec![] }
    );
    assert_eq!(
        handle_request(
            Request::Query { query: Query::History { status: None, item: None, limit: None } },
            &ctx
        ),
        Response::History { jobs: vec![] }
    );
    assert_eq!(
        handle_request(Request::Query { query: Query::ListAgents { role: None } }, &ctx),
        Response::Agents { agents: vec![] }
    );
}

#[test]
fn clear_queue_reports_removed() {
    assert_eq!(handle_request(Request::ClearQueue, &ctx()), Response::Cleared { removed: 0 });
}

#[test]
fn shutdown_cancels_token() {
    let ctx = ctx();
    assert_eq!(handle_request(Request::Shutdown, &ctx), Response::ShuttingDown);
    assert!(ctx.shutdown.is_cancelled());
}

#[tokio::test]
async fn socket_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("daemon.sock");
    let unix = UnixListener::bind(&path).unwrap();
    let cancel = CancellationToken::new();
    let listener = Listener::new(unix, Arc::new(ctx()));
    let task = tokio::spawn(listener.run(cancel.clone()));

    let stream = UnixStream::connect(&path).await.unwrap();
    let (mut reader, mut writer) = stream.into_split();
    logi_wire::write_request(&mut writer, &Request::Ping, TIMEOUT).await.unwrap();
    let response = logi_wire::read_response(&mut reader, TIMEOUT).await.unwrap();
    assert_eq!(response, Response::Pong);

    cancel.cancel();
    task.await.unwrap();
}

#[tokio::test]
async fn client_hanging_up_is_not_fatal() {
    let (client, server) = tokio::io::duplex(64);
    drop(client);
    let (reader, writer) = tokio::io::split(server);
    let result = handle_connection(reader, writer, &ctx()).await;
    assert!(matches!(result, Err(ConnectionError::Protocol(ProtocolError::ConnectionClosed))));
}
