// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Read accessors served over the daemon socket.

use std::sync::Arc;
use std::time::Duration;

use logi_daemon::{ListenCtx, Listener};
use logi_wire::{Query, Request, Response};
use tokio::net::{UnixListener, UnixStream};
use tokio_util::sync::CancellationToken;

use crate::prelude::*;

const IPC: Duration = Duration::from_secs(5);

async fn ask(socket: &std::path::Path, request: Request) -> Response {
    let stream = UnixStream::connect(socket).await.unwrap();
    let (mut reader, mut writer) = stream.into_split();
    logi_wire::write_request(&mut writer, &request, IPC).await.unwrap();
    logi_wire::read_response(&mut reader, IPC).await.unwrap()
}

#[tokio::test]
async fn socket_reports_finished_work() {
    let mut world = World::new(
        World::crafting(&[("minecraft:torch", 16)]),
        &[("minecraft:coal", 10), ("minecraft:stick", 10)],
    );
    world.start();
    world.spawn_crafter("crafter-1");
    assert!(world.settle(|w| !w.history().is_empty()).await);

    let dir = tempfile::tempdir().unwrap();
    let socket = dir.path().join("daemon.sock");
    let shutdown = CancellationToken::new();
    let ctx = Arc::new(ListenCtx { server: Arc::new(world.server.clone()), shutdown: shutdown.clone() });
    let listener = Listener::new(UnixListener::bind(&socket).unwrap(), ctx);
    let listening = tokio::spawn(listener.run(shutdown.clone()));

    let Response::Status { status } = ask(&socket, Request::Query { query: Query::Status }).await
    else {
        panic!("expected status");
    };
    assert_eq!(status.server_label, "base");
    assert_eq!(status.jobs.completed, 1);
    assert_eq!(status.jobs.items_produced, 16);
    assert_eq!(status.crafters_total, 1);

    let history = Query::History { status: Some(JobStatus::Completed), item: None, limit: None };
    let Response::History { jobs } = ask(&socket, Request::Query { query: history }).await else {
        panic!("expected history");
    };
    assert_eq!(jobs.len(), 1);
    assert_eq!(jobs[0].actual_output, Some(16));

    let Response::Agents { agents } =
        ask(&socket, Request::Query { query: Query::ListAgents { role: Some(Role::Worker) } }).await
    else {
        panic!("expected agents");
    };
    assert!(agents.is_empty());

    assert_eq!(ask(&socket, Request::Shutdown).await, Response::ShuttingDown);
    listening.await.unwrap();
    world.shutdown().await;
}
