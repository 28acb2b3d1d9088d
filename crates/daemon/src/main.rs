// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `logid`: the logistics coordinator daemon.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use logi_adapters::{MemoryNetwork, MemoryStock, Transport, UdpConfig, UdpTransport};
use logi_core::SystemClock;
use logi_daemon::{
    env, lifecycle, logging, Config, FleetPlan, ListenCtx, Listener, Paths, SimulatedFleet,
};
use logi_engine::Server;
use tokio::net::UnixListener;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

#[derive(Parser)]
#[command(name = "logid", version, about = "Turtle logistics coordinator daemon")]
struct Args {
    /// Config file (falls back to $LOGI_CONFIG, then built-in defaults)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Also log to stderr
    #[arg(long)]
    foreground: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let paths = Paths::load()?;
    let _log_guard = logging::init(&paths.log_dir, &env::log_filter(), args.foreground)?;

    if let Err(e) = run(args, paths).await {
        error!("daemon failed: {e:#}");
        return Err(e);
    }
    Ok(())
}

async fn run(args: Args, paths: Paths) -> anyhow::Result<()> {
    let config = match args.config.or_else(env::config_path) {
        Some(path) => Config::load(&path).with_context(|| format!("loading {}", path.display()))?,
        None => Config::default(),
    };
    let server_config = config.server_config()?;
    let recipes = Arc::new(config.recipe_book()?);
    let stock = MemoryStock::new(config.initial_stock());

    let (lock, unix) = lifecycle::startup(&paths)?;
    info!(pid = std::process::id(), socket = %paths.socket_path.display(), "daemon started");
    let shutdown = CancellationToken::new();

    match &config.simulate {
        Some(sim) => {
            let net = MemoryNetwork::new();
            let transport = net.join_as(config.node(), config.network.channel);
            let plan = FleetPlan {
                channel: config.network.channel,
                crafters: sim.crafters,
                workers: sim.workers,
                op_delay: config.op_delay()?,
                tasks: config.work.clone(),
            };
            let fleet = SimulatedFleet::spawn(&net, &stock, &plan);
            let server = Server::new(server_config, transport, stock, recipes, SystemClock);
            serve(server, unix, shutdown).await;
            fleet.shutdown().await;
        }
        None => {
            let transport = UdpTransport::bind(UdpConfig {
                node: config.node(),
                channel: config.network.channel,
                bind: config.network.bind,
                broadcast: config.network.broadcast,
            })
            .await
            .with_context(|| format!("binding {}", config.network.bind))?;
            let server = Server::new(server_config, transport, stock, recipes, SystemClock);
            serve(server, unix, shutdown).await;
        }
    }

    lock.shutdown();
    Ok(())
}

/// Run the server loops and the IPC listener until a signal or a
/// `Shutdown` request.
async fn serve<T: Transport>(
    server: Server<T, MemoryStock, SystemClock>,
    unix: UnixListener,
    shutdown: CancellationToken,
) {
    let ctx = Arc::new(ListenCtx { server: Arc::new(server.clone()), shutdown: shutdown.clone() });
    let listener = Listener::new(unix, ctx);

    tokio::join!(
        server.run(shutdown.clone()),
        listener.run(shutdown.clone()),
        wait_for_shutdown(&shutdown),
    );
}

async fn wait_for_shutdown(shutdown: &CancellationToken) {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                error!("failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    tokio::select! {
        _ = ctrl_c => info!("received Ctrl+C, shutting down"),
        _ = terminate => info!("received SIGTERM, shutting down"),
        _ = shutdown.cancelled() => info!("shutdown requested"),
    }
    shutdown.cancel();
}
