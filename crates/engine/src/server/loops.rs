// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Long-running server loops.

use std::future::Future;
use std::time::Duration;

use logi_adapters::{StockOracle, Transport};
use logi_core::Clock;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

use super::Server;

/// How long one network receive waits before re-checking cancellation.
const RECEIVE_SLICE: Duration = Duration::from_secs(1);

impl<T, S, C> Server<T, S, C>
where
    T: Transport,
    S: StockOracle,
    C: Clock,
{
    /// Run every loop until `cancel` fires, then announce going offline.
    pub async fn run(&self, cancel: CancellationToken) {
        tracing::info!(
            label = %self.config.label,
            node = %self.transport.node_id(),
            instance = %self.instance,
            targets = self.config.targets.len(),
            "server starting"
        );
        self.announce(true).await;

        tokio::join!(
            self.listen_loop(&cancel),
            self.dispatch_loop(&cancel),
            every(self.config.stale_sweep_interval, &cancel, move || async move {
                self.sweep_stale();
            }),
            every(self.config.ping_interval, &cancel, move || self.ping()),
            every(self.config.announce_interval, &cancel, move || self.announce(true)),
        );

        self.announce(false).await;
        tracing::info!("server stopped");
    }

    async fn listen_loop(&self, cancel: &CancellationToken) {
        loop {
            tokio::select! {
                _ = cancel.cancelled() => break,
                envelope = self.transport.receive(RECEIVE_SLICE, None) => {
                    if let Some(envelope) = envelope {
                        self.handle_envelope(envelope).await;
                    }
                }
            }
        }
    }

    /// Periodic passes, plus an early pass whenever something wakes it.
    async fn dispatch_loop(&self, cancel: &CancellationToken) {
        let mut tick = tokio::time::interval(self.config.dispatch_interval);
        tick.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            tokio::select! {
                _ = cancel.cancelled() => break,
                _ = tick.tick() => {}
                _ = self.dispatch_wake.notified() => {}
            }
            self.dispatch_once().await;
        }
    }
}

/// Call `f` every `period` until cancelled. The first call happens after one
/// full period.
async fn every<F, Fut>(period: Duration, cancel: &CancellationToken, mut f: F)
where
    F: FnMut() -> Fut,
    Fut: Future<Output = ()>,
{
    let start = tokio::time::Instant::now() + period;
    let mut tick = tokio::time::interval_at(start, period);
    tick.set_missed_tick_behavior(MissedTickBehavior::Delay);
    loop {
        tokio::select! {
            _ = cancel.cancelled() => break,
            _ = tick.tick() => f().await,
        }
    }
}
