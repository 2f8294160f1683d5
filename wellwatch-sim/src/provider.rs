//! Wires the simulator, store and both servers together.

use std::net::SocketAddr;

use anyhow::{Context, Result};
use chrono::Utc;
use tokio::net::TcpListener;
use tokio::sync::{broadcast, watch};
use tokio::task::JoinHandle;
use tracing::{debug, info};
use wellwatch_types::StaffRecord;

use crate::config::SimConfig;
use crate::simulator::{seed_records, Simulator};
use crate::store::SimStore;
use crate::{http, push};

/// A configured but not yet running provider.
#[derive(Debug, Clone)]
pub struct Provider {
    config: SimConfig,
}

impl Provider {
    pub fn new(config: SimConfig) -> Self {
        Self { config }
    }

    /// Bind both listeners, seed the roster and start ticking.
    pub async fn start(self) -> Result<RunningProvider> {
        let cfg = self.config;

        let http_listener = TcpListener::bind(&cfg.http_addr)
            .await
            .with_context(|| format!("failed to bind REST API on {}", cfg.http_addr))?;
        let push_listener = TcpListener::bind(&cfg.push_addr)
            .await
            .with_context(|| format!("failed to bind push stream on {}", cfg.push_addr))?;
        let http_addr = http_listener.local_addr()?;
        let push_addr = push_listener.local_addr()?;

        let records = seed_records(&cfg.staff, Utc::now());
        let store = SimStore::new(cfg.max_points, cfg.history_limit);
        store.seed(records.clone());
        info!(staff = records.len(), "Seeded roster");

        let simulator =
            Simulator::new(records, cfg.seed).with_stress_event_chance(cfg.stress_event_chance);

        let (stop_tx, stop_rx) = watch::channel(false);
        let (updates, _) = broadcast::channel(push::UPDATE_BUFFER);

        let tasks = vec![
            tokio::spawn(http::serve(http_listener, store.clone(), stop_rx.clone())),
            tokio::spawn(push::serve(push_listener, updates.clone(), stop_rx.clone())),
            tokio::spawn(run_ticker(
                simulator,
                store.clone(),
                updates.clone(),
                cfg.tick(),
                stop_rx,
            )),
        ];

        Ok(RunningProvider {
            http_addr,
            push_addr,
            store,
            updates,
            stop_tx,
            tasks,
        })
    }
}

async fn run_ticker(
    mut simulator: Simulator,
    store: SimStore,
    updates: broadcast::Sender<StaffRecord>,
    tick: std::time::Duration,
    mut stop_rx: watch::Receiver<bool>,
) {
    let mut interval_timer = tokio::time::interval(tick);

    loop {
        tokio::select! {
            _ = interval_timer.tick() => {
                let now = Utc::now();
                for (record, point) in simulator.tick(now) {
                    store.record(record.clone(), point);
                    // No subscribers is not an error.
                    let _ = updates.send(record);
                }
                debug!(clients = updates.receiver_count(), "Tick complete");
            }
            _ = stop_rx.changed() => break,
        }
    }
}

/// Handle to a running provider. Dropping it leaves the tasks running;
/// call [`RunningProvider::shutdown`] to stop them.
#[derive(Debug)]
pub struct RunningProvider {
    http_addr: SocketAddr,
    push_addr: SocketAddr,
    store: SimStore,
    updates: broadcast::Sender<StaffRecord>,
    stop_tx: watch::Sender<bool>,
    tasks: Vec<JoinHandle<()>>,
}

impl RunningProvider {
    pub fn http_addr(&self) -> SocketAddr {
        self.http_addr
    }

    pub fn push_addr(&self) -> SocketAddr {
        self.push_addr
    }

    /// Base URL for the REST API, suitable for a dashboard client.
    pub fn base_url(&self) -> String {
        format!("http://{}", self.http_addr)
    }

    pub fn store(&self) -> &SimStore {
        &self.store
    }

    /// Number of push clients currently subscribed.
    pub fn push_clients(&self) -> usize {
        self.updates.receiver_count()
    }

    /// Publish an update outside the tick schedule.
    pub fn publish(&self, record: StaffRecord) {
        self.store.seed([record.clone()]);
        let _ = self.updates.send(record);
    }

    /// Signal every task to stop and wait for them.
    pub async fn shutdown(self) {
        let _ = self.stop_tx.send(true);
        for task in self.tasks {
            let _ = task.await;
        }
        info!("Provider stopped");
    }
}
