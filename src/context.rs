use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::Notify;

use crate::persistence::Persistence;
use crate::pubsub::Broker;
use crate::store::Store;

/// Everything a session needs that outlives it: the store, the broker, the persistence manager
/// and server-wide counters. Built once at startup and cloned into every connection.
#[derive(Clone)]
pub struct Context {
    pub store: Store,
    pub broker: Broker,
    pub persistence: Arc<Persistence>,
    pub stats: Arc<Stats>,
    pub shutdown: Arc<Notify>,
    pub port: u16,
}

impl Context {
    pub fn new(snapshot_path: impl Into<PathBuf>, port: u16) -> Context {
        let store = Store::new();
        let persistence = Arc::new(Persistence::new(store.clone(), snapshot_path));

        Context {
            store,
            broker: Broker::new(),
            persistence,
            stats: Arc::new(Stats::new()),
            shutdown: Arc::new(Notify::new()),
            port,
        }
    }
}

pub struct Stats {
    started_at: Instant,
    commands_processed: AtomicU64,
    connected_clients: AtomicUsize,
}

impl Stats {
    fn new() -> Stats {
        Stats {
            started_at: Instant::now(),
            commands_processed: AtomicU64::new(0),
            connected_clients: AtomicUsize::new(0),
        }
    }

    pub fn uptime_secs(&self) -> u64 {
        self.started_at.elapsed().as_secs()
    }

    pub fn command_processed(&self) {
        self.commands_processed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn commands_processed(&self) -> u64 {
        self.commands_processed.load(Ordering::Relaxed)
    }

    pub fn client_connected(&self) {
        self.connected_clients.fetch_add(1, Ordering::Relaxed);
    }

    pub fn client_disconnected(&self) {
        self.connected_clients.fetch_sub(1, Ordering::Relaxed);
    }

    pub fn connected_clients(&self) -> usize {
        self.connected_clients.load(Ordering::Relaxed)
    }
}
