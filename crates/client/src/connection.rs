//! Connection status monitoring
//!
//! An owned service with an explicit start/stop lifecycle, replacing the
//! process-wide listener registry the site used to carry. Hosts tie
//! `start` to mount and `stop` (or drop) to unmount; subscribers observe
//! connectivity over a watch channel and late subscribers see the latest
//! value immediately.

use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::store::RecordStore;

/// Connection monitor settings
#[derive(Debug, Clone)]
pub struct ConnectionMonitorConfig {
    /// Time between reachability probes
    pub poll_interval: Duration,
}

impl Default for ConnectionMonitorConfig {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(30),
        }
    }
}

/// Polls the record store and publishes connectivity
pub struct ConnectionMonitor {
    store: Arc<dyn RecordStore>,
    config: ConnectionMonitorConfig,
    status: watch::Sender<bool>,
    task: Option<JoinHandle<()>>,
}

impl ConnectionMonitor {
    /// Create a monitor with default settings
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self::with_config(store, ConnectionMonitorConfig::default())
    }

    /// Create a monitor with explicit settings
    pub fn with_config(store: Arc<dyn RecordStore>, config: ConnectionMonitorConfig) -> Self {
        let (status, _) = watch::channel(true);
        Self {
            store,
            config,
            status,
            task: None,
        }
    }

    /// Subscribe to connectivity updates
    pub fn subscribe(&self) -> watch::Receiver<bool> {
        self.status.subscribe()
    }

    /// Latest observed connectivity
    pub fn is_connected(&self) -> bool {
        *self.status.borrow()
    }

    /// Start polling; idempotent while running
    pub fn start(&mut self) {
        if self.task.is_some() {
            return;
        }

        let store = Arc::clone(&self.store);
        let status = self.status.clone();
        let poll_interval = self.config.poll_interval;

        self.task = Some(tokio::spawn(async move {
            loop {
                let connected = store.probe().await.is_ok();
                if !connected {
                    warn!("record store unreachable");
                } else {
                    debug!("record store reachable");
                }
                status.send_replace(connected);
                tokio::time::sleep(poll_interval).await;
            }
        }));
    }

    /// Stop polling and discard any in-flight probe
    pub fn stop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

impl Drop for ConnectionMonitor {
    fn drop(&mut self) {
        self.stop();
    }
}
