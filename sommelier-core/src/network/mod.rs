//! Connectivity monitoring.
//!
//! Platform code pushes raw online/offline signals through a
//! [`ConnectivityReporter`]. A debounce task coalesces bursts (radios flap
//! while roaming) and publishes the settled value on a watch channel, which
//! the scan controller subscribes to. A change is published once no
//! differing signal has arrived for the debounce window, and only when it
//! differs from what is already published. Repeats of the pending value do
//! not extend the window.

#[cfg(feature = "probe")]
pub mod probe;

use std::fmt;
use std::time::Duration;

use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::{Instant, sleep};
use tracing::{info, trace};

use crate::config::NetworkMonitorConfig;

#[cfg(feature = "probe")]
pub use probe::ReachabilityProbe;

const TARGET: &str = "scan::network";

/// Sending side for raw platform connectivity signals.
#[derive(Clone)]
pub struct ConnectivityReporter {
    tx: mpsc::UnboundedSender<bool>,
}

impl fmt::Debug for ConnectivityReporter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectivityReporter")
            .field("closed", &self.tx.is_closed())
            .finish()
    }
}

impl ConnectivityReporter {
    /// Report the platform's current view of connectivity. Returns `false`
    /// once the monitor has shut down.
    pub fn report(&self, online: bool) -> bool {
        self.tx.send(online).is_ok()
    }

    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }

    /// Resolves once the monitor has shut down.
    pub async fn closed(&self) {
        self.tx.closed().await;
    }
}

/// Debounced online/offline signal.
///
/// The debounce task runs until every [`ConnectivityReporter`] is dropped or
/// the monitor itself is dropped. Subscribers keep the last published value
/// after that.
pub struct NetworkStatusMonitor {
    status: watch::Receiver<bool>,
    debounce_window: Duration,
    task: JoinHandle<()>,
}

impl fmt::Debug for NetworkStatusMonitor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NetworkStatusMonitor")
            .field("online", &*self.status.borrow())
            .field("debounce_window", &self.debounce_window)
            .field("running", &!self.task.is_finished())
            .finish()
    }
}

impl NetworkStatusMonitor {
    pub fn spawn(
        initial_online: bool,
        config: &NetworkMonitorConfig,
    ) -> (Self, ConnectivityReporter) {
        let (raw_tx, raw_rx) = mpsc::unbounded_channel();
        let (status_tx, status_rx) = watch::channel(initial_online);
        let debounce_window = config.debounce_window();

        let task =
            tokio::spawn(debounce_signals(raw_rx, status_tx, debounce_window));

        let monitor = Self {
            status: status_rx,
            debounce_window,
            task,
        };
        (monitor, ConnectivityReporter { tx: raw_tx })
    }

    /// Point-in-time connectivity.
    pub fn is_online(&self) -> bool {
        *self.status.borrow()
    }

    /// Change notifications; the receiver yields only settled values.
    pub fn subscribe(&self) -> watch::Receiver<bool> {
        self.status.clone()
    }
}

impl Drop for NetworkStatusMonitor {
    fn drop(&mut self) {
        self.task.abort();
    }
}

async fn debounce_signals(
    mut raw: mpsc::UnboundedReceiver<bool>,
    status: watch::Sender<bool>,
    window: Duration,
) {
    while let Some(first) = raw.recv().await {
        let mut candidate = first;
        let mut closed = false;
        let quiet = sleep(window);
        tokio::pin!(quiet);

        loop {
            tokio::select! {
                () = &mut quiet => break,
                next = raw.recv() => match next {
                    Some(next) if next == candidate => {
                        trace!(target: TARGET, online = next, "repeated signal");
                    }
                    Some(next) => {
                        trace!(target: TARGET, online = next, "signal absorbed by debounce");
                        candidate = next;
                        quiet.as_mut().reset(Instant::now() + window);
                    }
                    None => {
                        closed = true;
                        break;
                    }
                },
            }
        }

        publish(&status, candidate);
        if closed {
            break;
        }
    }
    trace!(target: TARGET, "connectivity reporters dropped; monitor stopping");
}

fn publish(status: &watch::Sender<bool>, online: bool) {
    let changed = status.send_if_modified(|current| {
        if *current == online {
            false
        } else {
            *current = online;
            true
        }
    });

    if changed {
        info!(target: TARGET, online, "connectivity changed");
    } else {
        trace!(target: TARGET, online, "connectivity unchanged after debounce");
    }
}
