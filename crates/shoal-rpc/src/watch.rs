//! Periodic polling of torrent details.
//!
//! Each watch is a cancellable task owned by the registry: it fetches once
//! immediately, then once per tick, and sooner whenever a refresh
//! notification arrives (mutations route through
//! [`notify`](WatchRegistry::notify)). Watches over overlapping id sets are
//! tracked independently.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::sync::{mpsc, oneshot};
use tokio::time::interval;
use tracing::{debug, warn};

use crate::client::RpcCore;
use crate::model::TorrentDetails;
use crate::ops::fetch_details;

/// Poll cadence used when the caller does not pick one.
pub const DEFAULT_WATCH_INTERVAL: Duration = Duration::from_secs(10);

/// Invoked with each batch of refreshed detail rows.
pub type WatchCallback = Arc<dyn Fn(Vec<TorrentDetails>) + Send + Sync>;

/// Identifies one active watch; required to cancel it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct WatchHandle(u64);

struct WatchEntry {
    ids: HashSet<i64>,
    active: Arc<AtomicBool>,
    refresh: mpsc::UnboundedSender<()>,
    shutdown: Option<oneshot::Sender<()>>,
}

/// Registry of periodic torrent polls.
///
/// Poll tasks capture only the RPC core, never the registry, so dropping the
/// registry (or the owning client) shuts every watch down.
pub(crate) struct WatchRegistry {
    core: Arc<RpcCore>,
    entries: Mutex<HashMap<u64, WatchEntry>>,
    next_id: AtomicU64,
}

impl WatchRegistry {
    pub(crate) fn new(core: Arc<RpcCore>) -> Self {
        Self {
            core,
            entries: Mutex::new(HashMap::new()),
            next_id: AtomicU64::new(1),
        }
    }

    pub(crate) fn watch(
        &self,
        ids: &[i64],
        every: Duration,
        callback: WatchCallback,
    ) -> WatchHandle {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let id_set: HashSet<i64> = ids.iter().copied().collect();
        let active = Arc::new(AtomicBool::new(true));
        let (refresh_tx, refresh_rx) = mpsc::unbounded_channel();
        let (shutdown_tx, shutdown_rx) = oneshot::channel();

        tokio::spawn(poll_loop(
            self.core.clone(),
            ids.to_vec(),
            every,
            callback,
            active.clone(),
            refresh_rx,
            shutdown_rx,
        ));

        self.entries.lock().unwrap().insert(
            id,
            WatchEntry {
                ids: id_set,
                active,
                refresh: refresh_tx,
                shutdown: Some(shutdown_tx),
            },
        );

        WatchHandle(id)
    }

    pub(crate) fn unwatch(&self, handle: WatchHandle) {
        let entry = self.entries.lock().unwrap().remove(&handle.0);
        if let Some(mut entry) = entry {
            entry.active.store(false, Ordering::SeqCst);
            if let Some(shutdown) = entry.shutdown.take() {
                let _ = shutdown.send(());
            }
        }
    }

    /// Out-of-band refresh for every watch whose id set intersects `ids`.
    pub(crate) fn notify(&self, ids: &[i64]) {
        let entries = self.entries.lock().unwrap();
        for entry in entries.values() {
            if ids.iter().any(|id| entry.ids.contains(id)) {
                let _ = entry.refresh.send(());
            }
        }
    }
}

impl Drop for WatchRegistry {
    fn drop(&mut self) {
        let mut entries = self.entries.lock().unwrap();
        for entry in entries.values_mut() {
            entry.active.store(false, Ordering::SeqCst);
            if let Some(shutdown) = entry.shutdown.take() {
                let _ = shutdown.send(());
            }
        }
    }
}

async fn poll_loop(
    core: Arc<RpcCore>,
    ids: Vec<i64>,
    every: Duration,
    callback: WatchCallback,
    active: Arc<AtomicBool>,
    mut refresh: mpsc::UnboundedReceiver<()>,
    mut shutdown: oneshot::Receiver<()>,
) {
    // The first tick completes immediately, so the initial fetch does not
    // wait out a full interval.
    let mut ticker = interval(every);
    loop {
        tokio::select! {
            _ = ticker.tick() => {}
            Some(()) = refresh.recv() => {
                // Collapse a burst of notifications into one fetch.
                while refresh.try_recv().is_ok() {}
            }
            _ = &mut shutdown => break,
        }

        if !active.load(Ordering::SeqCst) {
            break;
        }

        let result = fetch_details(&core, &ids).await;

        // Cancelled while the fetch was in flight: drop the result.
        if !active.load(Ordering::SeqCst) {
            break;
        }

        match result {
            Ok(torrents) => callback(torrents),
            Err(err) => warn!(error = %err, ids = ?ids, "torrent poll failed"),
        }
    }
    debug!(ids = ?ids, "watch stopped");
}
