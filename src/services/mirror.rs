use crate::models::Place;
use crate::services::store::StoreClient;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;

/// One immutable snapshot of the place catalog, keyed by id
pub type Snapshot = Arc<HashMap<String, Place>>;

/// Local mirror of the remote place directory
///
/// Holds only the latest snapshot; each remote notification replaces the
/// whole thing atomically through a watch channel, so a reader either sees
/// the previous snapshot or the new one, never a mix. The mirror is a
/// rebuildable cache, not an authority: nothing here writes back to the
/// store.
pub struct DirectoryMirror {
    tx: watch::Sender<Snapshot>,
    received: AtomicBool,
}

impl DirectoryMirror {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(Arc::new(HashMap::new()));
        Self {
            tx,
            received: AtomicBool::new(false),
        }
    }

    /// Latest snapshot; empty before the first one arrives
    pub fn current(&self) -> Snapshot {
        self.tx.borrow().clone()
    }

    /// Whether at least one snapshot has been observed since startup
    pub fn has_snapshot(&self) -> bool {
        self.received.load(Ordering::Relaxed)
    }

    /// Replace the entire snapshot with a freshly fetched place set
    pub fn apply_snapshot(&self, places: Vec<Place>) {
        let map: HashMap<String, Place> = places
            .into_iter()
            .map(|place| (place.id.clone(), place))
            .collect();

        tracing::trace!("Replacing mirror snapshot: {} places", map.len());
        self.tx.send_replace(Arc::new(map));
        self.received.store(true, Ordering::Relaxed);
    }

    /// Watch handle for consumers that want to react to replacements
    pub fn subscribe(&self) -> watch::Receiver<Snapshot> {
        self.tx.subscribe()
    }
}

impl Default for DirectoryMirror {
    fn default() -> Self {
        Self::new()
    }
}

/// Subscription loop feeding the mirror
///
/// Polls the store for the full collection at a fixed interval and applies
/// each fetch as an atomic replacement. A transient store failure leaves
/// the last-known snapshot in place (stale-but-available); the loop never
/// exits on its own.
pub async fn run_subscription(
    store: Arc<StoreClient>,
    mirror: Arc<DirectoryMirror>,
    poll_interval: Duration,
) {
    let mut ticker = tokio::time::interval(poll_interval);
    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

    loop {
        ticker.tick().await;

        match store.list_places().await {
            Ok(places) => {
                mirror.apply_snapshot(places);
            }
            Err(e) => {
                tracing::warn!(
                    "Snapshot fetch failed, serving last-known snapshot: {}",
                    e
                );
            }
        }
    }
}
