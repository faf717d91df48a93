// Application state shared between the ingest task, intents, and presentation tasks.

use std::sync::atomic::AtomicU64;
use std::sync::Arc;

use tokio::sync::{watch, Mutex, RwLock};
use tokio::time::Instant;

use speed_core::tracker::SpeedTracker;
use speed_core::DisplayMode;

use crate::snapshot::{build_snapshot, Snapshot};
use crate::store::SettingsStore;
use crate::utils::{next_sequence, now_epoch_ms};

#[derive(Clone)]
pub struct AppState {
    pub tracker: Arc<RwLock<SpeedTracker>>,
    pub settings: Arc<SettingsStore>,
    pub display_mode: Arc<Mutex<DisplayMode>>,
    pub snapshot_tx: Arc<watch::Sender<Snapshot>>,
    pub sequence: Arc<AtomicU64>,
    pub start_instant: Instant,
    publish_lock: Arc<Mutex<()>>,
}

impl AppState {
    /// Restores the persisted max speed and publishes the initial snapshot.
    pub async fn new(settings: Arc<SettingsStore>) -> Self {
        let current = settings.get().await;
        let tracker = SpeedTracker::new(current.max_speed_mps, now_epoch_ms());
        let display_mode = DisplayMode::default();
        let sequence = Arc::new(AtomicU64::new(0));
        let initial = build_snapshot(&tracker, &current, display_mode, 0);
        let (snapshot_tx, _) = watch::channel(initial);

        Self {
            tracker: Arc::new(RwLock::new(tracker)),
            settings,
            display_mode: Arc::new(Mutex::new(display_mode)),
            snapshot_tx: Arc::new(snapshot_tx),
            sequence,
            start_instant: Instant::now(),
            publish_lock: Arc::new(Mutex::new(())),
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<Snapshot> {
        self.snapshot_tx.subscribe()
    }

    /// Rebuilds the snapshot from current state and notifies every subscriber.
    pub async fn publish_snapshot(&self) -> u64 {
        let _guard = self.publish_lock.lock().await;
        let settings = self.settings.get().await;
        let display_mode = *self.display_mode.lock().await;
        let sequence = next_sequence(self.sequence.as_ref());
        let snapshot = {
            let tracker = self.tracker.read().await;
            build_snapshot(&tracker, &settings, display_mode, sequence)
        };
        self.snapshot_tx.send_replace(snapshot);
        sequence
    }
}
