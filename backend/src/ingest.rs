// Single consumer that applies location updates to the tracker in arrival order.
// Invariants: one writer; after every resume the liveness flag is checked before any mutation;
// a source failure ends the subscription without retry.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use futures::StreamExt;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use speed_core::error::LocationError;
use speed_core::model::LocationUpdate;
use speed_core::tracker::ObserveEvents;

use crate::app::AppState;
use crate::source::LocationStream;

#[derive(Clone, Debug, PartialEq)]
pub enum IngestOutcome {
    /// Stopped through `IngestHandle::stop` or by dropping the handle.
    Stopped,
    /// The source ended without an error.
    Exhausted,
    Failed(LocationError),
    Aborted(String),
}

/// Owns a running ingest task. Dropping the handle stops ingestion.
pub struct IngestHandle {
    running: Arc<AtomicBool>,
    cancel: Option<oneshot::Sender<()>>,
    task: Option<JoinHandle<IngestOutcome>>,
    outcome: Option<IngestOutcome>,
}

impl IngestHandle {
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    pub fn stop(&mut self) {
        self.running.store(false, Ordering::Release);
        if let Some(cancel) = self.cancel.take() {
            let _ = cancel.send(());
        }
    }

    /// Waits for the task to end. Safe to call again, and to cancel mid-wait.
    pub async fn finished(&mut self) -> IngestOutcome {
        if let Some(outcome) = &self.outcome {
            return outcome.clone();
        }
        let outcome = match self.task.as_mut() {
            Some(task) => match task.await {
                Ok(outcome) => outcome,
                Err(err) => IngestOutcome::Aborted(err.to_string()),
            },
            None => IngestOutcome::Stopped,
        };
        self.task = None;
        self.outcome = Some(outcome.clone());
        outcome
    }
}

pub fn spawn_ingest(app_state: AppState, stream: LocationStream) -> IngestHandle {
    let running = Arc::new(AtomicBool::new(true));
    let (cancel_tx, cancel_rx) = oneshot::channel();
    let task_running = running.clone();
    let task = tokio::spawn(async move {
        let outcome = ingest_loop(&app_state, stream, &task_running, cancel_rx).await;
        task_running.store(false, Ordering::Release);
        outcome
    });

    IngestHandle {
        running,
        cancel: Some(cancel_tx),
        task: Some(task),
        outcome: None,
    }
}

pub async fn ingest_loop(
    app_state: &AppState,
    mut stream: LocationStream,
    running: &AtomicBool,
    mut cancel: oneshot::Receiver<()>,
) -> IngestOutcome {
    app_state.tracker.write().await.begin_subscription();
    app_state.publish_snapshot().await;
    info!("location ingestion started");

    loop {
        let item = tokio::select! {
            _ = &mut cancel => {
                info!("location ingestion stopped");
                return IngestOutcome::Stopped;
            }
            item = stream.next() => item,
        };

        if !running.load(Ordering::Acquire) {
            debug!("ingestion stopped while waiting; dropping in-flight update");
            return IngestOutcome::Stopped;
        }

        match item {
            Some(Ok(update)) => {
                apply_update(app_state, &update).await;
            }
            Some(Err(err)) => {
                if err.is_permission() {
                    warn!(%err, "location permission missing");
                } else {
                    warn!(%err, "location source failed");
                }
                app_state.tracker.write().await.record_failure(err.clone());
                app_state.publish_snapshot().await;
                return IngestOutcome::Failed(err);
            }
            None => {
                info!("location source ended");
                return IngestOutcome::Exhausted;
            }
        }
    }
}

pub async fn apply_update(app_state: &AppState, update: &LocationUpdate) -> ObserveEvents {
    let events = app_state.tracker.write().await.observe(update);
    debug!(
        speed_mps = update.speed_mps,
        accuracy_m = update.horizontal_accuracy_m,
        "location update applied"
    );

    if let Some(max_mps) = events.new_max_mps {
        info!(max_mps, "new max speed");
        let persisted = app_state
            .settings
            .update(|settings| settings.max_speed_mps = settings.max_speed_mps.max(max_mps))
            .await;
        if let Err(err) = persisted {
            warn!(?err, "failed to persist max speed");
        }
    }

    if let Some(transition) = events.transition {
        info!(from = ?transition.from, to = ?transition.to, "motion transition");
    }

    app_state.publish_snapshot().await;
    events
}
