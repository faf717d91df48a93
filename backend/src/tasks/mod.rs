// Background tasks for snapshot reporting and intent handling.

use std::time::Duration;

use serde::Serialize;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tokio::sync::watch;
use tokio::time::{self, Instant};
use tracing::warn;

use crate::app::AppState;
use crate::constants::SCHEMA_VERSION;
use crate::intents::{apply_intent, Intent};
use crate::snapshot::Snapshot;
use crate::utils::{monotonic_ms, now_epoch_ms};

#[derive(Serialize)]
pub struct SpeedUpdateMessage<'a> {
    pub schema_version: &'static str,
    pub timestamp_ms: u64,
    pub monotonic_ms: u64,
    #[serde(rename = "type")]
    pub message_type: &'static str,
    pub snapshot: &'a Snapshot,
}

/// Writes one JSON line per changed snapshot, at most once per interval.
/// Returns once the snapshot sender is gone.
pub async fn report_task<W>(
    mut snapshots: watch::Receiver<Snapshot>,
    out: &mut W,
    interval_ms: u64,
    start: Instant,
) -> std::io::Result<()>
where
    W: AsyncWrite + Unpin,
{
    let mut interval = time::interval(Duration::from_millis(interval_ms.max(1)));
    let mut last_sequence = None;

    loop {
        interval.tick().await;
        let closed = snapshots.has_changed().is_err();

        let payload = {
            let snapshot = snapshots.borrow_and_update();
            if last_sequence == Some(snapshot.sequence) {
                None
            } else {
                last_sequence = Some(snapshot.sequence);
                let message = SpeedUpdateMessage {
                    schema_version: SCHEMA_VERSION,
                    timestamp_ms: now_epoch_ms(),
                    monotonic_ms: monotonic_ms(start),
                    message_type: "speed_update",
                    snapshot: &snapshot,
                };
                match serde_json::to_string(&message) {
                    Ok(payload) => Some(payload),
                    Err(err) => {
                        warn!(?err, "snapshot encode failed");
                        None
                    }
                }
            }
        };

        if let Some(mut line) = payload {
            line.push('\n');
            out.write_all(line.as_bytes()).await?;
            out.flush().await?;
        }

        if closed {
            break;
        }
    }

    Ok(())
}

/// Reads one intent per line until EOF.
pub async fn intent_task<R>(app_state: AppState, reader: R) -> std::io::Result<()>
where
    R: AsyncBufRead + Unpin,
{
    let mut lines = reader.lines();
    while let Some(line) = lines.next_line().await? {
        if line.trim().is_empty() {
            continue;
        }
        match Intent::parse(&line) {
            Some(intent) => {
                if let Err(err) = apply_intent(&app_state, intent).await {
                    warn!(?err, "intent not persisted");
                }
            }
            None => warn!(line = line.trim(), "unrecognised intent"),
        }
    }
    Ok(())
}
