// Replay of a recorded drive stored as JSON lines, preserving inter-fix timing.
// Invariants: a failure record terminates the stream; timestamps are rebased onto the wall clock.

use std::collections::VecDeque;
use std::path::Path;
use std::time::Duration;

use futures::stream;
use serde::Deserialize;
use tokio::time;
use tracing::{debug, warn};

use speed_core::error::LocationError;
use speed_core::model::LocationUpdate;

use super::LocationStream;
use crate::utils::now_epoch_ms;

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum ReplayRecord {
    Fix(LocationUpdate),
    Failure {
        failure: String,
        #[serde(default)]
        detail: Option<String>,
    },
}

impl ReplayRecord {
    fn t_ms(&self) -> Option<u64> {
        match self {
            ReplayRecord::Fix(update) => Some(update.t_ms),
            ReplayRecord::Failure { .. } => None,
        }
    }
}

#[derive(Debug, Default)]
pub struct ReplayScript {
    pub records: Vec<ReplayRecord>,
    /// 1-based line numbers that could not be parsed.
    pub skipped_lines: Vec<usize>,
}

pub fn parse_replay(text: &str) -> ReplayScript {
    let mut script = ReplayScript::default();
    for (idx, line) in text.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        match serde_json::from_str::<ReplayRecord>(line) {
            Ok(record) => script.records.push(record),
            Err(_) => script.skipped_lines.push(idx + 1),
        }
    }
    script
}

pub fn failure_from_record(failure: &str, detail: Option<String>) -> LocationError {
    match failure {
        "permission_denied" => LocationError::PermissionDenied,
        "permission_not_determined" => LocationError::PermissionNotDetermined,
        "unavailable" => LocationError::Unavailable(detail.unwrap_or_else(|| "no fix".to_string())),
        other => LocationError::SourceFailed(detail.unwrap_or_else(|| other.to_string())),
    }
}

pub async fn replay_source(path: &Path, rate: f64) -> std::io::Result<LocationStream> {
    let text = tokio::fs::read_to_string(path).await?;
    let script = parse_replay(&text);
    if !script.skipped_lines.is_empty() {
        warn!(
            path = %path.display(),
            lines = ?script.skipped_lines,
            "replay lines skipped"
        );
    }
    debug!(path = %path.display(), records = script.records.len(), "replay loaded");
    Ok(script_stream(script.records, rate, now_epoch_ms()))
}

struct ReplayCursor {
    pending: VecDeque<ReplayRecord>,
    first_t_ms: Option<u64>,
    last_t_ms: Option<u64>,
    base_ms: u64,
    rate: f64,
    done: bool,
}

/// Emits `records` with their recorded spacing divided by `rate`.
pub fn script_stream(records: Vec<ReplayRecord>, rate: f64, base_ms: u64) -> LocationStream {
    let rate = if rate.is_finite() && rate > 0.0 { rate } else { 1.0 };
    let cursor = ReplayCursor {
        pending: records.into(),
        first_t_ms: None,
        last_t_ms: None,
        base_ms,
        rate,
        done: false,
    };

    Box::pin(stream::unfold(cursor, |mut cursor| async move {
        if cursor.done {
            return None;
        }
        let record = cursor.pending.pop_front()?;

        if let (Some(prev), Some(next)) = (cursor.last_t_ms, record.t_ms()) {
            let delay_ms = next.saturating_sub(prev) as f64 / cursor.rate;
            if delay_ms > 0.0 {
                time::sleep(Duration::from_millis(delay_ms.round() as u64)).await;
            }
        }

        match record {
            ReplayRecord::Fix(mut update) => {
                let first = *cursor.first_t_ms.get_or_insert(update.t_ms);
                cursor.last_t_ms = Some(update.t_ms);
                update.t_ms = cursor.base_ms + update.t_ms.saturating_sub(first);
                Some((Ok(update), cursor))
            }
            ReplayRecord::Failure { failure, detail } => {
                cursor.done = true;
                Some((Err(failure_from_record(&failure, detail)), cursor))
            }
        }
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::StreamExt;

    const DRIVE: &str = r#"
# recorded along the canal
{"t_ms": 5000, "latitude": 52.37, "longitude": 4.89, "speed_mps": -1.0, "horizontal_accuracy_m": 30.0}
{"t_ms": 6000, "latitude": 52.37, "longitude": 4.891, "speed_mps": 4.5}
not a record
{"t_ms": 8000, "latitude": 52.37, "longitude": 4.892, "speed_mps": 6.0, "horizontal_accuracy_m": 5.0}
{"failure": "signal_lost", "detail": "tunnel"}
{"t_ms": 9000, "latitude": 52.37, "longitude": 4.893, "speed_mps": 7.0}
"#;

    #[test]
    fn parse_skips_comments_and_bad_lines() {
        let script = parse_replay(DRIVE);
        assert_eq!(script.records.len(), 5);
        assert_eq!(script.skipped_lines, vec![5]);
        match &script.records[1] {
            ReplayRecord::Fix(update) => {
                assert_eq!(update.speed_mps, 4.5);
                assert_eq!(update.horizontal_accuracy_m, 0.0);
            }
            other => panic!("unexpected record {other:?}"),
        }
        assert!(matches!(script.records[3], ReplayRecord::Failure { .. }));
    }

    #[test]
    fn failure_names_map_to_errors() {
        assert_eq!(
            failure_from_record("permission_denied", None),
            LocationError::PermissionDenied
        );
        assert_eq!(
            failure_from_record("unavailable", Some("indoors".into())),
            LocationError::Unavailable("indoors".into())
        );
        assert_eq!(
            failure_from_record("signal_lost", None),
            LocationError::SourceFailed("signal_lost".into())
        );
    }

    #[tokio::test(start_paused = true)]
    async fn replay_preserves_spacing_and_stops_after_failure() {
        let records = parse_replay(DRIVE).records;
        let start = time::Instant::now();
        let items: Vec<_> = script_stream(records, 2.0, 100_000).collect().await;

        assert_eq!(items.len(), 4);
        let times: Vec<u64> = items
            .iter()
            .filter_map(|item| item.as_ref().ok().map(|update| update.t_ms))
            .collect();
        assert_eq!(times, vec![100_000, 101_000, 103_000]);
        assert_eq!(
            items[3],
            Err(LocationError::SourceFailed("tunnel".into()))
        );
        let elapsed = start.elapsed();
        assert!(elapsed >= Duration::from_millis(1_500));
        assert!(elapsed < Duration::from_millis(1_600));
    }
}
