// Location-update sources consumed by the ingest task.
// Contract: zero or more fixes, then either the stream ends or yields one error and stops.

mod replay;

use std::pin::Pin;

use futures::stream::{self, Stream};
use tokio::sync::mpsc;

use speed_core::error::LocationError;
use speed_core::model::LocationUpdate;

pub use replay::{
    failure_from_record, parse_replay, replay_source, script_stream, ReplayRecord, ReplayScript,
};

pub type SourceItem = Result<LocationUpdate, LocationError>;
pub type LocationStream = Pin<Box<dyn Stream<Item = SourceItem> + Send>>;

/// Adapts a channel fed by a platform callback into a location stream.
pub fn channel_source(rx: mpsc::Receiver<SourceItem>) -> LocationStream {
    Box::pin(stream::unfold(rx, |mut rx| async move {
        rx.recv().await.map(|item| (item, rx))
    }))
}

/// A source that fails immediately, used when no provider is configured.
pub fn failed_source(error: LocationError) -> LocationStream {
    Box::pin(stream::iter([Err(error)]))
}
