// Crate root for the speed tracking host: sources, ingestion, persistence, and presentation feed.

pub mod app;
pub mod constants;
pub mod ingest;
pub mod intents;
pub mod snapshot;
pub mod source;
pub mod store;
pub mod tasks;
pub mod utils;
