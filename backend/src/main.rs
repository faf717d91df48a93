// Headless speed tracker: replays a location feed and streams snapshots as JSON lines.

use std::env;
use std::path::PathBuf;
use std::sync::Arc;

use tokio::io::BufReader;
use tracing::{info, warn};

use speed_core::error::LocationError;
use speedtrack::app::AppState;
use speedtrack::constants::{
    DATA_DIR_ENV, REPLAY_ENV, REPLAY_RATE_ENV, REPORT_INTERVAL_MS, REPORT_MS_ENV, SETTINGS_FILE,
};
use speedtrack::ingest::spawn_ingest;
use speedtrack::source::{failed_source, replay_source, LocationStream};
use speedtrack::store::SettingsStore;
use speedtrack::tasks;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let data_dir = resolve_data_dir();
    let report_ms = env::var(REPORT_MS_ENV)
        .ok()
        .and_then(|value| value.parse::<u64>().ok())
        .unwrap_or(REPORT_INTERVAL_MS);
    let replay_rate = env::var(REPLAY_RATE_ENV)
        .ok()
        .and_then(|value| value.parse::<f64>().ok())
        .unwrap_or(1.0);

    let settings = Arc::new(SettingsStore::load(data_dir.join(SETTINGS_FILE)).await);
    let app_state = AppState::new(settings).await;
    info!(
        settings = %app_state.settings.path().display(),
        report_ms,
        "speed tracker starting"
    );

    let report_rx = app_state.subscribe();
    let report_start = app_state.start_instant;
    tokio::spawn(async move {
        let mut stdout = tokio::io::stdout();
        if let Err(err) =
            tasks::report_task(report_rx, &mut stdout, report_ms, report_start).await
        {
            warn!(?err, "report task exited");
        }
    });

    let intent_state = app_state.clone();
    tokio::spawn(async move {
        let stdin = BufReader::new(tokio::io::stdin());
        if let Err(err) = tasks::intent_task(intent_state, stdin).await {
            warn!(?err, "intent task exited");
        }
    });

    let stream = open_source(replay_rate).await;
    let mut ingest = spawn_ingest(app_state.clone(), stream);

    let ended_early = tokio::select! {
        _ = tokio::signal::ctrl_c() => false,
        outcome = ingest.finished() => {
            info!(?outcome, "location ingestion ended");
            true
        }
    };
    if ended_early {
        // Keep the last snapshot and intents available until shutdown.
        let _ = tokio::signal::ctrl_c().await;
    }

    info!("shutdown requested");
    ingest.stop();
    let outcome = ingest.finished().await;
    info!(?outcome, "speed tracker stopped");
}

async fn open_source(rate: f64) -> LocationStream {
    let Some(path) = env::var(REPLAY_ENV).ok().map(PathBuf::from) else {
        warn!("no location provider configured; set {}", REPLAY_ENV);
        return failed_source(LocationError::Unavailable(
            "no location provider configured".to_string(),
        ));
    };
    match replay_source(&path, rate).await {
        Ok(stream) => {
            info!(path = %path.display(), rate, "replaying recorded drive");
            stream
        }
        Err(err) => {
            warn!(?err, path = %path.display(), "replay file unreadable");
            failed_source(LocationError::SourceFailed(err.to_string()))
        }
    }
}

fn resolve_data_dir() -> PathBuf {
    if let Ok(value) = env::var(DATA_DIR_ENV) {
        return PathBuf::from(value);
    }
    PathBuf::from("./data")
}
