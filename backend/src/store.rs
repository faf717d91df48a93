// Settings persistence backed by a JSON key/value file.
// Invariants: a missing or unreadable file never fails startup; writes replace the file atomically.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde_json::Value;
use tokio::sync::RwLock;
use tracing::{info, warn};

use speed_core::settings::Settings;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("settings io failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("settings encoding failed: {0}")]
    Json(#[from] serde_json::Error),
}

pub struct SettingsStore {
    path: PathBuf,
    settings: RwLock<Settings>,
}

impl SettingsStore {
    pub async fn load(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let settings = match tokio::fs::read(&path).await {
            Ok(bytes) => decode_settings(&bytes, &path),
            Err(err) if err.kind() == ErrorKind::NotFound => {
                info!(path = %path.display(), "no stored settings; using defaults");
                Settings::default()
            }
            Err(err) => {
                warn!(?err, path = %path.display(), "settings read failed; using defaults");
                Settings::default()
            }
        };
        Self {
            path,
            settings: RwLock::new(settings),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub async fn get(&self) -> Settings {
        self.settings.read().await.clone()
    }

    /// Applies `apply` and persists the result. The in-memory value is kept
    /// even when the write fails.
    pub async fn update<F>(&self, apply: F) -> Result<Settings, StoreError>
    where
        F: FnOnce(&mut Settings),
    {
        let mut settings = self.settings.write().await;
        apply(&mut settings);
        let updated = settings.clone();
        write_settings(&self.path, &updated).await?;
        Ok(updated)
    }
}

fn decode_settings(bytes: &[u8], path: &Path) -> Settings {
    let value: Value = match serde_json::from_slice(bytes) {
        Ok(value) => value,
        Err(err) => {
            warn!(?err, path = %path.display(), "settings file malformed; using defaults");
            return Settings::default();
        }
    };
    let Value::Object(map) = value else {
        warn!(path = %path.display(), "settings file is not an object; using defaults");
        return Settings::default();
    };

    let decoded = Settings::from_entries(&map);
    for key in &decoded.rejected {
        warn!(key, "stored setting invalid; using default");
    }
    decoded.settings
}

async fn write_settings(path: &Path, settings: &Settings) -> Result<(), StoreError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            tokio::fs::create_dir_all(parent).await?;
        }
    }
    let payload = serde_json::to_vec_pretty(&Value::Object(settings.to_entries()))?;
    let tmp_path = path.with_extension("json.tmp");
    tokio::fs::write(&tmp_path, payload).await?;
    tokio::fs::rename(&tmp_path, path).await?;
    Ok(())
}
