// Error taxonomy for the location-update source.
// Invariants: none of these are fatal; they degrade the display only.

use serde::Serialize;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, thiserror::Error)]
#[serde(tag = "kind", content = "detail", rename_all = "snake_case")]
pub enum LocationError {
    #[error("location access denied")]
    PermissionDenied,

    #[error("location access not yet granted")]
    PermissionNotDetermined,

    #[error("location unavailable: {0}")]
    Unavailable(String),

    #[error("location source failed: {0}")]
    SourceFailed(String),
}

impl LocationError {
    pub fn is_permission(&self) -> bool {
        matches!(
            self,
            LocationError::PermissionDenied | LocationError::PermissionNotDetermined
        )
    }
}
