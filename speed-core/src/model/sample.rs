// Normalized speed sample kept in the rolling history.

use serde::Serialize;
use uuid::Uuid;

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Sample {
    pub id: Uuid,
    pub t_ms: u64,
    pub speed_mps: f64,
}

impl Sample {
    /// Builds a sample from a raw platform speed; invalid speeds clamp to 0.
    pub fn new(raw_speed_mps: f64, t_ms: u64) -> Self {
        Self {
            id: Uuid::new_v4(),
            t_ms,
            speed_mps: normalize_speed(raw_speed_mps),
        }
    }

    pub fn at_rest(t_ms: u64) -> Self {
        Self::new(0.0, t_ms)
    }
}

/// Platform convention: a negative speed means "unavailable".
pub fn normalize_speed(raw_speed_mps: f64) -> f64 {
    if raw_speed_mps.is_finite() && raw_speed_mps > 0.0 {
        raw_speed_mps
    } else {
        0.0
    }
}
