// Raw location fix as delivered by the update source.

use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct LocationUpdate {
    pub t_ms: u64,
    pub latitude: f64,
    pub longitude: f64,
    /// Negative when the platform could not determine a speed.
    pub speed_mps: f64,
    #[serde(default)]
    pub horizontal_accuracy_m: f64,
}
