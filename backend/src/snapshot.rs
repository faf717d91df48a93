// Read-only, unit-converted view of the tracker published to presentation surfaces.

use serde::Serialize;

use speed_core::error::LocationError;
use speed_core::settings::Settings;
use speed_core::stats::{self, SpeedBand};
use speed_core::tracker::SpeedTracker;
use speed_core::units::{format_speed, SpeedUnit};
use speed_core::{DisplayMode, Theme};

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct HistoryPoint {
    pub t_ms: u64,
    pub speed: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Snapshot {
    /// Change counter; strictly increases with every publish.
    pub sequence: u64,
    pub display_mode: DisplayMode,
    pub unit: SpeedUnit,
    pub unit_label: &'static str,
    pub decimal_count: u8,
    pub theme: Theme,
    pub theme_hex: &'static str,
    pub current: f64,
    pub current_text: String,
    pub max_ever: f64,
    pub max_ever_text: String,
    pub average: f64,
    pub average_text: String,
    pub history: Vec<HistoryPoint>,
    pub gauge_fraction: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub average_marker: Option<f64>,
    pub chart_ceiling: f64,
    pub band: SpeedBand,
    pub moving: bool,
    pub no_signal_streak: u32,
    pub samples_applied: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub horizontal_accuracy_m: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_updated_ms: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_error: Option<LocationError>,
}

pub fn build_snapshot(
    tracker: &SpeedTracker,
    settings: &Settings,
    display_mode: DisplayMode,
    sequence: u64,
) -> Snapshot {
    let unit = settings.unit;
    let decimals = settings.decimal_count;
    let readout = tracker.readout(unit);
    let samples = tracker.history().to_vec_ordered();
    let average_mps = tracker.average_mps();
    let current_mps = tracker.current().speed_mps;

    let history = samples
        .iter()
        .zip(&readout.history)
        .map(|(sample, speed)| HistoryPoint {
            t_ms: sample.t_ms,
            speed: *speed,
        })
        .collect();

    Snapshot {
        sequence,
        display_mode,
        unit,
        unit_label: unit.short_name(),
        decimal_count: decimals,
        theme: settings.theme,
        theme_hex: settings.theme.hex(),
        current: readout.current,
        current_text: format_speed(readout.current, decimals),
        max_ever: readout.max_ever,
        max_ever_text: format_speed(readout.max_ever, decimals),
        average: readout.average,
        average_text: format_speed(readout.average, decimals),
        history,
        gauge_fraction: stats::gauge_fraction(current_mps, unit),
        average_marker: stats::average_marker_fraction(average_mps, unit),
        chart_ceiling: stats::chart_ceiling(&samples, tracker.max_ever_mps(), unit),
        band: stats::speed_band(current_mps, &settings.thresholds),
        moving: current_mps > 0.0,
        no_signal_streak: tracker.no_signal_streak(),
        samples_applied: tracker.updates_applied(),
        horizontal_accuracy_m: tracker.last_fix().map(|fix| fix.horizontal_accuracy_m),
        last_updated_ms: tracker.last_fix().map(|fix| fix.t_ms),
        last_error: tracker.last_error().cloned(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use speed_core::LocationUpdate;

    #[test]
    fn snapshot_formats_with_configured_decimals() {
        let mut tracker = SpeedTracker::new(0.0, 0);
        tracker.observe(&LocationUpdate {
            t_ms: 1_000,
            speed_mps: 10.0,
            horizontal_accuracy_m: 3.5,
            ..Default::default()
        });
        let mut settings = Settings::default();
        settings.set_decimal_count(2);

        let snapshot = build_snapshot(&tracker, &settings, DisplayMode::Chart, 7);
        assert_eq!(snapshot.sequence, 7);
        assert_eq!(snapshot.current_text, "36.00");
        assert_eq!(snapshot.unit_label, "km/h");
        assert_eq!(snapshot.band, SpeedBand::Fast);
        assert!(snapshot.moving);
        assert_eq!(snapshot.history.len(), 1);
        assert_eq!(snapshot.history[0].t_ms, 1_000);
        assert!((snapshot.history[0].speed - 36.0).abs() < 1e-9);
        assert_eq!(snapshot.horizontal_accuracy_m, Some(3.5));
        assert_eq!(snapshot.last_updated_ms, Some(1_000));
        assert!((snapshot.chart_ceiling - 61.5).abs() < 1e-9);
    }

    #[test]
    fn idle_snapshot_has_no_marker_or_error() {
        let tracker = SpeedTracker::new(0.0, 0);
        let snapshot = build_snapshot(&tracker, &Settings::default(), DisplayMode::default(), 0);
        assert!(!snapshot.moving);
        assert_eq!(snapshot.band, SpeedBand::Slow);
        assert_eq!(snapshot.average_marker, None);
        assert_eq!(snapshot.last_error, None);

        let json = serde_json::to_value(&snapshot).unwrap();
        assert!(json.get("last_error").is_none());
        assert_eq!(json["display_mode"], "speedometer");
    }
}
