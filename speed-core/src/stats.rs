// Derived statistics over the rolling history, computed on demand.

use serde::Serialize;

use crate::model::Sample;
use crate::settings::Thresholds;
use crate::units::{convert, SpeedUnit};

/// Number of most recent samples the chart plots.
pub const CHART_WINDOW: usize = 30;
/// Headroom added above the chart's highest plotted speed, in the displayed unit.
pub const CHART_HEADROOM: f64 = 5.0;
/// Multiplier applied to the chart's reference speed to get the y-axis top.
pub const CHART_SCALE: f64 = 1.5;

/// Arithmetic mean speed in m/s; an empty history averages to 0.
pub fn average<'a, I>(samples: I) -> f64
where
    I: IntoIterator<Item = &'a Sample>,
{
    let (sum, count) = samples
        .into_iter()
        .fold((0.0, 0usize), |(sum, count), sample| {
            (sum + sample.speed_mps, count + 1)
        });
    if count == 0 {
        0.0
    } else {
        sum / count as f64
    }
}

/// Upper bound of the chart's y-axis in `unit`: the recent peak plus headroom,
/// or max-ever when the window is empty, scaled by [`CHART_SCALE`].
pub fn chart_ceiling(recent: &[Sample], max_ever_mps: f64, unit: SpeedUnit) -> f64 {
    let start = recent.len().saturating_sub(CHART_WINDOW);
    let reference = recent[start..]
        .iter()
        .map(|sample| sample.speed_mps)
        .reduce(f64::max)
        .map(|peak| convert(peak, unit) + CHART_HEADROOM)
        .unwrap_or_else(|| convert(max_ever_mps, unit));
    reference * CHART_SCALE
}

/// Needle position in `[0, 1]` for a gauge scaled to the unit's full-scale value.
pub fn gauge_fraction(speed_mps: f64, unit: SpeedUnit) -> f64 {
    let fraction = convert(speed_mps, unit) / unit.gauge_max();
    if fraction.is_finite() {
        fraction.clamp(0.0, 1.0)
    } else {
        0.0
    }
}

/// Average marker position, hidden while stationary or off-scale.
pub fn average_marker_fraction(average_mps: f64, unit: SpeedUnit) -> Option<f64> {
    let value = convert(average_mps, unit);
    if value > 0.0 && value <= unit.gauge_max() {
        Some(value / unit.gauge_max())
    } else {
        None
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SpeedBand {
    Slow,
    Medium,
    Fast,
}

/// Background bucket: below slow is `Slow`, above fast is `Fast`, anything else `Medium`.
pub fn speed_band(speed_mps: f64, thresholds: &Thresholds) -> SpeedBand {
    if speed_mps < thresholds.slow.speed_mps {
        SpeedBand::Slow
    } else if speed_mps > thresholds.fast.speed_mps {
        SpeedBand::Fast
    } else {
        SpeedBand::Medium
    }
}
