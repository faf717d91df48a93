// Speed tracker: normalizes raw fixes, keeps the rolling history, and derives statistics.
// Invariants: single writer; history.len() <= capacity; max_ever_mps only decreases through reset_max.

use serde::Serialize;

use crate::buffers::RingBuffer;
use crate::error::LocationError;
use crate::model::{LocationUpdate, Sample};
use crate::stats;
use crate::units::{convert, SpeedUnit};

pub const HISTORY_CAPACITY: usize = 60;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MotionState {
    Stationary,
    Moving,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MotionTransition {
    pub from: MotionState,
    pub to: MotionState,
}

/// Side effects the owner of the tracker must carry out after an observation.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ObserveEvents {
    /// Set when the observation raised the max-ever speed; must be persisted.
    pub new_max_mps: Option<f64>,
    pub transition: Option<MotionTransition>,
}

/// Unit-converted values for presentation.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct SpeedReadout {
    pub unit: SpeedUnit,
    pub current: f64,
    pub max_ever: f64,
    pub average: f64,
    pub history: Vec<f64>,
}

#[derive(Clone, Debug)]
pub struct SpeedTracker {
    current: Sample,
    history: RingBuffer<Sample>,
    max_ever_mps: f64,
    no_signal_streak: u32,
    last_error: Option<LocationError>,
    last_fix: Option<LocationUpdate>,
    updates_applied: u64,
}

impl SpeedTracker {
    /// `max_ever_mps` is the value restored from persistence.
    pub fn new(max_ever_mps: f64, now_ms: u64) -> Self {
        Self::with_capacity(HISTORY_CAPACITY, max_ever_mps, now_ms)
    }

    pub fn with_capacity(capacity: usize, max_ever_mps: f64, now_ms: u64) -> Self {
        let max_ever_mps = if max_ever_mps.is_finite() {
            max_ever_mps.max(0.0)
        } else {
            0.0
        };
        Self {
            current: Sample::at_rest(now_ms),
            history: RingBuffer::new(capacity),
            max_ever_mps,
            no_signal_streak: 0,
            last_error: None,
            last_fix: None,
            updates_applied: 0,
        }
    }

    pub fn observe(&mut self, update: &LocationUpdate) -> ObserveEvents {
        let previous_motion = self.motion_state();
        let sample = Sample::new(update.speed_mps, update.t_ms);
        let speed_mps = sample.speed_mps;

        self.current = sample.clone();
        self.history.push(sample);

        let mut events = ObserveEvents::default();
        if speed_mps > self.max_ever_mps {
            self.max_ever_mps = speed_mps;
            events.new_max_mps = Some(speed_mps);
        }

        if speed_mps <= 0.0 {
            self.no_signal_streak = self.no_signal_streak.saturating_add(1);
        } else {
            self.no_signal_streak = 0;
        }

        self.last_fix = Some(update.clone());
        self.updates_applied = self.updates_applied.saturating_add(1);

        let next_motion = self.motion_state();
        if next_motion != previous_motion {
            events.transition = Some(MotionTransition {
                from: previous_motion,
                to: next_motion,
            });
        }
        events
    }

    /// Records a source failure; readings and history are left untouched.
    pub fn record_failure(&mut self, error: LocationError) {
        self.last_error = Some(error);
    }

    /// Called when a fresh subscription to the location source starts.
    pub fn begin_subscription(&mut self) {
        self.last_error = None;
    }

    pub fn clear_history(&mut self) {
        self.history.clear();
    }

    pub fn reset_max(&mut self) {
        self.max_ever_mps = 0.0;
    }

    pub fn current(&self) -> &Sample {
        &self.current
    }

    pub fn history(&self) -> &RingBuffer<Sample> {
        &self.history
    }

    pub fn max_ever_mps(&self) -> f64 {
        self.max_ever_mps
    }

    pub fn no_signal_streak(&self) -> u32 {
        self.no_signal_streak
    }

    pub fn last_error(&self) -> Option<&LocationError> {
        self.last_error.as_ref()
    }

    pub fn last_fix(&self) -> Option<&LocationUpdate> {
        self.last_fix.as_ref()
    }

    pub fn updates_applied(&self) -> u64 {
        self.updates_applied
    }

    pub fn motion_state(&self) -> MotionState {
        if self.current.speed_mps > 0.0 {
            MotionState::Moving
        } else {
            MotionState::Stationary
        }
    }

    pub fn average_mps(&self) -> f64 {
        stats::average(self.history.iter())
    }

    pub fn readout(&self, unit: SpeedUnit) -> SpeedReadout {
        SpeedReadout {
            unit,
            current: convert(self.current.speed_mps, unit),
            max_ever: convert(self.max_ever_mps, unit),
            average: convert(self.average_mps(), unit),
            history: self
                .history
                .iter()
                .map(|sample| convert(sample.speed_mps, unit))
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fix(speed_mps: f64, t_ms: u64) -> LocationUpdate {
        LocationUpdate {
            t_ms,
            latitude: 52.37,
            longitude: 4.89,
            speed_mps,
            horizontal_accuracy_m: 5.0,
        }
    }

    fn feed(tracker: &mut SpeedTracker, speeds: &[f64]) {
        for (i, speed) in speeds.iter().enumerate() {
            tracker.observe(&fix(*speed, i as u64 * 1_000));
        }
    }

    #[test]
    fn starts_at_rest_with_empty_history() {
        let tracker = SpeedTracker::new(0.0, 0);
        assert_eq!(tracker.current().speed_mps, 0.0);
        assert!(tracker.history().is_empty());
        assert_eq!(tracker.no_signal_streak(), 0);
        assert!(tracker.last_error().is_none());
        assert_eq!(tracker.average_mps(), 0.0);
    }

    #[test]
    fn negative_speed_is_stored_as_zero() {
        let mut tracker = SpeedTracker::new(0.0, 0);
        tracker.observe(&fix(-5.0, 0));
        assert_eq!(tracker.current().speed_mps, 0.0);
        assert_eq!(tracker.history().last().map(|s| s.speed_mps), Some(0.0));
    }

    #[test]
    fn history_keeps_last_n_in_arrival_order() {
        let mut tracker = SpeedTracker::new(0.0, 0);
        let speeds: Vec<f64> = (0..(HISTORY_CAPACITY + 7)).map(|i| i as f64).collect();
        feed(&mut tracker, &speeds);

        let kept: Vec<f64> = tracker.history().iter().map(|s| s.speed_mps).collect();
        assert_eq!(kept.len(), HISTORY_CAPACITY);
        assert_eq!(kept, speeds[7..].to_vec());
    }

    #[test]
    fn max_ever_is_non_decreasing_and_reported_once() {
        let mut tracker = SpeedTracker::new(0.0, 0);
        assert_eq!(tracker.observe(&fix(4.0, 0)).new_max_mps, Some(4.0));
        assert_eq!(tracker.observe(&fix(2.0, 1)).new_max_mps, None);
        assert_eq!(tracker.observe(&fix(4.0, 2)).new_max_mps, None);
        assert_eq!(tracker.max_ever_mps(), 4.0);
        assert_eq!(tracker.observe(&fix(9.0, 3)).new_max_mps, Some(9.0));
        assert_eq!(tracker.max_ever_mps(), 9.0);
    }

    #[test]
    fn restored_max_is_respected() {
        let mut tracker = SpeedTracker::new(20.0, 0);
        assert_eq!(tracker.observe(&fix(15.0, 0)).new_max_mps, None);
        assert_eq!(tracker.max_ever_mps(), 20.0);
    }

    #[test]
    fn reset_max_returns_to_zero_until_next_positive() {
        let mut tracker = SpeedTracker::new(0.0, 0);
        feed(&mut tracker, &[8.0]);
        tracker.reset_max();
        assert_eq!(tracker.max_ever_mps(), 0.0);
        tracker.observe(&fix(0.0, 10));
        assert_eq!(tracker.max_ever_mps(), 0.0);
        tracker.observe(&fix(1.5, 11));
        assert_eq!(tracker.max_ever_mps(), 1.5);
    }

    #[test]
    fn no_signal_streak_counts_trailing_non_positive() {
        let mut tracker = SpeedTracker::new(0.0, 0);
        feed(&mut tracker, &[3.0, 0.0, 0.0, 5.0, 0.0]);
        assert_eq!(tracker.no_signal_streak(), 1);
        feed(&mut tracker, &[-1.0, f64::NAN]);
        assert_eq!(tracker.no_signal_streak(), 3);
        feed(&mut tracker, &[0.1]);
        assert_eq!(tracker.no_signal_streak(), 0);
    }

    #[test]
    fn failure_keeps_readings() {
        let mut tracker = SpeedTracker::new(0.0, 0);
        feed(&mut tracker, &[5.0, 6.0]);
        tracker.record_failure(LocationError::SourceFailed("signal lost".into()));

        assert_eq!(tracker.current().speed_mps, 6.0);
        assert_eq!(tracker.history().len(), 2);
        assert_eq!(
            tracker.last_error(),
            Some(&LocationError::SourceFailed("signal lost".into()))
        );
    }

    #[test]
    fn successful_observation_does_not_clear_error() {
        let mut tracker = SpeedTracker::new(0.0, 0);
        tracker.record_failure(LocationError::PermissionDenied);
        feed(&mut tracker, &[1.0]);
        assert!(tracker.last_error().is_some());
        tracker.begin_subscription();
        assert!(tracker.last_error().is_none());
    }

    #[test]
    fn clear_history_leaves_current_and_max() {
        let mut tracker = SpeedTracker::new(0.0, 0);
        feed(&mut tracker, &[2.0, 7.0, 0.0]);
        tracker.clear_history();
        assert!(tracker.history().is_empty());
        assert_eq!(tracker.average_mps(), 0.0);
        assert_eq!(tracker.max_ever_mps(), 7.0);
        assert_eq!(tracker.no_signal_streak(), 1);
    }

    #[test]
    fn motion_transitions_are_reported() {
        let mut tracker = SpeedTracker::new(0.0, 0);
        let events = tracker.observe(&fix(0.0, 0));
        assert_eq!(events.transition, None);

        let events = tracker.observe(&fix(3.0, 1));
        assert_eq!(
            events.transition,
            Some(MotionTransition {
                from: MotionState::Stationary,
                to: MotionState::Moving,
            })
        );

        let events = tracker.observe(&fix(-1.0, 2));
        assert_eq!(
            events.transition.map(|t| t.to),
            Some(MotionState::Stationary)
        );
    }

    #[test]
    fn readout_converts_every_value() {
        let mut tracker = SpeedTracker::new(0.0, 0);
        feed(&mut tracker, &[2.0, 4.0, 6.0]);
        let readout = tracker.readout(SpeedUnit::KilometersPerHour);
        assert!((readout.current - 21.6).abs() < 1e-9);
        assert!((readout.max_ever - 21.6).abs() < 1e-9);
        assert!((readout.average - 14.4).abs() < 1e-9);
        assert_eq!(readout.history.len(), 3);
        assert!((readout.history[0] - 7.2).abs() < 1e-9);
    }
}
