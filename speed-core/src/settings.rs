// User preferences injected into the tracker and presentation surfaces.
// Invariants: every key decodes independently; a missing or malformed value falls back to its default.

use serde::Serialize;
use serde_json::{json, Map, Value};

use crate::theme::Theme;
use crate::units::{clamp_decimal_count, to_meters_per_second, SpeedUnit};

pub const KEY_UNIT: &str = "selected_speed_option";
pub const KEY_DECIMAL_COUNT: &str = "decimal_count";
pub const KEY_THEME: &str = "selected_theme";
pub const KEY_MAX_SPEED: &str = "max_speed_mps";
pub const KEY_SLOW_THRESHOLD: &str = "slow_threshold";
pub const KEY_MEDIUM_THRESHOLD: &str = "medium_threshold";
pub const KEY_FAST_THRESHOLD: &str = "fast_threshold";

pub const DEFAULT_DECIMAL_COUNT: u8 = 1;
pub const DEFAULT_SLOW_MPS: f64 = 2.0;
pub const DEFAULT_MEDIUM_MPS: f64 = 4.0;
pub const DEFAULT_FAST_MPS: f64 = 6.0;

#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct ThresholdSpeed {
    pub speed_mps: f64,
    pub set_at_ms: u64,
}

impl ThresholdSpeed {
    pub fn new(speed_mps: f64, set_at_ms: u64) -> Self {
        Self {
            speed_mps: speed_mps.max(0.0),
            set_at_ms,
        }
    }

    /// Threshold entered by the user in the displayed unit.
    pub fn from_unit(value: f64, unit: SpeedUnit, set_at_ms: u64) -> Self {
        Self::new(to_meters_per_second(value, unit), set_at_ms)
    }

    fn encode(&self) -> Value {
        json!({ "speed_mps": self.speed_mps, "set_at_ms": self.set_at_ms })
    }

    fn decode(value: &Value) -> Option<Self> {
        let speed_mps = value.get("speed_mps")?.as_f64()?;
        if !speed_mps.is_finite() || speed_mps < 0.0 {
            return None;
        }
        let set_at_ms = value
            .get("set_at_ms")
            .and_then(Value::as_u64)
            .unwrap_or(0);
        Some(Self::new(speed_mps, set_at_ms))
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct Thresholds {
    pub slow: ThresholdSpeed,
    pub medium: ThresholdSpeed,
    pub fast: ThresholdSpeed,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            slow: ThresholdSpeed::new(DEFAULT_SLOW_MPS, 0),
            medium: ThresholdSpeed::new(DEFAULT_MEDIUM_MPS, 0),
            fast: ThresholdSpeed::new(DEFAULT_FAST_MPS, 0),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ThresholdLevel {
    Slow,
    Medium,
    Fast,
}

impl ThresholdLevel {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "slow" => Some(ThresholdLevel::Slow),
            "medium" => Some(ThresholdLevel::Medium),
            "fast" => Some(ThresholdLevel::Fast),
            _ => None,
        }
    }
}

impl Thresholds {
    pub fn set(&mut self, level: ThresholdLevel, threshold: ThresholdSpeed) {
        match level {
            ThresholdLevel::Slow => self.slow = threshold,
            ThresholdLevel::Medium => self.medium = threshold,
            ThresholdLevel::Fast => self.fast = threshold,
        }
    }

    pub fn reset(&mut self, now_ms: u64) {
        self.slow = ThresholdSpeed::new(DEFAULT_SLOW_MPS, now_ms);
        self.medium = ThresholdSpeed::new(DEFAULT_MEDIUM_MPS, now_ms);
        self.fast = ThresholdSpeed::new(DEFAULT_FAST_MPS, now_ms);
    }
}

/// Recognised options: `unit` drives every converted value, `decimal_count`
/// formatting only, `theme` colour only, `thresholds` background banding only.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Settings {
    pub unit: SpeedUnit,
    pub decimal_count: u8,
    pub theme: Theme,
    pub max_speed_mps: f64,
    pub thresholds: Thresholds,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            unit: SpeedUnit::default(),
            decimal_count: DEFAULT_DECIMAL_COUNT,
            theme: Theme::default(),
            max_speed_mps: 0.0,
            thresholds: Thresholds::default(),
        }
    }
}

/// Result of decoding a stored key/value map.
#[derive(Debug)]
pub struct DecodedSettings {
    pub settings: Settings,
    /// Keys that were present but could not be decoded.
    pub rejected: Vec<&'static str>,
}

impl Settings {
    pub fn set_decimal_count(&mut self, decimals: u8) {
        self.decimal_count = clamp_decimal_count(decimals);
    }

    pub fn to_entries(&self) -> Map<String, Value> {
        let mut map = Map::new();
        map.insert(KEY_UNIT.to_string(), Value::from(self.unit.as_str()));
        map.insert(KEY_DECIMAL_COUNT.to_string(), Value::from(self.decimal_count));
        map.insert(KEY_THEME.to_string(), Value::from(self.theme.as_str()));
        map.insert(KEY_MAX_SPEED.to_string(), json!(self.max_speed_mps));
        map.insert(KEY_SLOW_THRESHOLD.to_string(), self.thresholds.slow.encode());
        map.insert(KEY_MEDIUM_THRESHOLD.to_string(), self.thresholds.medium.encode());
        map.insert(KEY_FAST_THRESHOLD.to_string(), self.thresholds.fast.encode());
        map
    }

    pub fn from_entries(map: &Map<String, Value>) -> DecodedSettings {
        let mut settings = Settings::default();
        let mut rejected = Vec::new();

        decode_key(map, KEY_UNIT, &mut rejected, &mut settings.unit, |v| {
            v.as_str().and_then(SpeedUnit::parse)
        });
        decode_key(
            map,
            KEY_DECIMAL_COUNT,
            &mut rejected,
            &mut settings.decimal_count,
            |v| {
                v.as_u64()
                    .filter(|n| *n <= u8::MAX as u64)
                    .map(|n| clamp_decimal_count(n as u8))
            },
        );
        decode_key(map, KEY_THEME, &mut rejected, &mut settings.theme, |v| {
            v.as_str().and_then(Theme::parse)
        });
        decode_key(
            map,
            KEY_MAX_SPEED,
            &mut rejected,
            &mut settings.max_speed_mps,
            |v| v.as_f64().filter(|n| n.is_finite() && *n >= 0.0),
        );
        decode_key(
            map,
            KEY_SLOW_THRESHOLD,
            &mut rejected,
            &mut settings.thresholds.slow,
            ThresholdSpeed::decode,
        );
        decode_key(
            map,
            KEY_MEDIUM_THRESHOLD,
            &mut rejected,
            &mut settings.thresholds.medium,
            ThresholdSpeed::decode,
        );
        decode_key(
            map,
            KEY_FAST_THRESHOLD,
            &mut rejected,
            &mut settings.thresholds.fast,
            ThresholdSpeed::decode,
        );

        DecodedSettings { settings, rejected }
    }
}

fn decode_key<T>(
    map: &Map<String, Value>,
    key: &'static str,
    rejected: &mut Vec<&'static str>,
    target: &mut T,
    decode: impl Fn(&Value) -> Option<T>,
) {
    if let Some(value) = map.get(key) {
        match decode(value) {
            Some(decoded) => *target = decoded,
            None => rejected.push(key),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_store_yields_defaults() {
        let decoded = Settings::from_entries(&Map::new());
        assert_eq!(decoded.settings, Settings::default());
        assert!(decoded.rejected.is_empty());
        assert_eq!(decoded.settings.unit, SpeedUnit::KilometersPerHour);
        assert_eq!(decoded.settings.decimal_count, 1);
        assert_eq!(decoded.settings.theme, Theme::Blue);
        assert_eq!(decoded.settings.thresholds.fast.speed_mps, 6.0);
    }

    #[test]
    fn entries_decode_back() {
        let mut settings = Settings::default();
        settings.unit = SpeedUnit::MilesPerHour;
        settings.set_decimal_count(3);
        settings.theme = Theme::Orange;
        settings.max_speed_mps = 31.5;
        settings.thresholds.medium = ThresholdSpeed::new(5.5, 1_700_000_000_000);

        let decoded = Settings::from_entries(&settings.to_entries());
        assert_eq!(decoded.settings, settings);
    }

    #[test]
    fn malformed_keys_fall_back_individually() {
        let mut map = Map::new();
        map.insert(KEY_UNIT.to_string(), json!("warp"));
        map.insert(KEY_THEME.to_string(), json!("purple"));
        map.insert(KEY_MAX_SPEED.to_string(), json!(-3.0));
        map.insert(KEY_SLOW_THRESHOLD.to_string(), json!({ "speed": 1.0 }));

        let decoded = Settings::from_entries(&map);
        assert_eq!(decoded.settings.unit, SpeedUnit::KilometersPerHour);
        assert_eq!(decoded.settings.theme, Theme::Purple);
        assert_eq!(decoded.settings.max_speed_mps, 0.0);
        assert_eq!(decoded.settings.thresholds.slow.speed_mps, DEFAULT_SLOW_MPS);
        assert_eq!(
            decoded.rejected,
            vec![KEY_UNIT, KEY_MAX_SPEED, KEY_SLOW_THRESHOLD]
        );
    }

    #[test]
    fn decimal_count_is_clamped() {
        let mut map = Map::new();
        map.insert(KEY_DECIMAL_COUNT.to_string(), json!(7));
        assert_eq!(Settings::from_entries(&map).settings.decimal_count, 3);
    }

    #[test]
    fn threshold_from_displayed_unit() {
        let threshold = ThresholdSpeed::from_unit(36.0, SpeedUnit::KilometersPerHour, 5);
        assert!((threshold.speed_mps - 10.0).abs() < 1e-9);
        assert_eq!(threshold.set_at_ms, 5);
    }
}
