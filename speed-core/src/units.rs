// Speed units, conversion factors, and display formatting.
// Invariants: all stored speeds are meters/second; conversion happens only at the display edge.

use serde::{Deserialize, Serialize};

use crate::cycle::Cyclic;

pub const KMH_PER_MPS: f64 = 3.6;
/// 3600 / 1609.344
pub const MPH_PER_MPS: f64 = 3600.0 / 1609.344;

pub const GAUGE_MAX_MPS: f64 = 40.0;
pub const GAUGE_MAX_KMH: f64 = 140.0;
pub const GAUGE_MAX_MPH: f64 = 90.0;

pub const MAX_DECIMAL_COUNT: u8 = 3;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpeedUnit {
    MetersPerSecond,
    #[default]
    KilometersPerHour,
    MilesPerHour,
}

const UNIT_TABLE: [(SpeedUnit, &str); 3] = [
    (SpeedUnit::MetersPerSecond, "meters_per_second"),
    (SpeedUnit::KilometersPerHour, "kilometers_per_hour"),
    (SpeedUnit::MilesPerHour, "miles_per_hour"),
];

impl SpeedUnit {
    pub fn factor(&self) -> f64 {
        match self {
            SpeedUnit::MetersPerSecond => 1.0,
            SpeedUnit::KilometersPerHour => KMH_PER_MPS,
            SpeedUnit::MilesPerHour => MPH_PER_MPS,
        }
    }

    pub fn as_str(&self) -> &'static str {
        UNIT_TABLE
            .iter()
            .find(|(unit, _)| unit == self)
            .map(|(_, key)| *key)
            .unwrap_or("meters_per_second")
    }

    pub fn parse(value: &str) -> Option<Self> {
        let value = value.trim();
        UNIT_TABLE
            .iter()
            .find(|(_, key)| *key == value)
            .map(|(unit, _)| *unit)
    }

    pub fn name(&self) -> &'static str {
        match self {
            SpeedUnit::MetersPerSecond => "Meters / Second",
            SpeedUnit::KilometersPerHour => "Km / Hour",
            SpeedUnit::MilesPerHour => "Mile / Hour",
        }
    }

    pub fn short_name(&self) -> &'static str {
        match self {
            SpeedUnit::MetersPerSecond => "m/s",
            SpeedUnit::KilometersPerHour => "km/h",
            SpeedUnit::MilesPerHour => "mph",
        }
    }

    /// Full-scale value of a gauge, expressed in this unit.
    pub fn gauge_max(&self) -> f64 {
        match self {
            SpeedUnit::MetersPerSecond => GAUGE_MAX_MPS,
            SpeedUnit::KilometersPerHour => GAUGE_MAX_KMH,
            SpeedUnit::MilesPerHour => GAUGE_MAX_MPH,
        }
    }
}

impl Cyclic for SpeedUnit {
    const ALL: &'static [Self] = &[
        SpeedUnit::MetersPerSecond,
        SpeedUnit::KilometersPerHour,
        SpeedUnit::MilesPerHour,
    ];
}

pub fn convert(speed_mps: f64, unit: SpeedUnit) -> f64 {
    speed_mps * unit.factor()
}

pub fn to_meters_per_second(value: f64, unit: SpeedUnit) -> f64 {
    value / unit.factor()
}

pub fn convert_between(value: f64, from: SpeedUnit, to: SpeedUnit) -> f64 {
    convert(to_meters_per_second(value, from), to)
}

pub fn clamp_decimal_count(decimals: u8) -> u8 {
    decimals.min(MAX_DECIMAL_COUNT)
}

pub fn format_speed(value: f64, decimals: u8) -> String {
    let decimals = clamp_decimal_count(decimals) as usize;
    let value = if value.is_finite() { value } else { 0.0 };
    format!("{:.*}", decimals, value)
}
