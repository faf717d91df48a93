// Shared constants for timing, schema, paths, and environment keys.

pub const SCHEMA_VERSION: &str = "1.0";
pub const REPORT_INTERVAL_MS: u64 = 1_000;
pub const SETTINGS_FILE: &str = "settings.json";

pub const DATA_DIR_ENV: &str = "SPEEDTRACK_DATA_DIR";
pub const REPLAY_ENV: &str = "SPEEDTRACK_REPLAY";
pub const REPLAY_RATE_ENV: &str = "SPEEDTRACK_REPLAY_RATE";
pub const REPORT_MS_ENV: &str = "SPEEDTRACK_REPORT_MS";
