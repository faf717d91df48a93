// User intents from presentation surfaces, mapped to settings writes or tracker resets.

use tracing::info;

use speed_core::cycle::Cyclic;
use speed_core::settings::{ThresholdLevel, ThresholdSpeed};
use speed_core::{DisplayMode, SpeedUnit, Theme};

use crate::app::AppState;
use crate::store::StoreError;
use crate::utils::now_epoch_ms;

#[derive(Clone, Debug, PartialEq)]
pub enum Intent {
    CycleUnit,
    SetUnit(SpeedUnit),
    CycleTheme,
    SetTheme(Theme),
    SetDecimalCount(u8),
    /// Threshold value expressed in the currently selected unit.
    SetThreshold { level: ThresholdLevel, value: f64 },
    ResetThresholds,
    NextDisplayMode,
    SetDisplayMode(DisplayMode),
    ClearHistory,
    ResetMax,
}

impl Intent {
    /// Parses a command such as `unit mph`, `theme purple`, `threshold fast 25`, or `reset-max`.
    pub fn parse(line: &str) -> Option<Self> {
        let mut parts = line.split_whitespace();
        let command = parts.next()?.to_ascii_lowercase();
        let arg = parts.next();
        let extra = parts.next();

        let intent = match (command.as_str(), arg, extra) {
            ("unit", None, None) => Intent::CycleUnit,
            ("unit", Some(value), None) => Intent::SetUnit(parse_unit(value)?),
            ("theme", None, None) => Intent::CycleTheme,
            ("theme", Some(value), None) => Intent::SetTheme(Theme::parse(value)?),
            ("decimals", Some(value), None) => Intent::SetDecimalCount(value.parse().ok()?),
            ("threshold", Some(level), Some(value)) => {
                let value: f64 = value.parse().ok()?;
                if !value.is_finite() || value < 0.0 {
                    return None;
                }
                Intent::SetThreshold {
                    level: ThresholdLevel::parse(level)?,
                    value,
                }
            }
            ("thresholds", Some("reset"), None) => Intent::ResetThresholds,
            ("mode", None, None) => Intent::NextDisplayMode,
            ("mode", Some("speedometer"), None) => Intent::SetDisplayMode(DisplayMode::Speedometer),
            ("mode", Some("chart"), None) => Intent::SetDisplayMode(DisplayMode::Chart),
            ("clear", None, None) => Intent::ClearHistory,
            ("reset-max", None, None) => Intent::ResetMax,
            _ => return None,
        };
        Some(intent)
    }
}

fn parse_unit(value: &str) -> Option<SpeedUnit> {
    match value.to_ascii_lowercase().as_str() {
        "mps" | "m/s" => Some(SpeedUnit::MetersPerSecond),
        "kmh" | "km/h" => Some(SpeedUnit::KilometersPerHour),
        "mph" => Some(SpeedUnit::MilesPerHour),
        other => SpeedUnit::parse(other),
    }
}

pub async fn apply_intent(app_state: &AppState, intent: Intent) -> Result<(), StoreError> {
    info!(?intent, "applying intent");
    let result = match intent {
        Intent::CycleUnit => update_settings(app_state, |s| s.unit = s.unit.next()).await,
        Intent::SetUnit(unit) => update_settings(app_state, |s| s.unit = unit).await,
        Intent::CycleTheme => update_settings(app_state, |s| s.theme = s.theme.next()).await,
        Intent::SetTheme(theme) => update_settings(app_state, |s| s.theme = theme).await,
        Intent::SetDecimalCount(decimals) => {
            update_settings(app_state, |s| s.set_decimal_count(decimals)).await
        }
        Intent::SetThreshold { level, value } => {
            let now_ms = now_epoch_ms();
            update_settings(app_state, |s| {
                let threshold = ThresholdSpeed::from_unit(value, s.unit, now_ms);
                s.thresholds.set(level, threshold);
            })
            .await
        }
        Intent::ResetThresholds => {
            let now_ms = now_epoch_ms();
            update_settings(app_state, |s| s.thresholds.reset(now_ms)).await
        }
        Intent::NextDisplayMode => {
            let mut mode = app_state.display_mode.lock().await;
            *mode = (*mode).next();
            Ok(())
        }
        Intent::SetDisplayMode(next) => {
            *app_state.display_mode.lock().await = next;
            Ok(())
        }
        Intent::ClearHistory => {
            app_state.tracker.write().await.clear_history();
            Ok(())
        }
        Intent::ResetMax => {
            app_state.tracker.write().await.reset_max();
            update_settings(app_state, |s| s.max_speed_mps = 0.0).await
        }
    };

    app_state.publish_snapshot().await;
    result
}

async fn update_settings<F>(app_state: &AppState, apply: F) -> Result<(), StoreError>
where
    F: FnOnce(&mut speed_core::Settings),
{
    app_state.settings.update(apply).await.map(|_| ())
}
