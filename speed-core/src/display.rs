// Display mode selection for presentation surfaces.

use serde::{Deserialize, Serialize};

use crate::cycle::Cyclic;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DisplayMode {
    #[default]
    Speedometer,
    Chart,
}

impl DisplayMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            DisplayMode::Speedometer => "speedometer",
            DisplayMode::Chart => "chart",
        }
    }
}

impl Cyclic for DisplayMode {
    const ALL: &'static [Self] = &[DisplayMode::Speedometer, DisplayMode::Chart];
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn next_cycles_through_modes() {
        let mut mode = DisplayMode::Speedometer;
        let mut seen = Vec::new();
        for _ in 0..5 {
            seen.push(mode);
            mode = mode.next();
        }
        assert_eq!(
            seen,
            vec![
                DisplayMode::Speedometer,
                DisplayMode::Chart,
                DisplayMode::Speedometer,
                DisplayMode::Chart,
                DisplayMode::Speedometer,
            ]
        );
    }
}
