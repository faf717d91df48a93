// Colour themes selectable by the user. Affects colour only.

use serde::{Deserialize, Serialize};

use crate::cycle::Cyclic;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Theme {
    Red,
    #[default]
    Blue,
    Green,
    Orange,
    Purple,
}

const THEME_TABLE: [(Theme, &str, &str); 5] = [
    (Theme::Red, "red", "#ff3b30"),
    (Theme::Blue, "blue", "#007aff"),
    (Theme::Green, "green", "#34c759"),
    (Theme::Orange, "orange", "#ff9500"),
    (Theme::Purple, "purple", "#af52de"),
];

impl Theme {
    pub fn as_str(&self) -> &'static str {
        THEME_TABLE
            .iter()
            .find(|(theme, _, _)| theme == self)
            .map(|(_, key, _)| *key)
            .unwrap_or("blue")
    }

    pub fn parse(value: &str) -> Option<Self> {
        let value = value.trim();
        THEME_TABLE
            .iter()
            .find(|(_, key, _)| key.eq_ignore_ascii_case(value))
            .map(|(theme, _, _)| *theme)
    }

    /// Hex RGB used by surfaces that cannot name system colours.
    pub fn hex(&self) -> &'static str {
        THEME_TABLE
            .iter()
            .find(|(theme, _, _)| theme == self)
            .map(|(_, _, hex)| *hex)
            .unwrap_or("#007aff")
    }
}

impl Cyclic for Theme {
    const ALL: &'static [Self] = &[
        Theme::Red,
        Theme::Blue,
        Theme::Green,
        Theme::Orange,
        Theme::Purple,
    ];
}
