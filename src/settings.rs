use clap::ValueEnum;
use serde::{Deserialize, Serialize};

#[derive(
    Debug,
    Default,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    ValueEnum,
    strum_macros::Display,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Theme {
    #[default]
    Dark,
    Light,
    Neon,
    Ocean,
}

impl Theme {
    pub const ALL: [Theme; 4] = [Theme::Dark, Theme::Light, Theme::Neon, Theme::Ocean];

    pub fn next(self) -> Theme {
        let idx = Theme::ALL.iter().position(|t| *t == self).unwrap_or(0);
        Theme::ALL[(idx + 1) % Theme::ALL.len()]
    }

    pub fn parse(name: &str) -> Option<Theme> {
        Theme::ALL
            .into_iter()
            .find(|t| t.to_string().eq_ignore_ascii_case(name.trim()))
    }
}

/// What a click outside a running session does.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IdleClickPolicy {
    /// Start a new session; the click itself is not counted.
    #[default]
    Start,
    Ignore,
}

/// User preferences. Everything except the idle policy is persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    pub sound_enabled: bool,
    pub spacebar_enabled: bool,
    pub click_effects_enabled: bool,
    pub achievements_enabled: bool,
    pub theme: Theme,
    #[serde(skip)]
    pub idle_click_policy: IdleClickPolicy,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            sound_enabled: false,
            spacebar_enabled: true,
            click_effects_enabled: true,
            achievements_enabled: true,
            theme: Theme::Dark,
            idle_click_policy: IdleClickPolicy::Start,
        }
    }
}

/// Toggleable boolean settings, addressable from the menu.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum_macros::Display)]
pub enum Toggle {
    #[strum(to_string = "Sound")]
    Sound,
    #[strum(to_string = "Spacebar")]
    Spacebar,
    #[strum(to_string = "Click effects")]
    ClickEffects,
    #[strum(to_string = "Achievements")]
    Achievements,
}

impl Toggle {
    pub const ALL: [Toggle; 4] = [
        Toggle::Sound,
        Toggle::Spacebar,
        Toggle::ClickEffects,
        Toggle::Achievements,
    ];
}

impl Settings {
    pub fn get(&self, toggle: Toggle) -> bool {
        match toggle {
            Toggle::Sound => self.sound_enabled,
            Toggle::Spacebar => self.spacebar_enabled,
            Toggle::ClickEffects => self.click_effects_enabled,
            Toggle::Achievements => self.achievements_enabled,
        }
    }

    pub fn set(&mut self, toggle: Toggle, value: bool) {
        let slot = match toggle {
            Toggle::Sound => &mut self.sound_enabled,
            Toggle::Spacebar => &mut self.spacebar_enabled,
            Toggle::ClickEffects => &mut self.click_effects_enabled,
            Toggle::Achievements => &mut self.achievements_enabled,
        };
        *slot = value;
    }
}
