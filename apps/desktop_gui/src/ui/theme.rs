//! Light/dark theme selection and the persisted UI settings blob.

use egui::Visuals;
use serde::{Deserialize, Serialize};

/// Key under which [`PersistedUiSettings`] is stored in eframe storage.
pub const SETTINGS_STORAGE_KEY: &str = "docchat.settings";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ThemePreference {
    Light,
    Dark,
}

impl ThemePreference {
    /// First-run default: follow the system preference already applied to
    /// the egui context.
    pub fn from_dark_mode(dark: bool) -> Self {
        if dark {
            ThemePreference::Dark
        } else {
            ThemePreference::Light
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ThemePreference::Light => "Light Mode",
            ThemePreference::Dark => "Dark Mode",
        }
    }

    /// Tooltip for the theme toggle button: names the mode it switches to.
    pub fn toggle_hint(self) -> &'static str {
        match self {
            ThemePreference::Light => "Switch to Dark Mode",
            ThemePreference::Dark => "Switch to Light Mode",
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            ThemePreference::Light => ThemePreference::Dark,
            ThemePreference::Dark => ThemePreference::Light,
        }
    }
}

pub fn visuals_for(pref: ThemePreference) -> Visuals {
    let mut visuals = match pref {
        ThemePreference::Light => Visuals::light(),
        ThemePreference::Dark => Visuals::dark(),
    };
    visuals.selection.bg_fill = match pref {
        ThemePreference::Light => egui::Color32::from_rgb(37, 99, 235),
        ThemePreference::Dark => egui::Color32::from_rgb(96, 165, 250),
    };
    visuals.hyperlink_color = visuals.selection.bg_fill;
    visuals
}

/// UI state carried across runs via eframe storage.
#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PersistedUiSettings {
    pub theme: Option<ThemePreference>,
}
