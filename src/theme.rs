//! Theme names, concrete appearances and the class names bound to them.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::InvalidThemeName;

/// A theme the user can choose.
///
/// `System` is a directive ("follow the OS"), while `Dark` and `Light` are
/// concrete appearances.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ThemeName {
    #[default]
    System,
    Dark,
    Light,
}

/// Every theme name, in display order. The first entry is the default.
pub const THEME_NAMES: [ThemeName; 3] = ThemeName::ALL;

impl ThemeName {
    pub const ALL: [ThemeName; 3] = [ThemeName::System, ThemeName::Dark, ThemeName::Light];

    pub fn as_str(self) -> &'static str {
        match self {
            ThemeName::System => "system",
            ThemeName::Dark => "dark",
            ThemeName::Light => "light",
        }
    }

    pub fn is_system(self) -> bool {
        self == ThemeName::System
    }

    pub fn is_dark(self) -> bool {
        self == ThemeName::Dark
    }

    /// The appearance this theme pins, or `None` for `System`.
    pub fn appearance(self) -> Option<Appearance> {
        match self {
            ThemeName::System => None,
            ThemeName::Dark => Some(Appearance::Dark),
            ThemeName::Light => Some(Appearance::Light),
        }
    }
}

impl fmt::Display for ThemeName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ThemeName {
    type Err = InvalidThemeName;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ThemeName::ALL
            .into_iter()
            .find(|name| name.as_str() == s)
            .ok_or_else(|| InvalidThemeName(s.to_string()))
    }
}

pub fn is_valid_theme_name(name: &str) -> bool {
    name.parse::<ThemeName>().is_ok()
}

pub fn is_system_theme(theme: ThemeName) -> bool {
    theme.is_system()
}

pub fn is_dark_theme(theme: ThemeName) -> bool {
    theme.is_dark()
}

/// What actually gets painted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Appearance {
    Dark,
    Light,
}

impl Appearance {
    pub fn as_str(self) -> &'static str {
        match self {
            Appearance::Dark => "dark",
            Appearance::Light => "light",
        }
    }
}

impl fmt::Display for Appearance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Resolve a theme against the OS dark preference.
/// `prefers_dark` only matters for [`ThemeName::System`].
pub fn resolve_appearance(theme: ThemeName, prefers_dark: bool) -> Appearance {
    match theme.appearance() {
        Some(appearance) => appearance,
        None if prefers_dark => Appearance::Dark,
        None => Appearance::Light,
    }
}

/// Class names toggled on the target element for each appearance.
///
/// Missing fields in a deserialized value keep their defaults, so a config
/// may override only `dark` or only `light`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ThemeClasses {
    pub dark: Vec<String>,
    pub light: Vec<String>,
}

impl Default for ThemeClasses {
    fn default() -> Self {
        Self {
            dark: vec![Appearance::Dark.as_str().to_string()],
            light: vec![Appearance::Light.as_str().to_string()],
        }
    }
}

impl ThemeClasses {
    pub fn classes_for(&self, appearance: Appearance) -> &[String] {
        match appearance {
            Appearance::Dark => &self.dark,
            Appearance::Light => &self.light,
        }
    }

    pub fn entries(&self) -> [(Appearance, &[String]); 2] {
        [
            (Appearance::Dark, self.dark.as_slice()),
            (Appearance::Light, self.light.as_slice()),
        ]
    }

    /// Every class name this mapping can put on a target.
    pub fn all_classes(&self) -> impl Iterator<Item = &str> {
        self.dark.iter().chain(self.light.iter()).map(String::as_str)
    }
}
