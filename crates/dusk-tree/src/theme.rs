//! Theme vocabulary: preference, override, effective value, resource key.
//!
//! Four small enums with distinct roles:
//! - [`ThemePreference`] is what an application asks for (Light/Dark).
//! - [`ElementTheme`] is a per-element override; `Default` means inherit.
//! - [`EffectiveTheme`] is what an element actually gets after
//!   inheritance resolution.
//! - [`ThemeKey`] selects a resource set and adds `HighContrast`, which
//!   exists only at the resource level: high contrast never changes an
//!   element's effective theme, only which dictionary its scope carries.

use std::fmt;

/// The light/dark preference for an application as a whole.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ThemePreference {
    /// Use the light theme.
    #[default]
    Light,
    /// Use the dark theme.
    Dark,
}

/// A per-element theme override.
///
/// `Default` inherits from the nearest ancestor with a resolved theme,
/// falling back to the application's effective theme at the root.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ElementTheme {
    /// Inherit from the ancestor chain / application.
    #[default]
    Default,
    /// Force the light theme for this element and its descendants.
    Light,
    /// Force the dark theme for this element and its descendants.
    Dark,
}

impl ElementTheme {
    /// The effective theme this override forces, if any.
    #[must_use]
    pub const fn as_effective(self) -> Option<EffectiveTheme> {
        match self {
            Self::Default => None,
            Self::Light => Some(EffectiveTheme::Light),
            Self::Dark => Some(EffectiveTheme::Dark),
        }
    }
}

/// The theme an element actually uses after inheritance resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum EffectiveTheme {
    /// The light theme.
    Light,
    /// The dark theme.
    Dark,
}

impl From<ThemePreference> for EffectiveTheme {
    fn from(pref: ThemePreference) -> Self {
        match pref {
            ThemePreference::Light => Self::Light,
            ThemePreference::Dark => Self::Dark,
        }
    }
}

/// Selects one of the three theme resource sets.
///
/// `HighContrast` takes strict precedence over Light/Dark when active,
/// independent of element overrides and of [`EffectiveTheme`] bookkeeping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ThemeKey {
    /// The light resource set.
    Light,
    /// The dark resource set.
    Dark,
    /// The high-contrast resource set.
    HighContrast,
}

impl ThemeKey {
    /// Canonical dictionary name for this key.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Light => "Light",
            Self::Dark => "Dark",
            Self::HighContrast => "HighContrast",
        }
    }
}

impl From<EffectiveTheme> for ThemeKey {
    fn from(theme: EffectiveTheme) -> Self {
        match theme {
            EffectiveTheme::Light => Self::Light,
            EffectiveTheme::Dark => Self::Dark,
        }
    }
}

impl From<ThemePreference> for ThemeKey {
    fn from(pref: ThemePreference) -> Self {
        EffectiveTheme::from(pref).into()
    }
}

impl fmt::Display for ThemeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
