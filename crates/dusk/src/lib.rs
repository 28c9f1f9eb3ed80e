#![forbid(unsafe_code)]

//! Duskfall public facade crate.
//!
//! Re-exports the stable surface of the theme engine: build a
//! [`ThemeManager`] around your [`SystemColorsProvider`], call
//! [`ThemeManager::initialize`] early and
//! [`ThemeManager::startup_complete`] when your application is up, then
//! pump queued system signals from your event loop.
//!
//! ```
//! use dusk::{
//!     EffectiveTheme, ElementTheme, Rgba, SignalHandle, SystemColorsProvider,
//!     SystemQueryError, ThemeManager, ThemePreference,
//! };
//!
//! // The host supplies the system colors capability.
//! struct StaticColors;
//!
//! impl SystemColorsProvider for StaticColors {
//!     fn system_theme(&self) -> Result<ThemePreference, SystemQueryError> {
//!         Ok(ThemePreference::Light)
//!     }
//!     fn system_accent(&self) -> Result<Rgba, SystemQueryError> {
//!         Ok(dusk::DEFAULT_ACCENT)
//!     }
//!     fn high_contrast(&self) -> Result<bool, SystemQueryError> {
//!         Ok(false)
//!     }
//!     fn subscribe(&mut self, _signals: SignalHandle) {}
//! }
//!
//! # fn main() -> Result<(), dusk::Error> {
//! let mut manager = ThemeManager::new(Box::new(StaticColors));
//! manager.initialize();
//! manager.startup_complete()?;
//!
//! let window = manager.create_element(None)?;
//! manager.set_requested_theme(window, ElementTheme::Dark)?;
//! manager.element_ready(window)?;
//!
//! assert_eq!(manager.actual_theme(window)?, Some(EffectiveTheme::Dark));
//! assert_eq!(
//!     manager.effective_application_theme(),
//!     Some(ThemePreference::Light)
//! );
//! # Ok(())
//! # }
//! ```

use std::fmt;

// --- Color re-exports ------------------------------------------------------

pub use dusk_color::{AccentPalette, ColorParseError, DEFAULT_ACCENT, Rgba};

// --- Tree re-exports -------------------------------------------------------

pub use dusk_tree::{
    CascadeError, EffectiveTheme, ElementError, ElementId, ElementTheme, ElementTree,
    ResourceDictionary, ResourceValue, SharedDictionary, ThemeDictionaryCache,
    ThemeDictionarySet, ThemeKey, ThemePreference, ThemeState, apply_theme_key, find_dictionary,
};

// --- Runtime re-exports ----------------------------------------------------

#[cfg(feature = "test-support")]
pub use dusk_runtime::FakeColorsProvider;
pub use dusk_runtime::{
    DispatchHandle, SignalHandle, SystemColorSnapshot, SystemColorsProvider, SystemQueryError,
    SystemSignal, SystemSignals, ThemeError, ThemeManager, UiDispatcher,
};

// --- Errors ----------------------------------------------------------------

/// Top-level error type for Duskfall applications.
#[derive(Debug)]
pub enum Error {
    /// A color string failed to parse.
    ColorParse(ColorParseError),
    /// A cascade application failed.
    Cascade(CascadeError),
    /// An element id did not resolve.
    Element(ElementError),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ColorParse(err) => write!(f, "{err}"),
            Self::Cascade(err) => write!(f, "{err}"),
            Self::Element(err) => write!(f, "{err}"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::ColorParse(err) => Some(err),
            Self::Cascade(err) => Some(err),
            Self::Element(err) => Some(err),
        }
    }
}

impl From<ColorParseError> for Error {
    fn from(err: ColorParseError) -> Self {
        Self::ColorParse(err)
    }
}

impl From<CascadeError> for Error {
    fn from(err: CascadeError) -> Self {
        Self::Cascade(err)
    }
}

impl From<ElementError> for Error {
    fn from(err: ElementError) -> Self {
        Self::Element(err)
    }
}

impl From<ThemeError> for Error {
    fn from(err: ThemeError) -> Self {
        match err {
            ThemeError::Cascade(err) => Self::Cascade(err),
            ThemeError::Element(err) => Self::Element(err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn theme_error_flattens_into_facade_error() {
        let err: Error = ThemeError::Element(ElementError::NotFound(stale_id())).into();
        assert!(matches!(err, Error::Element(ElementError::NotFound(_))));
    }

    #[test]
    fn display_passes_through() {
        let err = Error::ColorParse(ColorParseError::MissingHash);
        assert_eq!(err.to_string(), "color must start with '#'");
    }

    fn stale_id() -> ElementId {
        let mut tree = ElementTree::new();
        let id = tree.create(None).unwrap();
        tree.remove(id).unwrap();
        id
    }
}
