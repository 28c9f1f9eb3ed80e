//! The system colors provider boundary.
//!
//! [`SystemColorsProvider`] is the capability the host supplies: cheap
//! synchronous getters for the system theme preference, accent color, and
//! high-contrast flag, plus change signals raised through a
//! [`SignalHandle`] from whatever thread the OS calls back on.
//!
//! [`SystemSignals`] wraps the provider for the engine. Queries that fail
//! degrade to the built-in defaults (Light theme, default accent, high
//! contrast off) with a warning; no error ever escapes this boundary. The
//! last snapshot is kept in an [`ArcSwap`] so any thread can read the
//! current system colors without touching the provider.

use std::fmt;
use std::sync::Arc;

use arc_swap::ArcSwap;
use dusk_color::{DEFAULT_ACCENT, Rgba};
use dusk_tree::ThemePreference;

use crate::dispatcher::DispatchHandle;

/// A change notification from the system colors provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SystemSignal {
    /// The system light/dark preference changed.
    BackgroundChanged,
    /// The system accent color changed.
    AccentChanged,
    /// The high-contrast flag flipped.
    HighContrastChanged,
}

/// A system query could not be answered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SystemQueryError {
    /// The backing store (registry, settings service) is unavailable.
    Unavailable(&'static str),
}

impl fmt::Display for SystemQueryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unavailable(what) => write!(f, "system query unavailable: {what}"),
        }
    }
}

impl std::error::Error for SystemQueryError {}

/// Raises change signals onto the UI thread's queue.
///
/// Clone freely; `raise` is safe from any thread and never blocks.
#[derive(Clone)]
pub struct SignalHandle {
    inner: DispatchHandle<SystemSignal>,
}

impl SignalHandle {
    pub(crate) fn new(inner: DispatchHandle<SystemSignal>) -> Self {
        Self { inner }
    }

    /// Post a change signal. Fire and forget.
    pub fn raise(&self, signal: SystemSignal) {
        self.inner.post(signal);
    }
}

impl fmt::Debug for SignalHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SignalHandle").finish_non_exhaustive()
    }
}

/// The host-supplied system colors capability.
///
/// Getters must be side-effect-free and cheap enough to poll; they run on
/// the UI thread. Change callbacks wired up in [`subscribe`](Self::subscribe)
/// may fire on any thread and may fire redundantly; the engine recomputes
/// idempotently.
pub trait SystemColorsProvider {
    /// The system light/dark preference.
    fn system_theme(&self) -> Result<ThemePreference, SystemQueryError>;

    /// The system accent color.
    fn system_accent(&self) -> Result<Rgba, SystemQueryError>;

    /// Whether high-contrast mode is active.
    fn high_contrast(&self) -> Result<bool, SystemQueryError>;

    /// Wire OS change callbacks to `signals`. Called once during theme
    /// manager initialization.
    fn subscribe(&mut self, signals: SignalHandle);
}

/// One coherent read of the system colors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SystemColorSnapshot {
    /// The system light/dark preference.
    pub theme: ThemePreference,
    /// The system accent color.
    pub accent: Rgba,
    /// Whether high-contrast mode is active.
    pub high_contrast: bool,
}

impl Default for SystemColorSnapshot {
    fn default() -> Self {
        Self {
            theme: ThemePreference::Light,
            accent: DEFAULT_ACCENT,
            high_contrast: false,
        }
    }
}

/// The engine-facing wrapper around a [`SystemColorsProvider`].
pub struct SystemSignals {
    provider: Box<dyn SystemColorsProvider>,
    snapshot: Arc<ArcSwap<SystemColorSnapshot>>,
}

impl SystemSignals {
    /// Wrap a provider. The cached snapshot starts at the defaults until
    /// the first [`refresh`](Self::refresh).
    #[must_use]
    pub fn new(provider: Box<dyn SystemColorsProvider>) -> Self {
        Self {
            provider,
            snapshot: Arc::new(ArcSwap::from_pointee(SystemColorSnapshot::default())),
        }
    }

    /// Forward to the provider's subscribe hook.
    pub fn subscribe(&mut self, signals: SignalHandle) {
        self.provider.subscribe(signals);
    }

    /// Query the provider and cache the result.
    ///
    /// Each failing query degrades to its default value; nothing
    /// propagates.
    pub fn refresh(&self) -> SystemColorSnapshot {
        let defaults = SystemColorSnapshot::default();
        let theme = self.provider.system_theme().unwrap_or_else(|err| {
            tracing::warn!(%err, "system theme query failed, using Light");
            defaults.theme
        });
        let accent = self.provider.system_accent().unwrap_or_else(|err| {
            tracing::warn!(%err, "system accent query failed, using default accent");
            defaults.accent
        });
        let high_contrast = self.provider.high_contrast().unwrap_or_else(|err| {
            tracing::warn!(%err, "high contrast query failed, assuming off");
            defaults.high_contrast
        });
        let snapshot = SystemColorSnapshot {
            theme,
            accent,
            high_contrast,
        };
        self.snapshot.store(Arc::new(snapshot));
        snapshot
    }

    /// The last cached snapshot, without querying the provider.
    #[must_use]
    pub fn snapshot(&self) -> SystemColorSnapshot {
        **self.snapshot.load()
    }

    /// A handle other threads can use to read the cached snapshot.
    #[must_use]
    pub fn share(&self) -> Arc<ArcSwap<SystemColorSnapshot>> {
        Arc::clone(&self.snapshot)
    }
}

impl fmt::Debug for SystemSignals {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SystemSignals")
            .field("snapshot", &self.snapshot())
            .finish_non_exhaustive()
    }
}

#[cfg(any(test, feature = "test-support"))]
mod fake {
    use super::*;
    use std::sync::Mutex;

    #[derive(Debug)]
    struct FakeState {
        theme: ThemePreference,
        accent: Rgba,
        high_contrast: bool,
        fail_queries: bool,
        signals: Option<SignalHandle>,
    }

    /// A settable in-memory provider for tests.
    ///
    /// Cloning shares state, so a test can keep one handle while the
    /// theme manager owns the other. Setters raise the matching change
    /// signal when the provider has been subscribed.
    #[derive(Clone)]
    pub struct FakeColorsProvider {
        state: Arc<Mutex<FakeState>>,
    }

    impl FakeColorsProvider {
        /// Light theme, default accent, high contrast off.
        #[must_use]
        pub fn new() -> Self {
            Self {
                state: Arc::new(Mutex::new(FakeState {
                    theme: ThemePreference::Light,
                    accent: DEFAULT_ACCENT,
                    high_contrast: false,
                    fail_queries: false,
                    signals: None,
                })),
            }
        }

        fn with_state<R>(&self, f: impl FnOnce(&mut FakeState) -> R) -> R {
            let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
            f(&mut state)
        }

        /// Change the system theme and raise `BackgroundChanged`.
        pub fn set_system_theme(&self, theme: ThemePreference) {
            let signals = self.with_state(|s| {
                s.theme = theme;
                s.signals.clone()
            });
            if let Some(signals) = signals {
                signals.raise(SystemSignal::BackgroundChanged);
            }
        }

        /// Change the system accent and raise `AccentChanged`.
        pub fn set_system_accent(&self, accent: Rgba) {
            let signals = self.with_state(|s| {
                s.accent = accent;
                s.signals.clone()
            });
            if let Some(signals) = signals {
                signals.raise(SystemSignal::AccentChanged);
            }
        }

        /// Flip high contrast and raise `HighContrastChanged`.
        pub fn set_high_contrast(&self, active: bool) {
            let signals = self.with_state(|s| {
                s.high_contrast = active;
                s.signals.clone()
            });
            if let Some(signals) = signals {
                signals.raise(SystemSignal::HighContrastChanged);
            }
        }

        /// Make every query fail until called again with `false`.
        pub fn fail_queries(&self, fail: bool) {
            self.with_state(|s| s.fail_queries = fail);
        }
    }

    impl Default for FakeColorsProvider {
        fn default() -> Self {
            Self::new()
        }
    }

    impl SystemColorsProvider for FakeColorsProvider {
        fn system_theme(&self) -> Result<ThemePreference, SystemQueryError> {
            self.with_state(|s| {
                if s.fail_queries {
                    Err(SystemQueryError::Unavailable("fake theme"))
                } else {
                    Ok(s.theme)
                }
            })
        }

        fn system_accent(&self) -> Result<Rgba, SystemQueryError> {
            self.with_state(|s| {
                if s.fail_queries {
                    Err(SystemQueryError::Unavailable("fake accent"))
                } else {
                    Ok(s.accent)
                }
            })
        }

        fn high_contrast(&self) -> Result<bool, SystemQueryError> {
            self.with_state(|s| {
                if s.fail_queries {
                    Err(SystemQueryError::Unavailable("fake high contrast"))
                } else {
                    Ok(s.high_contrast)
                }
            })
        }

        fn subscribe(&mut self, signals: SignalHandle) {
            self.with_state(|s| s.signals = Some(signals));
        }
    }
}

#[cfg(any(test, feature = "test-support"))]
pub use fake::FakeColorsProvider;
