//! The theme manager orchestrator.
//!
//! One [`ThemeManager`] instance owns the whole theming state for a
//! process: the application theme/accent settings, the system signal
//! source, the element tree, and the cached default theme dictionaries.
//! It is constructed explicitly and passed by reference wherever it is
//! needed; there is no ambient singleton.
//!
//! # Lifecycle
//!
//! Construction is cheap and inert. [`initialize`](ThemeManager::initialize)
//! wires the provider's change callbacks to the UI queue.
//! [`startup_complete`](ThemeManager::startup_complete) is observed exactly
//! once and performs the first real work: it strips design-time
//! placeholder dictionaries from the application scope, pins the live
//! accent dictionary at merged index 0 (so later entries can still
//! override individual colors), and runs one combined accent + theme
//! pass. Nothing touches resources before that point; theme properties
//! set earlier are queued per element and flushed afterwards.
//!
//! # Signal flow
//!
//! OS change notifications arrive on the queue and are handled by
//! [`pump`](ThemeManager::pump) on the owner thread. Each signal's full
//! cascade (palette recompute, dictionary fan-out, tree re-resolution,
//! per-scope swaps) completes before the next signal is looked at.
//! Recomputation is idempotent, so redundant or coalesced signals
//! converge to the same state.

use std::fmt;

use ahash::AHashMap;
use bitflags::bitflags;
use dusk_color::{AccentPalette, DEFAULT_ACCENT, Rgba};
use dusk_tree::cascade::{CascadeError, ThemeDictionaryCache, apply_theme_key};
use dusk_tree::element::{ElementError, ElementId, ThemeState};
use dusk_tree::resources::{ResourceDictionary, SharedDictionary, ThemeDictionarySet};
use dusk_tree::theme::{EffectiveTheme, ElementTheme, ThemeKey, ThemePreference};
use dusk_tree::tree::{ElementTree, ResolveContext};

use crate::dispatcher::UiDispatcher;
use crate::signals::{SignalHandle, SystemColorsProvider, SystemSignal, SystemSignals};

/// Errors surfaced by theme manager operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ThemeError {
    /// A cascade application failed.
    Cascade(CascadeError),
    /// An element id did not resolve.
    Element(ElementError),
}

impl fmt::Display for ThemeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Cascade(err) => write!(f, "{err}"),
            Self::Element(err) => write!(f, "{err}"),
        }
    }
}

impl std::error::Error for ThemeError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Cascade(err) => Some(err),
            Self::Element(err) => Some(err),
        }
    }
}

impl From<CascadeError> for ThemeError {
    fn from(err: CascadeError) -> Self {
        Self::Cascade(err)
    }
}

impl From<ElementError> for ThemeError {
    fn from(err: ElementError) -> Self {
        Self::Element(err)
    }
}

bitflags! {
    /// Work deferred until an element reports readiness.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    struct PendingOps: u8 {
        /// Re-resolve the requested theme for the element's subtree.
        const APPLY_REQUESTED = 0b01;
        /// Re-merge the element scope's theme dictionary.
        const UPDATE_RESOURCES = 0b10;
    }
}

/// Process-wide theme orchestrator. See the module docs for lifecycle.
pub struct ThemeManager {
    signals: SystemSignals,
    queue: UiDispatcher<SystemSignal>,
    tree: ElementTree,
    cache: ThemeDictionaryCache,
    app_scope: SharedDictionary,
    accent_dictionary: SharedDictionary,
    application_theme: Option<ThemePreference>,
    accent_color: Option<Rgba>,
    actual_app_theme: Option<ThemePreference>,
    actual_accent: Option<Rgba>,
    palette: Option<AccentPalette>,
    pending: AHashMap<ElementId, PendingOps>,
    initialized: bool,
    started: bool,
}

impl ThemeManager {
    /// Create an inert manager around a system colors provider.
    ///
    /// No listeners are wired and no resources are touched until
    /// [`initialize`](Self::initialize) and
    /// [`startup_complete`](Self::startup_complete).
    #[must_use]
    pub fn new(provider: Box<dyn SystemColorsProvider>) -> Self {
        Self {
            signals: SystemSignals::new(provider),
            queue: UiDispatcher::new(),
            tree: ElementTree::new(),
            cache: ThemeDictionaryCache::new(),
            app_scope: SharedDictionary::new(ResourceDictionary::named("Application")),
            accent_dictionary: SharedDictionary::new(ResourceDictionary::named("AccentColors")),
            application_theme: None,
            accent_color: None,
            actual_app_theme: None,
            actual_accent: None,
            palette: None,
            pending: AHashMap::new(),
            initialized: false,
            started: false,
        }
    }

    // -----------------------------------------------------------------
    // Lifecycle
    // -----------------------------------------------------------------

    /// Wire the provider's change callbacks to the UI queue. Idempotent.
    pub fn initialize(&mut self) {
        if self.initialized {
            return;
        }
        let handle = SignalHandle::new(self.queue.handle());
        self.signals.subscribe(handle);
        self.initialized = true;
        tracing::debug!("theme manager initialized");
    }

    /// Observe the application's startup-completed signal.
    ///
    /// The first call activates the manager: design-time placeholders are
    /// stripped from the application scope, the live accent dictionary is
    /// pinned at merged index 0, and one combined accent + theme pass
    /// runs. Later calls are no-ops.
    pub fn startup_complete(&mut self) -> Result<(), ThemeError> {
        if self.started {
            tracing::warn!("startup_complete observed more than once, ignoring");
            return Ok(());
        }
        debug_assert!(self.initialized, "startup_complete before initialize");
        self.started = true;

        let default_set = self.default_theme_dictionaries();
        self.app_scope.with_mut(|dict| {
            let removed = dict.remove_design_time_placeholders();
            if removed > 0 {
                tracing::debug!(removed, "stripped design-time placeholder dictionaries");
            }
            dict.insert_merged(0, self.accent_dictionary.clone());
            dict.set_theme_dictionaries(default_set);
        });

        self.signals.refresh();
        self.update_actual_accent()?;
        self.update_actual_application_theme()?;

        // The theme pass above only runs when the effective value
        // changed; run one unconditional full pass so elements queued
        // before startup get their first application either way.
        self.resolve_subtree(None, false)?;
        tracing::debug!("theme manager active");
        Ok(())
    }

    /// True once [`startup_complete`](Self::startup_complete) has fired.
    #[must_use]
    pub fn is_started(&self) -> bool {
        self.started
    }

    /// Process queued system signals on the owner thread.
    ///
    /// Each signal's cascade completes before the next one is handled.
    pub fn pump(&mut self) -> Result<(), ThemeError> {
        for signal in self.queue.drain() {
            tracing::trace!(?signal, "handling system signal");
            match signal {
                SystemSignal::BackgroundChanged => {
                    if self.follows_system_theme() {
                        self.signals.refresh();
                        self.update_actual_application_theme()?;
                    }
                }
                SystemSignal::AccentChanged => {
                    if self.follows_system_accent() {
                        self.signals.refresh();
                        self.update_actual_accent()?;
                    }
                }
                SystemSignal::HighContrastChanged => {
                    self.signals.refresh();
                    if self.started {
                        // Re-key the application scope, then force
                        // re-application for every resolved element
                        // regardless of override. Stored effective
                        // themes stay as they are.
                        self.apply_application_theme()?;
                        let ctx = self.resolve_context();
                        for id in self.tree.resolved_elements() {
                            self.apply_element_resources(id, &ctx)?;
                        }
                    }
                }
            }
        }
        Ok(())
    }

    // -----------------------------------------------------------------
    // Application-level settings
    // -----------------------------------------------------------------

    /// Set the application theme preference. `None` follows the system.
    ///
    /// Takes effect immediately once started; before startup the value is
    /// only recorded.
    pub fn set_application_theme(
        &mut self,
        preference: Option<ThemePreference>,
    ) -> Result<(), ThemeError> {
        if self.application_theme == preference {
            return Ok(());
        }
        self.application_theme = preference;
        self.update_actual_application_theme()
    }

    /// Set the accent color. `None` follows the system accent.
    pub fn set_accent_color(&mut self, accent: Option<Rgba>) -> Result<(), ThemeError> {
        if self.accent_color == accent {
            return Ok(());
        }
        self.accent_color = accent;
        self.update_actual_accent()
    }

    /// The application's effective theme. `None` before startup; callers
    /// must not rely on it earlier.
    #[must_use]
    pub fn effective_application_theme(&self) -> Option<ThemePreference> {
        self.actual_app_theme
    }

    /// The palette derived from the effective accent. `None` before
    /// startup.
    #[must_use]
    pub fn accent_palette(&self) -> Option<&AccentPalette> {
        self.palette.as_ref()
    }

    /// The application resource scope (holds the accent dictionary at
    /// merged index 0 once started).
    #[must_use]
    pub fn app_scope(&self) -> &SharedDictionary {
        &self.app_scope
    }

    /// The shared default theme dictionaries, building missing ones.
    ///
    /// Every caller receives the same instances, so accent refreshes
    /// reach all consumers in one pass.
    pub fn default_theme_dictionaries(&mut self) -> ThemeDictionarySet {
        let mut set = ThemeDictionarySet::new();
        for key in [ThemeKey::Light, ThemeKey::Dark, ThemeKey::HighContrast] {
            let dict = self.cache.get_or_create(key, || build_default_dictionary(key));
            set.set(key, dict);
        }
        set
    }

    // -----------------------------------------------------------------
    // Element surface
    // -----------------------------------------------------------------

    /// Create an element, optionally under `parent`.
    pub fn create_element(
        &mut self,
        parent: Option<ElementId>,
    ) -> Result<ElementId, ThemeError> {
        let id = self.tree.create(parent)?;
        if self.started {
            // Stamp the inherited effective theme right away; resource
            // application still waits for readiness.
            self.resolve_subtree(Some(id), false)?;
        }
        Ok(id)
    }

    /// Remove an element and its subtree, dropping any deferred work.
    pub fn remove_element(&mut self, id: ElementId) -> Result<(), ThemeError> {
        for stale in self.tree.collect_subtree(id)? {
            self.pending.remove(&stale);
        }
        self.tree.remove(id)?;
        Ok(())
    }

    /// Move an element under a new parent and re-resolve its subtree.
    pub fn reparent_element(
        &mut self,
        id: ElementId,
        new_parent: Option<ElementId>,
    ) -> Result<(), ThemeError> {
        self.tree.reparent(id, new_parent)?;
        if self.started {
            self.resolve_subtree(Some(id), false)?;
        }
        Ok(())
    }

    /// The element's theme override.
    pub fn requested_theme(&self, id: ElementId) -> Result<ElementTheme, ThemeError> {
        Ok(self.tree.requested_theme(id)?)
    }

    /// Set the element's theme override.
    ///
    /// Resolves immediately when the element is ready and the application
    /// has started; otherwise the work is queued until readiness.
    pub fn set_requested_theme(
        &mut self,
        id: ElementId,
        theme: ElementTheme,
    ) -> Result<(), ThemeError> {
        let previous = self.tree.set_requested_theme(id, theme)?;
        if previous == theme {
            return Ok(());
        }
        self.note_theme_property_touched(id)?;
        if self.started && self.tree.is_ready(id)? {
            self.resolve_subtree(Some(id), false)
        } else {
            self.pending.entry(id).or_default().insert(PendingOps::APPLY_REQUESTED);
            Ok(())
        }
    }

    /// The element's effective theme, if stamped.
    pub fn actual_theme(&self, id: ElementId) -> Result<Option<EffectiveTheme>, ThemeError> {
        Ok(self.tree.actual_theme(id)?)
    }

    /// The element's lifecycle state.
    pub fn element_state(&self, id: ElementId) -> Result<ThemeState, ThemeError> {
        Ok(self.tree.state(id)?)
    }

    /// The element's local resource scope.
    pub fn element_scope(&self, id: ElementId) -> Result<Option<SharedDictionary>, ThemeError> {
        Ok(self.tree.scope(id)?)
    }

    /// Attach a caller-built resource scope to the element.
    pub fn set_element_scope(
        &mut self,
        id: ElementId,
        scope: SharedDictionary,
    ) -> Result<(), ThemeError> {
        self.tree.set_scope(id, Some(scope))?;
        Ok(())
    }

    /// Opt the element's scope into cascade management.
    ///
    /// An element without a scope gets one bearing the shared default
    /// theme dictionaries. Turning the flag off leaves the scope in place
    /// but stops managing it and drops any deferred resource update.
    pub fn set_has_theme_resources(
        &mut self,
        id: ElementId,
        value: bool,
    ) -> Result<(), ThemeError> {
        let previous = self.tree.set_has_theme_resources(id, value)?;
        if previous == value {
            return Ok(());
        }
        if !value {
            if let Some(mut ops) = self.pending.remove(&id) {
                ops.remove(PendingOps::UPDATE_RESOURCES);
                if !ops.is_empty() {
                    self.pending.insert(id, ops);
                }
            }
            return Ok(());
        }

        if self.tree.scope(id)?.is_none() {
            let set = self.default_theme_dictionaries();
            let mut dict = ResourceDictionary::new();
            dict.set_theme_dictionaries(set);
            self.tree.set_scope(id, Some(SharedDictionary::new(dict)))?;
        }
        self.note_theme_property_touched(id)?;
        if self.started && self.tree.is_ready(id)? {
            // Force: the effective theme may be unchanged, but the scope
            // has never carried a theme dictionary.
            self.resolve_subtree(Some(id), true)
        } else {
            self.pending.entry(id).or_default().insert(PendingOps::UPDATE_RESOURCES);
            Ok(())
        }
    }

    /// Observe the element's one-shot readiness notification.
    ///
    /// The first call flushes the element's deferred work (once the
    /// application has started). Later calls are no-ops.
    pub fn element_ready(&mut self, id: ElementId) -> Result<(), ThemeError> {
        let first = self.tree.mark_ready(id)?;
        if !first || !self.started {
            return Ok(());
        }
        let ops = self.pending.remove(&id).unwrap_or_default();
        self.resolve_subtree(Some(id), ops.contains(PendingOps::UPDATE_RESOURCES))
    }

    // -----------------------------------------------------------------
    // Internal recomputation
    // -----------------------------------------------------------------

    fn follows_system_theme(&self) -> bool {
        self.application_theme.is_none()
    }

    fn follows_system_accent(&self) -> bool {
        self.accent_color.is_none()
    }

    fn resolve_context(&self) -> ResolveContext {
        debug_assert!(
            self.actual_app_theme.is_some(),
            "resolution before the application theme is defined"
        );
        ResolveContext {
            app_theme: self.actual_app_theme.unwrap_or_default(),
            high_contrast: self.signals.snapshot().high_contrast,
        }
    }

    fn update_actual_application_theme(&mut self) -> Result<(), ThemeError> {
        if !self.started {
            return Ok(());
        }
        let theme = match self.application_theme {
            Some(preference) => preference,
            None => self.signals.refresh().theme,
        };
        if self.actual_app_theme == Some(theme) {
            return Ok(());
        }
        self.actual_app_theme = Some(theme);
        tracing::debug!(?theme, "effective application theme changed");
        self.apply_application_theme()
    }

    fn apply_application_theme(&mut self) -> Result<(), ThemeError> {
        if !self.started {
            return Ok(());
        }
        let Some(app_theme) = self.actual_app_theme else {
            return Ok(());
        };
        let key = if self.signals.snapshot().high_contrast {
            ThemeKey::HighContrast
        } else {
            app_theme.into()
        };
        apply_theme_key(&self.app_scope, key)?;
        self.resolve_subtree(None, false)
    }

    fn update_actual_accent(&mut self) -> Result<(), ThemeError> {
        if !self.started {
            return Ok(());
        }
        let accent = match self.accent_color {
            Some(color) => color,
            None => self.signals.refresh().accent,
        };
        if self.actual_accent == Some(accent) {
            return Ok(());
        }
        self.actual_accent = Some(accent);
        self.apply_accent();
        Ok(())
    }

    /// Regenerate the palette and fan it out: one write into the live
    /// accent dictionary and each cached theme dictionary. Shared
    /// instances make the update visible to every merged scope without
    /// re-running any cascade.
    fn apply_accent(&mut self) {
        let palette = AccentPalette::derive(self.actual_accent.unwrap_or(DEFAULT_ACCENT));
        for (name, color) in palette.entries() {
            self.accent_dictionary.insert(name, color);
        }
        for dictionary in self.cache.built() {
            for (name, color) in palette.entries() {
                dictionary.insert(name, color);
            }
        }
        tracing::debug!(
            accent = %palette.base,
            dictionaries = self.cache.len(),
            "accent palette refreshed"
        );
        self.palette = Some(palette);
    }

    /// Stamp effective themes for a subtree (or the whole tree) and
    /// re-run the cascade for every ready element whose key may have
    /// changed.
    fn resolve_subtree(
        &mut self,
        start: Option<ElementId>,
        force: bool,
    ) -> Result<(), ThemeError> {
        debug_assert!(self.started, "resolution before startup");
        let ctx = self.resolve_context();
        let changes = self.tree.propagate(start, &ctx)?;
        for change in changes {
            if !self.tree.is_ready(change.id)? {
                continue;
            }
            let first_resolution =
                !matches!(self.tree.state(change.id)?, ThemeState::Resolved(_));
            if change.changed || force || first_resolution {
                self.apply_element_resources(change.id, &ctx)?;
            }
            if self.is_theme_involved(change.id)? {
                self.tree
                    .set_state(change.id, ThemeState::Resolved(change.actual))?;
                self.pending.remove(&change.id);
            }
        }
        Ok(())
    }

    fn apply_element_resources(
        &mut self,
        id: ElementId,
        ctx: &ResolveContext,
    ) -> Result<(), ThemeError> {
        if !self.tree.has_theme_resources(id)? {
            return Ok(());
        }
        let Some(scope) = self.tree.scope(id)? else {
            return Ok(());
        };
        let key = self.tree.effective_key(id, ctx)?;
        apply_theme_key(&scope, key)?;
        Ok(())
    }

    /// An element enters the theme lifecycle the first time a
    /// theme-related property is touched.
    fn note_theme_property_touched(&mut self, id: ElementId) -> Result<(), ThemeError> {
        if self.tree.state(id)? == ThemeState::Uninitialized {
            self.tree.set_state(id, ThemeState::AwaitingReady)?;
        }
        Ok(())
    }

    fn is_theme_involved(&self, id: ElementId) -> Result<bool, ThemeError> {
        Ok(self.tree.requested_theme(id)? != ElementTheme::Default
            || self.tree.has_theme_resources(id)?
            || self.tree.state(id)? != ThemeState::Uninitialized)
    }
}

impl fmt::Debug for ThemeManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ThemeManager")
            .field("initialized", &self.initialized)
            .field("started", &self.started)
            .field("application_theme", &self.application_theme)
            .field("actual_app_theme", &self.actual_app_theme)
            .field("accent_color", &self.accent_color)
            .field("elements", &self.tree.len())
            .finish_non_exhaustive()
    }
}

/// Baseline entries for a default theme dictionary. Accent shades are
/// fanned in by [`ThemeManager::set_accent_color`] and the startup pass.
fn build_default_dictionary(key: ThemeKey) -> ResourceDictionary {
    let mut dict = ResourceDictionary::named(key.as_str());
    match key {
        ThemeKey::Light => {
            dict.insert("Background", Rgba::rgb(0xF3, 0xF3, 0xF3));
            dict.insert("Foreground", Rgba::rgb(0x1A, 0x1A, 0x1A));
        }
        ThemeKey::Dark => {
            dict.insert("Background", Rgba::rgb(0x20, 0x20, 0x20));
            dict.insert("Foreground", Rgba::rgb(0xF3, 0xF3, 0xF3));
        }
        ThemeKey::HighContrast => {
            dict.insert("Background", Rgba::BLACK);
            dict.insert("Foreground", Rgba::WHITE);
        }
    }
    dict
}
