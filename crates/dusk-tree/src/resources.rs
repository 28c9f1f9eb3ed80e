//! Resource dictionaries and scopes.
//!
//! A [`ResourceDictionary`] is a named bag of key→value entries plus an
//! ordered list of merged child dictionaries. Lookup checks local entries
//! first, then the merged list back to front, so later merges win —
//! which is why the cascade can pin the live accent dictionary at index 0
//! and let everything merged after it override individual entries.
//!
//! Dictionaries are shared through [`SharedDictionary`] handles
//! (`Rc<RefCell<..>>`): one cached dictionary instance can be merged into
//! many scopes at once, and an in-place mutation (an accent palette
//! refresh, say) is visible to every consumer without re-running any
//! merge.
//!
//! # Invariants
//!
//! 1. The cascade only inserts or replaces merged entries at known
//!    positions; it never reorders caller-owned entries.
//! 2. A dictionary that owns a [`ThemeDictionarySet`] ("theme-bearing")
//!    has at most one of those dictionaries merged at any time, tracked
//!    by its active-theme slot.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use ahash::AHashMap;
use dusk_color::Rgba;

use crate::theme::ThemeKey;

/// A value stored in a resource dictionary.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ResourceValue {
    /// A color (brush) resource.
    Color(Rgba),
    /// A text resource.
    Text(String),
    /// A numeric resource (sizes, opacities).
    Number(f64),
    /// A boolean resource.
    Flag(bool),
}

impl From<Rgba> for ResourceValue {
    fn from(color: Rgba) -> Self {
        Self::Color(color)
    }
}

impl From<&str> for ResourceValue {
    fn from(text: &str) -> Self {
        Self::Text(text.to_owned())
    }
}

impl From<String> for ResourceValue {
    fn from(text: String) -> Self {
        Self::Text(text)
    }
}

impl From<f64> for ResourceValue {
    fn from(number: f64) -> Self {
        Self::Number(number)
    }
}

impl From<bool> for ResourceValue {
    fn from(flag: bool) -> Self {
        Self::Flag(flag)
    }
}

/// The per-scope theme dictionaries a theme-bearing scope switches between.
///
/// Any of the three slots may be absent; asking the cascade for a missing
/// slot is a hard error ([`crate::cascade::CascadeError::DictionaryNotFound`]).
#[derive(Debug, Clone, Default)]
pub struct ThemeDictionarySet {
    light: Option<SharedDictionary>,
    dark: Option<SharedDictionary>,
    high_contrast: Option<SharedDictionary>,
}

impl ThemeDictionarySet {
    /// Create an empty set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the dictionary for `key`.
    pub fn set(&mut self, key: ThemeKey, dictionary: SharedDictionary) {
        match key {
            ThemeKey::Light => self.light = Some(dictionary),
            ThemeKey::Dark => self.dark = Some(dictionary),
            ThemeKey::HighContrast => self.high_contrast = Some(dictionary),
        }
    }

    /// Builder-style [`set`](Self::set).
    #[must_use]
    pub fn with(mut self, key: ThemeKey, dictionary: SharedDictionary) -> Self {
        self.set(key, dictionary);
        self
    }

    /// The dictionary for `key`, if present.
    #[must_use]
    pub fn get(&self, key: ThemeKey) -> Option<&SharedDictionary> {
        match key {
            ThemeKey::Light => self.light.as_ref(),
            ThemeKey::Dark => self.dark.as_ref(),
            ThemeKey::HighContrast => self.high_contrast.as_ref(),
        }
    }

    /// True if no slot is populated.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.light.is_none() && self.dark.is_none() && self.high_contrast.is_none()
    }
}

/// A named bag of resource entries with an ordered merged list.
#[derive(Debug, Default)]
pub struct ResourceDictionary {
    name: Option<String>,
    entries: AHashMap<String, ResourceValue>,
    merged: Vec<SharedDictionary>,
    design_time_only: bool,
    theme_set: Option<ThemeDictionarySet>,
    active_theme: Option<(ThemeKey, SharedDictionary)>,
}

impl ResourceDictionary {
    /// Create an empty, unnamed dictionary.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty dictionary with a name (used by
    /// [`crate::cascade::find_dictionary`]).
    #[must_use]
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::default()
        }
    }

    /// The dictionary's name, if any.
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Mark this dictionary as a design-time placeholder. Placeholders
    /// are stripped from the application scope when startup completes.
    #[must_use]
    pub fn design_time_only(mut self) -> Self {
        self.design_time_only = true;
        self
    }

    /// True if this dictionary is a design-time placeholder.
    #[must_use]
    pub fn is_design_time_only(&self) -> bool {
        self.design_time_only
    }

    /// Insert a local entry, returning the previous value if any.
    pub fn insert(
        &mut self,
        key: impl Into<String>,
        value: impl Into<ResourceValue>,
    ) -> Option<ResourceValue> {
        self.entries.insert(key.into(), value.into())
    }

    /// Remove a local entry.
    pub fn remove(&mut self, key: &str) -> Option<ResourceValue> {
        self.entries.remove(key)
    }

    /// A local entry, ignoring merged dictionaries.
    #[must_use]
    pub fn get_local(&self, key: &str) -> Option<&ResourceValue> {
        self.entries.get(key)
    }

    /// Number of local entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True if there are no local entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Resolve `key` in this scope: local entries first, then merged
    /// dictionaries back to front (later merges win).
    #[must_use]
    pub fn lookup(&self, key: &str) -> Option<ResourceValue> {
        if let Some(value) = self.entries.get(key) {
            return Some(value.clone());
        }
        for child in self.merged.iter().rev() {
            if let Some(value) = child.get(key) {
                return Some(value);
            }
        }
        None
    }

    /// The ordered merged list.
    #[must_use]
    pub fn merged(&self) -> &[SharedDictionary] {
        &self.merged
    }

    /// Append a merged dictionary.
    pub fn push_merged(&mut self, dictionary: SharedDictionary) {
        self.merged.push(dictionary);
    }

    /// Insert a merged dictionary at `index`, shifting later entries.
    ///
    /// Indices past the end append.
    pub fn insert_merged(&mut self, index: usize, dictionary: SharedDictionary) {
        let index = index.min(self.merged.len());
        self.merged.insert(index, dictionary);
    }

    /// Replace the merged entry at `index`, or insert if the list is
    /// shorter.
    ///
    /// Replaces at the *requested* index; entries before and after it are
    /// untouched.
    pub fn insert_or_replace(&mut self, index: usize, dictionary: SharedDictionary) {
        if index < self.merged.len() {
            self.merged[index] = dictionary;
        } else {
            self.merged.push(dictionary);
        }
    }

    /// Remove a merged dictionary by identity. Returns true if found.
    pub fn remove_merged(&mut self, dictionary: &SharedDictionary) -> bool {
        match self.position_of(dictionary) {
            Some(index) => {
                self.merged.remove(index);
                true
            }
            None => false,
        }
    }

    /// Remove every design-time placeholder from this scope's own merged
    /// list (not recursive). Returns the number removed.
    pub fn remove_design_time_placeholders(&mut self) -> usize {
        let before = self.merged.len();
        self.merged.retain(|d| !d.with(|dict| dict.design_time_only));
        before - self.merged.len()
    }

    /// Position of a merged dictionary by identity.
    #[must_use]
    pub fn position_of(&self, dictionary: &SharedDictionary) -> Option<usize> {
        self.merged.iter().position(|d| d.ptr_eq(dictionary))
    }

    /// Attach the per-theme dictionaries, making this scope theme-bearing.
    pub fn set_theme_dictionaries(&mut self, set: ThemeDictionarySet) {
        self.theme_set = Some(set);
    }

    /// The per-theme dictionaries, if this scope is theme-bearing.
    #[must_use]
    pub fn theme_dictionaries(&self) -> Option<&ThemeDictionarySet> {
        self.theme_set.as_ref()
    }

    /// The theme key currently merged into this scope, if any.
    #[must_use]
    pub fn active_theme(&self) -> Option<ThemeKey> {
        self.active_theme.as_ref().map(|(key, _)| *key)
    }

    pub(crate) fn active_slot(&self) -> Option<&(ThemeKey, SharedDictionary)> {
        self.active_theme.as_ref()
    }

    pub(crate) fn set_active_slot(&mut self, key: ThemeKey, dictionary: SharedDictionary) {
        self.active_theme = Some((key, dictionary));
    }
}

/// A shared, interiorly mutable handle to a [`ResourceDictionary`].
///
/// Cloning the handle shares the same dictionary; `ptr_eq` compares
/// identity, which is how the cascade finds the previously merged theme
/// dictionary inside a merged list.
#[derive(Clone)]
pub struct SharedDictionary {
    inner: Rc<RefCell<ResourceDictionary>>,
}

impl SharedDictionary {
    /// Wrap a dictionary in a shared handle.
    #[must_use]
    pub fn new(dictionary: ResourceDictionary) -> Self {
        Self {
            inner: Rc::new(RefCell::new(dictionary)),
        }
    }

    /// Borrow the dictionary immutably for the duration of `f`.
    pub fn with<R>(&self, f: impl FnOnce(&ResourceDictionary) -> R) -> R {
        f(&self.inner.borrow())
    }

    /// Borrow the dictionary mutably for the duration of `f`.
    pub fn with_mut<R>(&self, f: impl FnOnce(&mut ResourceDictionary) -> R) -> R {
        f(&mut self.inner.borrow_mut())
    }

    /// Resolve `key` through this scope (local, then merged).
    #[must_use]
    pub fn get(&self, key: &str) -> Option<ResourceValue> {
        self.with(|dict| dict.lookup(key))
    }

    /// Insert a local entry.
    pub fn insert(
        &self,
        key: impl Into<String>,
        value: impl Into<ResourceValue>,
    ) -> Option<ResourceValue> {
        self.with_mut(|dict| dict.insert(key, value))
    }

    /// True if both handles refer to the same dictionary.
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }
}

impl From<ResourceDictionary> for SharedDictionary {
    fn from(dictionary: ResourceDictionary) -> Self {
        Self::new(dictionary)
    }
}

impl fmt::Debug for SharedDictionary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.inner.try_borrow() {
            Ok(dict) => f
                .debug_struct("SharedDictionary")
                .field("name", &dict.name)
                .field("entries", &dict.entries.len())
                .field("merged", &dict.merged.len())
                .finish(),
            Err(_) => f.debug_struct("SharedDictionary").finish_non_exhaustive(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dict_with(key: &str, value: ResourceValue) -> SharedDictionary {
        let mut dict = ResourceDictionary::new();
        dict.insert(key, value);
        SharedDictionary::new(dict)
    }

    #[test]
    fn local_lookup() {
        let mut dict = ResourceDictionary::new();
        dict.insert("Background", Rgba::BLACK);
        assert_eq!(
            dict.lookup("Background"),
            Some(ResourceValue::Color(Rgba::BLACK))
        );
        assert_eq!(dict.lookup("Missing"), None);
    }

    #[test]
    fn local_entries_shadow_merged() {
        let mut dict = ResourceDictionary::new();
        dict.push_merged(dict_with("Key", ResourceValue::Text("merged".into())));
        dict.insert("Key", "local");
        assert_eq!(dict.lookup("Key"), Some(ResourceValue::Text("local".into())));
    }

    #[test]
    fn later_merged_entries_win() {
        let mut dict = ResourceDictionary::new();
        dict.push_merged(dict_with("Key", ResourceValue::Number(1.0)));
        dict.push_merged(dict_with("Key", ResourceValue::Number(2.0)));
        assert_eq!(dict.lookup("Key"), Some(ResourceValue::Number(2.0)));
    }

    #[test]
    fn merged_lookup_recurses_through_nesting() {
        let inner = dict_with("Deep", ResourceValue::Flag(true));
        let mut middle = ResourceDictionary::new();
        middle.push_merged(inner);
        let mut outer = ResourceDictionary::new();
        outer.push_merged(SharedDictionary::new(middle));
        assert_eq!(outer.lookup("Deep"), Some(ResourceValue::Flag(true)));
    }

    #[test]
    fn insert_or_replace_replaces_at_requested_index() {
        let a = dict_with("k", ResourceValue::Number(0.0));
        let b = dict_with("k", ResourceValue::Number(1.0));
        let c = dict_with("k", ResourceValue::Number(2.0));
        let replacement = dict_with("k", ResourceValue::Number(9.0));

        let mut dict = ResourceDictionary::new();
        dict.push_merged(a.clone());
        dict.push_merged(b);
        dict.push_merged(c.clone());

        dict.insert_or_replace(1, replacement.clone());

        // Index 1 was replaced; 0 and 2 are untouched.
        assert!(dict.merged()[0].ptr_eq(&a));
        assert!(dict.merged()[1].ptr_eq(&replacement));
        assert!(dict.merged()[2].ptr_eq(&c));
        assert_eq!(dict.merged().len(), 3);
    }

    #[test]
    fn insert_or_replace_appends_past_end() {
        let mut dict = ResourceDictionary::new();
        let a = dict_with("k", ResourceValue::Number(0.0));
        dict.insert_or_replace(5, a.clone());
        assert_eq!(dict.merged().len(), 1);
        assert!(dict.merged()[0].ptr_eq(&a));
    }

    #[test]
    fn shared_mutation_is_visible_through_every_holder() {
        let shared = dict_with("Accent", ResourceValue::Color(Rgba::BLACK));
        let mut scope_a = ResourceDictionary::new();
        let mut scope_b = ResourceDictionary::new();
        scope_a.push_merged(shared.clone());
        scope_b.push_merged(shared.clone());

        shared.insert("Accent", Rgba::WHITE);

        assert_eq!(
            scope_a.lookup("Accent"),
            Some(ResourceValue::Color(Rgba::WHITE))
        );
        assert_eq!(
            scope_b.lookup("Accent"),
            Some(ResourceValue::Color(Rgba::WHITE))
        );
    }

    #[test]
    fn remove_merged_by_identity() {
        let a = dict_with("k", ResourceValue::Flag(true));
        let twin = dict_with("k", ResourceValue::Flag(true));
        let mut dict = ResourceDictionary::new();
        dict.push_merged(a.clone());

        // Same contents, different identity: not removed.
        assert!(!dict.remove_merged(&twin));
        assert!(dict.remove_merged(&a));
        assert!(dict.merged().is_empty());
    }

    #[test]
    fn design_time_placeholders_are_stripped() {
        let placeholder =
            SharedDictionary::new(ResourceDictionary::named("DesignTime").design_time_only());
        let live = dict_with("k", ResourceValue::Flag(true));
        let mut dict = ResourceDictionary::new();
        dict.push_merged(placeholder);
        dict.push_merged(live.clone());

        assert_eq!(dict.remove_design_time_placeholders(), 1);
        assert_eq!(dict.merged().len(), 1);
        assert!(dict.merged()[0].ptr_eq(&live));
    }

    #[test]
    fn theme_set_slots() {
        let light = dict_with("bg", ResourceValue::Color(Rgba::WHITE));
        let set = ThemeDictionarySet::new().with(ThemeKey::Light, light.clone());
        assert!(set.get(ThemeKey::Light).unwrap().ptr_eq(&light));
        assert!(set.get(ThemeKey::Dark).is_none());
        assert!(!set.is_empty());
        assert!(ThemeDictionarySet::new().is_empty());
    }
}
