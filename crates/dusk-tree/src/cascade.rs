//! The theme resource cascade.
//!
//! [`apply_theme_key`] walks a resource scope and every scope merged into
//! it, and makes sure each theme-bearing scope has exactly the dictionary
//! for the requested [`ThemeKey`] merged, swapping out whichever theme
//! dictionary was merged before at the same position. Entries the caller
//! owns (application resources, user resources) are never reordered or
//! touched.
//!
//! Re-applying the same key is a no-op for the scope itself; the walk
//! still recurses so that nested scopes merged in since the last pass
//! catch up.
//!
//! Scope graphs must be acyclic. Dictionaries may be shared between
//! scopes (a diamond is fine, the swap is idempotent), but a cycle in the
//! merged lists will not terminate.

use std::fmt;

use ahash::AHashMap;

use crate::resources::{ResourceDictionary, SharedDictionary};
use crate::theme::ThemeKey;

/// Errors from cascade application.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CascadeError {
    /// A theme-bearing scope has no dictionary for the requested key.
    ///
    /// Silently rendering with the wrong resource set is worse than
    /// failing loudly, so this is a hard error for the caller that
    /// requested the application.
    DictionaryNotFound {
        /// Name of the scope, when it has one.
        scope: Option<String>,
        /// The key that could not be satisfied.
        key: ThemeKey,
    },
}

impl fmt::Display for CascadeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DictionaryNotFound { scope, key } => match scope {
                Some(name) => {
                    write!(f, "scope {name:?} has no {key} theme dictionary")
                }
                None => write!(f, "scope has no {key} theme dictionary"),
            },
        }
    }
}

impl std::error::Error for CascadeError {}

/// Merge the `key` theme dictionary into `scope` and every scope merged
/// into it, recursively.
///
/// For each theme-bearing scope the previously merged theme dictionary is
/// replaced in place (same merged-list position); a scope switching for
/// the first time appends at the end of its merged list. Idempotent:
/// applying the same key twice leaves the merged contents identical.
pub fn apply_theme_key(scope: &SharedDictionary, key: ThemeKey) -> Result<(), CascadeError> {
    swap_theme_dictionary(scope, key)?;

    // Recurse after the swap so the newly merged theme dictionary's own
    // nested scopes are updated too. The handle list is collected first;
    // holding a borrow across recursion would trip shared parents.
    let children = scope.with(|dict| dict.merged().to_vec());
    for child in &children {
        apply_theme_key(child, key)?;
    }
    Ok(())
}

fn swap_theme_dictionary(scope: &SharedDictionary, key: ThemeKey) -> Result<(), CascadeError> {
    scope.with_mut(|dict| {
        let Some(set) = dict.theme_dictionaries() else {
            return Ok(());
        };
        if dict.active_theme() == Some(key) {
            return Ok(());
        }
        let Some(target) = set.get(key).cloned() else {
            return Err(CascadeError::DictionaryNotFound {
                scope: dict.name().map(str::to_owned),
                key,
            });
        };

        match dict.active_slot().cloned() {
            Some((_, previous)) => {
                let position = dict
                    .position_of(&previous)
                    .unwrap_or_else(|| dict.merged().len());
                dict.insert_or_replace(position, target.clone());
            }
            None => dict.push_merged(target.clone()),
        }
        dict.set_active_slot(key, target);

        #[cfg(feature = "tracing")]
        tracing::debug!(scope = ?dict.name(), %key, "swapped theme dictionary");

        Ok(())
    })
}

/// Find a dictionary by name in `scope` or anything merged into it,
/// depth first.
#[must_use]
pub fn find_dictionary(scope: &SharedDictionary, name: &str) -> Option<SharedDictionary> {
    if scope.with(|dict| dict.name() == Some(name)) {
        return Some(scope.clone());
    }
    let children = scope.with(|dict| dict.merged().to_vec());
    for child in &children {
        if let Some(found) = find_dictionary(child, name) {
            return Some(found);
        }
    }
    None
}

/// Lazily built, shared default theme dictionaries.
///
/// One instance per orchestrator. Every scope that asks for the default
/// Light dictionary gets the *same* [`SharedDictionary`], so a single
/// accent refresh pass over [`built`](Self::built) updates every consumer
/// at once.
#[derive(Debug, Default)]
pub struct ThemeDictionaryCache {
    slots: AHashMap<ThemeKey, SharedDictionary>,
}

impl ThemeDictionaryCache {
    /// Create an empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The cached dictionary for `key`, building it on first request.
    pub fn get_or_create(
        &mut self,
        key: ThemeKey,
        build: impl FnOnce() -> ResourceDictionary,
    ) -> SharedDictionary {
        self.slots
            .entry(key)
            .or_insert_with(|| SharedDictionary::new(build()))
            .clone()
    }

    /// The cached dictionary for `key`, if already built.
    #[must_use]
    pub fn get(&self, key: ThemeKey) -> Option<&SharedDictionary> {
        self.slots.get(&key)
    }

    /// Every dictionary built so far, in no particular order.
    ///
    /// This is the accent fan-out surface: palette refreshes update each
    /// of these exactly once.
    #[must_use]
    pub fn built(&self) -> Vec<SharedDictionary> {
        self.slots.values().cloned().collect()
    }

    /// Number of dictionaries built so far.
    #[must_use]
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// True if nothing has been built yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resources::{ResourceValue, ThemeDictionarySet};
    use dusk_color::Rgba;

    fn named_dict(name: &str, key: &str, value: ResourceValue) -> SharedDictionary {
        let mut dict = ResourceDictionary::named(name);
        dict.insert(key, value);
        SharedDictionary::new(dict)
    }

    fn theme_bearing_scope() -> SharedDictionary {
        let light = named_dict("Light", "Background", ResourceValue::Color(Rgba::WHITE));
        let dark = named_dict("Dark", "Background", ResourceValue::Color(Rgba::BLACK));
        let mut scope = ResourceDictionary::new();
        scope.set_theme_dictionaries(
            ThemeDictionarySet::new()
                .with(ThemeKey::Light, light)
                .with(ThemeKey::Dark, dark),
        );
        SharedDictionary::new(scope)
    }

    #[test]
    fn applies_requested_dictionary() {
        let scope = theme_bearing_scope();
        apply_theme_key(&scope, ThemeKey::Dark).unwrap();
        assert_eq!(
            scope.get("Background"),
            Some(ResourceValue::Color(Rgba::BLACK))
        );
        assert_eq!(scope.with(|d| d.active_theme()), Some(ThemeKey::Dark));
    }

    #[test]
    fn swap_replaces_in_place() {
        let scope = theme_bearing_scope();
        // Surround the theme slot with caller-owned entries.
        let before = named_dict("user-low", "k", ResourceValue::Number(1.0));
        scope.with_mut(|d| d.push_merged(before.clone()));
        apply_theme_key(&scope, ThemeKey::Light).unwrap();
        let after = named_dict("user-high", "k", ResourceValue::Number(2.0));
        scope.with_mut(|d| d.push_merged(after.clone()));

        apply_theme_key(&scope, ThemeKey::Dark).unwrap();

        scope.with(|d| {
            assert_eq!(d.merged().len(), 3);
            assert!(d.merged()[0].ptr_eq(&before));
            assert!(d.merged()[2].ptr_eq(&after));
            assert_eq!(d.merged()[1].with(|t| t.name().map(str::to_owned)),
                Some("Dark".to_owned()));
        });
    }

    #[test]
    fn reapplying_same_key_is_a_no_op() {
        let scope = theme_bearing_scope();
        apply_theme_key(&scope, ThemeKey::Dark).unwrap();
        let merged_len = scope.with(|d| d.merged().len());
        let background = scope.get("Background");

        apply_theme_key(&scope, ThemeKey::Dark).unwrap();

        assert_eq!(scope.with(|d| d.merged().len()), merged_len);
        assert_eq!(scope.get("Background"), background);
    }

    #[test]
    fn recurses_into_nested_scopes() {
        let outer = theme_bearing_scope();
        let inner = theme_bearing_scope();
        outer.with_mut(|d| d.push_merged(inner.clone()));

        apply_theme_key(&outer, ThemeKey::Dark).unwrap();

        assert_eq!(inner.with(|d| d.active_theme()), Some(ThemeKey::Dark));
        assert_eq!(
            inner.get("Background"),
            Some(ResourceValue::Color(Rgba::BLACK))
        );
    }

    #[test]
    fn missing_dictionary_is_a_hard_error() {
        let light = named_dict("Light", "Background", ResourceValue::Color(Rgba::WHITE));
        let mut dict = ResourceDictionary::named("Window");
        dict.set_theme_dictionaries(ThemeDictionarySet::new().with(ThemeKey::Light, light));
        let scope = SharedDictionary::new(dict);

        let err = apply_theme_key(&scope, ThemeKey::HighContrast).unwrap_err();
        assert_eq!(
            err,
            CascadeError::DictionaryNotFound {
                scope: Some("Window".to_owned()),
                key: ThemeKey::HighContrast,
            }
        );
    }

    #[test]
    fn non_theme_bearing_scope_passes_through() {
        let inner = theme_bearing_scope();
        let mut plain = ResourceDictionary::new();
        plain.push_merged(inner.clone());
        let scope = SharedDictionary::new(plain);

        apply_theme_key(&scope, ThemeKey::Light).unwrap();

        assert_eq!(inner.with(|d| d.active_theme()), Some(ThemeKey::Light));
        assert_eq!(scope.with(|d| d.active_theme()), None);
    }

    #[test]
    fn find_dictionary_searches_depth_first() {
        let target = named_dict("AccentColors", "Accent", ResourceValue::Color(Rgba::WHITE));
        let mut middle = ResourceDictionary::new();
        middle.push_merged(target.clone());
        let mut root = ResourceDictionary::new();
        root.push_merged(SharedDictionary::new(middle));
        let scope = SharedDictionary::new(root);

        let found = find_dictionary(&scope, "AccentColors").unwrap();
        assert!(found.ptr_eq(&target));
        assert!(find_dictionary(&scope, "Nope").is_none());
    }

    #[test]
    fn cache_returns_shared_instances() {
        let mut cache = ThemeDictionaryCache::new();
        let first = cache.get_or_create(ThemeKey::Light, ResourceDictionary::new);
        let second = cache.get_or_create(ThemeKey::Light, || {
            panic!("already built; builder must not run again")
        });
        assert!(first.ptr_eq(&second));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn cache_built_lists_every_slot() {
        let mut cache = ThemeDictionaryCache::new();
        cache.get_or_create(ThemeKey::Light, ResourceDictionary::new);
        cache.get_or_create(ThemeKey::Dark, ResourceDictionary::new);
        assert_eq!(cache.built().len(), 2);
        assert!(cache.get(ThemeKey::HighContrast).is_none());
    }

    #[test]
    fn shared_theme_dictionary_updates_both_scopes_after_one_mutation() {
        // Two scopes share one cached Dark dictionary; refreshing an
        // accent entry in the shared instance is visible to both without
        // re-running the cascade.
        let mut cache = ThemeDictionaryCache::new();
        let dark = cache.get_or_create(ThemeKey::Dark, || {
            let mut d = ResourceDictionary::named("Dark");
            d.insert("Accent", Rgba::BLACK);
            d
        });

        let make_scope = |shared: &SharedDictionary| {
            let mut scope = ResourceDictionary::new();
            scope.set_theme_dictionaries(
                ThemeDictionarySet::new().with(ThemeKey::Dark, shared.clone()),
            );
            SharedDictionary::new(scope)
        };
        let scope_a = make_scope(&dark);
        let scope_b = make_scope(&dark);
        apply_theme_key(&scope_a, ThemeKey::Dark).unwrap();
        apply_theme_key(&scope_b, ThemeKey::Dark).unwrap();

        dark.insert("Accent", Rgba::WHITE);

        assert_eq!(scope_a.get("Accent"), Some(ResourceValue::Color(Rgba::WHITE)));
        assert_eq!(scope_b.get("Accent"), Some(ResourceValue::Color(Rgba::WHITE)));
    }
}
