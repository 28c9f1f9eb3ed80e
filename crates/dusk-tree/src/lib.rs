#![forbid(unsafe_code)]

//! Resource dictionaries, theme cascade, and element tree state for
//! Duskfall.
//!
//! # Role in Duskfall
//! `dusk-tree` is the data plane of the theme engine: it knows how
//! resource scopes nest, how the three theme resource sets swap in and
//! out of a scope, and how effective themes flow down a mutable element
//! tree. It has no opinion about *when* any of that happens; sequencing
//! against system signals and application startup lives in
//! `dusk-runtime`.
//!
//! # This crate provides
//! - [`ResourceDictionary`] / [`SharedDictionary`] for nested, shareable
//!   resource scopes.
//! - [`cascade::apply_theme_key`] for recursive, idempotent theme
//!   dictionary swaps.
//! - [`ElementTree`] with per-element override, effective theme, and
//!   lifecycle state, plus push-based top-down propagation.
//! - The theme vocabulary enums shared across the workspace.

/// Recursive theme-dictionary application over nested scopes.
pub mod cascade;
/// Element identity, flags, and lifecycle state.
pub mod element;
/// Resource dictionaries and shared scope handles.
pub mod resources;
/// Theme vocabulary enums.
pub mod theme;
/// The element tree arena and propagation passes.
pub mod tree;

pub use cascade::{CascadeError, ThemeDictionaryCache, apply_theme_key, find_dictionary};
pub use element::{ElementError, ElementFlags, ElementId, ThemeState};
pub use resources::{ResourceDictionary, ResourceValue, SharedDictionary, ThemeDictionarySet};
pub use theme::{EffectiveTheme, ElementTheme, ThemeKey, ThemePreference};
pub use tree::{ElementTree, ResolveContext, ThemeChange};
