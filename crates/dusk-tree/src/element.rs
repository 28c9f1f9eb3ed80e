//! Per-element identity, flags, and theme lifecycle state.

use std::fmt;

use bitflags::bitflags;

use crate::resources::SharedDictionary;
use crate::theme::{EffectiveTheme, ElementTheme};

/// Stable handle to an element in an [`crate::tree::ElementTree`].
///
/// Slots are reused after removal; the generation counter makes stale
/// handles detectable instead of silently aliasing a new element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ElementId {
    pub(crate) index: u32,
    pub(crate) generation: u32,
}

impl fmt::Display for ElementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "e{}.{}", self.index, self.generation)
    }
}

bitflags! {
    /// Per-element bookkeeping flags.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct ElementFlags: u8 {
        /// The element has reported readiness (fires once, never clears).
        const READY = 0b0001;
        /// The element's local scope is opted into cascade management.
        const HAS_THEME_RESOURCES = 0b0010;
    }
}

/// Theme lifecycle of a single element.
///
/// `Uninitialized` until a theme-related property is first set;
/// `AwaitingReady` while the first application is deferred behind element
/// readiness; `Resolved` after the first resolution. An instance never
/// returns to `AwaitingReady` once resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ThemeState {
    /// No theme-related property has been touched yet.
    #[default]
    Uninitialized,
    /// A theme property was set before the element was ready; the first
    /// application is deferred.
    AwaitingReady,
    /// The element has resolved to an effective theme at least once.
    Resolved(EffectiveTheme),
}

/// Errors from element tree operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ElementError {
    /// The id does not refer to a live element (never existed, removed,
    /// or a stale generation).
    NotFound(ElementId),
    /// The requested reparent would make an element its own ancestor.
    WouldCycle(ElementId),
}

impl fmt::Display for ElementError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFound(id) => write!(f, "element {id} not found"),
            Self::WouldCycle(id) => {
                write!(f, "reparenting {id} would create a cycle")
            }
        }
    }
}

impl std::error::Error for ElementError {}

/// One element's record in the tree.
#[derive(Debug, Default)]
pub(crate) struct ElementNode {
    pub(crate) parent: Option<ElementId>,
    pub(crate) children: Vec<ElementId>,
    pub(crate) requested: ElementTheme,
    pub(crate) actual: Option<EffectiveTheme>,
    pub(crate) flags: ElementFlags,
    pub(crate) state: ThemeState,
    pub(crate) scope: Option<SharedDictionary>,
}
