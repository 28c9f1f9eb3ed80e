//! The element tree: an arena of theme-tracked nodes with push-based
//! effective-theme propagation.
//!
//! Nodes are addressed by stable [`ElementId`]s (slot index plus
//! generation); removing an element frees its slot for reuse and
//! invalidates outstanding ids. The tree holds only theme state, never
//! layout or rendering.
//!
//! # Propagation model
//!
//! Effective themes flow top-down in a single pass: an element with a
//! non-`Default` override resolves to its override, everything else
//! inherits the parent's resolved value, and roots fall back to the
//! application theme. [`ElementTree::propagate`] walks the affected
//! subtree, stamps the inherited values, and reports which elements
//! changed so the orchestrator can re-run the cascade for exactly those
//! scopes. Descendants observe the stamped value; nothing polls.

use crate::element::{ElementError, ElementFlags, ElementId, ElementNode, ThemeState};
use crate::resources::SharedDictionary;
use crate::theme::{EffectiveTheme, ElementTheme, ThemeKey, ThemePreference};

/// Ambient state a resolution pass runs against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolveContext {
    /// The application's effective theme.
    pub app_theme: ThemePreference,
    /// Whether the system high-contrast mode is active.
    pub high_contrast: bool,
}

/// One element's outcome from a propagation pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ThemeChange {
    /// The element visited.
    pub id: ElementId,
    /// Its effective theme after the pass.
    pub actual: EffectiveTheme,
    /// True if the effective theme differs from before the pass.
    pub changed: bool,
}

struct Slot {
    generation: u32,
    node: Option<ElementNode>,
}

/// Arena of elements with parent/child links and per-element theme state.
#[derive(Default)]
pub struct ElementTree {
    slots: Vec<Slot>,
    free: Vec<u32>,
    roots: Vec<ElementId>,
    len: usize,
}

impl Default for Slot {
    fn default() -> Self {
        Self {
            generation: 0,
            node: None,
        }
    }
}

impl ElementTree {
    /// Create an empty tree.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live elements.
    #[must_use]
    pub fn len(&self) -> usize {
        self.len
    }

    /// True if no elements are live.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// True if `id` refers to a live element.
    #[must_use]
    pub fn contains(&self, id: ElementId) -> bool {
        self.node(id).is_ok()
    }

    /// The current root elements, in creation order.
    #[must_use]
    pub fn roots(&self) -> &[ElementId] {
        &self.roots
    }

    /// Create an element, optionally attached under `parent`.
    pub fn create(&mut self, parent: Option<ElementId>) -> Result<ElementId, ElementError> {
        if let Some(parent) = parent {
            self.node(parent)?;
        }
        let index = match self.free.pop() {
            Some(index) => index,
            None => {
                self.slots.push(Slot::default());
                (self.slots.len() - 1) as u32
            }
        };
        let slot = &mut self.slots[index as usize];
        let id = ElementId {
            index,
            generation: slot.generation,
        };
        slot.node = Some(ElementNode {
            parent,
            ..ElementNode::default()
        });
        match parent {
            Some(parent) => self.node_mut(parent)?.children.push(id),
            None => self.roots.push(id),
        }
        self.len += 1;
        Ok(id)
    }

    /// Remove an element and its whole subtree.
    pub fn remove(&mut self, id: ElementId) -> Result<(), ElementError> {
        let parent = self.node(id)?.parent;
        match parent {
            Some(parent) => {
                let siblings = &mut self.node_mut(parent)?.children;
                siblings.retain(|&child| child != id);
            }
            None => self.roots.retain(|&root| root != id),
        }
        // Tear down depth-first; ids of removed descendants become stale.
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            let slot = &mut self.slots[current.index as usize];
            if let Some(node) = slot.node.take() {
                slot.generation = slot.generation.wrapping_add(1);
                self.free.push(current.index);
                self.len -= 1;
                stack.extend(node.children);
            }
        }
        Ok(())
    }

    /// Move an element under a new parent (or make it a root).
    ///
    /// Fails with [`ElementError::WouldCycle`] if `new_parent` is the
    /// element itself or one of its descendants. The caller is expected
    /// to re-propagate afterwards; inherited values are not recomputed
    /// here.
    pub fn reparent(
        &mut self,
        id: ElementId,
        new_parent: Option<ElementId>,
    ) -> Result<(), ElementError> {
        self.node(id)?;
        if let Some(new_parent) = new_parent {
            self.node(new_parent)?;
            let mut cursor = Some(new_parent);
            while let Some(current) = cursor {
                if current == id {
                    return Err(ElementError::WouldCycle(id));
                }
                cursor = self.node(current)?.parent;
            }
        }

        let old_parent = self.node(id)?.parent;
        match old_parent {
            Some(parent) => self.node_mut(parent)?.children.retain(|&c| c != id),
            None => self.roots.retain(|&root| root != id),
        }
        match new_parent {
            Some(parent) => self.node_mut(parent)?.children.push(id),
            None => self.roots.push(id),
        }
        self.node_mut(id)?.parent = new_parent;
        Ok(())
    }

    /// The element's parent, if any.
    pub fn parent(&self, id: ElementId) -> Result<Option<ElementId>, ElementError> {
        Ok(self.node(id)?.parent)
    }

    /// The element's children, in attach order.
    pub fn children(&self, id: ElementId) -> Result<&[ElementId], ElementError> {
        Ok(&self.node(id)?.children)
    }

    /// The element's theme override.
    pub fn requested_theme(&self, id: ElementId) -> Result<ElementTheme, ElementError> {
        Ok(self.node(id)?.requested)
    }

    /// Set the element's theme override, returning the previous value.
    pub fn set_requested_theme(
        &mut self,
        id: ElementId,
        theme: ElementTheme,
    ) -> Result<ElementTheme, ElementError> {
        let node = self.node_mut(id)?;
        Ok(std::mem::replace(&mut node.requested, theme))
    }

    /// The element's effective theme, if a propagation pass has stamped
    /// one.
    pub fn actual_theme(&self, id: ElementId) -> Result<Option<EffectiveTheme>, ElementError> {
        Ok(self.node(id)?.actual)
    }

    /// The element's lifecycle state.
    pub fn state(&self, id: ElementId) -> Result<ThemeState, ElementError> {
        Ok(self.node(id)?.state)
    }

    /// Set the element's lifecycle state.
    pub fn set_state(&mut self, id: ElementId, state: ThemeState) -> Result<(), ElementError> {
        self.node_mut(id)?.state = state;
        Ok(())
    }

    /// True if the element has reported readiness.
    pub fn is_ready(&self, id: ElementId) -> Result<bool, ElementError> {
        Ok(self.node(id)?.flags.contains(ElementFlags::READY))
    }

    /// Mark the element ready. Returns true the first time; readiness
    /// never clears.
    pub fn mark_ready(&mut self, id: ElementId) -> Result<bool, ElementError> {
        let node = self.node_mut(id)?;
        let first = !node.flags.contains(ElementFlags::READY);
        node.flags.insert(ElementFlags::READY);
        Ok(first)
    }

    /// True if the element's scope is opted into cascade management.
    pub fn has_theme_resources(&self, id: ElementId) -> Result<bool, ElementError> {
        Ok(self
            .node(id)?
            .flags
            .contains(ElementFlags::HAS_THEME_RESOURCES))
    }

    /// Opt the element's scope in or out of cascade management.
    /// Returns the previous value.
    pub fn set_has_theme_resources(
        &mut self,
        id: ElementId,
        value: bool,
    ) -> Result<bool, ElementError> {
        let node = self.node_mut(id)?;
        let previous = node.flags.contains(ElementFlags::HAS_THEME_RESOURCES);
        node.flags.set(ElementFlags::HAS_THEME_RESOURCES, value);
        Ok(previous)
    }

    /// The element's local resource scope, if it owns one.
    pub fn scope(&self, id: ElementId) -> Result<Option<SharedDictionary>, ElementError> {
        Ok(self.node(id)?.scope.clone())
    }

    /// Attach (or clear) the element's local resource scope.
    pub fn set_scope(
        &mut self,
        id: ElementId,
        scope: Option<SharedDictionary>,
    ) -> Result<(), ElementError> {
        self.node_mut(id)?.scope = scope;
        Ok(())
    }

    /// Resolve the element's effective theme against `ctx` without
    /// mutating anything.
    ///
    /// Precedence: a non-`Default` override wins; otherwise the nearest
    /// ancestor with a stamped effective theme; otherwise the application
    /// theme.
    pub fn resolve_effective(
        &self,
        id: ElementId,
        ctx: &ResolveContext,
    ) -> Result<EffectiveTheme, ElementError> {
        let node = self.node(id)?;
        if let Some(forced) = node.requested.as_effective() {
            return Ok(forced);
        }
        let mut cursor = node.parent;
        while let Some(ancestor) = cursor {
            let ancestor_node = self.node(ancestor)?;
            if let Some(actual) = ancestor_node.actual {
                return Ok(actual);
            }
            cursor = ancestor_node.parent;
        }
        Ok(ctx.app_theme.into())
    }

    /// The resource key the element's scope should carry under `ctx`.
    ///
    /// High contrast takes strict precedence over Light/Dark and does not
    /// consult (or alter) the element's effective theme.
    pub fn effective_key(
        &self,
        id: ElementId,
        ctx: &ResolveContext,
    ) -> Result<ThemeKey, ElementError> {
        if ctx.high_contrast {
            self.node(id)?;
            return Ok(ThemeKey::HighContrast);
        }
        Ok(self.resolve_effective(id, ctx)?.into())
    }

    /// Stamp effective themes top-down from `start` (or from every root
    /// when `None`), reporting each visited element.
    ///
    /// Single pass: each element is visited once, inherits the value its
    /// parent was just stamped with, and pushes its own value to its
    /// children.
    pub fn propagate(
        &mut self,
        start: Option<ElementId>,
        ctx: &ResolveContext,
    ) -> Result<Vec<ThemeChange>, ElementError> {
        let mut stack: Vec<(ElementId, Option<EffectiveTheme>)> = match start {
            Some(id) => {
                let parent = self.node(id)?.parent;
                let inherited = match parent {
                    Some(parent) => self.node(parent)?.actual,
                    None => None,
                };
                vec![(id, inherited)]
            }
            None => self.roots.iter().rev().map(|&id| (id, None)).collect(),
        };

        let mut changes = Vec::new();
        while let Some((id, inherited)) = stack.pop() {
            let node = self.node_mut(id)?;
            let actual = node
                .requested
                .as_effective()
                .or(inherited)
                .unwrap_or_else(|| ctx.app_theme.into());
            let changed = node.actual != Some(actual);
            node.actual = Some(actual);
            changes.push(ThemeChange {
                id,
                actual,
                changed,
            });
            for &child in node.children.iter().rev() {
                stack.push((child, Some(actual)));
            }
        }
        Ok(changes)
    }

    /// The element and every descendant, depth first.
    pub fn collect_subtree(&self, id: ElementId) -> Result<Vec<ElementId>, ElementError> {
        self.node(id)?;
        let mut out = Vec::new();
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            out.push(current);
            stack.extend(self.node(current)?.children.iter().copied());
        }
        Ok(out)
    }

    /// Elements currently in the `Resolved` lifecycle state.
    ///
    /// Used by the orchestrator to force re-application when the
    /// high-contrast signal flips.
    #[must_use]
    pub fn resolved_elements(&self) -> Vec<ElementId> {
        let mut out = Vec::new();
        for (index, slot) in self.slots.iter().enumerate() {
            if let Some(node) = &slot.node {
                if matches!(node.state, ThemeState::Resolved(_)) {
                    out.push(ElementId {
                        index: index as u32,
                        generation: slot.generation,
                    });
                }
            }
        }
        out
    }

    fn node(&self, id: ElementId) -> Result<&ElementNode, ElementError> {
        self.slots
            .get(id.index as usize)
            .filter(|slot| slot.generation == id.generation)
            .and_then(|slot| slot.node.as_ref())
            .ok_or(ElementError::NotFound(id))
    }

    fn node_mut(&mut self, id: ElementId) -> Result<&mut ElementNode, ElementError> {
        self.slots
            .get_mut(id.index as usize)
            .filter(|slot| slot.generation == id.generation)
            .and_then(|slot| slot.node.as_mut())
            .ok_or(ElementError::NotFound(id))
    }
}

impl std::fmt::Debug for ElementTree {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ElementTree")
            .field("len", &self.len)
            .field("roots", &self.roots)
            .finish()
    }
}
