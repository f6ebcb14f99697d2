//! Apply resolved head state to a live document as minimal patch batches.
//!
//! The emitter remembers which nodes it placed under `<head>` (per aspect,
//! with their patch keys) and which attribute names it manages on `<html>`
//! and `<body>`. Each emit diffs the new state against that memory and
//! sends one batch: every removal first, then creates and updates.
//!
//! Nodes the emitter did not create are never touched, and neither are
//! attributes it never set.

use crate::state::{HeadState, SlotRef};
use crate::tags::Aspect;
use html::{
    Attribute, ChildDiff, Document, DomDiffError, DomPatch, DomPatchError, KeyedChild, Node,
    PatchKey, diff_children_before,
};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EmitError {
    Diff(DomDiffError),
    Patch(DomPatchError),
}

impl fmt::Display for EmitError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EmitError::Diff(err) => write!(f, "head diff failed: {err}"),
            EmitError::Patch(err) => write!(f, "document rejected head patches: {err}"),
        }
    }
}

impl std::error::Error for EmitError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            EmitError::Diff(err) => Some(err),
            EmitError::Patch(err) => Some(err),
        }
    }
}

impl From<DomDiffError> for EmitError {
    fn from(err: DomDiffError) -> Self {
        EmitError::Diff(err)
    }
}

impl From<DomPatchError> for EmitError {
    fn from(err: DomPatchError) -> Self {
        EmitError::Patch(err)
    }
}

/// What one emit changed in the document.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct HeadChange {
    /// Managed head nodes that were created.
    pub added: Vec<Node>,
    /// Managed head nodes that were removed.
    pub removed: Vec<Node>,
    /// Number of patches in the applied batch.
    pub patches: usize,
}

impl HeadChange {
    pub fn is_empty(&self) -> bool {
        self.patches == 0
    }
}

#[derive(Debug, Default)]
pub struct DomEmitter {
    applied: HashMap<Aspect, Vec<KeyedChild>>,
    managed: HashMap<Aspect, Vec<Arc<str>>>,
    /// Nodes of a rejected batch. Some may have been attached before the
    /// document gave up.
    orphans: Vec<PatchKey>,
}

impl DomEmitter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Recover after a rejected batch: every node this emitter may have
    /// placed under `<head>` that is still there gets removed, and the
    /// next emit recreates the whole state in head order.
    ///
    /// Returns the number of nodes removed.
    pub fn resync<D>(&mut self, document: &mut D) -> Result<usize, EmitError>
    where
        D: Document + ?Sized,
    {
        let mut keys: Vec<PatchKey> = self
            .applied
            .drain()
            .flat_map(|(_, children)| children.into_iter().map(|child| child.key))
            .collect();
        keys.append(&mut self.orphans);
        keys.sort_unstable();
        keys.dedup();

        let Some(head) = document.find_element("head") else {
            return Ok(0);
        };
        let patches: Vec<DomPatch> = keys
            .iter()
            .filter(|key| document.parent(**key) == Some(head))
            .map(|key| DomPatch::RemoveNode { key: *key })
            .collect();
        if !patches.is_empty() {
            if let Err(err) = document.apply(&patches) {
                self.orphans = keys;
                return Err(err.into());
            }
        }
        log::debug!(
            target: "head.dom",
            "resynchronized: removed {} of {} tracked nodes",
            patches.len(),
            keys.len()
        );
        Ok(patches.len())
    }

    /// Nodes currently applied for `aspect`, with their document keys.
    pub fn applied(&self, aspect: Aspect) -> &[KeyedChild] {
        self.applied.get(&aspect).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn emit<D>(&mut self, state: &HeadState, document: &mut D) -> Result<HeadChange, EmitError>
    where
        D: Document + ?Sized,
    {
        let mut removals = Vec::new();
        let mut updates = Vec::new();
        let mut change = HeadChange::default();
        let mut next_applied: Vec<(Aspect, Vec<KeyedChild>)> = Vec::new();
        let mut next_managed: Vec<(Aspect, Vec<Arc<str>>)> = Vec::new();

        match document.find_element("head") {
            Some(head) => {
                // Back to front, so each aspect's run can be anchored on the
                // first node of the runs after it.
                let mut anchor = None;
                for aspect in Aspect::HEAD_TAGS.into_iter().rev() {
                    let prev = self.applied(aspect);
                    let next = state.tags(aspect).map(|slot| slot.nodes()).unwrap_or(&[]);
                    let children = match retext(prev, next, &mut updates) {
                        Some(children) => children,
                        None => {
                            let ChildDiff {
                                removals: removed_patches,
                                inserts,
                                children,
                                added,
                                removed,
                            } = diff_children_before(head, anchor, prev, next, &mut || {
                                document.allocate_key()
                            })?;
                            removals.extend(removed_patches);
                            updates.extend(inserts);
                            change.added.extend(added);
                            change.removed.extend(removed);
                            children
                        }
                    };
                    if let Some(first) = children.first() {
                        anchor = Some(first.key);
                    }
                    next_applied.push((aspect, children));
                }
            }
            None => {
                if Aspect::HEAD_TAGS.iter().any(|a| !state.slot(*a).is_empty()) {
                    log::warn!(target: "head.dom", "document has no <head>; head tags not applied");
                }
            }
        }

        for aspect in [Aspect::HtmlAttributes, Aspect::BodyAttributes] {
            let SlotRef::Attributes(slot) = state.slot(aspect) else {
                continue;
            };
            let Some(key) = document.find_element(aspect.tag_name()) else {
                if !slot.is_empty() {
                    log::warn!(
                        target: "head.dom",
                        "document has no <{}>; {aspect} not applied",
                        aspect.tag_name()
                    );
                }
                continue;
            };
            let previous = self.managed.get(&aspect).map(Vec::as_slice).unwrap_or(&[]);
            let desired = slot.attributes().as_slice();
            let current = document.attributes(key).unwrap_or_default();
            let merged = merge_attributes(&current, previous, desired);
            if merged != current {
                updates.push(DomPatch::SetAttributes {
                    key,
                    attributes: merged,
                });
            }
            next_managed.push((aspect, desired.iter().map(|(n, _)| Arc::clone(n)).collect()));
        }

        change.patches = removals.len() + updates.len();
        if change.patches > 0 {
            removals.append(&mut updates);
            if let Err(err) = document.apply(&removals) {
                self.orphans.extend(
                    next_applied
                        .iter()
                        .flat_map(|(_, children)| children.iter().map(|child| child.key)),
                );
                return Err(err.into());
            }
        }
        self.applied.extend(next_applied);
        self.managed.extend(next_managed);

        log::trace!(
            target: "head.dom",
            "applied {} patches (+{} -{} nodes)",
            change.patches,
            change.added.len(),
            change.removed.len()
        );
        Ok(change)
    }
}

/// A lone element whose only difference is its text keeps its node and gets
/// a `SetText` on the text child.
fn retext(prev: &[KeyedChild], next: &[Node], updates: &mut Vec<DomPatch>) -> Option<Vec<KeyedChild>> {
    let ([old], [new]) = (prev, next) else {
        return None;
    };
    if old.node.name() != new.name() || old.node.attributes() != new.attributes() {
        return None;
    }
    let (
        [Node::Text { id, text: old_text }],
        [Node::Text { text: new_text, .. }],
    ) = (old.node.children(), new.children())
    else {
        return None;
    };
    if old_text == new_text {
        return None;
    }
    updates.push(DomPatch::SetText {
        key: PatchKey::from_id(*id),
        text: new_text.clone(),
    });
    let mut node = old.node.clone();
    if let Some([Node::Text { text, .. }]) = node.children_mut().map(Vec::as_mut_slice) {
        text.clone_from(new_text);
    }
    Some(vec![KeyedChild { key: old.key, node }])
}

/// Keep unmanaged attributes in place, drop previously managed ones and
/// append the desired set.
fn merge_attributes(current: &[Attribute], previous: &[Arc<str>], desired: &[Attribute]) -> Vec<Attribute> {
    let mut merged: Vec<Attribute> = current
        .iter()
        .filter(|(name, _)| {
            !previous.iter().any(|p| p == name) && !desired.iter().any(|(d, _)| d == name)
        })
        .cloned()
        .collect();
    merged.extend(desired.iter().cloned());
    merged
}
