//! Deterministic keyed diffing of child lists to patch streams.
//!
//! Contract:
//! - Previous children carry the `PatchKey` they were applied with; their
//!   subtree ids mirror the keys of the applied nodes.
//! - Next children are matched in order against the unused previous children
//!   using structural equality (ids ignored). Matching is greedy and monotonic,
//!   so kept nodes never move.
//! - Unmatched previous children are removed. Unmatched next children are
//!   created with their subtree and inserted before the next kept sibling, or
//!   before the run's anchor, or appended to the parent when neither exists.
//! - Removals and inserts are reported separately so callers can batch every
//!   removal ahead of every insert.
//!
//! Complexity: O(n * m) node comparisons in the worst case; head lists are short.

use crate::dom_patch::{DomPatch, PatchKey};
use crate::types::{Id, Node};
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DomDiffError {
    InvalidKey(PatchKey),
    InvalidNode(&'static str),
}

impl fmt::Display for DomDiffError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DomDiffError::InvalidKey(key) => write!(f, "invalid patch key {}", key.0),
            DomDiffError::InvalidNode(reason) => write!(f, "invalid node: {reason}"),
        }
    }
}

impl std::error::Error for DomDiffError {}

/// A child that has been applied to a document under `key`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct KeyedChild {
    pub key: PatchKey,
    pub node: Node,
}

#[derive(Debug, Default)]
pub struct ChildDiff {
    pub removals: Vec<DomPatch>,
    pub inserts: Vec<DomPatch>,
    /// The next child list with the keys it will have once applied.
    pub children: Vec<KeyedChild>,
    pub added: Vec<Node>,
    pub removed: Vec<Node>,
}

impl ChildDiff {
    pub fn is_noop(&self) -> bool {
        self.removals.is_empty() && self.inserts.is_empty()
    }
}

pub fn diff_children(
    parent: PatchKey,
    prev: &[KeyedChild],
    next: &[Node],
    allocate: &mut dyn FnMut() -> PatchKey,
) -> Result<ChildDiff, DomDiffError> {
    diff_children_before(parent, None, prev, next, allocate)
}

/// Like `diff_children`, for a child run that sits before `anchor` inside a
/// larger sibling list: new nodes with no kept sibling after them are
/// inserted before `anchor` instead of appended.
pub fn diff_children_before(
    parent: PatchKey,
    anchor: Option<PatchKey>,
    prev: &[KeyedChild],
    next: &[Node],
    allocate: &mut dyn FnMut() -> PatchKey,
) -> Result<ChildDiff, DomDiffError> {
    check_key(parent)?;
    if let Some(anchor) = anchor {
        check_key(anchor)?;
    }

    let mut matched: Vec<Option<usize>> = vec![None; next.len()];
    let mut cursor = 0;
    for (slot, node) in matched.iter_mut().zip(next) {
        if let Some(offset) = prev[cursor..]
            .iter()
            .position(|p| p.node.same_content(node))
        {
            *slot = Some(cursor + offset);
            cursor += offset + 1;
        }
    }

    let mut diff = ChildDiff::default();

    let mut kept = vec![false; prev.len()];
    for index in matched.iter().flatten() {
        kept[*index] = true;
    }
    for (child, kept) in prev.iter().zip(&kept) {
        if !kept {
            diff.removals.push(DomPatch::RemoveNode {
                key: check_key(child.key)?,
            });
            diff.removed.push(child.node.clone());
        }
    }

    for (i, node) in next.iter().enumerate() {
        if let Some(index) = matched[i] {
            diff.children.push(prev[index].clone());
            continue;
        }
        let before = matched[i + 1..]
            .iter()
            .flatten()
            .next()
            .map(|index| prev[*index].key)
            .or(anchor);
        let mut created = node.clone();
        let key = emit_create_subtree(&mut created, None, allocate, &mut diff.inserts)?;
        match before {
            Some(before) => diff.inserts.push(DomPatch::InsertBefore {
                parent,
                child: key,
                before,
            }),
            None => diff.inserts.push(DomPatch::AppendChild { parent, child: key }),
        }
        diff.added.push(node.clone());
        diff.children.push(KeyedChild { key, node: created });
    }

    Ok(diff)
}

/// Emit create operations for `node` and its subtree, stamping the allocated
/// keys into the node ids. Returns the key of `node`.
pub fn emit_create_subtree(
    node: &mut Node,
    parent_key: Option<PatchKey>,
    allocate: &mut dyn FnMut() -> PatchKey,
    patches: &mut Vec<DomPatch>,
) -> Result<PatchKey, DomDiffError> {
    let key = check_key(allocate())?;
    node.set_id(Id(key.0));
    match node {
        Node::Element {
            name,
            attributes,
            children,
            ..
        } => {
            patches.push(DomPatch::CreateElement {
                key,
                name: name.clone(),
                attributes: attributes.clone(),
            });
            if let Some(parent) = parent_key {
                patches.push(DomPatch::AppendChild { parent, child: key });
            }
            for child in children {
                emit_create_subtree(child, Some(key), allocate, patches)?;
            }
        }
        Node::Text { text, .. } => {
            patches.push(DomPatch::CreateText {
                key,
                text: text.clone(),
            });
            if let Some(parent) = parent_key {
                patches.push(DomPatch::AppendChild { parent, child: key });
            }
        }
        Node::Document { .. } => {
            return Err(DomDiffError::InvalidNode("document cannot be a child"));
        }
    }
    Ok(key)
}

fn check_key(key: PatchKey) -> Result<PatchKey, DomDiffError> {
    if key == PatchKey::INVALID {
        return Err(DomDiffError::InvalidKey(key));
    }
    Ok(key)
}
