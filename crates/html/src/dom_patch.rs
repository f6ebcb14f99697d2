//! Incremental DOM patch protocol.
//!
//! This module defines the patch operations emitted by head emitters and
//! applied by a `Document` implementation.
//!
//! Invariants:
//! - Patches are applied in order.
//! - References must point to existing keys at the time they are used (except
//!   the `key` in create operations).
//! - Child ordering is explicit and deterministic.
//! - Element and attribute names are expected to be canonical ASCII-lowercase.
//! - All `PatchKey` values used in patches must be non-zero (`PatchKey::INVALID`
//!   is never valid in a patch stream).
//! - Attribute order and duplicates are preserved; appliers must not dedupe.
//! - Operations must not create cycles; a node may have at most one parent.

use crate::types::{Attribute, Id};
use std::sync::Arc;

/// Opaque patch-layer key for stable node identity within a document.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PatchKey(pub u32);

impl PatchKey {
    /// Reserved sentinel for "unassigned/invalid" identity.
    pub const INVALID: PatchKey = PatchKey(0);

    /// Keys and ids share one numbering space.
    pub fn from_id(id: Id) -> Self {
        PatchKey(id.0)
    }

    pub fn to_id(self) -> Id {
        Id(self.0)
    }
}

/// Incremental DOM patch operation.
#[non_exhaustive]
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DomPatch {
    /// Create an element node with initial attributes.
    CreateElement {
        key: PatchKey,
        name: Arc<str>,
        attributes: Vec<Attribute>,
    },
    /// Create a text node.
    CreateText { key: PatchKey, text: String },
    /// Append a child to the end of a parent's children list.
    AppendChild { parent: PatchKey, child: PatchKey },
    /// Insert a child before an existing sibling.
    InsertBefore {
        parent: PatchKey,
        child: PatchKey,
        before: PatchKey,
    },
    /// Remove a node and its entire subtree from the document.
    ///
    /// After removal, keys in the subtree are invalid for the remainder of the
    /// patch stream.
    RemoveNode { key: PatchKey },
    /// Replace all attributes on an element node.
    ///
    /// Applying this to a non-element node is a deterministic error.
    SetAttributes {
        key: PatchKey,
        attributes: Vec<Attribute>,
    },
    /// Replace the text content of a text node.
    ///
    /// Applying this to a non-text node is a deterministic error.
    SetText { key: PatchKey, text: String },
}

impl DomPatch {
    pub fn is_removal(&self) -> bool {
        matches!(self, DomPatch::RemoveNode { .. })
    }
}
