//! Arena-backed document that applies `DomPatch` batches.
//!
//! `Document` is the capability head emitters consume: element lookup,
//! attribute reads, key allocation and ordered patch application.
//! `DomStore` is the in-process implementation used for client emulation
//! and tests.

use crate::dom_patch::{DomPatch, PatchKey};
use crate::types::{Attribute, Id, Node};
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::Arc;

pub trait Document {
    /// Key of the first element named `name` in document order.
    fn find_element(&self, name: &str) -> Option<PatchKey>;
    fn attributes(&self, key: PatchKey) -> Option<Vec<Attribute>>;
    /// Parent of a live, attached node.
    fn parent(&self, key: PatchKey) -> Option<PatchKey>;
    /// A key that has never been used in this document.
    fn allocate_key(&mut self) -> PatchKey;
    fn apply(&mut self, patches: &[DomPatch]) -> Result<(), DomPatchError>;
}

/// A document that has nothing to mutate. Used by capture-only managers.
#[derive(Clone, Copy, Debug, Default)]
pub struct Detached;

impl Document for Detached {
    fn find_element(&self, _name: &str) -> Option<PatchKey> {
        None
    }

    fn attributes(&self, _key: PatchKey) -> Option<Vec<Attribute>> {
        None
    }

    fn parent(&self, _key: PatchKey) -> Option<PatchKey> {
        None
    }

    fn allocate_key(&mut self) -> PatchKey {
        PatchKey::INVALID
    }

    fn apply(&mut self, patches: &[DomPatch]) -> Result<(), DomPatchError> {
        match patches.first() {
            Some(_) => Err(DomPatchError::MissingRoot),
            None => Ok(()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DomPatchError {
    InvalidKey(PatchKey),
    DuplicateKey(PatchKey),
    MissingKey(PatchKey),
    WrongNodeKind(PatchKey),
    InvalidParent(PatchKey),
    InvalidSibling { parent: PatchKey, before: PatchKey },
    CycleDetected { parent: PatchKey, child: PatchKey },
    MissingRoot,
}

impl fmt::Display for DomPatchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DomPatchError::InvalidKey(key) => write!(f, "invalid key {}", key.0),
            DomPatchError::DuplicateKey(key) => write!(f, "duplicate key {}", key.0),
            DomPatchError::MissingKey(key) => write!(f, "missing key {}", key.0),
            DomPatchError::WrongNodeKind(key) => write!(f, "wrong node kind for key {}", key.0),
            DomPatchError::InvalidParent(key) => write!(f, "invalid parent for key {}", key.0),
            DomPatchError::InvalidSibling { parent, before } => write!(
                f,
                "key {} is not a child of {}",
                before.0, parent.0
            ),
            DomPatchError::CycleDetected { parent, child } => write!(
                f,
                "appending {} to {} would create a cycle",
                child.0, parent.0
            ),
            DomPatchError::MissingRoot => f.write_str("document has no root"),
        }
    }
}

impl std::error::Error for DomPatchError {}

pub struct DomStore {
    arena: DomArena,
    root: Option<PatchKey>,
    next_key: u32,
    version: u64,
}

impl DomStore {
    /// An empty `<html><head></head><body></body></html>` document.
    pub fn new() -> Self {
        let skeleton = Node::Document {
            id: Id::INVALID,
            doctype: Some("html".to_string()),
            children: vec![Node::element(
                "html",
                Vec::new(),
                vec![
                    Node::element("head", Vec::new(), Vec::new()),
                    Node::element("body", Vec::new(), Vec::new()),
                ],
            )],
        };
        Self::from_node(&skeleton)
    }

    /// Load an existing tree. Nodes keep their ids as keys when valid and
    /// unique; every other node gets a fresh key.
    pub fn from_node(root: &Node) -> Self {
        let mut store = Self {
            arena: DomArena::new(),
            root: None,
            next_key: 1,
            version: 0,
        };
        store.next_key = max_id(root).saturating_add(1).max(1);
        let key = store.load(root, None);
        store.root = Some(key);
        store
    }

    fn load(&mut self, node: &Node, parent: Option<PatchKey>) -> PatchKey {
        let id = node.id();
        let key = if id == Id::INVALID || self.arena.allocated.contains(&PatchKey(id.0)) {
            self.allocate_key()
        } else {
            PatchKey(id.0)
        };
        let kind = match node {
            Node::Document { doctype, .. } => NodeKind::Document {
                doctype: doctype.clone(),
            },
            Node::Element {
                name, attributes, ..
            } => NodeKind::Element {
                name: Arc::clone(name),
                attributes: attributes.clone(),
            },
            Node::Text { text, .. } => NodeKind::Text { text: text.clone() },
        };
        self.arena.push_record(key, kind, parent);
        for child in node.children() {
            let child_key = self.load(child, Some(key));
            self.arena.push_child(key, child_key);
        }
        key
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn materialize(&self) -> Result<Node, DomPatchError> {
        let Some(root) = self.root else {
            return Err(DomPatchError::MissingRoot);
        };
        self.arena.materialize(root)
    }

    pub fn materialize_key(&self, key: PatchKey) -> Result<Node, DomPatchError> {
        self.arena.materialize(key)
    }

    fn apply_one(&mut self, patch: &DomPatch) -> Result<(), DomPatchError> {
        match patch {
            DomPatch::CreateElement {
                key,
                name,
                attributes,
            } => {
                ensure_key(*key)?;
                self.arena.insert_node(
                    *key,
                    NodeKind::Element {
                        name: Arc::clone(name),
                        attributes: attributes.clone(),
                    },
                )?;
            }
            DomPatch::CreateText { key, text } => {
                ensure_key(*key)?;
                self.arena
                    .insert_node(*key, NodeKind::Text { text: text.clone() })?;
            }
            DomPatch::AppendChild { parent, child } => {
                self.arena.append_child(*parent, *child)?;
            }
            DomPatch::InsertBefore {
                parent,
                child,
                before,
            } => {
                self.arena.insert_before(*parent, *child, *before)?;
            }
            DomPatch::RemoveNode { key } => {
                self.arena.index(*key)?;
                if self.root == Some(*key) {
                    self.root = None;
                }
                self.arena.remove_subtree(*key)?;
            }
            DomPatch::SetAttributes { key, attributes } => {
                self.arena.set_attributes(*key, attributes)?;
            }
            DomPatch::SetText { key, text } => {
                self.arena.set_text(*key, text)?;
            }
        }
        Ok(())
    }
}

impl Default for DomStore {
    fn default() -> Self {
        Self::new()
    }
}

impl Document for DomStore {
    fn find_element(&self, name: &str) -> Option<PatchKey> {
        let root = self.root?;
        let mut stack = vec![root];
        while let Some(key) = stack.pop() {
            let index = self.arena.index(key).ok()?;
            let record = &self.arena.nodes[index];
            if let NodeKind::Element { name: n, .. } = &record.kind {
                if n.eq_ignore_ascii_case(name) {
                    return Some(key);
                }
            }
            stack.extend(record.children.iter().rev().copied());
        }
        None
    }

    fn attributes(&self, key: PatchKey) -> Option<Vec<Attribute>> {
        let index = self.arena.index(key).ok()?;
        match &self.arena.nodes[index].kind {
            NodeKind::Element { attributes, .. } => Some(attributes.clone()),
            _ => None,
        }
    }

    fn parent(&self, key: PatchKey) -> Option<PatchKey> {
        let index = self.arena.index(key).ok()?;
        self.arena.nodes[index].parent
    }

    fn allocate_key(&mut self) -> PatchKey {
        let key = PatchKey(self.next_key);
        self.next_key = self.next_key.wrapping_add(1).max(1);
        key
    }

    fn apply(&mut self, patches: &[DomPatch]) -> Result<(), DomPatchError> {
        for patch in patches {
            if let Err(err) = self.apply_one(patch) {
                log::trace!(target: "html.dom_store", "rejected {patch:?}: {err}");
                return Err(err);
            }
        }
        self.version += 1;
        log::trace!(
            target: "html.dom_store",
            "applied {} patches (version {})",
            patches.len(),
            self.version
        );
        Ok(())
    }
}

fn ensure_key(key: PatchKey) -> Result<(), DomPatchError> {
    if key == PatchKey::INVALID {
        debug_assert!(false, "patch key must be non-zero");
        return Err(DomPatchError::InvalidKey(key));
    }
    Ok(())
}

fn max_id(node: &Node) -> u32 {
    node.children()
        .iter()
        .map(max_id)
        .fold(node.id().0, u32::max)
}

struct DomArena {
    nodes: Vec<NodeRecord>,
    live: HashMap<PatchKey, usize>,
    allocated: HashSet<PatchKey>,
}

impl DomArena {
    fn new() -> Self {
        Self {
            nodes: Vec::new(),
            live: HashMap::new(),
            allocated: HashSet::new(),
        }
    }

    fn index(&self, key: PatchKey) -> Result<usize, DomPatchError> {
        if key == PatchKey::INVALID {
            return Err(DomPatchError::InvalidKey(key));
        }
        self.live
            .get(&key)
            .copied()
            .ok_or(DomPatchError::MissingKey(key))
    }

    fn push_record(&mut self, key: PatchKey, kind: NodeKind, parent: Option<PatchKey>) {
        let index = self.nodes.len();
        self.nodes.push(NodeRecord {
            kind,
            parent,
            children: Vec::new(),
        });
        self.allocated.insert(key);
        self.live.insert(key, index);
    }

    fn push_child(&mut self, parent: PatchKey, child: PatchKey) {
        if let Some(&index) = self.live.get(&parent) {
            self.nodes[index].children.push(child);
        }
    }

    fn insert_node(&mut self, key: PatchKey, kind: NodeKind) -> Result<(), DomPatchError> {
        if self.allocated.contains(&key) {
            debug_assert!(false, "duplicate node key");
            return Err(DomPatchError::DuplicateKey(key));
        }
        self.push_record(key, kind, None);
        Ok(())
    }

    fn check_attach(&self, parent: PatchKey, child: PatchKey) -> Result<(usize, usize), DomPatchError> {
        let parent_index = self.index(parent)?;
        let child_index = self.index(child)?;
        if parent == child || self.is_descendant(child, parent) {
            debug_assert!(false, "cannot create cycle");
            return Err(DomPatchError::CycleDetected { parent, child });
        }
        if !self.nodes[parent_index].allows_children() {
            debug_assert!(false, "parent node cannot have children");
            return Err(DomPatchError::InvalidParent(parent));
        }
        if self.nodes[child_index].parent.is_some() {
            debug_assert!(false, "child already has a parent");
            return Err(DomPatchError::InvalidParent(child));
        }
        Ok((parent_index, child_index))
    }

    fn append_child(&mut self, parent: PatchKey, child: PatchKey) -> Result<(), DomPatchError> {
        let (parent_index, child_index) = self.check_attach(parent, child)?;
        self.nodes[parent_index].children.push(child);
        self.nodes[child_index].parent = Some(parent);
        Ok(())
    }

    fn insert_before(
        &mut self,
        parent: PatchKey,
        child: PatchKey,
        before: PatchKey,
    ) -> Result<(), DomPatchError> {
        let (parent_index, child_index) = self.check_attach(parent, child)?;
        let before_index = self.index(before)?;
        if self.nodes[before_index].parent != Some(parent) {
            debug_assert!(false, "before is not a child of parent");
            return Err(DomPatchError::InvalidSibling { parent, before });
        }
        let siblings = &mut self.nodes[parent_index].children;
        let pos = siblings
            .iter()
            .position(|k| *k == before)
            .ok_or(DomPatchError::InvalidSibling { parent, before })?;
        siblings.insert(pos, child);
        self.nodes[child_index].parent = Some(parent);
        Ok(())
    }

    fn remove_subtree(&mut self, key: PatchKey) -> Result<(), DomPatchError> {
        let index = self.index(key)?;
        if let Some(parent) = self.nodes[index].parent.take() {
            if let Some(parent_index) = self.live.get(&parent).copied() {
                self.nodes[parent_index].children.retain(|k| *k != key);
            }
        }
        let children = std::mem::take(&mut self.nodes[index].children);
        self.live.remove(&key);
        for child in children {
            if self.live.contains_key(&child) {
                self.remove_subtree(child)?;
            }
        }
        Ok(())
    }

    fn set_attributes(&mut self, key: PatchKey, attributes: &[Attribute]) -> Result<(), DomPatchError> {
        let index = self.index(key)?;
        match &mut self.nodes[index].kind {
            NodeKind::Element {
                attributes: attrs, ..
            } => {
                attrs.clear();
                attrs.extend(attributes.iter().cloned());
                Ok(())
            }
            _ => Err(DomPatchError::WrongNodeKind(key)),
        }
    }

    fn set_text(&mut self, key: PatchKey, text: &str) -> Result<(), DomPatchError> {
        let index = self.index(key)?;
        match &mut self.nodes[index].kind {
            NodeKind::Text { text: existing } => {
                existing.clear();
                existing.push_str(text);
                Ok(())
            }
            _ => Err(DomPatchError::WrongNodeKind(key)),
        }
    }

    fn is_descendant(&self, ancestor: PatchKey, maybe_descendant: PatchKey) -> bool {
        let Some(&index) = self.live.get(&ancestor) else {
            return false;
        };
        let mut stack = Vec::new();
        stack.extend(self.nodes[index].children.iter().copied());
        while let Some(current) = stack.pop() {
            if current == maybe_descendant {
                return true;
            }
            if let Some(&child_index) = self.live.get(&current) {
                stack.extend(self.nodes[child_index].children.iter().copied());
            }
        }
        false
    }

    fn materialize(&self, key: PatchKey) -> Result<Node, DomPatchError> {
        let index = self.index(key)?;
        let children = self.nodes[index]
            .children
            .iter()
            .map(|child| self.materialize(*child))
            .collect::<Result<Vec<_>, _>>()?;
        let id = key.to_id();
        let node = match &self.nodes[index].kind {
            NodeKind::Document { doctype } => Node::Document {
                id,
                doctype: doctype.clone(),
                children,
            },
            NodeKind::Element { name, attributes } => Node::Element {
                id,
                name: Arc::clone(name),
                attributes: attributes.clone(),
                children,
            },
            NodeKind::Text { text } => Node::Text {
                id,
                text: text.clone(),
            },
        };
        Ok(node)
    }
}

struct NodeRecord {
    kind: NodeKind,
    parent: Option<PatchKey>,
    children: Vec<PatchKey>,
}

impl NodeRecord {
    fn allows_children(&self) -> bool {
        matches!(self.kind, NodeKind::Document { .. } | NodeKind::Element { .. })
    }
}

enum NodeKind {
    Document {
        doctype: Option<String>,
    },
    Element {
        name: Arc<str>,
        attributes: Vec<Attribute>,
    },
    Text {
        text: String,
    },
}
