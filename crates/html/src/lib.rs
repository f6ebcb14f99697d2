pub mod dom_diff;
pub mod escape;
pub mod serialize;
pub mod traverse;

mod dom_patch;
mod dom_store;
mod types;

pub use crate::dom_diff::{ChildDiff, DomDiffError, KeyedChild, diff_children, diff_children_before};
pub use crate::dom_patch::{DomPatch, PatchKey};
pub use crate::dom_store::{Detached, Document, DomPatchError, DomStore};
pub use crate::serialize::{SerializeOptions, to_html, to_html_with};
pub use crate::types::{Attribute, Id, Node, NodeId};
