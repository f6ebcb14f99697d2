//! Resolved head state and its string/component emitters.
//!
//! Every slot can always be rendered: `Display` yields the HTML a server
//! inlines into its template (empty string when the aspect is empty), and
//! `to_component()` yields framework-native values (`[]` for tag aspects and
//! an empty map for attribute aspects when nothing was declared).

use crate::attrs::Attributes;
use crate::tags::Aspect;
use html::serialize::{write_attribute_list, write_node};
use html::{Node, SerializeOptions};
use std::fmt;

/// Resolved attributes for `<html>` or `<body>`.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AttributeSlot {
    attributes: Attributes,
    options: SerializeOptions,
}

impl AttributeSlot {
    pub(crate) fn new(attributes: Attributes, options: SerializeOptions) -> Self {
        Self {
            attributes,
            options,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.attributes.is_empty()
    }

    pub fn attributes(&self) -> &Attributes {
        &self.attributes
    }

    pub fn to_component(&self) -> Attributes {
        self.attributes.clone()
    }
}

impl fmt::Display for AttributeSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut out = String::new();
        write_attribute_list(&mut out, self.attributes.as_slice(), self.options);
        f.write_str(&out)
    }
}

/// Resolved elements of one tag aspect.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TagSlot {
    nodes: Vec<Node>,
    options: SerializeOptions,
}

impl TagSlot {
    pub(crate) fn new(nodes: Vec<Node>, options: SerializeOptions) -> Self {
        Self { nodes, options }
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn to_component(&self) -> Vec<Node> {
        self.nodes.clone()
    }
}

impl fmt::Display for TagSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut out = String::new();
        for node in &self.nodes {
            write_node(&mut out, node, self.options);
        }
        f.write_str(&out)
    }
}

/// Borrowed view of any slot, for code that walks all aspects.
#[derive(Clone, Copy, Debug)]
pub enum SlotRef<'a> {
    Attributes(&'a AttributeSlot),
    Tags(&'a TagSlot),
}

impl SlotRef<'_> {
    pub fn is_empty(&self) -> bool {
        match self {
            SlotRef::Attributes(slot) => slot.is_empty(),
            SlotRef::Tags(slot) => slot.is_empty(),
        }
    }
}

impl fmt::Display for SlotRef<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SlotRef::Attributes(slot) => fmt::Display::fmt(slot, f),
            SlotRef::Tags(slot) => fmt::Display::fmt(slot, f),
        }
    }
}

/// The single merged snapshot derived from all mounted contributors.
///
/// `HeadState::default()` is the fallback state returned when nothing has
/// mounted.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct HeadState {
    pub html_attributes: AttributeSlot,
    pub title: TagSlot,
    pub base: TagSlot,
    pub meta: TagSlot,
    pub link: TagSlot,
    pub script: TagSlot,
    pub noscript: TagSlot,
    pub style: TagSlot,
    pub body_attributes: AttributeSlot,
}

impl HeadState {
    pub fn fallback() -> Self {
        Self::default()
    }

    pub fn slot(&self, aspect: Aspect) -> SlotRef<'_> {
        match aspect {
            Aspect::HtmlAttributes => SlotRef::Attributes(&self.html_attributes),
            Aspect::BodyAttributes => SlotRef::Attributes(&self.body_attributes),
            Aspect::Title => SlotRef::Tags(&self.title),
            Aspect::Base => SlotRef::Tags(&self.base),
            Aspect::Meta => SlotRef::Tags(&self.meta),
            Aspect::Link => SlotRef::Tags(&self.link),
            Aspect::Script => SlotRef::Tags(&self.script),
            Aspect::Noscript => SlotRef::Tags(&self.noscript),
            Aspect::Style => SlotRef::Tags(&self.style),
        }
    }

    /// Tag slot of a head-tag aspect; `None` for attribute aspects.
    pub fn tags(&self, aspect: Aspect) -> Option<&TagSlot> {
        match self.slot(aspect) {
            SlotRef::Tags(slot) => Some(slot),
            SlotRef::Attributes(_) => None,
        }
    }

    pub fn is_empty(&self) -> bool {
        Aspect::ALL.iter().all(|a| self.slot(*a).is_empty())
    }

    /// Resolved title text, if any.
    pub fn title_text(&self) -> Option<String> {
        self.title.nodes().first().map(Node::text_content)
    }

    /// All head tags in head order, as one HTML fragment.
    pub fn head_markup(&self) -> String {
        Aspect::HEAD_TAGS
            .iter()
            .map(|a| self.slot(*a).to_string())
            .collect()
    }
}
