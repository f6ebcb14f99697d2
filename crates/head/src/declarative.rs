//! Declarative contributor API: head tags written as child elements instead
//! of prop fields.
//!
//! ```
//! use head::{AttrValue, Element, PropBag};
//!
//! let props = PropBag::from_children(&[
//!     Element::new("title").text("Home"),
//!     Element::new("script").attr("src", "foo.js").attr("async", AttrValue::Undefined),
//! ])
//! .unwrap();
//! assert_eq!(props.title.as_deref(), Some("Home"));
//! assert_eq!(props.script.len(), 1);
//! ```

use crate::attrs::{AttrList, AttrValue};
use crate::props::PropBag;
use crate::tags::{Aspect, TagDescriptor};
use std::fmt;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Child {
    Text(String),
    Element(Element),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Element {
    name: String,
    attributes: AttrList,
    children: Vec<Child>,
}

impl Element {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.trim().to_ascii_lowercase(),
            attributes: AttrList::new(),
            children: Vec::new(),
        }
    }

    pub fn attr(mut self, name: &str, value: impl Into<AttrValue>) -> Self {
        self.attributes.set(name, value);
        self
    }

    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.children.push(Child::Text(text.into()));
        self
    }

    pub fn child(mut self, child: Element) -> Self {
        self.children.push(Child::Element(child));
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn attributes(&self) -> &AttrList {
        &self.attributes
    }

    pub fn children(&self) -> &[Child] {
        &self.children
    }

    /// Concatenated text children. Fails on the first element child.
    fn text_content(&self) -> Result<Option<String>, ChildError> {
        let mut out: Option<String> = None;
        for child in &self.children {
            match child {
                Child::Text(text) => out.get_or_insert_with(String::new).push_str(text),
                Child::Element(el) => {
                    return Err(ChildError::NestedChildren {
                        tag: self.name.clone(),
                        child: el.name.clone(),
                    });
                }
            }
        }
        Ok(out)
    }

    fn expect_no_children(&self) -> Result<(), ChildError> {
        if self.children.is_empty() {
            Ok(())
        } else {
            Err(ChildError::UnexpectedContent {
                tag: self.name.clone(),
            })
        }
    }

    fn to_descriptor(&self, aspect: Aspect) -> Result<TagDescriptor, ChildError> {
        let content = if aspect.accepts_content() {
            self.text_content()?
        } else {
            self.expect_no_children()?;
            None
        };
        Ok(TagDescriptor {
            attributes: self.attributes.clone(),
            content,
        })
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ChildError {
    UnsupportedTag(String),
    /// An element child inside a tag that only accepts text.
    NestedChildren { tag: String, child: String },
    /// Content inside a void tag or an attribute-only tag.
    UnexpectedContent { tag: String },
}

impl fmt::Display for ChildError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChildError::UnsupportedTag(tag) => write!(
                f,
                "<{tag}> is not a valid head child; expected one of title, base, meta, link, \
                 script, noscript, style, html, body"
            ),
            ChildError::NestedChildren { tag, child } => {
                write!(f, "<{tag}> only accepts text children, found <{child}>")
            }
            ChildError::UnexpectedContent { tag } => {
                write!(f, "<{tag}> does not accept children")
            }
        }
    }
}

impl std::error::Error for ChildError {}

impl PropBag {
    /// Build a prop bag from declarative child elements, in declaration order.
    ///
    /// Later `title`/`base` children replace earlier ones; `html`/`body`
    /// children merge their attributes.
    pub fn from_children(children: &[Element]) -> Result<PropBag, ChildError> {
        let mut props = PropBag::new();
        for child in children {
            match child.name.as_str() {
                "title" => {
                    props.title = Some(child.text_content()?.unwrap_or_default());
                    if !child.attributes.is_empty() {
                        props.title_attributes = Some(child.attributes.clone());
                    }
                }
                "base" => props.base = Some(child.to_descriptor(Aspect::Base)?),
                "html" | "body" => {
                    child.expect_no_children()?;
                    let target = if child.name == "html" {
                        &mut props.html_attributes
                    } else {
                        &mut props.body_attributes
                    };
                    let merged = target.get_or_insert_with(AttrList::new);
                    for (name, value) in child.attributes.iter() {
                        merged.set(name, value.clone());
                    }
                }
                name => {
                    let aspect = Aspect::LISTS
                        .into_iter()
                        .find(|a| a.tag_name() == name)
                        .ok_or_else(|| ChildError::UnsupportedTag(name.to_string()))?;
                    let descriptor = child.to_descriptor(aspect)?;
                    if let Some(tags) = props.tags_mut(aspect) {
                        tags.push(descriptor);
                    }
                }
            }
        }
        Ok(props)
    }
}
