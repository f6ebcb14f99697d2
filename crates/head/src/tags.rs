use crate::attrs::{AttrList, AttrValue};
use html::{Attribute, Node};
use std::fmt;

/// One category of head content with its own merge rule.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Aspect {
    HtmlAttributes,
    Title,
    Base,
    Meta,
    Link,
    Script,
    Noscript,
    Style,
    BodyAttributes,
}

impl Aspect {
    pub const ALL: [Aspect; 9] = [
        Aspect::HtmlAttributes,
        Aspect::Title,
        Aspect::Base,
        Aspect::Meta,
        Aspect::Link,
        Aspect::Script,
        Aspect::Noscript,
        Aspect::Style,
        Aspect::BodyAttributes,
    ];

    /// Aspects whose contributions are concatenated across contributors.
    pub const LISTS: [Aspect; 5] = [
        Aspect::Meta,
        Aspect::Link,
        Aspect::Script,
        Aspect::Noscript,
        Aspect::Style,
    ];

    /// Aspects emitted as elements inside `<head>`, in head order.
    pub const HEAD_TAGS: [Aspect; 7] = [
        Aspect::Title,
        Aspect::Base,
        Aspect::Meta,
        Aspect::Link,
        Aspect::Script,
        Aspect::Noscript,
        Aspect::Style,
    ];

    pub const fn label(self) -> &'static str {
        match self {
            Self::HtmlAttributes => "htmlAttributes",
            Self::Title => "title",
            Self::Base => "base",
            Self::Meta => "meta",
            Self::Link => "link",
            Self::Script => "script",
            Self::Noscript => "noscript",
            Self::Style => "style",
            Self::BodyAttributes => "bodyAttributes",
        }
    }

    /// Element the aspect renders as, or the element it decorates for
    /// attribute aspects.
    pub const fn tag_name(self) -> &'static str {
        match self {
            Self::HtmlAttributes => "html",
            Self::Title => "title",
            Self::Base => "base",
            Self::Meta => "meta",
            Self::Link => "link",
            Self::Script => "script",
            Self::Noscript => "noscript",
            Self::Style => "style",
            Self::BodyAttributes => "body",
        }
    }

    pub const fn is_attribute_map(self) -> bool {
        matches!(self, Self::HtmlAttributes | Self::BodyAttributes)
    }

    pub const fn is_list(self) -> bool {
        matches!(
            self,
            Self::Meta | Self::Link | Self::Script | Self::Noscript | Self::Style
        )
    }

    /// Void elements never carry content.
    pub const fn accepts_content(self) -> bool {
        matches!(self, Self::Title | Self::Script | Self::Noscript | Self::Style)
    }
}

impl fmt::Display for Aspect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One declared tag: attributes plus optional raw inner content
/// (script source, stylesheet text, noscript markup).
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TagDescriptor {
    pub attributes: AttrList,
    pub content: Option<String>,
}

impl TagDescriptor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn attr(mut self, name: &str, value: impl Into<AttrValue>) -> Self {
        self.attributes.set(name, value);
        self
    }

    pub fn content(mut self, content: impl Into<String>) -> Self {
        self.content = Some(content.into());
        self
    }

    /// Content that would actually be emitted for a tag of `aspect`.
    pub fn effective_content(&self, aspect: Aspect) -> Option<&str> {
        if !aspect.accepts_content() {
            return None;
        }
        self.content.as_deref().filter(|c| !c.is_empty())
    }

    /// A tag with no defined attribute and no content renders nothing.
    pub fn is_renderable(&self, aspect: Aspect) -> bool {
        self.attributes.has_defined() || self.effective_content(aspect).is_some()
    }

    /// Framework-native element for this tag, with `leading` attributes
    /// (e.g. a managed marker) placed before the declared ones.
    pub fn to_node(&self, aspect: Aspect, leading: &[Attribute]) -> Node {
        let mut attributes = leading.to_vec();
        attributes.extend(self.attributes.to_node_attributes());
        let children = match self.effective_content(aspect) {
            Some(content) => vec![Node::text(content)],
            None => Vec::new(),
        };
        Node::element(aspect.tag_name(), attributes, children)
    }
}

impl From<AttrList> for TagDescriptor {
    fn from(attributes: AttrList) -> Self {
        Self {
            attributes,
            content: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn cardinality_is_consistent() {
        for aspect in Aspect::ALL {
            assert_ne!(aspect.is_attribute_map(), aspect.is_list() || aspect == Aspect::Title || aspect == Aspect::Base);
        }
        assert_eq!(Aspect::HEAD_TAGS.len() + 2, Aspect::ALL.len());
    }

    #[test]
    fn void_tags_ignore_content() {
        let tag = TagDescriptor::new().attr("charset", "utf-8").content("ignored");
        let node = tag.to_node(Aspect::Meta, &[]);
        assert!(node.children().is_empty());
    }

    #[test]
    fn leading_attributes_come_first() {
        let tag = TagDescriptor::new().attr("src", "a.js");
        let marker = (Arc::from("data-head"), Some("true".to_string()));
        let node = tag.to_node(Aspect::Script, &[marker]);
        let names: Vec<&str> = node.attributes().iter().map(|(n, _)| &**n).collect();
        assert_eq!(names, vec!["data-head", "src"]);
    }

    #[test]
    fn undefined_only_tag_is_not_renderable() {
        let tag = TagDescriptor::new().attr("async", AttrValue::Undefined);
        assert!(!tag.is_renderable(Aspect::Script));
        assert!(TagDescriptor::new().content("x").is_renderable(Aspect::Style));
        assert!(!TagDescriptor::new().content("x").is_renderable(Aspect::Link));
    }
}
