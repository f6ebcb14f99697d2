use crate::attrs::AttrList;
use crate::tags::{Aspect, TagDescriptor};

/// Everything one contributor declares for the document head.
///
/// Scalar fields are `None` when the contributor does not declare them; list
/// fields are empty. Builder methods on list aspects append.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PropBag {
    pub title: Option<String>,
    /// Template applied to the resolved title; every `%s` is replaced.
    pub title_template: Option<String>,
    /// Title used when no contributor declares one.
    pub default_title: Option<String>,
    pub title_attributes: Option<AttrList>,
    pub base: Option<TagDescriptor>,
    pub html_attributes: Option<AttrList>,
    pub body_attributes: Option<AttrList>,
    pub meta: Vec<TagDescriptor>,
    pub link: Vec<TagDescriptor>,
    pub script: Vec<TagDescriptor>,
    pub noscript: Vec<TagDescriptor>,
    pub style: Vec<TagDescriptor>,
}

impl PropBag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn title_template(mut self, template: impl Into<String>) -> Self {
        self.title_template = Some(template.into());
        self
    }

    pub fn default_title(mut self, title: impl Into<String>) -> Self {
        self.default_title = Some(title.into());
        self
    }

    pub fn title_attributes(mut self, attributes: AttrList) -> Self {
        self.title_attributes = Some(attributes);
        self
    }

    pub fn base(mut self, base: TagDescriptor) -> Self {
        self.base = Some(base);
        self
    }

    pub fn html_attributes(mut self, attributes: AttrList) -> Self {
        self.html_attributes = Some(attributes);
        self
    }

    pub fn body_attributes(mut self, attributes: AttrList) -> Self {
        self.body_attributes = Some(attributes);
        self
    }

    pub fn meta(mut self, tag: TagDescriptor) -> Self {
        self.meta.push(tag);
        self
    }

    pub fn link(mut self, tag: TagDescriptor) -> Self {
        self.link.push(tag);
        self
    }

    pub fn script(mut self, tag: TagDescriptor) -> Self {
        self.script.push(tag);
        self
    }

    pub fn noscript(mut self, tag: TagDescriptor) -> Self {
        self.noscript.push(tag);
        self
    }

    pub fn style(mut self, tag: TagDescriptor) -> Self {
        self.style.push(tag);
        self
    }

    /// Declared tags of a list aspect; empty for every other aspect.
    pub fn tags(&self, aspect: Aspect) -> &[TagDescriptor] {
        match aspect {
            Aspect::Meta => &self.meta,
            Aspect::Link => &self.link,
            Aspect::Script => &self.script,
            Aspect::Noscript => &self.noscript,
            Aspect::Style => &self.style,
            _ => &[],
        }
    }

    pub(crate) fn tags_mut(&mut self, aspect: Aspect) -> Option<&mut Vec<TagDescriptor>> {
        match aspect {
            Aspect::Meta => Some(&mut self.meta),
            Aspect::Link => Some(&mut self.link),
            Aspect::Script => Some(&mut self.script),
            Aspect::Noscript => Some(&mut self.noscript),
            Aspect::Style => Some(&mut self.style),
            _ => None,
        }
    }

    /// True when the bag declares nothing at all.
    pub fn is_empty(&self) -> bool {
        *self == PropBag::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn list_builders_append_in_order() {
        let props = PropBag::new()
            .meta(TagDescriptor::new().attr("name", "a"))
            .meta(TagDescriptor::new().attr("name", "b"));
        let names: Vec<_> = props
            .tags(Aspect::Meta)
            .iter()
            .filter_map(|t| t.attributes.text("name"))
            .collect();
        assert_eq!(names, vec!["a", "b"]);
        assert!(props.tags(Aspect::Title).is_empty());
    }

    #[test]
    fn empty_bag_is_empty() {
        assert!(PropBag::new().is_empty());
        assert!(!PropBag::new().title("x").is_empty());
    }
}
