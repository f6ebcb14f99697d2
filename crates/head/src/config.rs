//! Head manager configuration.
//!
//! De-duplication identities are configuration, not heuristics: every list
//! aspect carries an ordered list of `IdentityRule`s and the first rule that
//! applies to a tag decides its identity.

use crate::tags::{Aspect, TagDescriptor};
use html::SerializeOptions;

/// Pseudo attribute name that keys an identity rule on the tag content.
pub const CONTENT_KEY: &str = "#content";

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HeadConfig {
    /// Whether a manager constructed with a document may mutate it.
    pub can_use_dom: bool,
    /// Escape `& < > " '` in text and attribute values.
    pub encode_special_characters: bool,
    /// Attribute stamped first on every emitted tag, e.g. `data-head`.
    pub managed_attribute: Option<String>,
    pub dedup: DedupRules,
}

impl Default for HeadConfig {
    fn default() -> Self {
        Self {
            can_use_dom: true,
            encode_special_characters: true,
            managed_attribute: None,
            dedup: DedupRules::default(),
        }
    }
}

impl HeadConfig {
    pub fn serialize_options(&self) -> SerializeOptions {
        SerializeOptions {
            encode_special_characters: self.encode_special_characters,
        }
    }
}

/// A rule that gives a tag an identity. `when` restricts the rule to tags
/// whose attribute has the given value (ASCII case-insensitive).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct IdentityRule {
    pub attributes: Vec<String>,
    pub when: Option<(String, String)>,
}

impl IdentityRule {
    pub fn keyed_by(attributes: &[&str]) -> Self {
        Self {
            attributes: attributes.iter().map(|a| a.to_string()).collect(),
            when: None,
        }
    }

    pub fn when(mut self, attribute: &str, value: &str) -> Self {
        self.when = Some((attribute.to_string(), value.to_string()));
        self
    }

    /// Lowercased key values, or `None` when the rule does not apply.
    fn key(&self, aspect: Aspect, tag: &TagDescriptor) -> Option<Vec<String>> {
        if let Some((attribute, expected)) = &self.when {
            let actual = tag.attributes.text(attribute)?;
            if !actual.trim().eq_ignore_ascii_case(expected) {
                return None;
            }
        }
        self.attributes
            .iter()
            .map(|attribute| {
                let value = if attribute == CONTENT_KEY {
                    tag.effective_content(aspect)?
                } else {
                    tag.attributes.text(attribute)?
                };
                let value = value.trim();
                (!value.is_empty()).then(|| value.to_ascii_lowercase())
            })
            .collect()
    }
}

/// Identity of a tag within one list aspect.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct TagIdentity {
    pub rule: usize,
    pub values: Vec<String>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DedupRules {
    pub meta: Vec<IdentityRule>,
    pub link: Vec<IdentityRule>,
    pub script: Vec<IdentityRule>,
    pub noscript: Vec<IdentityRule>,
    pub style: Vec<IdentityRule>,
}

impl Default for DedupRules {
    fn default() -> Self {
        Self {
            meta: vec![
                IdentityRule::keyed_by(&["charset"]),
                IdentityRule::keyed_by(&["name"]),
                IdentityRule::keyed_by(&["http-equiv"]),
                IdentityRule::keyed_by(&["property"]),
                IdentityRule::keyed_by(&["itemprop"]),
            ],
            link: vec![
                IdentityRule::keyed_by(&[]).when("rel", "canonical"),
                IdentityRule::keyed_by(&["rel", "href"]),
            ],
            script: vec![
                IdentityRule::keyed_by(&["src"]),
                IdentityRule::keyed_by(&[CONTENT_KEY]),
            ],
            noscript: vec![IdentityRule::keyed_by(&[CONTENT_KEY])],
            style: vec![IdentityRule::keyed_by(&[CONTENT_KEY])],
        }
    }
}

impl DedupRules {
    /// No de-duplication at all: every declared tag is kept.
    pub fn none() -> Self {
        Self {
            meta: Vec::new(),
            link: Vec::new(),
            script: Vec::new(),
            noscript: Vec::new(),
            style: Vec::new(),
        }
    }

    pub fn rules(&self, aspect: Aspect) -> &[IdentityRule] {
        match aspect {
            Aspect::Meta => &self.meta,
            Aspect::Link => &self.link,
            Aspect::Script => &self.script,
            Aspect::Noscript => &self.noscript,
            Aspect::Style => &self.style,
            _ => &[],
        }
    }

    /// Identity of `tag`, `None` when no rule applies (the tag is never
    /// de-duplicated).
    pub fn identity(&self, aspect: Aspect, tag: &TagDescriptor) -> Option<TagIdentity> {
        self.rules(aspect)
            .iter()
            .enumerate()
            .find_map(|(rule, r)| r.key(aspect, tag).map(|values| TagIdentity { rule, values }))
    }
}
