//! Attribute values as contributors declare them, and the resolved attribute
//! maps handed back to the host framework.

use html::Attribute;
use std::sync::Arc;

/// A declared attribute value.
///
/// `Undefined` is the "no value" sentinel: it is kept in the declaration so
/// later updates can overwrite it in place, but it never reaches any output.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum AttrValue {
    #[default]
    Undefined,
    /// Bare boolean attribute such as `async`.
    Flag,
    Text(String),
}

impl AttrValue {
    pub fn is_defined(&self) -> bool {
        !matches!(self, AttrValue::Undefined)
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            AttrValue::Text(text) => Some(text),
            _ => None,
        }
    }

    /// Node representation, `None` when the attribute must be omitted.
    fn to_node_value(&self) -> Option<Option<String>> {
        match self {
            AttrValue::Undefined => None,
            AttrValue::Flag => Some(None),
            AttrValue::Text(text) => Some(Some(text.clone())),
        }
    }
}

impl From<&str> for AttrValue {
    fn from(value: &str) -> Self {
        AttrValue::Text(value.to_string())
    }
}

impl From<String> for AttrValue {
    fn from(value: String) -> Self {
        AttrValue::Text(value)
    }
}

impl From<&String> for AttrValue {
    fn from(value: &String) -> Self {
        AttrValue::Text(value.clone())
    }
}

impl From<bool> for AttrValue {
    fn from(value: bool) -> Self {
        if value {
            AttrValue::Flag
        } else {
            AttrValue::Undefined
        }
    }
}

impl<T: Into<AttrValue>> From<Option<T>> for AttrValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(AttrValue::Undefined, Into::into)
    }
}

/// Aliases whose HTML name is not just the lowercased alias. The rest
/// (`charSet`, `itemProp`, `tabIndex`, ...) canonicalize by lowercasing.
const ALIASES: &[(&str, &str)] = &[
    ("classname", "class"),
    ("htmlfor", "for"),
    ("httpequiv", "http-equiv"),
];

/// Canonical ASCII-lowercase HTML attribute name. Framework-style camelCase
/// aliases (`className`, `httpEquiv`, `charSet`, ...) map to their HTML names.
pub fn canonical_name(name: &str) -> Arc<str> {
    let lower = name.trim().to_ascii_lowercase();
    match ALIASES.iter().find(|(alias, _)| *alias == lower) {
        Some((_, html)) => Arc::from(*html),
        None => Arc::from(lower),
    }
}

/// Ordered attribute declarations of one tag.
///
/// Names are canonicalized on insert. Setting a name that is already present
/// replaces its value in place, so declaration order stays stable.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AttrList {
    entries: Vec<(Arc<str>, AttrValue)>,
}

impl AttrList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, name: &str, value: impl Into<AttrValue>) -> Self {
        self.set(name, value);
        self
    }

    pub fn set(&mut self, name: &str, value: impl Into<AttrValue>) {
        let name = canonical_name(name);
        let value = value.into();
        match self.entries.iter_mut().find(|(n, _)| *n == name) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((name, value)),
        }
    }

    pub fn get(&self, name: &str) -> Option<&AttrValue> {
        let name = canonical_name(name);
        self.entries
            .iter()
            .find(|(n, _)| *n == name)
            .map(|(_, v)| v)
    }

    /// Text value of a defined, valued attribute.
    pub fn text(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(AttrValue::as_text)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &AttrValue)> {
        self.entries.iter().map(|(n, v)| (&**n, v))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn has_defined(&self) -> bool {
        self.entries.iter().any(|(_, v)| v.is_defined())
    }

    /// Defined attributes in declaration order; undefined ones are dropped.
    pub fn to_node_attributes(&self) -> Vec<Attribute> {
        self.entries
            .iter()
            .filter_map(|(name, value)| value.to_node_value().map(|v| (Arc::clone(name), v)))
            .collect()
    }
}

impl<K: AsRef<str>, V: Into<AttrValue>> FromIterator<(K, V)> for AttrList {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut list = AttrList::new();
        for (name, value) in iter {
            list.set(name.as_ref(), value);
        }
        list
    }
}

/// Resolved attribute map of an attribute aspect (`html`, `body`).
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Attributes(Vec<Attribute>);

impl Attributes {
    pub fn new(attributes: Vec<Attribute>) -> Self {
        Self(attributes)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0.iter().any(|(n, _)| n.eq_ignore_ascii_case(name))
    }

    /// Value of a valued attribute; `None` for missing and bare attributes.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .and_then(|(_, v)| v.as_deref())
    }

    pub fn names(&self) -> impl Iterator<Item = &Arc<str>> {
        self.0.iter().map(|(n, _)| n)
    }

    pub fn as_slice(&self) -> &[Attribute] {
        &self.0
    }

    pub fn into_vec(self) -> Vec<Attribute> {
        self.0
    }
}
