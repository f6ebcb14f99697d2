//! Fold the ordered registry into one resolved head state.
//!
//! Rules:
//! - Scalar aspects: the last instance in mount order that supplies a
//!   defined value wins entirely. An attribute list with only undefined
//!   values, or a base tag with nothing to render, supplies nothing.
//! - Title: `%s` in the winning template is replaced by the winning title; an
//!   absent or empty title falls back to the default title, which is never
//!   templated.
//! - List aspects: concatenation in mount order. A tag whose identity was
//!   already declared by an earlier instance replaces that instance's tags of
//!   the same identity, at the position of the first of them. Tags of one
//!   instance never replace each other; tags without identity are always kept.
//! - Undefined attributes are dropped per attribute; tags left with nothing
//!   to render are dropped entirely.

use crate::attrs::{AttrList, Attributes};
use crate::config::{HeadConfig, TagIdentity};
use crate::registry::ContributorInstance;
use crate::state::{AttributeSlot, HeadState, TagSlot};
use crate::tags::{Aspect, TagDescriptor};
use html::{Attribute, Node};
use std::collections::HashMap;

#[derive(Default)]
struct Scalars<'a> {
    title: Option<&'a str>,
    title_template: Option<&'a str>,
    default_title: Option<&'a str>,
    title_attributes: Option<&'a AttrList>,
    base: Option<&'a TagDescriptor>,
    html_attributes: Option<&'a AttrList>,
    body_attributes: Option<&'a AttrList>,
}

fn last<'a, T: ?Sized>(slot: &mut Option<&'a T>, value: Option<&'a T>) {
    if value.is_some() {
        *slot = value;
    }
}

fn defined(attrs: Option<&AttrList>) -> Option<&AttrList> {
    attrs.filter(|attrs| attrs.has_defined())
}

pub fn reduce<'a, I>(instances: I, config: &HeadConfig) -> HeadState
where
    I: IntoIterator<Item = &'a ContributorInstance>,
{
    let instances: Vec<&ContributorInstance> = instances.into_iter().collect();

    let mut scalars = Scalars::default();
    for instance in instances.iter().copied() {
        let props = &instance.props;
        last(&mut scalars.title, props.title.as_deref());
        last(&mut scalars.title_template, props.title_template.as_deref());
        last(&mut scalars.default_title, props.default_title.as_deref());
        last(&mut scalars.title_attributes, defined(props.title_attributes.as_ref()));
        last(
            &mut scalars.base,
            props.base.as_ref().filter(|tag| tag.is_renderable(Aspect::Base)),
        );
        last(&mut scalars.html_attributes, defined(props.html_attributes.as_ref()));
        last(&mut scalars.body_attributes, defined(props.body_attributes.as_ref()));
    }

    let options = config.serialize_options();
    let marker = marker_attributes(config);

    let title = compose_title(&scalars)
        .map(|text| {
            let mut attributes = marker.clone();
            if let Some(attrs) = scalars.title_attributes {
                attributes.extend(attrs.to_node_attributes());
            }
            vec![Node::element("title", attributes, vec![Node::text(text)])]
        })
        .unwrap_or_default();

    let base = scalars
        .base
        .map(|tag| vec![tag.to_node(Aspect::Base, &marker)])
        .unwrap_or_default();

    let list = |aspect: Aspect| {
        let tags = merge_list(aspect, &instances, config);
        let nodes = tags.iter().map(|t| t.to_node(aspect, &marker)).collect();
        TagSlot::new(nodes, options)
    };

    let state = HeadState {
        html_attributes: AttributeSlot::new(attribute_map(scalars.html_attributes), options),
        title: TagSlot::new(title, options),
        base: TagSlot::new(base, options),
        meta: list(Aspect::Meta),
        link: list(Aspect::Link),
        script: list(Aspect::Script),
        noscript: list(Aspect::Noscript),
        style: list(Aspect::Style),
        body_attributes: AttributeSlot::new(attribute_map(scalars.body_attributes), options),
    };
    log::trace!(
        target: "head.reduce",
        "reduced {} instances: meta={} link={} script={} noscript={} style={}",
        instances.len(),
        state.meta.len(),
        state.link.len(),
        state.script.len(),
        state.noscript.len(),
        state.style.len()
    );
    state
}

fn compose_title(scalars: &Scalars<'_>) -> Option<String> {
    let title = scalars.title.filter(|t| !t.is_empty());
    match (title, scalars.title_template) {
        (Some(title), Some(template)) if !template.is_empty() => {
            Some(template.replace("%s", title))
        }
        (Some(title), _) => Some(title.to_string()),
        (None, _) => scalars
            .default_title
            .filter(|t| !t.is_empty())
            .map(str::to_string),
    }
}

fn attribute_map(attrs: Option<&AttrList>) -> Attributes {
    Attributes::new(attrs.map(AttrList::to_node_attributes).unwrap_or_default())
}

fn marker_attributes(config: &HeadConfig) -> Vec<Attribute> {
    config
        .managed_attribute
        .as_deref()
        .filter(|name| !name.trim().is_empty())
        .map(|name| {
            vec![(
                crate::attrs::canonical_name(name),
                Some("true".to_string()),
            )]
        })
        .unwrap_or_default()
}

enum Entry<'a> {
    Single(&'a TagDescriptor),
    Group(TagIdentity),
}

fn merge_list<'a>(
    aspect: Aspect,
    instances: &[&'a ContributorInstance],
    config: &HeadConfig,
) -> Vec<&'a TagDescriptor> {
    // Pass 1: the last instance declaring an identity owns it.
    let mut owners: HashMap<TagIdentity, usize> = HashMap::new();
    let mut declared: Vec<Vec<(&'a TagDescriptor, Option<TagIdentity>)>> =
        Vec::with_capacity(instances.len());
    for (ordinal, instance) in instances.iter().copied().enumerate() {
        let tags = instance
            .props
            .tags(aspect)
            .iter()
            .filter(|tag| tag.is_renderable(aspect))
            .map(|tag| {
                let identity = config.dedup.identity(aspect, tag);
                if let Some(identity) = &identity {
                    owners.insert(identity.clone(), ordinal);
                }
                (tag, identity)
            })
            .collect();
        declared.push(tags);
    }

    // Pass 2: reserve each identity's position at its first declaration and
    // fill it with the owner's tags.
    let mut entries: Vec<Entry<'a>> = Vec::new();
    let mut groups: HashMap<TagIdentity, Vec<&'a TagDescriptor>> = HashMap::new();
    for (ordinal, tags) in declared.into_iter().enumerate() {
        for (tag, identity) in tags {
            let Some(identity) = identity else {
                entries.push(Entry::Single(tag));
                continue;
            };
            let reserved = groups.contains_key(&identity);
            let group = groups.entry(identity.clone()).or_default();
            if owners.get(&identity) == Some(&ordinal) {
                group.push(tag);
            }
            if !reserved {
                entries.push(Entry::Group(identity));
            }
        }
    }

    let mut out = Vec::with_capacity(entries.len());
    for entry in entries {
        match entry {
            Entry::Single(tag) => out.push(tag),
            Entry::Group(identity) => {
                if let Some(tags) = groups.remove(&identity) {
                    out.extend(tags);
                }
            }
        }
    }
    out
}
