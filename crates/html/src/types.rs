use std::sync::Arc;

pub type NodeId = u32;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Id(pub NodeId);

impl Id {
    /// Reserved sentinel for nodes that have not been placed in a document yet.
    pub const INVALID: Id = Id(0);
}

/// Attribute as carried by nodes and patches. `None` is a bare (boolean) attribute.
pub type Attribute = (Arc<str>, Option<String>);

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Node {
    Document {
        id: Id,
        doctype: Option<String>,
        children: Vec<Node>,
    },
    Element {
        id: Id,
        name: Arc<str>,
        attributes: Vec<Attribute>,
        children: Vec<Node>,
    },
    Text {
        id: Id,
        text: String,
    },
}

impl Node {
    /// Detached element; names are canonicalized to ASCII-lowercase.
    pub fn element(name: &str, attributes: Vec<Attribute>, children: Vec<Node>) -> Self {
        Node::Element {
            id: Id::INVALID,
            name: Arc::from(name.to_ascii_lowercase()),
            attributes,
            children,
        }
    }

    pub fn text(text: impl Into<String>) -> Self {
        Node::Text {
            id: Id::INVALID,
            text: text.into(),
        }
    }

    pub fn id(&self) -> Id {
        match self {
            Node::Document { id, .. } => *id,
            Node::Element { id, .. } => *id,
            Node::Text { id, .. } => *id,
        }
    }

    pub fn set_id(&mut self, new_id: Id) {
        match self {
            Node::Document { id, .. } => *id = new_id,
            Node::Element { id, .. } => *id = new_id,
            Node::Text { id, .. } => *id = new_id,
        }
    }

    pub fn name(&self) -> Option<&str> {
        match self {
            Node::Element { name, .. } => Some(name),
            _ => None,
        }
    }

    pub fn attributes(&self) -> &[Attribute] {
        match self {
            Node::Element { attributes, .. } => attributes,
            _ => &[],
        }
    }

    /// Value of a valued attribute. Bare attributes report `Some("")`.
    pub fn attr(&self, key: &str) -> Option<&str> {
        self.attributes()
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(key))
            .map(|(_, v)| v.as_deref().unwrap_or(""))
    }

    pub fn children(&self) -> &[Node] {
        match self {
            Node::Document { children, .. } | Node::Element { children, .. } => children,
            Node::Text { .. } => &[],
        }
    }

    pub fn children_mut(&mut self) -> Option<&mut Vec<Node>> {
        match self {
            Node::Document { children, .. } => Some(children),
            Node::Element { children, .. } => Some(children),
            Node::Text { .. } => None,
        }
    }

    /// Concatenated text of direct text children.
    pub fn text_content(&self) -> String {
        let mut out = String::new();
        for child in self.children() {
            if let Node::Text { text, .. } = child {
                out.push_str(text);
            }
        }
        out
    }

    /// Structural equality that ignores node ids.
    pub fn same_content(&self, other: &Node) -> bool {
        match (self, other) {
            (
                Node::Document {
                    doctype, children, ..
                },
                Node::Document {
                    doctype: other_doctype,
                    children: other_children,
                    ..
                },
            ) => doctype == other_doctype && same_children(children, other_children),
            (
                Node::Element {
                    name,
                    attributes,
                    children,
                    ..
                },
                Node::Element {
                    name: other_name,
                    attributes: other_attrs,
                    children: other_children,
                    ..
                },
            ) => {
                name == other_name
                    && attributes == other_attrs
                    && same_children(children, other_children)
            }
            (Node::Text { text, .. }, Node::Text { text: other, .. }) => text == other,
            _ => false,
        }
    }
}

fn same_children(a: &[Node], b: &[Node]) -> bool {
    a.len() == b.len() && a.iter().zip(b).all(|(x, y)| x.same_content(y))
}
