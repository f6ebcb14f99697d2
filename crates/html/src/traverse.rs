use crate::Node;

/// First element named `name` in document order (pre-order).
pub fn find_element<'a>(node: &'a Node, name: &str) -> Option<&'a Node> {
    if let Node::Element { name: n, .. } = node {
        if n.eq_ignore_ascii_case(name) {
            return Some(node);
        }
    }
    node.children().iter().find_map(|c| find_element(c, name))
}

/// Every element named `name`, in document order.
pub fn find_elements<'a>(node: &'a Node, name: &str) -> Vec<&'a Node> {
    fn walk<'a>(node: &'a Node, name: &str, out: &mut Vec<&'a Node>) {
        if let Node::Element { name: n, .. } = node {
            if n.eq_ignore_ascii_case(name) {
                out.push(node);
            }
        }
        for child in node.children() {
            walk(child, name, out);
        }
    }

    let mut out = Vec::new();
    walk(node, name, &mut out);
    out
}
