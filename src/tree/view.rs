//! Node and attribute views
//!
//! A view is a `(tree, position)` pair. Views are `Copy`, never cached, and
//! compare equal when they point at the same tree and the same position.

use std::borrow::Cow;
use std::hash::{Hash, Hasher};

use super::index::TreeIndex;
use super::kind::NodeKind;

/// A node of a frozen tree
#[derive(Debug, Clone, Copy)]
pub struct Node<'t> {
    tree: &'t TreeIndex,
    pos: usize,
}

impl<'t> Node<'t> {
    /// View of the node opened at `pos`
    pub fn new(tree: &'t TreeIndex, pos: usize) -> Self {
        assert!(tree.is_node(pos), "position {} is not a node", pos);
        Node { tree, pos }
    }

    /// The document node of `tree`
    pub fn document(tree: &'t TreeIndex) -> Self {
        Node::new(tree, tree.document())
    }

    /// The root element of `tree`
    pub fn document_element(tree: &'t TreeIndex) -> Self {
        Node::new(tree, tree.document_element())
    }

    #[inline]
    pub fn tree(&self) -> &'t TreeIndex {
        self.tree
    }

    #[inline]
    pub fn position(&self) -> usize {
        self.pos
    }

    #[inline]
    pub fn kind(&self) -> NodeKind {
        self.tree.kind(self.pos)
    }

    fn element(&self) -> Option<usize> {
        self.tree.element_ordinal(self.pos)
    }

    fn wrap(&self, pos: Option<usize>) -> Option<Node<'t>> {
        pos.map(|pos| Node {
            tree: self.tree,
            pos,
        })
    }

    // Navigation

    pub fn parent(&self) -> Option<Node<'t>> {
        self.wrap(self.tree.parent(self.pos))
    }

    pub fn first_child(&self) -> Option<Node<'t>> {
        self.wrap(self.tree.first_child(self.pos))
    }

    pub fn last_child(&self) -> Option<Node<'t>> {
        self.wrap(self.tree.last_child(self.pos))
    }

    pub fn next_sibling(&self) -> Option<Node<'t>> {
        self.wrap(self.tree.next_sibling(self.pos))
    }

    pub fn previous_sibling(&self) -> Option<Node<'t>> {
        self.wrap(self.tree.previous_sibling(self.pos))
    }

    pub fn has_child_nodes(&self) -> bool {
        self.tree.has_child_nodes(self.pos)
    }

    pub fn child_nodes(&self) -> Vec<Node<'t>> {
        let tree = self.tree;
        tree.children(self.pos)
            .map(|pos| Node { tree, pos })
            .collect()
    }

    /// Descendant elements named `name` (`"*"` for all)
    pub fn elements_by_tag_name(&self, name: &str) -> Vec<Node<'t>> {
        let tree = self.tree;
        tree.elements_by_tag_name(self.pos, name)
            .into_iter()
            .map(|pos| Node { tree, pos })
            .collect()
    }

    pub fn elements_by_tag_name_ns(
        &self,
        namespace_uri: Option<&str>,
        local_name: &str,
    ) -> Vec<Node<'t>> {
        let tree = self.tree;
        tree.elements_by_tag_name_ns(self.pos, namespace_uri, local_name)
            .into_iter()
            .map(|pos| Node { tree, pos })
            .collect()
    }

    // Names

    /// DOM `nodeName`: qualified name, PI target, or a `#kind` name
    pub fn node_name(&self) -> Cow<'t, str> {
        let kind = self.kind();
        if let Some(name) = kind.fixed_name() {
            return Cow::Borrowed(name);
        }
        let tree = self.tree;
        match (kind, self.element()) {
            (NodeKind::Element, Some(e)) => tree.qualified_name(e),
            (NodeKind::ProcessingInstruction, Some(e)) => {
                Cow::Borrowed(tree.pseudo_attribute(e, 2))
            }
            _ => Cow::Borrowed(""),
        }
    }

    pub fn local_name(&self) -> Option<&'t str> {
        match self.kind() {
            NodeKind::Element => self.tree.local_name(self.element()?),
            _ => None,
        }
    }

    pub fn namespace_uri(&self) -> Option<&'t str> {
        match self.kind() {
            NodeKind::Element => self.tree.namespace_uri(self.element()?),
            _ => None,
        }
    }

    pub fn prefix(&self) -> Option<&'t str> {
        match self.kind() {
            NodeKind::Element => self.tree.prefix(self.element()?),
            _ => None,
        }
    }

    // Character data

    /// DOM `nodeValue`: character data for text-like nodes, else `None`
    pub fn node_value(&self) -> Option<&'t str> {
        match self.kind() {
            NodeKind::Text => Some(self.tree.text(self.tree.text_ordinal(self.pos)?)),
            NodeKind::CData | NodeKind::Comment | NodeKind::ProcessingInstruction => {
                Some(self.tree.pseudo_attribute(self.element()?, 1))
            }
            NodeKind::Element | NodeKind::Document => None,
        }
    }

    /// Character data of a text, CDATA, comment or PI node
    pub fn data(&self) -> Option<&'t str> {
        self.node_value()
    }

    /// Byte length of the character data
    pub fn length(&self) -> usize {
        match self.kind() {
            NodeKind::Text => self
                .tree
                .text_ordinal(self.pos)
                .map_or(0, |t| self.tree.text_length(t)),
            NodeKind::CData | NodeKind::Comment | NodeKind::ProcessingInstruction => self
                .element()
                .map_or(0, |e| self.tree.pseudo_attribute_length(e, 1)),
            NodeKind::Element | NodeKind::Document => 0,
        }
    }

    /// Part of the character data, `None` when `offset` is past the end
    pub fn substring_data(&self, offset: usize, count: usize) -> Option<&'t str> {
        match self.kind() {
            NodeKind::Text => {
                self.tree
                    .text_substring(self.tree.text_ordinal(self.pos)?, offset, count)
            }
            NodeKind::CData | NodeKind::Comment | NodeKind::ProcessingInstruction => {
                self.tree
                    .pseudo_attribute_substring(self.element()?, 1, offset, count)
            }
            NodeKind::Element | NodeKind::Document => None,
        }
    }

    /// Target of a processing instruction
    pub fn target(&self) -> Option<&'t str> {
        match self.kind() {
            NodeKind::ProcessingInstruction => Some(self.tree.pseudo_attribute(self.element()?, 2)),
            _ => None,
        }
    }

    pub fn text_content(&self) -> String {
        self.tree.text_content(self.pos)
    }

    // Attributes

    pub fn has_attributes(&self) -> bool {
        match (self.kind(), self.element()) {
            (NodeKind::Element, Some(e)) => self.tree.has_attributes(e),
            _ => false,
        }
    }

    /// Attributes of an element, empty for every other kind
    pub fn attributes(&self) -> Vec<Attr<'t>> {
        let tree = self.tree;
        match (self.kind(), self.element()) {
            (NodeKind::Element, Some(e)) => tree
                .attribute_positions(e)
                .map(|pos| Attr { tree, pos })
                .collect(),
            _ => Vec::new(),
        }
    }

    pub fn attribute_node(&self, name: &str) -> Option<Attr<'t>> {
        let e = self.element().filter(|_| self.kind() == NodeKind::Element)?;
        let pos = self.tree.find_attribute(e, name)?;
        Some(Attr {
            tree: self.tree,
            pos,
        })
    }

    pub fn attribute_node_ns(&self, namespace_uri: Option<&str>, local_name: &str) -> Option<Attr<'t>> {
        let e = self.element().filter(|_| self.kind() == NodeKind::Element)?;
        let pos = self.tree.find_attribute_ns(e, namespace_uri, local_name)?;
        Some(Attr {
            tree: self.tree,
            pos,
        })
    }

    /// Attribute value, `""` when absent
    pub fn get_attribute(&self, name: &str) -> &'t str {
        self.attribute_node(name).map_or("", |attr| attr.value())
    }

    /// Namespaced attribute value, `""` when absent
    pub fn get_attribute_ns(&self, namespace_uri: Option<&str>, local_name: &str) -> &'t str {
        self.attribute_node_ns(namespace_uri, local_name)
            .map_or("", |attr| attr.value())
    }

    pub fn has_attribute(&self, name: &str) -> bool {
        self.attribute_node(name).is_some()
    }

    pub fn has_attribute_ns(&self, namespace_uri: Option<&str>, local_name: &str) -> bool {
        self.attribute_node_ns(namespace_uri, local_name).is_some()
    }
}

impl PartialEq for Node<'_> {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self.tree, other.tree) && self.pos == other.pos
    }
}

impl Eq for Node<'_> {}

impl Hash for Node<'_> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        std::ptr::hash(self.tree, state);
        self.pos.hash(state);
    }
}

/// An attribute of a frozen tree
#[derive(Debug, Clone, Copy)]
pub struct Attr<'t> {
    tree: &'t TreeIndex,
    pos: usize,
}

impl<'t> Attr<'t> {
    /// View of the attribute at `pos`
    pub fn new(tree: &'t TreeIndex, pos: usize) -> Self {
        assert!(tree.is_attribute(pos), "position {} is not an attribute", pos);
        Attr { tree, pos }
    }

    #[inline]
    pub fn position(&self) -> usize {
        self.pos
    }

    pub fn name(&self) -> Cow<'t, str> {
        self.tree
            .attribute_qualified_name(self.pos)
            .unwrap_or(Cow::Borrowed(""))
    }

    pub fn local_name(&self) -> Option<&'t str> {
        self.tree.attribute_local_name(self.pos)
    }

    pub fn namespace_uri(&self) -> Option<&'t str> {
        self.tree.attribute_namespace_uri(self.pos)
    }

    pub fn prefix(&self) -> Option<&'t str> {
        self.tree.attribute_prefix(self.pos)
    }

    pub fn value(&self) -> &'t str {
        self.tree.attribute_value(self.pos)
    }

    /// The element carrying this attribute
    pub fn owner_element(&self) -> Node<'t> {
        Node {
            tree: self.tree,
            pos: self.tree.attribute_owner(self.pos),
        }
    }
}

impl PartialEq for Attr<'_> {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self.tree, other.tree) && self.pos == other.pos
    }
}

impl Eq for Attr<'_> {}

impl Hash for Attr<'_> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        std::ptr::hash(self.tree, state);
        self.pos.hash(state);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::build::{parse_str, BuildOptions};
    use std::collections::HashSet;

    fn parse(xml: &str) -> TreeIndex {
        parse_str(xml, BuildOptions::default()).unwrap()
    }

    #[test]
    fn test_catalog_scenario() {
        let tree = parse("<catalog><book id=\"101\">XML Developer's Guide</book></catalog>");
        let root = Node::document_element(&tree);
        assert_eq!(root.node_name(), "catalog");

        let children = root.child_nodes();
        assert_eq!(children.len(), 1);
        let book = children[0];
        assert_eq!(book.get_attribute("id"), "101");
        assert_eq!(book.text_content(), "XML Developer's Guide");
        assert_eq!(book.get_attribute("missing"), "");
        assert!(book.attribute_node("missing").is_none());
        assert!(!book.has_attribute("missing"));
    }

    #[test]
    fn test_node_names_and_values() {
        let tree = parse("<r>t<!--c--><![CDATA[d]]><?pi x?></r>");
        let root = Node::document_element(&tree);
        let kids = root.child_nodes();
        let names: Vec<_> = kids.iter().map(|n| n.node_name().into_owned()).collect();
        assert_eq!(names, ["#text", "#comment", "#cdata-section", "pi"]);
        let values: Vec<_> = kids.iter().map(|n| n.node_value()).collect();
        assert_eq!(values, [Some("t"), Some("c"), Some("d"), Some("x")]);
        assert_eq!(kids[3].target(), Some("pi"));
        assert_eq!(kids[0].length(), 1);
        assert_eq!(kids[2].substring_data(0, 9), Some("d"));
        assert_eq!(kids[2].substring_data(1, 9), None);
        assert_eq!(root.node_value(), None);
        assert_eq!(Node::document(&tree).node_name(), "#document");
    }

    #[test]
    fn test_equality_is_structural() {
        let tree = parse("<r><a/><a/></r>");
        let other = parse("<r><a/><a/></r>");
        let root = Node::document_element(&tree);
        let first = root.first_child().unwrap();
        assert_eq!(first, Node::new(&tree, first.position()));
        assert_ne!(first, root.last_child().unwrap());
        assert_ne!(first, Node::new(&other, first.position()));
        assert_eq!(first.next_sibling().unwrap().previous_sibling(), Some(first));

        let set: HashSet<Node<'_>> = root.child_nodes().into_iter().chain([first]).collect();
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn test_attribute_views() {
        let tree = parse(r#"<r xmlns:p="urn:p" p:a="1" b="2"/>"#);
        let root = Node::document_element(&tree);
        let attrs = root.attributes();
        assert_eq!(attrs.len(), 3);
        let names: Vec<_> = attrs.iter().map(|a| a.name().into_owned()).collect();
        assert_eq!(names, ["p:a", "b", "xmlns:p"]);
        for attr in &attrs {
            assert_eq!(attr.owner_element(), root);
            assert_eq!(Attr::new(&tree, attr.position()), *attr);
        }
        assert_eq!(root.get_attribute_ns(Some("urn:p"), "a"), "1");
        assert_eq!(root.get_attribute_ns(Some("urn:q"), "a"), "");
        assert!(root.has_attribute_ns(None, "b"));
        assert_eq!(root.attribute_node("p:a").unwrap().prefix(), Some("p"));
        assert!(root.has_attributes());
        assert!(!Node::document(&tree).has_attributes());
    }

    #[test]
    fn test_elements_by_tag_name_views() {
        let tree = parse(r#"<r xmlns="urn:d"><a/><b><a/></b></r>"#);
        let root = Node::document_element(&tree);
        assert_eq!(root.elements_by_tag_name("a").len(), 2);
        assert_eq!(root.elements_by_tag_name_ns(Some("urn:d"), "a").len(), 2);
        assert_eq!(root.elements_by_tag_name_ns(None, "a").len(), 0);
        let b = root.elements_by_tag_name("b")[0];
        assert_eq!(b.local_name(), Some("b"));
        assert_eq!(b.namespace_uri(), Some("urn:d"));
        assert_eq!(b.prefix(), None);
    }
}
