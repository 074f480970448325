//! Tree Index
//!
//! The frozen tree: a parenthesis topology, two auxiliary bit vectors and
//! the string tables, composed into navigation by rank/select arithmetic.
//!
//! ```text
//! parens          ( ( ( ) ( ) ) )        1 = open, 0 = close; index = position
//! node_kinds      1 1 0 1              one bit per node ordinal; 0 = text
//! attribute_groups 1 0 1 1 0 0 1       per non-text node: 0 per attribute, then 1
//! ```
//!
//! - ordinal(pos) = parens.rank1(pos) - 1
//! - element ordinal = node_kinds.rank1(ordinal) - 1, text ordinal = rank0 - 1
//! - attributes of element ordinal `e` sit between separators `e - 1` and `e`
//!
//! Positions and ordinals handed to these methods must come from the index
//! itself. Anything else is a caller bug and panics.

use std::borrow::Cow;
use std::ops::Range;

use super::context::DocumentContext;
use super::elements::ElementTable;
use super::kind::NodeKind;
use crate::bits::{BitVector, ParenthesisTopology};
use crate::dict::{ContentDictionary, QualifiedNameTable};
use crate::error::{Error, Result};

/// Position of the document node
pub const DOCUMENT_POSITION: usize = 0;

/// Wildcard accepted by the tag-name searches
pub const WILDCARD: &str = "*";

/// Frozen structures produced by the builder
pub(crate) struct TreeParts {
    pub parens: BitVector,
    pub node_kinds: BitVector,
    pub attribute_groups: BitVector,
    pub elements: ElementTable,
    pub texts: ContentDictionary,
    pub attribute_names: QualifiedNameTable,
    pub attribute_values: ContentDictionary,
    pub context: DocumentContext,
    pub default_namespace: Option<String>,
    pub namespace_aware: bool,
}

/// Immutable succinct tree with navigation
#[derive(Debug, Clone)]
pub struct TreeIndex {
    topology: ParenthesisTopology,
    node_kinds: BitVector,
    attribute_groups: BitVector,
    elements: ElementTable,
    texts: ContentDictionary,
    attribute_names: QualifiedNameTable,
    attribute_values: ContentDictionary,
    context: DocumentContext,
    default_namespace: Option<String>,
    namespace_aware: bool,
    document_element: usize,
}

impl TreeIndex {
    pub(crate) fn new(parts: TreeParts) -> Result<Self> {
        debug_assert_eq!(parts.parens.len(), 2 * parts.node_kinds.len());
        debug_assert_eq!(
            parts.attribute_groups.count_ones(),
            parts.node_kinds.count_ones()
        );
        debug_assert_eq!(parts.elements.len(), parts.node_kinds.count_ones());
        debug_assert_eq!(parts.texts.len(), parts.node_kinds.count_zeros());
        debug_assert_eq!(parts.attribute_values.len(), parts.attribute_groups.count_zeros());

        let mut tree = TreeIndex {
            topology: ParenthesisTopology::new(parts.parens),
            node_kinds: parts.node_kinds,
            attribute_groups: parts.attribute_groups,
            elements: parts.elements,
            texts: parts.texts,
            attribute_names: parts.attribute_names,
            attribute_values: parts.attribute_values,
            context: parts.context,
            default_namespace: parts.default_namespace,
            namespace_aware: parts.namespace_aware,
            document_element: 0,
        };
        let root = tree
            .children(DOCUMENT_POSITION)
            .find(|&pos| tree.kind(pos) == NodeKind::Element)
            .ok_or(Error::MissingRootElement)?;
        tree.document_element = root;
        Ok(tree)
    }

    // ========================================================================
    // Document
    // ========================================================================

    /// Position of the document node
    #[inline]
    pub fn document(&self) -> usize {
        DOCUMENT_POSITION
    }

    /// Position of the root element
    #[inline]
    pub fn document_element(&self) -> usize {
        self.document_element
    }

    #[inline]
    pub fn context(&self) -> &DocumentContext {
        &self.context
    }

    #[inline]
    pub fn is_namespace_aware(&self) -> bool {
        self.namespace_aware
    }

    /// The first default namespace declared in the document
    pub fn default_namespace(&self) -> Option<&str> {
        self.default_namespace.as_deref()
    }

    /// True when `namespace_uri` is the recorded default namespace
    pub fn is_default_namespace(&self, namespace_uri: Option<&str>) -> bool {
        match namespace_uri {
            None | Some("") => false,
            Some(uri) => self.default_namespace.as_deref() == Some(uri),
        }
    }

    /// Nodes of every kind, the document included
    pub fn node_count(&self) -> usize {
        self.node_kinds.len()
    }

    /// Non-text nodes
    pub fn element_count(&self) -> usize {
        self.node_kinds.count_ones()
    }

    pub fn text_count(&self) -> usize {
        self.node_kinds.count_zeros()
    }

    /// Attributes, pseudo attributes included
    pub fn attribute_count(&self) -> usize {
        self.attribute_groups.count_zeros()
    }

    // ========================================================================
    // Positions and ordinals
    // ========================================================================

    /// True when `pos` is the open position of a node
    #[inline]
    pub fn is_node(&self, pos: usize) -> bool {
        pos < self.topology.len() && self.topology.is_open(pos)
    }

    /// True when `pos` is an attribute position
    #[inline]
    pub fn is_attribute(&self, pos: usize) -> bool {
        pos < self.attribute_groups.len() && !self.attribute_groups.get(pos)
    }

    /// Preorder rank of the node opened at `pos`
    #[inline]
    pub fn ordinal(&self, pos: usize) -> usize {
        assert!(self.topology.is_open(pos), "position {} is not a node", pos);
        self.topology.bits().rank1(pos) - 1
    }

    /// Open position of the node with preorder rank `ordinal`
    #[inline]
    pub fn position(&self, ordinal: usize) -> usize {
        self.topology.bits().select1(ordinal)
    }

    pub fn kind(&self, pos: usize) -> NodeKind {
        let ordinal = self.ordinal(pos);
        if self.node_kinds.get(ordinal) {
            self.elements.kind(self.node_kinds.rank1(ordinal) - 1)
        } else {
            NodeKind::Text
        }
    }

    /// Element ordinal of a non-text node
    pub fn element_ordinal(&self, pos: usize) -> Option<usize> {
        let ordinal = self.ordinal(pos);
        self.node_kinds
            .get(ordinal)
            .then(|| self.node_kinds.rank1(ordinal) - 1)
    }

    /// Text ordinal of a text node
    pub fn text_ordinal(&self, pos: usize) -> Option<usize> {
        let ordinal = self.ordinal(pos);
        (!self.node_kinds.get(ordinal)).then(|| self.node_kinds.rank0(ordinal) - 1)
    }

    /// Open position of the non-text node with element ordinal `element`
    pub fn element_position(&self, element: usize) -> usize {
        self.position(self.node_kinds.select1(element))
    }

    // ========================================================================
    // Navigation
    // ========================================================================

    pub fn parent(&self, pos: usize) -> Option<usize> {
        self.topology.enclose(pos)
    }

    pub fn first_child(&self, pos: usize) -> Option<usize> {
        assert!(self.topology.is_open(pos), "position {} is not a node", pos);
        self.topology.is_open(pos + 1).then_some(pos + 1)
    }

    pub fn last_child(&self, pos: usize) -> Option<usize> {
        self.first_child(pos)?;
        let close = self.topology.find_close(pos);
        Some(self.topology.find_open(close - 1))
    }

    pub fn next_sibling(&self, pos: usize) -> Option<usize> {
        let next = self.topology.find_close(pos) + 1;
        (next < self.topology.len() && self.topology.is_open(next)).then_some(next)
    }

    pub fn previous_sibling(&self, pos: usize) -> Option<usize> {
        assert!(self.topology.is_open(pos), "position {} is not a node", pos);
        if pos == 0 || self.topology.is_open(pos - 1) {
            return None;
        }
        Some(self.topology.find_open(pos - 1))
    }

    pub fn has_child_nodes(&self, pos: usize) -> bool {
        self.first_child(pos).is_some()
    }

    /// Lazy iterator over the children of `pos`
    pub fn children(&self, pos: usize) -> Children<'_> {
        Children {
            tree: self,
            next: self.first_child(pos),
        }
    }

    /// Child positions of `pos`, in document order
    pub fn child_positions(&self, pos: usize) -> Vec<usize> {
        self.children(pos).collect()
    }

    /// Distance from the document node (the document itself is at depth 0)
    pub fn depth(&self, pos: usize) -> usize {
        assert!(self.topology.is_open(pos), "position {} is not a node", pos);
        (self.topology.excess(pos) - 1) as usize
    }

    /// Nodes in the subtree rooted at `pos`, itself included
    pub fn subtree_len(&self, pos: usize) -> usize {
        (self.topology.find_close(pos) - pos + 1) / 2
    }

    /// Ordinals of the strict descendants of `pos`
    fn descendant_ordinals(&self, pos: usize) -> Range<usize> {
        let ordinal = self.ordinal(pos);
        ordinal + 1..ordinal + self.subtree_len(pos)
    }

    // ========================================================================
    // Element names (by element ordinal)
    // ========================================================================

    /// Local name, `None` when the tree is not namespace aware
    pub fn local_name(&self, element: usize) -> Option<&str> {
        self.namespace_aware
            .then(|| self.elements.local_name(element))
    }

    /// Name as written in the source
    pub fn qualified_name(&self, element: usize) -> Cow<'_, str> {
        self.elements.qualified_name(element)
    }

    pub fn namespace_uri(&self, element: usize) -> Option<&str> {
        if self.namespace_aware {
            self.elements.namespace_uri(element)
        } else {
            None
        }
    }

    pub fn prefix(&self, element: usize) -> Option<&str> {
        if self.namespace_aware {
            self.elements.prefix(element)
        } else {
            None
        }
    }

    /// Kind recorded for element ordinal `element`
    pub fn element_kind(&self, element: usize) -> NodeKind {
        self.elements.kind(element)
    }

    // ========================================================================
    // Text (by text ordinal)
    // ========================================================================

    pub fn text(&self, text: usize) -> &str {
        self.texts.get(text)
    }

    pub fn text_length(&self, text: usize) -> usize {
        self.texts.length(text)
    }

    pub fn text_substring(&self, text: usize, offset: usize, count: usize) -> Option<&str> {
        self.texts.substring(text, offset, count)
    }

    // ========================================================================
    // Pseudo attributes (comment, CDATA and PI data)
    // ========================================================================

    /// Attribute-value ordinal `reverse_offset` slots before the separator of `element`
    #[inline]
    fn pseudo_ordinal(&self, element: usize, reverse_offset: usize) -> usize {
        let separator = self.attribute_groups.select1(element);
        assert!(
            reverse_offset >= 1 && reverse_offset <= separator,
            "reverse offset {} out of range for element {}",
            reverse_offset,
            element
        );
        self.attribute_groups.rank0(separator - reverse_offset) - 1
    }

    /// Comment or CDATA body at offset 1, PI target at 2 and data at 1
    pub fn pseudo_attribute(&self, element: usize, reverse_offset: usize) -> &str {
        self.attribute_values
            .get(self.pseudo_ordinal(element, reverse_offset))
    }

    pub fn pseudo_attribute_length(&self, element: usize, reverse_offset: usize) -> usize {
        self.attribute_values
            .length(self.pseudo_ordinal(element, reverse_offset))
    }

    pub fn pseudo_attribute_substring(
        &self,
        element: usize,
        reverse_offset: usize,
        offset: usize,
        count: usize,
    ) -> Option<&str> {
        self.attribute_values
            .substring(self.pseudo_ordinal(element, reverse_offset), offset, count)
    }

    // ========================================================================
    // Text content
    // ========================================================================

    /// Concatenated text of the subtree at `pos`
    ///
    /// Text and CDATA descendants contribute in document order; comments
    /// and processing instructions contribute nothing. Called directly on
    /// a character node, returns that node's own data. On the document
    /// node it is the text of the whole document, where DOM would give null.
    pub fn text_content(&self, pos: usize) -> String {
        let ordinal = self.ordinal(pos);
        if !self.node_kinds.get(ordinal) {
            return self.text(self.node_kinds.rank0(ordinal) - 1).to_string();
        }
        let element = self.node_kinds.rank1(ordinal) - 1;
        match self.elements.kind(element) {
            NodeKind::CData | NodeKind::Comment | NodeKind::ProcessingInstruction => {
                return self.pseudo_attribute(element, 1).to_string();
            }
            _ => {}
        }

        let range = self.descendant_ordinals(pos);
        let mut content = String::new();
        if range.is_empty() {
            return content;
        }
        // Walk the subtree's ordinals, tracking both sub-indices.
        let mut element = self.node_kinds.rank1(range.start - 1);
        let mut text = self.node_kinds.rank0(range.start - 1);
        for ordinal in range {
            if self.node_kinds.get(ordinal) {
                if self.elements.kind(element) == NodeKind::CData {
                    content.push_str(self.pseudo_attribute(element, 1));
                }
                element += 1;
            } else {
                content.push_str(self.text(text));
                text += 1;
            }
        }
        content
    }

    // ========================================================================
    // Attributes
    // ========================================================================

    /// Attribute positions owned by element ordinal `element`
    pub fn attribute_positions(&self, element: usize) -> Range<usize> {
        let separator = self.attribute_groups.select1(element);
        let first = if element == 0 {
            0
        } else {
            self.attribute_groups.select1(element - 1) + 1
        };
        first..separator
    }

    pub fn has_attributes(&self, element: usize) -> bool {
        let separator = self.attribute_groups.select1(element);
        separator != 0 && !self.attribute_groups.get(separator - 1)
    }

    /// Number of attributes owned by element ordinal `element`
    pub fn attributes_len(&self, element: usize) -> usize {
        self.attribute_positions(element).len()
    }

    #[inline]
    fn attribute_ordinal(&self, attr: usize) -> usize {
        assert!(
            !self.attribute_groups.get(attr),
            "position {} is a separator, not an attribute",
            attr
        );
        self.attribute_groups.rank0(attr) - 1
    }

    pub fn attribute_local_name(&self, attr: usize) -> Option<&str> {
        let ordinal = self.attribute_ordinal(attr);
        if self.namespace_aware {
            self.attribute_names.local_name(ordinal)
        } else {
            None
        }
    }

    pub fn attribute_qualified_name(&self, attr: usize) -> Option<Cow<'_, str>> {
        self.attribute_names
            .qualified_name(self.attribute_ordinal(attr))
    }

    pub fn attribute_namespace_uri(&self, attr: usize) -> Option<&str> {
        let ordinal = self.attribute_ordinal(attr);
        if self.namespace_aware {
            self.attribute_names.namespace_uri(ordinal)
        } else {
            None
        }
    }

    pub fn attribute_prefix(&self, attr: usize) -> Option<&str> {
        let ordinal = self.attribute_ordinal(attr);
        if self.namespace_aware {
            self.attribute_names.prefix(ordinal)
        } else {
            None
        }
    }

    pub fn attribute_value(&self, attr: usize) -> &str {
        self.attribute_values.get(self.attribute_ordinal(attr))
    }

    /// Open position of the node that owns the attribute at `attr`
    pub fn attribute_owner(&self, attr: usize) -> usize {
        assert!(
            !self.attribute_groups.get(attr),
            "position {} is a separator, not an attribute",
            attr
        );
        self.element_position(self.attribute_groups.rank1(attr))
    }

    /// Attribute of `element` whose qualified name is `name`
    pub fn find_attribute(&self, element: usize, name: &str) -> Option<usize> {
        self.attribute_positions(element).find(|&attr| {
            self.attribute_names
                .qualified_name_eq(self.attribute_ordinal(attr), name)
        })
    }

    /// Attribute of `element` in namespace `namespace_uri` with local name `local_name`
    pub fn find_attribute_ns(
        &self,
        element: usize,
        namespace_uri: Option<&str>,
        local_name: &str,
    ) -> Option<usize> {
        let namespace_uri = namespace_uri.filter(|uri| !uri.is_empty());
        self.attribute_positions(element).find(|&attr| {
            self.attribute_local_name(attr) == Some(local_name)
                && self.attribute_namespace_uri(attr) == namespace_uri
        })
    }

    /// Value of the attribute named `name`, `None` when absent
    pub fn attribute_value_by_name(&self, element: usize, name: &str) -> Option<&str> {
        self.find_attribute(element, name)
            .map(|attr| self.attribute_value(attr))
    }

    // ========================================================================
    // Descendant search
    // ========================================================================

    /// Descendant elements of `pos` named `name` (`"*"` for all), in document order
    pub fn elements_by_tag_name(&self, pos: usize, name: &str) -> Vec<usize> {
        self.descendant_elements(pos, |element| {
            name == WILDCARD || self.elements.qualified_name_eq(element, name)
        })
    }

    /// Descendant elements of `pos` matching a namespace and local name
    ///
    /// Either argument may be `"*"`.
    pub fn elements_by_tag_name_ns(
        &self,
        pos: usize,
        namespace_uri: Option<&str>,
        local_name: &str,
    ) -> Vec<usize> {
        let namespace_uri = namespace_uri.filter(|uri| !uri.is_empty());
        self.descendant_elements(pos, |element| {
            (namespace_uri == Some(WILDCARD) || self.namespace_uri(element) == namespace_uri)
                && (local_name == WILDCARD || self.local_name(element) == Some(local_name))
        })
    }

    fn descendant_elements<F>(&self, pos: usize, mut matches: F) -> Vec<usize>
    where
        F: FnMut(usize) -> bool,
    {
        let range = self.descendant_ordinals(pos);
        let mut found = Vec::new();
        if range.is_empty() {
            return found;
        }
        let mut element = self.node_kinds.rank1(range.start - 1);
        for ordinal in range {
            if self.node_kinds.get(ordinal) {
                if self.elements.kind(element) == NodeKind::Element && matches(element) {
                    found.push(self.position(ordinal));
                }
                element += 1;
            }
        }
        found
    }

    /// Bytes held on the heap by every structure of the tree
    pub fn heap_size(&self) -> usize {
        self.topology.heap_size()
            + self.node_kinds.heap_size()
            + self.attribute_groups.heap_size()
            + self.elements.heap_size()
            + self.texts.heap_size()
            + self.attribute_names.heap_size()
            + self.attribute_values.heap_size()
    }
}

/// Iterator over the child positions of a node
#[derive(Debug, Clone)]
pub struct Children<'t> {
    tree: &'t TreeIndex,
    next: Option<usize>,
}

impl Iterator for Children<'_> {
    type Item = usize;

    fn next(&mut self) -> Option<usize> {
        let current = self.next?;
        self.next = self.tree.next_sibling(current);
        Some(current)
    }
}
