//! Element table
//!
//! One row per non-text node, in element-ordinal order. The code column
//! holds either a node type tag (`<= MAX_TYPE_TAG`) or, for elements, the
//! index of the local name in a dictionary whose low indices are reserved
//! for those tags. Namespace URI and prefix are recorded for every row,
//! named or not, so all columns stay co-indexed.

use std::borrow::Cow;

use super::kind::{NodeKind, MAX_TYPE_TAG};
use crate::bits::CompactIntArray;
use crate::dict::qname::qualified_eq;
use crate::dict::{NameDictionary, NameDictionaryBuilder};

#[derive(Debug)]
pub struct ElementTableBuilder {
    codes: Vec<u64>,
    namespace_column: Vec<u64>,
    local_names: NameDictionaryBuilder,
    namespaces: NameDictionaryBuilder,
}

impl Default for ElementTableBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ElementTableBuilder {
    pub fn new() -> Self {
        ElementTableBuilder {
            codes: Vec::new(),
            namespace_column: Vec::new(),
            local_names: NameDictionaryBuilder::with_reserved(MAX_TYPE_TAG + 1),
            namespaces: NameDictionaryBuilder::new(),
        }
    }

    /// Append an element row
    pub fn add_element(
        &mut self,
        namespace_uri: Option<&str>,
        prefix: Option<&str>,
        local_name: &str,
    ) -> usize {
        let code = self.local_names.add(Some(local_name));
        self.push(u64::from(code), namespace_uri, prefix)
    }

    /// Append a nameless row for a document, comment, CDATA or PI node
    pub fn add_kind(&mut self, kind: NodeKind) -> usize {
        debug_assert!(!matches!(kind, NodeKind::Element | NodeKind::Text));
        self.push(u64::from(kind.tag()), None, None)
    }

    fn push(&mut self, code: u64, namespace_uri: Option<&str>, prefix: Option<&str>) -> usize {
        let row = self.codes.len();
        self.codes.push(code);
        self.namespace_column
            .push(u64::from(self.namespaces.add(namespace_uri)));
        self.namespace_column
            .push(u64::from(self.namespaces.add(prefix)));
        row
    }

    pub fn len(&self) -> usize {
        self.codes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.codes.is_empty()
    }

    pub fn finish(self) -> ElementTable {
        ElementTable {
            codes: CompactIntArray::new(&self.codes, u64::from(self.local_names.max_index())),
            namespace_column: CompactIntArray::new(
                &self.namespace_column,
                u64::from(self.namespaces.max_index()),
            ),
            local_names: self.local_names.finish(),
            namespaces: self.namespaces.finish(),
        }
    }
}

/// Frozen per-row kinds and names of non-text nodes
#[derive(Debug, Clone)]
pub struct ElementTable {
    codes: CompactIntArray,
    namespace_column: CompactIntArray,
    local_names: NameDictionary,
    namespaces: NameDictionary,
}

impl ElementTable {
    /// Kind of the node in `row`
    pub fn kind(&self, row: usize) -> NodeKind {
        let code = self.codes.get(row) as u32;
        if code > MAX_TYPE_TAG {
            return NodeKind::Element;
        }
        match NodeKind::from_tag(code) {
            Some(kind) => kind,
            None => panic!("row {} holds unknown type tag {}", row, code),
        }
    }

    /// Local name of an element row
    ///
    /// # Panics
    ///
    /// Panics if `row` is not an element.
    pub fn local_name(&self, row: usize) -> &str {
        let code = self.codes.get(row) as u32;
        assert!(
            code > MAX_TYPE_TAG,
            "row {} is a {:?}, not an element",
            row,
            NodeKind::from_tag(code)
        );
        self.local_names.get(code).unwrap_or_default()
    }

    /// `prefix:local` for prefixed elements, else the local name
    pub fn qualified_name(&self, row: usize) -> Cow<'_, str> {
        let local = self.local_name(row);
        match self.prefix(row) {
            Some(prefix) => Cow::Owned(format!("{}:{}", prefix, local)),
            None => Cow::Borrowed(local),
        }
    }

    /// Compare an element row's qualified name against `name` without allocating
    pub fn qualified_name_eq(&self, row: usize, name: &str) -> bool {
        qualified_eq(self.prefix(row), self.local_name(row), name)
    }

    pub fn namespace_uri(&self, row: usize) -> Option<&str> {
        self.namespaces
            .get(self.namespace_column.get(row * 2) as u32)
    }

    pub fn prefix(&self, row: usize) -> Option<&str> {
        self.namespaces
            .get(self.namespace_column.get(row * 2 + 1) as u32)
    }

    /// Number of rows
    pub fn len(&self) -> usize {
        self.codes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.codes.is_empty()
    }

    pub fn heap_size(&self) -> usize {
        self.codes.heap_size()
            + self.namespace_column.heap_size()
            + self.local_names.heap_size()
            + self.namespaces.heap_size()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mixed_rows() {
        let mut builder = ElementTableBuilder::new();
        let doc = builder.add_kind(NodeKind::Document);
        let root = builder.add_element(Some("urn:cat"), Some("c"), "catalog");
        let comment = builder.add_kind(NodeKind::Comment);
        let book = builder.add_element(None, None, "book");
        let table = builder.finish();

        assert_eq!(table.len(), 4);
        assert_eq!(table.kind(doc), NodeKind::Document);
        assert_eq!(table.kind(root), NodeKind::Element);
        assert_eq!(table.kind(comment), NodeKind::Comment);
        assert_eq!(table.local_name(root), "catalog");
        assert_eq!(table.qualified_name(root), "c:catalog");
        assert_eq!(table.namespace_uri(root), Some("urn:cat"));
        assert_eq!(table.prefix(root), Some("c"));
        assert_eq!(table.qualified_name(book), "book");
        assert_eq!(table.namespace_uri(comment), None);
    }

    #[test]
    #[should_panic]
    fn test_name_of_comment_panics() {
        let mut builder = ElementTableBuilder::new();
        builder.add_kind(NodeKind::Comment);
        builder.finish().local_name(0);
    }
}
