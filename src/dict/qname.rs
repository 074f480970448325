//! Qualified Name Table
//!
//! One row per named entity (attribute, pseudo attribute) holding a
//! `(namespace URI, prefix, local name)` triple as dictionary indices.
//! Namespace URI and prefix share one dictionary and one packed column,
//! interleaved as `row * 2` and `row * 2 + 1`.

use std::borrow::Cow;

use super::names::{NameDictionary, NameDictionaryBuilder};
use crate::bits::CompactIntArray;

/// True when `name` equals `prefix:local` (or `local` without a prefix)
pub(crate) fn qualified_eq(prefix: Option<&str>, local: &str, name: &str) -> bool {
    match prefix {
        None => local == name,
        Some(prefix) => {
            name.len() == prefix.len() + 1 + local.len()
                && name.starts_with(prefix)
                && name.as_bytes()[prefix.len()] == b':'
                && name.ends_with(local)
        }
    }
}

/// Builder for a [`QualifiedNameTable`]
#[derive(Debug, Default)]
pub struct QualifiedNameTableBuilder {
    local_names: NameDictionaryBuilder,
    namespaces: NameDictionaryBuilder,
    local_column: Vec<u64>,
    namespace_column: Vec<u64>,
}

impl QualifiedNameTableBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a row, returning its index
    pub fn add(
        &mut self,
        namespace_uri: Option<&str>,
        prefix: Option<&str>,
        local_name: Option<&str>,
    ) -> usize {
        let row = self.local_column.len();
        self.local_column
            .push(u64::from(self.local_names.add(local_name)));
        self.namespace_column
            .push(u64::from(self.namespaces.add(namespace_uri)));
        self.namespace_column
            .push(u64::from(self.namespaces.add(prefix)));
        row
    }

    /// Append a nameless row (used by pseudo attributes)
    pub fn add_empty(&mut self) -> usize {
        self.add(None, None, None)
    }

    pub fn len(&self) -> usize {
        self.local_column.len()
    }

    pub fn is_empty(&self) -> bool {
        self.local_column.is_empty()
    }

    pub fn finish(self) -> QualifiedNameTable {
        QualifiedNameTable {
            local_column: CompactIntArray::new(
                &self.local_column,
                u64::from(self.local_names.max_index()),
            ),
            namespace_column: CompactIntArray::new(
                &self.namespace_column,
                u64::from(self.namespaces.max_index()),
            ),
            local_names: self.local_names.finish(),
            namespaces: self.namespaces.finish(),
        }
    }
}

/// Frozen table of qualified names
#[derive(Debug, Clone)]
pub struct QualifiedNameTable {
    local_names: NameDictionary,
    namespaces: NameDictionary,
    local_column: CompactIntArray,
    namespace_column: CompactIntArray,
}

impl QualifiedNameTable {
    /// Local part of the name
    pub fn local_name(&self, row: usize) -> Option<&str> {
        self.local_names.get(self.local_column.get(row) as u32)
    }

    /// `prefix:local` when a prefix is present, else the local name
    pub fn qualified_name(&self, row: usize) -> Option<Cow<'_, str>> {
        let local = self.local_name(row)?;
        Some(match self.prefix(row) {
            Some(prefix) => Cow::Owned(format!("{}:{}", prefix, local)),
            None => Cow::Borrowed(local),
        })
    }

    /// Compare the row's qualified name against `name` without allocating
    pub fn qualified_name_eq(&self, row: usize, name: &str) -> bool {
        match self.local_name(row) {
            Some(local) => qualified_eq(self.prefix(row), local, name),
            None => false,
        }
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
        self.local_column.len()
    }

    pub fn is_empty(&self) -> bool {
        self.local_column.is_empty()
    }

    pub fn heap_size(&self) -> usize {
        self.local_names.heap_size()
            + self.namespaces.heap_size()
            + self.local_column.heap_size()
            + self.namespace_column.heap_size()
    }
}
