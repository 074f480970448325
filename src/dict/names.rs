//! Name Dictionary
//!
//! Deduplicating store for element names, attribute names, namespace URIs
//! and prefixes. The builder hands out dense indices in insertion order and
//! returns the existing index for a value it has already seen.
//!
//! Index 0 always means "no value", which is distinct from the empty string.
//! A dictionary may reserve further low indices (also "no value") so that a
//! caller can share one integer column between names and small type codes.

use std::collections::HashMap;

use crate::bits::CompactIntArray;

/// Index that maps to "no value"
pub const NULL_NAME: u32 = 0;

/// Append-only builder for a [`NameDictionary`]
#[derive(Debug)]
pub struct NameDictionaryBuilder {
    /// Distinct value -> index
    lookup: HashMap<String, u32>,
    /// All values back to back
    data: String,
    /// Start offset of every index, reserved ones included
    offsets: Vec<u64>,
    reserved: u32,
}

impl Default for NameDictionaryBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl NameDictionaryBuilder {
    /// Builder with only the null index reserved
    pub fn new() -> Self {
        Self::with_reserved(1)
    }

    /// Builder whose indices `0..reserved` all map to "no value"
    pub fn with_reserved(reserved: u32) -> Self {
        let reserved = reserved.max(1);
        NameDictionaryBuilder {
            lookup: HashMap::new(),
            data: String::with_capacity(256),
            offsets: vec![0; reserved as usize],
            reserved,
        }
    }

    /// Intern `value`, returning its index
    pub fn add(&mut self, value: Option<&str>) -> u32 {
        let Some(value) = value else {
            return NULL_NAME;
        };
        if let Some(&index) = self.lookup.get(value) {
            return index;
        }
        let index = self.offsets.len() as u32;
        self.offsets.push(self.data.len() as u64);
        self.data.push_str(value);
        self.lookup.insert(value.to_owned(), index);
        index
    }

    /// Index of an already interned value
    pub fn find(&self, value: &str) -> Option<u32> {
        self.lookup.get(value).copied()
    }

    /// Largest index handed out so far (or the last reserved one)
    pub fn max_index(&self) -> u32 {
        self.offsets.len() as u32 - 1
    }

    /// Number of indices, reserved ones included
    pub fn len(&self) -> usize {
        self.offsets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.offsets.len() == self.reserved as usize
    }

    /// Freeze into a read-only dictionary
    pub fn finish(mut self) -> NameDictionary {
        // Sentinel end offset so every index has a successor.
        self.offsets.push(self.data.len() as u64);
        self.data.shrink_to_fit();
        NameDictionary {
            offsets: CompactIntArray::new(&self.offsets, self.data.len() as u64),
            data: self.data,
            reserved: self.reserved,
        }
    }
}

/// Frozen, randomly addressable name store
#[derive(Debug, Clone)]
pub struct NameDictionary {
    data: String,
    offsets: CompactIntArray,
    reserved: u32,
}

impl NameDictionary {
    /// The value at `index`, `None` for reserved indices
    pub fn get(&self, index: u32) -> Option<&str> {
        assert!(
            (index as usize) < self.len(),
            "name index {} out of range (len {})",
            index,
            self.len()
        );
        if index < self.reserved {
            return None;
        }
        let start = self.offsets.get(index as usize) as usize;
        let end = self.offsets.get(index as usize + 1) as usize;
        Some(&self.data[start..end])
    }

    /// Number of indices, reserved ones included
    pub fn len(&self) -> usize {
        self.offsets.len() - 1
    }

    pub fn is_empty(&self) -> bool {
        self.len() == self.reserved as usize
    }

    /// Number of low indices that map to "no value"
    pub fn reserved(&self) -> u32 {
        self.reserved
    }

    pub fn heap_size(&self) -> usize {
        self.data.capacity() + self.offsets.heap_size()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_dedup() {
        let mut builder = NameDictionaryBuilder::new();
        let a = builder.add(Some("book"));
        let b = builder.add(Some("title"));
        let c = builder.add(Some("book"));
        assert_eq!(a, c);
        assert_ne!(a, b);
        assert_eq!(builder.len(), 3);

        let dict = builder.finish();
        assert_eq!(dict.get(a), Some("book"));
        assert_eq!(dict.get(b), Some("title"));
        assert_eq!(dict.len(), 3);
    }

    #[test]
    fn test_null_differs_from_empty() {
        let mut builder = NameDictionaryBuilder::new();
        assert_eq!(builder.add(None), NULL_NAME);
        let empty = builder.add(Some(""));
        assert_ne!(empty, NULL_NAME);

        let dict = builder.finish();
        assert_eq!(dict.get(NULL_NAME), None);
        assert_eq!(dict.get(empty), Some(""));
    }

    #[test]
    fn test_reserved_indices() {
        let mut builder = NameDictionaryBuilder::with_reserved(13);
        assert_eq!(builder.max_index(), 12);
        assert!(builder.is_empty());
        let first = builder.add(Some("catalog"));
        assert_eq!(first, 13);
        assert_eq!(builder.find("catalog"), Some(13));
        assert_eq!(builder.find("book"), None);

        let dict = builder.finish();
        assert_eq!(dict.get(5), None);
        assert_eq!(dict.get(13), Some("catalog"));
        assert_eq!(dict.reserved(), 13);
    }

    #[test]
    fn test_distinct_count() {
        let mut builder = NameDictionaryBuilder::new();
        for name in ["a", "b", "a", "c", "b", "a"] {
            builder.add(Some(name));
        }
        assert_eq!(builder.finish().len(), 1 + 3);
    }

    #[test]
    fn test_unicode_names() {
        let mut builder = NameDictionaryBuilder::new();
        let idx = builder.add(Some("ñame"));
        let other = builder.add(Some("名前"));
        let dict = builder.finish();
        assert_eq!(dict.get(idx), Some("ñame"));
        assert_eq!(dict.get(other), Some("名前"));
    }
}
