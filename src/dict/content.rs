//! Content Dictionary
//!
//! Character content (text nodes, attribute values, pseudo-attribute
//! values) addressed by ordinal. All values live back to back in one
//! buffer; entry `i` spans `offset[i]..offset[i + 1]`, and a trailing
//! sentinel offset gives the last entry its end.
//!
//! Lengths and substring offsets count UTF-8 bytes.

use crate::bits::CompactIntArray;

/// Append-only builder for a [`ContentDictionary`]
#[derive(Debug, Default)]
pub struct ContentDictionaryBuilder {
    data: String,
    offsets: Vec<u64>,
}

impl ContentDictionaryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a value, returning its ordinal
    pub fn add(&mut self, value: &str) -> usize {
        let ordinal = self.offsets.len();
        self.offsets.push(self.data.len() as u64);
        self.data.push_str(value);
        ordinal
    }

    /// Number of values added so far
    pub fn len(&self) -> usize {
        self.offsets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.offsets.is_empty()
    }

    /// Freeze into a read-only dictionary
    pub fn finish(mut self) -> ContentDictionary {
        self.offsets.push(self.data.len() as u64);
        self.data.shrink_to_fit();
        ContentDictionary {
            offsets: CompactIntArray::new(&self.offsets, self.data.len() as u64),
            data: self.data,
        }
    }
}

/// Frozen content store
#[derive(Debug, Clone)]
pub struct ContentDictionary {
    data: String,
    offsets: CompactIntArray,
}

impl ContentDictionary {
    #[inline]
    fn span(&self, ordinal: usize) -> (usize, usize) {
        assert!(
            ordinal < self.len(),
            "content ordinal {} out of range (len {})",
            ordinal,
            self.len()
        );
        (
            self.offsets.get(ordinal) as usize,
            self.offsets.get(ordinal + 1) as usize,
        )
    }

    /// Full value of entry `ordinal`
    pub fn get(&self, ordinal: usize) -> &str {
        let (start, end) = self.span(ordinal);
        &self.data[start..end]
    }

    /// Byte length of entry `ordinal`
    pub fn length(&self, ordinal: usize) -> usize {
        let (start, end) = self.span(ordinal);
        end - start
    }

    /// Up to `count` bytes of entry `ordinal` starting at byte `offset`
    ///
    /// Returns `None` when `offset` is at or past the end of the value.
    /// Both bounds round down to a character boundary, so consecutive
    /// `(offset, count)` chunks join back into the full value.
    pub fn substring(&self, ordinal: usize, offset: usize, count: usize) -> Option<&str> {
        let (start, end) = self.span(ordinal);
        let value = &self.data[start..end];
        if offset >= value.len() {
            return None;
        }
        let mut from = offset;
        while !value.is_char_boundary(from) {
            from -= 1;
        }
        let mut to = offset.saturating_add(count).min(value.len());
        while !value.is_char_boundary(to) {
            to -= 1;
        }
        Some(&value[from..to])
    }

    /// Number of entries
    pub fn len(&self) -> usize {
        self.offsets.len() - 1
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Total bytes of content
    pub fn content_bytes(&self) -> usize {
        self.data.len()
    }

    pub fn heap_size(&self) -> usize {
        self.data.capacity() + self.offsets.heap_size()
    }
}
