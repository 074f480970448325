//! Frozen string stores
//!
//! - [`NameDictionary`]: deduplicated names with a "no value" index
//! - [`QualifiedNameTable`]: per-row namespace/prefix/local triples
//! - [`ContentDictionary`]: ordinal-addressed character content

pub mod content;
pub mod names;
pub mod qname;

pub use content::{ContentDictionary, ContentDictionaryBuilder};
pub use names::{NameDictionary, NameDictionaryBuilder, NULL_NAME};
pub use qname::{QualifiedNameTable, QualifiedNameTableBuilder};
