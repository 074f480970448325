//! Frozen tree and its read API
//!
//! - [`TreeIndex`]: composition of the succinct structures, navigation by position
//! - [`Node`] / [`Attr`]: copyable `(tree, position)` views
//! - [`batch`]: parallel reads over one shared tree

pub mod batch;
pub mod context;
pub mod elements;
pub mod index;
pub mod kind;
pub mod view;

pub use context::DocumentContext;
pub use elements::{ElementTable, ElementTableBuilder};
pub use index::{Children, TreeIndex, DOCUMENT_POSITION, WILDCARD};
pub(crate) use index::TreeParts;
pub use kind::{NodeKind, MAX_TYPE_TAG};
pub use view::{Attr, Node};
