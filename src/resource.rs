//! ResourceArc wrapper
//!
//! A frozen tree shared with the BEAM. It is never mutated after parsing,
//! so readers on any scheduler use it without a lock.

use rustler::ResourceArc;

use crate::build::{parse_bytes, BuildOptions};
use crate::error::Result;
use crate::tree::{NodeKind, TreeIndex};

/// A parsed document
pub struct DocumentResource {
    pub tree: TreeIndex,
}

impl DocumentResource {
    pub fn parse(input: &[u8], options: BuildOptions) -> Result<Self> {
        let tree = parse_bytes(input, options)?;
        Ok(DocumentResource { tree })
    }

    /// `pos` is a node position of this tree
    pub fn is_node(&self, pos: usize) -> bool {
        self.tree.is_node(pos)
    }

    /// `pos` is an element position of this tree
    pub fn is_element(&self, pos: usize) -> bool {
        self.is_node(pos) && self.tree.kind(pos) == NodeKind::Element
    }
}

#[rustler::resource_impl]
impl rustler::Resource for DocumentResource {}

/// Type alias for the ResourceArc
pub type DocumentRef = ResourceArc<DocumentResource>;
