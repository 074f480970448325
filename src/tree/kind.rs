//! Node kinds
//!
//! Discriminants follow the DOM `nodeType` numbering so the codes stored in
//! the element table are the familiar ones.

/// Largest code that denotes a node type; larger element-table values are names
pub const MAX_TYPE_TAG: u32 = 12;

/// Type of a node in a frozen tree
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    /// Element node
    Element = 1,
    /// Text content
    Text = 3,
    /// CDATA section
    CData = 4,
    /// Processing instruction
    ProcessingInstruction = 7,
    /// Comment
    Comment = 8,
    /// Document root
    Document = 9,
}

impl NodeKind {
    /// Numeric type code
    #[inline]
    pub fn tag(self) -> u32 {
        self as u32
    }

    /// Kind for a stored type code
    pub fn from_tag(tag: u32) -> Option<NodeKind> {
        match tag {
            1 => Some(NodeKind::Element),
            3 => Some(NodeKind::Text),
            4 => Some(NodeKind::CData),
            7 => Some(NodeKind::ProcessingInstruction),
            8 => Some(NodeKind::Comment),
            9 => Some(NodeKind::Document),
            _ => None,
        }
    }

    /// Number of pseudo attributes carrying this node's data
    #[inline]
    pub fn pseudo_attribute_count(self) -> usize {
        match self {
            NodeKind::Comment | NodeKind::CData => 1,
            NodeKind::ProcessingInstruction => 2,
            _ => 0,
        }
    }

    /// DOM-style name for nodes that have no qualified name
    pub fn fixed_name(self) -> Option<&'static str> {
        match self {
            NodeKind::Document => Some("#document"),
            NodeKind::Text => Some("#text"),
            NodeKind::CData => Some("#cdata-section"),
            NodeKind::Comment => Some("#comment"),
            NodeKind::Element | NodeKind::ProcessingInstruction => None,
        }
    }

    /// Atom-friendly lowercase name
    pub fn as_str(self) -> &'static str {
        match self {
            NodeKind::Element => "element",
            NodeKind::Text => "text",
            NodeKind::CData => "cdata",
            NodeKind::ProcessingInstruction => "processing_instruction",
            NodeKind::Comment => "comment",
            NodeKind::Document => "document",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tag_round_trip() {
        for kind in [
            NodeKind::Element,
            NodeKind::Text,
            NodeKind::CData,
            NodeKind::ProcessingInstruction,
            NodeKind::Comment,
            NodeKind::Document,
        ] {
            assert_eq!(NodeKind::from_tag(kind.tag()), Some(kind));
            assert!(kind.tag() <= MAX_TYPE_TAG);
        }
        assert_eq!(NodeKind::from_tag(2), None);
        assert_eq!(NodeKind::from_tag(13), None);
    }

    #[test]
    fn test_pseudo_attribute_count() {
        assert_eq!(NodeKind::Comment.pseudo_attribute_count(), 1);
        assert_eq!(NodeKind::CData.pseudo_attribute_count(), 1);
        assert_eq!(NodeKind::ProcessingInstruction.pseudo_attribute_count(), 2);
        assert_eq!(NodeKind::Element.pseudo_attribute_count(), 0);
    }
}
