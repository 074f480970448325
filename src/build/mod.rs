//! Tree construction
//!
//! [`StreamBuilder`] turns a stream of [`XmlEvent`]s into a frozen
//! [`TreeIndex`]. [`parse_str`] wires it to the XML reader.

pub mod builder;
pub mod events;
pub mod options;

pub use builder::{StreamBuilder, XMLNS_ATTRIBUTE, XMLNS_NAMESPACE_URI};
pub use events::{Attribute, DocumentStart, NamespaceDecl, QName, StartElement, XmlEvent};
pub use options::{BuildOptions, Limits};

use crate::error::Result;
use crate::source::XmlReader;
use crate::tree::TreeIndex;

/// Build a tree from any event sequence
pub fn build_from_events<'a, I>(events: I, options: BuildOptions) -> Result<TreeIndex>
where
    I: IntoIterator<Item = XmlEvent<'a>>,
{
    let mut builder = StreamBuilder::new(options);
    for event in events {
        builder.push(event)?;
    }
    builder.finish()
}

/// Parse XML text into a tree
pub fn parse_str(input: &str, options: BuildOptions) -> Result<TreeIndex> {
    let reader = XmlReader::new(input, options.namespace_aware);
    build_from_events(reader, options)
}

/// Parse UTF-8 encoded XML bytes into a tree
pub fn parse_bytes(input: &[u8], options: BuildOptions) -> Result<TreeIndex> {
    let text = std::str::from_utf8(input)?;
    parse_str(text, options)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    #[test]
    fn test_parse_bytes_rejects_bad_utf8() {
        let err = parse_bytes(b"<a>\xff</a>", BuildOptions::default()).unwrap_err();
        assert_eq!(err.reason(), "invalid_utf8");
    }

    #[test]
    fn test_parse_without_root() {
        let err = parse_str("<!-- nothing -->", BuildOptions::default()).unwrap_err();
        assert_eq!(err, Error::MissingRootElement);
    }

    #[test]
    fn test_parse_overflow() {
        let xml = "<r>".to_string() + &"<a/>".repeat(50) + "</r>";
        let err = parse_str(&xml, BuildOptions::default().with_max_nodes(10)).unwrap_err();
        assert_eq!(err.reason(), "capacity_exceeded");
    }
}
