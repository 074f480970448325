//! Structural events
//!
//! The input of [`StreamBuilder`](super::StreamBuilder). Any source can
//! produce them; [`XmlReader`](crate::source::XmlReader) does so for XML text.

use std::borrow::Cow;

/// One step of a document, in document order
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum XmlEvent<'a> {
    /// Start of the document, with whatever the XML declaration said
    StartDocument(DocumentStart<'a>),
    /// End of the document
    EndDocument,
    /// Start of an element: <name attrs...>
    StartElement(StartElement<'a>),
    /// End of the most recently started element
    EndElement,
    /// Character data between tags
    Characters(Cow<'a, str>),
    /// Comment body
    Comment(Cow<'a, str>),
    /// CDATA section body
    CData(Cow<'a, str>),
    /// Processing instruction: <?target data?>
    ProcessingInstruction {
        target: Cow<'a, str>,
        data: Cow<'a, str>,
    },
    /// DOCTYPE declaration, accepted and ignored
    DocType(Cow<'a, str>),
    /// Unresolved entity reference, accepted and ignored
    EntityReference(Cow<'a, str>),
}

/// Document start event data
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DocumentStart<'a> {
    /// Encoding the input was read in
    pub input_encoding: Option<Cow<'a, str>>,
    /// `encoding` pseudo-attribute of the XML declaration
    pub xml_encoding: Option<Cow<'a, str>>,
    /// `version` pseudo-attribute of the XML declaration
    pub version: Option<Cow<'a, str>>,
    /// `standalone="yes"`
    pub standalone: bool,
}

/// A namespace-qualified name
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QName<'a> {
    /// Resolved namespace URI, if any
    pub namespace_uri: Option<Cow<'a, str>>,
    /// Namespace prefix (before colon), if any
    pub prefix: Option<Cow<'a, str>>,
    /// Local name (after colon), or the raw name when namespaces are off
    pub local_name: Cow<'a, str>,
}

impl<'a> QName<'a> {
    /// Unqualified name
    pub fn local(name: impl Into<Cow<'a, str>>) -> Self {
        QName {
            namespace_uri: None,
            prefix: None,
            local_name: name.into(),
        }
    }

    /// Name in a namespace
    pub fn namespaced(
        namespace_uri: Option<impl Into<Cow<'a, str>>>,
        prefix: Option<impl Into<Cow<'a, str>>>,
        local_name: impl Into<Cow<'a, str>>,
    ) -> Self {
        QName {
            namespace_uri: namespace_uri.map(Into::into),
            prefix: prefix.map(Into::into),
            local_name: local_name.into(),
        }
    }

    pub fn namespace_uri(&self) -> Option<&str> {
        self.namespace_uri.as_deref()
    }

    pub fn prefix(&self) -> Option<&str> {
        self.prefix.as_deref()
    }

    /// `prefix:local` or `local`
    pub fn qualified(&self) -> Cow<'_, str> {
        match &self.prefix {
            Some(prefix) => Cow::Owned(format!("{}:{}", prefix, self.local_name)),
            None => Cow::Borrowed(&self.local_name),
        }
    }
}

/// An attribute on a start tag
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute<'a> {
    pub name: QName<'a>,
    /// Value with references already decoded
    pub value: Cow<'a, str>,
}

impl<'a> Attribute<'a> {
    pub fn new(name: QName<'a>, value: impl Into<Cow<'a, str>>) -> Self {
        Attribute {
            name,
            value: value.into(),
        }
    }
}

/// A namespace declared on a start tag (`xmlns` or `xmlns:prefix`)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamespaceDecl<'a> {
    /// Declared prefix, `None` for the default namespace
    pub prefix: Option<Cow<'a, str>>,
    pub uri: Cow<'a, str>,
}

/// Start element event data
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StartElement<'a> {
    pub name: QName<'a>,
    /// Ordinary attributes, in source order
    pub attributes: Vec<Attribute<'a>>,
    /// Namespace declarations made on this element, in source order
    pub namespaces: Vec<NamespaceDecl<'a>>,
}

impl<'a> StartElement<'a> {
    /// Element without attributes
    pub fn new(name: QName<'a>) -> Self {
        StartElement {
            name,
            attributes: Vec::new(),
            namespaces: Vec::new(),
        }
    }

    /// Add an attribute (builder style)
    pub fn with_attribute(mut self, name: QName<'a>, value: impl Into<Cow<'a, str>>) -> Self {
        self.attributes.push(Attribute::new(name, value));
        self
    }

    /// Add a namespace declaration (builder style)
    pub fn with_namespace(
        mut self,
        prefix: Option<impl Into<Cow<'a, str>>>,
        uri: impl Into<Cow<'a, str>>,
    ) -> Self {
        self.namespaces.push(NamespaceDecl {
            prefix: prefix.map(Into::into),
            uri: uri.into(),
        });
        self
    }

    /// Value of the attribute with qualified name `name`
    pub fn get_attribute_value(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|a| a.name.qualified() == name)
            .map(|a| a.value.as_ref())
    }
}

impl XmlEvent<'_> {
    /// True for events that carry no structure
    pub fn is_ignorable(&self) -> bool {
        matches!(self, XmlEvent::DocType(_) | XmlEvent::EntityReference(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_qualified_name() {
        assert_eq!(QName::local("book").qualified(), "book");
        let name = QName::namespaced(Some("urn:x"), Some("x"), "lang");
        assert_eq!(name.qualified(), "x:lang");
        assert_eq!(name.namespace_uri(), Some("urn:x"));
    }

    #[test]
    fn test_start_element_builder() {
        let start = StartElement::new(QName::local("book"))
            .with_attribute(QName::local("id"), "101")
            .with_namespace(None::<&str>, "urn:books");
        assert_eq!(start.get_attribute_value("id"), Some("101"));
        assert_eq!(start.get_attribute_value("missing"), None);
        assert_eq!(start.namespaces.len(), 1);
        assert!(XmlEvent::DocType(Cow::Borrowed("html")).is_ignorable());
        assert!(!XmlEvent::EndElement.is_ignorable());
    }
}
