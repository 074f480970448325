//! Stream Builder
//!
//! Single forward pass over structural events, appending to the raw bit
//! strings and string builders, then frozen into a [`TreeIndex`].
//!
//! Per event:
//!
//! | Event          | parens | node kind | attribute bits            |
//! |----------------|--------|-----------|---------------------------|
//! | document start | `1`    | `1`       | `1`                       |
//! | element start  | `1`    | `1`       | `0` per attribute/ns, `1` |
//! | element end    | `0`    |           |                           |
//! | text           | `10`   | `0`       |                           |
//! | comment, CDATA | `10`   | `1`       | `01`                      |
//! | PI             | `10`   | `1`       | `001`                     |
//! | document end   | `0`    |           |                           |
//!
//! Every counter is checked against its limit before anything is appended,
//! so a failed event leaves the builder unchanged.

use log::{debug, warn};

use super::events::{DocumentStart, StartElement, XmlEvent};
use super::options::BuildOptions;
use crate::bits::BitBuf;
use crate::dict::{ContentDictionaryBuilder, QualifiedNameTableBuilder};
use crate::error::{Counter, Error, Result};
use crate::tree::{DocumentContext, ElementTableBuilder, NodeKind, TreeIndex, TreeParts};

/// Namespace URI bound to `xmlns` attributes
pub const XMLNS_NAMESPACE_URI: &str = "http://www.w3.org/2000/xmlns/";

/// Attribute name (and prefix) used for namespace declarations
pub const XMLNS_ATTRIBUTE: &str = "xmlns";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    /// Waiting for the document start
    Initial,
    /// Between document start and end
    Open,
    /// Document end seen
    Closed,
}

/// Incremental builder for a [`TreeIndex`]
#[derive(Debug)]
pub struct StreamBuilder {
    options: BuildOptions,
    phase: Phase,
    /// Nodes currently open, the document included
    depth: usize,
    parens: BitBuf,
    node_kinds: BitBuf,
    attribute_groups: BitBuf,
    elements: ElementTableBuilder,
    texts: ContentDictionaryBuilder,
    attribute_names: QualifiedNameTableBuilder,
    attribute_values: ContentDictionaryBuilder,
    context: DocumentContext,
    default_namespace: Option<String>,
}

/// `None` for absent or empty strings
fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty())
}

impl StreamBuilder {
    pub fn new(options: BuildOptions) -> Self {
        StreamBuilder {
            options,
            phase: Phase::Initial,
            depth: 0,
            parens: BitBuf::with_capacity(1024),
            node_kinds: BitBuf::with_capacity(512),
            attribute_groups: BitBuf::with_capacity(512),
            elements: ElementTableBuilder::new(),
            texts: ContentDictionaryBuilder::new(),
            attribute_names: QualifiedNameTableBuilder::new(),
            attribute_values: ContentDictionaryBuilder::new(),
            context: DocumentContext::default(),
            default_namespace: None,
        }
    }

    /// Nodes appended so far
    pub fn node_count(&self) -> usize {
        self.node_kinds.len()
    }

    /// Nodes currently open, the document included
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Feed one event
    pub fn push(&mut self, event: XmlEvent<'_>) -> Result<()> {
        match event {
            XmlEvent::StartDocument(start) => self.start_document(&start),
            XmlEvent::EndDocument => self.end_document(),
            XmlEvent::StartElement(start) => self.start_element(&start),
            XmlEvent::EndElement => self.end_element(),
            XmlEvent::Characters(text) => self.characters(&text),
            XmlEvent::Comment(text) => self.comment(&text),
            XmlEvent::CData(text) => self.cdata(&text),
            XmlEvent::ProcessingInstruction { target, data } => {
                self.processing_instruction(&target, &data)
            }
            XmlEvent::DocType(_) | XmlEvent::EntityReference(_) => Ok(()),
        }
    }

    // ========================================================================
    // Checks
    // ========================================================================

    fn check(&self, counter: Counter, current: usize, add: usize, limit: usize) -> Result<()> {
        if current.saturating_add(add) > limit {
            warn!(
                "tree build stopped: adding {} to {} {} passes the limit of {}",
                add, current, counter, limit
            );
            return Err(Error::CapacityExceeded { counter, limit });
        }
        Ok(())
    }

    /// Verify room for `nodes` new nodes, `parens` positions and `attribute_bits` bits
    fn reserve(&self, nodes: usize, parens: usize, attribute_bits: usize) -> Result<()> {
        let limits = &self.options.limits;
        self.check(Counter::Nodes, self.node_kinds.len(), nodes, limits.max_nodes)?;
        self.check(
            Counter::Parentheses,
            self.parens.len(),
            parens,
            limits.max_parentheses(),
        )?;
        self.check(
            Counter::AttributeBits,
            self.attribute_groups.len(),
            attribute_bits,
            limits.max_attribute_bits,
        )
    }

    fn require_open(&self) -> Result<()> {
        match self.phase {
            Phase::Open => Ok(()),
            Phase::Initial => Err(Error::OutOfOrder("content before document start")),
            Phase::Closed => Err(Error::OutOfOrder("content after document end")),
        }
    }

    // ========================================================================
    // Events
    // ========================================================================

    pub fn start_document(&mut self, start: &DocumentStart<'_>) -> Result<()> {
        if self.phase != Phase::Initial {
            return Err(Error::OutOfOrder("second document start"));
        }
        self.reserve(1, 1, 1)?;

        self.parens.push(true);
        self.node_kinds.push(true);
        self.elements.add_kind(NodeKind::Document);
        self.attribute_groups.push(true);

        self.context = DocumentContext {
            uri: self.options.document_uri.clone(),
            input_encoding: start.input_encoding.as_deref().map(str::to_owned),
            xml_encoding: start.xml_encoding.as_deref().map(str::to_owned),
            xml_version: start.version.as_deref().unwrap_or("1.0").to_owned(),
            standalone: start.standalone,
        };
        self.depth = 1;
        self.phase = Phase::Open;
        Ok(())
    }

    pub fn start_element(&mut self, start: &StartElement<'_>) -> Result<()> {
        self.require_open()?;
        let attribute_bits = start.attributes.len() + start.namespaces.len() + 1;
        self.reserve(1, 1, attribute_bits)?;

        self.parens.push(true);
        self.node_kinds.push(true);
        self.elements.add_element(
            non_empty(start.name.namespace_uri()),
            non_empty(start.name.prefix()),
            &start.name.local_name,
        );

        for attr in &start.attributes {
            self.attribute_groups.push(false);
            self.attribute_names.add(
                non_empty(attr.name.namespace_uri()),
                non_empty(attr.name.prefix()),
                Some(attr.name.local_name.as_ref()),
            );
            self.attribute_values.add(&attr.value);
        }

        // Namespace declarations are stored as xmlns attributes.
        for decl in &start.namespaces {
            let prefix = non_empty(decl.prefix.as_deref());
            self.attribute_groups.push(false);
            self.attribute_names.add(
                Some(XMLNS_NAMESPACE_URI),
                prefix.map(|_| XMLNS_ATTRIBUTE),
                Some(prefix.unwrap_or(XMLNS_ATTRIBUTE)),
            );
            self.attribute_values.add(&decl.uri);
            if prefix.is_none() && self.default_namespace.is_none() && self.options.namespace_aware {
                self.default_namespace = Some(decl.uri.to_string());
            }
        }

        self.attribute_groups.push(true);
        self.depth += 1;
        Ok(())
    }

    pub fn end_element(&mut self) -> Result<()> {
        self.require_open()?;
        if self.depth <= 1 {
            return Err(Error::Unbalanced { open: 0 });
        }
        self.reserve(0, 1, 0)?;
        self.parens.push(false);
        self.depth -= 1;
        Ok(())
    }

    pub fn end_document(&mut self) -> Result<()> {
        self.require_open()?;
        if self.depth != 1 {
            return Err(Error::Unbalanced {
                open: self.depth - 1,
            });
        }
        self.reserve(0, 1, 0)?;
        self.parens.push(false);
        self.depth = 0;
        self.phase = Phase::Closed;
        Ok(())
    }

    pub fn characters(&mut self, text: &str) -> Result<()> {
        self.require_open()?;
        self.reserve(1, 2, 0)?;
        self.parens.push(true);
        self.parens.push(false);
        self.node_kinds.push(false);
        self.texts.add(text);
        Ok(())
    }

    pub fn comment(&mut self, text: &str) -> Result<()> {
        self.pseudo_node(NodeKind::Comment, &[text])
    }

    pub fn cdata(&mut self, text: &str) -> Result<()> {
        self.pseudo_node(NodeKind::CData, &[text])
    }

    pub fn processing_instruction(&mut self, target: &str, data: &str) -> Result<()> {
        self.pseudo_node(NodeKind::ProcessingInstruction, &[target, data])
    }

    /// Leaf non-text node whose data is stored as nameless attributes
    fn pseudo_node(&mut self, kind: NodeKind, values: &[&str]) -> Result<()> {
        debug_assert_eq!(kind.pseudo_attribute_count(), values.len());
        self.require_open()?;
        self.reserve(1, 2, values.len() + 1)?;

        self.parens.push(true);
        self.parens.push(false);
        self.node_kinds.push(true);
        self.elements.add_kind(kind);
        for value in values {
            self.attribute_groups.push(false);
            self.attribute_names.add_empty();
            self.attribute_values.add(value);
        }
        self.attribute_groups.push(true);
        Ok(())
    }

    // ========================================================================
    // Freeze
    // ========================================================================

    /// Freeze every structure into a [`TreeIndex`]
    pub fn finish(self) -> Result<TreeIndex> {
        match self.phase {
            Phase::Closed => {}
            Phase::Initial => return Err(Error::OutOfOrder("document never started")),
            Phase::Open => return Err(Error::Unbalanced { open: self.depth }),
        }

        let tree = TreeIndex::new(TreeParts {
            parens: self.parens.freeze(),
            node_kinds: self.node_kinds.freeze(),
            attribute_groups: self.attribute_groups.freeze(),
            elements: self.elements.finish(),
            texts: self.texts.finish(),
            attribute_names: self.attribute_names.finish(),
            attribute_values: self.attribute_values.finish(),
            context: self.context,
            default_namespace: self.default_namespace,
            namespace_aware: self.options.namespace_aware,
        })?;

        debug!(
            "tree built: {} nodes ({} non-text, {} text), {} attributes, {} bytes",
            tree.node_count(),
            tree.element_count(),
            tree.text_count(),
            tree.attribute_count(),
            tree.heap_size()
        );
        Ok(tree)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::build::events::QName;
    use crate::build::{build_from_events, Limits};
    use std::borrow::Cow;

    fn catalog_events() -> Vec<XmlEvent<'static>> {
        vec![
            XmlEvent::StartDocument(DocumentStart::default()),
            XmlEvent::StartElement(StartElement::new(QName::local("catalog"))),
            XmlEvent::StartElement(
                StartElement::new(QName::local("book")).with_attribute(QName::local("id"), "101"),
            ),
            XmlEvent::Characters(Cow::Borrowed("XML Developer's Guide")),
            XmlEvent::EndElement,
            XmlEvent::EndElement,
            XmlEvent::EndDocument,
        ]
    }

    #[test]
    fn test_catalog_from_events() {
        let tree = build_from_events(catalog_events(), BuildOptions::default()).unwrap();
        let root = tree.document_element();
        let root_e = tree.element_ordinal(root).unwrap();
        assert_eq!(tree.qualified_name(root_e), "catalog");

        let children = tree.child_positions(root);
        assert_eq!(children.len(), 1);
        let book = tree.element_ordinal(children[0]).unwrap();
        assert_eq!(tree.attribute_value_by_name(book, "id"), Some("101"));
        assert_eq!(tree.attribute_value_by_name(book, "missing"), None);
        assert_eq!(tree.text_content(children[0]), "XML Developer's Guide");

        assert_eq!(tree.node_count(), 4);
        assert_eq!(tree.element_count(), 3);
        assert_eq!(tree.attribute_count(), 1);
        assert_eq!(tree.context().xml_version(), "1.0");
    }

    #[test]
    fn test_bit_layout() {
        let mut builder = StreamBuilder::new(BuildOptions::default());
        for event in catalog_events() {
            builder.push(event).unwrap();
        }
        let bits = |buf: &BitBuf| -> String {
            (0..buf.len()).map(|i| if buf.get(i) { '1' } else { '0' }).collect()
        };
        assert_eq!(bits(&builder.parens), "11110000");
        assert_eq!(bits(&builder.node_kinds), "1110");
        assert_eq!(bits(&builder.attribute_groups), "1101");
    }

    #[test]
    fn test_pseudo_node_bits() {
        let mut builder = StreamBuilder::new(BuildOptions::default());
        builder.start_document(&DocumentStart::default()).unwrap();
        builder
            .start_element(&StartElement::new(QName::local("r")))
            .unwrap();
        builder.comment("c").unwrap();
        builder.processing_instruction("t", "d").unwrap();
        builder.cdata("x").unwrap();
        builder.end_element().unwrap();
        builder.end_document().unwrap();
        let bits = |buf: &BitBuf| -> String {
            (0..buf.len()).map(|i| if buf.get(i) { '1' } else { '0' }).collect()
        };
        // document, r, comment, PI, CDATA
        assert_eq!(bits(&builder.attribute_groups), "110100101");

        let tree = builder.finish().unwrap();
        let kinds: Vec<NodeKind> = tree
            .children(tree.document_element())
            .map(|p| tree.kind(p))
            .collect();
        assert_eq!(
            kinds,
            [NodeKind::Comment, NodeKind::ProcessingInstruction, NodeKind::CData]
        );
    }

    #[test]
    fn test_overflow_reports_capacity() {
        let options = BuildOptions::default().with_max_nodes(3);
        let mut builder = StreamBuilder::new(options);
        builder.start_document(&DocumentStart::default()).unwrap();
        builder
            .start_element(&StartElement::new(QName::local("a")))
            .unwrap();
        builder
            .start_element(&StartElement::new(QName::local("b")))
            .unwrap();
        let err = builder
            .start_element(&StartElement::new(QName::local("c")))
            .unwrap_err();
        assert_eq!(
            err,
            Error::CapacityExceeded {
                counter: Counter::Nodes,
                limit: 3
            }
        );
        // The failed event left nothing behind.
        assert_eq!(builder.node_count(), 3);
        assert_eq!(builder.depth(), 3);
        assert!(builder.characters("x").is_err());
    }

    #[test]
    fn test_attribute_bit_limit() {
        let options = BuildOptions::default().with_limits(Limits {
            max_nodes: 100,
            max_attribute_bits: 2,
        });
        let start = StartElement::new(QName::local("a"))
            .with_attribute(QName::local("x"), "1")
            .with_attribute(QName::local("y"), "2");
        let mut builder = StreamBuilder::new(options);
        builder.start_document(&DocumentStart::default()).unwrap();
        let err = builder.start_element(&start).unwrap_err();
        assert!(matches!(
            err,
            Error::CapacityExceeded {
                counter: Counter::AttributeBits,
                ..
            }
        ));
    }

    #[test]
    fn test_order_errors() {
        let mut builder = StreamBuilder::new(BuildOptions::default());
        assert_eq!(
            builder.characters("x"),
            Err(Error::OutOfOrder("content before document start"))
        );
        builder.start_document(&DocumentStart::default()).unwrap();
        assert_eq!(
            builder.start_document(&DocumentStart::default()),
            Err(Error::OutOfOrder("second document start"))
        );
        assert_eq!(builder.end_element(), Err(Error::Unbalanced { open: 0 }));
        builder
            .start_element(&StartElement::new(QName::local("a")))
            .unwrap();
        assert_eq!(builder.end_document(), Err(Error::Unbalanced { open: 1 }));
        assert!(matches!(builder.finish(), Err(Error::Unbalanced { open: 2 })));
    }

    #[test]
    fn test_missing_root_element() {
        let events = vec![
            XmlEvent::StartDocument(DocumentStart::default()),
            XmlEvent::Comment(Cow::Borrowed("only a comment")),
            XmlEvent::EndDocument,
        ];
        let err = build_from_events(events, BuildOptions::default()).unwrap_err();
        assert_eq!(err, Error::MissingRootElement);
    }

    #[test]
    fn test_ignorable_events() {
        let mut events = catalog_events();
        events.insert(1, XmlEvent::DocType(Cow::Borrowed("catalog")));
        events.insert(3, XmlEvent::EntityReference(Cow::Borrowed("ent")));
        let tree = build_from_events(events, BuildOptions::default()).unwrap();
        assert_eq!(tree.node_count(), 4);
    }

    #[test]
    fn test_document_context() {
        let start = DocumentStart {
            input_encoding: Some(Cow::Borrowed("UTF-8")),
            xml_encoding: Some(Cow::Borrowed("utf-8")),
            version: Some(Cow::Borrowed("1.1")),
            standalone: true,
        };
        let mut events = catalog_events();
        events[0] = XmlEvent::StartDocument(start);
        let options = BuildOptions::default().with_document_uri("file:///catalog.xml");
        let tree = build_from_events(events, options).unwrap();
        let ctx = tree.context();
        assert_eq!(ctx.uri(), Some("file:///catalog.xml"));
        assert_eq!(ctx.input_encoding(), Some("UTF-8"));
        assert_eq!(ctx.xml_encoding(), Some("utf-8"));
        assert_eq!(ctx.xml_version(), "1.1");
        assert!(ctx.is_standalone());
    }

    #[test]
    fn test_first_default_namespace_wins() {
        let events = vec![
            XmlEvent::StartDocument(DocumentStart::default()),
            XmlEvent::StartElement(
                StartElement::new(QName::namespaced(Some("urn:a"), None::<&str>, "r"))
                    .with_namespace(Some("p"), "urn:p")
                    .with_namespace(None::<&str>, "urn:a"),
            ),
            XmlEvent::StartElement(
                StartElement::new(QName::namespaced(Some("urn:b"), None::<&str>, "c"))
                    .with_namespace(None::<&str>, "urn:b"),
            ),
            XmlEvent::EndElement,
            XmlEvent::EndElement,
            XmlEvent::EndDocument,
        ];
        let tree = build_from_events(events, BuildOptions::default()).unwrap();
        assert_eq!(tree.default_namespace(), Some("urn:a"));
        assert!(tree.is_default_namespace(Some("urn:a")));
        assert!(!tree.is_default_namespace(Some("urn:b")));
    }
}
