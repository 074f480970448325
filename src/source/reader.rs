//! Lenient pull reader producing [`XmlEvent`]s
//!
//! Never fails. Recoveries:
//! - text and CDATA outside the root element are dropped
//! - end tags matching no open element are dropped
//! - end tags closing an outer element first close the inner ones
//! - elements still open at end of input are closed
//! - a `<` that starts no markup is read as text

use std::borrow::Cow;

use log::{debug, trace};

use super::entities::decode;
use super::namespace::{split_name, NamespaceScopes};
use super::scanner::{is_whitespace, Scanner};
use crate::build::events::{Attribute, DocumentStart, NamespaceDecl, QName, StartElement, XmlEvent};

/// Encoding of the text the reader is handed
pub const INPUT_ENCODING: &str = "UTF-8";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Prolog,
    Body,
    Done,
}

/// Pull reader over XML text
pub struct XmlReader<'a> {
    scanner: Scanner<'a>,
    namespace_aware: bool,
    scopes: NamespaceScopes<'a>,
    /// Raw names of the open elements
    open: Vec<&'a str>,
    /// End events owed before reading further
    pending_ends: usize,
    state: State,
}

impl<'a> XmlReader<'a> {
    pub fn new(input: &'a str, namespace_aware: bool) -> Self {
        XmlReader {
            scanner: Scanner::new(input),
            namespace_aware,
            scopes: NamespaceScopes::new(),
            open: Vec::new(),
            pending_ends: 0,
            state: State::Prolog,
        }
    }

    /// Elements currently open
    pub fn depth(&self) -> usize {
        self.open.len()
    }

    fn close_one(&mut self) -> XmlEvent<'a> {
        self.open.pop();
        if self.namespace_aware {
            self.scopes.pop_scope();
        }
        XmlEvent::EndElement
    }

    /// `StartDocument`, consuming an XML declaration when there is one
    fn read_prolog(&mut self) -> XmlEvent<'a> {
        let mut start = DocumentStart {
            input_encoding: Some(Cow::Borrowed(INPUT_ENCODING)),
            ..DocumentStart::default()
        };
        let is_declaration = self.scanner.starts_with("<?xml")
            && self.scanner.peek_at(5).is_some_and(|b| is_whitespace(b) || b == b'?');
        if is_declaration {
            let body_start = self.scanner.position() + 5;
            let end = self.scanner.find_from(body_start, "?>");
            let body_end = end.unwrap_or(self.scanner.len());
            for (name, value) in parse_attributes(self.scanner.slice(body_start, body_end)) {
                match name {
                    "version" => start.version = Some(value),
                    "encoding" => start.xml_encoding = Some(value),
                    "standalone" => start.standalone = value == "yes",
                    _ => {}
                }
            }
            self.scanner.set_position(end.map_or(body_end, |e| e + 2));
        }
        XmlEvent::StartDocument(start)
    }

    /// Markup or text at the cursor; `None` when it was dropped
    fn read_item(&mut self) -> Option<XmlEvent<'a>> {
        if !self.scanner.starts_with("<") {
            return self.read_text(self.scanner.position());
        }
        if self.scanner.starts_with("<!--") {
            let body = self.read_delimited(4, "-->");
            return Some(XmlEvent::Comment(Cow::Borrowed(body)));
        }
        if self.scanner.starts_with("<![CDATA[") {
            let body = self.read_delimited(9, "]]>");
            if self.open.is_empty() {
                trace!("dropping CDATA outside the root element");
                return None;
            }
            return Some(XmlEvent::CData(Cow::Borrowed(body)));
        }
        if self.scanner.starts_with("<!DOCTYPE") {
            let start = self.scanner.position() + 9;
            let end = self.scanner.find_doctype_end().unwrap_or(self.scanner.len());
            let body = self.scanner.slice(start.min(end), end).trim();
            self.scanner.set_position(end + 1);
            return Some(XmlEvent::DocType(Cow::Borrowed(body)));
        }
        if self.scanner.starts_with("<!") {
            let end = self.scanner.find_tag_end_quoted().unwrap_or(self.scanner.len());
            trace!("skipping markup declaration");
            self.scanner.set_position(end + 1);
            return None;
        }
        if self.scanner.starts_with("<?") {
            return Some(self.read_processing_instruction());
        }
        if self.scanner.starts_with("</") {
            return self.read_end_tag();
        }
        self.read_start_tag()
    }

    /// Body between an opener of `skip` bytes and `close`; runs to end of input when unclosed
    fn read_delimited(&mut self, skip: usize, close: &str) -> &'a str {
        let start = self.scanner.position() + skip;
        match self.scanner.find_from(start, close) {
            Some(end) => {
                self.scanner.set_position(end + close.len());
                self.scanner.slice(start, end)
            }
            None => {
                let end = self.scanner.len();
                self.scanner.set_position(end);
                self.scanner.slice(start.min(end), end)
            }
        }
    }

    fn read_processing_instruction(&mut self) -> XmlEvent<'a> {
        let body = self.read_delimited(2, "?>");
        let (target, data) = match body.find(|c: char| c.is_ascii_whitespace()) {
            Some(split) => (&body[..split], body[split..].trim_start()),
            None => (body, ""),
        };
        XmlEvent::ProcessingInstruction {
            target: Cow::Borrowed(target),
            data: Cow::Borrowed(data),
        }
    }

    /// Text up to the next `<` after `from`
    fn read_text(&mut self, from: usize) -> Option<XmlEvent<'a>> {
        let start = self.scanner.position();
        let end = self
            .scanner
            .find_byte_from(from, b'<')
            .unwrap_or(self.scanner.len());
        self.scanner.set_position(end);
        if self.open.is_empty() {
            return None;
        }
        let raw = self.scanner.slice(start, end);
        Some(XmlEvent::Characters(decode(raw)))
    }

    fn read_end_tag(&mut self) -> Option<XmlEvent<'a>> {
        let tag_end = self.scanner.find_tag_end_quoted();
        self.scanner.advance(2);
        let name = self.scanner.read_name();
        self.scanner
            .set_position(tag_end.map_or(self.scanner.len(), |e| e + 1));

        let depth = match name {
            Some(name) => self.open.iter().rposition(|&open| open == name),
            None => None,
        };
        match depth {
            Some(depth) => {
                let inner = self.open.len() - depth - 1;
                if inner > 0 {
                    debug!("end tag </{}> closes {} unclosed element(s)", self.open[depth], inner);
                }
                self.pending_ends = inner;
                Some(self.close_one())
            }
            None => {
                trace!("dropping unmatched end tag");
                None
            }
        }
    }

    fn read_start_tag(&mut self) -> Option<XmlEvent<'a>> {
        let tag_start = self.scanner.position();
        self.scanner.advance(1);
        let Some(name) = self.scanner.read_name() else {
            self.scanner.set_position(tag_start);
            return self.read_text(tag_start + 1);
        };
        let tag_end = self.scanner.find_tag_end_quoted();
        let content_end = tag_end.unwrap_or(self.scanner.len());
        let mut content = self.scanner.slice(self.scanner.position(), content_end);
        let self_closing = content.ends_with('/');
        if self_closing {
            content = &content[..content.len() - 1];
        }
        self.scanner.set_position(content_end + 1);

        let raw_attributes = parse_attributes(content);
        let start = if self.namespace_aware {
            self.resolve_start(name, raw_attributes)
        } else {
            StartElement {
                name: QName::local(name),
                attributes: raw_attributes
                    .into_iter()
                    .map(|(name, value)| Attribute::new(QName::local(name), value))
                    .collect(),
                namespaces: Vec::new(),
            }
        };

        self.open.push(name);
        if self_closing {
            self.pending_ends = 1;
        }
        Some(XmlEvent::StartElement(start))
    }

    /// Open a namespace scope for `name` and resolve its names in it
    fn resolve_start(
        &mut self,
        name: &'a str,
        raw_attributes: Vec<(&'a str, Cow<'a, str>)>,
    ) -> StartElement<'a> {
        self.scopes.push_scope();
        let mut namespaces = Vec::new();
        let mut attributes = Vec::with_capacity(raw_attributes.len());
        for (attr_name, value) in raw_attributes {
            let declared = match split_name(attr_name) {
                (None, "xmlns") => Some(None),
                (Some("xmlns"), prefix) => Some(Some(prefix)),
                _ => None,
            };
            match declared {
                Some(prefix) => {
                    self.scopes.declare(prefix, value.clone());
                    namespaces.push(NamespaceDecl {
                        prefix: prefix.map(Cow::Borrowed),
                        uri: value,
                    });
                }
                None => attributes.push((attr_name, value)),
            }
        }

        let attributes = attributes
            .into_iter()
            .map(|(attr_name, value)| {
                let (prefix, local) = split_name(attr_name);
                // Unprefixed attributes are in no namespace.
                let uri = prefix.and_then(|p| self.scopes.resolve(Some(p)));
                Attribute::new(
                    QName {
                        namespace_uri: uri,
                        prefix: prefix.map(Cow::Borrowed),
                        local_name: Cow::Borrowed(local),
                    },
                    value,
                )
            })
            .collect();

        let (prefix, local) = split_name(name);
        StartElement {
            name: QName {
                namespace_uri: self.scopes.resolve(prefix),
                prefix: prefix.map(Cow::Borrowed),
                local_name: Cow::Borrowed(local),
            },
            attributes,
            namespaces,
        }
    }
}

impl<'a> Iterator for XmlReader<'a> {
    type Item = XmlEvent<'a>;

    fn next(&mut self) -> Option<XmlEvent<'a>> {
        loop {
            match self.state {
                State::Done => return None,
                State::Prolog => {
                    self.state = State::Body;
                    return Some(self.read_prolog());
                }
                State::Body => {}
            }
            if self.pending_ends > 0 {
                self.pending_ends -= 1;
                return Some(self.close_one());
            }
            if self.scanner.is_eof() {
                if !self.open.is_empty() {
                    debug!("closing {} element(s) left open at end of input", self.open.len());
                    self.pending_ends = self.open.len();
                    continue;
                }
                self.state = State::Done;
                return Some(XmlEvent::EndDocument);
            }
            if let Some(event) = self.read_item() {
                return Some(event);
            }
        }
    }
}

/// `name="value"` pairs of a start tag or XML declaration, values decoded
///
/// A name without `=` gets an empty value; anything unparseable ends the list.
pub fn parse_attributes(input: &str) -> Vec<(&str, Cow<'_, str>)> {
    let mut attrs = Vec::new();
    let mut scanner = Scanner::new(input);
    loop {
        scanner.skip_whitespace();
        let Some(name) = scanner.read_name() else {
            break;
        };
        scanner.skip_whitespace();
        if scanner.peek_at(0) != Some(b'=') {
            attrs.push((name, Cow::Borrowed("")));
            continue;
        }
        scanner.advance(1);
        scanner.skip_whitespace();
        let quote = match scanner.peek_at(0) {
            Some(q @ (b'"' | b'\'')) => q,
            _ => break,
        };
        let start = scanner.position() + 1;
        let Some(end) = scanner.find_byte_from(start, quote) else {
            break;
        };
        attrs.push((name, decode(scanner.slice(start, end))));
        scanner.set_position(end + 1);
    }
    attrs
}
