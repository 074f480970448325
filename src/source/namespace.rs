//! Namespace scope stack
//!
//! Bindings are pushed with the depth of the element that declared them and
//! popped when that element closes. Lookups search newest first.

use std::borrow::Cow;

pub const XML_PREFIX: &str = "xml";
pub const XML_NAMESPACE_URI: &str = "http://www.w3.org/XML/1998/namespace";

#[derive(Debug, Clone)]
struct Binding<'a> {
    /// `None` binds the default namespace
    prefix: Option<&'a str>,
    /// Empty undeclares
    uri: Cow<'a, str>,
    depth: usize,
}

/// Prefix to URI resolution for the open elements
#[derive(Debug)]
pub struct NamespaceScopes<'a> {
    bindings: Vec<Binding<'a>>,
    depth: usize,
}

impl Default for NamespaceScopes<'_> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'a> NamespaceScopes<'a> {
    pub fn new() -> Self {
        NamespaceScopes {
            bindings: vec![Binding {
                prefix: Some(XML_PREFIX),
                uri: Cow::Borrowed(XML_NAMESPACE_URI),
                depth: 0,
            }],
            depth: 0,
        }
    }

    pub fn push_scope(&mut self) {
        self.depth += 1;
    }

    /// Leave the innermost scope, dropping its bindings
    pub fn pop_scope(&mut self) {
        while self.bindings.last().is_some_and(|b| b.depth >= self.depth && b.depth > 0) {
            self.bindings.pop();
        }
        self.depth = self.depth.saturating_sub(1);
    }

    /// Bind `prefix` (or the default namespace) in the innermost scope
    pub fn declare(&mut self, prefix: Option<&'a str>, uri: Cow<'a, str>) {
        if prefix == Some(XML_PREFIX) || prefix == Some("xmlns") {
            return;
        }
        self.bindings.push(Binding {
            prefix,
            uri,
            depth: self.depth,
        });
    }

    /// URI bound to `prefix`; `None` when unbound or undeclared
    pub fn resolve(&self, prefix: Option<&str>) -> Option<Cow<'a, str>> {
        self.bindings
            .iter()
            .rev()
            .find(|b| b.prefix == prefix)
            .filter(|b| !b.uri.is_empty())
            .map(|b| b.uri.clone())
    }

    pub fn depth(&self) -> usize {
        self.depth
    }
}

/// Split `p:local` at the first colon
pub fn split_name(name: &str) -> (Option<&str>, &str) {
    match name.split_once(':') {
        Some((prefix, local)) if !prefix.is_empty() && !local.is_empty() => (Some(prefix), local),
        _ => (None, name),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_xml_prefix_prebound() {
        let scopes = NamespaceScopes::new();
        assert_eq!(scopes.resolve(Some("xml")).as_deref(), Some(XML_NAMESPACE_URI));
        assert_eq!(scopes.resolve(None), None);
    }

    #[test]
    fn test_scope_pop() {
        let mut scopes = NamespaceScopes::new();
        scopes.push_scope();
        scopes.declare(Some("foo"), Cow::Borrowed("urn:foo"));
        assert_eq!(scopes.resolve(Some("foo")).as_deref(), Some("urn:foo"));
        scopes.pop_scope();
        assert_eq!(scopes.resolve(Some("foo")), None);
        assert_eq!(scopes.depth(), 0);
        assert!(scopes.resolve(Some("xml")).is_some());
    }

    #[test]
    fn test_shadow_and_undeclare() {
        let mut scopes = NamespaceScopes::new();
        scopes.push_scope();
        scopes.declare(None, Cow::Borrowed("urn:outer"));
        scopes.push_scope();
        scopes.declare(None, Cow::Borrowed(""));
        assert_eq!(scopes.resolve(None), None);
        scopes.pop_scope();
        assert_eq!(scopes.resolve(None).as_deref(), Some("urn:outer"));
    }

    #[test]
    fn test_reserved_prefixes_not_rebound() {
        let mut scopes = NamespaceScopes::new();
        scopes.push_scope();
        scopes.declare(Some("xml"), Cow::Borrowed("urn:other"));
        assert_eq!(scopes.resolve(Some("xml")).as_deref(), Some(XML_NAMESPACE_URI));
    }

    #[test]
    fn test_split_name() {
        assert_eq!(split_name("x:note"), (Some("x"), "note"));
        assert_eq!(split_name("note"), (None, "note"));
        assert_eq!(split_name(":odd"), (None, ":odd"));
    }
}
