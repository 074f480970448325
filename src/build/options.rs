//! Build configuration

/// Upper bounds on the build counters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Limits {
    /// Nodes of any kind, the document included
    pub max_nodes: usize,
    /// Attribute bits (attributes, pseudo attributes and separators)
    pub max_attribute_bits: usize,
}

impl Limits {
    /// Parenthesis positions allowed by `max_nodes`
    pub fn max_parentheses(&self) -> usize {
        self.max_nodes.saturating_mul(2)
    }
}

impl Default for Limits {
    fn default() -> Self {
        // Keeps every position representable as a signed 32-bit integer.
        Limits {
            max_nodes: (i32::MAX / 2) as usize,
            max_attribute_bits: i32::MAX as usize,
        }
    }
}

/// Options for building a tree
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildOptions {
    /// Source URI recorded in the document context
    pub document_uri: Option<String>,
    /// Split prefixes and resolve namespaces
    pub namespace_aware: bool,
    pub limits: Limits,
}

impl Default for BuildOptions {
    fn default() -> Self {
        BuildOptions {
            document_uri: None,
            namespace_aware: true,
            limits: Limits::default(),
        }
    }
}

impl BuildOptions {
    pub fn with_document_uri(mut self, uri: impl Into<String>) -> Self {
        self.document_uri = Some(uri.into());
        self
    }

    pub fn with_namespace_aware(mut self, namespace_aware: bool) -> Self {
        self.namespace_aware = namespace_aware;
        self
    }

    pub fn with_limits(mut self, limits: Limits) -> Self {
        self.limits = limits;
        self
    }

    pub fn with_max_nodes(mut self, max_nodes: usize) -> Self {
        self.limits.max_nodes = max_nodes;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let options = BuildOptions::default();
        assert!(options.namespace_aware);
        assert_eq!(options.document_uri, None);
        assert_eq!(options.limits.max_parentheses(), (i32::MAX as usize) - 1);
    }

    #[test]
    fn test_builder_setters() {
        let options = BuildOptions::default()
            .with_document_uri("file:///a.xml")
            .with_namespace_aware(false)
            .with_max_nodes(10);
        assert_eq!(options.document_uri.as_deref(), Some("file:///a.xml"));
        assert!(!options.namespace_aware);
        assert_eq!(options.limits.max_nodes, 10);
        assert_eq!(options.limits.max_parentheses(), 20);
    }
}
