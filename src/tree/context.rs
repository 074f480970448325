//! Document-level facts captured at document start

/// Immutable record of where a document came from and what it declared
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentContext {
    /// Source URI supplied by the caller
    pub uri: Option<String>,
    /// Encoding the input was actually read in
    pub input_encoding: Option<String>,
    /// Encoding named in the XML declaration
    pub xml_encoding: Option<String>,
    /// Version named in the XML declaration, "1.0" when absent
    pub xml_version: String,
    /// `standalone="yes"` in the XML declaration
    pub standalone: bool,
}

impl Default for DocumentContext {
    fn default() -> Self {
        DocumentContext {
            uri: None,
            input_encoding: None,
            xml_encoding: None,
            xml_version: "1.0".to_string(),
            standalone: false,
        }
    }
}

impl DocumentContext {
    pub fn uri(&self) -> Option<&str> {
        self.uri.as_deref()
    }

    pub fn input_encoding(&self) -> Option<&str> {
        self.input_encoding.as_deref()
    }

    pub fn xml_encoding(&self) -> Option<&str> {
        self.xml_encoding.as_deref()
    }

    pub fn xml_version(&self) -> &str {
        &self.xml_version
    }

    pub fn is_standalone(&self) -> bool {
        self.standalone
    }
}
