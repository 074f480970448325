//! Error types for building a succinct tree
//!
//! Only the build side can fail. Reads against a frozen [`TreeIndex`](crate::tree::TreeIndex)
//! are pure functions; passing a position that did not come from the index
//! is a caller bug and panics.

use std::fmt;

use thiserror::Error;

/// Build counters that are limited by [`Limits`](crate::build::Limits)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Counter {
    /// Positions in the balanced parentheses string (two per node)
    Parentheses,
    /// Nodes of any kind, the document node included
    Nodes,
    /// Bits in the attribute grouping string (attributes plus separators)
    AttributeBits,
}

impl fmt::Display for Counter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Counter::Parentheses => "parenthesis positions",
            Counter::Nodes => "nodes",
            Counter::AttributeBits => "attribute bits",
        };
        f.write_str(name)
    }
}

/// Main error type of the crate
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// A build counter would pass its configured limit
    #[error("capacity exceeded: more than {limit} {counter}")]
    CapacityExceeded {
        /// The counter that overflowed
        counter: Counter,
        /// The configured maximum
        limit: usize,
    },

    /// Open and close events do not pair up
    #[error("unbalanced event stream: {open} node(s) still open")]
    Unbalanced {
        /// Number of nodes that were open when the imbalance was detected
        open: usize,
    },

    /// Structural events arrived in an impossible order
    #[error("event out of order: {0}")]
    OutOfOrder(&'static str),

    /// The document node has no element child
    #[error("document element is not found")]
    MissingRootElement,

    /// Source bytes are not valid UTF-8
    #[error("invalid UTF-8 input: {0}")]
    InvalidUtf8(#[from] std::str::Utf8Error),
}

impl Error {
    /// Short machine-readable reason, used for `{:error, reason}` tuples
    pub fn reason(&self) -> &'static str {
        match self {
            Error::CapacityExceeded { .. } => "capacity_exceeded",
            Error::Unbalanced { .. } => "unbalanced",
            Error::OutOfOrder(_) => "out_of_order",
            Error::MissingRootElement => "missing_root_element",
            Error::InvalidUtf8(_) => "invalid_utf8",
        }
    }
}

/// Result alias used throughout the crate
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_capacity_message() {
        let err = Error::CapacityExceeded {
            counter: Counter::Nodes,
            limit: 4,
        };
        assert_eq!(err.to_string(), "capacity exceeded: more than 4 nodes");
        assert_eq!(err.reason(), "capacity_exceeded");
    }

    #[test]
    fn test_utf8_conversion() {
        let bytes = [0x66u8, 0xff, 0x6f];
        let err: Error = std::str::from_utf8(&bytes).unwrap_err().into();
        assert!(matches!(err, Error::InvalidUtf8(_)));
    }
}
