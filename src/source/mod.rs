//! Event source for XML text
//!
//! A lenient, non-validating reader that turns a `&str` into the
//! [`XmlEvent`](crate::build::XmlEvent) stream [`StreamBuilder`](crate::build::StreamBuilder)
//! consumes. Entity declarations in a DOCTYPE are not expanded.

pub mod entities;
pub mod namespace;
pub mod reader;
pub mod scanner;

pub use reader::{XmlReader, INPUT_ENCODING};
pub use scanner::Scanner;
