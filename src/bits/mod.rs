//! Succinct bit-level primitives
//!
//! - [`BitVector`]: rank/select over a frozen bit array
//! - [`CompactIntArray`]: integers packed at a fixed minimal width
//! - [`ParenthesisTopology`]: matching-parenthesis queries over a tree shape

pub mod bit_vector;
pub mod compact;
pub mod parens;

pub use bit_vector::{BitBuf, BitVector};
pub use compact::CompactIntArray;
pub use parens::ParenthesisTopology;
