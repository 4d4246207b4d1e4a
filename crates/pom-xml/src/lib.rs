//! Navigable XML element tree with slash-separated path queries.
//!
//! This crate provides the document layer used by `pom-metadata`: it turns
//! raw bytes into an immutable element tree (via the quick-xml reader) and
//! answers the three query shapes the extractor needs: a single node, a node
//! set in document order, or a scalar string.

pub mod error;
pub mod path;
pub mod tree;

pub use error::{Result, XmlError};
pub use path::XmlPath;
pub use tree::{Node, XmlDocument};
