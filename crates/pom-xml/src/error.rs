//! Errors raised while building or querying an XML tree.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum XmlError {
    #[error("XML syntax error at byte {position}: {source}")]
    Syntax {
        position: u64,
        #[source]
        source: quick_xml::Error,
    },

    #[error("Document is not valid UTF-8: {0}")]
    Encoding(#[from] std::str::Utf8Error),

    #[error("Unsupported document encoding '{label}'")]
    UnsupportedEncoding { label: String },

    #[error("Document bytes are not valid {encoding}")]
    MalformedEncoding { encoding: &'static str },

    #[error("Invalid XML name '{name}'")]
    InvalidName { name: String },

    #[error("Invalid attribute in '<{element}>': {source}")]
    Attribute {
        element: String,
        #[source]
        source: quick_xml::events::attributes::AttrError,
    },

    #[error("Undecodable content at byte {position}: {message}")]
    Decode { position: u64, message: String },

    #[error("Unknown entity reference '&{name};'")]
    UnknownEntity { name: String },

    #[error("Closing tag '</{found}>' does not match open element '<{expected}>'")]
    MismatchedTag { expected: String, found: String },

    #[error("Closing tag '</{name}>' has no open element")]
    UnexpectedClose { name: String },

    #[error("Document ended with unclosed element '<{name}>'")]
    UnclosedElement { name: String },

    #[error("Document has no root element")]
    MissingRoot,

    #[error("Document has more than one root element ('<{first}>' and '<{second}>')")]
    MultipleRoots { first: String, second: String },

    #[error("Text content outside of the root element")]
    TextOutsideRoot,

    #[error("Invalid path expression '{path}': {reason}")]
    InvalidPath { path: String, reason: String },
}

pub type Result<T> = std::result::Result<T, XmlError>;
