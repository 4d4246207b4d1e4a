//! Immutable element tree built from the quick-xml event stream.
//!
//! Elements live in a flat arena owned by [`XmlDocument`]; [`Node`] is a
//! cheap `Copy` handle into it. Only what path queries need is kept: local
//! element names, child order, and character data. Attributes, comments and
//! processing instructions are dropped while reading.

use crate::error::{Result, XmlError};
use crate::path::XmlPath;
use encoding_rs::{Encoding, UTF_8};
use quick_xml::Reader;
use quick_xml::events::{BytesRef, BytesStart, Event};
use std::borrow::Cow;
use std::fmt;

/// A parsed XML document.
pub struct XmlDocument {
    elements: Vec<Element>,
    root: usize,
}

struct Element {
    name: String,
    parent: Option<usize>,
    content: Vec<Content>,
}

enum Content {
    Element(usize),
    Text(String),
}

impl XmlDocument {
    /// Parses a document from raw bytes.
    ///
    /// The character encoding is taken from a byte-order mark if present,
    /// otherwise from the `encoding` pseudo-attribute of the XML declaration,
    /// defaulting to UTF-8.
    ///
    /// # Errors
    ///
    /// Returns error if the bytes cannot be decoded in their declared
    /// encoding or are not well-formed XML: syntax errors, malformed
    /// attributes or names, mismatched or unclosed tags, unknown entities,
    /// and a missing or duplicated root element are all rejected.
    pub fn parse(bytes: &[u8]) -> Result<Self> {
        let content = decode_document(bytes)?;
        Self::parse_str(&content)
    }

    /// Parses a document from a string.
    ///
    /// # Errors
    ///
    /// Same as [`XmlDocument::parse`], minus the encoding check.
    pub fn parse_str(content: &str) -> Result<Self> {
        let content = content.strip_prefix('\u{feff}').unwrap_or(content);
        let mut reader = Reader::from_str(content);
        let mut builder = TreeBuilder::default();

        loop {
            let position = reader.buffer_position();
            let event = reader
                .read_event()
                .map_err(|source| XmlError::Syntax { position, source })?;

            match event {
                Event::Start(ref e) => {
                    builder.open(checked_name(e)?)?;
                }
                Event::Empty(ref e) => {
                    let name = checked_name(e)?;
                    builder.open(name.clone())?;
                    builder.close(&name)?;
                }
                Event::End(ref e) => {
                    builder.close(&String::from_utf8_lossy(e.local_name().as_ref()))?;
                }
                Event::Text(ref e) => {
                    let text = e.decode().map_err(|err| XmlError::Decode {
                        position,
                        message: err.to_string(),
                    })?;
                    builder.text(&text)?;
                }
                Event::CData(ref e) => {
                    builder.text(&String::from_utf8_lossy(e.as_ref()))?;
                }
                Event::GeneralRef(ref e) => {
                    builder.text(&resolve_reference(e)?)?;
                }
                Event::Eof => break,
                _ => {}
            }
        }

        let document = builder.finish()?;
        tracing::trace!(
            root = document.root().name(),
            elements = document.elements.len(),
            "parsed XML document"
        );
        Ok(document)
    }

    /// The document element.
    pub fn root(&self) -> Node<'_> {
        Node {
            document: self,
            index: self.root,
        }
    }

    /// All nodes matching `path`, in document order.
    ///
    /// The first step of the path is matched against the root element.
    pub fn select_nodes(&self, path: &XmlPath) -> Vec<Node<'_>> {
        let mut steps = path.steps();
        let root = self.root();
        match steps.next() {
            Some(first) if first == root.name() => descend(vec![root], steps),
            _ => Vec::new(),
        }
    }

    /// The first node matching `path`, if any.
    pub fn select_node(&self, path: &XmlPath) -> Option<Node<'_>> {
        self.select_nodes(path).into_iter().next()
    }

    /// Text content of the first node matching `path`, if any.
    pub fn select_text(&self, path: &XmlPath) -> Option<String> {
        self.select_node(path).map(|node| node.text_content())
    }

    /// Whether at least one node matches `path`.
    pub fn exists(&self, path: &XmlPath) -> bool {
        self.select_node(path).is_some()
    }
}

impl fmt::Debug for XmlDocument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("XmlDocument")
            .field("root", &self.root().name())
            .field("elements", &self.elements.len())
            .finish()
    }
}

/// Handle to one element of an [`XmlDocument`].
#[derive(Clone, Copy)]
pub struct Node<'a> {
    document: &'a XmlDocument,
    index: usize,
}

impl<'a> Node<'a> {
    fn element(&self) -> &'a Element {
        &self.document.elements[self.index]
    }

    /// Local element name (namespace prefix removed).
    pub fn name(&self) -> &'a str {
        &self.element().name
    }

    pub fn parent(&self) -> Option<Node<'a>> {
        self.element().parent.map(|index| Node {
            document: self.document,
            index,
        })
    }

    /// Child elements in document order.
    pub fn children(&self) -> impl Iterator<Item = Node<'a>> + 'a {
        let document = self.document;
        self.element().content.iter().filter_map(move |c| match c {
            Content::Element(index) => Some(Node {
                document,
                index: *index,
            }),
            Content::Text(_) => None,
        })
    }

    /// Concatenation of all descendant character data in document order.
    pub fn text_content(&self) -> String {
        let mut out = String::new();
        self.append_text(&mut out);
        out
    }

    fn append_text(&self, out: &mut String) {
        for content in &self.element().content {
            match content {
                Content::Text(text) => out.push_str(text),
                Content::Element(index) => Node {
                    document: self.document,
                    index: *index,
                }
                .append_text(out),
            }
        }
    }

    /// All descendants matching `path`, which is evaluated relative to this node.
    pub fn select_nodes(&self, path: &XmlPath) -> Vec<Node<'a>> {
        descend(vec![*self], path.steps())
    }

    pub fn select_node(&self, path: &XmlPath) -> Option<Node<'a>> {
        self.select_nodes(path).into_iter().next()
    }

    pub fn select_text(&self, path: &XmlPath) -> Option<String> {
        self.select_node(path).map(|node| node.text_content())
    }
}

impl PartialEq for Node<'_> {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self.document, other.document) && self.index == other.index
    }
}

impl Eq for Node<'_> {}

impl fmt::Debug for Node<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Node")
            .field("name", &self.name())
            .field("index", &self.index)
            .finish()
    }
}

fn descend<'a, 's>(
    mut current: Vec<Node<'a>>,
    steps: impl Iterator<Item = &'s str>,
) -> Vec<Node<'a>> {
    for step in steps {
        if current.is_empty() {
            break;
        }
        current = current
            .iter()
            .flat_map(|node| node.children().filter(move |c| c.name() == step))
            .collect();
    }
    current
}

#[derive(Default)]
struct TreeBuilder {
    elements: Vec<Element>,
    stack: Vec<usize>,
    root: Option<usize>,
}

impl TreeBuilder {
    fn open(&mut self, name: String) -> Result<()> {
        let index = self.elements.len();
        let parent = self.stack.last().copied();

        match parent {
            Some(parent) => self.elements[parent].content.push(Content::Element(index)),
            None => {
                if let Some(root) = self.root {
                    return Err(XmlError::MultipleRoots {
                        first: self.elements[root].name.clone(),
                        second: name,
                    });
                }
                self.root = Some(index);
            }
        }

        self.elements.push(Element {
            name,
            parent,
            content: Vec::new(),
        });
        self.stack.push(index);
        Ok(())
    }

    fn close(&mut self, name: &str) -> Result<()> {
        let Some(index) = self.stack.pop() else {
            return Err(XmlError::UnexpectedClose { name: name.into() });
        };
        let open = &self.elements[index].name;
        if open != name {
            return Err(XmlError::MismatchedTag {
                expected: open.clone(),
                found: name.into(),
            });
        }
        Ok(())
    }

    fn text(&mut self, text: &str) -> Result<()> {
        let Some(&index) = self.stack.last() else {
            // Whitespace around the root element is insignificant
            if text.trim().is_empty() {
                return Ok(());
            }
            return Err(XmlError::TextOutsideRoot);
        };
        let content = &mut self.elements[index].content;
        if let Some(Content::Text(last)) = content.last_mut() {
            last.push_str(text);
        } else {
            content.push(Content::Text(text.to_string()));
        }
        Ok(())
    }

    fn finish(self) -> Result<XmlDocument> {
        if let Some(&open) = self.stack.last() {
            return Err(XmlError::UnclosedElement {
                name: self.elements[open].name.clone(),
            });
        }
        let root = self.root.ok_or(XmlError::MissingRoot)?;
        Ok(XmlDocument {
            elements: self.elements,
            root,
        })
    }
}

/// Decodes raw document bytes to UTF-8 text.
fn decode_document(bytes: &[u8]) -> Result<Cow<'_, str>> {
    let (encoding, bom_len) = match Encoding::for_bom(bytes) {
        Some(found) => found,
        None => match declared_encoding(bytes) {
            Some(label) => {
                let encoding = Encoding::for_label(label).ok_or_else(|| {
                    XmlError::UnsupportedEncoding {
                        label: String::from_utf8_lossy(label).into_owned(),
                    }
                })?;
                // A declaration readable as ASCII cannot be UTF-16 encoded
                (encoding.output_encoding(), 0)
            }
            None => (UTF_8, 0),
        },
    };

    let body = &bytes[bom_len..];
    if encoding == UTF_8 {
        return Ok(Cow::Borrowed(std::str::from_utf8(body)?));
    }
    encoding
        .decode_without_bom_handling_and_without_replacement(body)
        .ok_or(XmlError::MalformedEncoding {
            encoding: encoding.name(),
        })
}

/// Value of `encoding="..."` in a leading `<?xml ...?>` declaration.
fn declared_encoding(bytes: &[u8]) -> Option<&[u8]> {
    let declaration = bytes.strip_prefix(b"<?xml")?;
    let end = declaration.windows(2).position(|w| w == b"?>")?;
    let declaration = &declaration[..end];

    let at = declaration.windows(8).position(|w| w == b"encoding")?;
    let rest = declaration[at + 8..].trim_ascii_start().strip_prefix(b"=")?;
    let rest = rest.trim_ascii_start();
    let (&quote, value) = rest.split_first()?;
    if quote != b'"' && quote != b'\'' {
        return None;
    }
    let close = value.iter().position(|&b| b == quote)?;
    Some(&value[..close])
}

/// Validates the tag and attribute names and attribute syntax of a start
/// tag, returning its local name.
fn checked_name(start: &BytesStart<'_>) -> Result<String> {
    let qualified = String::from_utf8_lossy(start.name().as_ref()).into_owned();
    if !is_xml_name(&qualified) {
        return Err(XmlError::InvalidName { name: qualified });
    }

    for attribute in start.attributes().with_checks(true) {
        let attribute = attribute.map_err(|source| XmlError::Attribute {
            element: qualified.clone(),
            source,
        })?;
        let key = String::from_utf8_lossy(attribute.key.as_ref());
        if !is_xml_name(&key) {
            return Err(XmlError::InvalidName {
                name: key.into_owned(),
            });
        }
    }

    Ok(String::from_utf8_lossy(start.local_name().as_ref()).into_owned())
}

fn is_xml_name(name: &str) -> bool {
    let mut chars = name.chars();
    chars
        .next()
        .is_some_and(|c| c.is_alphabetic() || c == '_' || c == ':')
        && chars.all(|c| c.is_alphanumeric() || matches!(c, '-' | '.' | '_' | ':' | '\u{b7}'))
}

/// Resolves `&name;` references: the five predefined entities and
/// decimal/hex character references.
fn resolve_reference(reference: &BytesRef<'_>) -> Result<String> {
    let name = String::from_utf8_lossy(reference.as_ref());

    if let Some(code) = name.strip_prefix('#') {
        let value = match code.strip_prefix('x') {
            Some(hex) => u32::from_str_radix(hex, 16).ok(),
            None => code.parse::<u32>().ok(),
        };
        return value
            .and_then(char::from_u32)
            .map(String::from)
            .ok_or_else(|| XmlError::UnknownEntity {
                name: name.to_string(),
            });
    }

    quick_xml::escape::resolve_predefined_entity(&name)
        .map(str::to_owned)
        .ok_or_else(|| XmlError::UnknownEntity {
            name: name.to_string(),
        })
}
