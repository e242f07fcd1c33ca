//! Markup scanning and tree building
//!
//! The scanner is deliberately lossless: every byte of the input ends up in
//! exactly one node, so a document without directives renders back to itself.
//! The only rewrite is attribute quoting, where `'value'` becomes `"value"`.

mod lexer;

use lexer::{Event, MarkupLexer};
use thiserror::Error;

/// Elements that never take an end tag
const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "param", "source",
    "track", "wbr",
];

/// Elements whose content is never scanned for markup, directives or `${}`
pub(crate) const RAW_TEXT_ELEMENTS: &[&str] = &["script", "style"];

/// Longest fragment quoted back in an error
const FRAGMENT_LIMIT: usize = 40;

/// Deepest allowed nesting of open elements
pub const MAX_ELEMENT_DEPTH: usize = 256;

pub fn is_void_element(name: &str) -> bool {
    VOID_ELEMENTS.contains(&name)
}

/// A piece of a start tag
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TagPiece {
    /// Bytes outside any quoted attribute value, verbatim
    Raw(String),
    /// Contents of a quoted attribute value, without its quotes
    Value(String),
}

/// A parsed element
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    /// Lowercased tag name
    pub name: String,
    /// The start tag, split around quoted attribute values
    pub start: Vec<TagPiece>,
    pub children: Vec<Node>,
    /// The end tag as written; `None` for void and self-closing elements
    pub end: Option<String>,
    /// 1-based line of the start tag
    pub line: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    /// Character data, subject to directive and `${}` processing
    Text { text: String, line: usize },
    /// Comments, declarations, CDATA and raw-text content, emitted untouched
    Verbatim { text: String, line: usize },
    Element(Element),
}

impl Node {
    pub fn line(&self) -> usize {
        match self {
            Node::Text { line, .. } | Node::Verbatim { line, .. } => *line,
            Node::Element(element) => element.line,
        }
    }
}

/// Malformed markup
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MarkupError {
    #[error("unterminated {construct}")]
    Unterminated {
        construct: &'static str,
        fragment: String,
        line: usize,
    },

    #[error("end tag '</{name}>' has no matching start tag")]
    UnexpectedEndTag {
        name: String,
        fragment: String,
        line: usize,
    },

    #[error("end tag '</{found}>' does not close '<{expected}>'")]
    MismatchedEndTag {
        expected: String,
        found: String,
        fragment: String,
        line: usize,
    },

    #[error("element '<{name}>' is never closed")]
    UnclosedElement {
        name: String,
        fragment: String,
        line: usize,
    },

    #[error("element '<{name}>' nests deeper than {limit} levels")]
    TooDeep {
        name: String,
        limit: usize,
        fragment: String,
        line: usize,
    },
}

impl MarkupError {
    /// The offending source text
    pub fn fragment(&self) -> &str {
        match self {
            MarkupError::Unterminated { fragment, .. }
            | MarkupError::UnexpectedEndTag { fragment, .. }
            | MarkupError::MismatchedEndTag { fragment, .. }
            | MarkupError::UnclosedElement { fragment, .. }
            | MarkupError::TooDeep { fragment, .. } => fragment,
        }
    }

    pub fn line(&self) -> usize {
        match self {
            MarkupError::Unterminated { line, .. }
            | MarkupError::UnexpectedEndTag { line, .. }
            | MarkupError::MismatchedEndTag { line, .. }
            | MarkupError::UnclosedElement { line, .. }
            | MarkupError::TooDeep { line, .. } => *line,
        }
    }
}

/// Cut `text` down to an error-sized fragment on a char boundary
pub(crate) fn fragment_of(text: &str) -> String {
    match text.char_indices().nth(FRAGMENT_LIMIT) {
        Some((cut, _)) => format!("{}...", &text[..cut]),
        None => text.to_string(),
    }
}

/// An element still waiting for its end tag
struct OpenElement {
    element: Element,
    fragment: String,
}

/// Parse a document into a node tree
///
/// End tags must close the innermost open element. End tags of void
/// elements (`</br>`) are tolerated and kept verbatim.
pub fn parse(source: &str) -> Result<Vec<Node>, MarkupError> {
    let mut root = Vec::new();
    let mut stack: Vec<OpenElement> = Vec::new();

    for event in MarkupLexer::new(source) {
        let node = match event? {
            Event::Text { text, line } => Node::Text {
                text: text.to_string(),
                line,
            },
            Event::Verbatim { text, line } => Node::Verbatim {
                text: text.to_string(),
                line,
            },
            Event::StartTag {
                name,
                pieces,
                self_closing,
                raw,
                line,
            } => {
                let element = Element {
                    name,
                    start: pieces,
                    children: Vec::new(),
                    end: None,
                    line,
                };
                if self_closing || is_void_element(&element.name) {
                    Node::Element(element)
                } else if stack.len() >= MAX_ELEMENT_DEPTH {
                    return Err(MarkupError::TooDeep {
                        name: element.name,
                        limit: MAX_ELEMENT_DEPTH,
                        fragment: fragment_of(raw),
                        line,
                    });
                } else {
                    stack.push(OpenElement {
                        element,
                        fragment: fragment_of(raw),
                    });
                    continue;
                }
            }
            Event::EndTag { name, raw, line } => match stack.pop() {
                Some(mut open) if open.element.name == name => {
                    open.element.end = Some(raw.to_string());
                    Node::Element(open.element)
                }
                Some(open) if !is_void_element(&name) => {
                    return Err(MarkupError::MismatchedEndTag {
                        expected: open.element.name,
                        found: name,
                        fragment: raw.to_string(),
                        line,
                    });
                }
                None if !is_void_element(&name) => {
                    return Err(MarkupError::UnexpectedEndTag {
                        name,
                        fragment: raw.to_string(),
                        line,
                    });
                }
                reopen => {
                    stack.extend(reopen);
                    Node::Verbatim {
                        text: raw.to_string(),
                        line,
                    }
                }
            },
        };

        match stack.last_mut() {
            Some(open) => open.element.children.push(node),
            None => root.push(node),
        }
    }

    match stack.pop() {
        Some(open) => Err(MarkupError::UnclosedElement {
            name: open.element.name,
            fragment: open.fragment,
            line: open.element.line,
        }),
        None => Ok(root),
    }
}
