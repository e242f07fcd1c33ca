//! Markup event scanner
//!
//! Forward-only: each call to `next` consumes one construct and never
//! revisits earlier bytes. Line numbers are accumulated as the scanner moves.

use super::{fragment_of, MarkupError, TagPiece, RAW_TEXT_ELEMENTS};
use crate::directive::find_matching;

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Event<'a> {
    Text {
        text: &'a str,
        line: usize,
    },
    Verbatim {
        text: &'a str,
        line: usize,
    },
    StartTag {
        name: String,
        pieces: Vec<TagPiece>,
        self_closing: bool,
        raw: &'a str,
        line: usize,
    },
    EndTag {
        name: String,
        raw: &'a str,
        line: usize,
    },
}

/// What the `<` at the current position opens
#[derive(Debug, Clone, Copy, PartialEq)]
enum Construct {
    Comment,
    CData,
    Declaration,
    ProcessingInstruction,
    EndTag,
    StartTag,
}

impl Construct {
    /// Classify the `<` at `pos`, or `None` when it is plain text
    fn at(bytes: &[u8], pos: usize) -> Option<Self> {
        let rest = &bytes[pos..];
        let alpha_at = |i: usize| rest.get(i).is_some_and(u8::is_ascii_alphabetic);

        if rest.starts_with(b"<!--") {
            Some(Construct::Comment)
        } else if rest.starts_with(b"<![CDATA[") {
            Some(Construct::CData)
        } else if rest.starts_with(b"<!") {
            Some(Construct::Declaration)
        } else if rest.starts_with(b"<?") {
            Some(Construct::ProcessingInstruction)
        } else if rest.starts_with(b"</") && alpha_at(2) {
            Some(Construct::EndTag)
        } else if rest.starts_with(b"<") && alpha_at(1) {
            Some(Construct::StartTag)
        } else {
            None
        }
    }

    fn terminator(self) -> &'static str {
        match self {
            Construct::Comment => "-->",
            Construct::CData => "]]>",
            Construct::ProcessingInstruction => "?>",
            Construct::Declaration | Construct::EndTag | Construct::StartTag => ">",
        }
    }

    fn describe(self) -> &'static str {
        match self {
            Construct::Comment => "comment",
            Construct::CData => "CDATA section",
            Construct::Declaration => "declaration",
            Construct::ProcessingInstruction => "processing instruction",
            Construct::EndTag => "end tag",
            Construct::StartTag => "start tag",
        }
    }
}

pub(crate) struct MarkupLexer<'a> {
    source: &'a str,
    pos: usize,
    line: usize,
    /// Set after `<script>`/`<style>`: content up to the end tag is verbatim
    raw_text: Option<String>,
}

impl<'a> MarkupLexer<'a> {
    pub fn new(source: &'a str) -> Self {
        Self {
            source,
            pos: 0,
            line: 1,
            raw_text: None,
        }
    }

    /// Move to `end`, counting newlines; returns the consumed slice
    fn advance(&mut self, end: usize) -> &'a str {
        let source = self.source;
        let consumed = &source[self.pos..end];
        self.line += consumed.bytes().filter(|&b| b == b'\n').count();
        self.pos = end;
        consumed
    }

    fn unterminated(&self, construct: &'static str) -> MarkupError {
        MarkupError::Unterminated {
            construct,
            fragment: fragment_of(&self.source[self.pos..]),
            line: self.line,
        }
    }

    fn raw_text_content(&mut self, element: &str) -> Result<Option<Event<'a>>, MarkupError> {
        let line = self.line;
        let closing = format!("</{}", element);
        let found = self.source[self.pos..]
            .to_ascii_lowercase()
            .find(&closing)
            .ok_or_else(|| MarkupError::UnclosedElement {
                name: element.to_string(),
                fragment: fragment_of(&self.source[self.pos..]),
                line,
            })?;

        if found == 0 {
            return Ok(None);
        }
        let text = self.advance(self.pos + found);
        Ok(Some(Event::Verbatim { text, line }))
    }

    /// Character data up to the next markup construct
    ///
    /// `${...}` and `@Key(...)` spans are skipped whole so a `<` inside an
    /// expression is never mistaken for a tag.
    fn text(&mut self) -> Event<'a> {
        let line = self.line;
        let bytes = self.source.as_bytes();
        let mut i = self.pos;

        while i < bytes.len() {
            match bytes[i] {
                b'<' if i > self.pos && Construct::at(bytes, i).is_some() => break,
                b'$' if bytes.get(i + 1) == Some(&b'{') && !escaped(bytes, i) => {
                    match find_matching(&self.source[i + 1..], b'{', b'}') {
                        Some(close) => i += close + 2,
                        None => i += 1,
                    }
                }
                b'@' if !escaped(bytes, i) => {
                    let key_end = i + 1 + bytes[i + 1..]
                        .iter()
                        .take_while(|b| b.is_ascii_alphanumeric())
                        .count();
                    match bytes.get(key_end) {
                        Some(b'(') if key_end > i + 1 => {
                            match find_matching(&self.source[key_end..], b'(', b')') {
                                Some(close) => i = key_end + close + 1,
                                None => i = key_end,
                            }
                        }
                        _ => i = key_end,
                    }
                }
                _ => i += 1,
            }
        }

        let text = self.advance(i);
        Event::Text { text, line }
    }

    fn start_tag(&mut self) -> Result<Event<'a>, MarkupError> {
        let line = self.line;
        let start = self.pos;
        let bytes = self.source.as_bytes();

        let name_end = start
            + 1
            + bytes[start + 1..]
                .iter()
                .take_while(|&&b| !b.is_ascii_whitespace() && b != b'/' && b != b'>')
                .count();
        let name = self.source[start + 1..name_end].to_ascii_lowercase();

        let mut pieces = Vec::new();
        let mut raw_start = start;
        let mut i = name_end;
        let end = loop {
            match bytes.get(i) {
                None => return Err(self.unterminated(Construct::StartTag.describe())),
                Some(&quote) if quote == b'"' || quote == b'\'' => {
                    let close = bytes[i + 1..]
                        .iter()
                        .position(|&b| b == quote)
                        .map(|offset| i + 1 + offset)
                        .ok_or_else(|| self.unterminated("attribute value"))?;
                    pieces.push(TagPiece::Raw(self.source[raw_start..i].to_string()));
                    pieces.push(TagPiece::Value(self.source[i + 1..close].to_string()));
                    raw_start = close + 1;
                    i = close + 1;
                }
                Some(b'>') => break i + 1,
                Some(_) => i += 1,
            }
        };
        pieces.push(TagPiece::Raw(self.source[raw_start..end].to_string()));

        let self_closing = bytes[..end - 1].ends_with(b"/");
        if !self_closing && RAW_TEXT_ELEMENTS.contains(&name.as_str()) {
            self.raw_text = Some(name.clone());
        }

        let raw = self.advance(end);
        Ok(Event::StartTag {
            name,
            pieces,
            self_closing,
            raw,
            line,
        })
    }

    fn end_tag(&mut self) -> Result<Event<'a>, MarkupError> {
        let line = self.line;
        let rest = &self.source[self.pos..];
        let close = rest
            .find('>')
            .ok_or_else(|| self.unterminated(Construct::EndTag.describe()))?;
        let name = rest[2..close].trim_end().to_ascii_lowercase();
        let raw = self.advance(self.pos + close + 1);
        Ok(Event::EndTag { name, raw, line })
    }

    fn delimited(&mut self, construct: Construct) -> Result<Event<'a>, MarkupError> {
        let line = self.line;
        let terminator = construct.terminator();
        let close = self.source[self.pos..]
            .find(terminator)
            .ok_or_else(|| self.unterminated(construct.describe()))?;
        let text = self.advance(self.pos + close + terminator.len());
        Ok(Event::Verbatim { text, line })
    }
}

/// True when the byte at `pos` is preceded by a backslash
fn escaped(bytes: &[u8], pos: usize) -> bool {
    pos > 0 && bytes[pos - 1] == b'\\'
}

impl<'a> Iterator for MarkupLexer<'a> {
    type Item = Result<Event<'a>, MarkupError>;

    fn next(&mut self) -> Option<Self::Item> {
        if let Some(element) = self.raw_text.take() {
            match self.raw_text_content(&element) {
                Ok(Some(event)) => return Some(Ok(event)),
                Ok(None) => {}
                Err(err) => {
                    self.pos = self.source.len();
                    return Some(Err(err));
                }
            }
        }

        if self.pos >= self.source.len() {
            return None;
        }

        let result = match Construct::at(self.source.as_bytes(), self.pos) {
            Some(Construct::StartTag) => self.start_tag(),
            Some(Construct::EndTag) => self.end_tag(),
            Some(construct) => self.delimited(construct),
            None => Ok(self.text()),
        };
        if result.is_err() {
            // stop after the first error
            self.pos = self.source.len();
        }
        Some(result)
    }
}
