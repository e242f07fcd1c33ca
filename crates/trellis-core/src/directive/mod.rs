//! Directive token extraction
//!
//! Purely lexical: this module knows the shape of `@Key`, `@Key()` and
//! `@Key(argument)` but nothing about what any directive means.
//!
//! ## Argument states
//!
//! - `@Link` → argument is absent (`None`)
//! - `@Thing()` → argument is present but empty (`Some("")`)
//! - `@Thing( x )` → argument is `Some("x")` (trimmed)
//!
//! Text runs are also split into literal and `${expression}` segments here.
//! `\@` and `\${` escape to a literal `@` and `${`.

use thiserror::Error;

/// A directive extracted from markup text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectiveToken {
    /// Lowercased identifier immediately after `@`
    pub key: String,
    /// Trimmed text between the parentheses, `None` without parentheses
    pub argument: Option<String>,
    /// Bytes consumed, from `@` through the matching `)` when present
    pub length: usize,
}

/// Lexical errors while extracting a directive
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DirectiveError {
    #[error("directive text must start with '@'")]
    MissingAt,

    #[error("directive has no name after '@'")]
    EmptyKey,

    #[error("unmatched '(' in directive '@{key}'")]
    UnmatchedParenthesis { key: String },

    #[error("unclosed '${{' at byte {offset}")]
    UnclosedInterpolation { offset: usize },
}

/// Scanner state for matching a closing bracket
#[derive(Debug, Clone, Copy, PartialEq)]
enum BracketState {
    Normal { depth: usize },
    InQuote { depth: usize, quote: u8, escaped: bool },
}

/// Extract `(key, argument)` from text starting with `@`
///
/// Extraction stops at the matched `)`; trailing markup is not consumed.
pub fn extract(text: &str) -> Result<DirectiveToken, DirectiveError> {
    let rest = text.strip_prefix('@').ok_or(DirectiveError::MissingAt)?;

    let key_len = rest
        .bytes()
        .take_while(|b| b.is_ascii_alphanumeric())
        .count();
    if key_len == 0 {
        return Err(DirectiveError::EmptyKey);
    }
    let key = rest[..key_len].to_ascii_lowercase();
    let after_key = &rest[key_len..];

    if !after_key.starts_with('(') {
        return Ok(DirectiveToken {
            key,
            argument: None,
            length: 1 + key_len,
        });
    }

    let close = find_matching(after_key, b'(', b')')
        .ok_or_else(|| DirectiveError::UnmatchedParenthesis { key: key.clone() })?;

    Ok(DirectiveToken {
        key,
        argument: Some(after_key[1..close].trim().to_string()),
        length: 1 + key_len + close + 1,
    })
}

/// Find the byte offset of the `close` matching the `open` at offset 0
///
/// Brackets inside single- or double-quoted strings do not count.
pub(crate) fn find_matching(text: &str, open: u8, close: u8) -> Option<usize> {
    let bytes = text.as_bytes();
    if bytes.first() != Some(&open) {
        return None;
    }

    let mut state = BracketState::Normal { depth: 0 };
    for (pos, &byte) in bytes.iter().enumerate() {
        state = match state {
            BracketState::Normal { depth } => match byte {
                b if b == open => BracketState::Normal { depth: depth + 1 },
                b if b == close && depth == 1 => return Some(pos),
                b if b == close => BracketState::Normal {
                    depth: depth.saturating_sub(1),
                },
                b'\'' | b'"' => BracketState::InQuote {
                    depth,
                    quote: byte,
                    escaped: false,
                },
                _ => state,
            },
            BracketState::InQuote {
                depth,
                quote,
                escaped,
            } => {
                if escaped {
                    BracketState::InQuote {
                        depth,
                        quote,
                        escaped: false,
                    }
                } else if byte == b'\\' {
                    BracketState::InQuote {
                        depth,
                        quote,
                        escaped: true,
                    }
                } else if byte == quote {
                    BracketState::Normal { depth }
                } else {
                    state
                }
            }
        };
    }
    None
}

/// A directive found at the end of a text run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrailingDirective<'a> {
    /// Text before the directive, kept verbatim
    pub prefix: &'a str,
    /// The directive itself
    pub token: DirectiveToken,
    /// Byte offset of `@` within the text run
    pub offset: usize,
}

/// Split a text run into `(prefix, directive)` when it ends with a directive
///
/// A candidate `@` must begin the run or follow whitespace and be followed by
/// a letter, so `user@example.com` never matches. Only whitespace may follow
/// the directive. Returns the first lexical error when a candidate exists but
/// none extracts cleanly to the end of the run.
pub fn split_trailing(text: &str) -> Option<Result<TrailingDirective<'_>, DirectiveError>> {
    let end = text.trim_end().len();
    let mut first_error = None;

    for (offset, _) in text[..end].match_indices('@') {
        if !is_candidate(text, offset) {
            continue;
        }
        match extract(&text[offset..end]) {
            Ok(token) if offset + token.length == end => {
                return Some(Ok(TrailingDirective {
                    prefix: &text[..offset],
                    token,
                    offset,
                }));
            }
            Ok(_) => {}
            Err(err) => {
                first_error.get_or_insert(err);
            }
        }
    }

    first_error.map(Err)
}

fn is_candidate(text: &str, offset: usize) -> bool {
    let preceded_ok = text[..offset]
        .chars()
        .next_back()
        .map_or(true, char::is_whitespace);
    let followed_ok = text[offset + 1..]
        .chars()
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic());
    preceded_ok && followed_ok
}

/// A piece of a text run
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    /// Literal text with escapes already removed
    Literal(String),
    /// The source of a `${...}` expression, untrimmed
    Expression {
        source: String,
        /// Byte offset of `$` within the text run
        offset: usize,
    },
}

/// Split text into literal and `${expression}` segments
///
/// Adjacent literals are merged; an empty input yields no segments.
pub fn split_interpolations(text: &str) -> Result<Vec<Segment>, DirectiveError> {
    let bytes = text.as_bytes();
    let mut segments = Vec::new();
    let mut literal = String::new();
    let mut copied = 0;
    let mut pos = 0;

    while pos < bytes.len() {
        match bytes[pos] {
            b'\\' if text[pos + 1..].starts_with("${") || text[pos + 1..].starts_with('@') => {
                literal.push_str(&text[copied..pos]);
                copied = pos + 1;
                pos += 2;
            }
            b'$' if bytes.get(pos + 1) == Some(&b'{') => {
                let close = find_matching(&text[pos + 1..], b'{', b'}')
                    .ok_or(DirectiveError::UnclosedInterpolation { offset: pos })?;
                literal.push_str(&text[copied..pos]);
                if !literal.is_empty() {
                    segments.push(Segment::Literal(std::mem::take(&mut literal)));
                }
                segments.push(Segment::Expression {
                    source: text[pos + 2..pos + 1 + close].to_string(),
                    offset: pos,
                });
                pos += close + 2;
                copied = pos;
            }
            _ => pos += 1,
        }
    }

    literal.push_str(&text[copied..]);
    if !literal.is_empty() {
        segments.push(Segment::Literal(literal));
    }
    Ok(segments)
}
