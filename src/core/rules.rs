//! Token classification rules
//!
//! The lexer decides each token with one ordered table. A rule pairs a
//! token kind with a matcher over the remaining text and a guard over the
//! kinds of the most recently emitted tokens. The first rule whose guard
//! accepts the history and whose matcher matches wins, so the order of
//! `RULES` resolves the ambiguous cases:
//! - spacing inside a tag header vs. spacing between sibling elements
//! - a comment mark vs. an ordinary tag name after `<`
//! - attribute values (ended by `"`) vs. element text (ended by `<`)

use memchr::{memchr, memmem};

use super::token::TokenKind;
use super::token::TokenKind as K;

/// Number of trailing token kinds a guard may inspect
pub const LOOKBACK: usize = 4;

/// How a rule matches the text at the cursor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Matcher {
    /// Exact text
    Literal(&'static str),
    /// XML name
    Name,
    /// Run of ASCII whitespace
    Whitespace,
    /// Everything up to (excluding) a delimiter byte, or to end of input
    Until(u8),
    /// Everything up to (excluding) a delimiter sequence, or to end of input
    UntilSeq(&'static str),
}

impl Matcher {
    /// Length in bytes of the match at the start of `rest`.
    ///
    /// Empty matches are rejected so every token advances the lexer.
    pub fn match_len(self, rest: &str) -> Option<usize> {
        let bytes = rest.as_bytes();
        let len = match self {
            Matcher::Literal(text) => {
                if rest.starts_with(text) {
                    text.len()
                } else {
                    0
                }
            }
            Matcher::Name => name_len(rest),
            Matcher::Whitespace => bytes
                .iter()
                .take_while(|b| matches!(b, b' ' | b'\t' | b'\n' | b'\r'))
                .count(),
            Matcher::Until(delimiter) => memchr(delimiter, bytes).unwrap_or(bytes.len()),
            Matcher::UntilSeq(delimiter) => {
                memmem::find(bytes, delimiter.as_bytes()).unwrap_or(bytes.len())
            }
        };
        (len > 0).then_some(len)
    }
}

/// Condition on the trailing token kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Guard {
    /// Nothing has been emitted yet
    Start,
    /// History ends with exactly these kinds
    After(&'static [TokenKind]),
    /// At least one guard accepts
    AnyOf(&'static [Guard]),
    /// No guard accepts
    NoneOf(&'static [Guard]),
}

impl Guard {
    pub fn accepts(self, history: &[TokenKind]) -> bool {
        match self {
            Guard::Start => history.is_empty(),
            Guard::After(kinds) => history.ends_with(kinds),
            Guard::AnyOf(guards) => guards.iter().any(|g| g.accepts(history)),
            Guard::NoneOf(guards) => !guards.iter().any(|g| g.accepts(history)),
        }
    }
}

/// One entry of the classification table
#[derive(Debug, Clone, Copy)]
pub struct Rule {
    pub kind: TokenKind,
    pub matcher: Matcher,
    pub guard: Guard,
}

impl Rule {
    const fn new(kind: TokenKind, matcher: Matcher, guard: Guard) -> Self {
        Rule { kind, matcher, guard }
    }
}

/// A complete attribute: `x="1"` or `x=""`
const ATTR_CLOSED: Guard = Guard::AnyOf(&[
    Guard::After(&[K::Quotation, K::Value, K::Quotation]),
    Guard::After(&[K::AttrEquals, K::Quotation, K::Quotation]),
]);

/// Whitespace inside a start tag, after the name or a complete attribute
const HEADER_SPACED: Guard = Guard::AnyOf(&[
    Guard::After(&[K::OpenTag, K::Identifier, K::Spacing]),
    Guard::After(&[K::Quotation, K::Value, K::Quotation, K::Spacing]),
    Guard::After(&[K::AttrEquals, K::Quotation, K::Quotation, K::Spacing]),
]);

/// `>` ending a start tag (not an end tag or self-closing tag)
const HEADER_CLOSED: Guard = Guard::AnyOf(&[
    Guard::After(&[K::OpenTag, K::Identifier, K::CloseTag]),
    Guard::After(&[K::Quotation, K::CloseTag]),
    Guard::After(&[K::Spacing, K::CloseTag]),
]);

/// Classification table in priority order
pub static RULES: &[Rule] = &[
    // `<` starts any tag or comment, except inside a comment or attribute value
    Rule::new(
        K::OpenTag,
        Matcher::Literal("<"),
        Guard::NoneOf(&[
            Guard::After(&[K::OpenTag]),
            Guard::After(&[K::CommentMark, K::CommentDashes]),
            Guard::After(&[K::AttrEquals, K::Quotation]),
        ]),
    ),
    // `/` of an end tag
    Rule::new(K::SelfClose, Matcher::Literal("/"), Guard::After(&[K::OpenTag])),
    // tag name
    Rule::new(
        K::Identifier,
        Matcher::Name,
        Guard::AnyOf(&[
            Guard::After(&[K::OpenTag]),
            Guard::After(&[K::OpenTag, K::SelfClose]),
        ]),
    ),
    // spacing inside a tag header
    Rule::new(
        K::Spacing,
        Matcher::Whitespace,
        Guard::AnyOf(&[Guard::After(&[K::OpenTag, K::Identifier]), ATTR_CLOSED]),
    ),
    // attribute name
    Rule::new(
        K::Identifier,
        Matcher::Name,
        Guard::AnyOf(&[
            Guard::After(&[K::Identifier, K::Spacing]),
            Guard::After(&[K::Quotation, K::Spacing]),
        ]),
    ),
    // `/` of a self-closing tag
    Rule::new(
        K::SelfClose,
        Matcher::Literal("/"),
        Guard::AnyOf(&[Guard::After(&[K::Identifier]), ATTR_CLOSED, HEADER_SPACED]),
    ),
    Rule::new(
        K::AttrEquals,
        Matcher::Literal("="),
        Guard::After(&[K::Spacing, K::Identifier]),
    ),
    // opening quote
    Rule::new(K::Quotation, Matcher::Literal("\""), Guard::After(&[K::AttrEquals])),
    // attribute value
    Rule::new(
        K::Value,
        Matcher::Until(b'"'),
        Guard::After(&[K::AttrEquals, K::Quotation]),
    ),
    // closing quote
    Rule::new(
        K::Quotation,
        Matcher::Literal("\""),
        Guard::AnyOf(&[
            Guard::After(&[K::AttrEquals, K::Quotation, K::Value]),
            Guard::After(&[K::AttrEquals, K::Quotation]),
        ]),
    ),
    // end of a tag
    Rule::new(
        K::CloseTag,
        Matcher::Literal(">"),
        Guard::AnyOf(&[
            Guard::After(&[K::Identifier]),
            ATTR_CLOSED,
            HEADER_SPACED,
            Guard::After(&[K::Identifier, K::SelfClose]),
            Guard::After(&[K::Quotation, K::SelfClose]),
            Guard::After(&[K::Spacing, K::SelfClose]),
        ]),
    ),
    // spacing right after a start tag
    Rule::new(K::Spacing, Matcher::Whitespace, HEADER_CLOSED),
    // element text
    Rule::new(
        K::Value,
        Matcher::Until(b'<'),
        Guard::AnyOf(&[
            HEADER_CLOSED,
            Guard::After(&[K::OpenTag, K::Identifier, K::CloseTag, K::Spacing]),
            Guard::After(&[K::Quotation, K::CloseTag, K::Spacing]),
            Guard::After(&[K::Spacing, K::CloseTag, K::Spacing]),
        ]),
    ),
    // ignorable spacing between finished tags
    Rule::new(
        K::Spacing,
        Matcher::Whitespace,
        Guard::AnyOf(&[
            Guard::Start,
            Guard::After(&[K::SelfClose, K::CloseTag]),
            Guard::After(&[K::SelfClose, K::Identifier, K::CloseTag]),
            Guard::After(&[K::CommentDashes, K::CloseTag]),
        ]),
    ),
    // comment block
    Rule::new(K::CommentMark, Matcher::Literal("!"), Guard::After(&[K::OpenTag])),
    Rule::new(
        K::CommentDashes,
        Matcher::Literal("--"),
        Guard::After(&[K::OpenTag, K::CommentMark]),
    ),
    Rule::new(
        K::CommentContent,
        Matcher::UntilSeq("--"),
        Guard::After(&[K::CommentMark, K::CommentDashes]),
    ),
    Rule::new(
        K::CommentDashes,
        Matcher::Literal("--"),
        Guard::AnyOf(&[
            Guard::After(&[K::CommentContent]),
            Guard::After(&[K::CommentMark, K::CommentDashes]),
        ]),
    ),
    Rule::new(
        K::CloseTag,
        Matcher::Literal(">"),
        Guard::AnyOf(&[
            Guard::After(&[K::CommentContent, K::CommentDashes]),
            Guard::After(&[K::CommentMark, K::CommentDashes, K::CommentDashes]),
        ]),
    ),
];

/// Classify the text at the cursor.
///
/// `history` holds the kinds of the most recent tokens, oldest first. Only
/// the last `LOOKBACK` entries are significant. Returns the winning kind and
/// the byte length of its match, or `None` if no rule fires.
pub fn classify(history: &[TokenKind], rest: &str) -> Option<(TokenKind, usize)> {
    let window = &history[history.len().saturating_sub(LOOKBACK)..];
    RULES
        .iter()
        .filter(|rule| rule.guard.accepts(window))
        .find_map(|rule| rule.matcher.match_len(rest).map(|len| (rule.kind, len)))
}

#[inline]
pub fn is_name_start_char(c: char) -> bool {
    c.is_alphabetic() || c == '_' || c == ':'
}

#[inline]
pub fn is_name_char(c: char) -> bool {
    c.is_alphanumeric() || matches!(c, '_' | '-' | '.' | ':')
}

fn name_len(rest: &str) -> usize {
    let mut chars = rest.char_indices();
    match chars.next() {
        Some((_, c)) if is_name_start_char(c) => {}
        _ => return 0,
    }
    chars
        .find(|&(_, c)| !is_name_char(c))
        .map_or(rest.len(), |(i, _)| i)
}
