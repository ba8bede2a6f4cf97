//! Markup tokens
//!
//! A token is a kind plus the slice of input it matched. Tokens borrow
//! the input, so a token stream never copies text.

use std::fmt;

/// Lexical category of a token
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    /// `<`
    OpenTag,
    /// `>`
    CloseTag,
    /// `/` in `</tag>` or `<tag/>`
    SelfClose,
    /// Tag or attribute name
    Identifier,
    /// Whitespace run
    Spacing,
    /// `=` between an attribute name and its value
    AttrEquals,
    /// `"` around an attribute value
    Quotation,
    /// Attribute value or element text
    Value,
    /// `!` opening a comment
    CommentMark,
    /// `--` delimiting a comment body
    CommentDashes,
    /// Comment body
    CommentContent,
}

impl TokenKind {
    /// Human-readable name, used in error messages
    pub fn name(self) -> &'static str {
        match self {
            TokenKind::OpenTag => "open tag",
            TokenKind::CloseTag => "close tag",
            TokenKind::SelfClose => "slash",
            TokenKind::Identifier => "identifier",
            TokenKind::Spacing => "spacing",
            TokenKind::AttrEquals => "equals sign",
            TokenKind::Quotation => "quotation mark",
            TokenKind::Value => "value",
            TokenKind::CommentMark => "comment mark",
            TokenKind::CommentDashes => "comment dashes",
            TokenKind::CommentContent => "comment content",
        }
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A classified slice of the input
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token<'a> {
    pub kind: TokenKind,
    /// Matched text
    pub value: &'a str,
    /// Byte offset of the match in the input
    pub offset: usize,
}

impl<'a> Token<'a> {
    pub fn new(kind: TokenKind, value: &'a str, offset: usize) -> Self {
        Token { kind, value, offset }
    }
}

impl fmt::Display for Token<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {:?}", self.kind, self.value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_display() {
        let token = Token::new(TokenKind::Identifier, "item", 1);
        assert_eq!(token.to_string(), "identifier \"item\"");
    }
}
