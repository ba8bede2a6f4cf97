//! Markup lexer
//!
//! Walks the input once, left to right, emitting one token per step as
//! decided by [`classify`]. The lexer never fails: when no rule fires it
//! stops, and the token stream records how much input was consumed.

use super::rules::{classify, LOOKBACK};
use super::token::{Token, TokenKind};

/// Fixed-size window over the most recent token kinds
#[derive(Debug, Clone, Copy)]
struct History {
    kinds: [TokenKind; LOOKBACK],
    len: usize,
}

impl History {
    fn new() -> Self {
        History {
            kinds: [TokenKind::Spacing; LOOKBACK],
            len: 0,
        }
    }

    fn push(&mut self, kind: TokenKind) {
        if self.len < LOOKBACK {
            self.kinds[self.len] = kind;
            self.len += 1;
        } else {
            self.kinds.rotate_left(1);
            self.kinds[LOOKBACK - 1] = kind;
        }
    }

    #[inline]
    fn as_slice(&self) -> &[TokenKind] {
        &self.kinds[..self.len]
    }
}

/// Pull-style lexer over a markup string
pub struct Lexer<'a> {
    input: &'a str,
    pos: usize,
    history: History,
    stalled: bool,
}

impl<'a> Lexer<'a> {
    pub fn new(input: &'a str) -> Self {
        Lexer {
            input,
            pos: 0,
            history: History::new(),
            stalled: false,
        }
    }

    /// Current byte position
    #[inline]
    pub fn position(&self) -> usize {
        self.pos
    }

    /// True if lexing stopped before the end of input
    #[inline]
    pub fn is_stalled(&self) -> bool {
        self.stalled
    }

    /// Get the next token, or None at end of input or when no rule fires
    pub fn next_token(&mut self) -> Option<Token<'a>> {
        if self.stalled || self.pos >= self.input.len() {
            return None;
        }
        let rest = &self.input[self.pos..];
        let Some((kind, len)) = classify(self.history.as_slice(), rest) else {
            self.stalled = true;
            tracing::debug!(offset = self.pos, "no token rule matched, lexing stopped");
            return None;
        };
        let token = Token::new(kind, &rest[..len], self.pos);
        self.pos += len;
        self.history.push(kind);
        Some(token)
    }
}

impl<'a> Iterator for Lexer<'a> {
    type Item = Token<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_token()
    }
}

/// Tokenize a whole input
pub fn tokenize(input: &str) -> TokenStream<'_> {
    let mut lexer = Lexer::new(input);
    // Every token is at least one byte, so this loop is bounded by input length.
    let tokens: Vec<_> = lexer.by_ref().collect();
    TokenStream {
        input,
        tokens,
        consumed: lexer.position(),
    }
}

/// The token sequence of one input
#[derive(Debug, Clone)]
pub struct TokenStream<'a> {
    input: &'a str,
    tokens: Vec<Token<'a>>,
    consumed: usize,
}

impl<'a> TokenStream<'a> {
    pub fn input(&self) -> &'a str {
        self.input
    }

    pub fn tokens(&self) -> &[Token<'a>] {
        &self.tokens
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    #[inline]
    pub fn get(&self, pos: usize) -> Option<&Token<'a>> {
        self.tokens.get(pos)
    }

    #[inline]
    pub fn kind_at(&self, pos: usize) -> Option<TokenKind> {
        self.tokens.get(pos).map(|t| t.kind)
    }

    /// Check that the tokens starting at `pos` have exactly these kinds
    pub fn matches(&self, pos: usize, kinds: &[TokenKind]) -> bool {
        self.tokens
            .get(pos..pos + kinds.len())
            .is_some_and(|window| window.iter().map(|t| t.kind).eq(kinds.iter().copied()))
    }

    /// Bytes of input covered by tokens
    pub fn consumed(&self) -> usize {
        self.consumed
    }

    /// True if every byte of input was tokenized
    pub fn is_complete(&self) -> bool {
        self.consumed >= self.input.len()
    }

    /// Input left over after lexing stopped
    pub fn remainder(&self) -> &'a str {
        &self.input[self.consumed..]
    }
}
