//! Recursive descent parser
//!
//! Builds an [`Element`] tree from a token stream. Each step takes a cursor
//! into the token sequence and returns the node it built together with the
//! cursor just past it; no parse state is shared between calls.

use crate::core::entities::decode;
use crate::core::lexer::{tokenize, TokenStream};
use crate::core::token::TokenKind;
use crate::dom::element::Element;
use crate::error::{Position, SyntaxError};

use TokenKind::*;

/// `<name`
const TAG_START: &[TokenKind] = &[OpenTag, Identifier];
/// ` name="value"`
const ATTRIBUTE: &[TokenKind] = &[Spacing, Identifier, AttrEquals, Quotation, Value, Quotation];
/// ` name=""`
const EMPTY_ATTRIBUTE: &[TokenKind] = &[Spacing, Identifier, AttrEquals, Quotation, Quotation];
/// `/>`
const SELF_CLOSING: &[TokenKind] = &[SelfClose, CloseTag];
/// `</name>`
const CLOSING_TAG: &[TokenKind] = &[OpenTag, SelfClose, Identifier, CloseTag];
/// `<!-- text -->`
const COMMENT: &[TokenKind] = &[OpenTag, CommentMark, CommentDashes, CommentContent, CommentDashes, CloseTag];
/// `<!---->`
const EMPTY_COMMENT: &[TokenKind] = &[OpenTag, CommentMark, CommentDashes, CommentDashes, CloseTag];

/// Default limit on element nesting
pub const DEFAULT_MAX_DEPTH: usize = 128;

/// Parser configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParseOptions {
    /// Ignore input the lexer could not consume and tokens after the root element
    pub lenient: bool,
    /// Deepest allowed element nesting (the root is depth 0)
    pub max_depth: usize,
}

impl Default for ParseOptions {
    fn default() -> Self {
        ParseOptions {
            lenient: false,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

impl ParseOptions {
    pub fn lenient(mut self, lenient: bool) -> Self {
        self.lenient = lenient;
        self
    }

    pub fn max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }
}

/// Parse a document with default (strict) options
pub fn parse(input: &str) -> Result<Element, SyntaxError> {
    parse_with(input, ParseOptions::default())
}

/// Parse a document with the given options
pub fn parse_with(input: &str, options: ParseOptions) -> Result<Element, SyntaxError> {
    let parser = Parser::new(tokenize(input), options);
    parser.parse_document().inspect_err(|err| {
        tracing::debug!(error = %err, "markup rejected");
    })
}

/// Recursive descent parser over one token stream
pub struct Parser<'a> {
    tokens: TokenStream<'a>,
    options: ParseOptions,
}

impl<'a> Parser<'a> {
    pub fn new(tokens: TokenStream<'a>, options: ParseOptions) -> Self {
        Parser { tokens, options }
    }

    /// Parse the single root element and validate what surrounds it
    pub fn parse_document(&self) -> Result<Element, SyntaxError> {
        if !self.options.lenient && !self.tokens.is_complete() {
            let snippet: String = self.tokens.remainder().chars().take(16).collect();
            return Err(SyntaxError::UnexpectedInput {
                snippet,
                position: self.locate(self.tokens.consumed()),
            });
        }

        let (root, end) = self.parse_element(0, 0)?;
        if self.options.lenient {
            return Ok(root);
        }

        let end = self.skip_trivia(end)?;
        if end < self.tokens.len() {
            return Err(SyntaxError::TrailingContent {
                found: self.describe(end),
                position: self.position_of(end),
            });
        }
        Ok(root)
    }

    /// Parse one element starting at `pos`.
    ///
    /// Returns the element and the cursor just past its closing tag.
    pub fn parse_element(&self, pos: usize, depth: usize) -> Result<(Element, usize), SyntaxError> {
        let pos = self.skip_trivia(pos)?;
        if !self.tokens.matches(pos, TAG_START) {
            // `<` followed by something other than a name: report what follows
            let pos = if self.tokens.kind_at(pos) == Some(OpenTag) { pos + 1 } else { pos };
            return Err(SyntaxError::ExpectedTag {
                found: self.describe(pos),
                position: self.position_of(pos),
            });
        }
        if depth > self.options.max_depth {
            return Err(SyntaxError::TooDeep {
                limit: self.options.max_depth,
                position: self.position_of(pos),
            });
        }

        let mut element = Element::new(self.value_at(pos + 1));
        let mut pos = pos + 2;

        // header
        loop {
            if self.tokens.matches(pos, ATTRIBUTE) {
                element.set_attribute(self.value_at(pos + 1), decode(self.value_at(pos + 4)));
                pos += ATTRIBUTE.len();
            } else if self.tokens.matches(pos, EMPTY_ATTRIBUTE) {
                element.set_attribute(self.value_at(pos + 1), "");
                pos += EMPTY_ATTRIBUTE.len();
            } else {
                break;
            }
        }
        if self.tokens.kind_at(pos) == Some(Spacing) {
            pos += 1;
        }
        if self.tokens.matches(pos, SELF_CLOSING) {
            return Ok((element, pos + SELF_CLOSING.len()));
        }
        if self.tokens.kind_at(pos) != Some(CloseTag) {
            return Err(SyntaxError::MalformedTag {
                tag: element.tag().to_string(),
                found: self.describe(pos),
                position: self.position_of(pos),
            });
        }
        let mut pos = self.skip_trivia(pos + 1)?;

        // leaf with text
        if self.tokens.kind_at(pos) == Some(Value) {
            let text = decode(self.value_at(pos));
            let end = self.closing_tag(&element, self.skip_trivia(pos + 1)?)?;
            element.set_value(text);
            return Ok((element, end));
        }

        // container
        while self.tokens.matches(pos, TAG_START) {
            let (child, next) = self.parse_element(pos, depth + 1)?;
            element.add_child(child);
            pos = self.skip_trivia(next)?;
        }
        let end = self.closing_tag(&element, pos)?;
        Ok((element, end))
    }

    /// Require `</tag>` at `pos` for the given element
    fn closing_tag(&self, element: &Element, pos: usize) -> Result<usize, SyntaxError> {
        if !self.tokens.matches(pos, CLOSING_TAG) {
            return Err(SyntaxError::MissingClosingTag {
                tag: element.tag().to_string(),
                found: self.describe(pos),
                position: self.position_of(pos),
            });
        }
        let close = self.value_at(pos + 2);
        if close != element.tag() {
            return Err(SyntaxError::MismatchedTag {
                open: element.tag().to_string(),
                close: close.to_string(),
                position: self.position_of(pos),
            });
        }
        Ok(pos + CLOSING_TAG.len())
    }

    /// Skip spacing and complete comments
    fn skip_trivia(&self, mut pos: usize) -> Result<usize, SyntaxError> {
        loop {
            if self.tokens.kind_at(pos) == Some(Spacing) {
                pos += 1;
            } else if self.tokens.matches(pos, COMMENT) {
                pos += COMMENT.len();
            } else if self.tokens.matches(pos, EMPTY_COMMENT) {
                pos += EMPTY_COMMENT.len();
            } else if self.tokens.matches(pos, &[OpenTag, CommentMark]) {
                return Err(SyntaxError::UnterminatedComment {
                    position: self.position_of(pos),
                });
            } else {
                return Ok(pos);
            }
        }
    }

    #[inline]
    fn value_at(&self, pos: usize) -> &'a str {
        self.tokens.get(pos).map_or("", |t| t.value)
    }

    /// Describe the token at `pos` for an error message
    fn describe(&self, pos: usize) -> String {
        match self.tokens.get(pos) {
            Some(token) => token.to_string(),
            None => "end of input".to_string(),
        }
    }

    fn position_of(&self, pos: usize) -> Position {
        let offset = self
            .tokens
            .get(pos)
            .map_or(self.tokens.consumed(), |t| t.offset);
        self.locate(offset)
    }

    fn locate(&self, offset: usize) -> Position {
        Position::locate(self.tokens.input(), offset)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn attrs(element: &Element) -> Vec<(&str, &str)> {
        element.attributes().iter().collect()
    }

    /// Tags, attributes and values of a tree, in document order
    fn shape(element: &Element) -> String {
        let mut out = format!("{}{:?}{:?}", element.tag(), attrs(element), element.value());
        for child in element.children() {
            out.push('(');
            out.push_str(&shape(child));
            out.push(')');
        }
        out
    }

    #[test]
    fn test_empty_element() {
        let root = parse("<a></a>").unwrap();
        assert_eq!(root.tag(), "a");
        assert!(root.attributes().is_empty());
        assert_eq!(root.value(), None);
        assert!(root.children().is_empty());
    }

    #[test]
    fn test_self_closing_equals_empty() {
        assert_eq!(parse("<a/>").unwrap(), parse("<a></a>").unwrap());
        assert_eq!(parse("<a />").unwrap(), parse("<a></a>").unwrap());
    }

    #[test]
    fn test_attributes_and_value() {
        let root = parse(r#"<a x="1" y="2">hi</a>"#).unwrap();
        assert_eq!(root.tag(), "a");
        assert_eq!(attrs(&root), vec![("x", "1"), ("y", "2")]);
        assert_eq!(root.value(), Some("hi"));
        assert!(root.children().is_empty());
    }

    #[test]
    fn test_children_in_order() {
        let root = parse("<a><b/><c/></a>").unwrap();
        let tags: Vec<_> = root.children().iter().map(Element::tag).collect();
        assert_eq!(tags, vec!["b", "c"]);
        assert_eq!(root.value(), None);
    }

    #[test]
    fn test_nested() {
        let root = parse(r#"<config><db host="localhost"><port>5432</port></db><name>app</name></config>"#).unwrap();
        let db = root.child("db").unwrap();
        assert_eq!(db.attribute("host"), Some("localhost"));
        assert_eq!(db.child("port").and_then(Element::value), Some("5432"));
        assert_eq!(root.child("name").and_then(Element::value), Some("app"));
    }

    #[test]
    fn test_mismatched_tags() {
        let err = parse("<a></b>").unwrap_err();
        assert!(matches!(
            &err,
            SyntaxError::MismatchedTag { open, close, .. } if open == "a" && close == "b"
        ));
        let message = err.to_string();
        assert!(message.contains("\"a\"") && message.contains("\"b\""));
    }

    #[test]
    fn test_mismatched_leaf_tags() {
        let err = parse("<a>hi</b>").unwrap_err();
        assert!(matches!(err, SyntaxError::MismatchedTag { .. }));
        // reported at the `<` of the closing tag
        assert_eq!(err.position().offset, 5);
    }

    #[test]
    fn test_missing_closing_tag() {
        let err = parse("<a>").unwrap_err();
        assert!(matches!(
            &err,
            SyntaxError::MissingClosingTag { tag, found, .. } if tag == "a" && found == "end of input"
        ));
        assert!(err.to_string().contains("\"a\""));
    }

    #[test]
    fn test_entity_in_attribute() {
        let root = parse(r#"<a x="&amp;"/>"#).unwrap();
        assert_eq!(root.attribute("x"), Some("&"));
    }

    #[test]
    fn test_entities_in_text() {
        let root = parse("<a>&lt;b&gt; &amp; &quot;c&quot; &apos;d&apos;</a>").unwrap();
        assert_eq!(root.value(), Some("<b> & \"c\" 'd'"));
    }

    #[test]
    fn test_empty_attribute_value() {
        let root = parse(r#"<a x="" y="2"/>"#).unwrap();
        assert_eq!(attrs(&root), vec![("x", ""), ("y", "2")]);
    }

    #[test]
    fn test_duplicate_attribute_last_wins() {
        let root = parse(r#"<a x="1" y="2" x="3"/>"#).unwrap();
        assert_eq!(attrs(&root), vec![("x", "3"), ("y", "2")]);
    }

    #[test]
    fn test_whitespace_between_children_is_ignored() {
        let compact = parse(r#"<a k="v"><b>1</b><c/><d><e/></d></a>"#).unwrap();
        let spaced = parse("\n<a k=\"v\" >\n  <b>1</b>\n\t<c />\n  <d>\n    <e/>\n  </d>\n</a>\n").unwrap();
        assert_eq!(shape(&compact), shape(&spaced));
        assert_eq!(compact, spaced);
    }

    #[test]
    fn test_text_whitespace() {
        // leading whitespace is header spacing, trailing whitespace is text
        assert_eq!(parse("<a>  hi there </a>").unwrap().value(), Some("hi there "));
        assert_eq!(parse("<a>  </a>").unwrap().value(), None);
    }

    #[test]
    fn test_text_with_quotes_and_slashes() {
        let root = parse(r#"<path kind="abs">/usr/"local"</path>"#).unwrap();
        assert_eq!(root.value(), Some("/usr/\"local\""));
    }

    #[test]
    fn test_comments_are_skipped() {
        let root = parse("<!-- head --><a><!-- first --><b/> <!----> <c>x<!-- tail --></c></a><!-- end -->").unwrap();
        let tags: Vec<_> = root.children().iter().map(Element::tag).collect();
        assert_eq!(tags, vec!["b", "c"]);
        assert_eq!(root.child("c").and_then(Element::value), Some("x"));
    }

    #[test]
    fn test_unterminated_comment() {
        let err = parse("<a><!-- open</a>").unwrap_err();
        assert!(matches!(err, SyntaxError::UnterminatedComment { .. }));
    }

    #[test]
    fn test_expected_tag() {
        let err = Parser::new(tokenize("   "), ParseOptions::default())
            .parse_element(0, 0)
            .unwrap_err();
        assert!(matches!(err, SyntaxError::ExpectedTag { .. }));
        assert!(err.to_string().starts_with("expected start of a new tag"));
    }

    #[test]
    fn test_expected_tag_names_token_after_open() {
        let err = parse("</a>").unwrap_err();
        match &err {
            SyntaxError::ExpectedTag { found, .. } => assert_eq!(found, "slash \"/\""),
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(err.position().offset, 1);
        assert_eq!(err.position().column, 2);
    }

    #[test]
    fn test_malformed_header() {
        let err = parse("<a x><b/></a>").unwrap_err();
        assert!(matches!(
            &err,
            SyntaxError::MalformedTag { tag, .. } if tag == "a"
        ));
    }

    #[test]
    fn test_mixed_content_rejected() {
        let err = parse("<a>text<b/></a>").unwrap_err();
        assert!(matches!(err, SyntaxError::MissingClosingTag { .. }));
    }

    #[test]
    fn test_unexpected_input_position() {
        let err = parse("<a>\n  <b/>\n</a>\njunk").unwrap_err();
        match err {
            SyntaxError::UnexpectedInput { snippet, position } => {
                assert_eq!(snippet, "junk");
                assert_eq!((position.line, position.column), (4, 1));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_trailing_element() {
        let err = parse("<a/><b/>").unwrap_err();
        assert!(matches!(err, SyntaxError::TrailingContent { .. }));
    }

    #[test]
    fn test_lenient_ignores_trailing() {
        let options = ParseOptions::default().lenient(true);
        let root = parse_with("<a><b/></a>junk", options).unwrap();
        assert_eq!(root.children().len(), 1);
        let root = parse_with("<a/><b/>", options).unwrap();
        assert_eq!(root.tag(), "a");
        // errors inside the root are still reported
        assert!(parse_with("<a></b>", options).is_err());
    }

    #[test]
    fn test_max_depth() {
        let input = "<a><a><a><a/></a></a></a>";
        assert!(parse_with(input, ParseOptions::default().max_depth(3)).is_ok());
        let err = parse_with(input, ParseOptions::default().max_depth(2)).unwrap_err();
        assert!(matches!(err, SyntaxError::TooDeep { limit: 2, .. }));
    }

    #[test]
    fn test_default_depth_fits_small_stack() {
        fn nested(levels: usize) -> String {
            format!("{}{}", "<a>".repeat(levels), "</a>".repeat(levels))
        }

        // the root is depth 0, so DEFAULT_MAX_DEPTH + 1 elements is the deepest accepted document
        let handle = std::thread::Builder::new()
            .stack_size(1024 * 1024)
            .spawn(|| {
                let deepest = parse(&nested(DEFAULT_MAX_DEPTH + 1)).map(|_| ());
                let too_deep = parse(&nested(DEFAULT_MAX_DEPTH + 2)).map(|_| ());
                (deepest, too_deep)
            })
            .unwrap();
        let (deepest, too_deep) = handle.join().unwrap();
        assert_eq!(deepest, Ok(()));
        assert!(matches!(too_deep, Err(SyntaxError::TooDeep { limit: DEFAULT_MAX_DEPTH, .. })));
    }

    #[test]
    fn test_cursor_threading() {
        let tokens = tokenize("<a><b>1</b><c/></a>");
        let parser = Parser::new(tokens, ParseOptions::default());
        // <b>1</b> spans tokens 3..11
        let (child, next) = parser.parse_element(3, 1).unwrap();
        assert_eq!(child.tag(), "b");
        assert_eq!(child.value(), Some("1"));
        assert_eq!(next, 11);
        let (sibling, next) = parser.parse_element(next, 1).unwrap();
        assert_eq!(sibling.tag(), "c");
        assert_eq!(next, 15);
    }
}
