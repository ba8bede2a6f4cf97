//! Elixir Term Conversion Utilities
//!
//! Converts element trees, token streams and syntax errors to Elixir terms.

use rustler::{Atom, Encoder, Env, NewBinary, Term};

use crate::core::token::{Token, TokenKind};
use crate::dom::Element;
use crate::error::SyntaxError;

mod atoms {
    rustler::atoms! {
        ok,
        error,
        element,
        open_tag,
        close_tag,
        self_close,
        identifier,
        spacing,
        attr_equals,
        quotation,
        value,
        comment_mark,
        comment_dashes,
        comment_content,
    }
}

/// `{:ok, tree}` or `{:error, message}`
pub fn result_to_term<'a>(env: Env<'a>, result: Result<Element, SyntaxError>) -> Term<'a> {
    match result {
        Ok(root) => (atoms::ok(), element_to_term(env, &root)).encode(env),
        Err(err) => error_to_term(env, &err.to_string()),
    }
}

pub fn error_to_term<'a>(env: Env<'a>, message: &str) -> Term<'a> {
    (atoms::error(), str_to_binary(env, message)).encode(env)
}

/// Convert an element to `{:element, tag, [{name, value}], value | nil, children}`
pub fn element_to_term<'a>(env: Env<'a>, element: &Element) -> Term<'a> {
    let tag = str_to_binary(env, element.tag());

    // Build lists in reverse so prepend keeps document order
    let mut attrs = Term::list_new_empty(env);
    for (name, value) in element.attributes().iter().rev() {
        let pair = (str_to_binary(env, name), str_to_binary(env, value));
        attrs = attrs.list_prepend(pair.encode(env));
    }

    let value = element.value().map(|v| str_to_binary(env, v)).encode(env);

    let mut children = Term::list_new_empty(env);
    for child in element.children().iter().rev() {
        children = children.list_prepend(element_to_term(env, child));
    }

    (atoms::element(), tag, attrs, value, children).encode(env)
}

/// Convert tokens to `[{kind, value, offset}]`
pub fn tokens_to_term<'a>(env: Env<'a>, tokens: &[Token<'_>]) -> Term<'a> {
    let mut list = Term::list_new_empty(env);
    for token in tokens.iter().rev() {
        let tuple = (kind_atom(token.kind), str_to_binary(env, token.value), token.offset);
        list = list.list_prepend(tuple.encode(env));
    }
    list
}

fn kind_atom(kind: TokenKind) -> Atom {
    match kind {
        TokenKind::OpenTag => atoms::open_tag(),
        TokenKind::CloseTag => atoms::close_tag(),
        TokenKind::SelfClose => atoms::self_close(),
        TokenKind::Identifier => atoms::identifier(),
        TokenKind::Spacing => atoms::spacing(),
        TokenKind::AttrEquals => atoms::attr_equals(),
        TokenKind::Quotation => atoms::quotation(),
        TokenKind::Value => atoms::value(),
        TokenKind::CommentMark => atoms::comment_mark(),
        TokenKind::CommentDashes => atoms::comment_dashes(),
        TokenKind::CommentContent => atoms::comment_content(),
    }
}

/// Create a binary term from a string slice
#[inline]
pub fn str_to_binary<'a>(env: Env<'a>, s: &str) -> Term<'a> {
    let bytes = s.as_bytes();
    let mut binary = NewBinary::new(env, bytes.len());
    binary.as_mut_slice().copy_from_slice(bytes);
    binary.into()
}
