//! TagTree - XML element trees from a guarded rule-table lexer
//!
//! Pipeline:
//! 1. Lexer: each token is chosen by the first rule whose matcher fits the
//!    remaining input and whose guard accepts the last few token kinds
//! 2. Parser: recursive descent over the token stream into an `Element` tree
//! 3. Entities: the five predefined XML entities, both directions
//!
//! The NIFs in this file expose the same operations to Elixir.

use rustler::{Binary, Encoder, Env, NifResult, Term};

pub mod core;
pub mod dom;
pub mod error;
pub mod strategy;
mod term;

pub use crate::core::entities::{decode, encode, transform, Direction};
pub use crate::core::lexer::{tokenize, Lexer, TokenStream};
pub use crate::core::rules::classify;
pub use crate::core::token::{Token, TokenKind};
pub use dom::{parse, parse_with, Attributes, Element, ParseOptions, Parser};
pub use error::{Position, SyntaxError};
pub use strategy::parse_parallel;

const NOT_UTF8: &str = "input is not valid UTF-8";

// ============================================================================
// Allocator Configuration
// ============================================================================

#[cfg(feature = "mimalloc")]
#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

// ============================================================================
// Parsing
// ============================================================================

fn parse_binary<'a>(env: Env<'a>, input: Binary<'a>, options: ParseOptions) -> Term<'a> {
    match std::str::from_utf8(input.as_slice()) {
        Ok(text) => term::result_to_term(env, parse_with(text, options)),
        Err(_) => term::error_to_term(env, NOT_UTF8),
    }
}

/// Parse a document, rejecting unlexable and trailing input
#[rustler::nif(name = "parse")]
fn parse_nif<'a>(env: Env<'a>, input: Binary<'a>) -> NifResult<Term<'a>> {
    Ok(parse_binary(env, input, ParseOptions::default()))
}

/// Parse a document, ignoring anything after the root element
#[rustler::nif(name = "parse_lenient")]
fn parse_lenient_nif<'a>(env: Env<'a>, input: Binary<'a>) -> NifResult<Term<'a>> {
    Ok(parse_binary(env, input, ParseOptions::default().lenient(true)))
}

/// Parse many documents on the Rayon pool. Results keep input order.
#[rustler::nif(name = "parse_many", schedule = "DirtyCpu")]
fn parse_many_nif<'a>(env: Env<'a>, inputs: Vec<Binary<'a>>) -> NifResult<Term<'a>> {
    let texts: Vec<Option<&str>> = inputs
        .iter()
        .map(|input| std::str::from_utf8(input.as_slice()).ok())
        .collect();
    let valid: Vec<&str> = texts.iter().flatten().copied().collect();

    let mut parsed = parse_parallel(&valid, ParseOptions::default()).into_iter();
    let mut results = Vec::with_capacity(texts.len());
    for &text in &texts {
        let result = match text.and_then(|_| parsed.next()) {
            Some(result) => term::result_to_term(env, result),
            None => term::error_to_term(env, NOT_UTF8),
        };
        results.push(result);
    }
    Ok(results.encode(env))
}

// ============================================================================
// Tokens and Entities
// ============================================================================

/// Lex a document into `[{kind, value, offset}]`, stopping where no rule applies
#[rustler::nif(name = "tokenize")]
fn tokenize_nif<'a>(env: Env<'a>, input: Binary<'a>) -> NifResult<Term<'a>> {
    match std::str::from_utf8(input.as_slice()) {
        Ok(text) => Ok(term::tokens_to_term(env, tokenize(text).tokens())),
        Err(_) => Ok(term::error_to_term(env, NOT_UTF8)),
    }
}

#[rustler::nif(name = "encode")]
fn encode_nif<'a>(env: Env<'a>, input: Binary<'a>) -> NifResult<Term<'a>> {
    match std::str::from_utf8(input.as_slice()) {
        Ok(text) => Ok(term::str_to_binary(env, &encode(text))),
        Err(_) => Ok(term::error_to_term(env, NOT_UTF8)),
    }
}

#[rustler::nif(name = "decode")]
fn decode_nif<'a>(env: Env<'a>, input: Binary<'a>) -> NifResult<Term<'a>> {
    match std::str::from_utf8(input.as_slice()) {
        Ok(text) => Ok(term::str_to_binary(env, &decode(text))),
        Err(_) => Ok(term::error_to_term(env, NOT_UTF8)),
    }
}

rustler::init!("Elixir.TagTree.Native");
